//! Tests for mixin application - class mixins and module function mixins.

use std::sync::Arc;

use stylark::semantic::codes;
use stylark::semantic::modules::{MixinFn, MixinObject, MixinValue};
use stylark::{JsExport, JsModule, ModuleRegistry, NullModuleResolver, ProcessorOptions, Project};

fn project() -> Project {
    Project::in_memory(ProcessorOptions::seed_only(), Box::new(NullModuleResolver))
}

fn project_with_modules(registry: ModuleRegistry) -> Project {
    Project::in_memory(ProcessorOptions::seed_only(), Box::new(registry))
}

#[test]
fn test_local_class_mixin_splices_declarations() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ".pad { padding: 10px; }\n.btn { -st-mixin: pad; color: red; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains(".entry--root .entry--btn {\n    color: red;\n    padding: 10px;\n}"));
}

#[test]
fn test_class_mixin_nested_rules_become_siblings() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ".pad { padding: 10px; }\n.pad:hover { padding: 12px; }\n.btn { -st-mixin: pad; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    let host = css.find(".entry--root .entry--btn {").unwrap();
    let hover = css.find(".entry--root .entry--btn:hover {").unwrap();
    assert!(hover > host, "nested mixin rule must follow the host rule");
}

#[test]
fn test_cross_file_class_mixin() {
    let project = project();
    project.add_source(
        "/p/lib.st.css",
        ".card { border: 1px solid black; }\n.card .title { font-weight: bold; }",
    );
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"./lib.st.css\"; -st-named: card; }\n.panel { -st-mixin: card; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains("border: 1px solid black"));
    // the nested part keeps the source file's scope
    assert!(css.contains(".entry--panel .lib--title"));
}

#[test]
fn test_function_mixin_with_var_argument() {
    let shade: Arc<MixinFn> = Arc::new(|args| {
        let mut object = MixinObject::new();
        object.insert(
            "background".into(),
            MixinValue::Decl(args.first().cloned().unwrap_or_default()),
        );
        Ok(object)
    });
    let mut registry = ModuleRegistry::new();
    registry.register("shade", JsModule::with_default(JsExport::Mixin(shade)));
    let project = project_with_modules(registry);
    project.add_source(
        "/p/entry.st.css",
        ":vars { brand: teal; }\n:import { -st-from: \"shade\"; -st-default: shade; }\n.btn { -st-mixin: shade(value(brand)); }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains("background: teal"));
}

#[test]
fn test_function_mixin_nested_object() {
    let hoverable: Arc<MixinFn> = Arc::new(|_| {
        let mut nested = MixinObject::new();
        nested.insert("opacity".into(), MixinValue::Decl("0.8".into()));
        let mut object = MixinObject::new();
        object.insert("cursor".into(), MixinValue::Decl("pointer".into()));
        object.insert("&:hover".into(), MixinValue::Nested(nested));
        Ok(object)
    });
    let mut registry = ModuleRegistry::new();
    registry.register("hoverable", JsModule::with_default(JsExport::Mixin(hoverable)));
    let project = project_with_modules(registry);
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"hoverable\"; -st-default: hoverable; }\n.btn { -st-mixin: hoverable; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains("cursor: pointer"));
    assert!(css.contains(".entry--root .entry--btn:hover {\n    opacity: 0.8;\n}"));
}

#[test]
fn test_failing_mixin_is_diagnostic_only() {
    let broken: Arc<MixinFn> = Arc::new(|_| Err("not a declaration object".to_string()));
    let mut registry = ModuleRegistry::new();
    registry.register("broken", JsModule::with_default(JsExport::Mixin(broken)));
    let project = project_with_modules(registry);
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"broken\"; -st-default: broken; }\n.btn { -st-mixin: broken; color: red; }",
    );

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(output.diagnostics.has_code(codes::MIXIN_FAILED));
    assert!(output.css().contains("color: red"));
}

#[test]
fn test_unknown_mixin_name_is_diagnostic() {
    let project = project();
    project.add_source("/p/entry.st.css", ".btn { -st-mixin: ghost; }");

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(output.diagnostics.has_code(codes::MIXIN_FAILED));
}

#[test]
fn test_mixin_directive_always_stripped() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ".pad { padding: 1px; }\n.btn { -st-mixin: pad; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(!css.contains("-st-mixin"));
}
