//! Tests for selector scoping - the central rewrite algorithm.
//!
//! Covers root anchoring, extends double-compounds, state attributes,
//! global escapes, pseudo-element parts, custom selectors, and the
//! mutual-default-import scenario.

use once_cell::sync::Lazy;
use rstest::rstest;
use stylark::semantic::codes;
use stylark::{NullModuleResolver, ProcessorOptions, Project};

fn project() -> Project {
    Project::in_memory(ProcessorOptions::seed_only(), Box::new(NullModuleResolver))
}

/// Cross-file fixtures shared by the import-driven tests. Each test reads a
/// different entry, so the session can be shared.
static CROSS_FILE: Lazy<Project> = Lazy::new(|| {
    let project = project();
    project.add_source("/x/gallery.st.css", ".nav { color: red; }");
    project.add_source(
        "/x/consumer.st.css",
        ":import { -st-from: \"./gallery.st.css\"; -st-default: Gallery; }\nGallery::nav { color: blue; }",
    );
    project.add_source("/x/lib.st.css", ".badge { color: gold; }");
    project.add_source(
        "/x/reuse.st.css",
        ":import { -st-from: \"./lib.st.css\"; -st-named: badge; }\n.badge { font-weight: bold; }",
    );
    project
});

#[test]
fn test_rules_are_scoped_under_the_file_root() {
    let project = project();
    project.add_source("/p/entry.st.css", ".b { color: green; }");

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert_eq!(output.css(), ".entry--root .entry--b {\n    color: green;\n}\n");
    assert_eq!(output.exports.get("root").map(String::as_str), Some("entry--root"));
    assert_eq!(output.exports.get("b").map(String::as_str), Some("entry--b"));
}

#[rstest]
#[case(".b", ".entry--root .entry--b")]
#[case(".root .b", ".entry--root .entry--b")]
#[case(".b > .c", ".entry--root .entry--b > .entry--c")]
#[case("div", ".entry--root div")]
#[case("*", ".entry--root *")]
fn test_top_level_compounds_are_root_anchored(#[case] selector: &str, #[case] expected: &str) {
    let project = project();
    project.add_source("/p/entry.st.css", &format!("{selector} {{ color: red; }}"));

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(
        css.starts_with(expected),
        "selector {selector:?} scoped to {css:?}, expected prefix {expected:?}"
    );
}

#[test]
fn test_class_name_sharing_root_prefix_is_still_anchored() {
    let project = project();
    project.add_source("/p/entry.st.css", ".rooty { color: red; }");

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert_eq!(css, ".entry--root .entry--rooty {\n    color: red;\n}\n");
}

#[test]
fn test_extends_selector_and_export() {
    let project = project();
    project.add_source("/p/entry.st.css", ".a {}\n.b { -st-extends: a; }");

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(output.css().contains(".entry--root .entry--b.entry--a"));
    assert_eq!(
        output.exports.get("b").map(String::as_str),
        Some("entry--b entry--a")
    );
}

#[test]
fn test_mapped_and_unmapped_states() {
    let project = project();
    project.add_source(
        "/p/ns.st.css",
        ".my-class { -st-states: state1, state2(\"[data-mapped]\"); }\n.my-class:state1 {}\n.my-class:state2 {}",
    );

    let css = project.transform_file("/p/ns.st.css").unwrap().css();
    assert!(css.contains(".ns--my-class[data-ns-state1]"));
    assert!(css.contains(".ns--my-class[data-mapped]"));
    assert!(!css.contains("[data-ns-state2]"));
}

#[test]
fn test_state_inherited_from_extended_component() {
    let project = project();
    project.add_source("/p/base.st.css", ".root { -st-states: loading; }");
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"./base.st.css\"; -st-default: Base; }\n.panel { -st-extends: Base; }\n.panel:loading {}",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    // attribute carries the defining file's namespace, not the consumer's
    assert!(css.contains(".entry--panel.base--root[data-base-loading]"));
}

#[test]
fn test_own_states_survive_extends() {
    let project = project();
    project.add_source("/p/base.st.css", ".root { -st-states: loading; }");
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"./base.st.css\"; -st-default: Base; }\n.b { -st-extends: Base; -st-states: mine; }\n.b:mine {}\n.b:loading {}",
    );

    let output = project.transform_file("/p/entry.st.css").unwrap();
    let css = output.css();
    assert!(css.contains(".entry--b.base--root[data-entry-mine]"));
    assert!(css.contains(".entry--b.base--root[data-base-loading]"));
    assert!(!output.diagnostics.has_code(codes::UNKNOWN_STATE));
}

#[test]
fn test_global_escape_and_global_pseudo() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ".x { -st-global: \".legacy\"; color: red; }\n:global(.vendor) .x { color: blue; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains(".legacy {\n    color: red;\n}"));
    assert!(css.contains(".vendor .legacy {\n    color: blue;\n}"));
}

#[test]
fn test_component_pseudo_element_targets_inner_part() {
    let css = CROSS_FILE.transform_file("/x/consumer.st.css").unwrap().css();
    assert!(css.contains(".consumer--root .gallery--root .gallery--nav"));
}

#[test]
fn test_custom_selector_expands_and_scopes() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        "@custom-selector :--controls .btn, .link;\n:--controls { color: red; }",
    );

    let css = project.transform_file("/p/entry.st.css").unwrap().css();
    assert!(css.contains(":matches(.entry--btn, .entry--link)"));
    assert!(!css.contains(":--controls"));
}

#[test]
fn test_mutual_default_imports_resolve_without_crash() {
    let project = project();
    project.add_source(
        "/p/a.st.css",
        ":import { -st-from: \"./b.st.css\"; -st-default: EntryB; }\nEntryB { color: red; }",
    );
    project.add_source(
        "/p/b.st.css",
        ":import { -st-from: \"./a.st.css\"; -st-default: EntryA; }\nEntryA { color: green; }",
    );

    let a = project.transform_file("/p/a.st.css").unwrap();
    let b = project.transform_file("/p/b.st.css").unwrap();

    assert!(a.css().contains(".a--root .b--root {\n    color: red;\n}"));
    assert!(b.css().contains(".b--root .a--root {\n    color: green;\n}"));
    assert!(!a.diagnostics.has_errors());
    assert!(!b.diagnostics.has_errors());
}

#[test]
fn test_unknown_pseudo_class_and_element_warn_but_emit() {
    let project = project();
    project.add_source("/p/entry.st.css", ".x:frobnicated {}\n.y::gizmo {}");

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(output.diagnostics.has_code(codes::UNKNOWN_STATE));
    assert!(output.diagnostics.has_code(codes::UNKNOWN_PSEUDO_ELEMENT));
    let css = output.css();
    assert!(css.contains(".entry--x:frobnicated"));
    assert!(css.contains(".entry--y::gizmo"));
}

#[test]
fn test_native_pseudo_classes_pass_silently() {
    let project = project();
    project.add_source("/p/entry.st.css", ".x:hover {}\n.x:not(.y) {}\n.x::before {}");

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(!output.diagnostics.has_code(codes::UNKNOWN_STATE));
    assert!(!output.diagnostics.has_code(codes::UNKNOWN_PSEUDO_ELEMENT));
    assert!(output.css().contains(".entry--x:hover"));
}

#[test]
fn test_named_class_import_used_in_selector() {
    let output = CROSS_FILE.transform_file("/x/reuse.st.css").unwrap();
    // the local class aliases the import and forwards to the source scope,
    // and the export names the same scoped class the css emits
    assert!(output.css().contains(".reuse--root .lib--badge {\n    font-weight: bold;\n}"));
    assert_eq!(
        output.exports.get("badge").map(String::as_str),
        Some("lib--badge")
    );
}
