//! Session-level tests: caching, invalidation, disk loading, and the
//! safety properties of whole-project transforms.

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use stylark::semantic::codes;
use stylark::{NullModuleResolver, ProcessorOptions, Project};

fn project() -> Project {
    Project::in_memory(ProcessorOptions::seed_only(), Box::new(NullModuleResolver))
}

#[test]
fn test_process_file_returns_cached_snapshot() {
    let project = project();
    project.add_source("/p/a.st.css", ".a {}");

    let first = project.process_file("/p/a.st.css").unwrap();
    let second = project.process_file("/p/a.st.css").unwrap();
    assert!(Arc::ptr_eq(&first, &second));
}

#[test]
fn test_editing_a_dependency_updates_the_importer_output() {
    let project = project();
    project.add_source("/p/lib.st.css", ":vars { brand: red; }");
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"./lib.st.css\"; -st-named: brand; }\n.x { color: value(brand); }",
    );

    let before = project.transform_file("/p/entry.st.css").unwrap();
    assert!(before.css().contains("color: red"));

    project.add_source("/p/lib.st.css", ":vars { brand: blue; }");
    let after = project.transform_file("/p/entry.st.css").unwrap();
    assert!(after.css().contains("color: blue"));
}

#[test]
fn test_transform_is_repeatable() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ":vars { c: red; }\n.a { color: value(c); }\n.b { -st-extends: a; }",
    );

    let first = project.transform_file("/p/entry.st.css").unwrap();
    let second = project.transform_file("/p/entry.st.css").unwrap();
    assert_eq!(first.css(), second.css());
    assert_eq!(first.exports, second.exports);
}

#[test]
fn test_circular_named_value_import_is_bounded() {
    let project = project();
    project.add_source(
        "/p/a.st.css",
        ":import { -st-from: \"./b.st.css\"; -st-named: x; }\n.foo { color: value(x); }",
    );
    project.add_source(
        "/p/b.st.css",
        ":import { -st-from: \"./a.st.css\"; -st-named: x; }",
    );

    let output = project.transform_file("/p/a.st.css").unwrap();
    assert!(output.diagnostics.has_code(codes::CIRCULAR_RESOLUTION));
    // the unresolved reference is left as written
    assert!(output.css().contains("color: value(x)"));
}

#[test]
fn test_missing_import_target_degrades_to_warnings() {
    let project = project();
    project.add_source(
        "/p/entry.st.css",
        ":import { -st-from: \"./ghost.st.css\"; -st-named: thing; }\n.thing { color: red; }",
    );

    let output = project.transform_file("/p/entry.st.css").unwrap();
    assert!(output.diagnostics.has_code(codes::UNRESOLVED_REFERENCE));
    assert!(output.css().contains("color: red"));
}

#[test]
fn test_transform_all_mixes_successes_and_failures() {
    let project = project();
    project.add_source("/p/a.st.css", ".a {}");

    let paths = vec![PathBuf::from("/p/a.st.css"), PathBuf::from("/p/ghost.st.css")];
    let outputs = project.transform_all(&paths);
    assert_eq!(outputs.len(), 2);
    assert!(outputs[0].1.is_ok());
    assert!(outputs[1].1.is_err());
}

#[test]
fn test_transform_all_is_deterministic() {
    let project = project();
    for i in 0..32 {
        project.add_source(format!("/p/f{i}.st.css"), format!(".c{i} {{ top: {i}px; }}"));
    }
    let paths: Vec<PathBuf> = (0..32).map(|i| PathBuf::from(format!("/p/f{i}.st.css"))).collect();

    let a = project.transform_all(&paths);
    let b = project.transform_all(&paths);
    for (left, right) in a.iter().zip(&b) {
        assert_eq!(left.0, right.0);
        assert_eq!(
            left.1.as_ref().unwrap().css(),
            right.1.as_ref().unwrap().css()
        );
    }
}

#[test]
fn test_disk_session_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let lib = dir.path().join("lib.st.css");
    let entry = dir.path().join("entry.st.css");
    fs::write(&lib, ".badge { color: gold; }").unwrap();
    fs::write(
        &entry,
        ":import { -st-from: \"./lib.st.css\"; -st-named: badge; }\n.badge { font-weight: bold; }",
    )
    .unwrap();

    let project = Project::on_disk();
    let output = project.transform_file(&entry).unwrap();
    assert!(output.css().contains("font-weight: bold"));
    // disk sessions hash the path into the namespace seed
    assert!(output.exports.get("root").unwrap().starts_with("entry"));
}

#[test]
fn test_add_source_is_a_noop_on_disk_sessions() {
    let project = Project::on_disk();
    project.add_source("/p/entry.st.css", ".a {}");
    assert!(project.transform_file("/p/entry.st.css").is_err());
}
