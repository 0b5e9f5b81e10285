//! End-to-end pipeline behavior: plan, diff, and apply against real
//! directory trees.

use protoshift_core::config::{Config, RuleConfig};
use protoshift_core::plan::{ChangeKind, DiffLine, Engine};
use protoshift_core::ShiftError;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn write(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

fn rule(kind: &str, from: &str, to: &str) -> RuleConfig {
    RuleConfig {
        kind: kind.to_string(),
        from: from.to_string(),
        to: to.to_string(),
        ..RuleConfig::default()
    }
}

fn config(source: PathBuf, target: PathBuf, rules: Vec<RuleConfig>) -> Config {
    Config {
        source,
        target,
        excludes: Vec::new(),
        rules,
    }
}

#[test]
fn package_rename_applies_end_to_end() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("proto/old");
    let target = dir.path().join("proto/new");
    let original = "syntax = \"proto3\";\n\npackage old.v1;\n\nmessage A {\n  string id = 1;\n}\n";
    write(dir.path(), "proto/old/a.proto", original);

    let engine = Engine::new(config(
        source.clone(),
        target.clone(),
        vec![rule("package", "old.v1", "new.v1")],
    ));
    let plan = engine.plan().unwrap();

    assert_eq!(plan.changes.len(), 1);
    assert_eq!(plan.changes[0].kind, ChangeKind::Transform);
    assert_eq!(plan.changes[0].file, source.join("a.proto"));

    engine.apply(plan).unwrap();

    let written = fs::read_to_string(target.join("a.proto")).unwrap();
    assert!(written.contains("package new.v1;"));

    // The source tree is untouched.
    assert_eq!(fs::read_to_string(source.join("a.proto")).unwrap(), original);
}

#[test]
fn auto_import_rule_follows_package_renames() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("proto/old");
    let target = dir.path().join("proto/new");
    write(
        dir.path(),
        "proto/old/b.proto",
        "syntax = \"proto3\";\n\npackage old.v1;\n\nimport \"old/v1/a.proto\";\n",
    );

    let engine = Engine::new(config(
        source.clone(),
        target,
        vec![rule("package", "old.v1", "new.v1")],
    ));
    let plan = engine.plan().unwrap();

    let doc = &plan.documents[0];
    assert!(doc.text.contains("import \"new/v1/a.proto\";"));

    let auto_changes: Vec<_> = plan
        .changes
        .iter()
        .filter(|c| c.kind == ChangeKind::AutoImport)
        .collect();
    assert_eq!(auto_changes.len(), 1);
    assert_eq!(auto_changes[0].file, source.join("b.proto"));
}

#[test]
fn regexp_rule_rewrites_comment_text() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(
        dir.path(),
        "src/c.proto",
        "package x.v1;\n\n// old.v1 reference\nmessage C {}\n",
    );

    let engine = Engine::new(config(
        source,
        dir.path().join("out"),
        vec![RuleConfig {
            kind: "regexp".to_string(),
            pattern: "old\\.v1".to_string(),
            replace: "new.v1".to_string(),
            ..RuleConfig::default()
        }],
    ));
    let plan = engine.plan().unwrap();

    assert!(plan.documents[0].text.contains("// new.v1 reference"));
}

#[test]
fn shared_external_import_is_reported_once() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(
        dir.path(),
        "src/a.proto",
        "import \"google/protobuf/empty.proto\";\n",
    );
    write(
        dir.path(),
        "src/b.proto",
        "import \"google/protobuf/empty.proto\";\nimport \"a.proto\";\n",
    );

    let engine = Engine::new(config(source, dir.path().join("out"), Vec::new()));
    let plan = engine.plan().unwrap();

    // a.proto resolves internally; the well-known import shows up once.
    assert_eq!(
        plan.graph.external_imports(),
        vec!["google/protobuf/empty.proto".to_string()]
    );
}

#[test]
fn apply_overwrites_existing_destination_files() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("out");
    write(dir.path(), "src/a.proto", "package a.v1;\n");
    write(dir.path(), "out/a.proto", "stale content\n");

    let engine = Engine::new(config(source, target.clone(), Vec::new()));
    let plan = engine.plan().unwrap();
    engine.apply(plan).unwrap();

    assert_eq!(
        fs::read_to_string(target.join("a.proto")).unwrap(),
        "package a.v1;\n"
    );
}

#[test]
fn apply_mirrors_nested_layout() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    let target = dir.path().join("out");
    write(dir.path(), "src/deep/nested/d.proto", "package d.v1;\n");

    let engine = Engine::new(config(source, target.clone(), Vec::new()));
    let plan = engine.plan().unwrap();
    engine.apply(plan).unwrap();

    assert!(target.join("deep/nested/d.proto").is_file());
}

#[test]
fn diff_reports_exactly_the_changed_files() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(dir.path(), "src/changed.proto", "package old.v1;\n");
    write(dir.path(), "src/untouched.proto", "package other.v1;\n");

    let engine = Engine::new(config(
        source,
        dir.path().join("out"),
        vec![rule("package", "old.v1", "new.v1")],
    ));
    let plan = engine.plan().unwrap();
    let diffs = plan.diff().unwrap();

    assert_eq!(diffs.len(), 1);
    assert_eq!(diffs[0].path, PathBuf::from("changed.proto"));
    assert!(diffs[0].lines.contains(&DiffLine::Removed("package old.v1;".to_string())));
    assert!(diffs[0].lines.contains(&DiffLine::Added("package new.v1;".to_string())));

    // A file no change record touched keeps its on-disk text verbatim.
    let untouched = plan
        .documents
        .iter()
        .find(|d| d.path.ends_with("untouched.proto"))
        .unwrap();
    assert_eq!(
        untouched.text,
        fs::read_to_string(&untouched.path).unwrap()
    );
}

#[test]
fn changes_are_ordered_rule_first_then_by_path() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(dir.path(), "src/z.proto", "package old.v1;\nservice Old {}\n");
    write(dir.path(), "src/a.proto", "package old.v1;\nservice Old {}\n");

    let engine = Engine::new(config(
        source.clone(),
        dir.path().join("out"),
        vec![
            rule("package", "old.v1", "new.v1"),
            rule("service", "Old", "New"),
        ],
    ));
    let plan = engine.plan().unwrap();

    let files: Vec<_> = plan.changes.iter().map(|c| c.file.clone()).collect();
    assert_eq!(
        files,
        vec![
            source.join("a.proto"),
            source.join("z.proto"),
            source.join("a.proto"),
            source.join("z.proto"),
        ]
    );
    assert!(plan.changes[0].description.contains("package.rename"));
    assert!(plan.changes[2].description.contains("service.rename"));
}

#[test]
fn unknown_rule_kind_fails_before_any_rewrite() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(dir.path(), "src/a.proto", "package a.v1;\n");

    let engine = Engine::new(config(
        source,
        dir.path().join("out"),
        vec![rule("mystery", "a", "b")],
    ));

    assert!(matches!(engine.plan(), Err(ShiftError::Config(_))));
}

#[test]
fn unparseable_file_aborts_planning() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(dir.path(), "src/good.proto", "package a.v1;\n");
    let bad = write(dir.path(), "src/bad.proto", "message M {\n");

    let engine = Engine::new(config(source, dir.path().join("out"), Vec::new()));

    match engine.plan() {
        Err(ShiftError::Load { path, .. }) => assert_eq!(path, bad),
        Err(other) => panic!("expected a load error, got {other}"),
        Ok(_) => panic!("expected a load error, got a plan"),
    }
}

#[test]
fn json_summary_has_the_documented_shape() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(dir.path(), "src/a.proto", "package old.v1;\n");

    let engine = Engine::new(config(
        source,
        dir.path().join("out"),
        vec![rule("package", "old.v1", "new.v1")],
    ));
    let plan = engine.plan().unwrap();

    let mut buffer = Vec::new();
    plan.print_json(&mut buffer).unwrap();
    let summary: serde_json::Value = serde_json::from_slice(&buffer).unwrap();

    assert_eq!(summary["files"], 1);
    assert_eq!(summary["changes"][0]["type"], "transform");
    assert!(summary["changes"][0]["description"]
        .as_str()
        .unwrap()
        .contains("package.rename:old.v1->new.v1"));
}

#[test]
fn planning_twice_yields_identical_text() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("src");
    write(
        dir.path(),
        "src/a.proto",
        "package old.v1;\n\nimport \"old/v1/t.proto\";\n\nservice Old {}\n",
    );

    let make_engine = || {
        Engine::new(config(
            source.clone(),
            dir.path().join("out"),
            vec![
                rule("package", "old.v1", "new.v1"),
                rule("service", "Old", "New"),
            ],
        ))
    };

    let first = make_engine().plan().unwrap();
    let second = make_engine().plan().unwrap();
    assert_eq!(first.documents[0].text, second.documents[0].text);
}
