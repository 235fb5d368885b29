//! End-to-end batch passes over a temporary project tree.

use dart_lint_fixer::{
    load_from_str, run, BatchError, BatchOptions, FailurePolicy, RuleSet, WritePolicy,
};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Two matching `.dart` files and one non-matching `.txt` file.
fn setup_project() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("lib/widgets")).unwrap();

    fs::write(
        dir.path().join("lib/main.dart"),
        "void main() {\n  runApp(\n    Center(child: Text('hi')),\n  );\n}\n",
    )
    .unwrap();
    fs::write(
        dir.path().join("lib/widgets/badge.dart"),
        "final shade = Colors.red.withOpacity(0.25);\n",
    )
    .unwrap();
    fs::write(dir.path().join("lib/notes.txt"), "    Spacer()\n").unwrap();

    dir
}

fn read(root: &Path, rel: &str) -> String {
    fs::read_to_string(root.join(rel)).unwrap()
}

#[test]
fn visits_exactly_the_matching_files() {
    let project = setup_project();
    let rules = RuleSet::builtin().unwrap();

    let report = run(project.path(), &rules, &BatchOptions::default()).unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(report.files.len(), 2);
    assert_eq!(
        read(project.path(), "lib/main.dart"),
        "void main() {\n  runApp(\n    const Center(child: const Text('hi')),\n  );\n}\n"
    );
    assert_eq!(
        read(project.path(), "lib/widgets/badge.dart"),
        "final shade = Colors.red.withValues(alpha: 0.25);\n"
    );
    assert_eq!(read(project.path(), "lib/notes.txt"), "    Spacer()\n");
}

#[test]
fn second_pass_changes_nothing() {
    let project = setup_project();
    let rules = RuleSet::builtin().unwrap();

    run(project.path(), &rules, &BatchOptions::default()).unwrap();
    let main_after_first = read(project.path(), "lib/main.dart");

    let report = run(project.path(), &rules, &BatchOptions::default()).unwrap();
    assert_eq!(report.visited, 2);
    assert_eq!(report.changed, 0);
    assert_eq!(read(project.path(), "lib/main.dart"), main_after_first);
}

#[test]
#[cfg(unix)]
fn always_policy_replaces_unchanged_files() {
    use std::os::unix::fs::MetadataExt;

    let project = setup_project();
    let rules = RuleSet::builtin().unwrap();
    run(project.path(), &rules, &BatchOptions::default()).unwrap();

    let path = project.path().join("lib/main.dart");
    let inode_before = fs::metadata(&path).unwrap().ino();

    // Already fixed, but the default policy still writes it back.
    let report = run(project.path(), &rules, &BatchOptions::default()).unwrap();
    assert_eq!(report.written, 2);
    assert_ne!(fs::metadata(&path).unwrap().ino(), inode_before);
}

#[test]
#[cfg(unix)]
fn on_change_policy_leaves_unchanged_files_alone() {
    use std::os::unix::fs::MetadataExt;

    let project = setup_project();
    let rules = RuleSet::builtin().unwrap();
    run(project.path(), &rules, &BatchOptions::default()).unwrap();

    let path = project.path().join("lib/main.dart");
    let inode_before = fs::metadata(&path).unwrap().ino();

    let options = BatchOptions {
        write_policy: WritePolicy::OnChange,
        ..BatchOptions::default()
    };
    let report = run(project.path(), &rules, &options).unwrap();
    assert_eq!(report.written, 0);
    assert_eq!(fs::metadata(&path).unwrap().ino(), inode_before);
}

#[test]
fn custom_rules_run_after_builtins() {
    let project = setup_project();
    let mut rules = RuleSet::builtin().unwrap();
    rules.extend(
        load_from_str(
            r#"
[[rules]]
id = "drop-redundant-const"
lint = "unnecessary_const"
pattern = '(Center\(child: )const '
replacement = '${1}'
"#,
        )
        .unwrap()
        .rules,
    )
    .unwrap();

    run(project.path(), &rules, &BatchOptions::default()).unwrap();

    assert_eq!(
        read(project.path(), "lib/main.dart"),
        "void main() {\n  runApp(\n    const Center(child: Text('hi')),\n  );\n}\n"
    );
}

#[test]
#[cfg(unix)]
fn symlinked_sources_are_rewritten_through_the_link() {
    use std::os::unix::fs::symlink;

    let dir = TempDir::new().unwrap();
    fs::create_dir_all(dir.path().join("lib")).unwrap();
    fs::create_dir_all(dir.path().join("shared")).unwrap();
    fs::write(dir.path().join("shared/w.dart"), "  Text('a')\n").unwrap();
    symlink(dir.path().join("shared/w.dart"), dir.path().join("lib/w.dart")).unwrap();
    symlink(dir.path().join("shared"), dir.path().join("lib/linked")).unwrap();
    let rules = RuleSet::builtin().unwrap();

    let report = run(dir.path(), &rules, &BatchOptions::default()).unwrap();

    assert_eq!(report.visited, 2);
    assert_eq!(read(dir.path(), "shared/w.dart"), "  const Text('a')\n");
    assert!(fs::symlink_metadata(dir.path().join("lib/w.dart"))
        .unwrap()
        .file_type()
        .is_symlink());
}

#[test]
fn unreadable_file_aborts_by_default() {
    let project = setup_project();
    fs::write(project.path().join("lib/broken.dart"), [0xc3, 0x28]).unwrap();
    let rules = RuleSet::builtin().unwrap();

    let err = run(project.path(), &rules, &BatchOptions::default()).unwrap_err();
    assert!(matches!(err, BatchError::FileAccess(_)));
    assert!(err.to_string().contains("broken.dart"));
}

#[test]
fn unreadable_file_is_isolated_when_continuing() {
    let project = setup_project();
    fs::write(project.path().join("lib/broken.dart"), [0xc3, 0x28]).unwrap();
    let rules = RuleSet::builtin().unwrap();
    let options = BatchOptions {
        failure_policy: FailurePolicy::Continue,
        ..BatchOptions::default()
    };

    let report = run(project.path(), &rules, &options).unwrap();
    assert_eq!(report.visited, 3);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(
        read(project.path(), "lib/widgets/badge.dart"),
        "final shade = Colors.red.withValues(alpha: 0.25);\n"
    );
}

#[test]
fn report_serializes_to_json() {
    let project = setup_project();
    let rules = RuleSet::builtin().unwrap();
    let options = BatchOptions {
        dry_run: true,
        ..BatchOptions::default()
    };

    let report = run(project.path(), &rules, &options).unwrap();
    let json: serde_json::Value = serde_json::to_value(&report).unwrap();

    assert_eq!(json["visited"], 2);
    assert_eq!(json["dry_run"], true);
    assert_eq!(json["written"], 0);
    assert_eq!(json["files"][0]["hits"][0]["id"], "const-text");
}
