use refdup::actions::{Executor, ExecutorConfig, FileOutcome};
use refdup::duplicates::{DuplicateFinder, FinderConfig};
use refdup::resolver::{resolve_all, AgePreference, RuleConfig, Verdict};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn build_tree(root: &Path) -> Vec<PathBuf> {
    vec![
        write(root, "docs/report.pdf", b"pdf pdf pdf"),
        write(root, "docs/report copy.pdf", b"pdf pdf pdf"),
        write(root, "music/song.mp3", b"la la la la"),
        write(root, "backup/song.mp3", b"la la la la"),
        write(root, "misc/a.txt", b"abc"),
        write(root, "misc/b.txt", b"abc"),
        write(root, "misc/b.txt~", b"abc"),
        write(root, "lonely.txt", b"no twin here"),
    ]
}

fn dry_run(root: &Path, rules: &RuleConfig) -> (Vec<Verdict>, Vec<PathBuf>) {
    let finder = DuplicateFinder::new(
        FinderConfig::default().with_order_by_age(rules.age_preference().is_active()),
    );
    let (sets, _) = finder.find_duplicates(&[root.to_path_buf()]).unwrap();
    let verdicts = resolve_all(&sets, rules);

    let executor = Executor::new(ExecutorConfig::default().with_dry_run(true));
    let report = executor.execute_all(&verdicts);
    let would_delete = report
        .outcomes
        .into_iter()
        .map(|o| match o {
            FileOutcome::WouldDelete { path, .. } => path,
            other => panic!("Expected WouldDelete, got {:?}", other),
        })
        .collect();
    (verdicts, would_delete)
}

#[test]
fn test_dry_run_never_mutates_tree() {
    let dir = TempDir::new().unwrap();
    let files = build_tree(dir.path());
    let rules = RuleConfig::builder().dry_run(true).build().unwrap();

    let (_, would_delete) = dry_run(dir.path(), &rules);

    assert!(!would_delete.is_empty());
    for file in &files {
        assert!(file.exists(), "dry run removed {}", file.display());
    }
}

#[test]
fn test_dry_run_is_idempotent() {
    let dir = TempDir::new().unwrap();
    build_tree(dir.path());
    let rules = RuleConfig::builder()
        .keep_pattern("/music/")
        .age_preference(AgePreference::KeepOldest)
        .dry_run(true)
        .build()
        .unwrap();

    let (first_verdicts, first_deletes) = dry_run(dir.path(), &rules);
    let (second_verdicts, second_deletes) = dry_run(dir.path(), &rules);

    assert_eq!(first_verdicts, second_verdicts);
    assert_eq!(first_deletes, second_deletes);
}

#[test]
fn test_dry_run_reports_same_paths_a_real_run_deletes() {
    let dir = TempDir::new().unwrap();
    build_tree(dir.path());
    let rules = RuleConfig::builder().keep_pattern("/music/").build().unwrap();

    let (verdicts, mut would_delete) = dry_run(dir.path(), &rules);

    let report = Executor::default().execute_all(&verdicts);
    let mut deleted: Vec<PathBuf> = report
        .outcomes
        .into_iter()
        .filter_map(|o| match o {
            FileOutcome::Deleted { path, .. } => Some(path),
            _ => None,
        })
        .collect();

    would_delete.sort();
    deleted.sort();
    assert_eq!(would_delete, deleted);
    for path in &deleted {
        assert!(!path.exists());
    }
}
