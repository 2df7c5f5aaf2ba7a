use filetime::{set_file_mtime, FileTime};
use refdup::actions::{Executor, ExecutorConfig};
use refdup::duplicates::{DuplicateFinder, DuplicateSet, FinderConfig};
use refdup::resolver::{resolve, resolve_all, Action, AgePreference, Outcome, RuleConfig};
use refdup::scanner::FileRecord;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread::sleep;
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

fn write(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

fn set_at(members: &[(&str, u64)]) -> DuplicateSet {
    let records = members
        .iter()
        .map(|(path, secs)| {
            FileRecord::new(
                PathBuf::from(path),
                64,
                SystemTime::UNIX_EPOCH + Duration::from_secs(*secs),
            )
        })
        .collect();
    DuplicateSet::new([9; 32], 64, records).unwrap()
}

fn scan_and_apply(root: &Path, rules: &RuleConfig) -> Vec<refdup::resolver::Verdict> {
    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(rules.min_size())
            .with_order_by_age(rules.age_preference().is_active()),
    );
    let (sets, _) = finder.find_duplicates(&[root.to_path_buf()]).unwrap();
    let verdicts = resolve_all(&sets, rules);
    let executor = Executor::new(ExecutorConfig::default().with_dry_run(rules.dry_run()));
    let report = executor.execute_all(&verdicts);
    assert!(report.all_succeeded());
    verdicts
}

#[test]
fn test_copy_named_file_deleted_by_default() {
    let verdict = resolve(
        &set_at(&[("a.txt", 1), ("a copy.txt", 2)]),
        &RuleConfig::builder().build().unwrap(),
    );

    assert_eq!(verdict.delete_paths(), vec![Path::new("a copy.txt")]);
    assert_eq!(verdict.keep_paths(), vec![Path::new("a.txt")]);
}

#[test]
fn test_keep_oldest_when_nothing_matches() {
    let rules = RuleConfig::builder()
        .age_preference(AgePreference::KeepOldest)
        .build()
        .unwrap();
    let verdict = resolve(&set_at(&[("x.bin", 1), ("y.bin", 2), ("z.bin", 3)]), &rules);

    assert_eq!(verdict.keep_paths(), vec![Path::new("x.bin")]);
    assert_eq!(
        verdict.delete_paths(),
        vec![Path::new("y.bin"), Path::new("z.bin")]
    );
}

#[test]
fn test_all_members_matching_delete_are_kept() {
    let rules = RuleConfig::builder().delete_pattern(".*").build().unwrap();
    let verdict = resolve(&set_at(&[("f1", 1), ("f2", 2)]), &rules);

    assert_eq!(verdict.outcome(), Outcome::AllMatchedDelete);
    assert!(verdict.delete_paths().is_empty());
}

#[test]
fn test_no_rules_no_age_leaves_set_alone() {
    let verdict = resolve(
        &set_at(&[("report.pdf", 1), ("report (1).pdf", 2)]),
        &RuleConfig::builder().build().unwrap(),
    );

    assert!(verdict.is_undecided());
    assert!(verdict
        .decisions()
        .iter()
        .all(|d| d.action == Action::Undecided));
}

#[test]
fn test_user_delete_pattern_resolves_numbered_copy() {
    let rules = RuleConfig::builder().delete_pattern(r" \(1\)").build().unwrap();
    let verdict = resolve(&set_at(&[("report.pdf", 1), ("report (1).pdf", 2)]), &rules);

    assert_eq!(verdict.outcome(), Outcome::Resolved);
    assert_eq!(verdict.delete_paths(), vec![Path::new("report (1).pdf")]);
}

#[test]
fn test_end_to_end_default_rules_remove_copy() {
    let dir = TempDir::new().unwrap();
    let original = write(dir.path(), "notes.txt", b"meeting notes");
    let copy = write(dir.path(), "notes copy.txt", b"meeting notes");
    let backup = write(dir.path(), "notes.txt~", b"meeting notes");

    let verdicts = scan_and_apply(dir.path(), &RuleConfig::builder().build().unwrap());

    assert_eq!(verdicts.len(), 1);
    assert!(original.exists());
    assert!(!copy.exists());
    assert!(!backup.exists());
}

#[test]
fn test_end_to_end_keep_pattern_picks_survivor() {
    let dir = TempDir::new().unwrap();
    let photo = write(dir.path(), "photos/img.jpg", b"jpeg bytes");
    let inbox = write(dir.path(), "inbox/img.jpg", b"jpeg bytes");
    let tmp = write(dir.path(), "tmp/img.jpg", b"jpeg bytes");

    let rules = RuleConfig::builder().keep_pattern("/photos/").build().unwrap();
    scan_and_apply(dir.path(), &rules);

    assert!(photo.exists());
    assert!(!inbox.exists());
    assert!(!tmp.exists());
}

#[test]
fn test_end_to_end_keep_newest_with_timestamps() {
    let dir = TempDir::new().unwrap();
    let names = ["first.dat", "second.dat", "third.dat"];
    let mut paths = Vec::new();
    for (i, name) in names.iter().enumerate() {
        let path = write(dir.path(), name, b"payload");
        set_file_mtime(&path, FileTime::from_unix_time(1_000_000 + i as i64 * 1000, 0)).unwrap();
        paths.push(path);
        sleep(Duration::from_millis(20));
    }

    let rules = RuleConfig::builder()
        .age_preference(AgePreference::KeepNewest)
        .build()
        .unwrap();
    let verdicts = scan_and_apply(dir.path(), &rules);

    assert_eq!(verdicts.len(), 1);
    assert!(!paths[0].exists());
    assert!(!paths[1].exists());
    assert!(paths[2].exists());
}

#[test]
fn test_end_to_end_remainder_undecided_touches_survivors() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a/data.bin", b"0123456789");
    let b = write(dir.path(), "b/data.bin", b"0123456789");
    let copy = write(dir.path(), "a/data copy.bin", b"0123456789");

    let rules = RuleConfig::builder()
        .age_preference(AgePreference::KeepOldest)
        .build()
        .unwrap();
    let verdicts = scan_and_apply(dir.path(), &rules);

    assert_eq!(verdicts[0].outcome(), Outcome::RemainderUndecided);
    assert!(a.exists());
    assert!(b.exists());
    assert!(!copy.exists());
}

#[test]
fn test_min_size_scenario_leaves_small_pair() {
    let dir = TempDir::new().unwrap();
    let small1 = write(dir.path(), "small copy.txt", &[1u8; 500]);
    let small2 = write(dir.path(), "small.txt", &[1u8; 500]);
    let large1 = write(dir.path(), "large.txt", &[2u8; 2000]);
    let large2 = write(dir.path(), "large copy.txt", &[2u8; 2000]);

    let rules = RuleConfig::builder().min_size(Some(1000)).build().unwrap();
    let verdicts = scan_and_apply(dir.path(), &rules);

    assert_eq!(verdicts.len(), 1);
    assert!(small1.exists() && small2.exists());
    assert!(large1.exists());
    assert!(!large2.exists());
}
