use refdup::duplicates::DuplicateFinder;
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

#[test]
fn test_duplicates_across_roots() {
    let left = TempDir::new().unwrap();
    let right = TempDir::new().unwrap();
    write(left.path(), "photo.jpg", b"pixels");
    write(right.path(), "photo.jpg", b"pixels");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder
        .find_duplicates(&[left.path().to_path_buf(), right.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.roots_scanned, 2);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
}

#[test]
fn test_overlapping_roots_count_each_file_once() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a.txt", b"dup");
    write(dir.path(), "nested/b.txt", b"dup");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder
        .find_duplicates(&[dir.path().to_path_buf(), dir.path().join("nested")])
        .unwrap();

    assert_eq!(summary.total_files, 2);
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].len(), 2);
}

#[test]
fn test_same_root_twice_finds_nothing_new() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "only.txt", b"single");

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder
        .find_duplicates(&[dir.path().to_path_buf(), dir.path().to_path_buf()])
        .unwrap();

    assert!(sets.is_empty());
}

#[test]
fn test_invalid_root_is_skipped_when_another_is_valid() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "x", b"same");
    write(dir.path(), "y", b"same");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder
        .find_duplicates(&[dir.path().join("does-not-exist"), dir.path().to_path_buf()])
        .unwrap();

    assert_eq!(summary.roots_scanned, 1);
    assert_eq!(sets.len(), 1);
}

#[cfg(unix)]
#[test]
fn test_symlinks_not_followed_by_default() {
    let dir = TempDir::new().unwrap();
    let target = write(dir.path(), "real.txt", b"content");
    std::os::unix::fs::symlink(&target, dir.path().join("link.txt")).unwrap();

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(summary.total_files, 1);
    assert!(sets.is_empty());
}
