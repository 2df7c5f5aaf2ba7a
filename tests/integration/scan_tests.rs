use refdup::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use std::collections::HashSet;
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

fn member_set(paths: &[PathBuf]) -> HashSet<PathBuf> {
    paths.iter().cloned().collect()
}

#[test]
fn test_finds_identical_files_across_subdirectories() {
    let dir = TempDir::new().unwrap();
    let a = write(dir.path(), "a.txt", b"identical content");
    let b = write(dir.path(), "sub/b.txt", b"identical content");
    let c = write(dir.path(), "sub/deeper/c.txt", b"identical content");
    write(dir.path(), "unique.txt", b"something else entirely");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(sets.len(), 1);
    let members: Vec<PathBuf> = sets[0].members().iter().map(|m| m.path.clone()).collect();
    assert_eq!(member_set(&members), member_set(&[a, b, c]));
    assert_eq!(summary.total_files, 4);
    assert_eq!(summary.duplicate_sets, 1);
    assert_eq!(summary.duplicate_files, 2);
    assert_eq!(summary.reclaimable_space, 2 * 17);
    assert!(summary.scan_errors.is_empty());
}

#[test]
fn test_same_size_different_content_not_grouped() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "x.bin", b"aaaa");
    write(dir.path(), "y.bin", b"bbbb");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.hashed_files, 2);
}

#[test]
fn test_different_sizes_are_never_hashed() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "one", b"1");
    write(dir.path(), "two", b"22");
    write(dir.path(), "three", b"333");

    let finder = DuplicateFinder::with_defaults();
    let (sets, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.hashed_files, 0);
}

#[test]
fn test_min_size_excludes_small_duplicates() {
    let dir = TempDir::new().unwrap();
    let small = vec![b's'; 500];
    let large = vec![b'L'; 2000];
    write(dir.path(), "small1", &small);
    write(dir.path(), "small2", &small);
    let l1 = write(dir.path(), "large1", &large);
    let l2 = write(dir.path(), "large2", &large);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(Some(1000)));
    let (sets, summary) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(sets.len(), 1);
    let members: Vec<PathBuf> = sets[0].members().iter().map(|m| m.path.clone()).collect();
    assert_eq!(member_set(&members), member_set(&[l1, l2]));
    assert_eq!(summary.below_min_size, 2);
}

#[test]
fn test_min_size_is_inclusive() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "a", &[7u8; 1000]);
    write(dir.path(), "b", &[7u8; 1000]);

    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(Some(1000)));
    let (sets, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    assert_eq!(sets.len(), 1);
}

#[test]
fn test_empty_files_form_a_set() {
    let dir = TempDir::new().unwrap();
    write(dir.path(), "empty1", b"");
    write(dir.path(), "empty2", b"");

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size(), 0);
    assert_eq!(sets[0].wasted_space(), 0);
}

#[test]
fn test_multi_block_files_compared_fully() {
    let dir = TempDir::new().unwrap();
    let mut a = vec![0u8; 3 * 4096 + 17];
    let b = a.clone();
    write(dir.path(), "b", &b);
    *a.last_mut().unwrap() = 1;
    write(dir.path(), "a", &a);

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();
    assert!(sets.is_empty());
}

#[test]
fn test_sets_are_disjoint() {
    let dir = TempDir::new().unwrap();
    for i in 0..3 {
        write(dir.path(), &format!("a{}", i), b"alpha");
        write(dir.path(), &format!("b{}", i), b"bravo");
        write(dir.path(), &format!("c{}", i), b"charlie!");
    }

    let finder = DuplicateFinder::with_defaults();
    let (sets, _) = finder.find_duplicates(&[dir.path().to_path_buf()]).unwrap();

    assert_eq!(sets.len(), 3);
    let mut seen = HashSet::new();
    for set in &sets {
        assert_eq!(set.len(), 3);
        for member in set.members() {
            assert!(seen.insert(member.path.clone()), "path in two sets");
        }
    }
}

#[test]
fn test_no_valid_roots_is_error() {
    let dir = TempDir::new().unwrap();
    let file = write(dir.path(), "not_a_dir", b"x");

    let finder = DuplicateFinder::with_defaults();
    let result = finder.find_duplicates(&[dir.path().join("missing"), file]);

    assert!(matches!(result, Err(FinderError::NoValidRoots(2))));
}

#[test]
fn test_scan_output_is_deterministic() {
    let dir = TempDir::new().unwrap();
    for i in 0..5 {
        write(dir.path(), &format!("d{}/same.txt", i), b"same bytes");
        write(dir.path(), &format!("d{}/other.txt", i), b"other bytes!");
    }

    let finder = DuplicateFinder::with_defaults();
    let roots = vec![dir.path().to_path_buf()];
    let (first, _) = finder.find_duplicates(&roots).unwrap();
    let (second, _) = finder.find_duplicates(&roots).unwrap();

    assert_eq!(first, second);
}
