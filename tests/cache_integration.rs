use codemask::cache::{ChangeState, IncrementalCache, CACHE_FILE_NAME};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Helper to create a test file with content
fn create_test_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let file_path = dir.join(name);
    fs::write(&file_path, content).unwrap();
    file_path
}

fn project_with_two_files() -> (TempDir, Vec<PathBuf>) {
    let dir = TempDir::new().unwrap();
    let a = create_test_file(dir.path(), "Alpha.m", "@interface Alpha : NSObject\n@end\n");
    let b = create_test_file(dir.path(), "Beta.swift", "class Beta {\n}\n");
    (dir, vec![a, b])
}

#[test]
fn full_lifecycle_persists_a_single_snapshot_document() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (to_process, _) = cache.get_files_to_process(&files, false);
    assert_eq!(to_process.len(), 2);

    cache.finalize(&to_process, &[]).unwrap();

    let cache_file = dir.path().join(CACHE_FILE_NAME);
    assert!(cache_file.exists());

    // The document must round-trip through serde as-is.
    let raw = fs::read_to_string(&cache_file).unwrap();
    let decoded: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(decoded["total_files"], 2);
    assert!(decoded["cache_version"].is_number());
    assert!(decoded["file_metadata"].is_object() || decoded["file_metadata"].is_array());
}

#[test]
fn classification_is_idempotent_on_an_unmodified_tree() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (first, _) = cache.get_files_to_process(&files, false);
    cache.finalize(&first, &[]).unwrap();

    // Two successive classifications with no edits in between.
    for _ in 0..2 {
        let reloaded = IncrementalCache::load_or_new(dir.path());
        let (to_process, changes) = reloaded.get_files_to_process(&files, false);
        assert!(to_process.is_empty());
        assert_eq!(changes.unchanged.len(), files.len());
        assert!(changes.added.is_empty());
        assert!(changes.modified.is_empty());
        assert!(changes.deleted.is_empty());
    }
}

#[test]
fn edit_add_delete_cycle_classifies_each_state() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (first, _) = cache.get_files_to_process(&files, false);
    cache.finalize(&first, &[]).unwrap();

    // Edit one, delete one, add one.
    fs::write(&files[0], "@interface Alpha : UIView\n@end\n").unwrap();
    fs::remove_file(&files[1]).unwrap();
    let c = create_test_file(dir.path(), "Gamma.m", "@interface Gamma : NSObject\n@end\n");

    let current = vec![files[0].clone(), c.clone()];
    let reloaded = IncrementalCache::load_or_new(dir.path());
    let (to_process, changes) = reloaded.get_files_to_process(&current, false);

    assert_eq!(changes.modified, vec![files[0].clone()]);
    assert_eq!(changes.added, vec![c.clone()]);
    assert_eq!(changes.deleted, vec![files[1].clone()]);
    assert!(changes.unchanged.is_empty());
    assert_eq!(to_process.len(), 2);
    assert!(to_process.contains(&files[0]));
    assert!(to_process.contains(&c));
}

#[test]
fn finalize_after_deletion_shrinks_the_snapshot() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (first, _) = cache.get_files_to_process(&files, false);
    cache.finalize(&first, &[]).unwrap();

    fs::remove_file(&files[1]).unwrap();
    let current = vec![files[0].clone()];
    let mut reloaded = IncrementalCache::load_or_new(dir.path());
    let (to_process, changes) = reloaded.get_files_to_process(&current, false);
    reloaded.finalize(&to_process, &changes.deleted).unwrap();

    let third = IncrementalCache::load_or_new(dir.path());
    assert_eq!(third.total_files, 1);
    assert!(third.file_metadata.contains_key(&files[0]));
    assert!(!third.file_metadata.contains_key(&files[1]));
}

#[test]
fn crashed_run_leaves_the_previous_snapshot_intact() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (first, _) = cache.get_files_to_process(&files, false);
    cache.finalize(&first, &[]).unwrap();
    let before = fs::read_to_string(dir.path().join(CACHE_FILE_NAME)).unwrap();

    // A run that classifies but never reaches finalize must not touch the
    // document on disk.
    fs::write(&files[0], "changed").unwrap();
    let reloaded = IncrementalCache::load_or_new(dir.path());
    let (_, _) = reloaded.get_files_to_process(&files, false);
    drop(reloaded);

    let after = fs::read_to_string(dir.path().join(CACHE_FILE_NAME)).unwrap();
    assert_eq!(before, after);
}

#[test]
fn metadata_entries_record_hash_size_and_state() {
    let (dir, files) = project_with_two_files();

    let mut cache = IncrementalCache::load_or_new(dir.path());
    let (first, _) = cache.get_files_to_process(&files, false);
    cache.finalize(&first, &[]).unwrap();

    let entry = cache.file_metadata.get(&files[0]).unwrap();
    assert_eq!(entry.path, files[0]);
    assert_eq!(entry.content_hash.len(), 64);
    assert!(entry.size > 0);
    assert_eq!(entry.change_state, ChangeState::Unchanged);
}
