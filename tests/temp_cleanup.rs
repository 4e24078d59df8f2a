//! Temporary Storage Cleanup Tests
//!
//! The per-run temporary directory must be gone after every run:
//! - after success
//! - after a split failure (missing or unreadable input)
//! - after a merge failure (unwritable output)
//!
//! Each test points `temp_dir` at a private, initially empty directory and
//! asserts it is empty again afterwards.

use chunkshuf::shuffle::{shuffle_file, ShuffleConfig, ShuffleErrorCode, ShuffleProgress};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// =============================================================================
// Test Utilities
// =============================================================================

fn setup() -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let scratch = temp_dir.path().join("scratch");
    fs::create_dir(&scratch).unwrap();
    (temp_dir, scratch)
}

fn config(scratch: &Path, chunk_size: usize) -> ShuffleConfig {
    ShuffleConfig {
        chunk_size,
        temp_dir: Some(scratch.to_path_buf()),
        seed: Some(7),
    }
}

fn entries(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect()
}

fn write_lines(path: &Path, n: usize) {
    let contents: String = (0..n).map(|i| format!("row {}\n", i)).collect();
    fs::write(path, contents).unwrap();
}

// =============================================================================
// Success Path
// =============================================================================

#[test]
fn test_no_chunks_left_after_success() {
    let (temp_dir, scratch) = setup();
    let input = temp_dir.path().join("in.txt");
    write_lines(&input, 1_000);

    let report = shuffle_file(
        &input,
        &temp_dir.path().join("out.txt"),
        &config(&scratch, 10),
        &ShuffleProgress::new(),
    )
    .unwrap();

    assert_eq!(report.chunks, 100);
    assert!(entries(&scratch).is_empty(), "left behind: {:?}", entries(&scratch));
}

#[test]
fn test_no_chunks_left_after_empty_input() {
    let (temp_dir, scratch) = setup();
    let input = temp_dir.path().join("in.txt");
    fs::write(&input, "").unwrap();

    shuffle_file(
        &input,
        &temp_dir.path().join("out.txt"),
        &config(&scratch, 10),
        &ShuffleProgress::new(),
    )
    .unwrap();

    assert!(entries(&scratch).is_empty());
}

// =============================================================================
// Failure Paths
// =============================================================================

#[test]
fn test_cleanup_after_missing_input() {
    let (temp_dir, scratch) = setup();

    let err = shuffle_file(
        &temp_dir.path().join("absent.txt"),
        &temp_dir.path().join("out.txt"),
        &config(&scratch, 10),
        &ShuffleProgress::new(),
    )
    .unwrap_err();

    assert_eq!(err.code(), ShuffleErrorCode::InputNotFound);
    assert!(entries(&scratch).is_empty());
}

#[test]
fn test_cleanup_after_directory_input() {
    let (temp_dir, scratch) = setup();
    let dir_input = temp_dir.path().join("a_directory");
    fs::create_dir(&dir_input).unwrap();

    let err = shuffle_file(
        &dir_input,
        &temp_dir.path().join("out.txt"),
        &config(&scratch, 10),
        &ShuffleProgress::new(),
    )
    .unwrap_err();

    assert_eq!(err.code(), ShuffleErrorCode::InputNotFound);
    assert!(entries(&scratch).is_empty());
}

/// Chunks are already on disk when the merge fails; they must still go.
#[test]
fn test_cleanup_after_merge_failure() {
    let (temp_dir, scratch) = setup();
    let input = temp_dir.path().join("in.txt");
    write_lines(&input, 100);
    let progress = ShuffleProgress::new();

    let err = shuffle_file(
        &input,
        &temp_dir.path().join("missing_dir").join("out.txt"),
        &config(&scratch, 10),
        &progress,
    )
    .unwrap_err();

    assert_eq!(err.code(), ShuffleErrorCode::IoFailure);
    assert_eq!(progress.snapshot().chunks_created, 10);
    assert!(entries(&scratch).is_empty());
}

#[test]
fn test_invalid_temp_dir_rejected_before_reading_input() {
    let (temp_dir, scratch) = setup();
    let input = temp_dir.path().join("in.txt");
    write_lines(&input, 5);
    let output = temp_dir.path().join("out.txt");

    let err = shuffle_file(
        &input,
        &output,
        &config(&scratch.join("nope"), 10),
        &ShuffleProgress::new(),
    )
    .unwrap_err();

    assert_eq!(err.code(), ShuffleErrorCode::InvalidConfig);
    assert!(!output.exists());
}
