//! Pipeline integration tests over a mock engine.
//!
//! The mock combines clips by byte concatenation, which keeps the pipeline
//! properties (ordering, idempotency, cleanup, isolation) observable without
//! real media tools installed.

use clipweld::combine::{CombineError, CombineOptions, CombineOutcome, DirectoryCombiner};
use clipweld::walk::{DirOutcome, TreeWalker};
use clipweld_av::{Error as EngineError, MediaCombineEngine};
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

/// Clip contents the mock refuses to decode.
const POISON: &str = "unreadable";

struct MockEngine;

struct MockClip {
    bytes: Vec<u8>,
}

impl MediaCombineEngine for MockEngine {
    type Clip = MockClip;
    type Combined = Vec<u8>;

    fn open(&self, path: &Path) -> Result<MockClip, EngineError> {
        let bytes = fs::read(path)?;
        if bytes == POISON.as_bytes() {
            return Err(EngineError::decode(path, "corrupt stream"));
        }
        Ok(MockClip { bytes })
    }

    fn concatenate(&self, clips: Vec<MockClip>) -> Result<Vec<u8>, EngineError> {
        Ok(clips.into_iter().flat_map(|c| c.bytes).collect())
    }

    fn write(&self, combined: Vec<u8>, dest: &Path) -> Result<(), EngineError> {
        fs::write(dest, combined)?;
        Ok(())
    }
}

/// An engine whose write step always fails, for failure-path coverage.
struct WriteFailEngine;

impl MediaCombineEngine for WriteFailEngine {
    type Clip = ();
    type Combined = ();

    fn open(&self, _path: &Path) -> Result<(), EngineError> {
        Ok(())
    }

    fn concatenate(&self, _clips: Vec<()>) -> Result<(), EngineError> {
        Ok(())
    }

    fn write(&self, _combined: (), _dest: &Path) -> Result<(), EngineError> {
        Err(EngineError::encode("simulated write failure"))
    }
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    fs::write(dir.join(name), contents).unwrap();
}

fn tree() -> TempDir {
    tempdir().unwrap()
}

fn assert_no_staging_anywhere(root: &Path) {
    for entry in walkdir::WalkDir::new(root) {
        let entry = entry.unwrap();
        assert_ne!(
            entry.file_name().to_str(),
            Some("temp_combiner"),
            "staging residue at {:?}",
            entry.path()
        );
    }
}

#[test]
fn combines_in_lexicographic_order() {
    let root = tree();
    // Written out of order on purpose; combination must follow name order.
    write_file(root.path(), "b.mp4", "B");
    write_file(root.path(), "a.mp4", "A");
    write_file(root.path(), "c.mp4", "C");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let outcome = combiner.combine_directory(root.path()).unwrap();

    assert_eq!(outcome, CombineOutcome::Combined { segments: 3 });
    assert_eq!(
        fs::read_to_string(root.path().join("combined.mp4")).unwrap(),
        "ABC"
    );
    // Originals stay in place.
    for name in ["a.mp4", "b.mp4", "c.mp4"] {
        assert!(root.path().join(name).exists());
    }
    assert_no_staging_anywhere(root.path());
}

#[test]
fn marker_makes_second_run_a_no_op() {
    let root = tree();
    write_file(root.path(), "a.mp4", "A");
    write_file(root.path(), "b.mp4", "B");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());

    let first = combiner.combine_directory(root.path()).unwrap();
    assert_eq!(first, CombineOutcome::Combined { segments: 2 });
    let combined_after_first = fs::read(root.path().join("combined.mp4")).unwrap();

    let second = combiner.combine_directory(root.path()).unwrap();
    assert_eq!(second, CombineOutcome::AlreadyCombined);
    assert_eq!(
        fs::read(root.path().join("combined.mp4")).unwrap(),
        combined_after_first
    );
}

#[test]
fn marker_detection_is_case_insensitive() {
    let root = tree();
    write_file(root.path(), "Combined.MP4", "old output");
    write_file(root.path(), "a.mp4", "A");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());

    let outcome = combiner.combine_directory(root.path()).unwrap();
    assert_eq!(outcome, CombineOutcome::AlreadyCombined);
    assert_eq!(
        fs::read_to_string(root.path().join("Combined.MP4")).unwrap(),
        "old output"
    );
}

#[test]
fn empty_directory_is_left_untouched() {
    let root = tree();
    write_file(root.path(), "notes.txt", "not media");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());

    let outcome = combiner.combine_directory(root.path()).unwrap();
    assert_eq!(outcome, CombineOutcome::NoMediaFiles);
    assert!(!root.path().join("combined.mp4").exists());
    assert!(!root.path().join("temp_combiner").exists());
}

#[test]
fn extension_matching_is_case_insensitive() {
    let root = tree();
    write_file(root.path(), "a.MP4", "A");
    write_file(root.path(), "b.Mp4", "B");
    write_file(root.path(), "skip.avi", "X");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let outcome = combiner.combine_directory(root.path()).unwrap();

    assert_eq!(outcome, CombineOutcome::Combined { segments: 2 });
    assert_eq!(
        fs::read_to_string(root.path().join("combined.mp4")).unwrap(),
        "AB"
    );
}

#[test]
fn colliding_sanitized_names_both_survive() {
    let root = tree();
    // "a b.mp4" sanitizes to "a-b.mp4", which the second file already uses.
    // Space sorts before hyphen, so "a b.mp4" is the first segment.
    write_file(root.path(), "a b.mp4", "1");
    write_file(root.path(), "a-b.mp4", "2");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let outcome = combiner.combine_directory(root.path()).unwrap();

    assert_eq!(outcome, CombineOutcome::Combined { segments: 2 });
    assert_eq!(
        fs::read_to_string(root.path().join("combined.mp4")).unwrap(),
        "12"
    );
}

#[test]
fn engine_failure_leaves_source_directory_unchanged() {
    let root = tree();
    write_file(root.path(), "a.mp4", "A");

    let engine = WriteFailEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());

    let err = combiner.combine_directory(root.path()).unwrap_err();
    assert!(matches!(err, CombineError::Engine(_)));

    assert!(!root.path().join("combined.mp4").exists());
    assert!(!root.path().join("temp_combiner").exists());
    assert_eq!(fs::read_to_string(root.path().join("a.mp4")).unwrap(), "A");
}

#[test]
fn batch_combines_nested_tree_including_root() {
    let root = tree();
    write_file(root.path(), "r1.mp4", "R");
    let nested = root.path().join("season one").join("disc two");
    fs::create_dir_all(&nested).unwrap();
    write_file(&nested, "02.mp4", "2");
    write_file(&nested, "01.mp4", "1");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let walker = TreeWalker::new(&combiner);
    let report = walker.run(root.path()).unwrap();

    assert_eq!(report.combined(), 2);
    assert_eq!(report.failed(), 0);
    assert_eq!(
        fs::read_to_string(root.path().join("combined.mp4")).unwrap(),
        "R"
    );
    assert_eq!(fs::read_to_string(nested.join("combined.mp4")).unwrap(), "12");
    assert_no_staging_anywhere(root.path());
}

#[test]
fn batch_rerun_skips_everything() {
    let root = tree();
    let sub = root.path().join("sub");
    fs::create_dir(&sub).unwrap();
    write_file(&sub, "a.mp4", "A");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let walker = TreeWalker::new(&combiner);

    let first = walker.run(root.path()).unwrap();
    assert_eq!(first.combined(), 1);

    let second = walker.run(root.path()).unwrap();
    assert_eq!(second.combined(), 0);
    assert_eq!(second.failed(), 0);
    assert!(second
        .outcomes
        .iter()
        .any(|(dir, o)| dir == &sub && matches!(o, DirOutcome::AlreadyCombined)));
}

#[test]
fn failing_directory_does_not_abort_the_batch() {
    let root = tree();
    let good = root.path().join("x");
    let bad = root.path().join("y");
    fs::create_dir(&good).unwrap();
    fs::create_dir(&bad).unwrap();
    write_file(&good, "a.mp4", "A");
    write_file(&bad, "broken.mp4", POISON);

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let walker = TreeWalker::new(&combiner);
    let report = walker.run(root.path()).unwrap();

    assert_eq!(report.combined(), 1);
    assert_eq!(report.failed(), 1);
    assert!(report.has_failures());

    assert!(good.join("combined.mp4").exists());
    assert!(!bad.join("combined.mp4").exists());
    assert!(bad.join("broken.mp4").exists());
    assert_no_staging_anywhere(root.path());
}

#[test]
fn leftover_staging_directory_is_not_a_source() {
    let root = tree();
    write_file(root.path(), "a.mp4", "A");
    // Residue of an interrupted run: a stray staged copy.
    let leftover = root.path().join("temp_combiner");
    fs::create_dir(&leftover).unwrap();
    write_file(&leftover, "stray.mp4", "STRAY");

    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let walker = TreeWalker::new(&combiner);
    let report = walker.run(root.path()).unwrap();

    // Only the root is visited; the stray copy never reaches the output.
    assert_eq!(report.outcomes.len(), 1);
    assert_eq!(
        fs::read_to_string(root.path().join("combined.mp4")).unwrap(),
        "A"
    );
    assert!(!leftover.exists());
}

#[test]
fn missing_root_is_fatal() {
    let engine = MockEngine;
    let combiner = DirectoryCombiner::new(&engine, CombineOptions::default());
    let walker = TreeWalker::new(&combiner);

    assert!(walker.run(Path::new("/no/such/root")).is_err());
}
