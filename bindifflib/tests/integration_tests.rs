#![allow(clippy::expect_used)]

use bindifflib::{
    BinDiffError, ByteSource, DiffMap, DiffSession, MappedFile, MemorySource, Side, Verdict,
    engine,
};
use rand::Rng;
use std::io::Write;
use tempfile::NamedTempFile;

fn temp_file_with(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    file.write_all(bytes).expect("Failed to write temp file");
    file.flush().expect("Failed to flush temp file");
    file
}

fn random_bytes(len: usize) -> Vec<u8> {
    rand::rng()
        .sample_iter(rand::distr::StandardUniform)
        .take(len)
        .collect()
}

#[test]
fn test_mapped_file_reads_contents() {
    // Arrange
    let file = temp_file_with(&[0xDE, 0xAD, 0xBE, 0xEF]);

    // Act
    let mapped = MappedFile::open(file.path()).expect("Failed to map file");

    // Assert
    assert_eq!(mapped.len(), 4);
    assert_eq!(mapped.read(1, 2).ok(), Some(&[0xAD, 0xBE][..]));
    assert!(mapped.byte_at(4).is_err());
}

#[test]
fn test_mapped_empty_file() {
    // Arrange
    let file = temp_file_with(&[]);

    // Act
    let mapped = MappedFile::open(file.path()).expect("Failed to map empty file");

    // Assert
    assert!(mapped.is_empty());
    assert!(matches!(
        mapped.byte_at(0),
        Err(BinDiffError::OutOfBoundsRead { offset: 0, length: 0 })
    ));
}

#[test]
fn test_open_missing_file_keeps_previous_source() {
    // Arrange
    let file = temp_file_with(b"previous");
    let mut session: DiffSession<MappedFile> = DiffSession::default();
    session
        .open(Side::Left, file.path())
        .expect("Failed to open file");

    // Act
    let res = session.open(Side::Left, "this/file/does/not/exist.bin");

    // Assert
    assert!(matches!(res, Err(BinDiffError::SourceUnavailable { .. })));
    let source = session.source(Side::Left).expect("Source got dropped");
    assert_eq!(source.path(), file.path());
    assert_eq!(session.view(Side::Left).source_len(), 8);
}

#[test]
fn test_identical_files_match_everywhere() {
    // Arrange
    let bytes = random_bytes(1000);
    let file_a = temp_file_with(&bytes);
    let file_b = temp_file_with(&bytes);

    let mut session: DiffSession<MappedFile> = DiffSession::default();
    session.open(Side::Left, file_a.path()).expect("open A");
    session.open(Side::Right, file_b.path()).expect("open B");
    let _ = session.resize(Side::Left, 600.0, 2000.0);

    // Act
    let window = session.recompute().expect("Nothing was recomputed");

    // Assert
    assert_eq!(window, 0..1000);
    for offset in 0..1000 {
        assert_eq!(session.verdict_at(offset), Some(Verdict::Match));
    }
}

#[test]
fn test_prefix_file_tail_is_out_of_range() {
    // Arrange
    let bytes: Vec<u8> = (0..15).collect();
    let file_a = temp_file_with(&bytes[..10]);
    let file_b = temp_file_with(&bytes);

    let mut session: DiffSession<MappedFile> = DiffSession::default();
    session.open(Side::Left, file_a.path()).expect("open A");
    session.open(Side::Right, file_b.path()).expect("open B");

    // Act
    let _ = session.resize(Side::Left, 600.0, 400.0);

    // Assert
    for offset in 0..10 {
        assert_eq!(session.verdict_at(offset), Some(Verdict::Match));
    }
    for offset in 10..15 {
        assert_eq!(session.verdict_at(offset), Some(Verdict::OutOfRange));
    }
    assert_eq!(session.verdict_at(15), None);
}

#[test]
fn test_windowed_result_equals_full_diff() {
    // Arrange
    let a = MemorySource::from(random_bytes(4096));
    let mut data_b = random_bytes(4000);
    data_b[..2048].copy_from_slice(&a.read(0, 2048).expect("read")[..]);
    let b = MemorySource::from(data_b);

    let mut full = DiffMap::allocate(4096).expect("alloc");
    engine::diff_range(&a, &b, 0..4096, &mut full).expect("full diff");

    // Act: a few scattered windows into a fresh map
    let mut windowed = DiffMap::allocate(4096).expect("alloc");
    let mut covered = Vec::new();
    for (addend_a, addend_b) in [(0, 0), (100, 0), (1990, 2000), (4000, 64)] {
        let window = engine::diff_window(addend_a, addend_b, 64);
        covered.push(engine::diff_range(&a, &b, window, &mut windowed).expect("window diff"));
    }

    // Assert
    assert_eq!(covered[1], 100..164);
    assert_eq!(covered[3], 4000..4064);
    for range in covered {
        for offset in range {
            assert_eq!(windowed.get(offset), full.get(offset), "offset {offset}");
        }
    }
}

#[test]
fn test_far_apart_views_skip_the_gap() {
    // Arrange
    let mut session = DiffSession::default();
    session
        .load(Side::Left, MemorySource::from(vec![0u8; 8192]))
        .expect("load A");
    session
        .load(Side::Right, MemorySource::from(vec![1u8; 8192]))
        .expect("load B");
    session.set_link_scrolling(false);
    for side in Side::BOTH {
        let _ = session.resize(side, 600.0, 164.0);
    }

    // Act
    let _ = session.scroll_to_offset(Side::Left, 4000);

    // Assert: left shows 4000..4160, right still 0..160, nothing computed in between
    assert_eq!(session.verdict_at(4000), Some(Verdict::Mismatch));
    assert_eq!(session.verdict_at(2000), None);
    // Verdicts of the earlier window are kept
    assert_eq!(session.verdict_at(0), Some(Verdict::Mismatch));
}

#[test]
fn test_unload_and_reload() {
    // Arrange
    let file_a = temp_file_with(b"abcd");
    let file_b = temp_file_with(b"abXd");
    let mut session: DiffSession<MappedFile> = DiffSession::default();
    session.open(Side::Left, file_a.path()).expect("open A");
    session.open(Side::Right, file_b.path()).expect("open B");
    let _ = session.resize(Side::Right, 600.0, 400.0);
    assert_eq!(session.verdict_at(2), Some(Verdict::Mismatch));

    // Act
    let removed = session.unload(Side::Right).expect("nothing removed");
    let not_diffing = !session.is_diffing();
    session.open(Side::Right, file_a.path()).expect("reopen");

    // Assert
    assert_eq!(removed.path(), file_b.path());
    assert!(not_diffing);
    assert!(session.is_diffing());
    assert_eq!(session.verdict_at(2), Some(Verdict::Match));
}
