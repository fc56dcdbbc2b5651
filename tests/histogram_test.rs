//! Integration tests for letter counting.

use std::io::Write;

use letterfreq::Error;
use letterfreq::histogram::{compute, from_reader};
use letterfreq::model::Histogram;

#[test]
fn counts_are_case_insensitive() {
    let hist = from_reader("AbcABC".as_bytes()).unwrap();
    assert_eq!(hist.count('a'), 2);
    assert_eq!(hist.count('b'), 2);
    assert_eq!(hist.count('c'), 2);
    assert_eq!(hist.total(), 6);
    for letter in 'd'..='z' {
        assert_eq!(hist.count(letter), 0, "letter {letter}");
    }
}

#[test]
fn non_letters_are_ignored() {
    let hist = from_reader("0123456789 !@#$%^&*()\n\t-_=+[]{};:'\",.<>/?`~".as_bytes()).unwrap();
    assert_eq!(hist, Histogram::new());
}

#[test]
fn non_ascii_bytes_are_ignored() {
    let hist = from_reader("é ü ß Z".as_bytes()).unwrap();
    assert_eq!(hist.total(), 1);
    assert_eq!(hist.count('z'), 1);
}

#[test]
fn count_lookup_folds_case() {
    let hist = from_reader("qq".as_bytes()).unwrap();
    assert_eq!(hist.count('Q'), 2);
    assert_eq!(hist.count('7'), 0);
}

#[test]
fn iter_yields_letters_in_order() {
    let hist = from_reader("zya".as_bytes()).unwrap();
    let letters: Vec<char> = hist.iter().map(|(l, _)| l).collect();
    assert_eq!(letters.len(), 26);
    assert_eq!(letters[0], 'a');
    assert_eq!(letters[25], 'z');
    let nonzero: Vec<(char, u32)> = hist.iter().filter(|(_, c)| *c > 0).collect();
    assert_eq!(nonzero, vec![('a', 1), ('y', 1), ('z', 1)]);
}

#[test]
fn compute_reads_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "Hello, World!").unwrap();

    let hist = compute(file.path()).unwrap();
    assert_eq!(hist.count('l'), 3);
    assert_eq!(hist.count('o'), 2);
    assert_eq!(hist.count('h'), 1);
    assert_eq!(hist.total(), 10);
}

#[test]
fn compute_empty_file_is_all_zero() {
    let file = tempfile::NamedTempFile::new().unwrap();
    assert_eq!(compute(file.path()).unwrap(), Histogram::new());
}

#[test]
fn compute_streams_large_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    let chunk: Vec<u8> = (0..1000u32).map(|i| b'a' + (i % 26) as u8).collect();
    for _ in 0..1000 {
        file.write_all(&chunk).unwrap();
    }
    file.flush().unwrap();

    let hist = compute(file.path()).unwrap();
    assert_eq!(hist.total(), 1_000_000);
    // 1000 bytes per chunk: letters a..l appear 39 times, m..z 38 times.
    assert_eq!(hist.count('a'), 39_000);
    assert_eq!(hist.count('z'), 38_000);
}

#[test]
fn compute_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.txt");
    match compute(&missing) {
        Err(Error::Read { path, .. }) => assert_eq!(path, missing),
        other => panic!("expected Read error, got {other:?}"),
    }
}
