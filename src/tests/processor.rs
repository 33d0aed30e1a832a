use super::{ProcessingMethod, Processor};
use crate::config::Config;
use crate::error::Error;
use std::io::Write;
use tempfile::NamedTempFile;

const DOCUMENT: &str = "Intro line\n\n---:\nAlpha\nbeta\n---:\n\nGamma\n---:\n";

fn fixture(text: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{text}").unwrap();
    file.flush().unwrap();
    file
}

fn in_memory() -> Processor {
    Processor::new(&Config::default()).unwrap()
}

fn streaming() -> Processor {
    Processor::new(&Config {
        streaming_threshold: 0,
        ..Config::default()
    })
    .unwrap()
}

#[test]
fn test_method_follows_threshold() {
    assert_eq!(ProcessingMethod::for_size(9, 10), ProcessingMethod::InMemory);
    assert_eq!(ProcessingMethod::for_size(10, 10), ProcessingMethod::Streaming);

    let file = fixture(DOCUMENT);
    assert_eq!(
        in_memory().method_for(file.path()).unwrap(),
        ProcessingMethod::InMemory
    );
    assert_eq!(
        streaming().method_for(file.path()).unwrap(),
        ProcessingMethod::Streaming
    );
}

#[test]
fn test_strategies_are_observably_equivalent() {
    let file = fixture(DOCUMENT);
    let (small, large) = (in_memory(), streaming());

    assert_eq!(
        small.read_and_split(file.path()).unwrap(),
        large.read_and_split(file.path()).unwrap()
    );

    let a = small.analyze_file(file.path()).unwrap();
    let b = large.analyze_file(file.path()).unwrap();
    assert_eq!(a.index.sections, b.index.sections);
    assert_eq!(a.index.divider_lines, b.index.divider_lines);
    assert_eq!(a.index.total_lines, b.index.total_lines);
    assert_eq!(a.stats.section_count, b.stats.section_count);
    assert_eq!(a.stats.total_size, b.stats.total_size);
    assert_eq!(a.stats.average_section_size, b.stats.average_section_size);
    assert_eq!(a.stats.processing_method, ProcessingMethod::InMemory);
    assert_eq!(b.stats.processing_method, ProcessingMethod::Streaming);

    for (start, end) in [(1, 1), (3, 5), (8, 50), (40, 41)] {
        assert_eq!(
            small.extract_section(file.path(), start, end).unwrap(),
            large.extract_section(file.path(), start, end).unwrap(),
            "range {start}..={end}"
        );
    }

    let hash = a.index.sections[2].hash.clone();
    assert_eq!(
        small.find_section_by_hash(file.path(), hash.as_str()).unwrap(),
        large.find_section_by_hash(file.path(), hash.as_str()).unwrap()
    );
}

#[test]
fn test_stats_shape() {
    let file = fixture(DOCUMENT);
    let stats = in_memory().get_file_stats(file.path()).unwrap();
    assert_eq!(stats.section_count, 4);
    assert_eq!(stats.total_size, DOCUMENT.len() as u64);
    assert_eq!(stats.average_section_size, DOCUMENT.len() as u64 / 4);
    assert!(stats.last_modified.is_some());
}

#[test]
fn test_empty_file_under_both_strategies() {
    let file = fixture("");
    assert!(in_memory().read_and_split(file.path()).unwrap().is_empty());
    assert!(streaming().read_and_split(file.path()).unwrap().is_empty());
    assert_eq!(in_memory().get_file_stats(file.path()).unwrap().average_section_size, 0);
}

#[test]
fn test_invalid_range_is_rejected_before_io() {
    assert!(matches!(
        in_memory().extract_section(std::path::Path::new("does-not-matter.md"), 3, 2),
        Err(Error::InvalidRange { start: 3, end: 2 })
    ));
}

#[test]
fn test_empty_path_is_invalid_input() {
    assert!(matches!(
        in_memory().read_and_split(std::path::Path::new("")),
        Err(Error::InvalidInput(_))
    ));
}
