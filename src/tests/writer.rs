use super::{SectionWriter, SkipReason, WriteOptions, WriteStatus, WriteSummary};
use crate::config::Config;
use crate::divider::Divider;
use crate::hasher::ContentHasher;
use crate::splitter::split;
use crate::timestamp::{self, Zone};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DOCUMENT: &str = "Intro\n---:\nAlpha\n---:\nBeta\n";

fn options(dir: &Path) -> WriteOptions {
    WriteOptions {
        zone: Zone::Utc,
        ..WriteOptions::from_config(&Config::default(), Path::new("notes.md"), dir).unwrap()
    }
}

fn hashes(text: &str) -> Vec<String> {
    let hasher = ContentHasher::default();
    split(text)
        .iter()
        .map(|s| s.hash(&hasher).as_str().to_string())
        .collect()
}

fn read(dir: &Path, name: &str) -> String {
    fs::read_to_string(dir.join(name)).unwrap()
}

#[test]
fn test_writes_anchor_and_hash_named_sections() {
    let dir = tempdir().unwrap();
    let results = SectionWriter::default()
        .write_sections(&split(DOCUMENT), &options(dir.path()))
        .unwrap();
    let h = hashes(DOCUMENT);

    assert_eq!(results.len(), 3);
    assert!(results[0].is_anchor);
    assert_eq!(results[0].index, Some(0));
    assert_eq!(results[0].file_name, "notes.md");
    assert_eq!(results[1].file_name, format!("{}.md", h[1]));
    assert_eq!(results[2].file_name, format!("{}.md", h[2]));
    assert!(results.iter().all(|r| r.is_written() && r.bytes > 0));

    assert_eq!(
        read(dir.path(), "notes.md"),
        format!("Intro\n\n---: {}\n---: {}\n", h[1], h[2])
    );

    let alpha = read(dir.path(), &results[1].file_name);
    let (first, rest) = alpha.split_once('\n').unwrap();
    assert_eq!(rest, "Alpha");
    match Divider::parse(first) {
        Some(Divider::Annotated { hash, timestamp }) => {
            assert_eq!(hash, h[1]);
            assert!(timestamp::parse(&timestamp).is_ok());
        }
        other => panic!("unexpected divider {other:?}"),
    }
    assert!(read(dir.path(), &results[2].file_name).ends_with("\nBeta\n"));
}

#[test]
fn test_second_run_skips_and_leaves_files_identical() {
    let dir = tempdir().unwrap();
    let writer = SectionWriter::default();
    let sections = split(DOCUMENT);
    let first = writer.write_sections(&sections, &options(dir.path())).unwrap();
    let before: Vec<String> = first.iter().map(|r| read(dir.path(), &r.file_name)).collect();

    let second = writer.write_sections(&sections, &options(dir.path())).unwrap();
    assert!(second.iter().all(|r| r.status
        == WriteStatus::Skipped {
            reason: SkipReason::FileExists
        }));
    assert!(second.iter().all(|r| r.is_available() && r.bytes == 0));
    let after: Vec<String> = second.iter().map(|r| read(dir.path(), &r.file_name)).collect();
    assert_eq!(before, after);

    let summary = WriteSummary::from_results(&second);
    assert_eq!((summary.written, summary.skipped, summary.failed), (0, 3, 0));
    assert_eq!(summary.total_bytes, 0);
}

#[test]
fn test_overwrite_rewrites_every_file() {
    let dir = tempdir().unwrap();
    let writer = SectionWriter::default();
    let sections = split(DOCUMENT);
    writer.write_sections(&sections, &options(dir.path())).unwrap();

    let again = writer
        .write_sections(
            &sections,
            &WriteOptions {
                overwrite: true,
                ..options(dir.path())
            },
        )
        .unwrap();
    assert!(again.iter().all(|r| r.is_written()));
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 3);
}

#[test]
fn test_references_can_be_disabled() {
    let dir = tempdir().unwrap();
    SectionWriter::default()
        .write_sections(
            &split(DOCUMENT),
            &WriteOptions {
                references: false,
                ..options(dir.path())
            },
        )
        .unwrap();
    assert_eq!(read(dir.path(), "notes.md"), "Intro");
}

#[test]
fn test_leading_divider_writes_references_only_anchor() {
    let dir = tempdir().unwrap();
    let text = "---:\nA\n---:\nB";
    let results = SectionWriter::default()
        .write_sections(&split(text), &options(dir.path()))
        .unwrap();
    let h = hashes(text);

    assert_eq!(results.len(), 3);
    let anchor = results.last().unwrap();
    assert!(anchor.is_anchor);
    assert_eq!(anchor.index, None);
    assert_eq!(
        read(dir.path(), "notes.md"),
        format!("---: {}\n---: {}\n", h[0], h[1])
    );
}

#[test]
fn test_resplitting_an_anchor_does_not_stack_references() {
    let dir = tempdir().unwrap();
    let text = "Intro\n\n---: AAAA1111\n---: BBBB2222\n---:\nAlpha";
    let results = SectionWriter::default()
        .write_sections(&split(text), &options(dir.path()))
        .unwrap();
    let anchor = read(dir.path(), &results[0].file_name);
    assert_eq!(anchor, format!("Intro\n\n---: {}\n", results[1].hash));
    assert!(!anchor.contains("AAAA1111"));
}

#[test]
fn test_shared_timestamp_stamps_every_section_alike() {
    let dir = tempdir().unwrap();
    let text = "Intro\n---:\nA\n---:\nB\n---:\nC";
    let results = SectionWriter::default()
        .write_sections(
            &split(text),
            &WriteOptions {
                shared_timestamp: true,
                ..options(dir.path())
            },
        )
        .unwrap();
    let stamps: Vec<String> = results[1..]
        .iter()
        .map(|r| {
            let body = read(dir.path(), &r.file_name);
            match Divider::parse(body.lines().next().unwrap()) {
                Some(Divider::Annotated { timestamp, .. }) => timestamp,
                other => panic!("unexpected divider {other:?}"),
            }
        })
        .collect();
    assert_eq!(stamps.len(), 3);
    assert!(stamps.windows(2).all(|pair| pair[0] == pair[1]));
}

#[test]
fn test_failed_write_is_recorded_and_left_out_of_references() {
    let dir = tempdir().unwrap();
    let h = hashes(DOCUMENT);
    fs::create_dir(dir.path().join(format!("{}.md", h[1]))).unwrap();

    let results = SectionWriter::default()
        .write_sections(
            &split(DOCUMENT),
            &WriteOptions {
                overwrite: true,
                ..options(dir.path())
            },
        )
        .unwrap();
    assert!(matches!(results[1].status, WriteStatus::Failed { .. }));
    assert!(results[2].is_written());
    assert_eq!(
        read(dir.path(), "notes.md"),
        format!("Intro\n\n---: {}\n", h[2])
    );
    assert_eq!(WriteSummary::from_results(&results).failed, 1);
}

#[test]
fn test_nothing_to_write() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("never-created");
    let results = SectionWriter::default()
        .write_sections(&[], &options(&out))
        .unwrap();
    assert!(results.is_empty());
    assert!(!out.exists());
}

#[test]
fn test_options_need_a_file_name() {
    assert!(WriteOptions::from_config(&Config::default(), Path::new("/"), Path::new("out")).is_err());
}

#[test]
fn test_hash_like_line_inside_anchor_is_kept() {
    let text = "Intro\n---: 2024\nImportant anchor text\n---: face\nMore\n---:\nAlpha";
    let h = hashes(text);
    let base = "Intro\n---: 2024\nImportant anchor text\n---: face\nMore";

    let dir = tempdir().unwrap();
    SectionWriter::default()
        .write_sections(&split(text), &options(dir.path()))
        .unwrap();
    assert_eq!(
        read(dir.path(), "notes.md"),
        format!("{base}\n\n---: {}\n", h[1])
    );

    let plain = tempdir().unwrap();
    SectionWriter::default()
        .write_sections(
            &split(text),
            &WriteOptions {
                references: false,
                ..options(plain.path())
            },
        )
        .unwrap();
    assert_eq!(read(plain.path(), "notes.md"), base);
}

#[test]
fn test_hex_named_source_keeps_its_anchor() {
    let dir = tempdir().unwrap();
    let options =
        WriteOptions::from_config(&Config::default(), Path::new("20241017.md"), dir.path())
            .unwrap();
    let results = SectionWriter::default()
        .write_sections(&split(DOCUMENT), &options)
        .unwrap();
    assert!(results.iter().all(|r| r.is_written()));

    let files = options.store().list().unwrap();
    let anchor = files.iter().find(|f| f.name == "20241017.md").unwrap();
    assert_eq!(anchor.kind, crate::store::FileKind::Anchor);
    assert_eq!(
        files
            .iter()
            .filter(|f| f.kind == crate::store::FileKind::Section)
            .count(),
        2
    );
}

#[test]
fn test_anchor_may_not_replace_the_source() {
    let dir = tempdir().unwrap();
    let source = dir.path().join("doc.md");
    fs::write(&source, DOCUMENT).unwrap();

    assert!(matches!(
        WriteOptions::from_config(&Config::default(), &source, dir.path()),
        Err(crate::error::Error::InvalidInput(_))
    ));
    let elsewhere = dir.path().join("doc");
    let options = WriteOptions::from_config(&Config::default(), &source, &elsewhere).unwrap();
    assert_eq!(options.anchor_path(), elsewhere.join("doc.md"));
}

#[test]
fn test_existing_sections_are_still_referenced() {
    let dir = tempdir().unwrap();
    let writer = SectionWriter::default();
    let sections = split(DOCUMENT);
    writer.write_sections(&sections, &options(dir.path())).unwrap();
    let first_anchor = read(dir.path(), "notes.md");
    fs::remove_file(dir.path().join("notes.md")).unwrap();

    let results = writer.write_sections(&sections, &options(dir.path())).unwrap();
    assert!(results[0].is_written());
    assert!(results[1..].iter().all(|r| !r.is_written() && r.is_available()));
    assert_eq!(read(dir.path(), "notes.md"), first_anchor);
}
