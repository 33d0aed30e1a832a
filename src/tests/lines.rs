use super::{slice_lines, LineCursor};
use crate::error::Error;
use std::io::Cursor;
use streaming_iterator::StreamingIterator;

fn collect(mut source: impl StreamingIterator<Item = str>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(line) = source.next() {
        lines.push(line.to_string());
    }
    lines
}

fn cursor_lines(text: &str) -> Vec<String> {
    let mut cursor = LineCursor::new(Cursor::new(text.as_bytes().to_vec()), 1024);
    let mut lines = Vec::new();
    while let Some(line) = cursor.next() {
        lines.push(line.to_string());
    }
    cursor.finish().unwrap();
    lines
}

#[test]
fn test_cursor_matches_split() {
    for text in ["a", "a\n", "a\nb", "a\n\nb\n", "\n", "\n\n", "---:\r\nx\r\n"] {
        let expected: Vec<String> = text.split('\n').map(str::to_string).collect();
        assert_eq!(cursor_lines(text), expected, "input {text:?}");
        assert_eq!(collect(slice_lines(text)), expected, "input {text:?}");
    }
}

#[test]
fn test_empty_document_has_no_lines() {
    assert!(cursor_lines("").is_empty());
    assert!(collect(slice_lines("")).is_empty());
}

#[test]
fn test_cursor_counts_lines_and_bytes() {
    let text = "one\ntwo\nthree";
    let mut cursor = LineCursor::new(Cursor::new(text.as_bytes().to_vec()), 1024);
    while cursor.next().is_some() {}
    assert_eq!(cursor.lines_read(), 3);
    assert_eq!(cursor.bytes_read(), text.len() as u64);
}

#[test]
fn test_line_too_long_stops_the_scan() {
    let text = format!("short\n{}\nafter", "x".repeat(64));
    let mut cursor = LineCursor::new(Cursor::new(text.into_bytes()), 16);
    let mut seen = Vec::new();
    while let Some(line) = cursor.next() {
        seen.push(line.to_string());
    }
    assert_eq!(seen, vec!["short".to_string()]);
    match cursor.finish() {
        Err(Error::LineTooLong { line, max, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(max, 16);
        }
        other => panic!("expected LineTooLong, got {other:?}"),
    }
}

#[test]
fn test_line_at_exact_limit_is_accepted() {
    let text = format!("{}\n{}", "y".repeat(16), "z".repeat(16));
    let mut cursor = LineCursor::new(Cursor::new(text.into_bytes()), 16);
    let mut count = 0;
    while cursor.next().is_some() {
        count += 1;
    }
    assert_eq!(count, 2);
    cursor.finish().unwrap();
}

#[test]
fn test_invalid_utf8_is_invalid_input() {
    let mut cursor = LineCursor::new(Cursor::new(vec![b'o', b'k', b'\n', 0xff, 0xfe]), 1024);
    while cursor.next().is_some() {}
    assert!(matches!(cursor.finish(), Err(Error::InvalidInput(_))));
}
