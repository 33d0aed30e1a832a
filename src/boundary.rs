//! Section boundary detection, shared by the in-memory and streaming strategies.
//!
//! Lines are consumed in order. A bare divider closes the section accumulated so far (if it has
//! any lines) and opens a new one starting with the divider itself; the first line of a document
//! always opens a section. A divider followed directly by another divider or by the end of input
//! still forms a one-line section, so joining every span's text with `\n` gives back the source
//! exactly under either strategy.
//!
//! Spans carry byte coordinates as well as line numbers. Since both line sources split on `\n`
//! only, a span's text is `source[byte_start..byte_start + byte_len]` whether the source is a
//! string or a file.

use crate::divider;
use serde::Serialize;
use std::ops::Range;
use streaming_iterator::StreamingIterator;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Coordinates of one section within its source.
pub struct Span {
    /// Zero-based position in declaration order.
    pub index: usize,
    /// First line of the section (1-based, inclusive).
    pub line_start: usize,
    /// Last line of the section (1-based, inclusive).
    pub line_end: usize,
    /// Byte offset of the section's first character.
    pub byte_start: u64,
    /// Length of the section text in bytes, excluding the newline that ends it.
    pub byte_len: u64,
    /// The divider line opening this section, verbatim.
    pub divider: Option<String>,
}

impl Span {
    #[must_use]
    /// Byte range of this section within a source held in memory.
    pub fn byte_range(&self) -> Range<usize> {
        let start = usize::try_from(self.byte_start).unwrap_or(usize::MAX);
        let len = usize::try_from(self.byte_len).unwrap_or(usize::MAX);
        start..start.saturating_add(len)
    }

    #[must_use]
    /// Number of lines in the section.
    pub fn line_count(&self) -> usize {
        self.line_end - self.line_start + 1
    }
}

/// Incremental boundary detector fed one line at a time.
#[derive(Debug, Default)]
pub struct BoundaryScanner {
    lines_seen: usize,
    next_offset: u64,
    emitted: usize,
    open: Option<Span>,
}

impl BoundaryScanner {
    #[must_use]
    /// A scanner positioned before the first line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next line (without its newline), returning the section it closes, if any.
    pub fn push(&mut self, line: &str) -> Option<Span> {
        self.lines_seen += 1;
        let offset = self.next_offset;
        self.next_offset += line.len() as u64 + 1;

        let is_divider = divider::is_bare(line);
        let closed = if is_divider { self.open.take() } else { None };

        match self.open.as_mut() {
            Some(span) => {
                span.line_end = self.lines_seen;
                span.byte_len = offset + line.len() as u64 - span.byte_start;
            }
            None => {
                self.open = Some(Span {
                    index: self.emitted + usize::from(closed.is_some()),
                    line_start: self.lines_seen,
                    line_end: self.lines_seen,
                    byte_start: offset,
                    byte_len: line.len() as u64,
                    divider: is_divider.then(|| line.to_string()),
                });
            }
        }

        if closed.is_some() {
            self.emitted += 1;
        }
        closed
    }

    /// Close the final section at end of input.
    pub fn finish(&mut self) -> Option<Span> {
        let last = self.open.take();
        if last.is_some() {
            self.emitted += 1;
        }
        last
    }

    #[must_use]
    /// Lines consumed so far.
    pub fn lines_seen(&self) -> usize {
        self.lines_seen
    }
}

/// Iterator of [`Span`]s over any line source.
pub struct Spans<'a, S> {
    source: &'a mut S,
    scanner: BoundaryScanner,
    exhausted: bool,
}

impl<'a, S> Spans<'a, S>
where
    S: StreamingIterator<Item = str>,
{
    /// Detect boundaries in the lines of `source`.
    pub fn new(source: &'a mut S) -> Self {
        Self {
            source,
            scanner: BoundaryScanner::new(),
            exhausted: false,
        }
    }

    #[must_use]
    /// Lines consumed so far.
    pub fn lines_seen(&self) -> usize {
        self.scanner.lines_seen()
    }
}

impl<S> Iterator for Spans<'_, S>
where
    S: StreamingIterator<Item = str>,
{
    type Item = Span;

    fn next(&mut self) -> Option<Span> {
        if self.exhausted {
            return None;
        }
        while let Some(line) = self.source.next() {
            if let Some(span) = self.scanner.push(line) {
                return Some(span);
            }
        }
        self.exhausted = true;
        self.scanner.finish()
    }
}

#[cfg(test)]
#[path = "tests/boundary.rs"]
mod tests;
