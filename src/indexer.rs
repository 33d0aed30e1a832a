//! Streaming section index for files too large to buffer.
//!
//! A file is scanned once, front to back, through a [`LineCursor`] that never holds more than
//! one line. Each section is hashed as soon as the next divider closes it, by re-reading just its
//! byte range through a second handle; the re-reads are disjoint, so a full analysis reads the
//! file at most twice in total.
//!
//! Line memory is bounded by the line-length ceiling, but hashing is not: each section's text is
//! held in full while it is digested, because normalisation trims the section's trailing
//! whitespace before anything is hashed. Peak memory is therefore the size of the largest
//! section, which for a file without dividers is the whole file.

use crate::boundary::{Span, Spans};
use crate::error::{require_file, Error, Result};
use crate::hasher::ContentHasher;
use crate::lines::LineCursor;
use crate::section::{Section, SectionMeta};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::Path;
use streaming_iterator::StreamingIterator;
use tracing::debug;

#[derive(Clone, Debug, Serialize)]
/// Everything a streaming pass learns about a file.
pub struct FileIndex {
    /// Section metadata in declaration order.
    pub sections: Vec<SectionMeta>,
    /// 1-based line numbers of every bare divider.
    pub divider_lines: Vec<usize>,
    /// Number of lines in the file.
    pub total_lines: usize,
    /// Size of the file in bytes.
    pub total_size: u64,
    #[serde(skip)]
    hash_index: HashMap<String, usize>,
}

impl FileIndex {
    pub(crate) fn new(sections: Vec<SectionMeta>, total_lines: usize, total_size: u64) -> Self {
        let divider_lines = sections
            .iter()
            .filter(|meta| meta.has_divider)
            .map(|meta| meta.line_start)
            .collect();
        let mut hash_index = HashMap::with_capacity(sections.len());
        for (position, meta) in sections.iter().enumerate() {
            hash_index
                .entry(meta.hash.as_str().to_string())
                .or_insert(position);
        }
        Self {
            sections,
            divider_lines,
            total_lines,
            total_size,
            hash_index,
        }
    }

    #[must_use]
    /// The first section with the given hash, compared case-insensitively.
    pub fn lookup(&self, hash: &str) -> Option<&SectionMeta> {
        self.hash_index
            .get(&hash.trim().to_ascii_uppercase())
            .map(|&position| &self.sections[position])
    }
}

#[derive(Clone, Copy, Debug)]
/// Builds section indexes with bounded memory.
pub struct StreamingIndexer {
    hasher: ContentHasher,
    max_line_length: usize,
}

impl StreamingIndexer {
    #[must_use]
    /// Index with `hasher`, refusing lines longer than `max_line_length` bytes.
    pub fn new(hasher: ContentHasher, max_line_length: usize) -> Self {
        Self {
            hasher,
            max_line_length,
        }
    }

    /// Scan `path` once and describe every section in it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`], [`Error::IsADirectory`] or another filesystem error if the
    /// file cannot be read, [`Error::LineTooLong`] if a line exceeds the ceiling, and
    /// [`Error::InvalidInput`] if the file is not UTF-8.
    pub fn analyze(&self, path: &Path) -> Result<FileIndex> {
        let total_size = require_file(path)?.len();
        let mut sections = Vec::new();
        let total_lines = self.scan(path, |span, content| {
            let hash = self.hasher.section_hash(content, span.divider.as_deref());
            sections.push(SectionMeta::from_span(span, hash));
        })?;
        debug!(
            path = ?path,
            sections = sections.len(),
            lines = total_lines,
            bytes = total_size,
            "Indexed by streaming"
        );
        Ok(FileIndex::new(sections, total_lines, total_size))
    }

    /// Read every section of `path` with its text, scanning the file as a stream.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`StreamingIndexer::analyze`].
    pub fn sections(&self, path: &Path) -> Result<Vec<Section>> {
        require_file(path)?;
        let mut sections = Vec::new();
        self.scan(path, |span, content| {
            sections.push(Section::from_span(span.clone(), content.to_string()));
        })?;
        Ok(sections)
    }

    /// Return the text of lines `start..=end` (1-based) joined with `\n`.
    ///
    /// Lines past the end of the file are ignored, so a range beginning after the last line
    /// yields an empty string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `start` is 0 or `end < start`, and any error
    /// [`StreamingIndexer::analyze`] could return for reading the file.
    pub fn extract_section(&self, path: &Path, start: usize, end: usize) -> Result<String> {
        if start < 1 || end < start {
            return Err(Error::InvalidRange { start, end });
        }
        require_file(path)?;
        let file = File::open(path).map_err(|e| Error::from_io(e, path))?;
        let mut cursor = LineCursor::new(BufReader::new(file), self.max_line_length).with_path(path);

        let mut extracted: Vec<String> = Vec::new();
        let mut number = 0;
        while let Some(line) = cursor.next() {
            number += 1;
            if number >= start {
                extracted.push(line.to_string());
            }
            if number == end {
                break;
            }
        }
        cursor.finish()?;
        Ok(extracted.join("\n"))
    }

    /// Find the first section of `path` whose hash matches, by analysing the whole file.
    ///
    /// Each call rescans the file; callers looking up many hashes should keep the
    /// [`FileIndex`] from [`StreamingIndexer::analyze`] instead.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`StreamingIndexer::analyze`].
    pub fn find_section_by_hash(&self, path: &Path, hash: &str) -> Result<Option<SectionMeta>> {
        Ok(self.analyze(path)?.lookup(hash).cloned())
    }

    fn scan<F>(&self, path: &Path, mut visit: F) -> Result<usize>
    where
        F: FnMut(&Span, &str),
    {
        let file = File::open(path).map_err(|e| Error::from_io(e, path))?;
        let mut reread = File::open(path).map_err(|e| Error::from_io(e, path))?;
        let mut cursor = LineCursor::new(BufReader::new(file), self.max_line_length).with_path(path);

        let mut spans = Spans::new(&mut cursor);
        let mut buffer = String::new();
        for span in spans.by_ref() {
            read_range(&mut reread, path, &span, &mut buffer)?;
            visit(&span, &buffer);
        }
        let total_lines = spans.lines_seen();
        cursor.finish()?;
        Ok(total_lines)
    }
}

fn read_range(file: &mut File, path: &Path, span: &Span, buffer: &mut String) -> Result<()> {
    buffer.clear();
    file.seek(SeekFrom::Start(span.byte_start))
        .map_err(|e| Error::from_io(e, path))?;
    file.by_ref()
        .take(span.byte_len)
        .read_to_string(buffer)
        .map_err(|e| Error::from_io(e, path))?;
    Ok(())
}

#[cfg(test)]
#[path = "tests/indexer.rs"]
mod tests;
