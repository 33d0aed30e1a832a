//! Strategy selection between whole-buffer splitting and streaming.
//!
//! Every operation checks the input's size against the configured threshold: smaller files are
//! read into memory and split in one go, larger ones are scanned as a stream. Both paths detect
//! boundaries with the same algorithm, so apart from speed and memory use the caller cannot tell
//! which one ran, except through [`FileStats::processing_method`].

use crate::config::Config;
use crate::error::{require_file, Error, Result};
use crate::hasher::ContentHasher;
use crate::indexer::{FileIndex, StreamingIndexer};
use crate::section::{Section, SectionMeta};
use crate::splitter;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
/// How a file was processed.
pub enum ProcessingMethod {
    /// The whole file was read into memory.
    InMemory,
    /// The file was scanned line by line.
    Streaming,
}

impl ProcessingMethod {
    #[must_use]
    /// Choose a method for a file of `size` bytes.
    pub fn for_size(size: u64, threshold: u64) -> Self {
        if size >= threshold {
            Self::Streaming
        } else {
            Self::InMemory
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Summary statistics, identical in shape whichever method produced them.
pub struct FileStats {
    /// Number of sections.
    pub section_count: usize,
    /// File size in bytes.
    pub total_size: u64,
    /// Mean section size in bytes, rounded down.
    pub average_section_size: u64,
    /// Modification time reported by the filesystem, if available.
    pub last_modified: Option<DateTime<Utc>>,
    /// Strategy used to produce these figures.
    pub processing_method: ProcessingMethod,
}

#[derive(Clone, Debug, Serialize)]
/// Full section index plus statistics for one file.
pub struct FileAnalysis {
    /// Section metadata, divider positions and line count.
    pub index: FileIndex,
    /// Summary statistics.
    pub stats: FileStats,
}

#[derive(Clone, Copy, Debug)]
/// Single entry point that routes each call to the in-memory or streaming component.
pub struct Processor {
    hasher: ContentHasher,
    indexer: StreamingIndexer,
    threshold: u64,
}

impl Processor {
    /// Build a processor from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the configured hash settings are invalid.
    pub fn new(config: &Config) -> Result<Self> {
        let hasher = config.hasher()?;
        Ok(Self {
            hasher,
            indexer: StreamingIndexer::new(hasher, config.max_line_length),
            threshold: config.streaming_threshold,
        })
    }

    #[must_use]
    /// The hasher used for every section.
    pub fn hasher(&self) -> &ContentHasher {
        &self.hasher
    }

    /// Decide how `path` would be processed.
    ///
    /// # Errors
    ///
    /// Returns an error if `path` is empty, missing, a directory or unreadable.
    pub fn method_for(&self, path: &Path) -> Result<ProcessingMethod> {
        let size = require_file(path)?.len();
        Ok(ProcessingMethod::for_size(size, self.threshold))
    }

    /// Read `path` and split it into sections with their text.
    ///
    /// # Errors
    ///
    /// Returns filesystem errors, [`Error::InvalidInput`] for non-UTF-8 input and, when
    /// streaming, [`Error::LineTooLong`].
    pub fn read_and_split(&self, path: &Path) -> Result<Vec<Section>> {
        let sections = match self.method_for(path)? {
            ProcessingMethod::InMemory => splitter::split_bytes(&read(path)?)?,
            ProcessingMethod::Streaming => self.indexer.sections(path)?,
        };
        debug!(path = ?path, sections = sections.len(), "Read and split");
        Ok(sections)
    }

    /// Index `path` and summarise it.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Processor::read_and_split`].
    pub fn analyze_file(&self, path: &Path) -> Result<FileAnalysis> {
        let metadata = require_file(path)?;
        let method = ProcessingMethod::for_size(metadata.len(), self.threshold);
        let index = match method {
            ProcessingMethod::InMemory => {
                let sections = splitter::split_bytes(&read(path)?)?;
                self.index_in_memory(&sections, metadata.len())
            }
            ProcessingMethod::Streaming => self.indexer.analyze(path)?,
        };
        let stats = FileStats {
            section_count: index.sections.len(),
            total_size: index.total_size,
            average_section_size: index
                .total_size
                .checked_div(index.sections.len() as u64)
                .unwrap_or(0),
            last_modified: metadata.modified().ok().map(DateTime::<Utc>::from),
            processing_method: method,
        };
        Ok(FileAnalysis { index, stats })
    }

    /// Summary statistics for `path`.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Processor::read_and_split`].
    pub fn get_file_stats(&self, path: &Path) -> Result<FileStats> {
        Ok(self.analyze_file(path)?.stats)
    }

    /// The first section of `path` with the given hash.
    ///
    /// # Errors
    ///
    /// Fails under the same conditions as [`Processor::read_and_split`].
    pub fn find_section_by_hash(&self, path: &Path, hash: &str) -> Result<Option<SectionMeta>> {
        match self.method_for(path)? {
            ProcessingMethod::InMemory => Ok(self.analyze_file(path)?.index.lookup(hash).cloned()),
            ProcessingMethod::Streaming => self.indexer.find_section_by_hash(path, hash),
        }
    }

    /// Text of lines `start..=end` (1-based) of `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] for an empty or zero-based range, and otherwise fails
    /// under the same conditions as [`Processor::read_and_split`].
    pub fn extract_section(&self, path: &Path, start: usize, end: usize) -> Result<String> {
        if start < 1 || end < start {
            return Err(Error::InvalidRange { start, end });
        }
        match self.method_for(path)? {
            ProcessingMethod::InMemory => {
                let bytes = read(path)?;
                let content = std::str::from_utf8(&bytes).map_err(|e| {
                    Error::InvalidInput(format!("{} is not UTF-8 text: {e}", path.display()))
                })?;
                if content.is_empty() {
                    return Ok(String::new());
                }
                let lines: Vec<&str> = content
                    .split('\n')
                    .skip(start - 1)
                    .take(end - start + 1)
                    .collect();
                Ok(lines.join("\n"))
            }
            ProcessingMethod::Streaming => self.indexer.extract_section(path, start, end),
        }
    }

    fn index_in_memory(&self, sections: &[Section], total_size: u64) -> FileIndex {
        let mut offset = 0;
        let metas = sections
            .iter()
            .map(|section| {
                let meta = SectionMeta::from_section(section, &self.hasher, offset);
                offset += section.size() + 1;
                meta
            })
            .collect();
        let total_lines = sections.last().map_or(0, |section| section.line_end);
        FileIndex::new(metas, total_lines, total_size)
    }
}

fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| Error::from_io(e, path))
}

#[cfg(test)]
#[path = "tests/processor.rs"]
mod tests;
