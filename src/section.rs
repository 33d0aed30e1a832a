//! Section representation shared by both processing strategies.
//!
//! A section is the run of lines between two dividers. [`Section`] carries its full text and is
//! what the writer consumes; [`SectionMeta`] is the streaming indexer's view, holding only
//! coordinates, a size and a hash so that arbitrarily large files can be indexed without
//! buffering them.

use crate::boundary::Span;
use crate::hasher::{ContentHash, ContentHasher};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// A contiguous division of a document with its exact text and line coordinates.
pub struct Section {
    /// Zero-based position in declaration order.
    pub index: usize,
    /// Verbatim text of the section, without the newline that separates it from the next one.
    pub content: String,
    /// Whether the section opens with a divider line.
    pub has_divider: bool,
    /// The divider line exactly as it appeared in the source.
    pub original_divider_line: Option<String>,
    /// First line of the section (1-based, inclusive).
    pub line_start: usize,
    /// Last line of the section (1-based, inclusive).
    pub line_end: usize,
}

impl Section {
    #[must_use]
    /// Build a section from detected coordinates and the text they cover.
    pub fn from_span(span: Span, content: String) -> Self {
        Self {
            index: span.index,
            has_divider: span.divider.is_some(),
            original_divider_line: span.divider,
            content,
            line_start: span.line_start,
            line_end: span.line_end,
        }
    }

    #[must_use]
    /// Whether this section can serve as the anchor: the first section, with no divider.
    pub fn is_anchor_candidate(&self) -> bool {
        self.index == 0 && !self.has_divider
    }

    #[must_use]
    /// Content hash of this section, ignoring its own divider line.
    pub fn hash(&self, hasher: &ContentHasher) -> ContentHash {
        hasher.section_hash(&self.content, self.original_divider_line.as_deref())
    }

    #[must_use]
    /// Size of the section text in bytes.
    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
/// Coordinates, size and hash of a section, without its text.
pub struct SectionMeta {
    /// Zero-based position in declaration order.
    pub index: usize,
    /// First line of the section (1-based, inclusive).
    pub line_start: usize,
    /// Last line of the section (1-based, inclusive).
    pub line_end: usize,
    /// Byte offset of the section within the file.
    pub byte_start: u64,
    /// Size of the section text in bytes.
    pub estimated_size: u64,
    /// Whether the section opens with a divider line.
    pub has_divider: bool,
    /// Content hash, ignoring the section's own divider.
    pub hash: ContentHash,
}

impl SectionMeta {
    #[must_use]
    /// Combine detected coordinates with the hash computed for them.
    pub fn from_span(span: &Span, hash: ContentHash) -> Self {
        Self {
            index: span.index,
            line_start: span.line_start,
            line_end: span.line_end,
            byte_start: span.byte_start,
            estimated_size: span.byte_len,
            has_divider: span.divider.is_some(),
            hash,
        }
    }

    #[must_use]
    /// Metadata for a section already held in memory.
    pub fn from_section(section: &Section, hasher: &ContentHasher, byte_start: u64) -> Self {
        Self {
            index: section.index,
            line_start: section.line_start,
            line_end: section.line_end,
            byte_start,
            estimated_size: section.size(),
            has_divider: section.has_divider,
            hash: section.hash(hasher),
        }
    }
}
