//! Whole-buffer splitting for documents small enough to hold in memory.

use crate::boundary::Spans;
use crate::error::{Error, Result};
use crate::lines::slice_lines;
use crate::section::Section;
use tracing::debug;

#[must_use]
/// Split `content` into sections at bare divider lines.
///
/// Content without dividers forms a single section; empty content forms none.
pub fn split(content: &str) -> Vec<Section> {
    let mut source = slice_lines(content);
    let sections: Vec<Section> = Spans::new(&mut source)
        .map(|span| {
            let text = content[span.byte_range()].to_string();
            Section::from_span(span, text)
        })
        .collect();
    debug!(sections = sections.len(), bytes = content.len(), "Split in memory");
    sections
}

/// Split raw bytes that are expected to be UTF-8 text.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if `bytes` is not valid UTF-8.
pub fn split_bytes(bytes: &[u8]) -> Result<Vec<Section>> {
    let content = std::str::from_utf8(bytes)
        .map_err(|e| Error::InvalidInput(format!("content is not UTF-8 text: {e}")))?;
    Ok(split(content))
}

#[cfg(test)]
#[path = "tests/splitter.rs"]
mod tests;
