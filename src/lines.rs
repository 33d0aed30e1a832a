//! Line sources feeding boundary detection.
//!
//! Both sources yield exactly the pieces `str::split('\n')` would produce, so a document read
//! from memory and the same document read from disk are seen line-for-line identically,
//! including the empty final line after a trailing newline. The one exception is the empty
//! document, which yields no lines at all.

use crate::error::{Error, Result};
use std::io::{BufRead, Read};
use std::path::{Path, PathBuf};
use streaming_iterator::StreamingIterator;

/// Lines of an in-memory document.
pub fn slice_lines(content: &str) -> impl StreamingIterator<Item = str> + '_ {
    let lines = (!content.is_empty()).then(|| content.split('\n'));
    streaming_iterator::convert_ref(lines.into_iter().flatten())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Reading,
    /// The previous line ended in `\n` at end of input; one empty line remains.
    TrailingEmpty,
    Done,
}

/// Forward-only line reader holding at most one line in memory.
///
/// Any line longer than `max_line_length` bytes stops the scan with [`Error::LineTooLong`];
/// invalid UTF-8 stops it with [`Error::InvalidInput`]. Since a streaming iterator cannot fail,
/// the error is kept and handed back by [`LineCursor::finish`].
pub struct LineCursor<R> {
    reader: R,
    path: PathBuf,
    buffer: Vec<u8>,
    line: String,
    max_line_length: usize,
    lines_read: usize,
    bytes_read: u64,
    state: CursorState,
    current: bool,
    error: Option<Error>,
}

impl<R: BufRead> LineCursor<R> {
    /// Wrap `reader`, refusing lines longer than `max_line_length` bytes.
    pub fn new(reader: R, max_line_length: usize) -> Self {
        Self {
            reader,
            path: PathBuf::new(),
            buffer: Vec::new(),
            line: String::new(),
            max_line_length,
            lines_read: 0,
            bytes_read: 0,
            state: CursorState::Reading,
            current: false,
            error: None,
        }
    }

    #[must_use]
    /// Name the file being read so that I/O errors report it.
    pub fn with_path(mut self, path: &Path) -> Self {
        self.path = path.to_path_buf();
        self
    }

    #[must_use]
    /// Number of lines yielded so far.
    pub fn lines_read(&self) -> usize {
        self.lines_read
    }

    #[must_use]
    /// Number of bytes consumed from the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Surface any error that ended the scan early.
    ///
    /// # Errors
    ///
    /// Returns the [`Error::LineTooLong`], [`Error::InvalidInput`] or I/O error that stopped
    /// the cursor.
    pub fn finish(self) -> Result<()> {
        self.error.map_or(Ok(()), Err)
    }

    fn read_next(&mut self) -> Result<bool> {
        match self.state {
            CursorState::Done => return Ok(false),
            CursorState::TrailingEmpty => {
                self.state = CursorState::Done;
                self.line.clear();
                self.lines_read += 1;
                return Ok(true);
            }
            CursorState::Reading => {}
        }

        self.buffer.clear();
        let limit = u64::try_from(self.max_line_length)
            .unwrap_or(u64::MAX)
            .saturating_add(1);
        let read = (&mut self.reader)
            .take(limit)
            .read_until(b'\n', &mut self.buffer)
            .map_err(|e| Error::from_io(e, &self.path))?;

        if read == 0 {
            self.state = CursorState::Done;
            return Ok(false);
        }

        let terminated = self.buffer.last() == Some(&b'\n');
        if terminated {
            self.buffer.pop();
        } else if self.buffer.len() > self.max_line_length {
            return Err(Error::LineTooLong {
                line: self.lines_read + 1,
                length: self.buffer.len(),
                max: self.max_line_length,
            });
        }

        self.bytes_read += read as u64;
        self.line.clear();
        self.line.push_str(std::str::from_utf8(&self.buffer).map_err(|e| {
            Error::InvalidInput(format!(
                "line {} is not valid UTF-8: {e}",
                self.lines_read + 1
            ))
        })?);
        self.lines_read += 1;

        if terminated && self.reader.fill_buf().is_ok_and(<[u8]>::is_empty) {
            self.state = CursorState::TrailingEmpty;
        }
        Ok(true)
    }
}

impl<R: BufRead> StreamingIterator for LineCursor<R> {
    type Item = str;

    fn advance(&mut self) {
        self.current = match self.read_next() {
            Ok(yielded) => yielded,
            Err(e) => {
                self.error = Some(e);
                self.state = CursorState::Done;
                false
            }
        };
    }

    fn get(&self) -> Option<&str> {
        self.current.then_some(self.line.as_str())
    }
}

#[cfg(test)]
#[path = "tests/lines.rs"]
mod tests;
