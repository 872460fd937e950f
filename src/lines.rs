//! Logical line splitting over a raw file buffer
//!
//! Lines end at `\n`; a `\r` directly before the terminator is dropped.
//! Every line is trimmed and blank lines are skipped entirely, so the
//! iterator only ever yields non-empty views. A final line without a
//! terminator is still yielded.

use crate::slice::ByteSlice;

/// UTF-8 byte-order mark
pub const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Iterator over the trimmed, non-empty lines of a buffer
#[derive(Debug, Clone)]
pub struct Lines<'a> {
    rest: ByteSlice<'a>,
}

impl<'a> Lines<'a> {
    /// Creates a line iterator, skipping a leading byte-order mark
    pub fn new(buffer: &'a [u8]) -> Self {
        let mut rest = ByteSlice::new(buffer);
        if rest.starts_with(UTF8_BOM) {
            tracing::trace!("skipping UTF-8 byte-order mark");
            rest.advance(UTF8_BOM.len());
        }
        Self { rest }
    }

    /// Returns the part of the buffer not yet scanned
    pub fn remainder(&self) -> ByteSlice<'a> {
        self.rest
    }

    /// Cuts the next raw line (terminator excluded) off the front
    fn next_raw(&mut self) -> Option<ByteSlice<'a>> {
        if self.rest.is_empty() {
            return None;
        }
        let line = match self.rest.find(b'\n') {
            Some(end) => {
                let mut line = self.rest.subslice(0, end);
                self.rest.advance(end + 1);
                if line.last() == Some(b'\r') {
                    line.retreat(1);
                }
                line
            }
            None => {
                let line = self.rest;
                self.rest.advance(line.len());
                line
            }
        };
        Some(line)
    }
}

impl<'a> Iterator for Lines<'a> {
    type Item = ByteSlice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(raw) = self.next_raw() {
            let line = raw.trim();
            if !line.is_empty() {
                return Some(line);
            }
        }
        None
    }
}

impl std::iter::FusedIterator for Lines<'_> {}

/// Returns the trimmed non-empty lines of `buffer`
pub fn split_lines(buffer: &[u8]) -> Lines<'_> {
    Lines::new(buffer)
}
