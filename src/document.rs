//! Parsed CSV document owning its source buffer
//!
//! [`CsvDocument`] keeps the raw bytes and records every field as a span
//! into them. Row and field views handed out by the document borrow it, so
//! none of them can outlive the buffer they point into.

use crate::config::{CsvConfig, Dialect};
use crate::error::CsvError;
use crate::lines::split_lines;
use crate::record::Records;
use crate::slice::ByteSlice;
use crate::tokenizer::{Fields, Row, tokenize_line};
use std::fs;
use std::ops::Range;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    len: usize,
}

/// A CSV buffer split into rows of fields
#[derive(Debug, Clone, Default)]
pub struct CsvDocument {
    dialect: Dialect,
    buffer: Vec<u8>,
    spans: Vec<Span>,
    /// Span ranges, one per row
    rows: Vec<Range<usize>>,
}

impl CsvDocument {
    /// Creates an empty document using the default dialect
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document using `dialect`
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            dialect,
            ..Self::default()
        }
    }

    /// Parses `buffer` into a new document
    pub fn from_bytes(buffer: impl Into<Vec<u8>>, dialect: Dialect) -> Self {
        let mut document = Self::with_dialect(dialect);
        document.parse(buffer);
        document
    }

    /// Reads and parses the file at `path` into a new document
    pub fn open(path: impl AsRef<Path>, dialect: Dialect) -> Result<Self, CsvError> {
        let mut document = Self::with_dialect(dialect);
        document.parse_file(path)?;
        Ok(document)
    }

    /// Returns the dialect used for parsing
    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Takes ownership of `buffer` and tokenizes it, replacing any rows
    /// from an earlier parse
    pub fn parse(&mut self, buffer: impl Into<Vec<u8>>) {
        self.buffer = buffer.into();
        self.spans.clear();
        self.rows.clear();

        for line in split_lines(&self.buffer) {
            let first = self.spans.len();
            self.spans.extend(Fields::new(line, self.dialect).map(|field| Span {
                start: field.offset(),
                len: field.len(),
            }));
            self.rows.push(first..self.spans.len());
        }

        tracing::debug!(
            rows = self.rows.len(),
            bytes = self.buffer.len(),
            "parsed CSV document"
        );
    }

    /// Parses `buffer` with a different dialect
    pub fn parse_with(&mut self, buffer: impl Into<Vec<u8>>, dialect: Dialect) {
        self.dialect = dialect;
        self.parse(buffer);
    }

    /// Reads the whole file at `path` and parses it
    ///
    /// On a read failure the document keeps its previous contents.
    pub fn parse_file(&mut self, path: impl AsRef<Path>) -> Result<(), CsvError> {
        let path = path.as_ref();
        let buffer = fs::read(path)?;
        tracing::debug!(path = %path.display(), bytes = buffer.len(), "read CSV file");
        self.parse(buffer);
        Ok(())
    }

    /// Drops all rows and the buffer
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.spans.clear();
        self.rows.clear();
    }

    /// Returns the raw source buffer
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Returns the number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if the document has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the row at `index`
    pub fn row(&self, index: usize) -> Option<RowView<'_>> {
        let range = self.rows.get(index)?.clone();
        Some(RowView {
            buffer: &self.buffer,
            spans: &self.spans[range],
            index,
        })
    }

    /// Iterates over all rows in order
    pub fn rows(&self) -> Rows<'_> {
        self.rows_from(0)
    }

    pub(crate) fn rows_from(&self, start: usize) -> Rows<'_> {
        Rows {
            document: self,
            next: start.min(self.rows.len()),
        }
    }

    /// Iterates over the data rows as records keyed by the header row
    pub fn records(&self, config: &CsvConfig) -> Result<Records<'_>, CsvError> {
        Records::new(self, config)
    }
}

/// One row of a [`CsvDocument`]
#[derive(Clone, Copy)]
pub struct RowView<'d> {
    buffer: &'d [u8],
    spans: &'d [Span],
    index: usize,
}

impl<'d> RowView<'d> {
    /// Returns the 0-based index of this row in the document
    pub fn index(&self) -> usize {
        self.index
    }

    /// Returns the number of fields
    pub fn len(&self) -> usize {
        self.spans.len()
    }

    /// Returns true if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }

    /// Returns the field at `column`
    pub fn get(&self, column: usize) -> Option<ByteSlice<'d>> {
        let span = self.spans.get(column)?;
        ByteSlice::try_view(self.buffer, span.start, span.len)
    }

    /// Iterates over the fields in column order
    pub fn iter(&self) -> RowFields<'d> {
        RowFields {
            buffer: self.buffer,
            spans: self.spans.iter(),
        }
    }

    /// Collects the fields into a [`Row`]
    pub fn to_row(&self) -> Row<'d> {
        self.iter().collect()
    }
}

impl std::fmt::Debug for RowView<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<'d> IntoIterator for RowView<'d> {
    type Item = ByteSlice<'d>;
    type IntoIter = RowFields<'d>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the fields of a [`RowView`]
#[derive(Debug, Clone)]
pub struct RowFields<'d> {
    buffer: &'d [u8],
    spans: std::slice::Iter<'d, Span>,
}

impl<'d> Iterator for RowFields<'d> {
    type Item = ByteSlice<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let span = self.spans.next()?;
        ByteSlice::try_view(self.buffer, span.start, span.len)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl ExactSizeIterator for RowFields<'_> {}

/// Iterator over the rows of a [`CsvDocument`]
#[derive(Debug, Clone)]
pub struct Rows<'d> {
    document: &'d CsvDocument,
    next: usize,
}

impl<'d> Iterator for Rows<'d> {
    type Item = RowView<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.document.row(self.next)?;
        self.next += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.document.len() - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Rows<'_> {}

/// Tokenizes `buffer` into rows that borrow it directly
pub fn parse_rows<'a>(buffer: &'a [u8], dialect: &Dialect) -> Vec<Row<'a>> {
    split_lines(buffer)
        .map(|line| tokenize_line(line, dialect))
        .collect()
}
