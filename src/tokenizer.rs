//! Field tokenizer for a single logical line
//!
//! A field that starts with the quote byte runs until a quote that is
//! directly followed by the delimiter or by the end of the line. Quotes are
//! not escaped by doubling: any other quote inside a quoted field is plain
//! content. A quoted field that is never closed takes the rest of the line.
//!
//! Every delimiter separates two fields, so `,,` has three empty fields and
//! a trailing delimiter produces a trailing empty field.

use crate::config::Dialect;
use crate::slice::ByteSlice;
use smallvec::SmallVec;

/// The fields of one line, in column order
pub type Row<'a> = SmallVec<[ByteSlice<'a>; 8]>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Positioned at the start of a field
    Field,
    /// The last field has been yielded
    Done,
}

/// Iterator over the fields of a line
#[derive(Debug, Clone)]
pub struct Fields<'a> {
    rest: ByteSlice<'a>,
    dialect: Dialect,
    state: State,
}

impl<'a> Fields<'a> {
    /// Creates a field iterator over `line`
    pub fn new(line: ByteSlice<'a>, dialect: Dialect) -> Self {
        Self {
            rest: line,
            dialect,
            state: State::Field,
        }
    }

    fn next_plain(&mut self) -> ByteSlice<'a> {
        match self.rest.find(self.dialect.delimiter) {
            Some(end) => {
                let field = self.rest.subslice(0, end);
                self.rest.advance(end + 1);
                field
            }
            None => {
                self.state = State::Done;
                self.rest
            }
        }
    }

    fn next_quoted(&mut self, quote: u8) -> ByteSlice<'a> {
        let body = self.rest.tail(1);
        let delimiter = self.dialect.delimiter;

        let mut search = 0;
        while let Some(found) = body.tail(search).find(quote) {
            let close = search + found;
            match body.get(close + 1) {
                None => {
                    self.state = State::Done;
                    return body.subslice(0, close);
                }
                Some(b) if b == delimiter => {
                    self.rest = body.tail(close + 2);
                    return body.subslice(0, close);
                }
                Some(_) => search = close + 1,
            }
        }

        // Unterminated
        self.state = State::Done;
        body
    }
}

impl<'a> Iterator for Fields<'a> {
    type Item = ByteSlice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == State::Done {
            return None;
        }
        let field = match self.dialect.quote {
            Some(quote) if self.rest.first() == Some(quote) => self.next_quoted(quote),
            _ => self.next_plain(),
        };
        Some(field)
    }
}

impl std::iter::FusedIterator for Fields<'_> {}

/// Splits a line into its fields
pub fn tokenize_line<'a>(line: ByteSlice<'a>, dialect: &Dialect) -> Row<'a> {
    Fields::new(line, *dialect).collect()
}
