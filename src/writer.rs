//! Writing rows back out as CSV text
//!
//! Fields are quoted only when the tokenizer would otherwise read them back
//! differently. Quoted fields have no escape for an embedded quote, so a
//! field holding the quote byte directly followed by the delimiter cannot be
//! written; neither can a field holding a line break.

use crate::config::Dialect;
use crate::error::{ConvertError, CsvError};
use crate::slice::is_ascii_whitespace;
use std::io::Write;

fn needs_quotes(field: &[u8], dialect: &Dialect, sole_field: bool) -> bool {
    let edge_space = |b: Option<&u8>| b.is_some_and(|&b| is_ascii_whitespace(b));
    field.contains(&dialect.delimiter)
        || (dialect.quote.is_some() && field.first() == dialect.quote.as_ref())
        || edge_space(field.first())
        || edge_space(field.last())
        || (sole_field && field.is_empty())
}

fn append_field_inner(
    out: &mut Vec<u8>,
    field: &[u8],
    dialect: &Dialect,
    sole_field: bool,
) -> Result<(), ConvertError> {
    if field.iter().any(|&b| b == b'\n' || b == b'\r') {
        return Err(ConvertError::format(field, "line break inside a field"));
    }
    if !needs_quotes(field, dialect, sole_field) {
        out.extend_from_slice(field);
        return Ok(());
    }
    let Some(quote) = dialect.quote else {
        if field.contains(&dialect.delimiter) {
            return Err(ConvertError::format(
                field,
                "delimiter inside a field and no quote byte",
            ));
        }
        out.extend_from_slice(field);
        return Ok(());
    };
    if field
        .windows(2)
        .any(|pair| pair[0] == quote && pair[1] == dialect.delimiter)
    {
        return Err(ConvertError::format(
            field,
            "quote followed by delimiter cannot be quoted",
        ));
    }
    out.push(quote);
    out.extend_from_slice(field);
    out.push(quote);
    Ok(())
}

/// Appends one field, quoting it if needed
pub fn append_field(out: &mut Vec<u8>, field: &[u8], dialect: &Dialect) -> Result<(), ConvertError> {
    append_field_inner(out, field, dialect, false)
}

/// Appends a row of fields followed by `\n`
///
/// On error `out` is left as it was.
pub fn append_row<I>(out: &mut Vec<u8>, fields: I, dialect: &Dialect) -> Result<(), ConvertError>
where
    I: IntoIterator,
    I::Item: AsRef<[u8]>,
{
    let start = out.len();
    let mut fields = fields.into_iter().peekable();
    let mut first = true;
    while let Some(field) = fields.next() {
        if !first {
            out.push(dialect.delimiter);
        }
        let sole_field = first && fields.peek().is_none();
        if let Err(e) = append_field_inner(out, field.as_ref(), dialect, sole_field) {
            out.truncate(start);
            return Err(e);
        }
        first = false;
    }
    out.push(b'\n');
    Ok(())
}

/// Writes rows of fields to `writer`
pub fn write_rows<W, R, F>(mut writer: W, rows: R, dialect: &Dialect) -> Result<(), CsvError>
where
    W: Write,
    R: IntoIterator<Item = F>,
    F: IntoIterator,
    F::Item: AsRef<[u8]>,
{
    let mut line = Vec::new();
    for row in rows {
        line.clear();
        append_row(&mut line, row, dialect)?;
        writer.write_all(&line)?;
    }
    writer.flush()?;
    Ok(())
}
