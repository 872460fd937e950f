//! # Tabu CSV
//!
//! A zero-copy CSV tokenizer with checked text-to-value conversion, built for
//! loading table-driven configuration data into typed records.
//!
//! ## Overview
//!
//! A [`CsvDocument`] owns the raw file bytes. Parsing splits the buffer into
//! trimmed, non-empty lines and each line into fields; every field is a
//! [`ByteSlice`] view into the document's buffer, so nothing is copied until
//! a field is converted. Conversions never guess: empty text, stray
//! characters and out-of-range numbers are reported as errors instead of
//! silently turning into zero.
//!
//! ## Key Features
//!
//! - **Zero-Copy Fields**: Rows and fields borrow the document buffer
//! - **Quoted Fields**: Delimiters inside `"..."` stay part of the field
//! - **Checked Conversion**: Overflow-checked integers, `strtod`-style floats, booleans
//! - **Delimited Values**: `1|2|3` arrays and `hp=10|mp=5` maps inside one field
//! - **Serde Integration**: Use `#[derive(Deserialize)]` on record structs
//! - **Key/Value Tables**: Load `Key,Value` sheets into a single settings struct
//! - **Escape Codecs**: C-style, URI and hex escaping helpers
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! tabu-csv = "0.1"
//! serde = { version = "1.0", features = ["derive"] }
//! ```
//!
//! ## Basic Usage
//!
//! ```rust
//! use serde::Deserialize;
//! use tabu_csv::from_str;
//!
//! #[derive(Debug, Deserialize)]
//! #[serde(rename_all = "PascalCase")]
//! struct Item {
//!     id: u32,
//!     name: String,
//!     tags: Vec<String>,
//! }
//!
//! let text = "Id,Name,Tags\n1,Potion,consumable|stackable\n2,\"Sword, long\",weapon\n";
//!
//! let items: Vec<Item> = from_str(text)?;
//! assert_eq!(items[1].name, "Sword, long");
//! assert_eq!(items[0].tags, vec!["consumable", "stackable"]);
//! # Ok::<(), tabu_csv::CsvError>(())
//! ```
//!
//! ## Working With Rows Directly
//!
//! ```rust
//! use tabu_csv::{CsvDocument, Dialect, convert};
//!
//! let document = CsvDocument::from_bytes("\u{feff}a,\"b,c\",d\r\n\r\n1,2,3\n", Dialect::default());
//! assert_eq!(document.len(), 2);
//!
//! let row = document.row(0).unwrap();
//! assert_eq!(row.get(1).unwrap(), "b,c");
//!
//! let value: u8 = convert::to_unsigned(document.row(1).unwrap().get(2).unwrap())?;
//! assert_eq!(value, 3);
//! # Ok::<(), tabu_csv::ConvertError>(())
//! ```
//!
//! ## Error Handling
//!
//! Field errors carry the column name and the row/column location:
//!
//! ```rust
//! use serde::Deserialize;
//! use tabu_csv::{from_str, ConvertErrorKind, CsvError, RecordError};
//!
//! #[derive(Debug, Deserialize)]
//! struct Row {
//!     level: u8,
//! }
//!
//! match from_str::<Row>("level\n300\n") {
//!     Err(CsvError::Record(RecordError::Field { column, location, source })) => {
//!         assert_eq!(column, "level");
//!         assert_eq!(location.row, 2);
//!         assert_eq!(source.kind(), ConvertErrorKind::Overflow);
//!     }
//!     other => panic!("unexpected result: {:?}", other),
//! }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events (file reads and parse completion at
//! `debug`, extra record fields at `warn`). It never installs a subscriber.

pub mod config;
pub mod convert;
pub mod deserializer;
pub mod document;
pub mod error;
pub mod escape;
pub mod lines;
pub mod record;
pub mod slice;
pub mod tokenizer;
pub mod writer;


// Re-export main types and functions
pub use config::{CsvConfig, Dialect};
pub use convert::FromField;
pub use deserializer::{
    RecordDeserializer, from_document, from_file, from_file_with_config, from_slice,
    from_slice_with_config, from_str, from_str_with_config, key_values_from_document,
};
pub use document::{CsvDocument, RowFields, RowView, Rows, parse_rows};
pub use error::{ConvertError, ConvertErrorKind, CsvError, Location, RecordError, SerdeError};
pub use lines::{Lines, UTF8_BOM, split_lines};
pub use record::{Header, KeyValueTable, Record, Records};
pub use slice::{ByteSlice, Split, join};
pub use tokenizer::{Fields, Row, tokenize_line};
pub use writer::{append_field, append_row, write_rows};
