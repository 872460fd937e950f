//! Header-keyed access to document rows
//!
//! A [`Header`] maps column names to positions. [`Record`] pairs a data row
//! with its header so fields can be looked up and converted by name, and
//! [`KeyValueTable`] reads a two-column `Key`/`Value` layout into a lookup
//! table.

use crate::config::CsvConfig;
use crate::convert::{self, FromField};
use crate::document::{CsvDocument, RowView, Rows};
use crate::error::{ConvertError, CsvError, Location, RecordError};
use crate::slice::ByteSlice;
use indexmap::IndexMap;
use std::hash::Hash;
use std::sync::Arc;

/// Column names of a table, in column order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    columns: IndexMap<String, usize>,
    width: usize,
}

impl Header {
    /// Builds a header from the fields of a row
    ///
    /// Names are trimmed. Blank names leave their column unnamed; a name
    /// that appears twice is an error.
    pub fn from_row<'a>(fields: impl IntoIterator<Item = ByteSlice<'a>>) -> Result<Self, RecordError> {
        let mut columns: IndexMap<String, usize> = IndexMap::new();
        let mut width = 0;
        for (index, field) in fields.into_iter().enumerate() {
            width = index + 1;
            let name = field.trim();
            if name.is_empty() {
                continue;
            }
            let name = name.to_string_lossy();
            if columns.contains_key(&name) {
                return Err(RecordError::DuplicateColumn { name });
            }
            columns.insert(name, index);
        }
        Ok(Self { columns, width })
    }

    /// Returns the position of the column called `name`
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.get(name).copied()
    }

    /// Returns true if a column is called `name`
    pub fn contains(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Returns the number of named columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns true if no column is named
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Returns the number of fields in the header row, named or not
    pub fn width(&self) -> usize {
        self.width
    }

    /// Iterates over column names and positions in column order
    pub fn columns(&self) -> impl Iterator<Item = (&str, usize)> + '_ {
        self.columns.iter().map(|(name, &index)| (name.as_str(), index))
    }

    pub(crate) fn raw_columns(&self) -> indexmap::map::Iter<'_, String, usize> {
        self.columns.iter()
    }
}

/// Field handling shared by records and key/value tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldOptions {
    pub(crate) array_delimiter: u8,
    pub(crate) map_delimiter: u8,
    pub(crate) trim: bool,
}

impl FieldOptions {
    pub(crate) fn from_config(config: &CsvConfig) -> Self {
        Self {
            array_delimiter: config.array_delimiter,
            map_delimiter: config.map_delimiter,
            trim: config.trim_fields,
        }
    }

    fn apply<'d>(&self, field: ByteSlice<'d>) -> ByteSlice<'d> {
        if self.trim { field.trim() } else { field }
    }
}

fn field_error(column: &str, location: Location, source: ConvertError) -> RecordError {
    RecordError::Field {
        column: column.to_string(),
        location,
        source,
    }
}

/// One data row together with its header
#[derive(Debug, Clone)]
pub struct Record<'d> {
    header: Arc<Header>,
    row: RowView<'d>,
    options: FieldOptions,
}

impl<'d> Record<'d> {
    /// Returns the header this record is keyed by
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Returns the underlying row
    pub fn row(&self) -> RowView<'d> {
        self.row
    }

    /// Returns the 1-based row number within the document
    pub fn number(&self) -> usize {
        self.row.index() + 1
    }

    /// Returns the number of fields in the row
    pub fn len(&self) -> usize {
        self.row.len()
    }

    /// Returns true if the row has no fields
    pub fn is_empty(&self) -> bool {
        self.row.is_empty()
    }

    /// Returns the field at `column`, trimmed if configured
    pub fn get_index(&self, column: usize) -> Option<ByteSlice<'d>> {
        self.row.get(column).map(|f| self.options.apply(f))
    }

    /// Returns the field under the column called `name`
    pub fn get(&self, name: &str) -> Option<ByteSlice<'d>> {
        self.header.position(name).and_then(|i| self.get_index(i))
    }

    /// Returns the field under `name`, or an empty field when the row is
    /// shorter than the header
    pub fn field(&self, name: &str) -> Result<ByteSlice<'d>, RecordError> {
        let index = self.column_index(name)?;
        Ok(self.get_index(index).unwrap_or_default())
    }

    /// Returns the location of the field under `name`
    pub fn location(&self, name: &str) -> Result<Location, RecordError> {
        Ok(Location::new(self.number(), self.column_index(name)?))
    }

    /// Converts the field under `name`
    pub fn parse<T: FromField>(&self, name: &str) -> Result<T, RecordError> {
        self.convert(name, T::from_field)
    }

    /// Converts the field under `name` as a delimited list
    pub fn parse_array<T: FromField>(&self, name: &str) -> Result<Vec<T>, RecordError> {
        let delimiter = self.options.array_delimiter;
        self.convert(name, |field| convert::parse_array(field, delimiter))
    }

    /// Converts the field under `name` as a delimited map
    pub fn parse_map<K, V>(&self, name: &str) -> Result<IndexMap<K, V>, RecordError>
    where
        K: FromField + Eq + Hash,
        V: FromField,
    {
        let FieldOptions {
            array_delimiter,
            map_delimiter,
            ..
        } = self.options;
        self.convert(name, |field| {
            convert::parse_map(field, array_delimiter, map_delimiter)
        })
    }

    /// Iterates over named columns and their fields
    pub fn iter(&self) -> impl Iterator<Item = (&str, ByteSlice<'d>)> + '_ {
        self.header
            .columns()
            .map(|(name, index)| (name, self.get_index(index).unwrap_or_default()))
    }

    pub(crate) fn options(&self) -> FieldOptions {
        self.options
    }

    fn column_index(&self, name: &str) -> Result<usize, RecordError> {
        self.header
            .position(name)
            .ok_or_else(|| RecordError::MissingColumn {
                name: name.to_string(),
            })
    }

    fn convert<T>(
        &self,
        name: &str,
        f: impl FnOnce(ByteSlice<'d>) -> Result<T, ConvertError>,
    ) -> Result<T, RecordError> {
        let location = self.location(name)?;
        let field = self.get_index(location.column).unwrap_or_default();
        f(field).map_err(|e| field_error(name, location, e))
    }
}

/// Iterator over the data rows of a document as [`Record`]s
#[derive(Debug, Clone)]
pub struct Records<'d> {
    header: Arc<Header>,
    rows: Rows<'d>,
    options: FieldOptions,
}

impl<'d> Records<'d> {
    /// Reads the header row and positions the iterator at the first data row
    ///
    /// An empty document has no header and yields no records.
    pub fn new(document: &'d CsvDocument, config: &CsvConfig) -> Result<Self, CsvError> {
        let header = if document.is_empty() {
            Header::default()
        } else {
            let row = document
                .row(config.header_row)
                .ok_or(RecordError::MissingHeader {
                    row: config.header_row,
                })?;
            Header::from_row(row)?
        };

        Ok(Self {
            header: Arc::new(header),
            rows: document.rows_from(config.data_start_row),
            options: FieldOptions::from_config(config),
        })
    }

    /// Returns the header shared by all records
    pub fn header(&self) -> &Header {
        &self.header
    }
}

impl<'d> Iterator for Records<'d> {
    type Item = Record<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let row = self.rows.next()?;
        if row.len() > self.header.width() {
            tracing::warn!(
                row = row.index() + 1,
                fields = row.len(),
                columns = self.header.width(),
                "record has more fields than the header; extra fields ignored"
            );
        }
        Some(Record {
            header: Arc::clone(&self.header),
            row,
            options: self.options,
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.rows.size_hint()
    }
}

impl ExactSizeIterator for Records<'_> {}

/// Lookup table read from the key and value columns of a document
#[derive(Debug, Clone)]
pub struct KeyValueTable<'d> {
    entries: IndexMap<ByteSlice<'d>, (ByteSlice<'d>, Location)>,
    options: FieldOptions,
}

impl<'d> KeyValueTable<'d> {
    /// Builds the table from `config.key_column` and `config.value_column`
    ///
    /// Rows with a blank key are skipped. A key that appears on two rows is
    /// a [`ConvertError::DuplicateKey`].
    pub fn from_document(document: &'d CsvDocument, config: &CsvConfig) -> Result<Self, CsvError> {
        let records = document.records(config)?;
        let missing = |name: &str| RecordError::MissingColumn {
            name: name.to_string(),
        };
        let (key_column, value_column) = if records.header().is_empty() {
            (0, 1)
        } else {
            let header = records.header();
            (
                header
                    .position(&config.key_column)
                    .ok_or_else(|| missing(&config.key_column))?,
                header
                    .position(&config.value_column)
                    .ok_or_else(|| missing(&config.value_column))?,
            )
        };

        let mut entries: IndexMap<ByteSlice<'d>, (ByteSlice<'d>, Location)> = IndexMap::new();
        for record in records {
            let key = record
                .row()
                .get(key_column)
                .map(ByteSlice::trim)
                .unwrap_or_default();
            if key.is_empty() {
                continue;
            }
            if entries.contains_key(key.as_bytes()) {
                return Err(ConvertError::duplicate(key.as_bytes()).into());
            }
            let value = record.get_index(value_column).unwrap_or_default();
            entries.insert(key, (value, Location::new(record.number(), value_column)));
        }

        Ok(Self {
            entries,
            options: FieldOptions::from_config(config),
        })
    }

    /// Returns the number of keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no keys
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if `key` has an entry
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key.as_bytes())
    }

    /// Returns the value for `key`
    pub fn get(&self, key: &str) -> Option<ByteSlice<'d>> {
        self.entries.get(key.as_bytes()).map(|(value, _)| *value)
    }

    /// Returns the location of the value for `key`
    pub fn location(&self, key: &str) -> Option<Location> {
        self.entries.get(key.as_bytes()).map(|(_, location)| *location)
    }

    /// Converts the value for `key`
    pub fn parse<T: FromField>(&self, key: &str) -> Result<T, RecordError> {
        self.convert(key, T::from_field)
    }

    /// Converts the value for `key` as a delimited list
    pub fn parse_array<T: FromField>(&self, key: &str) -> Result<Vec<T>, RecordError> {
        let delimiter = self.options.array_delimiter;
        self.convert(key, |field| convert::parse_array(field, delimiter))
    }

    /// Converts the value for `key` as a delimited map
    pub fn parse_map<K, V>(&self, key: &str) -> Result<IndexMap<K, V>, RecordError>
    where
        K: FromField + Eq + Hash,
        V: FromField,
    {
        let FieldOptions {
            array_delimiter,
            map_delimiter,
            ..
        } = self.options;
        self.convert(key, |field| {
            convert::parse_map(field, array_delimiter, map_delimiter)
        })
    }

    /// Iterates over keys and values in row order
    pub fn iter(&self) -> impl Iterator<Item = (ByteSlice<'d>, ByteSlice<'d>)> + '_ {
        self.entries.iter().map(|(key, (value, _))| (*key, *value))
    }

    pub(crate) fn raw_entries(&self) -> indexmap::map::Iter<'_, ByteSlice<'d>, (ByteSlice<'d>, Location)> {
        self.entries.iter()
    }

    pub(crate) fn options(&self) -> FieldOptions {
        self.options
    }

    fn convert<T>(
        &self,
        key: &str,
        f: impl FnOnce(ByteSlice<'d>) -> Result<T, ConvertError>,
    ) -> Result<T, RecordError> {
        let (value, location) = self
            .entries
            .get(key.as_bytes())
            .copied()
            .ok_or_else(|| RecordError::MissingKey {
                key: key.to_string(),
            })?;
        f(value).map_err(|e| field_error(key, location, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Dialect;
    use crate::error::ConvertErrorKind;

    fn document(text: &str) -> CsvDocument {
        CsvDocument::from_bytes(text, Dialect::default())
    }

    #[test]
    fn test_header_positions() {
        let doc = document(" Id , Name ,,Level\n");
        let header = Header::from_row(doc.row(0).unwrap()).unwrap();
        assert_eq!(header.position("Id"), Some(0));
        assert_eq!(header.position("Name"), Some(1));
        assert_eq!(header.position("Level"), Some(3));
        assert_eq!(header.position("Missing"), None);
        assert_eq!(header.len(), 3);
        assert_eq!(header.width(), 4);
    }

    #[test]
    fn test_header_duplicate_column() {
        let doc = document("Id,Name,Id\n");
        let err = Header::from_row(doc.row(0).unwrap()).unwrap_err();
        assert!(matches!(err, RecordError::DuplicateColumn { name } if name == "Id"));
    }

    #[test]
    fn test_record_lookup_and_parse() {
        let doc = document("Id,Name,Tags,Stats\n1, Sword ,a|b,hp=10|mp=5\n");
        let config = CsvConfig::default();
        let record = doc.records(&config).unwrap().next().unwrap();

        assert_eq!(record.number(), 2);
        assert_eq!(record.get("Name").unwrap(), "Sword");
        assert_eq!(record.parse::<u32>("Id").unwrap(), 1);
        assert_eq!(record.parse::<String>("Name").unwrap(), "Sword");
        assert_eq!(record.parse_array::<String>("Tags").unwrap(), vec!["a", "b"]);

        let stats: IndexMap<String, i32> = record.parse_map("Stats").unwrap();
        assert_eq!(stats["hp"], 10);
        assert_eq!(stats["mp"], 5);
    }

    #[test]
    fn test_record_errors_carry_location() {
        let doc = document("Id,Level\n1,abc\n");
        let config = CsvConfig::default();
        let record = doc.records(&config).unwrap().next().unwrap();

        match record.parse::<i32>("Level").unwrap_err() {
            RecordError::Field {
                column,
                location,
                source,
            } => {
                assert_eq!(column, "Level");
                assert_eq!(location, Location::new(2, 1));
                assert_eq!(source.kind(), ConvertErrorKind::Format);
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(matches!(
            record.parse::<i32>("Nope"),
            Err(RecordError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_short_row_reads_empty_fields() {
        let doc = document("Id,Level\n7\n");
        let config = CsvConfig::default();
        let record = doc.records(&config).unwrap().next().unwrap();
        assert_eq!(record.parse::<Option<i32>>("Level").unwrap(), None);
        let err = record.parse::<i32>("Level").unwrap_err();
        assert!(matches!(
            err,
            RecordError::Field {
                source: ConvertError::EmptyInput { .. },
                ..
            }
        ));
    }

    #[test]
    fn test_records_layout_skips_rows() {
        let doc = document("Id,Name\nint,string\n1,a\n2,b\n");
        let config = CsvConfig::default().with_layout(0, 2);
        let names: Vec<String> = doc
            .records(&config)
            .unwrap()
            .map(|r| r.parse::<String>("Name").unwrap())
            .collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_records_missing_header_row() {
        let doc = document("Id\n");
        let config = CsvConfig::default().with_layout(3, 4);
        assert!(matches!(
            doc.records(&config),
            Err(CsvError::Record(RecordError::MissingHeader { row: 3 }))
        ));

        let empty = document("");
        assert_eq!(empty.records(&config).unwrap().count(), 0);
    }

    #[test]
    fn test_untrimmed_fields() {
        let doc = document("Name\n  padded  \n");
        let config = CsvConfig::default().with_trim_fields(false);
        let record = doc.records(&config).unwrap().next().unwrap();
        assert_eq!(record.get("Name").unwrap(), "  padded  ");
    }

    #[test]
    fn test_record_iter() {
        let doc = document("A,B\n1\n");
        let config = CsvConfig::default();
        let record = doc.records(&config).unwrap().next().unwrap();
        let pairs: Vec<(String, String)> = record
            .iter()
            .map(|(name, value)| (name.to_string(), value.to_string_lossy()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), String::new())
            ]
        );
    }

    #[test]
    fn test_key_value_table() {
        let doc = document("Key,Type,Value\nMaxLevel,int,60\nStartItems,int[],1|2|3\n,int,9\n");
        let config = CsvConfig::default();
        let table = KeyValueTable::from_document(&doc, &config).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.parse::<u32>("MaxLevel").unwrap(), 60);
        assert_eq!(table.parse_array::<u32>("StartItems").unwrap(), vec![1, 2, 3]);
        assert_eq!(table.location("MaxLevel"), Some(Location::new(2, 2)));
        assert!(matches!(
            table.parse::<u32>("Nope"),
            Err(RecordError::MissingKey { .. })
        ));
    }

    #[test]
    fn test_key_value_table_duplicate_key() {
        let doc = document("Key,Value\na,1\na,2\n");
        let err = KeyValueTable::from_document(&doc, &CsvConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CsvError::Convert(ConvertError::DuplicateKey { key }) if key == "a"
        ));
    }

    #[test]
    fn test_key_value_table_custom_columns() {
        let doc = document("Name,Setting\nspeed,1.5\n");
        let config = CsvConfig::default().with_key_value_columns("Name", "Setting");
        let table = KeyValueTable::from_document(&doc, &config).unwrap();
        assert_eq!(table.parse::<f64>("speed").unwrap(), 1.5);

        let err = KeyValueTable::from_document(&doc, &CsvConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            CsvError::Record(RecordError::MissingColumn { name }) if name == "Key"
        ));
    }
}
