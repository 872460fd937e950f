//! Dialect and loading configuration

/// Delimiter and quote bytes used to tokenize a line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Dialect {
    /// Field separator
    pub delimiter: u8,
    /// Quote byte that protects embedded delimiters, if any
    pub quote: Option<u8>,
}

impl Dialect {
    /// Creates a dialect with the given delimiter and quote
    pub const fn new(delimiter: u8, quote: Option<u8>) -> Self {
        Self { delimiter, quote }
    }

    /// Tab-separated fields with `"` quoting
    pub const fn tab() -> Self {
        Self::new(b'\t', Some(b'"'))
    }

    /// Sets the field delimiter
    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Sets the quote byte
    pub fn with_quote(mut self, quote: u8) -> Self {
        self.quote = Some(quote);
        self
    }

    /// Disables quoted fields
    pub fn without_quote(mut self) -> Self {
        self.quote = None;
        self
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::new(b',', Some(b'"'))
    }
}

/// Configuration for loading typed records out of a parsed document
#[derive(Debug, Clone)]
pub struct CsvConfig {
    /// Tokenizer dialect
    pub dialect: Dialect,
    /// Separator between array elements and between map entries
    pub array_delimiter: u8,
    /// Separator between a map key and its value
    pub map_delimiter: u8,
    /// Trim ASCII whitespace around each field before conversion
    pub trim_fields: bool,
    /// Index of the row holding column names
    pub header_row: usize,
    /// Index of the first data row
    pub data_start_row: usize,
    /// Column holding keys in key/value tables
    pub key_column: String,
    /// Column holding values in key/value tables
    pub value_column: String,
}

impl CsvConfig {
    /// Creates a configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the tokenizer dialect
    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    /// Sets the array and map-entry separator
    pub fn with_array_delimiter(mut self, delimiter: u8) -> Self {
        self.array_delimiter = delimiter;
        self
    }

    /// Sets the key/value separator inside map entries
    pub fn with_map_delimiter(mut self, delimiter: u8) -> Self {
        self.map_delimiter = delimiter;
        self
    }

    /// Sets whether fields are trimmed before conversion
    pub fn with_trim_fields(mut self, trim: bool) -> Self {
        self.trim_fields = trim;
        self
    }

    /// Sets the header row and the first data row
    ///
    /// Rows between the two (comment or type rows) are skipped.
    pub fn with_layout(mut self, header_row: usize, data_start_row: usize) -> Self {
        self.header_row = header_row;
        self.data_start_row = data_start_row.max(header_row + 1);
        self
    }

    /// Sets the key and value column names used by key/value tables
    pub fn with_key_value_columns(
        mut self,
        key_column: impl Into<String>,
        value_column: impl Into<String>,
    ) -> Self {
        self.key_column = key_column.into();
        self.value_column = value_column.into();
        self
    }
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            array_delimiter: b'|',
            map_delimiter: b'=',
            trim_fields: true,
            header_row: 0,
            data_start_row: 1,
            key_column: "Key".to_string(),
            value_column: "Value".to_string(),
        }
    }
}
