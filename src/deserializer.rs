//! Serde deserializer implementation for CSV records
//!
//! Each data row deserializes as a map from column name to field, so the
//! standard serde derive macros can load a table straight into structs.
//! Fields are converted with the checked parsers in [`crate::convert`];
//! sequence fields are split on the array delimiter and map fields on the
//! array delimiter and then the map delimiter.

use crate::config::CsvConfig;
use crate::convert;
use crate::document::CsvDocument;
use crate::error::{ConvertError, CsvError, Location, RecordError, SerdeError};
use crate::record::{FieldOptions, KeyValueTable, Record};
use crate::slice::{ByteSlice, Split};
use serde::de::{self, DeserializeOwned, DeserializeSeed, Visitor};
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashSet;
use std::path::Path;

/// Deserializer for one record
///
/// Structs and maps read fields by column name; sequences and tuples read
/// fields by position.
pub struct RecordDeserializer<'r, 'd> {
    record: &'r Record<'d>,
}

impl<'r, 'd> RecordDeserializer<'r, 'd> {
    /// Creates a deserializer over `record`
    pub fn new(record: &'r Record<'d>) -> Self {
        Self { record }
    }

    fn mismatch(expected: &str) -> CsvError {
        CsvError::Serde(SerdeError::TypeMismatch {
            expected: expected.to_string(),
            found: "record".to_string(),
        })
    }
}

macro_rules! reject_scalar {
    ($($method:ident => $expected:literal),* $(,)?) => {
        $(
            fn $method<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                Err(Self::mismatch($expected))
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for RecordDeserializer<'_, 'de> {
    type Error = CsvError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    reject_scalar! {
        deserialize_bool => "boolean",
        deserialize_i8 => "integer",
        deserialize_i16 => "integer",
        deserialize_i32 => "integer",
        deserialize_i64 => "integer",
        deserialize_u8 => "integer",
        deserialize_u16 => "integer",
        deserialize_u32 => "integer",
        deserialize_u64 => "integer",
        deserialize_f32 => "float",
        deserialize_f64 => "float",
        deserialize_char => "character",
        deserialize_str => "string",
        deserialize_string => "string",
        deserialize_bytes => "bytes",
        deserialize_byte_buf => "bytes",
        deserialize_unit => "unit",
        deserialize_identifier => "identifier",
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_seq(RecordSeqAccess {
            record: self.record,
            next: 0,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_map(RecordMapAccess {
            record: self.record,
            columns: self.record.header().raw_columns(),
            current: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        _visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(CsvError::Serde(SerdeError::Unsupported("enum as a whole record")))
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Map access over the named columns of a record
struct RecordMapAccess<'r, 'd> {
    record: &'r Record<'d>,
    columns: indexmap::map::Iter<'r, String, usize>,
    current: Option<(&'r str, usize)>,
}

impl<'de> de::MapAccess<'de> for RecordMapAccess<'_, 'de> {
    type Error = CsvError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.columns.next() {
            Some((name, &index)) => {
                self.current = Some((name.as_str(), index));
                seed.deserialize(de::value::StrDeserializer::<CsvError>::new(name))
                    .map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let (name, index) = self.current.take().ok_or_else(|| {
            CsvError::Serde(SerdeError::Custom(
                "value requested before key".to_string(),
            ))
        })?;
        let field = self.record.get_index(index).unwrap_or_default();
        seed.deserialize(FieldDeserializer::new(
            field,
            Cow::Borrowed(name),
            Location::new(self.record.number(), index),
            self.record.options(),
        ))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.columns.len())
    }
}

/// Sequence access over the fields of a record, by position
struct RecordSeqAccess<'r, 'd> {
    record: &'r Record<'d>,
    next: usize,
}

impl<'de> de::SeqAccess<'de> for RecordSeqAccess<'_, 'de> {
    type Error = CsvError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        let index = self.next;
        let Some(field) = self.record.get_index(index) else {
            return Ok(None);
        };
        self.next += 1;
        seed.deserialize(FieldDeserializer::new(
            field,
            Cow::Owned(format!("#{}", index)),
            Location::new(self.record.number(), index),
            self.record.options(),
        ))
        .map(Some)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.record.len().saturating_sub(self.next))
    }
}

/// Deserializer for a single field
pub(crate) struct FieldDeserializer<'c, 'd> {
    field: ByteSlice<'d>,
    column: Cow<'c, str>,
    location: Location,
    options: FieldOptions,
}

impl<'c, 'd> FieldDeserializer<'c, 'd> {
    fn new(field: ByteSlice<'d>, column: Cow<'c, str>, location: Location, options: FieldOptions) -> Self {
        Self {
            field,
            column,
            location,
            options,
        }
    }

    /// Deserializer for a piece of this field (array element, map key or value)
    fn element(&self, field: ByteSlice<'d>) -> Self {
        Self {
            field,
            column: self.column.clone(),
            location: self.location,
            options: self.options,
        }
    }

    fn fail(&self, source: ConvertError) -> CsvError {
        CsvError::Record(RecordError::Field {
            column: self.column.to_string(),
            location: self.location,
            source,
        })
    }

    fn text(&self) -> Result<&'d str, CsvError> {
        self.field.to_str().map_err(|e| {
            self.fail(ConvertError::format(
                self.field.as_bytes(),
                format!("invalid UTF-8: {}", e),
            ))
        })
    }
}

macro_rules! deserialize_number {
    ($($method:ident => $visit:ident($convert:ident::<$ty:ty>)),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                let value = convert::$convert::<$ty>(self.field).map_err(|e| self.fail(e))?;
                visitor.$visit(value)
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for FieldDeserializer<'_, 'de> {
    type Error = CsvError;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        match self.field.to_str() {
            Ok(text) => visitor.visit_borrowed_str(text),
            Err(_) => visitor.visit_borrowed_bytes(self.field.as_bytes()),
        }
    }

    fn deserialize_bool<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_bool(convert::to_bool(self.field))
    }

    deserialize_number! {
        deserialize_i8 => visit_i8(to_signed::<i8>),
        deserialize_i16 => visit_i16(to_signed::<i16>),
        deserialize_i32 => visit_i32(to_signed::<i32>),
        deserialize_i64 => visit_i64(to_signed::<i64>),
        deserialize_u8 => visit_u8(to_unsigned::<u8>),
        deserialize_u16 => visit_u16(to_unsigned::<u16>),
        deserialize_u32 => visit_u32(to_unsigned::<u32>),
        deserialize_u64 => visit_u64(to_unsigned::<u64>),
        deserialize_f32 => visit_f32(to_float::<f32>),
        deserialize_f64 => visit_f64(to_float::<f64>),
    }

    fn deserialize_i128<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(CsvError::Serde(SerdeError::Unsupported("i128")))
    }

    fn deserialize_u128<V>(self, _visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        Err(CsvError::Serde(SerdeError::Unsupported("u128")))
    }

    fn deserialize_char<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let text = self.text()?;
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => Err(self.fail(ConvertError::format(
                self.field.as_bytes(),
                "expected a single character",
            ))),
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text()?)
    }

    fn deserialize_string<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_bytes<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_bytes(self.field.as_bytes())
    }

    fn deserialize_byte_buf<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_bytes(visitor)
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.field.trim().is_empty() {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_unit<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.field.trim().is_empty() {
            visitor.visit_unit()
        } else {
            Err(CsvError::Serde(SerdeError::TypeMismatch {
                expected: "empty field".to_string(),
                found: self.field.to_string_lossy(),
            }))
        }
    }

    fn deserialize_unit_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_unit(visitor)
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_seq<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let elements = self.field.trim().split_nonempty(self.options.array_delimiter);
        visitor.visit_seq(FieldSeqAccess {
            parent: self,
            elements,
        })
    }

    fn deserialize_tuple<V>(self, _len: usize, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_tuple_struct<V>(
        self,
        _name: &'static str,
        _len: usize,
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_seq(visitor)
    }

    fn deserialize_map<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let entries = self.field.trim().split_nonempty(self.options.array_delimiter);
        visitor.visit_map(FieldMapAccess {
            parent: self,
            entries,
            seen: HashSet::new(),
            value: None,
        })
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        _fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_map(visitor)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let text = self.text()?.trim();
        visitor
            .visit_enum(de::value::BorrowedStrDeserializer::<CsvError>::new(text))
            .map_err(|e| match e {
                CsvError::Serde(SerdeError::Custom(message)) => {
                    self.fail(ConvertError::format(self.field.as_bytes(), message))
                }
                other => other,
            })
    }

    fn deserialize_identifier<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        self.deserialize_str(visitor)
    }

    fn deserialize_ignored_any<V>(self, visitor: V) -> Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_unit()
    }
}

/// Sequence access over the elements of a delimited field
struct FieldSeqAccess<'c, 'd> {
    parent: FieldDeserializer<'c, 'd>,
    elements: Split<'d>,
}

impl<'de> de::SeqAccess<'de> for FieldSeqAccess<'_, 'de> {
    type Error = CsvError;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Self::Error>
    where
        T: DeserializeSeed<'de>,
    {
        for element in self.elements.by_ref() {
            let element = element.trim();
            if !element.is_empty() {
                return seed.deserialize(self.parent.element(element)).map(Some);
            }
        }
        Ok(None)
    }
}

/// Map access over the `key=value` entries of a delimited field
struct FieldMapAccess<'c, 'd> {
    parent: FieldDeserializer<'c, 'd>,
    entries: Split<'d>,
    seen: HashSet<ByteSlice<'d>>,
    value: Option<ByteSlice<'d>>,
}

impl<'de> de::MapAccess<'de> for FieldMapAccess<'_, 'de> {
    type Error = CsvError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        for entry in self.entries.by_ref() {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            let (key, value) = convert::split_pair(entry, self.parent.options.map_delimiter)
                .map_err(|e| self.parent.fail(e))?;
            if !self.seen.insert(key) {
                return Err(self.parent.fail(ConvertError::duplicate(key.as_bytes())));
            }
            self.value = Some(value);
            return seed.deserialize(self.parent.element(key)).map(Some);
        }
        Ok(None)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self.value.take().ok_or_else(|| {
            CsvError::Serde(SerdeError::Custom(
                "value requested before key".to_string(),
            ))
        })?;
        seed.deserialize(self.parent.element(value))
    }
}

/// Map access over the entries of a key/value table
struct KeyValueMapAccess<'t, 'd> {
    entries: indexmap::map::Iter<'t, ByteSlice<'d>, (ByteSlice<'d>, Location)>,
    options: FieldOptions,
    value: Option<FieldDeserializer<'d, 'd>>,
}

impl<'de> de::MapAccess<'de> for KeyValueMapAccess<'_, 'de> {
    type Error = CsvError;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Self::Error>
    where
        K: DeserializeSeed<'de>,
    {
        let Some((key, (value, location))) = self.entries.next() else {
            return Ok(None);
        };
        let column = key.to_str_lossy();
        let key_deserializer =
            FieldDeserializer::new(*key, column.clone(), *location, self.options);
        self.value = Some(FieldDeserializer::new(*value, column, *location, self.options));
        seed.deserialize(key_deserializer).map(Some)
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Self::Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self.value.take().ok_or_else(|| {
            CsvError::Serde(SerdeError::Custom(
                "value requested before key".to_string(),
            ))
        })?;
        seed.deserialize(value)
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Deserializes every data row of `document` into `T`
pub fn from_document<'d, T>(document: &'d CsvDocument, config: &CsvConfig) -> Result<Vec<T>, CsvError>
where
    T: Deserialize<'d>,
{
    document
        .records(config)?
        .map(|record| T::deserialize(RecordDeserializer::new(&record)))
        .collect()
}

/// Deserializes a key/value table into a single `T`
///
/// Each key is a field name of `T` and its value is converted like any
/// other field.
pub fn key_values_from_document<'d, T>(document: &'d CsvDocument, config: &CsvConfig) -> Result<T, CsvError>
where
    T: Deserialize<'d>,
{
    let table = KeyValueTable::from_document(document, config)?;
    T::deserialize(de::value::MapAccessDeserializer::new(KeyValueMapAccess {
        entries: table.raw_entries(),
        options: table.options(),
        value: None,
    }))
}

/// Convenience function to deserialize CSV bytes with the default configuration
pub fn from_slice<T>(bytes: &[u8]) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    from_slice_with_config(bytes, &CsvConfig::default())
}

/// Convenience function to deserialize CSV bytes with a custom configuration
pub fn from_slice_with_config<T>(bytes: &[u8], config: &CsvConfig) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    let document = CsvDocument::from_bytes(bytes, config.dialect);
    from_document(&document, config)
}

/// Convenience function to deserialize CSV text with the default configuration
pub fn from_str<T>(text: &str) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    from_slice(text.as_bytes())
}

/// Convenience function to deserialize CSV text with a custom configuration
pub fn from_str_with_config<T>(text: &str, config: &CsvConfig) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    from_slice_with_config(text.as_bytes(), config)
}

/// Convenience function to read and deserialize a CSV file with the default
/// configuration
pub fn from_file<T>(path: impl AsRef<Path>) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    from_file_with_config(path, &CsvConfig::default())
}

/// Convenience function to read and deserialize a CSV file with a custom
/// configuration
pub fn from_file_with_config<T>(path: impl AsRef<Path>, config: &CsvConfig) -> Result<Vec<T>, CsvError>
where
    T: DeserializeOwned,
{
    let document = CsvDocument::open(path, config.dialect)?;
    from_document(&document, config)
}
