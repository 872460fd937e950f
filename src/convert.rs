//! Checked conversion between field text and typed values
//!
//! Parsing never silently yields zero: empty text, stray characters and
//! out-of-range values are all reported as [`ConvertError`]. Callers are
//! expected to trim fields first; the scalar parsers here do not skip
//! leading whitespace (floats tolerate it, following `strtod`).

use crate::error::ConvertError;
use crate::slice::{ByteSlice, is_ascii_whitespace};
use indexmap::IndexMap;
use std::any::type_name;
use std::fmt::{self, Write as _};
use std::hash::Hash;
use std::str::FromStr;

/// Types that can be parsed out of a single field
pub trait FromField: Sized {
    /// Converts the field text into a value
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError>;
}

macro_rules! impl_from_field_unsigned {
    ($($ty:ty),*) => {
        $(
            impl FromField for $ty {
                #[inline]
                fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
                    to_unsigned(field)
                }
            }
        )*
    };
}

macro_rules! impl_from_field_signed {
    ($($ty:ty),*) => {
        $(
            impl FromField for $ty {
                #[inline]
                fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
                    to_signed(field)
                }
            }
        )*
    };
}

impl_from_field_unsigned!(u8, u16, u32, u64, usize);
impl_from_field_signed!(i8, i16, i32, i64, isize);

impl FromField for f32 {
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
        to_float(field)
    }
}

impl FromField for f64 {
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
        to_float(field)
    }
}

impl FromField for bool {
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
        Ok(to_bool(field))
    }
}

impl FromField for String {
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
        field
            .to_str()
            .map(str::to_owned)
            .map_err(|e| ConvertError::format(field.as_bytes(), format!("invalid UTF-8: {}", e)))
    }
}

/// Blank fields become `None`
impl<T: FromField> FromField for Option<T> {
    fn from_field(field: ByteSlice<'_>) -> Result<Self, ConvertError> {
        if field.trim().is_empty() {
            Ok(None)
        } else {
            T::from_field(field).map(Some)
        }
    }
}

/// Parses a field as `T`
#[inline]
pub fn parse<T: FromField>(field: ByteSlice<'_>) -> Result<T, ConvertError> {
    T::from_field(field)
}

// Powers of ten for chunked accumulation
const POW10: [u128; 5] = [1, 10, 100, 1_000, 10_000];

/// Longest digit run that can still fit in a u64 once leading zeros are gone
const MAX_U64_DIGITS: usize = 20;

/// Accumulates a run of ASCII digits; the caller guarantees every byte is a
/// digit and that there are at most `MAX_U64_DIGITS` of them.
fn accumulate_digits(digits: &[u8]) -> u128 {
    let mut result: u128 = 0;
    for chunk in digits.chunks(4) {
        let mut value: u32 = 0;
        for &b in chunk {
            value = value * 10 + u32::from(b - b'0');
        }
        result = result * POW10[chunk.len()] + u128::from(value);
    }
    result
}

/// Parses unsigned decimal digits into a u128 magnitude bounded by `u64::MAX`
fn digits_to_magnitude(text: &[u8], target: &'static str) -> Result<u128, ConvertError> {
    if text.is_empty() {
        return Err(ConvertError::EmptyInput { target });
    }
    if let Some(bad) = text.iter().find(|b| !b.is_ascii_digit()) {
        return Err(ConvertError::format(
            text,
            format!("non-digit character '{}'", char::from(*bad).escape_default()),
        ));
    }

    // Leading zeros never count towards overflow
    let digits = match text.iter().position(|&b| b != b'0') {
        Some(first) => &text[first..],
        None => return Ok(0),
    };
    if digits.len() > MAX_U64_DIGITS {
        return Err(ConvertError::overflow(text, target));
    }

    let magnitude = accumulate_digits(digits);
    if magnitude > u128::from(u64::MAX) {
        return Err(ConvertError::overflow(text, target));
    }
    Ok(magnitude)
}

/// Converts decimal digits (no sign, no whitespace) to an unsigned integer
///
/// Leading zeros are accepted. Values above `T::MAX` fail with
/// [`ConvertError::Overflow`] instead of wrapping.
pub fn to_unsigned<T: TryFrom<u128>>(field: ByteSlice<'_>) -> Result<T, ConvertError> {
    let target = type_name::<T>();
    let magnitude = digits_to_magnitude(field.as_bytes(), target)?;
    T::try_from(magnitude).map_err(|_| ConvertError::overflow(field.as_bytes(), target))
}

/// Converts decimal text with an optional leading `+` or `-` to a signed integer
///
/// The magnitude is parsed through the unsigned path. The signed result is
/// then range-checked, which also admits the most negative value of `T`.
pub fn to_signed<T: TryFrom<i128>>(field: ByteSlice<'_>) -> Result<T, ConvertError> {
    let target = type_name::<T>();
    let text = field.as_bytes();
    let (negative, digits) = match text.first() {
        None => return Err(ConvertError::EmptyInput { target }),
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        Some(_) => (false, text),
    };
    if digits.is_empty() {
        return Err(ConvertError::format(text, "no digits after sign"));
    }

    let magnitude = digits_to_magnitude(digits, target).map_err(|e| match e {
        ConvertError::Overflow { .. } => ConvertError::overflow(text, target),
        ConvertError::Format { message, .. } => ConvertError::format(text, message),
        other => other,
    })?;

    // magnitude <= u64::MAX, so the cast and negation cannot overflow i128
    let value = if negative {
        -(magnitude as i128)
    } else {
        magnitude as i128
    };
    T::try_from(value).map_err(|_| ConvertError::overflow(text, target))
}

/// Floating point targets
pub trait FloatField: FromStr + Copy + std::ops::Neg<Output = Self> {
    /// Positive infinity
    const INFINITY: Self;
    /// Quiet NaN
    const NAN: Self;
}

impl FloatField for f32 {
    const INFINITY: Self = f32::INFINITY;
    const NAN: Self = f32::NAN;
}

impl FloatField for f64 {
    const INFINITY: Self = f64::INFINITY;
    const NAN: Self = f64::NAN;
}

/// Returns the length of the longest decimal floating point prefix of `text`
///
/// Accepts `[sign] digits [. digits] [e [sign] digits]` with at least one
/// mantissa digit. An exponent marker without digits is not consumed.
fn scan_float_prefix(text: &[u8]) -> usize {
    let mut pos = 0;
    if matches!(text.first(), Some(b'+' | b'-')) {
        pos += 1;
    }

    let int_start = pos;
    while text.get(pos).is_some_and(u8::is_ascii_digit) {
        pos += 1;
    }
    let mut mantissa_digits = pos - int_start;

    if text.get(pos) == Some(&b'.') {
        let frac_start = pos + 1;
        let mut end = frac_start;
        while text.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        mantissa_digits += end - frac_start;
        if mantissa_digits > 0 {
            pos = end;
        }
    }

    if mantissa_digits == 0 {
        return 0;
    }

    if matches!(text.get(pos), Some(b'e' | b'E')) {
        let mut end = pos + 1;
        if matches!(text.get(end), Some(b'+' | b'-')) {
            end += 1;
        }
        let exp_start = end;
        while text.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
        if end > exp_start {
            pos = end;
        }
    }

    pos
}

/// Matches `inf`, `infinity`, `nan` case-insensitively after an optional
/// sign, returning the value and the number of bytes consumed
fn scan_float_literal<T: FloatField>(text: &[u8]) -> Option<(T, usize)> {
    let (negative, sign_len) = match text.first() {
        Some(b'-') => (true, 1),
        Some(b'+') => (false, 1),
        _ => (false, 0),
    };
    let body = &text[sign_len..];

    let starts_with_ci = |word: &[u8]| {
        body.len() >= word.len() && body[..word.len()].eq_ignore_ascii_case(word)
    };

    let (value, len) = if starts_with_ci(b"infinity") {
        (T::INFINITY, 8)
    } else if starts_with_ci(b"inf") {
        (T::INFINITY, 3)
    } else if starts_with_ci(b"nan") {
        (T::NAN, 3)
    } else {
        return None;
    };

    Some((if negative { -value } else { value }, sign_len + len))
}

/// Converts text to a floating point value
///
/// Leading whitespace is skipped. After the number only whitespace may
/// follow. When no numeric prefix is present the literals `inf`,
/// `infinity`, `nan` (optionally prefixed by `-`, any case) are recognized.
pub fn to_float<T: FloatField>(field: ByteSlice<'_>) -> Result<T, ConvertError> {
    let text = field.trim_front().as_bytes();
    if text.is_empty() {
        return Err(ConvertError::EmptyInput {
            target: type_name::<T>(),
        });
    }

    let (value, consumed) = match scan_float_prefix(text) {
        0 => scan_float_literal::<T>(text).ok_or_else(|| {
            ConvertError::format(field.as_bytes(), "not a floating point value")
        })?,
        len => {
            // The prefix is pure ASCII by construction
            let number = std::str::from_utf8(&text[..len])
                .ok()
                .and_then(|s| s.parse::<T>().ok())
                .ok_or_else(|| {
                    ConvertError::format(field.as_bytes(), "not a floating point value")
                })?;
            (number, len)
        }
    };

    if let Some(bad) = text[consumed..].iter().find(|&&b| !is_ascii_whitespace(b)) {
        return Err(ConvertError::format(
            field.as_bytes(),
            format!("non-whitespace '{}' after number", char::from(*bad).escape_default()),
        ));
    }
    Ok(value)
}

/// Interprets a field as a boolean
///
/// `1 y Y t T`, `on On ON` and `yes Yes YES` are true; everything else,
/// including empty text, is false.
pub fn to_bool(field: ByteSlice<'_>) -> bool {
    match field.as_bytes() {
        b"1" | b"y" | b"Y" | b"t" | b"T" => true,
        b"on" | b"On" | b"ON" => true,
        b"yes" | b"Yes" | b"YES" => true,
        _ => false,
    }
}

/// Parses a delimited list, e.g. `1|2|3`
///
/// The field and each element are trimmed; empty elements are skipped.
pub fn parse_array<T: FromField>(field: ByteSlice<'_>, delimiter: u8) -> Result<Vec<T>, ConvertError> {
    field
        .trim()
        .split_nonempty(delimiter)
        .map(ByteSlice::trim)
        .filter(|element| !element.is_empty())
        .map(T::from_field)
        .collect()
}

/// Parses a delimited map, e.g. `a=1|b=2`
///
/// Each entry must split on `pair_delimiter` into exactly two parts, and
/// keys must be unique within the field. Entry order is preserved.
pub fn parse_map<K, V>(
    field: ByteSlice<'_>,
    entry_delimiter: u8,
    pair_delimiter: u8,
) -> Result<IndexMap<K, V>, ConvertError>
where
    K: FromField + Eq + Hash,
    V: FromField,
{
    let mut map: IndexMap<K, V> = IndexMap::new();
    for entry in field.trim().split_nonempty(entry_delimiter).map(ByteSlice::trim) {
        if entry.is_empty() {
            continue;
        }
        let (key_text, value_text) = split_pair(entry, pair_delimiter)?;
        let key = K::from_field(key_text)?;
        if map.contains_key(&key) {
            return Err(ConvertError::duplicate(key_text.as_bytes()));
        }
        let value = V::from_field(value_text)?;
        map.insert(key, value);
    }
    Ok(map)
}

/// Splits a map entry into trimmed key and value
pub(crate) fn split_pair(
    entry: ByteSlice<'_>,
    delimiter: u8,
) -> Result<(ByteSlice<'_>, ByteSlice<'_>), ConvertError> {
    match entry.split_once(delimiter) {
        Some((key, value)) if !value.contains(delimiter) => Ok((key.trim(), value.trim())),
        _ => Err(ConvertError::malformed(
            entry.as_bytes(),
            format!("key{}value", char::from(delimiter)),
        )),
    }
}

/// Returns the number of decimal digits in `value`
pub const fn digits10(value: u64) -> u32 {
    match value.checked_ilog10() {
        Some(log) => log + 1,
        None => 1,
    }
}

/// Appends the decimal form of `value` without heap allocation
pub fn append_unsigned(out: &mut Vec<u8>, mut value: u64) {
    let mut buffer = [0u8; 20];
    let len = digits10(value) as usize;
    for slot in buffer[..len].iter_mut().rev() {
        *slot = b'0' + (value % 10) as u8;
        value /= 10;
    }
    out.extend_from_slice(&buffer[..len]);
}

/// Appends the decimal form of `value`, with `-` for negatives
pub fn append_signed(out: &mut Vec<u8>, value: i64) {
    if value < 0 {
        out.push(b'-');
    }
    append_unsigned(out, value.unsigned_abs());
}

struct ByteWriter<'a>(&'a mut Vec<u8>);

impl fmt::Write for ByteWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.0.extend_from_slice(s.as_bytes());
        Ok(())
    }
}

/// Appends the shortest decimal form of `value` that parses back to the
/// same value in `T` (no exponent notation)
pub fn append_float<T: FloatField + fmt::Display>(out: &mut Vec<u8>, value: T) {
    // ByteWriter is infallible
    let _ = write!(ByteWriter(out), "{}", value);
}

/// Formats `value` truncated to at most two decimal places
///
/// A fractional part that truncates to zero is dropped entirely:
/// `1.005` becomes `1`, `2.349` becomes `2.34`.
pub fn to_fixed(value: f64) -> String {
    let mut text = value.to_string();
    if let Some(dot) = text.find('.') {
        text.truncate((dot + 3).min(text.len()));
        if text[dot + 1..].bytes().all(|b| b == b'0') {
            text.truncate(dot);
        }
    }
    if text == "-0" {
        text.remove(0);
    }
    text
}
