//! Zero-copy byte range over a borrowed buffer
//!
//! A [`ByteSlice`] never owns or allocates. Narrowing a view (trimming,
//! advancing, taking a sub-range) only changes which part of the backing
//! buffer it points at; the buffer bytes themselves are never touched. The
//! borrow checker keeps every view inside the lifetime of its buffer.

use serde::{Serialize, Serializer};
use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Index;

/// Returns true for the whitespace bytes recognized by trimming:
/// space, tab, carriage return and line feed.
#[inline(always)]
pub const fn is_ascii_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\r' | b'\n')
}

/// A non-owning view of a contiguous region of a byte buffer
#[derive(Clone, Copy)]
pub struct ByteSlice<'a> {
    bytes: &'a [u8],
    /// Offset of `bytes` within the buffer the view was first created over
    offset: usize,
}

impl<'a> ByteSlice<'a> {
    /// Creates a view covering the whole of `bytes`
    #[inline]
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Creates a view over `length` bytes of `buffer` starting at `start`
    ///
    /// # Panics
    ///
    /// Panics if `start + length` exceeds the buffer length.
    pub fn view(buffer: &'a [u8], start: usize, length: usize) -> Self {
        match Self::try_view(buffer, start, length) {
            Some(slice) => slice,
            None => panic!(
                "view {}+{} out of range for buffer of length {}",
                start,
                length,
                buffer.len()
            ),
        }
    }

    /// Creates a view over a region of `buffer`, or `None` if the region
    /// does not fit inside it
    pub fn try_view(buffer: &'a [u8], start: usize, length: usize) -> Option<Self> {
        let end = start.checked_add(length)?;
        let bytes = buffer.get(start..end)?;
        Some(Self {
            bytes,
            offset: start,
        })
    }

    /// Returns the viewed bytes with the lifetime of the backing buffer
    #[inline(always)]
    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Returns the byte offset of this view within its backing buffer
    #[inline(always)]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Returns the length of the view in bytes
    #[inline(always)]
    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view covers no bytes
    #[inline(always)]
    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the byte at `index`, if any
    #[inline]
    pub fn get(&self, index: usize) -> Option<u8> {
        self.bytes.get(index).copied()
    }

    /// Returns the first byte, if any
    #[inline]
    pub fn first(&self) -> Option<u8> {
        self.bytes.first().copied()
    }

    /// Returns the last byte, if any
    #[inline]
    pub fn last(&self) -> Option<u8> {
        self.bytes.last().copied()
    }

    /// Returns a view of `length` bytes starting at `start`, relative to this view
    ///
    /// # Panics
    ///
    /// Panics if the range does not fit inside this view.
    pub fn subslice(&self, start: usize, length: usize) -> Self {
        let view = Self::view(self.bytes, start, length);
        Self {
            bytes: view.bytes,
            offset: self.offset + start,
        }
    }

    /// Returns the view from `start` to the end
    ///
    /// # Panics
    ///
    /// Panics if `start` is past the end of the view.
    pub fn tail(&self, start: usize) -> Self {
        assert!(
            start <= self.len(),
            "tail {} out of range for view of length {}",
            start,
            self.len()
        );
        self.subslice(start, self.len() - start)
    }

    /// Shrinks the front of the view by `n` bytes
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the length of the view.
    pub fn advance(&mut self, n: usize) {
        assert!(
            n <= self.bytes.len(),
            "advance {} past the end of a view of length {}",
            n,
            self.bytes.len()
        );
        self.bytes = &self.bytes[n..];
        self.offset += n;
    }

    /// Shrinks the back of the view by `n` bytes
    ///
    /// # Panics
    ///
    /// Panics if `n` exceeds the length of the view.
    pub fn retreat(&mut self, n: usize) {
        assert!(
            n <= self.bytes.len(),
            "retreat {} past the start of a view of length {}",
            n,
            self.bytes.len()
        );
        self.bytes = &self.bytes[..self.bytes.len() - n];
    }

    /// Returns a view with leading whitespace removed
    pub fn trim_front(self) -> Self {
        let skip = self
            .bytes
            .iter()
            .position(|&b| !is_ascii_whitespace(b))
            .unwrap_or(self.bytes.len());
        Self {
            bytes: &self.bytes[skip..],
            offset: self.offset + skip,
        }
    }

    /// Returns a view with trailing whitespace removed
    pub fn trim_back(self) -> Self {
        let keep = self
            .bytes
            .iter()
            .rposition(|&b| !is_ascii_whitespace(b))
            .map_or(0, |i| i + 1);
        Self {
            bytes: &self.bytes[..keep],
            offset: self.offset,
        }
    }

    /// Returns a view with whitespace removed from both ends
    #[inline]
    pub fn trim(self) -> Self {
        self.trim_back().trim_front()
    }

    /// Returns the index of the first occurrence of `needle`
    #[inline]
    pub fn find(&self, needle: u8) -> Option<usize> {
        self.bytes.iter().position(|&b| b == needle)
    }

    /// Returns the index of the last occurrence of `needle`
    #[inline]
    pub fn rfind(&self, needle: u8) -> Option<usize> {
        self.bytes.iter().rposition(|&b| b == needle)
    }

    /// Returns true if the view contains `needle`
    #[inline]
    pub fn contains(&self, needle: u8) -> bool {
        self.bytes.contains(&needle)
    }

    /// Returns true if the view begins with `prefix`
    #[inline]
    pub fn starts_with(&self, prefix: &[u8]) -> bool {
        self.bytes.starts_with(prefix)
    }

    /// Returns true if the view ends with `suffix`
    #[inline]
    pub fn ends_with(&self, suffix: &[u8]) -> bool {
        self.bytes.ends_with(suffix)
    }

    /// Returns the view as UTF-8 text, borrowing from the backing buffer
    pub fn to_str(&self) -> Result<&'a str, std::str::Utf8Error> {
        std::str::from_utf8(self.bytes)
    }

    /// Returns the view as text, replacing invalid UTF-8 sequences
    pub fn to_str_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Copies the view into an owned string, replacing invalid UTF-8 sequences
    pub fn to_string_lossy(&self) -> String {
        self.to_str_lossy().into_owned()
    }

    /// Splits on `delimiter`, keeping empty pieces
    ///
    /// An empty view yields a single empty piece.
    pub fn split(self, delimiter: u8) -> Split<'a> {
        Split::new(self, delimiter, false)
    }

    /// Splits on `delimiter`, skipping empty pieces
    pub fn split_nonempty(self, delimiter: u8) -> Split<'a> {
        Split::new(self, delimiter, true)
    }

    /// Splits once at the first `delimiter`, excluding it from both halves
    pub fn split_once(self, delimiter: u8) -> Option<(Self, Self)> {
        let index = self.find(delimiter)?;
        let rest = self.len() - index - 1;
        Some((self.subslice(0, index), self.subslice(index + 1, rest)))
    }
}

impl Default for ByteSlice<'_> {
    fn default() -> Self {
        Self::new(&[])
    }
}

impl<'a> From<&'a [u8]> for ByteSlice<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for ByteSlice<'a> {
    fn from(text: &'a str) -> Self {
        Self::new(text.as_bytes())
    }
}

impl<'a> From<&'a Vec<u8>> for ByteSlice<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::new(bytes.as_slice())
    }
}

impl Index<usize> for ByteSlice<'_> {
    type Output = u8;

    #[inline(always)]
    fn index(&self, index: usize) -> &u8 {
        &self.bytes[index]
    }
}

impl AsRef<[u8]> for ByteSlice<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl Borrow<[u8]> for ByteSlice<'_> {
    fn borrow(&self) -> &[u8] {
        self.bytes
    }
}

impl PartialEq for ByteSlice<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.bytes == other.bytes
    }
}

impl Eq for ByteSlice<'_> {}

impl PartialEq<[u8]> for ByteSlice<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl PartialEq<&[u8]> for ByteSlice<'_> {
    fn eq(&self, other: &&[u8]) -> bool {
        self.bytes == *other
    }
}

impl PartialEq<str> for ByteSlice<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for ByteSlice<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<ByteSlice<'_>> for &str {
    fn eq(&self, other: &ByteSlice<'_>) -> bool {
        self.as_bytes() == other.bytes
    }
}

impl PartialOrd for ByteSlice<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ByteSlice<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.bytes.cmp(other.bytes)
    }
}

impl Hash for ByteSlice<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bytes.hash(state);
    }
}

impl fmt::Debug for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ByteSlice({:?})", self.to_str_lossy())
    }
}

impl fmt::Display for ByteSlice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str_lossy())
    }
}

impl Serialize for ByteSlice<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.to_str() {
            Ok(text) => serializer.serialize_str(text),
            Err(_) => serializer.serialize_bytes(self.bytes),
        }
    }
}

/// Iterator over the pieces of a [`ByteSlice`] separated by a single byte
#[derive(Debug, Clone)]
pub struct Split<'a> {
    rest: Option<ByteSlice<'a>>,
    delimiter: u8,
    skip_empty: bool,
}

impl<'a> Split<'a> {
    fn new(slice: ByteSlice<'a>, delimiter: u8, skip_empty: bool) -> Self {
        Self {
            rest: Some(slice),
            delimiter,
            skip_empty,
        }
    }
}

impl<'a> Iterator for Split<'a> {
    type Item = ByteSlice<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let rest = self.rest?;
            let piece = match rest.split_once(self.delimiter) {
                Some((head, tail)) => {
                    self.rest = Some(tail);
                    head
                }
                None => {
                    self.rest = None;
                    rest
                }
            };
            if self.skip_empty && piece.is_empty() {
                continue;
            }
            return Some(piece);
        }
    }
}

/// Concatenates `pieces` with `delimiter` between each pair
pub fn join<'a, I>(pieces: I, delimiter: &[u8]) -> Vec<u8>
where
    I: IntoIterator<Item = ByteSlice<'a>>,
    I::IntoIter: Clone,
{
    let pieces = pieces.into_iter();
    let total = pieces
        .clone()
        .enumerate()
        .map(|(i, p)| p.len() + if i > 0 { delimiter.len() } else { 0 })
        .sum();
    let mut out = Vec::with_capacity(total);
    for (i, piece) in pieces.enumerate() {
        if i > 0 {
            out.extend_from_slice(delimiter);
        }
        out.extend_from_slice(piece.as_bytes());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_and_offset() {
        let buffer = b"foobarbaz";
        let s = ByteSlice::view(buffer, 3, 3);
        assert_eq!(s, "bar");
        assert_eq!(s.len(), 3);
        assert_eq!(s.offset(), 3);

        let inner = s.subslice(1, 2);
        assert_eq!(inner, "ar");
        assert_eq!(inner.offset(), 4);
    }

    #[test]
    fn test_try_view_out_of_range() {
        let buffer = b"abc";
        assert!(ByteSlice::try_view(buffer, 1, 3).is_none());
        assert!(ByteSlice::try_view(buffer, usize::MAX, 2).is_none());
        assert!(ByteSlice::try_view(buffer, 3, 0).is_some());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_view_out_of_range_panics() {
        let buffer = b"abc";
        let _ = ByteSlice::view(buffer, 2, 2);
    }

    #[test]
    fn test_trim() {
        let s = ByteSlice::from(" \t abc \r\n");
        assert_eq!(s.trim_front(), "abc \r\n");
        assert_eq!(s.trim_back(), " \t abc");
        assert_eq!(s.trim(), "abc");
        assert_eq!(s.trim().offset(), 3);

        let blank = ByteSlice::from(" \r\n\t ");
        assert!(blank.trim().is_empty());
        assert!(blank.trim_front().is_empty());
        assert!(blank.trim_back().is_empty());
    }

    #[test]
    fn test_trim_keeps_other_bytes() {
        // Only space, tab, CR and LF count as whitespace
        let s = ByteSlice::from("\x0bx\x0c");
        assert_eq!(s.trim(), "\x0bx\x0c");
    }

    #[test]
    fn test_advance_leaves_buffer_untouched() {
        let buffer = b"hello world".to_vec();
        let mut s = ByteSlice::new(&buffer);
        s.advance(6);
        assert_eq!(s, "world");
        assert_eq!(s.offset(), 6);
        assert_eq!(&buffer, b"hello world");

        s.retreat(2);
        assert_eq!(s, "wor");
    }

    #[test]
    #[should_panic(expected = "past the end")]
    fn test_advance_past_end_panics() {
        let mut s = ByteSlice::from("ab");
        s.advance(3);
    }

    #[test]
    fn test_equality_is_by_content() {
        let a = b"key,key".to_vec();
        let left = ByteSlice::view(&a, 0, 3);
        let right = ByteSlice::view(&a, 4, 3);
        assert_eq!(left, right);
        assert_ne!(left.offset(), right.offset());
        assert_eq!(left, b"key".as_slice());
        assert_eq!("key", left);
        assert!(ByteSlice::from("abc") < ByteSlice::from("abd"));
    }

    #[test]
    fn test_find_and_contains() {
        let s = ByteSlice::from("foobarbaz");
        assert_eq!(s.find(b'b'), Some(3));
        assert_eq!(s.rfind(b'b'), Some(6));
        assert_eq!(s.find(b'y'), None);
        assert!(s.contains(b'z'));
        assert!(!s.contains(0));
        assert!(s.starts_with(b"foo"));
        assert!(s.ends_with(b"baz"));
        assert_eq!(s[3], b'b');
        assert_eq!(s.get(42), None);
    }

    #[test]
    fn test_split_allow_empty() {
        let parts: Vec<_> = ByteSlice::from("a||b|").split(b'|').collect();
        assert_eq!(parts, vec!["a", "", "b", ""]);

        let parts: Vec<_> = ByteSlice::from("").split(b'|').collect();
        assert_eq!(parts, vec![""]);
    }

    #[test]
    fn test_split_nonempty() {
        let parts: Vec<_> = ByteSlice::from("|a||b|").split_nonempty(b'|').collect();
        assert_eq!(parts, vec!["a", "b"]);

        assert_eq!(ByteSlice::from("").split_nonempty(b'|').count(), 0);
    }

    #[test]
    fn test_split_once() {
        let (k, v) = ByteSlice::from("hp=100").split_once(b'=').unwrap();
        assert_eq!(k, "hp");
        assert_eq!(v, "100");
        assert_eq!(v.offset(), 3);
        assert!(ByteSlice::from("hp").split_once(b'=').is_none());
    }

    #[test]
    fn test_join() {
        let s = ByteSlice::from("a,b,,c");
        let joined = join(s.split(b','), b"|");
        assert_eq!(joined, b"a|b||c");
        assert!(join(std::iter::empty(), b",").is_empty());
    }

    #[test]
    fn test_text_views() {
        let s = ByteSlice::from("caf\u{e9}");
        assert_eq!(s.to_str().unwrap(), "caf\u{e9}");

        let bad = ByteSlice::new(b"a\xffb");
        assert!(bad.to_str().is_err());
        assert_eq!(bad.to_string_lossy(), "a\u{fffd}b");
        assert_eq!(format!("{:?}", ByteSlice::from("x")), "ByteSlice(\"x\")");
    }
}
