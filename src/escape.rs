//! C-style, URI and hex escaping of field text

use crate::error::ConvertError;

const HEX_DIGITS: &[u8; 16] = b"0123456789abcdef";

/// Value of a hex digit, either case
#[inline]
fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

#[inline]
fn push_hex(out: &mut String, b: u8) {
    out.push(char::from(HEX_DIGITS[usize::from(b >> 4)]));
    out.push(char::from(HEX_DIGITS[usize::from(b & 0x0f)]));
}

/// Escapes bytes for inclusion in a C string literal
///
/// Printable ASCII is copied as is. `"`, `\` and `?` get a backslash, tab,
/// newline and carriage return use their short forms, and every other byte
/// becomes a three-digit octal escape.
pub fn c_escape(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len());
    for &b in input {
        match b {
            b'"' | b'\\' | b'?' => {
                out.push('\\');
                out.push(char::from(b));
            }
            b'\t' => out.push_str("\\t"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b' '..=b'~' => out.push(char::from(b)),
            _ => {
                out.push('\\');
                out.push(char::from(b'0' + ((b >> 6) & 7)));
                out.push(char::from(b'0' + ((b >> 3) & 7)));
                out.push(char::from(b'0' + (b & 7)));
            }
        }
    }
    out
}

/// Reverses [`c_escape`], also accepting `\a \b \f \v \'` and `\x` hex escapes
///
/// In strict mode an unknown or incomplete escape is an error; otherwise it
/// is copied to the output unchanged.
pub fn c_unescape(input: &[u8], strict: bool) -> Result<Vec<u8>, ConvertError> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;

    while pos < input.len() {
        let b = input[pos];
        if b != b'\\' {
            out.push(b);
            pos += 1;
            continue;
        }

        let Some(&e) = input.get(pos + 1) else {
            if strict {
                return Err(ConvertError::format(input, "incomplete escape sequence"));
            }
            out.push(b'\\');
            break;
        };
        pos += 1;

        match e {
            b'0'..=b'7' => {
                let mut value: u8 = 0;
                let mut digits = 0;
                while digits < 3 {
                    match input.get(pos) {
                        Some(&d @ b'0'..=b'7') => {
                            value = (value << 3) | (d - b'0');
                            pos += 1;
                            digits += 1;
                        }
                        _ => break,
                    }
                }
                out.push(value);
            }
            b'x' => {
                pos += 1;
                let start = pos;
                let mut value: u8 = 0;
                while let Some(h) = input.get(pos).copied().and_then(hex_value) {
                    value = (value << 4) | h;
                    pos += 1;
                }
                if pos == start {
                    if strict {
                        return Err(ConvertError::format(input, "incomplete hex escape sequence"));
                    }
                    out.extend_from_slice(b"\\x");
                } else {
                    out.push(value);
                }
            }
            _ => {
                let unescaped = match e {
                    b'"' | b'\'' | b'?' | b'\\' => Some(e),
                    b'a' => Some(0x07),
                    b'b' => Some(0x08),
                    b'f' => Some(0x0c),
                    b'n' => Some(b'\n'),
                    b'r' => Some(b'\r'),
                    b't' => Some(b'\t'),
                    b'v' => Some(0x0b),
                    _ => None,
                };
                match unescaped {
                    Some(c) => out.push(c),
                    None if strict => {
                        return Err(ConvertError::format(input, "invalid escape sequence"));
                    }
                    None => {
                        out.push(b'\\');
                        out.push(e);
                    }
                }
                pos += 1;
            }
        }
    }

    Ok(out)
}

/// Which characters [`uri_escape`] leaves unencoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UriEscapeMode {
    /// Only unreserved characters pass through
    #[default]
    All,
    /// As `All`, with space written as `+`
    Query,
    /// As `All`, with `/` passed through
    Path,
}

enum UriClass {
    Unreserved,
    Slash,
    Space,
    Encode,
}

fn uri_class(b: u8) -> UriClass {
    match b {
        b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => UriClass::Unreserved,
        b'/' => UriClass::Slash,
        b' ' => UriClass::Space,
        _ => UriClass::Encode,
    }
}

/// Percent-encodes bytes for use in a URI, with lowercase hex digits
pub fn uri_escape(input: &[u8], mode: UriEscapeMode) -> String {
    let mut out = String::with_capacity(input.len() + 3 * (input.len() / 4));
    for &b in input {
        match (uri_class(b), mode) {
            (UriClass::Unreserved, _) | (UriClass::Slash, UriEscapeMode::Path) => {
                out.push(char::from(b))
            }
            (UriClass::Space, UriEscapeMode::Query) => out.push('+'),
            _ => {
                out.push('%');
                push_hex(&mut out, b);
            }
        }
    }
    out
}

/// Decodes `%xx` sequences, and `+` as space in query mode
pub fn uri_unescape(input: &[u8], mode: UriEscapeMode) -> Result<Vec<u8>, ConvertError> {
    let mut out = Vec::with_capacity(input.len());
    let mut pos = 0;
    while pos < input.len() {
        match input[pos] {
            b'%' => {
                let (Some(&hi), Some(&lo)) = (input.get(pos + 1), input.get(pos + 2)) else {
                    return Err(ConvertError::format(input, "incomplete percent encode sequence"));
                };
                match (hex_value(hi), hex_value(lo)) {
                    (Some(hi), Some(lo)) => out.push((hi << 4) | lo),
                    _ => {
                        return Err(ConvertError::format(input, "invalid percent encode sequence"));
                    }
                }
                pos += 3;
            }
            b'+' if mode == UriEscapeMode::Query => {
                out.push(b' ');
                pos += 1;
            }
            b => {
                out.push(b);
                pos += 1;
            }
        }
    }
    Ok(out)
}

/// Renders unprintable bytes and `\` as backslash escapes
///
/// With `hex_style` every such byte becomes `\xNN`; otherwise the common
/// control characters use their short C forms and only the rest use hex.
pub fn backslashify(input: &[u8], hex_style: bool) -> String {
    let mut out = String::with_capacity(input.len() * 3);
    for &b in input {
        if (0x20..=0x7e).contains(&b) && b != b'\\' {
            out.push(char::from(b));
            continue;
        }
        out.push('\\');
        let short = match b {
            _ if hex_style => None,
            b'\r' => Some('r'),
            b'\n' => Some('n'),
            b'\t' => Some('t'),
            0x07 => Some('a'),
            0x08 => Some('b'),
            0 => Some('0'),
            b'\\' => Some('\\'),
            _ => None,
        };
        match short {
            Some(c) => out.push(c),
            None => {
                out.push('x');
                push_hex(&mut out, b);
            }
        }
    }
    out
}

/// Makes arbitrary bytes readable
///
/// Printable input is returned unchanged. Mostly-binary input without a
/// meaningful printable prefix is rendered as `0x` followed by hex; anything
/// else is backslashified.
pub fn humanify(input: &[u8]) -> String {
    let unprintable = |b: &u8| !(0x20..=0x7e).contains(b) || *b == b'\\';
    let count = input.iter().filter(|b| unprintable(b)).count();
    if count == 0 {
        return String::from_utf8_lossy(input).into_owned();
    }
    let printable_prefix = input.iter().take_while(|b| !unprintable(b)).count();
    if 5 * count >= 3 * input.len() && 5 * printable_prefix < input.len() {
        format!("0x{}", hexlify(input))
    } else {
        backslashify(input, false)
    }
}

/// Encodes bytes as lowercase hex, two digits per byte
pub fn hexlify(input: &[u8]) -> String {
    let mut out = String::with_capacity(input.len() * 2);
    for &b in input {
        push_hex(&mut out, b);
    }
    out
}

/// Decodes hex text produced by [`hexlify`] (either case)
pub fn unhexlify(input: &[u8]) -> Result<Vec<u8>, ConvertError> {
    if input.len() % 2 != 0 {
        return Err(ConvertError::format(input, "odd number of hex digits"));
    }
    input
        .chunks_exact(2)
        .map(|pair| match (hex_value(pair[0]), hex_value(pair[1])) {
            (Some(hi), Some(lo)) => Ok((hi << 4) | lo),
            _ => Err(ConvertError::format(input, "invalid hex digit")),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConvertErrorKind;

    #[test]
    fn test_c_escape() {
        assert_eq!(c_escape(b"plain text"), "plain text");
        assert_eq!(c_escape(b"a\"b\\c"), "a\\\"b\\\\c");
        assert_eq!(c_escape(b"tab\tnl\ncr\r"), "tab\\tnl\\ncr\\r");
        assert_eq!(c_escape(b"why?"), "why\\?");
        assert_eq!(c_escape(b"\x00\x7f\xff"), "\\000\\177\\377");
    }

    #[test]
    fn test_c_unescape() {
        assert_eq!(c_unescape(b"a\\tb\\n", true).unwrap(), b"a\tb\n");
        assert_eq!(c_unescape(b"\\\"q\\'\\?\\\\", true).unwrap(), b"\"q'?\\");
        assert_eq!(c_unescape(b"\\101\\0x", true).unwrap(), b"A\0x");
        assert_eq!(c_unescape(b"\\x41\\x7e", true).unwrap(), b"A~");
        assert_eq!(c_unescape(b"\\a\\b\\f\\v", true).unwrap(), b"\x07\x08\x0c\x0b");
    }

    #[test]
    fn test_c_unescape_invalid() {
        let err = c_unescape(b"bad\\q", true).unwrap_err();
        assert_eq!(err.kind(), ConvertErrorKind::Format);
        assert!(c_unescape(b"end\\", true).is_err());
        assert!(c_unescape(b"\\x", true).is_err());

        assert_eq!(c_unescape(b"bad\\q", false).unwrap(), b"bad\\q");
        assert_eq!(c_unescape(b"end\\", false).unwrap(), b"end\\");
        assert_eq!(c_unescape(b"\\xz", false).unwrap(), b"\\xz");
    }

    #[test]
    fn test_c_escape_reversible() {
        let input: Vec<u8> = (0u8..=255).collect();
        let escaped = c_escape(&input);
        assert_eq!(c_unescape(escaped.as_bytes(), true).unwrap(), input);
    }

    #[test]
    fn test_uri_escape_modes() {
        assert_eq!(uri_escape(b"a b/c", UriEscapeMode::All), "a%20b%2fc");
        assert_eq!(uri_escape(b"a b/c", UriEscapeMode::Query), "a+b%2fc");
        assert_eq!(uri_escape(b"a b/c", UriEscapeMode::Path), "a%20b/c");
        assert_eq!(uri_escape(b"-._~Az09", UriEscapeMode::All), "-._~Az09");
        assert_eq!(uri_escape(b"\xff=", UriEscapeMode::All), "%ff%3d");
    }

    #[test]
    fn test_uri_unescape() {
        assert_eq!(uri_unescape(b"a%20b%2Fc", UriEscapeMode::All).unwrap(), b"a b/c");
        assert_eq!(uri_unescape(b"a+b", UriEscapeMode::Query).unwrap(), b"a b");
        assert_eq!(uri_unescape(b"a+b", UriEscapeMode::All).unwrap(), b"a+b");

        assert!(uri_unescape(b"%2", UriEscapeMode::All).is_err());
        assert!(uri_unescape(b"%zz", UriEscapeMode::All).is_err());
    }

    #[test]
    fn test_backslashify() {
        assert_eq!(backslashify(b"a\nb\\", false), "a\\nb\\\\");
        assert_eq!(backslashify(b"\x00\x01", false), "\\0\\x01");
        assert_eq!(backslashify(b"a\n", true), "a\\x0a");
    }

    #[test]
    fn test_humanify() {
        assert_eq!(humanify(b"hello"), "hello");
        assert_eq!(humanify(b"hello\n"), "hello\\n");
        assert_eq!(humanify(b"\x01\x02\x03a"), "0x01020361");
    }

    #[test]
    fn test_hexlify() {
        assert_eq!(hexlify(b"\x00\xabz"), "00ab7a");
        assert_eq!(unhexlify(b"00AB7a").unwrap(), b"\x00\xabz");
        assert!(unhexlify(b"abc").is_err());
        assert!(unhexlify(b"zz").is_err());
        assert!(unhexlify(b"").unwrap().is_empty());
    }
}
