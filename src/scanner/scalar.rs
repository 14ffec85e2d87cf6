//! Scanners for JSON strings and literals

use super::{is_value_delimiter, Cursor, ScanError};
use crate::document::Kind;

fn is_hex_digits(bytes: Option<&[u8]>) -> bool {
    bytes.is_some_and(|b| b.iter().all(u8::is_ascii_hexdigit))
}

/// Returns the end of the escape sequence whose `\` is at `index`
fn escape_end(bytes: &[u8], index: usize) -> Result<usize, ScanError> {
    match bytes.get(index + 1) {
        Some(b'"' | b'\\' | b'/' | b'b' | b'f' | b'n' | b'r' | b't') => Ok(index + 2),
        Some(b'u') if is_hex_digits(bytes.get(index + 2..index + 6)) => Ok(index + 6),
        // Escape cut off by the end of the window
        None => Err(ScanError::syntax(Kind::String, bytes.len())),
        Some(_) => Err(ScanError::syntax(Kind::String, index)),
    }
}

impl Cursor<'_> {
    /// Finds the end of the string whose opening `"` is at the current offset
    ///
    /// Returns the offset just behind the closing `"`. When `validate` is `false` escape
    /// sequences are only skipped and control characters are not rejected.
    pub(crate) fn string_end(&self, validate: bool) -> Result<usize, ScanError> {
        let bytes = self.bytes;
        debug_assert_eq!(Some(&b'"'), bytes.get(self.offset));
        let mut i = self.offset + 1;

        while let Some(&b) = bytes.get(i) {
            match b {
                b'"' => return Ok(i + 1),
                b'\\' if validate => i = escape_end(bytes, i)?,
                b'\\' => i += 2,
                0x00..=0x1F if validate => return Err(ScanError::syntax(Kind::String, i)),
                _ => i += 1,
            }
        }

        Err(ScanError::syntax(Kind::String, bytes.len()))
    }

    /// Finds the end of the `true`, `false` or `null` literal at the current offset
    pub(crate) fn literal_end(&self) -> Result<usize, ScanError> {
        let start = self.offset;
        let (literal, kind): (&[u8], Kind) = match self.bytes.get(start) {
            Some(b't') => (b"true", Kind::Bool),
            Some(b'f') => (b"false", Kind::Bool),
            Some(b'n') => (b"null", Kind::Null),
            _ => return Err(ScanError::syntax(Kind::Invalid, start)),
        };

        let end = start + literal.len();
        if self.bytes.get(start..end) != Some(literal) {
            return Err(ScanError::syntax(kind, start));
        }
        match self.bytes.get(end) {
            // Rejects for example `truey`
            Some(&b) if !is_value_delimiter(b) => Err(ScanError::syntax(kind, start)),
            _ => Ok(end),
        }
    }

    /// Finds the end of the literal at the current offset without checking its content
    ///
    /// Consumes everything up to the next delimiter or the end of the window.
    pub(crate) fn unsafe_literal_end(&self) -> usize {
        let rest = &self.bytes[self.offset..];
        rest.iter()
            .position(|&b| is_value_delimiter(b))
            .map_or(self.bytes.len(), |i| self.offset + i)
    }
}
