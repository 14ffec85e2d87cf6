//! Internal module for decoding the content of JSON strings

use std::borrow::Cow;

fn hex_value(bytes: &[u8], index: usize) -> Option<u32> {
    let digits = bytes.get(index..index + 4)?;
    digits.iter().try_fold(0_u32, |value, &b| {
        let digit = (b as char).to_digit(16)?;
        Some(value << 4 | digit)
    })
}

fn is_high_surrogate(unit: u32) -> bool {
    (0xD800..=0xDBFF).contains(&unit)
}

fn is_low_surrogate(unit: u32) -> bool {
    (0xDC00..=0xDFFF).contains(&unit)
}

/// Decodes the `\u` escape whose backslash is at `index`
///
/// Returns the decoded char and the number of bytes consumed, which is 12 for a
/// surrogate pair. Unpaired surrogates decode to U+FFFD.
fn unicode_escape(raw: &[u8], index: usize) -> Option<(char, usize)> {
    let unit = hex_value(raw, index + 2)?;

    if is_high_surrogate(unit) {
        if raw.get(index + 6..index + 8) == Some(b"\\u".as_slice()) {
            if let Some(low) = hex_value(raw, index + 8).filter(|&u| is_low_surrogate(u)) {
                let code_point = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
                let c = char::from_u32(code_point).unwrap_or(char::REPLACEMENT_CHARACTER);
                return Some((c, 12));
            }
        }
        return Some((char::REPLACEMENT_CHARACTER, 6));
    }

    let c = char::from_u32(unit).unwrap_or(char::REPLACEMENT_CHARACTER);
    Some((c, 6))
}

/// Decodes the raw content of a JSON string, without the enclosing quotes
///
/// Borrows from `raw` if it contains no escape sequences and is valid UTF-8. Malformed UTF-8
/// data is replaced with U+FFFD. Malformed escape sequences, which a validating scan would
/// have rejected, are kept as they are.
pub(crate) fn unescape(raw: &[u8]) -> Cow<'_, str> {
    if !raw.contains(&b'\\') {
        return String::from_utf8_lossy(raw);
    }

    let mut decoded = Vec::with_capacity(raw.len());
    let mut char_buf = [0_u8; 4];
    let mut i = 0;
    while let Some(&b) = raw.get(i) {
        if b != b'\\' {
            decoded.push(b);
            i += 1;
            continue;
        }

        let escaped = match raw.get(i + 1) {
            Some(b'"') => Some(('"', 2)),
            Some(b'\\') => Some(('\\', 2)),
            Some(b'/') => Some(('/', 2)),
            Some(b'b') => Some(('\u{8}', 2)),
            Some(b'f') => Some(('\u{C}', 2)),
            Some(b'n') => Some(('\n', 2)),
            Some(b'r') => Some(('\r', 2)),
            Some(b't') => Some(('\t', 2)),
            Some(b'u') => unicode_escape(raw, i),
            _ => None,
        };
        match escaped {
            Some((c, consumed)) => {
                decoded.extend_from_slice(c.encode_utf8(&mut char_buf).as_bytes());
                i += consumed;
            }
            None => {
                decoded.push(b);
                i += 1;
            }
        }
    }

    match String::from_utf8(decoded) {
        Ok(s) => Cow::Owned(s),
        Err(e) => Cow::Owned(String::from_utf8_lossy(e.as_bytes()).into_owned()),
    }
}

/// Compares the raw content of a JSON string with `s` after decoding it
///
/// Does not allocate when the raw content has no escape sequences.
pub(crate) fn eq_str(raw: &[u8], s: &str) -> bool {
    if !raw.contains(&b'\\') {
        return raw == s.as_bytes() || String::from_utf8_lossy(raw) == s;
    }
    unescape(raw) == s
}
