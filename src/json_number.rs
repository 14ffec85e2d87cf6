//! Internal module for scanning JSON numbers

use crate::scanner::is_value_delimiter;

/// What has been seen so far while scanning a number
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
struct NumberFlags {
    negative: bool,
    fractional: bool,
    exponent: bool,
}

fn is_digit_at(bytes: &[u8], index: usize) -> bool {
    bytes.get(index).is_some_and(u8::is_ascii_digit)
}

/// Finds the end of the JSON number starting at `start`
///
/// `bytes` ends at the end of the scan window. On success the exclusive end of the number
/// is returned, otherwise the offset of the byte which violates the number grammar (or the
/// window end if a required digit is missing).
pub(crate) fn valid_number_end(bytes: &[u8], start: usize) -> Result<usize, usize> {
    let mut flags = NumberFlags::default();
    let mut i = start;

    if bytes.get(i) == Some(&b'-') {
        flags.negative = true;
        i += 1;
    }

    let int_start = if flags.negative { start + 1 } else { start };
    match bytes.get(int_start) {
        Some(b'0') => {
            i += 1;
            // Leading 0 must not be followed by more digits, e.g. `01`
            if is_digit_at(bytes, i) {
                return Err(i);
            }
        }
        Some(b'1'..=b'9') => i += 1,
        _ => return Err(int_start),
    }

    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' => i += 1,
            b'.' => {
                // Second `.`, or `.` inside the exponent
                if flags.fractional || flags.exponent {
                    return Err(i);
                }
                flags.fractional = true;
                i += 1;
                if !is_digit_at(bytes, i) {
                    return Err(i);
                }
                i += 1;
            }
            b'e' | b'E' => {
                if flags.exponent {
                    return Err(i);
                }
                flags.exponent = true;
                i += 1;
                if matches!(bytes.get(i), Some(b'+' | b'-')) {
                    i += 1;
                }
                if !is_digit_at(bytes, i) {
                    return Err(i);
                }
                i += 1;
            }
            _ if is_value_delimiter(b) => return Ok(i),
            _ => return Err(i),
        }
    }

    Ok(i)
}

/// Finds the end of the number starting at `start` without checking the number grammar
///
/// Only verifies that the number consists of chars which can appear in a JSON number.
pub(crate) fn unsafe_number_end(bytes: &[u8], start: usize) -> Result<usize, usize> {
    let mut i = start;
    while let Some(&b) = bytes.get(i) {
        match b {
            b'0'..=b'9' | b'+' | b'-' | b'.' | b'e' | b'E' => i += 1,
            _ if is_value_delimiter(b) => return Ok(i),
            _ => return Err(i),
        }
    }
    Ok(i)
}
