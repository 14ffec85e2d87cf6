//! Internal module for locating the end of JSON values
//!
//! All offsets used by the scanners are absolute positions in the underlying buffer. A scan
//! never looks at bytes at or behind the end of the window of the [`Cursor`].

use thiserror::Error;

use crate::{document::Kind, json_number};

mod scalar;
mod structure;

pub(crate) use structure::{Container, ContainerWalker, WalkEvent};

/// Failure of a scan
#[derive(Error, PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum ScanError {
    /// The data does not conform to the JSON grammar
    ///
    /// `kind` is the kind of the value which was scanned when the error occurred.
    #[error("malformed {kind} at offset {offset}")]
    Syntax { kind: Kind, offset: usize },
    /// A validating scan encountered more nested arrays and objects than allowed
    #[error("nesting depth {max_nesting_depth} exceeded at offset {offset}")]
    NestingTooDeep {
        max_nesting_depth: u32,
        offset: usize,
    },
}

impl ScanError {
    pub(crate) fn syntax(kind: Kind, offset: usize) -> Self {
        ScanError::Syntax { kind, offset }
    }
}

pub(crate) fn is_whitespace(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r')
}

/// Whether the byte may directly follow a number or literal
pub(crate) fn is_value_delimiter(b: u8) -> bool {
    matches!(b, b' ' | b'\t' | b'\n' | b'\r' | b',' | b'}' | b']')
}

/// Read position inside a window of the buffer
///
/// The cursor is `Copy`; scans of nested values work on a copy so that the position of
/// the original cursor stays where it was.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Cursor<'a> {
    /// Buffer truncated at the end of the window
    bytes: &'a [u8],
    pub(crate) offset: usize,
    /// Number of enclosing arrays and objects entered by validating scans
    depth: u32,
    max_nesting_depth: Option<u32>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(
        data: &'a [u8],
        offset: usize,
        window_end: usize,
        max_nesting_depth: Option<u32>,
    ) -> Self {
        debug_assert!(offset <= window_end && window_end <= data.len());
        Cursor {
            bytes: &data[..window_end],
            offset,
            depth: 0,
            max_nesting_depth,
        }
    }

    pub(crate) fn bytes(&self) -> &'a [u8] {
        self.bytes
    }

    /// Moves the cursor behind all whitespace and returns the next byte without consuming it
    ///
    /// Returns `None` if the end of the window has been reached.
    pub(crate) fn skip_whitespace(&mut self) -> Option<u8> {
        while let Some(&b) = self.bytes.get(self.offset) {
            if !is_whitespace(b) {
                return Some(b);
            }
            self.offset += 1;
        }
        None
    }

    /// Predicts the kind of the next value from its first byte
    pub(crate) fn predict(&mut self) -> Kind {
        match self.skip_whitespace() {
            Some(b'{') => Kind::Object,
            Some(b'[') => Kind::Array,
            Some(b'"') => Kind::String,
            Some(b'-' | b'0'..=b'9') => Kind::Number,
            Some(b't' | b'f') => Kind::Bool,
            Some(b'n') => Kind::Null,
            _ => Kind::Invalid,
        }
    }

    /// Finds the end of the next value, validating its complete grammar
    ///
    /// Afterwards the cursor is positioned at the start of the value.
    pub(crate) fn valid_value_end(&mut self) -> Result<(Kind, usize), ScanError> {
        let kind = self.predict();
        let end = match kind {
            Kind::Object => self.valid_container_end(Container::Object)?,
            Kind::Array => self.valid_container_end(Container::Array)?,
            Kind::Number => self.valid_number_end()?,
            Kind::String => self.string_end(true)?,
            Kind::Bool | Kind::Null => self.literal_end()?,
            Kind::Invalid => return Err(ScanError::syntax(Kind::Invalid, self.offset)),
        };
        Ok((kind, end))
    }

    /// Finds the end of the next value, only checking as much as needed to find its end
    ///
    /// Afterwards the cursor is positioned at the start of the value.
    pub(crate) fn unsafe_value_end(&mut self) -> Result<(Kind, usize), ScanError> {
        let kind = self.predict();
        let end = match kind {
            Kind::Object => self.unsafe_container_end(Container::Object)?,
            Kind::Array => self.unsafe_container_end(Container::Array)?,
            Kind::Number => self.unsafe_number_end()?,
            Kind::String => self.string_end(false)?,
            Kind::Bool | Kind::Null => self.unsafe_literal_end(),
            Kind::Invalid => return Err(ScanError::syntax(Kind::Invalid, self.offset)),
        };
        Ok((kind, end))
    }

    fn valid_number_end(&self) -> Result<usize, ScanError> {
        json_number::valid_number_end(self.bytes, self.offset)
            .map_err(|offset| ScanError::syntax(Kind::Number, offset))
    }

    fn unsafe_number_end(&self) -> Result<usize, ScanError> {
        json_number::unsafe_number_end(self.bytes, self.offset)
            .map_err(|offset| ScanError::syntax(Kind::Number, offset))
    }
}
