//! Module for JSON path
//!
//! A JSON path consists of zero or more [`JsonPathPiece`] elements which either represent the index of a
//! JSON array item or the name of a JSON object member. These elements combined form the _path_ to a value
//! in a JSON document, which [`JsonDocument::path`](crate::document::JsonDocument::path) and
//! [`JsonDocument::get`](crate::document::JsonDocument::get) navigate to.
//!
//! The macro [`json_path!`](crate::json_path) and the function [`parse_json_path`]
//! can be used to create a JSON path in a concise way.
//!
//! Consider for example the following code:
//! ```
//! # use jsonspan::document::json_path::*;
//! vec![
//!     JsonPathPiece::ObjectMember("a".to_owned()),
//!     JsonPathPiece::ArrayItem(2),
//! ]
//! # ;
//! ```
//! It means: Within a JSON object the member with name "a", and assuming the value of that member is
//! a JSON array, of that array the item at index 2 (starting at 0). The string representation of the
//! path in dot-notation would be `a[2]`.
//! For example in the JSON string `{"a": [0.5, 1.5, 2.5]}` it would point to the value `2.5`.

use std::{
    fmt::{Display, Formatter},
    str::FromStr,
};
use thiserror::Error;

/// A piece of a JSON path
///
/// A piece can either represent the index of a JSON array item or the name of a JSON object member.
#[derive(PartialEq, Eq, Clone, Debug)]
pub enum JsonPathPiece {
    /// Index (starting at 0) of a JSON array item
    ArrayItem(usize),
    /// Name of a JSON object member
    ObjectMember(String),
}

/// Creates a [`JsonPathPiece::ArrayItem`] with the number as index
impl From<usize> for JsonPathPiece {
    fn from(v: usize) -> Self {
        JsonPathPiece::ArrayItem(v)
    }
}

/// Creates a [`JsonPathPiece::ObjectMember`] with the string as member name
impl From<String> for JsonPathPiece {
    fn from(v: String) -> Self {
        JsonPathPiece::ObjectMember(v)
    }
}

/// Creates a [`JsonPathPiece::ObjectMember`] with the string as member name
impl From<&str> for JsonPathPiece {
    fn from(v: &str) -> Self {
        JsonPathPiece::ObjectMember(v.to_string())
    }
}

/// Formats the piece the way it appears in dot-notation, for example `[2]` or `.name`
impl Display for JsonPathPiece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonPathPiece::ArrayItem(index) => write!(f, "[{index}]"),
            JsonPathPiece::ObjectMember(name) => write!(f, ".{name}"),
        }
    }
}

/// A JSON path
///
/// A JSON path as represented by this module are zero or more [`JsonPathPiece`] elements.
/// The macro [`json_path!`](crate::json_path) and the function [`parse_json_path`] can be
/// used to create a JSON path in a concise way.
pub type JsonPath = [JsonPathPiece];

/// Formats the path as absolute path in dot-notation, for example `$.outer[2]`
pub fn format_abs_json_path(json_path: &JsonPath) -> String {
    "$".to_string()
        + json_path
            .iter()
            .map(JsonPathPiece::to_string)
            .collect::<String>()
            .as_str()
}

/// Error which occurred while [parsing a JSON path](parse_json_path)
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("parse error at index {index}: {message}")]
pub struct JsonPathParseError {
    /// Index (starting at 0) where the error occurred within the string
    pub index: usize,
    /// Message describing why the error occurred
    pub message: String,
}

impl JsonPathParseError {
    fn new(index: usize, message: impl Into<String>) -> Self {
        JsonPathParseError {
            index,
            message: message.into(),
        }
    }
}

/// Parses a JSON path in dot-notation, for example `outer[4].inner`
///
/// This is a convenience function which allows obtaining a vector of [`JsonPathPiece`] from a string form.
/// The path string must not start with `$` (respectively `$.`) and member names are limited to contain only
/// `a`-`z`, `A`-`Z`, `0`-`9`, `-` and `_`. The path string must not be empty. For malformed path strings
/// an error is returned.
///
/// # Examples
/// ```
/// # use jsonspan::document::json_path::*;
/// let json_path = parse_json_path("outer[1].inner[2][3]")?;
/// assert_eq!(
///     json_path,
///     vec![
///         JsonPathPiece::ObjectMember("outer".to_owned()),
///         JsonPathPiece::ArrayItem(1),
///         JsonPathPiece::ObjectMember("inner".to_owned()),
///         JsonPathPiece::ArrayItem(2),
///         JsonPathPiece::ArrayItem(3),
///     ]
/// );
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn parse_json_path(path: &str) -> Result<Vec<JsonPathPiece>, JsonPathParseError> {
    let path_bytes = path.as_bytes();
    let first = match path_bytes.first() {
        None => return Err(JsonPathParseError::new(0, "empty path")),
        Some(b'.') => return Err(JsonPathParseError::new(0, "leading '.' is not allowed")),
        Some(&b) => b,
    };

    let mut parsed_path = Vec::new();
    let mut index = 0;
    // First member name cannot have leading '.'
    let mut is_array_item = first == b'[';

    loop {
        if is_array_item {
            index += 1;
            let end_index = match path_bytes[index..].iter().position(|&b| b == b']') {
                None => {
                    return Err(JsonPathParseError::new(
                        index,
                        "missing ']' for array index",
                    ))
                }
                Some(i) => index + i,
            };
            let digits = &path[index..end_index];
            if digits.is_empty() {
                return Err(JsonPathParseError::new(index, "missing index value"));
            }
            if let Some(i) = digits.bytes().position(|b| !b.is_ascii_digit()) {
                return Err(JsonPathParseError::new(index + i, "invalid index digit"));
            }
            if digits.starts_with('0') && digits.len() > 1 {
                return Err(JsonPathParseError::new(index, "leading 0 is not allowed"));
            }

            let path_index = usize::from_str(digits).map_err(|e| {
                JsonPathParseError::new(index, format!("invalid index value: {e}"))
            })?;
            parsed_path.push(JsonPathPiece::ArrayItem(path_index));
            index = end_index + 1;
        } else {
            let end_index = path_bytes[index..]
                .iter()
                .position(|&b| b == b'.' || b == b'[')
                .map_or(path_bytes.len(), |i| index + i);
            let name = &path[index..end_index];
            if name.is_empty() {
                return Err(JsonPathParseError::new(index, "missing member name"));
            }
            if let Some(i) = name
                .bytes()
                .position(|b| !(b.is_ascii_alphanumeric() || b == b'-' || b == b'_'))
            {
                return Err(JsonPathParseError::new(
                    index + i,
                    "unsupported char in member name",
                ));
            }

            parsed_path.push(JsonPathPiece::ObjectMember(name.to_owned()));
            index = end_index;
        }

        match path_bytes.get(index) {
            None => break,
            Some(b'.') => {
                is_array_item = false;
                index += 1;
            }
            // '[' is skipped at the beginning of the loop
            Some(b'[') => is_array_item = true,
            Some(_) => {
                return Err(JsonPathParseError::new(
                    index,
                    "expecting either '.' or '['",
                ))
            }
        }
    }

    Ok(parsed_path)
}

/// Creates a JSON path from path pieces
///
/// The arguments to this macro represent the path pieces:
/// - numbers of type `usize` are converted to [`JsonPathPiece::ArrayItem`]
/// - strings are converted to [`JsonPathPiece::ObjectMember`]
///
/// At least one path piece argument must be provided.
///
/// # Examples
/// ```
/// # use jsonspan::document::json_path::*;
/// let json_path = json_path!["outer", 3, "inner"];
/// assert_eq!(
///     json_path,
///     [
///         JsonPathPiece::ObjectMember("outer".to_owned()),
///         JsonPathPiece::ArrayItem(3),
///         JsonPathPiece::ObjectMember("inner".to_owned()),
///     ]
/// );
/// ```
#[macro_export]
macro_rules! json_path {
    ( $( $piece:expr ),+ ) => {
        {
            [
                $(
                    $crate::document::json_path::JsonPathPiece::from($piece),
                )*
            ]
        }
    };
}

// Re-export the macro to be available under the `jsonspan::document::json_path` module path
#[doc(inline)]
pub use json_path;
