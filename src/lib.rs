#![warn(missing_docs)]
#![forbid(unsafe_code)]
// Allow needless `return` because that makes it sometimes more obvious that
// an expression is the result of the function
#![allow(clippy::needless_return)]
// Allow `assert_eq!(true, ...)` because in some cases it is used to check a bool
// value and not a 'flag' / 'state', and `assert_eq!` makes that more explicit
#![allow(clippy::bool_assert_comparison)]
// Enable 'unused' warnings for doc tests (are disabled by default)
#![doc(test(no_crate_inject))]
#![doc(test(attr(warn(unused))))]
// Fail on warnings in doc tests
#![doc(test(attr(deny(warnings))))]
// When `docsrs` configuration flag is set enable banner for features in documentation
// See https://stackoverflow.com/q/61417452
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

//! jsonspan is a lazy, zero-copy navigator for [RFC 8259](https://www.rfc-editor.org/rfc/rfc8259.html)
//! JSON documents.
//!
//! Instead of parsing a complete JSON document into a tree, a [`JsonDocument`](document::JsonDocument)
//! only remembers the byte range of the value it points to. Navigating into a JSON object or array
//! skips over all values in front of the target value, only checking as much as needed to find
//! their end, and validates the target value completely. Scalar values are only decoded when
//! requested. The JSON data is shared by all handles derived from one document and never copied.
//!
//! Skipping values without validating them makes navigation considerably faster, but it also means
//! that malformed data in skipped values is not detected. Use [`JsonDocument::check_valid`](document::JsonDocument::check_valid)
//! to validate a complete document.
//!
//! # Terminology
//!
//! This crate uses the same terminology as the JSON specification:
//!
//! - *object*: `{ ... }`
//!   - *member*: Entry in an object. For example the JSON object `{"a": 1}` has the member
//!     `"a": 1` where `"a"` is the member *name* and `1` is the member *value*.
//! - *array*: `[ ... ]`
//! - *literal*:
//!   - *boolean*: `true` or `false`
//!   - `null`
//! - *number*: number value, for example `123.4e+10`
//! - *string*: string value, for example `"text in \"quotes\""`
//!
//! # Usage examples
//!
//! ## Navigating
//!
//! ```
//! # use jsonspan::document::*;
//! # use jsonspan::json_path;
//! // In this example JSON data comes from a string;
//! // normally it would come from a file or a network connection
//! let json = r#"{"users": [{"name": "a"}, {"name": "b", "admin": true}]}"#;
//! let document = JsonDocument::from(json);
//!
//! let mut admin = document.get(&json_path!["users", 1, "admin"])?;
//! assert_eq!(true, admin.parse_bool()?);
//!
//! let mut name = document.get(&json_path!["users", 0, "name"])?;
//! assert_eq!("a", name.parse_str()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Iterating
//!
//! ```
//! # use jsonspan::document::*;
//! let mut document = JsonDocument::from("[1, 2.5, -3]");
//! let mut sum = 0.0;
//! for item in document.array()? {
//!     let (_index, mut value) = item?;
//!     sum += value.parse_f64()?;
//! }
//! assert_eq!(0.5, sum);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Logging
//!
//! Failed operations and navigation steps are logged with the [`log`](https://docs.rs/log) facade,
//! on `debug` and `trace` level respectively. No logger implementation is installed by this crate.

pub mod document;
pub mod value;

mod json_number;
mod scanner;
mod unescape;
