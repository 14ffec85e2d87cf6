//! Module for lazily navigating JSON documents
//!
//! [`JsonDocument`] is a handle to a JSON value inside a shared buffer. Creating a handle does
//! not scan anything; the boundaries of values are only determined once an operation needs them.
//! Navigation with [`JsonDocument::object_index`], [`JsonDocument::index`] and [`JsonDocument::path`]
//! validates the value it lands on, and only skips over all other values, checking just enough to
//! find their end.
//!
//! # Examples
//! ```
//! # use jsonspan::document::*;
//! # use jsonspan::json_path;
//! let mut document = JsonDocument::from(r#"{"a": [1, {"b": "text"}], "c": null}"#);
//!
//! document.path(&json_path!["a", 1, "b"])?;
//! assert_eq!(Kind::String, document.kind());
//! assert_eq!("text", document.parse_string()?);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

use std::{
    borrow::Cow,
    fmt::{Debug, Formatter},
    num::{ParseFloatError, ParseIntError},
    ops::Range,
    str::FromStr,
    sync::Arc,
};

use thiserror::Error;

use crate::{
    scanner::{Container, ContainerWalker, Cursor, ScanError, WalkEvent},
    unescape::{eq_str, unescape},
    value::Value,
};

use self::json_path::{format_abs_json_path, JsonPath, JsonPathPiece};

mod iter;
pub mod json_path;

pub use iter::{ArrayIter, ObjectIter};

/// Kind of a JSON value
///
/// The kind is predicted from the first byte of a value and does not say anything about whether
/// the value is well-formed.
#[derive(PartialEq, Eq, Clone, Copy, strum::Display, Debug)]
pub enum Kind {
    /// The first byte cannot start any JSON value, or there is no value at all
    Invalid,
    /// JSON object: `{ ... }`
    Object,
    /// JSON array: `[ ... ]`
    Array,
    /// JSON number, for example `123.4e+10`
    Number,
    /// JSON string, for example `"text in \"quotes\""`
    String,
    /// JSON boolean: `true` or `false`
    Bool,
    /// JSON null: `null`
    Null,
}

/// Settings to customize the document behavior
///
/// These settings are used by [`JsonDocument::new_custom`] and are inherited by all handles derived
/// from the document. To avoid repeating the default values for unchanged settings
/// `..Default::default()` can be used:
/// ```
/// # use jsonspan::document::DocumentSettings;
/// DocumentSettings {
///     allow_trailing_data: true,
///     // For all other settings use the default
///     ..Default::default()
/// }
/// # ;
/// ```
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub struct DocumentSettings {
    /// Maximum nesting depth of JSON arrays and objects for validating scans
    ///
    /// Validating scans recurse into nested arrays and objects, so without a limit malicious
    /// JSON data consisting of deeply nested arrays could exhaust the stack. When the limit is
    /// exceeded [`DocumentError::MaxNestingDepthExceeded`] is returned. `None` disables the limit.
    ///
    /// Scans which only skip values count brackets instead of recursing and are therefore
    /// never limited.
    ///
    /// The default is `Some(128)`.
    pub max_nesting_depth: Option<u32>,

    /// Whether [`JsonDocument::check_valid`] should ignore data after the top-level value
    ///
    /// Normally only whitespace may follow the top-level value. This setting can be useful when
    /// the JSON document is embedded in other data.
    ///
    /// The default is `false`.
    pub allow_trailing_data: bool,
}

impl Default for DocumentSettings {
    /// Creates the default settings
    ///
    /// - max nesting depth: 128
    /// - trailing data: disallowed
    fn default() -> Self {
        DocumentSettings {
            max_nesting_depth: Some(128),
            allow_trailing_data: false,
        }
    }
}

/// Number of bytes before and after the error offset included in [`JsonSyntaxError::context`]
const CONTEXT_RADIUS: usize = 5;

/// JSON syntax error
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
#[error("JSON syntax error when parsing {kind} at offset {offset}, context near: |{context}|")]
pub struct JsonSyntaxError {
    /// Kind of the value which was being scanned when the error occurred
    pub kind: Kind,
    /// Byte offset (starting at 0) in the buffer where the error occurred
    pub offset: usize,
    /// Data surrounding the error location
    ///
    /// Contains up to 5 bytes in front of and behind the offset; malformed UTF-8 data is
    /// replaced with U+FFFD.
    pub context: String,
}

impl JsonSyntaxError {
    pub(crate) fn new(kind: Kind, offset: usize, data: &[u8]) -> Self {
        let end = data.len().min(offset.saturating_add(CONTEXT_RADIUS));
        let start = offset.saturating_sub(CONTEXT_RADIUS).min(end);
        JsonSyntaxError {
            kind,
            offset,
            context: String::from_utf8_lossy(&data[start..end]).into_owned(),
        }
    }
}

/// Error which occurred while using a [`JsonDocument`]
#[non_exhaustive]
#[derive(Error, PartialEq, Eq, Clone, Debug)]
pub enum DocumentError {
    /// A syntax error was encountered
    #[error("syntax error: {0}")]
    SyntaxError(#[from] JsonSyntaxError),
    /// The maximum nesting depth was exceeded
    ///
    /// See [`DocumentSettings::max_nesting_depth`].
    #[error("maximum nesting depth {max_nesting_depth} exceeded at offset {offset}")]
    MaxNestingDepthExceeded {
        /// The maximum nesting depth which was configured
        max_nesting_depth: u32,
        /// Byte offset of the array or object which exceeded the depth
        offset: usize,
    },
    /// The value had an unexpected kind for the called method
    ///
    /// This error occurs for example when calling [`JsonDocument::parse_string`] on a JSON number.
    #[error("method '{method}' expects JSON value kind {expected} but got {actual}")]
    UnexpectedKind {
        /// Name of the method which was called
        method: &'static str,
        /// The kind the method requires
        expected: Kind,
        /// The actual kind of the value
        actual: Kind,
    },
    /// A piece of a JSON path did not match the kind of the value
    ///
    /// An [`ObjectMember`](JsonPathPiece::ObjectMember) piece requires a JSON object and an
    /// [`ArrayItem`](JsonPathPiece::ArrayItem) piece requires a JSON array.
    #[error("path piece '{piece}' cannot be applied to JSON value kind {actual}")]
    PathTypeMismatch {
        /// The path piece which could not be applied
        piece: JsonPathPiece,
        /// The actual kind of the value
        actual: Kind,
    },
    /// The JSON object has no member with the requested name
    #[error("JSON object has no member with name '{member_name}'")]
    MissingObjectMember {
        /// The requested member name
        member_name: String,
    },
    /// The JSON array has fewer items than the requested index requires
    #[error("index {index} is out of range for JSON array")]
    IndexOutOfRange {
        /// The requested index (starting at 0)
        index: usize,
    },
    /// The JSON number cannot be converted to an integer
    ///
    /// This is the case for numbers with fraction or exponent, and for numbers which are
    /// too large.
    #[error("JSON number '{number}' is not a valid integer: {source}")]
    InvalidInteger {
        /// The JSON number
        number: String,
        /// The reason why parsing failed
        source: ParseIntError,
    },
    /// The JSON number cannot be converted to a floating point number
    #[error("JSON number '{number}' is not a valid floating point number: {source}")]
    InvalidFloat {
        /// The JSON number
        number: String,
        /// The reason why parsing failed
        source: ParseFloatError,
    },
    /// The JSON number is too large in magnitude to be represented as `f64`
    #[error("JSON number '{number}' is out of range for a floating point number")]
    FloatOutOfRange {
        /// The JSON number
        number: String,
    },
}

fn convert_scan_error(error: ScanError, data: &[u8]) -> DocumentError {
    match error {
        ScanError::Syntax { kind, offset } => JsonSyntaxError::new(kind, offset, data).into(),
        ScanError::NestingTooDeep {
            max_nesting_depth,
            offset,
        } => DocumentError::MaxNestingDepthExceeded {
            max_nesting_depth,
            offset,
        },
    }
}

/// Handle to a JSON value inside a shared buffer
///
/// The handle stores the byte range of its value, which is determined lazily on first use.
/// All handles derived from one document, for example through [`get`](Self::get) or the
/// iterators, share the same buffer without copying it. Cloning a handle is cheap.
///
/// Methods which fail store a copy of the error which can afterwards be obtained with
/// [`error`](Self::error). Failing navigation methods leave the handle at the value it
/// pointed to before.
///
/// Operations which skip values only check as much of their grammar as needed to find
/// their end. [`check_valid`](Self::check_valid) validates the complete value.
///
/// # Examples
/// ```
/// # use jsonspan::document::*;
/// let mut document = JsonDocument::from(r#"{"k1": "v1", "k2": true}"#);
///
/// document.object_index("k2")?;
/// assert_eq!(Kind::Bool, document.kind());
/// assert_eq!(b"true", document.text()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone)]
pub struct JsonDocument {
    data: Arc<[u8]>,
    settings: DocumentSettings,
    /// Scan position
    offset: usize,
    head: usize,
    /// End of the value; `None` if the value has not been located yet
    tail: Option<usize>,
    window_start: usize,
    window_end: usize,
    /// Whether `head..tail` was located by a validating scan
    validated: bool,
    error: Option<DocumentError>,
}

// Custom Debug implementation to not print the complete buffer
impl Debug for JsonDocument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDocument")
            .field("data_len", &self.data.len())
            .field("settings", &self.settings)
            .field("offset", &self.offset)
            .field("head", &self.head)
            .field("tail", &self.tail)
            .field("window_start", &self.window_start)
            .field("window_end", &self.window_end)
            .field("validated", &self.validated)
            .field("error", &self.error)
            .finish()
    }
}

/// Creates a document from the UTF-8 bytes of the string
impl From<&str> for JsonDocument {
    fn from(json: &str) -> Self {
        JsonDocument::new(json.as_bytes())
    }
}

/// Creates a document from the UTF-8 bytes of the string
impl From<String> for JsonDocument {
    fn from(json: String) -> Self {
        JsonDocument::new(json.into_bytes())
    }
}

impl From<Vec<u8>> for JsonDocument {
    fn from(json: Vec<u8>) -> Self {
        JsonDocument::new(json)
    }
}

impl JsonDocument {
    /// Creates a document for the JSON data with [default settings](DocumentSettings::default)
    ///
    /// The data is not scanned yet, so this method cannot fail. Use [`check_valid`](Self::check_valid)
    /// to validate the complete document.
    pub fn new(data: impl Into<Arc<[u8]>>) -> Self {
        JsonDocument::new_custom(data, DocumentSettings::default())
    }

    /// Creates a document for the JSON data with custom settings
    pub fn new_custom(data: impl Into<Arc<[u8]>>, settings: DocumentSettings) -> Self {
        let data = data.into();
        let window_end = data.len();
        JsonDocument {
            data,
            settings,
            offset: 0,
            head: 0,
            tail: None,
            window_start: 0,
            window_end,
            validated: false,
            error: None,
        }
    }

    /// Gets the settings of this document
    pub fn settings(&self) -> &DocumentSettings {
        &self.settings
    }

    /// Gets the error of the last failed operation, if any
    pub fn error(&self) -> Option<&DocumentError> {
        self.error.as_ref()
    }

    /// Resets the handle to the complete buffer, discarding all navigation state and the error
    pub fn reset(&mut self) {
        self.offset = 0;
        self.head = 0;
        self.tail = None;
        self.window_start = 0;
        self.window_end = self.data.len();
        self.validated = false;
        self.error = None;
    }

    /// Gets the byte range of the value, if it has already been located
    pub fn span(&self) -> Option<Range<usize>> {
        self.tail.map(|tail| self.head..tail)
    }

    fn cursor(&self, offset: usize, window_end: usize) -> Cursor<'_> {
        debug_assert!(
            self.window_start <= offset && offset <= window_end && window_end <= self.window_end,
            "scan {offset}..{window_end} outside of window {}..{}",
            self.window_start,
            self.window_end
        );
        Cursor::new(&self.data, offset, window_end, self.settings.max_nesting_depth)
    }

    fn convert(&self, error: ScanError) -> DocumentError {
        convert_scan_error(error, &self.data)
    }

    /// Stores the error, if any, in the error slot
    fn record<T>(&mut self, result: Result<T, DocumentError>) -> Result<T, DocumentError> {
        if let Err(e) = &result {
            log::debug!("document operation failed: {e}");
            self.error = Some(e.clone());
        }
        result
    }

    /// Offset of the first byte of the value, or of the end of the window if there is none
    fn value_start(&self) -> usize {
        if self.tail.is_some() {
            return self.head;
        }
        let mut cursor = self.cursor(self.offset, self.window_end);
        cursor.skip_whitespace();
        cursor.offset
    }

    fn kind_at(&self, offset: usize, window_end: usize) -> Kind {
        self.cursor(offset, window_end).predict()
    }

    /// Predicts the kind of the value from its first byte
    ///
    /// This does not check whether the value is well-formed.
    pub fn kind(&self) -> Kind {
        self.kind_at(self.value_start(), self.window_end)
    }

    /// Predicts the kind of the value, moving the scan position to the start of the value
    pub fn peek(&mut self) -> Kind {
        let mut cursor = self.cursor(self.offset, self.window_end);
        let kind = cursor.predict();
        self.offset = cursor.offset;
        kind
    }

    fn expect_kind(&self, method: &'static str, expected: Kind) -> Result<(), DocumentError> {
        let actual = self.kind();
        if actual != expected {
            return Err(DocumentError::UnexpectedKind {
                method,
                expected,
                actual,
            });
        }
        Ok(())
    }

    /// Determines the range of the value
    ///
    /// With `validate` an already located value which has not been validated yet is scanned again.
    fn resolve(&mut self, validate: bool) -> Result<(Kind, usize, usize), DocumentError> {
        if let Some(tail) = self.tail {
            let kind = self.kind_at(self.head, tail);
            if self.validated || !validate {
                return Ok((kind, self.head, tail));
            }

            let mut cursor = self.cursor(self.head, tail);
            let (_, end) = cursor.valid_value_end().map_err(|e| self.convert(e))?;
            if end != tail {
                return Err(JsonSyntaxError::new(kind, end, &self.data).into());
            }
            self.validated = true;
            return Ok((kind, self.head, tail));
        }

        let mut cursor = self.cursor(self.offset, self.window_end);
        let scan_result = if validate {
            cursor.valid_value_end()
        } else {
            cursor.unsafe_value_end()
        };
        let (kind, end) = scan_result.map_err(|e| self.convert(e))?;
        let start = cursor.offset;
        self.offset = start;
        self.head = start;
        self.tail = Some(end);
        self.validated = validate;
        Ok((kind, self.head, end))
    }

    fn check_valid_impl(&mut self) -> Result<(), DocumentError> {
        let (_, _, tail) = self.resolve(true)?;
        if !self.settings.allow_trailing_data {
            let mut cursor = self.cursor(tail, self.window_end);
            if cursor.skip_whitespace().is_some() {
                return Err(JsonSyntaxError::new(Kind::Invalid, cursor.offset, &self.data).into());
            }
        }
        Ok(())
    }

    /// Validates the complete value
    ///
    /// Only whitespace may follow the value, unless [`DocumentSettings::allow_trailing_data`]
    /// is enabled.
    ///
    /// # Examples
    /// ```
    /// # use jsonspan::document::*;
    /// assert!(JsonDocument::from("[1, {\"a\": null}]").check_valid().is_ok());
    /// assert!(JsonDocument::from("[1, {\"a\": nul}]").check_valid().is_err());
    /// ```
    pub fn check_valid(&mut self) -> Result<(), DocumentError> {
        let result = self.check_valid_impl();
        self.record(result)
    }

    /// Gets the raw bytes of the value, without surrounding whitespace
    ///
    /// If the value has not been located yet it is skipped to find its end; use
    /// [`check_valid`](Self::check_valid) first to make sure it is well-formed.
    pub fn text(&mut self) -> Result<&[u8], DocumentError> {
        let result = self.resolve(false);
        let (_, head, tail) = self.record(result)?;
        Ok(&self.data[head..tail])
    }

    /// Gets the raw text of the value, see [`text`](Self::text)
    ///
    /// Malformed UTF-8 data is replaced with U+FFFD.
    pub fn text_str(&mut self) -> Result<Cow<'_, str>, DocumentError> {
        self.text().map(String::from_utf8_lossy)
    }

    /// Creates a handle for a value inside the window of this handle
    fn child(&self, head: usize, tail: usize, validated: bool) -> JsonDocument {
        JsonDocument {
            data: Arc::clone(&self.data),
            settings: self.settings,
            offset: head,
            head,
            tail: Some(tail),
            window_start: head,
            window_end: tail,
            validated,
            error: None,
        }
    }

    fn reposition(&mut self, head: usize, tail: usize) {
        self.offset = head;
        self.head = head;
        self.tail = Some(tail);
        self.window_start = head;
        self.window_end = tail;
        self.validated = true;
    }

    fn locate_container(
        &mut self,
        container: Container,
        method: &'static str,
        validate: bool,
    ) -> Result<JsonDocument, DocumentError> {
        self.expect_kind(method, container.kind())?;
        let (_, head, tail) = self.resolve(validate)?;
        Ok(self.child(head, tail, self.validated))
    }

    /// Validates the JSON object and returns an iterator over its members
    ///
    /// # Examples
    /// ```
    /// # use jsonspan::document::*;
    /// let mut document = JsonDocument::from(r#"{"a": 1, "b": 2}"#);
    /// let mut sum = 0;
    /// for member in document.object()? {
    ///     let (_name, mut value) = member?;
    ///     sum += value.parse_i64()?;
    /// }
    /// assert_eq!(3, sum);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn object(&mut self) -> Result<ObjectIter, DocumentError> {
        let result = self.locate_container(Container::Object, "object", true);
        self.record(result).map(ObjectIter::new)
    }

    /// Returns an iterator over the members of the JSON object without validating it first
    ///
    /// Member values are only skipped; the handles obtained from the iterator validate
    /// scalar values before decoding them.
    pub fn unsafe_object(&mut self) -> Result<ObjectIter, DocumentError> {
        let result = self.locate_container(Container::Object, "unsafe_object", false);
        self.record(result).map(ObjectIter::new)
    }

    /// Validates the JSON array and returns an iterator over its items
    pub fn array(&mut self) -> Result<ArrayIter, DocumentError> {
        let result = self.locate_container(Container::Array, "array", true);
        self.record(result).map(ArrayIter::new)
    }

    /// Returns an iterator over the items of the JSON array without validating it first
    pub fn unsafe_array(&mut self) -> Result<ArrayIter, DocumentError> {
        let result = self.locate_container(Container::Array, "unsafe_array", false);
        self.record(result).map(ArrayIter::new)
    }

    /// Finds the value of the first member named `name` of the object starting at `head`
    fn find_member(
        &self,
        head: usize,
        window_end: usize,
        name: &str,
    ) -> Result<(usize, usize), DocumentError> {
        let mut cursor = self.cursor(head, window_end);
        let mut walker = ContainerWalker::new(Container::Object);
        let mut is_match = false;

        loop {
            match walker.step(&mut cursor).map_err(|e| self.convert(e))? {
                WalkEvent::Name { start, end } => {
                    is_match = eq_str(&self.data[start + 1..end - 1], name);
                }
                WalkEvent::ValueStart if is_match => {
                    let (_, end) = cursor.valid_value_end().map_err(|e| self.convert(e))?;
                    log::trace!("found member '{name}' at {}..{end}", cursor.offset);
                    return Ok((cursor.offset, end));
                }
                WalkEvent::ValueStart => {
                    let (_, end) = cursor.unsafe_value_end().map_err(|e| self.convert(e))?;
                    cursor.offset = end;
                }
                WalkEvent::Close { .. } => {
                    return Err(DocumentError::MissingObjectMember {
                        member_name: name.to_owned(),
                    })
                }
            }
        }
    }

    /// Finds the item at `index` of the array starting at `head`
    fn find_item(
        &self,
        head: usize,
        window_end: usize,
        index: usize,
    ) -> Result<(usize, usize), DocumentError> {
        let mut cursor = self.cursor(head, window_end);
        let mut walker = ContainerWalker::new(Container::Array);
        let mut current = 0;

        loop {
            match walker.step(&mut cursor).map_err(|e| self.convert(e))? {
                WalkEvent::ValueStart if current == index => {
                    let (_, end) = cursor.valid_value_end().map_err(|e| self.convert(e))?;
                    log::trace!("found item {index} at {}..{end}", cursor.offset);
                    return Ok((cursor.offset, end));
                }
                WalkEvent::ValueStart => {
                    let (_, end) = cursor.unsafe_value_end().map_err(|e| self.convert(e))?;
                    cursor.offset = end;
                    current += 1;
                }
                // Arrays have no member names
                WalkEvent::Name { .. } => {}
                WalkEvent::Close { .. } => return Err(DocumentError::IndexOutOfRange { index }),
            }
        }
    }

    /// Moves the handle to the value of the member with the given name
    ///
    /// The value must be a JSON object. If it contains multiple members with the same name
    /// the first one is used. The member value is validated; all values in front of it are
    /// only skipped. On failure the handle keeps pointing to the object.
    ///
    /// Member names are compared after resolving escape sequences, so `"key"` matches
    /// the name `key`.
    pub fn object_index(&mut self, name: &str) -> Result<(), DocumentError> {
        let result = self
            .expect_kind("object_index", Kind::Object)
            .and_then(|()| self.find_member(self.value_start(), self.window_end, name));
        let (head, tail) = self.record(result)?;
        self.reposition(head, tail);
        Ok(())
    }

    /// Moves the handle to the item at the given index (starting at 0)
    ///
    /// The value must be a JSON array. The item is validated; all items in front of it are
    /// only skipped. On failure the handle keeps pointing to the array.
    pub fn index(&mut self, index: usize) -> Result<(), DocumentError> {
        let result = self
            .expect_kind("index", Kind::Array)
            .and_then(|()| self.find_item(self.value_start(), self.window_end, index));
        let (head, tail) = self.record(result)?;
        self.reposition(head, tail);
        Ok(())
    }

    fn locate_path(&self, path: &JsonPath) -> Result<(usize, usize), DocumentError> {
        let mut head = self.value_start();
        let mut window_end = self.window_end;

        if path.is_empty() {
            let mut cursor = self.cursor(head, window_end);
            let (_, end) = cursor.valid_value_end().map_err(|e| self.convert(e))?;
            return Ok((cursor.offset, end));
        }

        for piece in path {
            let actual = self.kind_at(head, window_end);
            let span = match piece {
                JsonPathPiece::ObjectMember(name) if actual == Kind::Object => {
                    self.find_member(head, window_end, name)?
                }
                JsonPathPiece::ArrayItem(index) if actual == Kind::Array => {
                    self.find_item(head, window_end, *index)?
                }
                _ => {
                    return Err(DocumentError::PathTypeMismatch {
                        piece: piece.clone(),
                        actual,
                    })
                }
            };
            (head, window_end) = span;
        }
        log::trace!(
            "resolved path {} to {head}..{window_end}",
            format_abs_json_path(path)
        );
        Ok((head, window_end))
    }

    /// Moves the handle along the path
    ///
    /// Each [`ObjectMember`](JsonPathPiece::ObjectMember) piece behaves like [`object_index`](Self::object_index)
    /// and each [`ArrayItem`](JsonPathPiece::ArrayItem) piece like [`index`](Self::index). The
    /// operation is atomic: if any piece fails the handle keeps pointing to its original value.
    /// An empty path validates the current value.
    ///
    /// # Examples
    /// ```
    /// # use jsonspan::document::*;
    /// # use jsonspan::json_path;
    /// let mut document = JsonDocument::from(r#"{"outer": [{"inner": 1.5}]}"#);
    /// document.path(&json_path!["outer", 0, "inner"])?;
    /// assert_eq!(1.5, document.parse_f64()?);
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn path(&mut self, path: &JsonPath) -> Result<(), DocumentError> {
        let result = self.locate_path(path);
        let (head, tail) = self.record(result)?;
        self.reposition(head, tail);
        Ok(())
    }

    /// Gets a new handle for the value at the path, leaving this handle unchanged
    ///
    /// See [`path`](Self::path). Since this handle is not modified, failures are not stored
    /// in its error slot.
    pub fn get(&self, path: &JsonPath) -> Result<JsonDocument, DocumentError> {
        match self.locate_path(path) {
            Ok((head, tail)) => Ok(self.child(head, tail, true)),
            Err(e) => {
                log::debug!("get of {} failed: {e}", format_abs_json_path(path));
                Err(e)
            }
        }
    }

    /// Locates the scalar value and validates it if it has only been skipped so far
    fn scalar_span(
        &mut self,
        method: &'static str,
        expected: Kind,
    ) -> Result<(usize, usize), DocumentError> {
        self.expect_kind(method, expected)?;
        let (_, head, tail) = self.resolve(true)?;
        Ok((head, tail))
    }

    fn number_text(&self, head: usize, tail: usize) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.data[head..tail])
    }

    /// Parses the JSON number using its [`FromStr`] implementation
    ///
    /// The outer `Result` reports errors of the document, the inner one errors of the
    /// conversion.
    ///
    /// # Examples
    /// ```
    /// # use jsonspan::document::*;
    /// let mut document = JsonDocument::from("300");
    /// assert_eq!(300_u16, document.parse_number()??);
    /// assert!(document.parse_number::<u8>()?.is_err());
    /// # Ok::<(), Box<dyn std::error::Error>>(())
    /// ```
    pub fn parse_number<T: FromStr>(&mut self) -> Result<Result<T, T::Err>, DocumentError> {
        let result = self.scalar_span("parse_number", Kind::Number);
        let (head, tail) = self.record(result)?;
        Ok(T::from_str(&self.number_text(head, tail)))
    }

    /// Parses the JSON number as `i64`
    ///
    /// Numbers with fraction or exponent, such as `1.0` or `1e2`, are rejected.
    pub fn parse_i64(&mut self) -> Result<i64, DocumentError> {
        let result = self
            .scalar_span("parse_i64", Kind::Number)
            .and_then(|(head, tail)| {
                let number = self.number_text(head, tail);
                i64::from_str(&number).map_err(|source| DocumentError::InvalidInteger {
                    number: number.into_owned(),
                    source,
                })
            });
        self.record(result)
    }

    /// Parses the JSON number as `f64`
    ///
    /// Numbers whose magnitude exceeds `f64::MAX`, such as `1e400`, are rejected instead of
    /// becoming infinity.
    pub fn parse_f64(&mut self) -> Result<f64, DocumentError> {
        let result = self
            .scalar_span("parse_f64", Kind::Number)
            .and_then(|(head, tail)| {
                let number = self.number_text(head, tail);
                match f64::from_str(&number) {
                    Ok(value) if value.is_finite() => Ok(value),
                    Ok(_) => Err(DocumentError::FloatOutOfRange {
                        number: number.into_owned(),
                    }),
                    Err(source) => Err(DocumentError::InvalidFloat {
                        number: number.into_owned(),
                        source,
                    }),
                }
            });
        self.record(result)
    }

    fn string_content(&mut self, method: &'static str) -> Result<Cow<'_, str>, DocumentError> {
        let result = self.scalar_span(method, Kind::String);
        let (head, tail) = self.record(result)?;
        Ok(unescape(&self.data[head + 1..tail - 1]))
    }

    /// Decodes the JSON string, borrowing from the buffer if it contains no escape sequences
    ///
    /// Escaped unpaired surrogates and malformed UTF-8 data are replaced with U+FFFD.
    pub fn parse_str(&mut self) -> Result<Cow<'_, str>, DocumentError> {
        self.string_content("parse_str")
    }

    /// Decodes the JSON string, see [`parse_str`](Self::parse_str)
    pub fn parse_string(&mut self) -> Result<String, DocumentError> {
        self.string_content("parse_string").map(Cow::into_owned)
    }

    /// Decodes the JSON boolean
    pub fn parse_bool(&mut self) -> Result<bool, DocumentError> {
        let result = self.scalar_span("parse_bool", Kind::Bool);
        let (head, _) = self.record(result)?;
        Ok(self.data[head] == b't')
    }

    /// Whether the value is predicted to be JSON null
    ///
    /// Like [`kind`](Self::kind) this only looks at the first byte of the value.
    pub fn is_null(&self) -> bool {
        self.kind() == Kind::Null
    }

    fn into_value(mut self) -> Result<Value, DocumentError> {
        let value = match self.kind() {
            Kind::Object => {
                let mut members = Vec::new();
                for member in self.object()? {
                    let (name, value) = member?;
                    members.push((name, value.into_value()?));
                }
                Value::Object(members)
            }
            Kind::Array => Value::Array(
                self.array()?
                    .map(|item| item.and_then(|(_, value)| value.into_value()))
                    .collect::<Result<_, _>>()?,
            ),
            Kind::Number => Value::Number(self.text_str()?.into_owned()),
            Kind::String => Value::String(self.parse_string()?),
            Kind::Bool => Value::Bool(self.parse_bool()?),
            Kind::Null => Value::Null,
            Kind::Invalid => {
                let offset = self.value_start();
                return Err(JsonSyntaxError::new(Kind::Invalid, offset, &self.data).into());
            }
        };
        Ok(value)
    }

    /// Validates the value and converts it into a [`Value`] tree
    ///
    /// Unlike all other methods this copies the complete value. Duplicate member names of
    /// objects are preserved in their original order.
    pub fn to_value(&mut self) -> Result<Value, DocumentError> {
        let result = self
            .resolve(true)
            .and_then(|(_, head, tail)| self.child(head, tail, true).into_value());
        self.record(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::json_path;

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn syntax_error(kind: Kind, offset: usize, json: &str) -> DocumentError {
        JsonSyntaxError::new(kind, offset, json.as_bytes()).into()
    }

    #[test]
    fn syntax_error_context() {
        let data = b"0123456789abcdef";
        assert_eq!("56789abcde", JsonSyntaxError::new(Kind::Number, 10, data).context);
        assert_eq!("01234", JsonSyntaxError::new(Kind::Number, 0, data).context);
        assert_eq!("bcdef", JsonSyntaxError::new(Kind::Number, 16, data).context);
        assert_eq!("", JsonSyntaxError::new(Kind::Number, 0, b"").context);

        let error = JsonSyntaxError::new(Kind::Number, 5, b"1.23e");
        assert_eq!(
            "JSON syntax error when parsing Number at offset 5, context near: |1.23e|",
            error.to_string()
        );
    }

    #[test]
    fn kind_and_peek() {
        let mut document = JsonDocument::from("  [1]");
        assert_eq!(Kind::Array, document.kind());
        assert_eq!(None, document.span());
        assert_eq!(Kind::Array, document.peek());
        assert_eq!(2, document.offset);

        assert_eq!(Kind::Invalid, JsonDocument::from("").kind());
        assert_eq!(Kind::Invalid, JsonDocument::from("  x").kind());
        assert!(JsonDocument::from(" null").is_null());
    }

    #[test]
    fn text_is_lazy() -> TestResult {
        let mut document = JsonDocument::from(" \"a\\\"b\"  ");
        assert_eq!(None, document.span());
        assert_eq!(br#""a\"b""#, document.text()?);
        assert_eq!(Some(1..7), document.span());
        assert_eq!(false, document.validated);
        assert_eq!(r#""a\"b""#, document.text_str()?);
        Ok(())
    }

    #[test]
    fn check_valid() -> TestResult {
        JsonDocument::from(" {\"a\": [1, 2.5, \"x\", true, null]} \n").check_valid()?;

        let json = "[1, 01]";
        let mut document = JsonDocument::from(json);
        let expected = syntax_error(Kind::Number, 5, json);
        assert_eq!(Err(expected.clone()), document.check_valid());
        assert_eq!(Some(&expected), document.error());
        Ok(())
    }

    #[test]
    fn check_valid_trailing_data() -> TestResult {
        let json = "[1] [2]";
        assert_eq!(
            Err(syntax_error(Kind::Invalid, 4, json)),
            JsonDocument::from(json).check_valid()
        );

        let mut document = JsonDocument::new_custom(
            json.as_bytes(),
            DocumentSettings {
                allow_trailing_data: true,
                ..Default::default()
            },
        );
        document.check_valid()?;
        assert_eq!(b"[1]", document.text()?);
        Ok(())
    }

    #[test]
    fn check_valid_revalidates_skipped_value() -> TestResult {
        let mut document = JsonDocument::from("[1, 01]");
        assert_eq!(b"[1, 01]", document.text()?);
        assert!(document.check_valid().is_err());
        Ok(())
    }

    #[test]
    fn max_nesting_depth() -> TestResult {
        let json = "[[[[]]]]";
        let settings = |max_nesting_depth| DocumentSettings {
            max_nesting_depth,
            ..Default::default()
        };

        JsonDocument::new_custom(json.as_bytes(), settings(Some(4))).check_valid()?;
        JsonDocument::new_custom(json.as_bytes(), settings(None)).check_valid()?;
        assert_eq!(
            Err(DocumentError::MaxNestingDepthExceeded {
                max_nesting_depth: 3,
                offset: 3
            }),
            JsonDocument::new_custom(json.as_bytes(), settings(Some(3))).check_valid()
        );

        let deep = "[".repeat(1000) + &"]".repeat(1000);
        assert!(matches!(
            JsonDocument::from(deep.as_str()).check_valid(),
            Err(DocumentError::MaxNestingDepthExceeded { .. })
        ));
        // Skipping is not limited
        assert_eq!(2000, JsonDocument::from(deep).text()?.len());
        Ok(())
    }

    #[test]
    fn object_index() -> TestResult {
        let mut document = JsonDocument::from(r#"{"k1":"v1","k2":true}"#);
        document.object_index("k2")?;
        assert_eq!(Kind::Bool, document.kind());
        assert_eq!(b"true", document.text()?);
        assert_eq!(Some(16..20), document.span());
        assert_eq!(true, document.parse_bool()?);
        Ok(())
    }

    #[test]
    fn object_index_missing() -> TestResult {
        let mut document = JsonDocument::from(r#"{"k1":"v1","k2":true}"#);
        let expected = DocumentError::MissingObjectMember {
            member_name: "missing".to_owned(),
        };
        assert_eq!(Err(expected.clone()), document.object_index("missing"));
        assert_eq!(Some(&expected), document.error());
        assert_eq!(Kind::Object, document.kind());
        assert_eq!(None, document.span());

        // Handle is still usable
        document.object_index("k1")?;
        assert_eq!("v1", document.parse_string()?);
        Ok(())
    }

    #[test]
    fn object_index_escaped_and_duplicate_names() -> TestResult {
        let mut document = JsonDocument::from(r#"{"k\u0065y": 1, "key": 2}"#);
        document.object_index("key")?;
        assert_eq!(1, document.parse_i64()?);
        Ok(())
    }

    #[test]
    fn object_index_skips_without_validating() -> TestResult {
        // Skipped values are not validated, the target value is
        let mut document = JsonDocument::from(r#"{"a": [01, tru], "b": 1}"#);
        document.object_index("b")?;
        assert_eq!(1, document.parse_i64()?);

        let json = r#"{"a": [01, tru], "b": 1}"#;
        let mut document = JsonDocument::from(json);
        assert_eq!(
            Err(syntax_error(Kind::Number, 8, json)),
            document.object_index("a")
        );
        Ok(())
    }

    #[test]
    fn object_index_unexpected_kind() {
        let mut document = JsonDocument::from("[1]");
        assert_eq!(
            Err(DocumentError::UnexpectedKind {
                method: "object_index",
                expected: Kind::Object,
                actual: Kind::Array
            }),
            document.object_index("a")
        );
    }

    #[test]
    fn index() -> TestResult {
        let mut document = JsonDocument::from("[1, [2, 3], \"x\"]");
        document.index(1)?;
        assert_eq!(b"[2, 3]", document.text()?);
        document.index(1)?;
        assert_eq!(3, document.parse_i64()?);

        let mut document = JsonDocument::from("[1, 2]");
        assert_eq!(
            Err(DocumentError::IndexOutOfRange { index: 2 }),
            document.index(2)
        );
        assert_eq!(
            Err(DocumentError::IndexOutOfRange { index: 0 }),
            JsonDocument::from("[]").index(0)
        );
        assert_eq!(
            Err(DocumentError::UnexpectedKind {
                method: "index",
                expected: Kind::Array,
                actual: Kind::String
            }),
            JsonDocument::from("\"a\"").index(0)
        );
        Ok(())
    }

    #[test]
    fn path() -> TestResult {
        let json = r#"{"a": [{"b": 1}, {"b": [true, false]}], "c": null}"#;
        let mut document = JsonDocument::from(json);
        document.path(&json_path!["a", 1, "b", 1])?;
        assert_eq!(false, document.parse_bool()?);

        let mut document = JsonDocument::from(json);
        document.path(&json_path!["c"])?;
        assert!(document.is_null());

        // Empty path validates the current value
        let mut document = JsonDocument::from(" [1] ");
        document.path(&[])?;
        assert_eq!(Some(1..4), document.span());
        Ok(())
    }

    #[test]
    fn path_is_atomic() -> TestResult {
        let json = r#"{"a": [{"b": 1}], "c": "x"}"#;
        let mut document = JsonDocument::from(json);

        let expected = DocumentError::PathTypeMismatch {
            piece: JsonPathPiece::ArrayItem(0),
            actual: Kind::Object,
        };
        assert_eq!(Err(expected), document.path(&json_path!["a", 0, 0]));
        assert_eq!(Kind::Object, document.kind());
        assert_eq!(None, document.span());

        assert_eq!(
            Err(DocumentError::IndexOutOfRange { index: 1 }),
            document.path(&json_path!["a", 1])
        );
        assert_eq!(
            Err(DocumentError::PathTypeMismatch {
                piece: JsonPathPiece::ObjectMember("b".to_owned()),
                actual: Kind::String,
            }),
            document.path(&json_path!["c", "b"])
        );

        document.path(&json_path!["a", 0, "b"])?;
        assert_eq!(1, document.parse_i64()?);
        Ok(())
    }

    #[test]
    fn path_idempotent() -> TestResult {
        let json = r#"[{"x": [0, {"y": "z"}]}]"#;
        let mut first = JsonDocument::from(json);
        let mut second = JsonDocument::from(json);
        first.path(&json_path![0, "x", 1, "y"])?;
        second.path(&json_path![0, "x", 1, "y"])?;
        assert_eq!(first.span(), second.span());
        assert!(first.span().is_some());
        Ok(())
    }

    #[test]
    fn get() -> TestResult {
        let document = JsonDocument::from(r#"{"a": {"b": [10, 20]}}"#);
        let mut value = document.get(&json_path!["a", "b", 1])?;
        assert_eq!(20, value.parse_i64()?);
        // Navigating the child does not escape its window
        assert!(matches!(
            value.get(&json_path![0]),
            Err(DocumentError::PathTypeMismatch { .. })
        ));

        assert_eq!(None, document.span());
        assert_eq!(None, document.error());
        assert!(document.get(&json_path!["x"]).is_err());
        assert_eq!(None, document.error());
        Ok(())
    }

    #[test]
    fn parse_numbers() -> TestResult {
        let mut document = JsonDocument::from("[-12, 2.5e1, 1e2, 99999999999999999999]");

        assert_eq!(-12, document.get(&json_path![0])?.parse_i64()?);
        assert_eq!(25.0, document.get(&json_path![1])?.parse_f64()?);
        assert_eq!(-12.0, document.get(&json_path![0])?.parse_f64()?);

        let result = document.get(&json_path![2])?.parse_i64();
        assert!(
            matches!(&result, Err(DocumentError::InvalidInteger { number, .. }) if number == "1e2"),
            "unexpected result: {result:?}"
        );
        assert!(matches!(
            document.get(&json_path![3])?.parse_i64(),
            Err(DocumentError::InvalidInteger { .. })
        ));
        assert_eq!(
            Ok(99999999999999999999_u128),
            document.get(&json_path![3])?.parse_number()?
        );

        assert_eq!(
            Err(DocumentError::UnexpectedKind {
                method: "parse_i64",
                expected: Kind::Number,
                actual: Kind::Array
            }),
            document.parse_i64()
        );
        Ok(())
    }

    #[test]
    fn parse_f64_out_of_range() -> TestResult {
        let mut document = JsonDocument::from("[1e400, -1e400, 1e-400, 1.7976931348623157e308]");

        for (index, number) in [(0, "1e400"), (1, "-1e400")] {
            let mut value = document.get(&json_path![index])?;
            assert_eq!(
                Err(DocumentError::FloatOutOfRange {
                    number: number.to_owned()
                }),
                value.parse_f64()
            );
            assert!(matches!(
                value.error(),
                Some(DocumentError::FloatOutOfRange { .. })
            ));
        }
        // Underflow rounds to zero
        assert_eq!(0.0, document.get(&json_path![2])?.parse_f64()?);
        assert_eq!(f64::MAX, document.get(&json_path![3])?.parse_f64()?);
        Ok(())
    }

    #[test]
    fn scans_stay_inside_window() -> TestResult {
        let document = JsonDocument::from(r#"{"a": [1, {"b": true}] , "c": nul}"#);

        let mut a = document.get(&json_path!["a"])?;
        // Malformed data behind the value is outside of its window
        a.check_valid()?;
        assert_eq!(Kind::Array, a.peek());
        assert_eq!(Some(6..22), a.span());

        let mut b = a.get(&json_path![1, "b"])?;
        assert_eq!(true, b.parse_bool()?);
        b.check_valid()?;

        a.reset();
        assert_eq!(Kind::Object, a.peek());
        assert!(a.check_valid().is_err());
        Ok(())
    }

    #[test]
    fn parse_strings() -> TestResult {
        let mut document = JsonDocument::from(r#"["plain", "a\nbé😀", "\uD800"]"#);

        let mut plain = document.get(&json_path![0])?;
        assert!(matches!(plain.parse_str()?, Cow::Borrowed("plain")));
        assert_eq!("a\nb\u{E9}\u{1F600}", document.get(&json_path![1])?.parse_string()?);
        assert_eq!("\u{FFFD}", document.get(&json_path![2])?.parse_string()?);

        assert_eq!(
            Err(DocumentError::UnexpectedKind {
                method: "parse_string",
                expected: Kind::String,
                actual: Kind::Array
            }),
            document.parse_string()
        );
        Ok(())
    }

    #[test]
    fn leaf_decoders_validate_skipped_values() -> TestResult {
        let json = "[01, tru, \"a\u{1}\"]";
        let mut iter = JsonDocument::from(json).unsafe_array()?;

        assert!(iter.next_item()?);
        let mut value = iter.value().ok_or("missing value")?;
        assert_eq!(Err(syntax_error(Kind::Number, 2, json)), value.parse_i64());
        assert!(iter.next_item()?);
        let mut value = iter.value().ok_or("missing value")?;
        assert_eq!(Err(syntax_error(Kind::Bool, 5, json)), value.parse_bool());
        assert!(iter.next_item()?);
        let mut value = iter.value().ok_or("missing value")?;
        assert_eq!(Err(syntax_error(Kind::String, 12, json)), value.parse_string());
        Ok(())
    }

    #[test]
    fn to_value() -> TestResult {
        let mut document = JsonDocument::from(r#"{"a": [1, "x", true, null], "a": {}}"#);
        let value = document.to_value()?;
        assert_eq!(
            Value::Object(vec![
                (
                    "a".to_owned(),
                    Value::Array(vec![
                        Value::Number("1".to_owned()),
                        Value::String("x".to_owned()),
                        Value::Bool(true),
                        Value::Null,
                    ])
                ),
                ("a".to_owned(), Value::Object(Vec::new())),
            ]),
            value
        );

        assert!(JsonDocument::from("[1, 2").to_value().is_err());
        assert!(JsonDocument::from("").to_value().is_err());
        Ok(())
    }

    #[test]
    fn reset() -> TestResult {
        let mut document = JsonDocument::from("[1, 2]");
        document.index(1)?;
        assert_eq!(Kind::Number, document.kind());
        let _ = document.index(0);
        assert!(document.error().is_some());

        document.reset();
        assert_eq!(Kind::Array, document.kind());
        assert_eq!(None, document.span());
        assert_eq!(None, document.error());
        Ok(())
    }

    #[test]
    fn shared_buffer() -> TestResult {
        let document = JsonDocument::from("[1, 2]");
        let child = document.get(&json_path![1])?;
        assert!(Arc::ptr_eq(&document.data, &child.data));

        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<JsonDocument>();
        assert_send_sync::<ObjectIter>();
        assert_send_sync::<ArrayIter>();
        Ok(())
    }
}
