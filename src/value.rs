//! Module for the eager [`Value`] tree
//!
//! A [`Value`] is created by [`JsonDocument::to_value`](crate::document::JsonDocument::to_value).
//! Unlike a [`JsonDocument`](crate::document::JsonDocument) it owns copies of all its data, which
//! makes it convenient for small documents which are processed completely.

use duplicate::duplicate_item;

use crate::document::Kind;

/// Owned JSON value
///
/// JSON numbers are stored in their original string form so that no precision is lost;
/// [`as_i64`](Self::as_i64) and [`as_f64`](Self::as_f64) convert them on demand. Object members
/// are stored in document order, including members with duplicate names.
#[derive(PartialEq, Clone, Debug)]
pub enum Value {
    /// JSON object, as list of member name and member value
    Object(Vec<(String, Value)>),
    /// JSON array
    Array(Vec<Value>),
    /// JSON number, in its original string form
    Number(String),
    /// JSON string, with escape sequences resolved
    String(String),
    /// JSON boolean
    Bool(bool),
    /// JSON null
    Null,
}

impl Value {
    /// Gets the kind of the value
    pub fn kind(&self) -> Kind {
        match self {
            Value::Object(_) => Kind::Object,
            Value::Array(_) => Kind::Array,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Bool(_) => Kind::Bool,
            Value::Null => Kind::Null,
        }
    }

    /// Gets the value of the first member with the given name, if this is a JSON object
    pub fn get(&self, name: &str) -> Option<&Value> {
        match self {
            Value::Object(members) => members
                .iter()
                .find(|(member_name, _)| member_name == name)
                .map(|(_, value)| value),
            _ => None,
        }
    }

    /// Gets the item at the index, if this is a JSON array
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        match self {
            Value::Array(items) => items.get(index),
            _ => None,
        }
    }

    /// Gets the string, if this is a JSON string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Gets the boolean, if this is a JSON boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Parses the number as `i64`, if this is a JSON number representable as `i64`
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// Parses the number as `f64`, if this is a JSON number
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Number(n) => n.parse().ok(),
            _ => None,
        }
    }

    /// Whether this is JSON null
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

#[duplicate_item(type_template; [i8]; [i16]; [i32]; [i64]; [i128]; [isize]; [u8]; [u16]; [u32]; [u64]; [u128]; [usize])]
impl From<type_template> for Value {
    /// Creates a [`Value::Number`] from the integer
    fn from(v: type_template) -> Self {
        Value::Number(v.to_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}
