//! Iterators over the direct children of JSON arrays and objects

use std::{borrow::Cow, iter::FusedIterator};

use super::{DocumentError, JsonDocument};
use crate::{
    scanner::{Container, ContainerWalker, WalkEvent},
    unescape::unescape,
};

/// Position of an iterator inside the container
#[derive(Clone, Debug)]
struct Walk {
    walker: ContainerWalker,
    position: usize,
    exhausted: bool,
}

impl Walk {
    fn new(container: Container, view: &JsonDocument) -> Self {
        Walk {
            walker: ContainerWalker::new(container),
            position: view.head,
            exhausted: false,
        }
    }

    /// Advances to the next value, returning the range of the preceding member name (without
    /// quotes) if any, and the range of the value
    ///
    /// Returns `None` once the end of the container has been reached. Values are only skipped;
    /// whether they are well-formed is checked by the handles created for them.
    #[allow(clippy::type_complexity)]
    fn next(
        &mut self,
        view: &JsonDocument,
    ) -> Result<Option<(Option<(usize, usize)>, (usize, usize))>, DocumentError> {
        if self.exhausted {
            return Ok(None);
        }

        let mut cursor = view.cursor(self.position, view.window_end);
        let mut name = None;
        loop {
            let event = match self.walker.step(&mut cursor) {
                Ok(event) => event,
                Err(e) => {
                    self.exhausted = true;
                    let e = view.convert(e);
                    log::debug!("iteration failed: {e}");
                    return Err(e);
                }
            };

            match event {
                WalkEvent::Name { start, end } => name = Some((start + 1, end - 1)),
                WalkEvent::ValueStart => {
                    let (_, end) = match cursor.unsafe_value_end() {
                        Ok(v) => v,
                        Err(e) => {
                            self.exhausted = true;
                            let e = view.convert(e);
                            log::debug!("iteration failed: {e}");
                            return Err(e);
                        }
                    };
                    self.position = end;
                    return Ok(Some((name, (cursor.offset, end))));
                }
                WalkEvent::Close { end } => {
                    log::trace!("reached end of container at offset {end}");
                    self.position = end;
                    self.exhausted = true;
                    return Ok(None);
                }
            }
        }
    }
}

/// Iterator over the members of a JSON object
///
/// Obtained from [`JsonDocument::object`] or [`JsonDocument::unsafe_object`]. The iterator can
/// either be advanced manually with [`next_member`](Self::next_member), or be used as regular
/// [`Iterator`] which yields the member name and a handle to the member value.
///
/// After the end of the object has been reached, [`reset`](Self::reset) starts again at the
/// first member.
///
/// # Examples
/// ```
/// # use jsonspan::document::*;
/// let mut document = JsonDocument::from(r#"{"a": 1, "b": [2]}"#);
/// let mut iter = document.object()?;
///
/// while iter.next_member()? {
///     println!("{:?}: {:?}", iter.key(), iter.value().map(|v| v.kind()));
/// }
/// assert_eq!(2, iter.len()?);
/// assert_eq!(["a", "b"], iter.keys()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ObjectIter {
    view: JsonDocument,
    walk: Walk,
    /// Name of the current member, without quotes and not unescaped yet
    key: Option<(usize, usize)>,
    value: Option<(usize, usize)>,
    len: Option<usize>,
    keys: Option<Vec<String>>,
}

impl ObjectIter {
    pub(super) fn new(view: JsonDocument) -> Self {
        ObjectIter {
            walk: Walk::new(Container::Object, &view),
            view,
            key: None,
            value: None,
            len: None,
            keys: None,
        }
    }

    /// Advances to the next member
    ///
    /// Returns `false` if the end of the object has been reached. Once that happened, this
    /// method keeps returning `false` until [`reset`](Self::reset) is called. The name and value
    /// of the last member stay available.
    pub fn next_member(&mut self) -> Result<bool, DocumentError> {
        match self.walk.next(&self.view)? {
            Some((key, value)) => {
                self.key = key;
                self.value = Some(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Gets the name of the current member, with escape sequences resolved
    ///
    /// Returns `None` before the first call to [`next_member`](Self::next_member).
    pub fn key(&self) -> Option<Cow<'_, str>> {
        self.key
            .map(|(start, end)| unescape(&self.view.data[start..end]))
    }

    /// Gets a handle for the value of the current member
    ///
    /// Returns `None` before the first call to [`next_member`](Self::next_member).
    pub fn value(&self) -> Option<JsonDocument> {
        self.value
            .map(|(head, tail)| self.view.child(head, tail, self.view.validated))
    }

    /// Starts iterating from the first member again
    pub fn reset(&mut self) {
        self.walk = Walk::new(Container::Object, &self.view);
        self.key = None;
        self.value = None;
    }

    /// Iterates over all members once to collect the member names
    fn collect_keys(&mut self) -> Result<Vec<String>, DocumentError> {
        self.reset();
        let mut keys = Vec::new();
        while self.next_member()? {
            if let Some(key) = self.key() {
                keys.push(key.into_owned());
            }
        }
        self.reset();
        Ok(keys)
    }

    /// Gets the number of members
    ///
    /// The result is cached. Computing it iterates over all members and afterwards
    /// [resets](Self::reset) the iterator.
    #[allow(clippy::len_without_is_empty)] // is_empty exists, but takes `&mut self`
    pub fn len(&mut self) -> Result<usize, DocumentError> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        self.reset();
        let mut len = 0;
        while self.next_member()? {
            len += 1;
        }
        self.reset();
        self.len = Some(len);
        Ok(len)
    }

    /// Whether the object has no members, see [`len`](Self::len)
    pub fn is_empty(&mut self) -> Result<bool, DocumentError> {
        self.len().map(|len| len == 0)
    }

    /// Gets the member names in the order in which they appear in the object
    ///
    /// The result is cached. Computing it iterates over all members and afterwards
    /// [resets](Self::reset) the iterator. Duplicate names are included multiple times.
    pub fn keys(&mut self) -> Result<&[String], DocumentError> {
        if self.keys.is_none() {
            let keys = self.collect_keys()?;
            self.len = Some(keys.len());
            self.keys = Some(keys);
        }
        Ok(self.keys.as_deref().unwrap_or_default())
    }

    /// Whether the object has a member with the given name, see [`keys`](Self::keys)
    pub fn has_key(&mut self, key: &str) -> Result<bool, DocumentError> {
        Ok(self.keys()?.iter().any(|k| k == key))
    }
}

impl Iterator for ObjectIter {
    type Item = Result<(String, JsonDocument), DocumentError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_member() {
            Ok(true) => {
                let key = self.key().map(Cow::into_owned).unwrap_or_default();
                self.value().map(|value| Ok((key, value)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for ObjectIter {}

/// Iterator over the items of a JSON array
///
/// Obtained from [`JsonDocument::array`] or [`JsonDocument::unsafe_array`]. The iterator can
/// either be advanced manually with [`next_item`](Self::next_item), or be used as regular
/// [`Iterator`] which yields the item index and a handle to the item.
///
/// # Examples
/// ```
/// # use jsonspan::document::*;
/// let mut document = JsonDocument::from("[1, 2, 3, 4, 5]");
/// let mut iter = document.array()?;
///
/// while iter.next_item()? {}
/// assert_eq!(Some(4), iter.index());
/// assert_eq!(5, iter.len()?);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Clone, Debug)]
pub struct ArrayIter {
    view: JsonDocument,
    walk: Walk,
    index: Option<usize>,
    value: Option<(usize, usize)>,
    len: Option<usize>,
}

impl ArrayIter {
    pub(super) fn new(view: JsonDocument) -> Self {
        ArrayIter {
            walk: Walk::new(Container::Array, &view),
            view,
            index: None,
            value: None,
            len: None,
        }
    }

    /// Advances to the next item
    ///
    /// Returns `false` if the end of the array has been reached. Once that happened, this
    /// method keeps returning `false` until [`reset`](Self::reset) is called. The index and
    /// value of the last item stay available.
    pub fn next_item(&mut self) -> Result<bool, DocumentError> {
        match self.walk.next(&self.view)? {
            Some((_, value)) => {
                self.index = Some(self.index.map_or(0, |i| i + 1));
                self.value = Some(value);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Gets the index (starting at 0) of the current item
    ///
    /// Returns `None` before the first call to [`next_item`](Self::next_item).
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// Gets a handle for the current item
    ///
    /// Returns `None` before the first call to [`next_item`](Self::next_item).
    pub fn value(&self) -> Option<JsonDocument> {
        self.value
            .map(|(head, tail)| self.view.child(head, tail, self.view.validated))
    }

    /// Starts iterating from the first item again
    pub fn reset(&mut self) {
        self.walk = Walk::new(Container::Array, &self.view);
        self.index = None;
        self.value = None;
    }

    /// Gets the number of items
    ///
    /// The result is cached. Computing it iterates over all items and afterwards
    /// [resets](Self::reset) the iterator.
    #[allow(clippy::len_without_is_empty)] // is_empty exists, but takes `&mut self`
    pub fn len(&mut self) -> Result<usize, DocumentError> {
        if let Some(len) = self.len {
            return Ok(len);
        }
        self.reset();
        let mut len = 0;
        while self.next_item()? {
            len += 1;
        }
        self.reset();
        self.len = Some(len);
        Ok(len)
    }

    /// Whether the array has no items, see [`len`](Self::len)
    pub fn is_empty(&mut self) -> Result<bool, DocumentError> {
        self.len().map(|len| len == 0)
    }
}

impl Iterator for ArrayIter {
    type Item = Result<(usize, JsonDocument), DocumentError>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.next_item() {
            Ok(true) => {
                let index = self.index.unwrap_or_default();
                self.value().map(|value| Ok((index, value)))
            }
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

impl FusedIterator for ArrayIter {}
