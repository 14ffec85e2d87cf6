//! Scanner for the grammar of JSON arrays and objects

use super::{Cursor, ScanError};
use crate::document::Kind;

#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum Container {
    Object,
    Array,
}

impl Container {
    pub(crate) fn kind(self) -> Kind {
        match self {
            Container::Object => Kind::Object,
            Container::Array => Kind::Array,
        }
    }

    fn open(self) -> u8 {
        match self {
            Container::Object => b'{',
            Container::Array => b'[',
        }
    }

    fn close(self) -> u8 {
        match self {
            Container::Object => b'}',
            Container::Array => b']',
        }
    }
}

/// Which tokens are acceptable next
///
/// Several flags can be set at the same time, for example after a value either a `,` or the
/// closing bracket may follow.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
struct Expectations {
    need_start: bool,
    need_key: bool,
    need_colon: bool,
    need_comma: bool,
    need_value: bool,
    need_end: bool,
}

/// Token of interest produced by [`ContainerWalker::step`]
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub(crate) enum WalkEvent {
    /// Member name, `start..end` includes the quotes
    Name { start: usize, end: usize },
    /// The cursor is positioned at the start of a value
    ///
    /// The caller has to scan the value and move the cursor behind it before calling
    /// `step` again.
    ValueStart,
    /// The closing bracket was consumed, `end` is the offset behind it
    Close { end: usize },
}

/// Automaton recognizing the structure of a single array or object
///
/// Values are not scanned by the walker itself; this allows callers to choose for every
/// value whether it is validated or only skipped.
#[derive(Clone, Debug)]
pub(crate) struct ContainerWalker {
    container: Container,
    expect: Expectations,
}

impl ContainerWalker {
    pub(crate) fn new(container: Container) -> Self {
        ContainerWalker {
            container,
            expect: Expectations {
                need_start: true,
                ..Default::default()
            },
        }
    }

    /// Advances the cursor until the next name, value or the end of the container
    pub(crate) fn step(&mut self, cursor: &mut Cursor<'_>) -> Result<WalkEvent, ScanError> {
        let container = self.container;
        let is_object = container == Container::Object;
        let expect = &mut self.expect;

        loop {
            let b = match cursor.skip_whitespace() {
                Some(b) => b,
                None => return Err(ScanError::syntax(container.kind(), cursor.offset)),
            };

            match b {
                _ if b == container.open() && expect.need_start => {
                    cursor.offset += 1;
                    expect.need_start = false;
                    expect.need_key = is_object;
                    expect.need_value = !is_object;
                    expect.need_end = true;
                }
                b'"' if is_object && expect.need_key => {
                    let start = cursor.offset;
                    let end = cursor.string_end(true)?;
                    cursor.offset = end;
                    expect.need_key = false;
                    expect.need_end = false;
                    expect.need_colon = true;
                    return Ok(WalkEvent::Name { start, end });
                }
                b':' if expect.need_colon => {
                    cursor.offset += 1;
                    expect.need_colon = false;
                    expect.need_comma = true;
                    expect.need_end = true;
                    cursor.skip_whitespace();
                    return Ok(WalkEvent::ValueStart);
                }
                b',' if expect.need_comma => {
                    cursor.offset += 1;
                    expect.need_comma = false;
                    expect.need_end = false;
                    expect.need_key = is_object;
                    expect.need_value = !is_object;
                }
                _ if b == container.close() && expect.need_end => {
                    cursor.offset += 1;
                    *expect = Expectations::default();
                    return Ok(WalkEvent::Close { end: cursor.offset });
                }
                // Neither `[1,]` nor `[,1]` are accepted
                _ if !is_object && expect.need_value && b != b',' && b != container.close() => {
                    expect.need_value = false;
                    expect.need_comma = true;
                    expect.need_end = true;
                    return Ok(WalkEvent::ValueStart);
                }
                _ => return Err(ScanError::syntax(container.kind(), cursor.offset)),
            }
        }
    }
}

impl Cursor<'_> {
    /// Finds the end of the array or object at the current offset, validating all values
    pub(crate) fn valid_container_end(&self, container: Container) -> Result<usize, ScanError> {
        let mut cursor = *self;
        if let Some(max_nesting_depth) = cursor.max_nesting_depth {
            if cursor.depth >= max_nesting_depth {
                return Err(ScanError::NestingTooDeep {
                    max_nesting_depth,
                    offset: cursor.offset,
                });
            }
        }
        cursor.depth += 1;

        let mut walker = ContainerWalker::new(container);
        loop {
            match walker.step(&mut cursor)? {
                WalkEvent::Name { .. } => {}
                WalkEvent::ValueStart => {
                    let (_, end) = cursor.valid_value_end()?;
                    cursor.offset = end;
                }
                WalkEvent::Close { end } => return Ok(end),
            }
        }
    }

    /// Finds the end of the array or object at the current offset by counting brackets
    ///
    /// Only brackets of the same type as the container are counted, and strings are skipped
    /// so that brackets inside of them are ignored. Nothing else is checked.
    pub(crate) fn unsafe_container_end(&self, container: Container) -> Result<usize, ScanError> {
        let bytes = self.bytes;
        let open = container.open();
        let close = container.close();
        debug_assert_eq!(Some(&open), bytes.get(self.offset));

        let mut depth = 0_usize;
        let mut i = self.offset;
        while let Some(&b) = bytes.get(i) {
            if b == b'"' {
                i = Cursor { offset: i, ..*self }.string_end(false)?;
                continue;
            }
            if b == open {
                depth += 1;
            } else if b == close {
                if depth <= 1 {
                    return Ok(i + 1);
                }
                depth -= 1;
            }
            i += 1;
        }

        Err(ScanError::syntax(container.kind(), bytes.len()))
    }
}
