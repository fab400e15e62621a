//! Key order handling
//!
//! Entries are processed as they arrive in every mode. With the streaming
//! profile requested, a key that would need lookahead (`@context` after
//! other entries, a type-scoped `@type` after properties, `@id` or a property
//! after the default `@graph`) is an error.
//!
//! Otherwise an entry whose key maps to nothing is held while a later
//! `@context` or type-scoped `@type` of the same object could still define it.
//! Held entries keep their raw events and are fed again, in source order,
//! right after the entry that changed the context. Entries still held when
//! the object closes are dropped.

use serde_json::{Map, Value};

use super::error::TextPosition;
use super::tokenizer::JsonEvent;

/// Builds a [`Value`] from events
#[derive(Debug, Default)]
pub(crate) struct CaptureBuilder {
    stack: Vec<Partial>,
}

#[derive(Debug)]
enum Partial {
    Array(Vec<Value>),
    Object(Map<String, Value>, Option<String>),
}

impl CaptureBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one event; returns the value once the outermost one is complete
    pub fn push(&mut self, event: JsonEvent) -> Option<Value> {
        let completed = match event {
            JsonEvent::StartObject => {
                self.stack.push(Partial::Object(Map::new(), None));
                return None;
            }
            JsonEvent::StartArray => {
                self.stack.push(Partial::Array(Vec::new()));
                return None;
            }
            JsonEvent::Key(key) => {
                if let Some(Partial::Object(_, pending)) = self.stack.last_mut() {
                    *pending = Some(key);
                }
                return None;
            }
            JsonEvent::EndObject => match self.stack.pop() {
                Some(Partial::Object(map, _)) => Value::Object(map),
                _ => return None,
            },
            JsonEvent::EndArray => match self.stack.pop() {
                Some(Partial::Array(items)) => Value::Array(items),
                _ => return None,
            },
            JsonEvent::Value(scalar) => Value::from(scalar),
        };
        match self.stack.last_mut() {
            None => Some(completed),
            Some(Partial::Array(items)) => {
                items.push(completed);
                None
            }
            Some(Partial::Object(map, pending)) => {
                if let Some(key) = pending.take() {
                    map.insert(key, completed);
                }
                None
            }
        }
    }
}

type Positioned = (JsonEvent, Option<TextPosition>);

/// An entry waiting for a context that may define its key
#[derive(Debug)]
pub(crate) struct HeldEntry {
    pub key: String,
    position: Option<TextPosition>,
    value: Vec<Positioned>,
}

impl HeldEntry {
    pub fn new(key: &str, position: Option<TextPosition>) -> Self {
        Self {
            key: key.to_owned(),
            position,
            value: Vec::new(),
        }
    }

    pub fn push(&mut self, event: JsonEvent, position: Option<TextPosition>) {
        self.value.push((event, position));
    }

    /// The key event followed by the value's events
    pub fn into_events(self) -> impl DoubleEndedIterator<Item = Positioned> {
        std::iter::once((JsonEvent::Key(self.key), self.position)).chain(self.value)
    }
}

/// Depth inside the value of a held entry
#[derive(Debug)]
pub(crate) struct HoldFrame {
    pub owner: usize,
    pub depth: usize,
}
