//! The contract between the mention input and the rich-text document engine.
//!
//! The engine owns the live document. The mention input only ever asks it
//! for the cursor and caret bounds, and mutates it through
//! [`DocumentEngine::delete_range`] and [`DocumentEngine::insert_text`].

use std::collections::BTreeMap;

pub mod markup;
pub mod memory_document;

pub use memory_document::MemoryDocument;

/// Attribute key marking a run of text as a mention token.
pub const ATTR_MENTION: &str = "mention";
/// Attribute key holding the id of the mentioned entity.
pub const ATTR_ENTITY_ID: &str = "entityId";
/// Attribute key for bold styling.
pub const ATTR_BOLD: &str = "bold";
/// Attribute key for the text color.
pub const ATTR_COLOR: &str = "color";

/// The value of a single text attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttrValue {
    Bool(bool),
    Text(String),
    /// Explicitly clears the attribute, so it is neither applied nor inherited.
    Null,
}

impl AttrValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttrValue::Text(t) => Some(t),
            _ => None,
        }
    }
}

impl From<bool> for AttrValue {
    fn from(value: bool) -> Self {
        AttrValue::Bool(value)
    }
}

impl From<&str> for AttrValue {
    fn from(value: &str) -> Self {
        AttrValue::Text(value.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(value: String) -> Self {
        AttrValue::Text(value)
    }
}

/// An ordered set of text attributes.
pub type Attributes = BTreeMap<String, AttrValue>;

/// Returns `true` if the given attributes mark a mention token.
pub fn is_mention(attributes: &Attributes) -> bool {
    attributes.get(ATTR_MENTION).and_then(AttrValue::as_bool) == Some(true)
}

/// The on-screen bounds of the caret at a given document offset.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub top: f64,
    pub left: f64,
    pub height: f64,
}

/// Operations that the mention input needs from a rich-text document engine.
///
/// All offsets count `char`s of the document's plain text.
pub trait DocumentEngine {
    /// Returns the current cursor offset, or `None` if the document has no selection
    /// (e.g., because it lost focus).
    fn cursor_position(&self) -> Option<usize>;

    /// Returns the caret bounds at the given offset, if that offset can be laid out.
    fn bounds_at(&self, offset: usize) -> Option<Bounds>;

    /// Deletes `len` chars starting at `start`.
    fn delete_range(&mut self, start: usize, len: usize);

    /// Inserts `text` at `position`, carrying exactly the given attributes.
    fn insert_text(&mut self, position: usize, text: &str, attributes: &Attributes);

    /// Serializes the whole document to its HTML-like content format.
    ///
    /// This is the payload of the engine's content-changed event.
    fn serialize(&self) -> String;
}
