//! @mention autocomplete for rich-text editing surfaces.
//!
//! Typing the trigger character (`@` by default) opens a filtered list of
//! entities from an [`entity_directory::EntityDirectory`]; choosing one replaces
//! the typed text with an atomic mention token. The mentions in serialized
//! content can be extracted at any time, including freeform `@name` text.

pub mod app;

/// The document engine contract, an in-memory engine and content parsing.
pub mod document;
/// Mentionable entities and their directory.
pub mod entity_directory;
/// Matching entities against the typed filter text.
pub mod entity_search;
/// Keyboard input events.
pub mod key_event;
/// Scripts of key presses for replaying editing sessions.
pub mod key_script;
/// Loading directories and settings from disk.
pub mod persistence;
/// Configuration of the mention input.
pub mod settings;
/// The mention input and its presentation.
pub mod shared;

pub mod utils;

pub use shared::mentionable_text_input::mention_utils::{extract_mentions, ExtractedMention, MentionOrigin};
pub use shared::mentionable_text_input::{MentionableTextInput, Submission};
