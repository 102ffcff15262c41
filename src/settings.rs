//! Tunable behavior of the mention input.

use serde::{Deserialize, Serialize};

/// The default color applied to inserted mention tokens.
pub const DEFAULT_MENTION_COLOR: &str = "#2563eb";

/// Configuration for the mention input, its candidate popup and the extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentionSettings {
    /// The character that opens the mention picker.
    pub trigger: char,
    /// The character inserted right after each mention token.
    pub separator: char,
    /// The color applied to inserted mention tokens, if any.
    pub mention_color: Option<String>,
    /// The maximum number of candidates shown in the popup; `None` shows all of them.
    pub max_visible_candidates: Option<usize>,
    /// Vertical gap between the bottom of the caret and the top of the popup.
    pub popup_offset: f64,
}

impl Default for MentionSettings {
    fn default() -> Self {
        Self {
            trigger: '@',
            separator: ' ',
            mention_color: Some(DEFAULT_MENTION_COLOR.to_string()),
            max_visible_candidates: None,
            popup_offset: 10.0,
        }
    }
}
