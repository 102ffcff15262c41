//! A self-contained, in-memory rich-text document.
//!
//! This engine backs the demo binary and the end-to-end tests. It mirrors the
//! behavior of a browser rich-text editor closely enough for mention handling:
//! text is stored as attributed runs, typed text inherits the attributes of the
//! character before the cursor, and the document serializes to `<p>`-delimited
//! HTML-like content.

use std::fmt::Write as _;

use crate::key_event::{Key, KeyEvent};
use crate::utils;
use super::{is_mention, AttrValue, Attributes, Bounds, DocumentEngine, ATTR_BOLD, ATTR_COLOR, ATTR_ENTITY_ID, ATTR_MENTION};

/// Attributes that belong to a mention token and are never carried over to typed text.
const TOKEN_ATTRIBUTES: &[&str] = &[ATTR_MENTION, ATTR_ENTITY_ID, ATTR_COLOR];

/// A contiguous stretch of text sharing the same attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub text: String,
    pub attributes: Attributes,
    /// The insertion this run came from. Pieces of one mention token share it.
    insertion: u64,
}

impl Run {
    fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Fixed glyph metrics used to lay out caret bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutMetrics {
    pub char_width: f64,
    pub line_height: f64,
}

impl Default for LayoutMetrics {
    fn default() -> Self {
        Self { char_width: 8.0, line_height: 20.0 }
    }
}

/// An in-memory [`DocumentEngine`].
#[derive(Debug, Clone)]
pub struct MemoryDocument {
    runs: Vec<Run>,
    /// `None` means the document has no selection, i.e., it is not focused.
    cursor: Option<usize>,
    metrics: LayoutMetrics,
    next_insertion: u64,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates an empty, focused document.
    pub fn new() -> Self {
        Self {
            runs: Vec::new(),
            cursor: Some(0),
            metrics: LayoutMetrics::default(),
            next_insertion: 0,
        }
    }

    /// Creates a focused document holding unstyled `text`, with the cursor at its end.
    pub fn from_text(text: &str) -> Self {
        let mut doc = Self::new();
        if !text.is_empty() {
            doc.runs.push(Run { text: text.to_string(), attributes: Attributes::new(), insertion: 0 });
        }
        doc.cursor = Some(doc.char_len());
        doc
    }

    /// Returns the plain text of the whole document.
    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    /// Moves the cursor, clamping it to the document. `None` blurs the document.
    pub fn set_cursor(&mut self, cursor: Option<usize>) {
        let len = self.char_len();
        self.cursor = cursor.map(|c| c.min(len));
    }

    pub fn blur(&mut self) {
        self.cursor = None;
    }

    /// Returns the attributes of the character at `offset`.
    pub fn attributes_at(&self, offset: usize) -> Option<&Attributes> {
        let mut start = 0;
        for run in &self.runs {
            let len = run.char_len();
            if offset < start + len {
                return Some(&run.attributes);
            }
            start += len;
        }
        None
    }

    /// Applies the engine's own handling of a key press, as a browser editor would
    /// after the mention input has seen (and not suppressed) the event.
    ///
    /// Returns `true` if the document content changed.
    pub fn apply_default_key(&mut self, event: &KeyEvent) -> bool {
        let Some(cursor) = self.cursor else {
            return false;
        };
        if let Some(c) = event.printable_char() {
            let mut buf = [0u8; 4];
            self.type_text(c.encode_utf8(&mut buf));
            return true;
        }
        match event.key {
            Key::Backspace if cursor > 0 => {
                let text = self.text();
                let before = utils::safe_substring_by_char_indices(&text, 0, cursor);
                let removed = utils::last_grapheme_char_len(before);
                self.delete_range(cursor - removed, removed);
                true
            }
            Key::Enter => {
                self.insert_text(cursor, "\n", &Attributes::new());
                true
            }
            Key::Tab => {
                self.type_text("\t");
                true
            }
            Key::ArrowLeft => {
                self.cursor = Some(cursor.saturating_sub(1));
                false
            }
            Key::ArrowRight => {
                self.cursor = Some((cursor + 1).min(self.char_len()));
                false
            }
            _ => false,
        }
    }

    /// Types `text` at the cursor, inheriting the formatting of the preceding character
    /// within the same paragraph. Mention token attributes are not inherited.
    fn type_text(&mut self, text: &str) {
        let Some(cursor) = self.cursor else { return };
        let inherited = cursor
            .checked_sub(1)
            .and_then(|prev| {
                let ends_paragraph = self.text().chars().nth(prev) == Some('\n');
                (!ends_paragraph).then(|| self.attributes_at(prev)).flatten()
            })
            .map(|attributes| {
                attributes
                    .iter()
                    .filter(|(key, _)| !TOKEN_ATTRIBUTES.contains(&key.as_str()))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect::<Attributes>()
            })
            .unwrap_or_default();
        self.insert_text(cursor, text, &inherited);
    }

    /// Ensures a run boundary exists at `offset` and returns the index of the run starting there.
    fn split_at(&mut self, offset: usize) -> usize {
        let mut start = 0;
        for i in 0..self.runs.len() {
            let len = self.runs[i].char_len();
            if offset == start {
                return i;
            }
            if offset < start + len {
                let byte_idx = utils::char_index_to_byte_index(&self.runs[i].text, offset - start);
                let tail = self.runs[i].text.split_off(byte_idx);
                let attributes = self.runs[i].attributes.clone();
                let insertion = self.runs[i].insertion;
                self.runs.insert(i + 1, Run { text: tail, attributes, insertion });
                return i + 1;
            }
            start += len;
        }
        self.runs.len()
    }

    /// Drops empty runs and merges neighbors that carry identical attributes.
    ///
    /// Mention runs only merge with pieces of the same insertion, so adjacent
    /// tokens stay distinct.
    fn normalize(&mut self) {
        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            if run.text.is_empty() {
                continue;
            }
            match merged.last_mut() {
                Some(last)
                    if last.attributes == run.attributes
                        && (last.insertion == run.insertion || !is_mention(&run.attributes)) =>
                {
                    last.text.push_str(&run.text)
                }
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Splits the runs into paragraphs at every `'\n'`.
    fn paragraphs(&self) -> Vec<Vec<(&str, &Attributes)>> {
        let mut paragraphs = vec![Vec::new()];
        for run in &self.runs {
            let mut pieces = run.text.split('\n').peekable();
            while let Some(piece) = pieces.next() {
                if !piece.is_empty() {
                    if let Some(current) = paragraphs.last_mut() {
                        current.push((piece, &run.attributes));
                    }
                }
                if pieces.peek().is_some() {
                    paragraphs.push(Vec::new());
                }
            }
        }
        paragraphs
    }
}

impl DocumentEngine for MemoryDocument {
    fn cursor_position(&self) -> Option<usize> {
        self.cursor
    }

    fn bounds_at(&self, offset: usize) -> Option<Bounds> {
        let text = self.text();
        if offset > text.chars().count() {
            return None;
        }
        let before = utils::safe_substring_by_char_indices(&text, 0, offset);
        let line = before.matches('\n').count();
        let column = before.rsplit('\n').next().map_or(0, |l| l.chars().count());
        Some(Bounds {
            top: line as f64 * self.metrics.line_height,
            left: column as f64 * self.metrics.char_width,
            height: self.metrics.line_height,
        })
    }

    fn delete_range(&mut self, start: usize, len: usize) {
        let total = self.char_len();
        let start = start.min(total);
        let end = start.saturating_add(len).min(total);
        if start >= end {
            return;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        self.runs.drain(first..last);
        self.normalize();
        if let Some(cursor) = self.cursor {
            self.cursor = Some(if cursor >= end {
                cursor - (end - start)
            } else if cursor > start {
                start
            } else {
                cursor
            });
        }
    }

    fn insert_text(&mut self, position: usize, text: &str, attributes: &Attributes) {
        if text.is_empty() {
            return;
        }
        let position = position.min(self.char_len());
        let attributes: Attributes = attributes
            .iter()
            .filter(|(_, value)| **value != AttrValue::Null)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        self.next_insertion += 1;
        let insertion = self.next_insertion;
        let index = self.split_at(position);
        self.runs.insert(index, Run { text: text.to_string(), attributes, insertion });
        self.normalize();
        if let Some(cursor) = self.cursor {
            if cursor >= position {
                self.cursor = Some(cursor + text.chars().count());
            }
        }
    }

    fn serialize(&self) -> String {
        let mut out = String::new();
        for paragraph in self.paragraphs() {
            out.push_str("<p>");
            if paragraph.is_empty() {
                out.push_str("<br>");
            }
            for (text, attributes) in paragraph {
                write_run(&mut out, text, attributes);
            }
            out.push_str("</p>");
        }
        out
    }
}

/// Writes one attributed run of text as markup.
fn write_run(out: &mut String, text: &str, attributes: &Attributes) {
    let escaped = htmlize::escape_text(text);
    let bold = attributes.get(ATTR_BOLD).and_then(AttrValue::as_bool);
    let mut style = Vec::new();
    if let Some(color) = attributes.get(ATTR_COLOR).and_then(AttrValue::as_text) {
        style.push(format!("color: {color}"));
    }

    if is_mention(attributes) {
        match bold {
            Some(false) => style.push("font-weight: normal".to_string()),
            Some(true) => style.push("font-weight: bold".to_string()),
            None => {}
        }
        out.push_str(r#"<span data-mention="true""#);
        if let Some(id) = attributes.get(ATTR_ENTITY_ID).and_then(AttrValue::as_text) {
            let _ = write!(out, r#" data-entity-id="{}""#, htmlize::escape_attribute(id));
        }
        if !style.is_empty() {
            let _ = write!(out, r#" style="{}""#, htmlize::escape_attribute(style.join("; ")));
        }
        let _ = write!(out, ">{escaped}</span>");
        return;
    }

    let mut inner = escaped.into_owned();
    if bold == Some(true) {
        inner = format!("<strong>{inner}</strong>");
    }
    if style.is_empty() {
        out.push_str(&inner);
    } else {
        let _ = write!(out, r#"<span style="{}">{inner}</span>"#, htmlize::escape_attribute(style.join("; ")));
    }
}
