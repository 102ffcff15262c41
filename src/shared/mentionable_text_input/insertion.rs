//! Replacing a trigger span with a mention token.

use tracing::{debug, warn};

use crate::document::{AttrValue, Attributes, DocumentEngine, ATTR_BOLD, ATTR_COLOR, ATTR_ENTITY_ID, ATTR_MENTION};
use crate::entity_directory::Entity;
use crate::settings::MentionSettings;

/// Where a mention token ended up in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InsertedMention {
    /// Offset of the first char of the display name.
    pub start: usize,
    /// Length of the display name in chars.
    pub len: usize,
    /// Cursor offset right after the separator.
    pub cursor_after: usize,
}

/// The attributes carried by the display name of an inserted mention.
pub fn mention_attributes(entity: &Entity, settings: &MentionSettings) -> Attributes {
    let mut attributes = Attributes::from([
        (ATTR_MENTION.to_string(), AttrValue::Bool(true)),
        (ATTR_ENTITY_ID.to_string(), AttrValue::from(entity.id.as_str())),
        (ATTR_BOLD.to_string(), AttrValue::Bool(false)),
    ]);
    if let Some(color) = &settings.mention_color {
        attributes.insert(ATTR_COLOR.to_string(), AttrValue::from(color.as_str()));
    }
    attributes
}

/// The attributes carried by the separator after a mention.
///
/// The mention attributes are cleared explicitly so that text typed after
/// the separator is never part of the token.
pub fn separator_attributes() -> Attributes {
    Attributes::from([
        (ATTR_MENTION.to_string(), AttrValue::Null),
        (ATTR_ENTITY_ID.to_string(), AttrValue::Null),
        (ATTR_BOLD.to_string(), AttrValue::Bool(false)),
        (ATTR_COLOR.to_string(), AttrValue::Null),
    ])
}

/// Replaces the trigger span starting at `anchor_position` with a mention of `entity`.
///
/// The span covers the trigger character plus `filter_text`. After this call the
/// document holds the entity's display name (without the trigger character)
/// as a mention token, followed by the separator, with the cursor after it.
///
/// Does nothing if the document has no cursor.
pub fn insert_mention<D: DocumentEngine + ?Sized>(
    doc: &mut D,
    entity: &Entity,
    anchor_position: usize,
    filter_text: &str,
    settings: &MentionSettings,
) -> Option<InsertedMention> {
    if doc.cursor_position().is_none() {
        warn!("Cannot insert mention of {:?}: the document has no cursor.", entity.id);
        return None;
    }

    let span_len = 1 + filter_text.chars().count();
    doc.delete_range(anchor_position, span_len);

    let name_len = entity.name.chars().count();
    doc.insert_text(anchor_position, &entity.name, &mention_attributes(entity, settings));

    let mut buf = [0u8; 4];
    let separator = settings.separator.encode_utf8(&mut buf);
    doc.insert_text(anchor_position + name_len, separator, &separator_attributes());

    let inserted = InsertedMention {
        start: anchor_position,
        len: name_len,
        cursor_after: anchor_position + name_len + 1,
    };
    debug!("Inserted mention of {:?} at {inserted:?}", entity.id);
    Some(inserted)
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{is_mention, MemoryDocument};

    #[test]
    fn test_insert_replaces_trigger_span() {
        let mut doc = MemoryDocument::from_text("Hi @Jo");
        let entity = Entity::new("1", "John Doe");
        let inserted = insert_mention(&mut doc, &entity, 3, "Jo", &MentionSettings::default()).unwrap();

        assert_eq!(doc.text(), "Hi John Doe ");
        assert_eq!(inserted, InsertedMention { start: 3, len: 8, cursor_after: 12 });
        assert_eq!(doc.cursor_position(), Some(12));

        let name_attrs = doc.attributes_at(3).unwrap();
        assert!(is_mention(name_attrs));
        assert_eq!(name_attrs.get(ATTR_ENTITY_ID), Some(&AttrValue::from("1")));
        assert_eq!(name_attrs.get(ATTR_BOLD), Some(&AttrValue::Bool(false)));
        assert_eq!(name_attrs.get(ATTR_COLOR), Some(&AttrValue::from("#2563eb")));

        let separator_attrs = doc.attributes_at(11).unwrap();
        assert!(!is_mention(separator_attrs));
        assert!(!separator_attrs.contains_key(ATTR_ENTITY_ID));
    }

    #[test]
    fn test_insert_keeps_surrounding_text() {
        let mut doc = MemoryDocument::from_text("a @b c");
        doc.set_cursor(Some(4));
        insert_mention(&mut doc, &Entity::new("3", "Bob Johnson"), 2, "b", &MentionSettings::default());
        assert_eq!(doc.text(), "a Bob Johnson  c");
        assert_eq!(doc.cursor_position(), Some(14));
    }

    #[test]
    fn test_custom_separator_and_no_color() {
        let settings = MentionSettings {
            separator: '\u{a0}',
            mention_color: None,
            ..MentionSettings::default()
        };
        let mut doc = MemoryDocument::from_text("@");
        insert_mention(&mut doc, &Entity::new("2", "Jane Smith"), 0, "", &settings);
        assert_eq!(doc.text(), "Jane Smith\u{a0}");
        assert!(!doc.attributes_at(0).unwrap().contains_key(ATTR_COLOR));
    }

    #[test]
    fn test_no_cursor_is_a_no_op() {
        let mut doc = MemoryDocument::from_text("Hi @Jo");
        doc.blur();
        let before = doc.serialize();
        assert!(insert_mention(&mut doc, &Entity::new("1", "John Doe"), 3, "Jo", &MentionSettings::default()).is_none());
        assert_eq!(doc.serialize(), before);
    }
}
