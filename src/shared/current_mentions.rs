//! A read-only summary of the mentions in the current content.

use crate::entity_directory::{Entity, EntityDirectory};
use crate::shared::mentionable_text_input::mention_utils::{ExtractedMention, MentionOrigin};

/// The header line above the list of current mentions.
pub const CURRENT_MENTIONS_HEADER: &str = "Current mentions:";

/// Anything that can be listed as a mention.
pub trait MentionLike {
    fn mention_id(&self) -> &str;
    fn mention_name(&self) -> &str;
    /// Returns `true` if the id refers to a directory entity rather than typed text.
    fn is_tagged(&self) -> bool;
}

impl MentionLike for Entity {
    fn mention_id(&self) -> &str {
        &self.id
    }
    fn mention_name(&self) -> &str {
        &self.name
    }
    fn is_tagged(&self) -> bool {
        true
    }
}

impl MentionLike for ExtractedMention {
    fn mention_id(&self) -> &str {
        &self.id
    }
    fn mention_name(&self) -> &str {
        &self.name
    }
    fn is_tagged(&self) -> bool {
        self.origin == MentionOrigin::Tagged
    }
}

/// Lists mentions as `ID: {id} - {name}`, in the order given.
#[derive(Debug, Clone, Copy)]
pub struct CurrentMentionsView<'a, M: MentionLike> {
    mentions: &'a [M],
}

impl<'a, M: MentionLike> CurrentMentionsView<'a, M> {
    pub fn new(mentions: &'a [M]) -> Self {
        Self { mentions }
    }

    /// An empty view renders nothing at all, not even the header.
    pub fn is_empty(&self) -> bool {
        self.mentions.is_empty()
    }

    pub fn to_lines(&self) -> Vec<String> {
        if self.is_empty() {
            return Vec::new();
        }
        std::iter::once(CURRENT_MENTIONS_HEADER.to_string())
            .chain(self.mentions.iter().map(|m| format!("ID: {} - {}", m.mention_id(), m.mention_name())))
            .collect()
    }

    /// Pairs each tagged mention with the directory entity of the same id, if there is one.
    ///
    /// Freeform mentions are never resolved, since their id is just the typed text.
    pub fn resolved<'d>(&self, directory: &'d EntityDirectory) -> Vec<(&'a M, Option<&'d Entity>)> {
        self.mentions
            .iter()
            .map(|m| (m, m.is_tagged().then(|| directory.get(m.mention_id())).flatten()))
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::mentionable_text_input::mention_utils::extract_mentions;

    #[test]
    fn test_empty_renders_nothing() {
        let view = CurrentMentionsView::<Entity>::new(&[]);
        assert!(view.is_empty());
        assert!(view.to_lines().is_empty());
    }

    #[test]
    fn test_lines_for_entities_and_extracted_mentions() {
        let entities = [Entity::new("1", "John Doe"), Entity::new("2", "Jane Smith")];
        assert_eq!(
            CurrentMentionsView::new(&entities).to_lines(),
            [CURRENT_MENTIONS_HEADER, "ID: 1 - John Doe", "ID: 2 - Jane Smith"],
        );

        let extracted = [ExtractedMention { id: "Zed".into(), name: "Zed".into(), origin: MentionOrigin::Freeform }];
        assert_eq!(CurrentMentionsView::new(&extracted).to_lines(), [CURRENT_MENTIONS_HEADER, "ID: Zed - Zed"]);
    }

    #[test]
    fn test_resolved_against_directory() {
        let directory = EntityDirectory::builtin();
        let extracted = [
            ExtractedMention { id: "3".into(), name: "Bob Johnson".into(), origin: MentionOrigin::Tagged },
            ExtractedMention { id: "Zed".into(), name: "Zed".into(), origin: MentionOrigin::Freeform },
        ];
        let resolved = CurrentMentionsView::new(&extracted).resolved(&directory);
        assert_eq!(resolved[0].1.map(|e| e.name.as_str()), Some("Bob Johnson"));
        assert_eq!(resolved[1].1, None);

        // A freeform `@1` is typed text, not a reference to the entity with id "1".
        let freeform = extract_mentions("<p>ping @1</p>");
        assert_eq!(freeform[0].origin, MentionOrigin::Freeform);
        let resolved = CurrentMentionsView::new(&freeform).resolved(&directory);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].1, None);
    }
}
