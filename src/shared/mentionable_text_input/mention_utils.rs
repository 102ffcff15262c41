//! Utilities for finding mentions in serialized editor content.
//!
//! Mentions come in two flavors:
//! * tagged mentions, i.e. elements marked with `data-mention="true"` that carry
//!   the id of the mentioned entity (these are what the mention input inserts);
//! * freeform mentions, i.e. plain text like `@Someone` that was typed without
//!   picking a candidate. These carry no id, so their name doubles as their id.

use std::collections::HashSet;
use std::sync::LazyLock;

use indexmap::IndexMap;
use regex::Regex;
use serde::Serialize;
use tracing::warn;

use crate::document::markup::{self, Element};

/// Attributes that mark an element as a mention token. The first one present wins.
const MENTION_FLAG_ATTRIBUTES: &[&str] = &["data-mention", "mention"];
/// Attributes that hold the mentioned entity's id. The first one present wins.
const ENTITY_ID_ATTRIBUTES: &[&str] = &["data-entity-id", "entity-id", "entityid", "data-user-id"];

/// How a mention was written in the content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MentionOrigin {
    Tagged,
    Freeform,
}

/// A mention found in serialized content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedMention {
    /// The entity id, or the name itself for freeform mentions.
    pub id: String,
    pub name: String,
    pub origin: MentionOrigin,
}

/// Finds the mentions in serialized editor content.
#[derive(Debug, Clone)]
pub struct MentionExtractor {
    trigger: char,
    freeform_regex: Regex,
}

impl Default for MentionExtractor {
    fn default() -> Self {
        Self::new('@')
    }
}

impl MentionExtractor {
    pub fn new(trigger: char) -> Self {
        let pattern = format!(r"{}(\S+)", regex::escape(trigger.encode_utf8(&mut [0u8; 4])));
        Self {
            trigger,
            freeform_regex: Regex::new(&pattern).expect("an escaped trigger always forms a valid pattern"),
        }
    }

    /// Returns every distinct mention in `content`, tagged ones first.
    ///
    /// Mentions are unique by case-insensitive name; the first occurrence wins.
    /// Freeform mentions whose name matches a tagged mention are dropped.
    /// Malformed content never fails: if it cannot be parsed, only freeform
    /// mentions are looked for in its text.
    pub fn extract(&self, content: &str) -> Vec<ExtractedMention> {
        let (tagged, plain_text) = match markup::parse_markup(content) {
            Ok(nodes) => {
                let mut tagged = Vec::new();
                markup::walk_elements(&nodes, &mut |element| {
                    if !is_mention_element(element) {
                        return true;
                    }
                    if let Some(mention) = self.tagged_mention(element) {
                        tagged.push(mention);
                    }
                    // Mentions never nest.
                    false
                });
                let mut plain_text = String::new();
                markup::write_text_content(&nodes, &mut plain_text, &is_mention_element);
                (tagged, plain_text)
            }
            Err(e) => {
                warn!("Failed to parse content for mentions, looking for freeform mentions only: {e}");
                (Vec::new(), markup::strip_tags_naive(content))
            }
        };

        let tagged_names: HashSet<String> = tagged.iter().map(|m| m.name.to_lowercase()).collect();
        let freeform = self
            .freeform_regex
            .captures_iter(&plain_text)
            .filter_map(|caps| {
                let name = caps.get(1)?.as_str().trim();
                (!name.is_empty()).then(|| ExtractedMention {
                    id: name.to_string(),
                    name: name.to_string(),
                    origin: MentionOrigin::Freeform,
                })
            })
            .filter(|m| !tagged_names.contains(&m.name.to_lowercase()));

        let mut unique: IndexMap<String, ExtractedMention> = IndexMap::new();
        for mention in tagged.into_iter().chain(freeform) {
            unique.entry(mention.name.to_lowercase()).or_insert(mention);
        }
        unique.into_values().collect()
    }

    fn tagged_mention(&self, element: &Element) -> Option<ExtractedMention> {
        let text = element.text_content();
        let name = text.trim();
        // Older content kept the trigger character inside the token.
        let name = name.strip_prefix(self.trigger).unwrap_or(name).trim();
        let id = ENTITY_ID_ATTRIBUTES
            .iter()
            .find_map(|attr| element.attr(attr))
            .map(str::trim)
            .filter(|id| !id.is_empty());
        match id {
            Some(id) if !name.is_empty() => Some(ExtractedMention {
                id: id.to_string(),
                name: name.to_string(),
                origin: MentionOrigin::Tagged,
            }),
            _ => {
                warn!("Skipping mention element without an entity id or name: <{}> {name:?}", element.name);
                None
            }
        }
    }
}

/// Returns `true` if the element is flagged as a mention token.
fn is_mention_element(element: &Element) -> bool {
    MENTION_FLAG_ATTRIBUTES
        .iter()
        .find_map(|attr| element.attr(attr))
        .is_some_and(|flag| flag.trim().eq_ignore_ascii_case("true"))
}

/// Extracts mentions from `content` using the default `@` trigger.
pub fn extract_mentions(content: &str) -> Vec<ExtractedMention> {
    static DEFAULT_EXTRACTOR: LazyLock<MentionExtractor> = LazyLock::new(MentionExtractor::default);
    DEFAULT_EXTRACTOR.extract(content)
}


#[cfg(test)]
mod tests {
    use super::*;

    fn tagged(id: &str, name: &str) -> ExtractedMention {
        ExtractedMention { id: id.into(), name: name.into(), origin: MentionOrigin::Tagged }
    }

    fn freeform(name: &str) -> ExtractedMention {
        ExtractedMention { id: name.into(), name: name.into(), origin: MentionOrigin::Freeform }
    }

    #[test]
    fn test_empty_and_plain_content() {
        assert!(extract_mentions("").is_empty());
        assert!(extract_mentions("<p><br></p>").is_empty());
        assert!(extract_mentions("<p>no mentions here, mail me at @ home</p>").is_empty());
    }

    #[test]
    fn test_tagged_mentions() {
        let content = concat!(
            r#"<p>Hi <span data-mention="true" data-entity-id="1" style="color: #2563eb">John Doe</span> "#,
            r#"and <span data-mention="true" data-entity-id="2">Jane Smith</span> </p>"#,
        );
        assert_eq!(extract_mentions(content), vec![tagged("1", "John Doe"), tagged("2", "Jane Smith")]);
    }

    #[test]
    fn test_alternate_attribute_names() {
        let content = concat!(
            r#"<span mention="TRUE" entity-id="7">Ann</span>"#,
            r#"<span data-mention="true" data-user-id="8">@Bea</span>"#,
        );
        assert_eq!(extract_mentions(content), vec![tagged("7", "Ann"), tagged("8", "Bea")]);
    }

    #[test]
    fn test_tagged_without_id_is_skipped() {
        let content = r#"<p><span data-mention="true">Ghost</span> <span data-mention="false" data-entity-id="9">Nope</span></p>"#;
        assert!(extract_mentions(content).is_empty());
    }

    #[test]
    fn test_freeform_unknown_name() {
        assert_eq!(extract_mentions("<p>ping @Unknown please</p>"), vec![freeform("Unknown")]);
    }

    #[test]
    fn test_freeform_stops_at_whitespace() {
        assert_eq!(
            extract_mentions("<p>@alpha\u{a0}x @beta&nbsp;y</p><p>@gamma</p>"),
            vec![freeform("alpha"), freeform("beta"), freeform("gamma")],
        );
    }

    #[test]
    fn test_tagged_text_is_never_freeform() {
        let content = r#"<p>x@<span data-mention="true" data-entity-id="1">John Doe</span>y</p>"#;
        assert_eq!(extract_mentions(content), vec![tagged("1", "John Doe")]);
    }

    #[test]
    fn test_dedup_prefers_tagged_and_first_occurrence() {
        let content = concat!(
            "<p>@jane smith, ",
            r#"<span data-mention="true" data-entity-id="2">Jane Smith</span> "#,
            r#"<span data-mention="true" data-entity-id="2">Jane Smith</span> "#,
            "@Bob @bob @Jane</p>",
        );
        assert_eq!(
            extract_mentions(content),
            vec![tagged("2", "Jane Smith"), freeform("jane"), freeform("Bob")],
        );
        let jane_smiths = extract_mentions(content)
            .into_iter()
            .filter(|m| m.name.eq_ignore_ascii_case("Jane Smith"))
            .count();
        assert_eq!(jane_smiths, 1);
    }

    #[test]
    fn test_freeform_matching_tagged_name_is_dropped() {
        let content = r#"<p><span data-mention="true" data-entity-id="3">Bob</span> cc @BOB</p>"#;
        assert_eq!(extract_mentions(content), vec![tagged("3", "Bob")]);
    }

    #[test]
    fn test_extraction_is_repeatable() {
        let content = r#"<p>@Zed and <span data-mention="true" data-entity-id="1">John Doe</span></p>"#;
        let first = extract_mentions(content);
        assert_eq!(extract_mentions(content), first);
        assert_eq!(first, vec![tagged("1", "John Doe"), freeform("Zed")]);
    }

    #[test]
    fn test_malformed_content_falls_back_to_freeform() {
        let content = r#"<p>hey @Jo</p></div><span data-mention="true" data-entity-id="1">John Doe"#;
        assert_eq!(extract_mentions(content), vec![freeform("Jo")]);
    }

    #[test]
    fn test_custom_trigger() {
        let extractor = MentionExtractor::new('+');
        assert_eq!(extractor.extract("<p>+ops and @dev</p>"), vec![freeform("ops")]);
        let extractor = MentionExtractor::new('.');
        assert_eq!(extractor.extract("a.b"), vec![freeform("b")]);
    }
}
