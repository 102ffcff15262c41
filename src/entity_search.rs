//! Entity search for @mentions.
//!
//! Candidates are every entity whose display name contains the filter text,
//! compared case-insensitively. Results keep the directory's own order;
//! there is no ranking or fuzzy scoring.

use crate::entity_directory::{Entity, EntityDirectory};

/// Returns `true` if `name` contains `filter_text`, ignoring case.
///
/// An empty filter matches every name.
pub fn name_matches_filter(name: &str, filter_text: &str) -> bool {
    if filter_text.is_empty() {
        return true;
    }
    // ASCII-only inputs skip the Unicode case-folding allocation.
    if name.is_ascii() && filter_text.is_ascii() {
        let name = name.as_bytes();
        let needle = filter_text.as_bytes();
        return needle.len() <= name.len()
            && name.windows(needle.len()).any(|w| w.eq_ignore_ascii_case(needle));
    }
    name.to_lowercase().contains(&filter_text.to_lowercase())
}

/// Filters the directory by the given text, preserving directory order.
///
/// Returns an empty list (never an error) when nothing matches.
pub fn filter_entities<'d>(directory: &'d EntityDirectory, filter_text: &str) -> Vec<&'d Entity> {
    filter_entities_limited(directory, filter_text, None)
}

/// Like [`filter_entities`], but keeps at most `max_results` entities if given.
pub fn filter_entities_limited<'d>(
    directory: &'d EntityDirectory,
    filter_text: &str,
    max_results: Option<usize>,
) -> Vec<&'d Entity> {
    let matches = directory
        .all()
        .filter(|entity| name_matches_filter(&entity.name, filter_text));
    match max_results {
        Some(max) => matches.take(max).collect(),
        None => matches.collect(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn names<'a>(entities: &[&'a Entity]) -> Vec<&'a str> {
        entities.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_empty_filter_matches_all_in_order() {
        let directory = EntityDirectory::builtin();
        assert_eq!(
            names(&filter_entities(&directory, "")),
            ["John Doe", "Jane Smith", "Bob Johnson"],
        );
    }

    #[test]
    fn test_case_insensitive_substring() {
        let directory = EntityDirectory::builtin();
        assert_eq!(names(&filter_entities(&directory, "Jo")), ["John Doe", "Bob Johnson"]);
        assert_eq!(names(&filter_entities(&directory, "SMITH")), ["Jane Smith"]);
        assert_eq!(names(&filter_entities(&directory, "e s")), ["Jane Smith"]);
        assert_eq!(names(&filter_entities(&directory, "oe")), ["John Doe"]);
    }

    #[test]
    fn test_no_matches_is_empty() {
        let directory = EntityDirectory::builtin();
        assert!(filter_entities(&directory, "zzz").is_empty());
        assert!(filter_entities(&directory, "John Doe and more").is_empty());
    }

    #[test]
    fn test_non_ascii_names() {
        let directory = EntityDirectory::new([
            Entity::new("a", "Ängström"),
            Entity::new("b", "Ødegaard"),
            Entity::new("c", "山田太郎"),
        ]).unwrap();
        assert_eq!(names(&filter_entities(&directory, "äng")), ["Ängström"]);
        assert_eq!(names(&filter_entities(&directory, "øDE")), ["Ødegaard"]);
        assert_eq!(names(&filter_entities(&directory, "太郎")), ["山田太郎"]);
    }

    #[test]
    fn test_results_preserve_directory_order() {
        let directory = EntityDirectory::new([
            Entity::new("1", "Zed Alpha"),
            Entity::new("2", "Alpha Zed"),
            Entity::new("3", "alpha"),
        ]).unwrap();
        // "alpha" is an exact match for the last entity, but no ranking is applied.
        assert_eq!(names(&filter_entities(&directory, "alpha")), ["Zed Alpha", "Alpha Zed", "alpha"]);
    }

    #[test]
    fn test_every_result_contains_filter() {
        let directory = EntityDirectory::builtin();
        for filter in ["", "o", "J", "ja", "son", "b", " ", "x"] {
            let results = filter_entities(&directory, filter);
            for entity in &results {
                assert!(entity.name.to_lowercase().contains(&filter.to_lowercase()));
            }
            // Relative order matches the directory.
            let positions: Vec<usize> = results.iter()
                .map(|r| directory.all().position(|e| e.id == r.id).unwrap())
                .collect();
            assert!(positions.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_limited() {
        let directory = EntityDirectory::builtin();
        assert_eq!(names(&filter_entities_limited(&directory, "o", Some(2))), ["John Doe", "Bob Johnson"]);
        assert_eq!(names(&filter_entities_limited(&directory, "", Some(1))), ["John Doe"]);
        assert_eq!(filter_entities_limited(&directory, "", None).len(), 3);
        assert!(filter_entities_limited(&directory, "", Some(0)).is_empty());
    }
}
