//! The in-memory directory of mentionable entities.
//!
//! The directory is loaded once and injected into the mention input;
//! it never changes for the lifetime of an editing session.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A mentionable entity, e.g., a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity {
    /// The unique, stable identifier of this entity.
    pub id: String,
    /// The human-readable name shown in the candidate list and inserted into the document.
    #[serde(alias = "displayName", alias = "display_name")]
    pub name: String,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into() }
    }
}

/// Errors that can occur while building or loading an [`EntityDirectory`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("duplicate entity id {0:?} in directory")]
    DuplicateId(String),
    #[error("entity at position {0} has an empty id")]
    EmptyId(usize),
    #[error("failed to read directory file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse directory file: {0}")]
    Json(#[from] serde_json::Error),
}

/// An ordered, read-only mapping from entity id to [`Entity`].
///
/// Iteration order is always insertion order.
#[derive(Debug, Clone, Default)]
pub struct EntityDirectory {
    entities: IndexMap<String, Entity>,
}

impl EntityDirectory {
    /// Builds a directory from the given entities, preserving their order.
    pub fn new(entities: impl IntoIterator<Item = Entity>) -> Result<Self, DirectoryError> {
        let mut map = IndexMap::new();
        for (position, entity) in entities.into_iter().enumerate() {
            if entity.id.is_empty() {
                return Err(DirectoryError::EmptyId(position));
            }
            if map.contains_key(&entity.id) {
                return Err(DirectoryError::DuplicateId(entity.id));
            }
            map.insert(entity.id.clone(), entity);
        }
        Ok(Self { entities: map })
    }

    /// The demo users that ship with the editor.
    pub fn builtin() -> Self {
        let entities = [
            Entity::new("1", "John Doe"),
            Entity::new("2", "Jane Smith"),
            Entity::new("3", "Bob Johnson"),
        ];
        Self {
            entities: entities.into_iter().map(|e| (e.id.clone(), e)).collect(),
        }
    }

    /// Returns all entities in directory order.
    pub fn all(&self) -> impl ExactSizeIterator<Item = &Entity> + '_ {
        self.entities.values()
    }

    pub fn get(&self, id: &str) -> Option<&Entity> {
        self.entities.get(id)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_order() {
        let directory = EntityDirectory::builtin();
        let names: Vec<&str> = directory.all().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["John Doe", "Jane Smith", "Bob Johnson"]);
        assert_eq!(directory.get("2").map(|e| e.name.as_str()), Some("Jane Smith"));
        assert!(directory.get("4").is_none());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let result = EntityDirectory::new([
            Entity::new("a", "Alice"),
            Entity::new("a", "Alicia"),
        ]);
        assert!(matches!(result, Err(DirectoryError::DuplicateId(id)) if id == "a"));
    }

    #[test]
    fn test_empty_id_rejected() {
        let result = EntityDirectory::new([Entity::new("x", "X"), Entity::new("", "Nobody")]);
        assert!(matches!(result, Err(DirectoryError::EmptyId(1))));
    }

    #[test]
    fn test_deserialize_display_name_alias() {
        let entity: Entity = serde_json::from_str(r#"{"id":"7","displayName":"Grace Hopper"}"#).unwrap();
        assert_eq!(entity, Entity::new("7", "Grace Hopper"));
    }
}
