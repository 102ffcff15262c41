use std::path::Path;

use tracing::info;

use crate::entity_directory::{DirectoryError, Entity, EntityDirectory};

/// Loads an entity directory from a JSON file holding an array of `{ "id", "name" }` objects.
///
/// If no path is given, or the file doesn't exist, the built-in directory is returned.
/// An existing but invalid file is an error, since silently replacing a user's
/// directory with the demo users would be surprising.
pub fn load_directory(path: Option<&Path>) -> anyhow::Result<EntityDirectory> {
    let Some(path) = path else {
        return Ok(EntityDirectory::builtin());
    };
    let file_bytes = match std::fs::read(path) {
        Ok(fb) => fb,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No entity directory found at {path:?}, using the built-in directory.");
            return Ok(EntityDirectory::builtin());
        }
        Err(e) => return Err(DirectoryError::Io(e).into()),
    };
    let directory = parse_directory(&file_bytes)
        .map_err(|e| anyhow::anyhow!("Failed to load entity directory from {path:?}: {e}"))?;
    info!("Loaded {} entities from {path:?}", directory.len());
    Ok(directory)
}

/// Parses a JSON array of entities into a directory.
pub fn parse_directory(json: &[u8]) -> Result<EntityDirectory, DirectoryError> {
    let entities: Vec<Entity> = serde_json::from_slice(json)?;
    EntityDirectory::new(entities)
}
