use std::io::Write;
use std::path::Path;

use tracing::{error, info};

use crate::settings::MentionSettings;

/// Loads the mention settings from a JSON file.
///
/// If no path is given or the file doesn't exist, the default settings are returned.
/// Fields missing from the file take their default values.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<MentionSettings> {
    let Some(path) = path else {
        return Ok(MentionSettings::default());
    };
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            info!("No mention settings found at {path:?}, using defaults.");
            return Ok(MentionSettings::default());
        }
        Err(e) => return Err(e.into()),
    };
    match serde_json::from_reader(std::io::BufReader::new(file)) {
        Ok(settings) => {
            info!("Loaded mention settings from {path:?}");
            Ok(settings)
        }
        Err(e) => {
            error!("Failed to deserialize mention settings from {path:?}: {e}");
            Err(e.into())
        }
    }
}

/// Saves the mention settings to a JSON file.
pub fn save_settings(settings: &MentionSettings, path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    let mut writer = std::io::BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, settings)?;
    writer.flush()?;
    info!("Saved mention settings to {path:?}");
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_then_load() {
        let path = std::env::temp_dir().join(format!("robrix-mentions-settings-{}.json", std::process::id()));
        let settings = MentionSettings {
            trigger: '#',
            max_visible_candidates: Some(4),
            ..MentionSettings::default()
        };
        save_settings(&settings, &path).unwrap();
        let loaded = load_settings(Some(&path)).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_missing_settings_use_defaults() {
        assert_eq!(load_settings(None).unwrap(), MentionSettings::default());
        assert_eq!(
            load_settings(Some(Path::new("/nonexistent/robrix-mentions/settings.json"))).unwrap(),
            MentionSettings::default(),
        );
    }
}
