//! Modules for loading mention data and settings from persistent storage.

/// For loading the directory of mentionable entities.
pub mod directory_state;
pub use directory_state::*;

/// For loading and saving the mention input's settings.
pub mod settings_state;
pub use settings_state::*;
