//! Editor settings, persisted as RON

use std::fs;
use std::path::{Path, PathBuf};
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Spacing of the drawn grid
    pub grid_size: f32,
    /// Placement step
    pub snap: f32,
    pub show_grid: bool,
    pub show_mouse_coord: bool,
    /// Committed transactions kept; 0 keeps everything
    pub undo_limit: usize,
    /// Sprite manifest; built-in masks are used when unset
    pub sprite_manifest: Option<PathBuf>,
    /// Whether killers kill in new maps
    pub death_enable: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            grid_size: 32.0,
            snap: 32.0,
            show_grid: true,
            show_mouse_coord: false,
            undo_limit: 200,
            sprite_manifest: None,
            death_enable: true,
        }
    }
}

impl EditorConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(ron::from_str(&contents)?)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let config = ron::ser::PrettyConfig::new().indentor("  ".to_string());
        fs::write(path, ron::ser::to_string_pretty(self, config)?)?;
        Ok(())
    }

    /// Defaults when the file is missing; a corrupt file is reported and
    /// ignored
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            return Self::default();
        }
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.ron");
        let config = EditorConfig {
            snap: 16.0,
            undo_limit: 0,
            sprite_manifest: Some(PathBuf::from("skins/default.ron")),
            ..Default::default()
        };

        config.save(&path).unwrap();
        assert_eq!(EditorConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("editor.ron");
        fs::write(&path, "(show_grid: false)").unwrap();

        let config = EditorConfig::load(&path).unwrap();
        assert!(!config.show_grid);
        assert_eq!(config.grid_size, 32.0);
        assert_eq!(config.undo_limit, 200);
    }

    #[test]
    fn test_load_or_default() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing.ron");
        assert_eq!(EditorConfig::load_or_default(&missing), EditorConfig::default());

        let corrupt = dir.path().join("corrupt.ron");
        fs::write(&corrupt, "(snap: ").unwrap();
        assert_eq!(EditorConfig::load_or_default(&corrupt), EditorConfig::default());
        assert!(matches!(EditorConfig::load(&corrupt), Err(ConfigError::Parse(_))));
    }
}
