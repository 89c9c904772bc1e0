//! Map loading and saving
//!
//! Native maps are RON. `jmap` reads and writes the `.jmap` text format.

pub mod jmap;

use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use crate::world::{MapFlags, Placement};

/// Error type for map loading and saving
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),
    #[error("Malformed jmap field {field}: {value:?}")]
    BadField { field: String, value: String },
    #[error("Unknown jmap object id {0}")]
    UnknownObject(u32),
    #[error("Position ({x}, {y}) does not fit in a jmap")]
    OutOfRange { x: f32, y: f32 },
}

/// Everything a map file stores
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MapData {
    #[serde(default)]
    pub flags: MapFlags,
    pub placements: Vec<Placement>,
}

/// Load a map from a RON file
pub fn load_map<P: AsRef<Path>>(path: P) -> Result<MapData, MapError> {
    let contents = fs::read_to_string(path)?;
    load_map_from_str(&contents)
}

/// Save a map to a RON file
pub fn save_map<P: AsRef<Path>>(map: &MapData, path: P) -> Result<(), MapError> {
    let contents = save_map_to_string(map)?;
    fs::write(path, contents)?;
    Ok(())
}

pub fn load_map_from_str(s: &str) -> Result<MapData, MapError> {
    Ok(ron::from_str(s)?)
}

pub fn save_map_to_string(map: &MapData) -> Result<String, MapError> {
    let config = ron::ser::PrettyConfig::new()
        .depth_limit(3)
        .indentor("  ".to_string());
    Ok(ron::ser::to_string_pretty(map, config)?)
}

/// Load either format, picked by the `.jmap` extension
pub fn load_any<P: AsRef<Path>>(path: P) -> Result<MapData, MapError> {
    let path = path.as_ref();
    let is_jmap = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("jmap"));
    if is_jmap {
        jmap::load_jmap(path)
    } else {
        load_map(path)
    }
}

/// Save either format, picked by the `.jmap` extension
pub fn save_any<P: AsRef<Path>>(map: &MapData, path: P) -> Result<(), MapError> {
    let path = path.as_ref();
    let is_jmap = path
        .extension()
        .map_or(false, |e| e.eq_ignore_ascii_case("jmap"));
    if is_jmap {
        jmap::save_jmap(map, path)
    } else {
        save_map(map, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{DeathBorder, ObjectKind, PlayerSave};
    use tempfile::TempDir;

    fn sample() -> MapData {
        let mut flags = MapFlags::default();
        flags.death_border = DeathBorder::Solid;
        flags.save = PlayerSave { x: 401.0, y: 407.0, face: 1.0, grav: -1.0 };
        MapData {
            flags,
            placements: vec![
                Placement::new(352.0, 416.0, ObjectKind::Block),
                Placement::new(384.0, 384.0, ObjectKind::PlayerStart),
                Placement::new(0.0, 0.0, ObjectKind::SpikeUp),
            ],
        }
    }

    #[test]
    fn test_save_and_load_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("level.ron");
        let map = sample();

        save_map(&map, &path).unwrap();
        assert_eq!(load_map(&path).unwrap(), map);
    }

    #[test]
    fn test_missing_flags_default() {
        let map = load_map_from_str("(placements: [(x: 32.0, y: 64.0, kind: Block)])").unwrap();
        assert_eq!(map.flags, MapFlags::default());
        assert_eq!(map.placements, vec![Placement::new(32.0, 64.0, ObjectKind::Block)]);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(load_map_from_str("(placements: [oops"), Err(MapError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(load_map(dir.path().join("nope.ron")), Err(MapError::Io(_))));
    }

    #[test]
    fn test_any_picks_format_by_extension() {
        let dir = TempDir::new().unwrap();
        let map = sample();

        let jmap_path = dir.path().join("level.jmap");
        save_any(&map, &jmap_path).unwrap();
        let text = std::fs::read_to_string(&jmap_path).unwrap();
        assert!(text.starts_with("jtool|"));
        assert_eq!(load_any(&jmap_path).unwrap().placements.len(), 3);

        let ron_path = dir.path().join("level.ron");
        save_any(&map, &ron_path).unwrap();
        assert_eq!(load_any(&ron_path).unwrap(), map);
    }
}
