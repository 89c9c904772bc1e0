//! Player session state shared by behaviors, the editor and map files

use serde::{Deserialize, Serialize};
use super::store::ObjectId;

/// When touching a save point saves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveType {
    /// Only by pressing shoot while overlapping it
    #[default]
    OnlyShoot,
    /// Shooting while overlapping, or hitting it with a bullet
    ShootOrBullet,
}

/// What happens at the room edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeathBorder {
    /// Leaving the room kills
    #[default]
    Killer,
    /// The room is walled in with border blocks
    Solid,
}

/// Respawn point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerSave {
    pub x: f32,
    pub y: f32,
    pub face: f32,
    pub grav: f32,
}

impl Default for PlayerSave {
    fn default() -> Self {
        Self { x: -1.0, y: -1.0, face: 1.0, grav: 1.0 }
    }
}

/// Global flags stored with a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapFlags {
    #[serde(default)]
    pub infjump: bool,
    #[serde(default)]
    pub dotkid: bool,
    #[serde(default)]
    pub save_type: SaveType,
    #[serde(default)]
    pub death_border: DeathBorder,
    #[serde(default = "default_true")]
    pub death_enable: bool,
    #[serde(default)]
    pub save: PlayerSave,
}

fn default_true() -> bool {
    true
}

impl Default for MapFlags {
    fn default() -> Self {
        Self {
            infjump: false,
            dotkid: false,
            save_type: SaveType::OnlyShoot,
            death_border: DeathBorder::Killer,
            death_enable: true,
            save: PlayerSave::default(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    /// Facing, 1 right or -1 left
    pub face: f32,
    /// Gravity sign, 1 down or -1 up
    pub grav: f32,
    pub dotkid: bool,
    pub death_enable: bool,
    pub infjump: bool,
    pub save_type: SaveType,
    pub death_border: DeathBorder,
    pub current_save: PlayerSave,
    /// Live player object, if any
    pub player: Option<ObjectId>,
}

impl Default for PlayerState {
    fn default() -> Self {
        Self {
            face: 1.0,
            grav: 1.0,
            dotkid: false,
            death_enable: true,
            infjump: false,
            save_type: SaveType::OnlyShoot,
            death_border: DeathBorder::Killer,
            current_save: PlayerSave::default(),
            player: None,
        }
    }
}

impl PlayerState {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once a save point has been recorded
    pub fn has_save(&self) -> bool {
        self.current_save.x >= 0.0 || self.current_save.y >= 0.0
    }
}
