//! Named mask storage
//!
//! Manifest format (RON), paths relative to the manifest file:
//!
//! ```text
//! {
//!     "block": (file: "block.png"),
//!     "apple": (file: "apple.png", cols: 2, xo: 10, yo: 12, image_speed: Some(0.066)),
//! }
//! ```

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use serde::{Deserialize, Serialize};
use super::{SpriteError, SpriteMask, SpriteSource};

/// One manifest entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpriteDef {
    pub file: PathBuf,
    #[serde(default = "one")]
    pub cols: usize,
    #[serde(default = "one")]
    pub rows: usize,
    #[serde(default)]
    pub xo: i32,
    #[serde(default)]
    pub yo: i32,
    #[serde(default)]
    pub image_speed: Option<f32>,
}

fn one() -> usize {
    1
}

pub type SpriteManifest = BTreeMap<String, SpriteDef>;

/// Masks by sprite name, plus optional per-sprite animation speeds
#[derive(Debug, Clone, Default)]
pub struct SpriteBank {
    masks: HashMap<String, Rc<SpriteMask>>,
    speeds: HashMap<String, f32>,
}

impl SpriteBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Masks generated in code for every kind; no files needed
    pub fn builtin() -> Self {
        let mut bank = Self::new();
        for mask in super::builtin::all_masks() {
            bank.insert(mask);
        }
        bank
    }

    /// Load every entry of a manifest file. Entries whose image fails to load
    /// are skipped with a warning; a manifest that fails to parse is an error.
    pub fn load_manifest<P: AsRef<Path>>(path: P) -> Result<Self, SpriteError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;
        let manifest: SpriteManifest = ron::from_str(&contents)?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));

        let mut bank = Self::new();
        for (name, def) in manifest {
            match SpriteMask::from_file(base.join(&def.file), def.cols, def.rows, def.xo, def.yo) {
                Ok(mut mask) => {
                    mask.name = name.clone();
                    log::debug!(
                        "Loaded sprite {} ({} frames, origin {},{})",
                        name,
                        mask.frame_count(),
                        def.xo,
                        def.yo
                    );
                    if let Some(speed) = def.image_speed {
                        bank.speeds.insert(name, speed);
                    }
                    bank.insert(mask);
                }
                Err(e) => log::warn!("Skipping sprite {}: {}", name, e),
            }
        }
        Ok(bank)
    }

    /// Add any mask from `other` whose name is missing here
    pub fn fill_missing_from(&mut self, other: &SpriteBank) {
        for (name, mask) in &other.masks {
            self.masks.entry(name.clone()).or_insert_with(|| Rc::clone(mask));
        }
        for (name, speed) in &other.speeds {
            self.speeds.entry(name.clone()).or_insert(*speed);
        }
    }

    pub fn insert(&mut self, mask: SpriteMask) {
        self.masks.insert(mask.name.clone(), Rc::new(mask));
    }

    pub fn set_image_speed(&mut self, name: &str, speed: f32) {
        self.speeds.insert(name.to_string(), speed);
    }

    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Sorted sprite names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.masks.keys().map(|s| s.as_str()).collect();
        names.sort();
        names
    }
}

impl SpriteSource for SpriteBank {
    fn named(&self, name: &str) -> Option<Rc<SpriteMask>> {
        self.masks.get(name).cloned()
    }

    fn image_speed(&self, name: &str) -> Option<f32> {
        self.speeds.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::ObjectKind;
    use tempfile::TempDir;

    fn write_png(dir: &Path, name: &str, w: u32, h: u32, opaque: impl Fn(u32, u32) -> bool) {
        let img = image::RgbaImage::from_fn(w, h, |x, y| {
            let a = if opaque(x, y) { 255 } else { 0 };
            image::Rgba([255, 255, 255, a])
        });
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_builtin_covers_every_concrete_kind() {
        let bank = SpriteBank::builtin();
        for kind in ObjectKind::ALL {
            if kind.sprite_name().is_some() {
                assert!(bank.sprite_for(kind).is_some(), "missing mask for {:?}", kind);
            }
        }
        assert!(bank.named("player_mask_flip").is_some());
        assert!(bank.named("dotkid").is_some());
    }

    #[test]
    fn test_load_manifest() {
        let dir = TempDir::new().unwrap();
        write_png(dir.path(), "block.png", 32, 32, |_, _| true);
        write_png(dir.path(), "apple.png", 8, 4, |x, _| x < 4);

        let manifest = r#"{
            "block": (file: "block.png"),
            "apple": (file: "apple.png", cols: 2, xo: 2, yo: 2, image_speed: Some(0.5)),
            "broken": (file: "missing.png"),
        }"#;
        let manifest_path = dir.path().join("sprites.ron");
        std::fs::write(&manifest_path, manifest).unwrap();

        let bank = SpriteBank::load_manifest(&manifest_path).unwrap();
        assert_eq!(bank.len(), 2);

        let apple = bank.named("apple").unwrap();
        assert_eq!(apple.frame_count(), 2);
        assert_eq!(apple.x_origin, 2);
        assert!(apple.frames()[0].is_opaque(0, 0));
        assert!(apple.frames()[1].bounds().is_none());
        assert_eq!(bank.image_speed("apple"), Some(0.5));

        let info = bank.sprite_for(ObjectKind::Block).unwrap();
        assert_eq!(info.mask.frames()[0].opaque_count(), 32 * 32);
    }

    #[test]
    fn test_manifest_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("sprites.ron");
        std::fs::write(&path, "{ not ron").unwrap();
        assert!(matches!(SpriteBank::load_manifest(&path), Err(SpriteError::Manifest(_))));
    }

    #[test]
    fn test_fill_missing_keeps_loaded_masks() {
        let mut bank = SpriteBank::new();
        bank.insert(SpriteMask::single("block", 0, 0, crate::sprite::MaskFrame::solid(4, 4)));
        bank.fill_missing_from(&SpriteBank::builtin());
        assert_eq!(bank.named("block").unwrap().frames()[0].width, 4);
        assert!(bank.named("spike_up").is_some());
    }

    #[test]
    fn test_image_speed_override() {
        let mut bank = SpriteBank::builtin();
        assert_eq!(bank.image_speed("block"), None);
        bank.set_image_speed("block", 0.25);
        assert_eq!(bank.image_speed("block"), Some(0.25));
    }
}
