//! Sprite masks and the provider that hands them to objects
//!
//! - `SpriteMask`: per-pixel opacity frames around an origin
//! - `SpriteBank`: named masks, loaded from a RON manifest or generated
//! - `SpriteSource`: what the object store asks when it creates an object

mod mask;
mod bank;
mod builtin;

pub use mask::*;
pub use bank::*;

use std::path::PathBuf;
use std::rc::Rc;
use crate::world::ObjectKind;

/// Error type for sprite and manifest loading
#[derive(Debug, thiserror::Error)]
pub enum SpriteError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to load {}: {source}", path.display())]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("Manifest parse error: {0}")]
    Manifest(#[from] ron::error::SpannedError),
    #[error("A {width}x{height} sheet cannot be split into {cols}x{rows} frames")]
    BadSheet {
        width: usize,
        height: usize,
        cols: usize,
        rows: usize,
    },
}

/// Mask and animation speed for a kind
#[derive(Debug, Clone)]
pub struct SpriteInfo {
    pub mask: Rc<SpriteMask>,
    /// Overrides the kind's default image speed when set
    pub image_speed: Option<f32>,
}

/// Mask provider consulted at object creation and when behaviors swap masks
pub trait SpriteSource {
    /// Look up a mask by sprite name
    fn named(&self, name: &str) -> Option<Rc<SpriteMask>>;

    /// Animation speed override for a sprite name
    fn image_speed(&self, _name: &str) -> Option<f32> {
        None
    }

    /// Mask for an object kind, `None` for abstract kinds or missing sprites
    fn sprite_for(&self, kind: ObjectKind) -> Option<SpriteInfo> {
        let name = kind.sprite_name()?;
        Some(SpriteInfo {
            mask: self.named(name)?,
            image_speed: self.image_speed(name),
        })
    }
}
