//! Object model and editing engine for a 2D needle-game level editor
//!
//! - `world`: objects, per-pixel collision, the frame step and player logic
//! - `editor`: gesture handling and transactional undo/redo
//! - `sprite`: collision masks and where they come from
//! - `map`: RON maps and `.jmap` interop
//! - `input`: per-frame input snapshots
//! - `config`: editor settings

pub mod config;
pub mod editor;
pub mod input;
pub mod map;
pub mod sprite;
pub mod world;

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
