//! Map editing
//!
//! - `EditEngine`: gesture state machine driving the object store
//! - `UndoLog`: transactional undo/redo of create, remove and move edits

mod engine;
mod undo;

pub use engine::*;
pub use undo::*;
