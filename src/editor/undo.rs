//! Transactional undo log
//!
//! Sub events never hold object handles; replay finds objects again by exact
//! position and kind.

use crate::world::{ObjectKind, Placement};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoKind {
    Create,
    Remove,
    Move,
}

/// An object of `kind` moved from `old` to `new`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Relocation {
    pub kind: ObjectKind,
    pub old_x: f32,
    pub old_y: f32,
    pub new_x: f32,
    pub new_y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SubEvent {
    Create(Placement),
    Remove(Placement),
    Move(Relocation),
}

impl SubEvent {
    pub fn kind(&self) -> UndoKind {
        match self {
            SubEvent::Create(_) => UndoKind::Create,
            SubEvent::Remove(_) => UndoKind::Remove,
            SubEvent::Move(_) => UndoKind::Move,
        }
    }
}

/// A committed batch of sub events of one kind
#[derive(Debug, Clone, PartialEq)]
pub enum UndoEvent {
    Create(Vec<Placement>),
    Remove(Vec<Placement>),
    Move(Vec<Relocation>),
}

impl UndoEvent {
    fn open(sub: SubEvent) -> Self {
        match sub {
            SubEvent::Create(p) => UndoEvent::Create(vec![p]),
            SubEvent::Remove(p) => UndoEvent::Remove(vec![p]),
            SubEvent::Move(r) => UndoEvent::Move(vec![r]),
        }
    }

    pub fn kind(&self) -> UndoKind {
        match self {
            UndoEvent::Create(_) => UndoKind::Create,
            UndoEvent::Remove(_) => UndoKind::Remove,
            UndoEvent::Move(_) => UndoKind::Move,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            UndoEvent::Create(v) | UndoEvent::Remove(v) => v.len(),
            UndoEvent::Move(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a sub event of the same kind; hands it back otherwise
    fn push(&mut self, sub: SubEvent) -> Result<(), SubEvent> {
        match (self, sub) {
            (UndoEvent::Create(v), SubEvent::Create(p)) => v.push(p),
            (UndoEvent::Remove(v), SubEvent::Remove(p)) => v.push(p),
            (UndoEvent::Move(v), SubEvent::Move(r)) => v.push(r),
            (_, sub) => return Err(sub),
        }
        Ok(())
    }
}

/// Undo and redo stacks plus the open transaction
#[derive(Debug, Clone, Default)]
pub struct UndoLog {
    undo: Vec<UndoEvent>,
    redo: Vec<UndoEvent>,
    current: Option<UndoEvent>,
    /// Most committed events kept; 0 keeps everything
    limit: usize,
}

impl UndoLog {
    pub fn new(limit: usize) -> Self {
        Self { limit, ..Default::default() }
    }

    pub fn set_limit(&mut self, limit: usize) {
        self.limit = limit;
        self.enforce_limit();
    }

    /// Add to the open transaction, opening one if needed. A sub event of a
    /// different kind commits the open transaction first; returns true when
    /// that happened.
    pub fn record(&mut self, sub: SubEvent) -> bool {
        let Some(current) = self.current.as_mut() else {
            self.current = Some(UndoEvent::open(sub));
            return false;
        };
        match current.push(sub) {
            Ok(()) => false,
            Err(sub) => {
                self.commit();
                self.current = Some(UndoEvent::open(sub));
                true
            }
        }
    }

    /// Move the open transaction onto the undo stack. Returns false when
    /// there was nothing to commit.
    pub fn commit(&mut self) -> bool {
        match self.current.take() {
            Some(event) if !event.is_empty() => {
                self.redo.clear();
                self.undo.push(event);
                self.enforce_limit();
                true
            }
            _ => false,
        }
    }

    fn enforce_limit(&mut self) {
        if self.limit > 0 && self.undo.len() > self.limit {
            let excess = self.undo.len() - self.limit;
            self.undo.drain(..excess);
        }
    }

    /// Move the newest committed event to the redo stack and return it
    pub fn pop_undo(&mut self) -> Option<&UndoEvent> {
        let event = self.undo.pop()?;
        self.redo.push(event);
        self.redo.last()
    }

    /// Move the newest undone event back to the undo stack and return it
    pub fn pop_redo(&mut self) -> Option<&UndoEvent> {
        let event = self.redo.pop()?;
        self.undo.push(event);
        self.undo.last()
    }

    pub fn has_open(&self) -> bool {
        self.current.is_some()
    }

    pub fn open(&self) -> Option<&UndoEvent> {
        self.current.as_ref()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_len(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_len(&self) -> usize {
        self.redo.len()
    }

    pub fn clear(&mut self) {
        self.undo.clear();
        self.redo.clear();
        self.current = None;
    }
}
