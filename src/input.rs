//! Per-frame input snapshot
//!
//! The front end polls its window toolkit and fills an `InputSnapshot` once
//! per frame; the world and the editor only ever read the snapshot.

use std::collections::HashMap;

/// Logical keys the core reacts to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Jump,
    Shoot,
    Restart,
    /// One-pixel nudge while standing on a block
    NudgeLeft,
    NudgeRight,
    /// Held to grab and move an existing object
    DragTool,
    /// Held to pick the kind under the cursor
    Picker,
}

/// Press/hold/release edges for one button
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonState {
    pub pressed: bool,
    pub held: bool,
    pub released: bool,
}

impl ButtonState {
    /// Derive edges from the down state this frame and last frame
    pub fn from_edges(down_now: bool, down_before: bool) -> Self {
        Self {
            pressed: down_now && !down_before,
            held: down_now,
            released: !down_now && down_before,
        }
    }
}

/// Mouse state in map-local coordinates
#[derive(Debug, Clone, Copy, Default)]
pub struct MouseState {
    pub x: f32,
    pub y: f32,
    pub left: ButtonState,
    pub right: ButtonState,
    /// Scroll wheel delta
    pub scroll: f32,
    /// Cursor is over the edit surface
    pub inside: bool,
}

#[derive(Debug, Clone, Default)]
pub struct InputSnapshot {
    keys: HashMap<Key, ButtonState>,
    pub mouse: MouseState,
}

impl InputSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn key(&self, key: Key) -> ButtonState {
        self.keys.get(&key).copied().unwrap_or_default()
    }

    pub fn pressed(&self, key: Key) -> bool {
        self.key(key).pressed
    }

    pub fn held(&self, key: Key) -> bool {
        self.key(key).held
    }

    pub fn released(&self, key: Key) -> bool {
        self.key(key).released
    }

    pub fn set_key(&mut self, key: Key, state: ButtonState) {
        self.keys.insert(key, state);
    }

    // Builders for tests and scripted input

    pub fn with_press(mut self, key: Key) -> Self {
        self.set_key(key, ButtonState { pressed: true, held: true, released: false });
        self
    }

    pub fn with_hold(mut self, key: Key) -> Self {
        self.set_key(key, ButtonState { pressed: false, held: true, released: false });
        self
    }

    pub fn with_release(mut self, key: Key) -> Self {
        self.set_key(key, ButtonState { pressed: false, held: false, released: true });
        self
    }

    pub fn with_mouse(mut self, mouse: MouseState) -> Self {
        self.mouse = mouse;
        self
    }
}

/// Turns raw "is down" polls into edge-aware snapshots
#[derive(Debug, Clone, Default)]
pub struct InputTracker {
    keys_down: HashMap<Key, bool>,
    left_down: bool,
    right_down: bool,
}

impl InputTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build this frame's snapshot. `key_down` is asked once per logical key.
    pub fn snapshot(
        &mut self,
        mut key_down: impl FnMut(Key) -> bool,
        mouse_pos: (f32, f32),
        inside: bool,
        left_down: bool,
        right_down: bool,
        scroll: f32,
    ) -> InputSnapshot {
        const KEYS: [Key; 9] = [
            Key::Left,
            Key::Right,
            Key::Jump,
            Key::Shoot,
            Key::Restart,
            Key::NudgeLeft,
            Key::NudgeRight,
            Key::DragTool,
            Key::Picker,
        ];

        let mut snap = InputSnapshot::new();
        for key in KEYS {
            let now = key_down(key);
            let before = self.keys_down.insert(key, now).unwrap_or(false);
            snap.set_key(key, ButtonState::from_edges(now, before));
        }

        snap.mouse = MouseState {
            x: mouse_pos.0,
            y: mouse_pos.1,
            left: ButtonState::from_edges(left_down, self.left_down),
            right: ButtonState::from_edges(right_down, self.right_down),
            scroll,
            inside,
        };
        self.left_down = left_down;
        self.right_down = right_down;
        snap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges() {
        assert_eq!(
            ButtonState::from_edges(true, false),
            ButtonState { pressed: true, held: true, released: false }
        );
        assert_eq!(
            ButtonState::from_edges(true, true),
            ButtonState { pressed: false, held: true, released: false }
        );
        assert_eq!(
            ButtonState::from_edges(false, true),
            ButtonState { pressed: false, held: false, released: true }
        );
        assert_eq!(ButtonState::from_edges(false, false), ButtonState::default());
    }

    #[test]
    fn test_tracker_reports_press_once() {
        let mut tracker = InputTracker::new();
        let a = tracker.snapshot(|k| k == Key::Jump, (0.0, 0.0), true, true, false, 0.0);
        assert!(a.pressed(Key::Jump));
        assert!(a.mouse.left.pressed);

        let b = tracker.snapshot(|k| k == Key::Jump, (0.0, 0.0), true, true, false, 0.0);
        assert!(!b.pressed(Key::Jump));
        assert!(b.held(Key::Jump));
        assert!(b.mouse.left.held && !b.mouse.left.pressed);

        let c = tracker.snapshot(|_| false, (0.0, 0.0), true, false, false, 0.0);
        assert!(c.released(Key::Jump));
        assert!(c.mouse.left.released);
        assert!(!c.held(Key::Shoot));
    }
}
