//! Edit engine
//!
//! Turns per-frame mouse and modifier state into store mutations: paint with
//! the left button, erase with the right, carry an existing object with the
//! drag tool held, pick a kind with the picker held. Every mutation is
//! recorded in the undo log and a gesture's mutations commit together when
//! the button is released.

use crate::input::{InputSnapshot, Key};
use crate::map::MapData;
use crate::world::{ObjectId, ObjectKind, Placement, Segment, World, ROOM_HEIGHT, ROOM_WIDTH};
use super::undo::{Relocation, SubEvent, UndoEvent, UndoLog};

pub const DEFAULT_SNAP: f32 = 32.0;
pub const DEFAULT_UNDO_LIMIT: usize = 200;

/// Object held by the drag tool and where it was picked up
#[derive(Debug, Clone, Copy, PartialEq)]
struct Carry {
    id: ObjectId,
    from_x: f32,
    from_y: f32,
}

/// Where the paint tool would place its next object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Preview {
    pub x: f32,
    pub y: f32,
    pub kind: ObjectKind,
}

pub struct EditEngine {
    selected: ObjectKind,
    snap: f32,
    log: UndoLog,
    carry: Option<Carry>,
    last_mouse: (f32, f32),
    left_held_last: bool,
    right_held_last: bool,
    modified: bool,
    preview: Option<Preview>,
}

impl Default for EditEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl EditEngine {
    pub fn new() -> Self {
        Self {
            selected: ObjectKind::Block,
            snap: DEFAULT_SNAP,
            log: UndoLog::new(DEFAULT_UNDO_LIMIT),
            carry: None,
            last_mouse: (0.0, 0.0),
            left_held_last: false,
            right_held_last: false,
            modified: false,
            preview: None,
        }
    }

    pub fn selected(&self) -> ObjectKind {
        self.selected
    }

    pub fn set_selected(&mut self, kind: ObjectKind) {
        if self.selected != kind {
            self.selected = kind;
            log::info!("Selected {}", kind.label());
        }
    }

    pub fn snap(&self) -> f32 {
        self.snap
    }

    /// Grid step for placement; values below one pixel are clamped
    pub fn set_snap(&mut self, snap: f32) {
        self.snap = snap.max(1.0);
    }

    pub fn set_undo_limit(&mut self, limit: usize) {
        self.log.set_limit(limit);
    }

    pub fn preview(&self) -> Option<Preview> {
        self.preview
    }

    /// True once any transaction is committed, undone or redone after the
    /// last save or load
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn mark_saved(&mut self) {
        self.modified = false;
    }

    pub fn can_undo(&self) -> bool {
        self.log.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.log.can_redo()
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.log
    }

    fn snap_point(&self, x: f32, y: f32) -> (f32, f32) {
        ((x / self.snap).floor() * self.snap, (y / self.snap).floor() * self.snap)
    }

    /// Interpret one frame of input
    pub fn update(&mut self, world: &mut World, input: &InputSnapshot) {
        let mouse = input.mouse;
        let (mx, my) = (mouse.x, mouse.y);
        let in_area = mouse.inside
            && (0.0..ROOM_WIDTH).contains(&mx)
            && (0.0..ROOM_HEIGHT).contains(&my);
        let (sx, sy) = self.snap_point(mx, my);
        let drag = input.held(Key::DragTool);
        let picker = input.held(Key::Picker);

        if in_area {
            if drag {
                if mouse.left.held {
                    let carry = self.carry;
                    match carry {
                        None => self.grab(world, mx, my),
                        Some(carry) => {
                            if let Some(obj) = world.store.get_mut(carry.id) {
                                obj.set_position(sx, sy);
                                obj.compute_bounding_box();
                            }
                        }
                    }
                }
                if mouse.left.released {
                    self.finish_carry(world);
                }
            } else if picker {
                if mouse.left.pressed {
                    self.pick(world, mx, my);
                }
            } else if mouse.left.held {
                if mouse.left.pressed {
                    self.try_create(world, sx, sy);
                }
                if self.left_held_last && (mx, my) != self.last_mouse {
                    self.paint_line(world, Segment::new(self.last_mouse.0, self.last_mouse.1, mx, my));
                }
            } else if mouse.right.held {
                self.erase(world, mx, my);
            }

            if !drag {
                self.finish_carry(world);
            }
        } else {
            // Leaving the edit surface ends the gesture
            self.finish_carry(world);
            self.commit();
        }

        if mouse.left.released || mouse.right.released {
            self.commit();
        }

        self.last_mouse = (mx, my);
        self.left_held_last = in_area && mouse.left.held;
        self.right_held_last = in_area && mouse.right.held;

        self.preview = (in_area && !drag && !picker).then_some(Preview {
            x: sx,
            y: sy,
            kind: self.selected,
        });
    }

    fn grab(&mut self, world: &World, x: f32, y: f32) {
        let found = world
            .store
            .collision_point_list(x, y, None)
            .into_iter()
            .filter_map(|id| world.store.get(id).map(|o| (id, o)))
            .find(|(_, o)| o.kind().in_palette());
        if let Some((id, obj)) = found {
            self.carry = Some(Carry { id, from_x: obj.x, from_y: obj.y });
        }
    }

    /// Drop the carried object and commit its move. Nothing is recorded if
    /// it ends where it started.
    fn finish_carry(&mut self, world: &World) {
        let Some(carry) = self.carry.take() else {
            return;
        };
        if let Some(obj) = world.store.get(carry.id).filter(|o| !o.is_destroyed()) {
            if (obj.x, obj.y) != (carry.from_x, carry.from_y) {
                self.record_move(obj.kind(), carry.from_x, carry.from_y, obj.x, obj.y);
            }
        }
        self.commit();
    }

    /// Select the topmost palette kind under the cursor
    fn pick(&mut self, world: &World, x: f32, y: f32) {
        let top = world
            .store
            .collision_point_list(x, y, None)
            .into_iter()
            .filter_map(|id| world.store.get(id).map(|o| o.kind()))
            .filter(|k| k.in_palette())
            .last();
        if let Some(kind) = top {
            self.set_selected(kind);
        }
    }

    fn paint_line(&mut self, world: &mut World, seg: Segment) {
        for (px, py) in seg.walk() {
            let (sx, sy) = self.snap_point(px, py);
            self.try_create(world, sx, sy);
        }
    }

    fn erase(&mut self, world: &mut World, x: f32, y: f32) {
        let hits = if self.right_held_last {
            let (lx, ly) = self.last_mouse;
            world.store.collision_line_list(lx, ly, x, y, None)
        } else {
            world.store.collision_point_list(x, y, None)
        };

        for id in hits {
            let Some(obj) = world.store.get(id) else {
                continue;
            };
            let kind = obj.kind();
            if kind == ObjectKind::PlayerStart || !kind.in_palette() {
                continue;
            }
            self.record_remove(Placement::new(obj.x, obj.y, kind));
            world.destroy(id);
        }
    }

    /// Create the selected kind at `(x, y)` unless one already stands there
    pub fn try_create(&mut self, world: &mut World, x: f32, y: f32) -> Option<ObjectId> {
        let kind = self.selected;
        if !world.store.at_position(x, y, Some(kind)).is_empty() {
            return None;
        }
        let id = world.create(x, y, kind);
        self.record_create(Placement::new(x, y, kind));
        Some(id)
    }

    fn record(&mut self, sub: SubEvent) {
        if self.log.record(sub) {
            self.modified = true;
        }
    }

    pub fn record_create(&mut self, placement: Placement) {
        self.record(SubEvent::Create(placement));
    }

    pub fn record_remove(&mut self, placement: Placement) {
        self.record(SubEvent::Remove(placement));
    }

    pub fn record_move(&mut self, kind: ObjectKind, old_x: f32, old_y: f32, new_x: f32, new_y: f32) {
        self.record(SubEvent::Move(Relocation { kind, old_x, old_y, new_x, new_y }));
    }

    /// Start a fresh transaction, committing anything still open
    pub fn begin_transaction(&mut self) {
        self.commit();
    }

    /// Commit the open transaction. Returns false if nothing was open.
    pub fn commit(&mut self) -> bool {
        let Some(len) = self.log.open().map(UndoEvent::len) else {
            return false;
        };
        if !self.log.commit() {
            return false;
        }
        self.modified = true;
        log::debug!("Committed {} sub events", len);
        true
    }

    pub fn undo(&mut self, world: &mut World) -> bool {
        self.finish_carry(world);
        self.commit();
        let Some(event) = self.log.pop_undo().cloned() else {
            return false;
        };
        replay(world, &event, true);
        self.modified = true;
        log::info!("Undo {:?}, {} sub events", event.kind(), event.len());
        true
    }

    pub fn redo(&mut self, world: &mut World) -> bool {
        self.finish_carry(world);
        self.commit();
        let Some(event) = self.log.pop_redo().cloned() else {
            return false;
        };
        replay(world, &event, false);
        self.modified = true;
        log::info!("Redo {:?}, {} sub events", event.kind(), event.len());
        true
    }

    /// Drop palette objects, the player and all history
    fn reset(&mut self, world: &mut World) {
        self.carry = None;
        self.left_held_last = false;
        self.right_held_last = false;
        self.log.clear();
        world.clear_map();
        world.store.destroy_all_of_type(ObjectKind::Player);
        world.store.destroy_all_of_type(ObjectKind::Blood);
        world.player.player = None;
    }

    /// Replace the map with the starter layout: three blocks and a start
    pub fn new_map(&mut self, world: &mut World) {
        self.reset(world);
        world.apply_flags(&Default::default());
        for x in [352.0, 384.0, 416.0] {
            world.create(x, 416.0, ObjectKind::Block);
        }
        world.create(384.0, 384.0, ObjectKind::PlayerStart);
        self.modified = false;
        log::info!("New map");
    }

    /// Replace the map with `map`. A valid save point in the file wins over
    /// the one the player start records.
    pub fn load_map(&mut self, world: &mut World, map: &MapData) {
        self.reset(world);
        world.apply_flags(&map.flags);
        for p in &map.placements {
            if !p.kind.in_palette() {
                log::warn!("Skipping non-palette {:?} at ({}, {})", p.kind, p.x, p.y);
                continue;
            }
            world.create(p.x, p.y, p.kind);
        }

        let save = map.flags.save;
        if save.x >= 0.0 || save.y >= 0.0 {
            world.player.current_save = save;
        }
        if world.player.has_save() {
            world.load_player();
        }
        self.modified = false;
        log::info!("Loaded map with {} objects", map.placements.len());
    }

    pub fn capture_map(&self, world: &World) -> MapData {
        MapData {
            flags: world.read_flags(),
            placements: world.palette_placements(),
        }
    }
}

/// Apply a committed event to the world, inverted for undo
fn replay(world: &mut World, event: &UndoEvent, inverse: bool) {
    let mut missed = 0;
    match event {
        UndoEvent::Create(list) | UndoEvent::Remove(list) => {
            let destroy = matches!(event, UndoEvent::Create(_)) == inverse;
            for p in list {
                if !destroy {
                    world.create(p.x, p.y, p.kind);
                    continue;
                }
                let found = world.store.at_position(p.x, p.y, Some(p.kind));
                if found.is_empty() {
                    missed += 1;
                }
                for id in found {
                    world.destroy(id);
                }
            }
        }
        UndoEvent::Move(list) => {
            for r in list {
                let ((fx, fy), (tx, ty)) = if inverse {
                    ((r.new_x, r.new_y), (r.old_x, r.old_y))
                } else {
                    ((r.old_x, r.old_y), (r.new_x, r.new_y))
                };
                let found = world.store.at_position(fx, fy, Some(r.kind));
                if found.is_empty() {
                    missed += 1;
                }
                for id in found {
                    if let Some(obj) = world.store.get_mut(id) {
                        obj.set_position(tx, ty);
                        obj.compute_bounding_box();
                    }
                }
            }
        }
    }
    if missed > 0 {
        log::warn!("{} of {} sub events matched no object", missed, event.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ButtonState, MouseState};
    use crate::sprite::SpriteBank;
    use std::rc::Rc;

    fn world() -> World {
        World::with_seed(Rc::new(SpriteBank::builtin()), 7)
    }

    fn mouse(x: f32, y: f32, left: (bool, bool), right: (bool, bool)) -> MouseState {
        MouseState {
            x,
            y,
            left: ButtonState::from_edges(left.0, left.1),
            right: ButtonState::from_edges(right.0, right.1),
            scroll: 0.0,
            inside: true,
        }
    }

    fn left(x: f32, y: f32, now: bool, before: bool) -> InputSnapshot {
        InputSnapshot::new().with_mouse(mouse(x, y, (now, before), (false, false)))
    }

    fn right(x: f32, y: f32, now: bool, before: bool) -> InputSnapshot {
        InputSnapshot::new().with_mouse(mouse(x, y, (false, false), (now, before)))
    }

    fn contents(world: &World) -> Vec<(i32, i32, ObjectKind)> {
        let mut v: Vec<_> = world
            .palette_placements()
            .into_iter()
            .map(|p| (p.x as i32, p.y as i32, p.kind))
            .collect();
        v.sort();
        v
    }

    #[test]
    fn test_paint_drag_is_one_transaction() {
        let mut w = world();
        let mut ed = EditEngine::new();

        ed.update(&mut w, &left(0.0, 0.0, true, false));
        ed.update(&mut w, &left(96.0, 0.0, true, true));
        ed.update(&mut w, &left(96.0, 0.0, false, true));

        assert_eq!(w.store.count(ObjectKind::Block), 4);
        for x in [0.0, 32.0, 64.0, 96.0] {
            assert_eq!(w.store.at_position(x, 0.0, Some(ObjectKind::Block)).len(), 1);
        }
        assert_eq!(ed.undo_log().undo_len(), 1);
        assert!(ed.is_modified());

        assert!(ed.undo(&mut w));
        assert_eq!(w.store.count(ObjectKind::Block), 0);
    }

    #[test]
    fn test_paint_skips_occupied_cells() {
        let mut w = world();
        let mut ed = EditEngine::new();
        w.create(32.0, 0.0, ObjectKind::Block);

        ed.update(&mut w, &left(10.0, 10.0, true, false));
        ed.update(&mut w, &left(50.0, 10.0, true, true));
        ed.update(&mut w, &left(50.0, 10.0, false, true));

        assert_eq!(w.store.count(ObjectKind::Block), 2);
        assert_eq!(ed.undo_log().undo_len(), 1);
    }

    #[test]
    fn test_drag_move_undo_redo() {
        let mut w = world();
        let mut ed = EditEngine::new();
        ed.try_create(&mut w, 32.0, 32.0);
        ed.commit();

        let drag = |input: InputSnapshot| input.with_hold(Key::DragTool);
        ed.update(&mut w, &drag(left(40.0, 40.0, true, false)));
        ed.update(&mut w, &drag(left(70.0, 70.0, true, true)));
        ed.update(&mut w, &drag(left(70.0, 70.0, false, true)));

        assert_eq!(w.store.at_position(64.0, 64.0, Some(ObjectKind::Block)).len(), 1);
        assert_eq!(ed.undo_log().undo_len(), 2);

        ed.undo(&mut w);
        assert_eq!(w.store.at_position(32.0, 32.0, Some(ObjectKind::Block)).len(), 1);
        assert!(w.store.at_position(64.0, 64.0, None).is_empty());

        ed.redo(&mut w);
        assert_eq!(w.store.at_position(64.0, 64.0, Some(ObjectKind::Block)).len(), 1);
        assert!(w.store.collision_point(70.0, 70.0, Some(ObjectKind::Block)).is_some());
    }

    #[test]
    fn test_drag_back_to_start_records_nothing() {
        let mut w = world();
        let mut ed = EditEngine::new();
        w.create(32.0, 32.0, ObjectKind::Block);

        let drag = |input: InputSnapshot| input.with_hold(Key::DragTool);
        ed.update(&mut w, &drag(left(40.0, 40.0, true, false)));
        ed.update(&mut w, &drag(left(70.0, 40.0, true, true)));
        ed.update(&mut w, &drag(left(40.0, 40.0, true, true)));
        ed.update(&mut w, &drag(left(40.0, 40.0, false, true)));

        assert!(!ed.can_undo());
        assert!(!ed.is_modified());
    }

    #[test]
    fn test_commit_undo_redo_restores_contents() {
        let mut w = world();
        let mut ed = EditEngine::new();
        ed.try_create(&mut w, 0.0, 0.0);
        ed.set_selected(ObjectKind::SpikeUp);
        ed.try_create(&mut w, 32.0, 64.0);
        ed.try_create(&mut w, 96.0, 64.0);
        ed.commit();
        let after_commit = contents(&w);

        ed.undo(&mut w);
        assert!(contents(&w).is_empty());
        ed.redo(&mut w);
        assert_eq!(contents(&w), after_commit);
    }

    #[test]
    fn test_erase_then_undo() {
        let mut w = world();
        let mut ed = EditEngine::new();
        for x in [0.0, 32.0, 64.0] {
            w.create(x, 0.0, ObjectKind::Block);
        }
        w.create(384.0, 384.0, ObjectKind::PlayerStart);

        ed.update(&mut w, &right(10.0, 10.0, true, false));
        assert_eq!(w.store.count(ObjectKind::Block), 2);
        ed.update(&mut w, &right(90.0, 10.0, true, true));
        ed.update(&mut w, &right(390.0, 390.0, true, true));
        ed.update(&mut w, &right(390.0, 390.0, false, true));

        assert_eq!(w.store.count(ObjectKind::Block), 0);
        assert_eq!(w.store.count(ObjectKind::PlayerStart), 1);
        assert_eq!(ed.undo_log().undo_len(), 1);

        ed.undo(&mut w);
        assert_eq!(w.store.count(ObjectKind::Block), 3);
    }

    #[test]
    fn test_picker_selects_topmost() {
        let mut w = world();
        let mut ed = EditEngine::new();
        w.create(0.0, 0.0, ObjectKind::Block);
        w.create(0.0, 0.0, ObjectKind::Water);

        let input = left(10.0, 10.0, true, false).with_hold(Key::Picker);
        ed.update(&mut w, &input);

        assert_eq!(ed.selected(), ObjectKind::Water);
        assert!(ed.preview().is_none());
        assert_eq!(w.store.count(ObjectKind::Water), 1);
    }

    #[test]
    fn test_leaving_area_commits_gesture() {
        let mut w = world();
        let mut ed = EditEngine::new();

        ed.update(&mut w, &left(0.0, 0.0, true, false));
        assert!(ed.undo_log().has_open());

        let mut outside = left(900.0, 0.0, true, true);
        outside.mouse.inside = false;
        ed.update(&mut w, &outside);
        assert!(!ed.undo_log().has_open());
        assert_eq!(ed.undo_log().undo_len(), 1);

        // Coming back while still held does not paint a line from the exit point
        ed.update(&mut w, &left(96.0, 0.0, true, true));
        assert_eq!(w.store.count(ObjectKind::Block), 1);
    }

    #[test]
    fn test_preview_follows_snapped_cursor() {
        let mut w = world();
        let mut ed = EditEngine::new();
        ed.update(&mut w, &left(45.0, 70.0, false, false));
        assert_eq!(ed.preview(), Some(Preview { x: 32.0, y: 64.0, kind: ObjectKind::Block }));
    }

    #[test]
    fn test_undo_with_no_matching_object_still_moves_stacks() {
        let mut w = world();
        let mut ed = EditEngine::new();
        let id = ed.try_create(&mut w, 64.0, 64.0).unwrap();
        ed.commit();

        // Removed behind the log's back
        w.destroy(id);
        w.sweep();

        assert!(ed.undo(&mut w));
        assert!(ed.can_redo());
        assert!(!ed.can_undo());
        assert_eq!(w.store.count(ObjectKind::Block), 0);

        assert!(ed.redo(&mut w));
        assert!(ed.can_undo());
        assert_eq!(w.store.count(ObjectKind::Block), 1);
    }

    #[test]
    fn test_undo_with_empty_stack_is_noop() {
        let mut w = world();
        let mut ed = EditEngine::new();
        assert!(!ed.undo(&mut w));
        assert!(!ed.redo(&mut w));
        assert!(!ed.is_modified());
    }

    #[test]
    fn test_new_map_and_capture() {
        let mut w = world();
        let mut ed = EditEngine::new();
        ed.try_create(&mut w, 0.0, 0.0);
        ed.commit();

        ed.new_map(&mut w);
        assert!(!ed.can_undo());
        assert!(!ed.is_modified());
        assert_eq!(w.store.count(ObjectKind::Block), 3);
        assert_eq!(w.store.count(ObjectKind::PlayerStart), 1);
        assert_eq!(w.store.count(ObjectKind::Player), 1);

        let map = ed.capture_map(&w);
        let mut other = world();
        let mut ed2 = EditEngine::new();
        ed2.load_map(&mut other, &map);
        assert_eq!(contents(&other), contents(&w));
        assert_eq!(other.read_flags(), w.read_flags());
    }
}
