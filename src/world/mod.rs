//! World - objects, collision and the frame step
//!
//! - `ObjectKind`: closed taxonomy with a parent/children table
//! - `GameObject`: transform, motion and per-pixel collision
//! - `ObjectStore`: generational arena, per-kind pools, deferred destruction
//! - `World`: the store plus player state, this frame's input and an rng,
//!   passed to every behavior hook

mod behavior;
mod collision;
mod kind;
mod line;
mod object;
mod player;
mod store;

pub use behavior::kill_player;
pub use kind::*;
pub use line::*;
pub use object::*;
pub use player::*;
pub use store::*;

use std::rc::Rc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use crate::input::{InputSnapshot, Key};
use crate::sprite::SpriteSource;

pub const ROOM_WIDTH: f32 = 800.0;
pub const ROOM_HEIGHT: f32 = 608.0;

/// A palette object as stored in maps and undo events
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f32,
    pub y: f32,
    pub kind: ObjectKind,
}

impl Placement {
    pub fn new(x: f32, y: f32, kind: ObjectKind) -> Self {
        Self { x, y, kind }
    }
}

pub struct World {
    pub store: ObjectStore,
    pub player: PlayerState,
    /// Input for the current frame, replaced by the front end before `tick`
    pub input: InputSnapshot,
    rng: StdRng,
}

impl World {
    pub fn new(sprites: Rc<dyn SpriteSource>) -> Self {
        Self::with_rng(sprites, StdRng::from_entropy())
    }

    /// Deterministic world for tests and replays
    pub fn with_seed(sprites: Rc<dyn SpriteSource>, seed: u64) -> Self {
        Self::with_rng(sprites, StdRng::seed_from_u64(seed))
    }

    fn with_rng(sprites: Rc<dyn SpriteSource>, rng: StdRng) -> Self {
        Self {
            store: ObjectStore::new(sprites),
            player: PlayerState::new(),
            input: InputSnapshot::new(),
            rng,
        }
    }

    /// Create an object and run its kind's create hook
    pub fn create(&mut self, x: f32, y: f32, kind: ObjectKind) -> ObjectId {
        let id = self.store.create(x, y, kind);
        behavior::on_create(self, id);
        id
    }

    pub fn destroy(&mut self, id: ObjectId) -> bool {
        self.store.destroy(id)
    }

    /// Swap an object's mask for a named one; unknown names keep the old mask
    pub fn set_mask(&mut self, id: ObjectId, name: &str) {
        if self.store.get(id).and_then(|o| o.mask()).map_or(false, |m| m.name == name) {
            return;
        }
        let Some(mask) = self.store.sprites().named(name) else {
            log::warn!("Unknown sprite {}", name);
            return;
        };
        if let Some(obj) = self.store.get_mut(id) {
            obj.set_mask(Some(mask));
            obj.compute_bounding_box();
        }
    }

    /// Run one step over a snapshot of the current objects. Objects created
    /// during the pass wait for the next one; destroyed objects are skipped.
    pub fn step(&mut self) {
        let ids = self.store.ids().to_vec();
        for id in ids {
            if !self.store.is_alive(id) {
                continue;
            }

            if let Some(obj) = self.store.get_mut(id) {
                obj.begin_step();
            }
            behavior::step(self, id);

            let Some(obj) = self.store.get_mut(id) else {
                continue;
            };
            if obj.is_destroyed() {
                continue;
            }
            obj.advance_frame();
            obj.integrate();
            obj.compute_bounding_box();

            behavior::after_movement(self, id);
            if let Some(obj) = self.store.get_mut(id) {
                obj.compute_bounding_box();
            }
        }
    }

    /// Frame logic: restart key, then the step pass. The caller draws and
    /// then calls `sweep`.
    pub fn tick(&mut self) {
        if self.input.pressed(Key::Restart) {
            self.load_player();
        }
        self.step();
    }

    pub fn sweep(&mut self) -> usize {
        self.store.sweep()
    }

    /// Record the live player's position as the respawn point
    pub fn save_player(&mut self) {
        let Some(obj) = self.player.player.and_then(|id| self.store.get(id)) else {
            return;
        };
        if obj.is_destroyed() {
            return;
        }
        self.player.current_save = PlayerSave {
            x: obj.x,
            y: obj.y,
            face: self.player.face,
            grav: self.player.grav,
        };
        log::info!("Player saved at ({}, {})", obj.x, obj.y);
    }

    /// Respawn the player at the save point
    pub fn load_player(&mut self) {
        self.store.destroy_all_of_type(ObjectKind::Player);
        self.store.destroy_all_of_type(ObjectKind::Blood);
        self.player.player = None;

        if !self.player.has_save() {
            log::warn!("No save point to respawn at");
            return;
        }

        let save = self.player.current_save;
        self.player.grav = save.grav;
        self.player.face = save.face;
        self.create(save.x, save.y, ObjectKind::Player);
        log::info!("Player loaded at ({}, {})", save.x, save.y);
    }

    /// Replace the room border. `Solid` walls the room in with border blocks.
    pub fn set_death_border(&mut self, border: DeathBorder) {
        self.player.death_border = border;
        self.store.destroy_all_of_type(ObjectKind::BorderBlock);

        if border == DeathBorder::Solid {
            let walls = [
                (-32.0, 0.0, 1.0, 19.0),
                (ROOM_WIDTH, 0.0, 1.0, 19.0),
                (0.0, -32.0, 25.0, 1.0),
                (0.0, ROOM_HEIGHT, 25.0, 1.0),
            ];
            for (x, y, xs, ys) in walls {
                let id = self.create(x, y, ObjectKind::BorderBlock);
                if let Some(obj) = self.store.get_mut(id) {
                    obj.x_scale = xs;
                    obj.y_scale = ys;
                    obj.compute_bounding_box();
                }
            }
        }
    }

    pub fn apply_flags(&mut self, flags: &MapFlags) {
        self.player.infjump = flags.infjump;
        self.player.dotkid = flags.dotkid;
        self.player.save_type = flags.save_type;
        self.player.death_enable = flags.death_enable;
        self.player.current_save = flags.save;
        self.set_death_border(flags.death_border);
    }

    pub fn read_flags(&self) -> MapFlags {
        MapFlags {
            infjump: self.player.infjump,
            dotkid: self.player.dotkid,
            save_type: self.player.save_type,
            death_border: self.player.death_border,
            death_enable: self.player.death_enable,
            save: self.player.current_save,
        }
    }

    /// Live palette objects in insertion order
    pub fn palette_placements(&self) -> Vec<Placement> {
        self.store
            .iter()
            .filter(|(_, o)| !o.is_destroyed() && o.kind().in_palette())
            .map(|(_, o)| Placement::new(o.x, o.y, o.kind()))
            .collect()
    }

    /// Flag every palette object for removal
    pub fn clear_map(&mut self) {
        let ids: Vec<ObjectId> = self
            .store
            .iter()
            .filter(|(_, o)| o.kind().in_palette())
            .map(|(id, _)| id)
            .collect();
        for id in ids {
            self.store.destroy(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::SpriteBank;

    fn world() -> World {
        World::with_seed(Rc::new(SpriteBank::builtin()), 1)
    }

    #[test]
    fn test_step_records_previous_and_moves() {
        let mut w = world();
        let b = w.create(400.0, 100.0, ObjectKind::PlayerBullet);
        w.store.get_mut(b).unwrap().set_hspeed(16.0);
        w.step();
        assert_eq!(w.store.get(b).unwrap().x, 416.0);
        assert_eq!(w.store.get(b).unwrap().x_previous, 400.0);
    }

    #[test]
    fn test_step_skips_destroyed() {
        let mut w = world();
        let b = w.create(400.0, 100.0, ObjectKind::PlayerBullet);
        w.store.get_mut(b).unwrap().set_hspeed(16.0);
        w.destroy(b);
        w.step();
        assert_eq!(w.store.get(b).unwrap().x, 400.0);
    }

    #[test]
    fn test_objects_created_mid_step_wait_for_next_pass() {
        let mut w = world();
        let p = w.create(400.0, 300.0, ObjectKind::Player);
        let spawn_x = w.store.get(p).unwrap().x;

        w.input = InputSnapshot::new().with_press(Key::Shoot);
        w.tick();
        w.input = InputSnapshot::new();

        let bullets = w.store.query(Some(ObjectKind::PlayerBullet)).to_vec();
        assert_eq!(bullets.len(), 1);
        let bullet = w.store.get(bullets[0]).unwrap();
        assert_eq!(bullet.x, spawn_x);
        assert_eq!(bullet.hspeed().abs(), behavior::BULLET_SPEED);

        w.tick();
        let bullet = w.store.get(bullets[0]).unwrap();
        assert_eq!((bullet.x - spawn_x).abs(), behavior::BULLET_SPEED);
    }

    #[test]
    fn test_solid_border() {
        let mut w = world();
        w.set_death_border(DeathBorder::Solid);
        assert_eq!(w.store.count(ObjectKind::BorderBlock), 4);
        // Border blocks count as blocks
        assert!(w.store.collision_point(-10.0, 300.0, Some(ObjectKind::Block)).is_some());
        assert!(w.store.collision_point(400.0, 620.0, Some(ObjectKind::Block)).is_some());

        w.set_death_border(DeathBorder::Killer);
        assert_eq!(w.store.count(ObjectKind::BorderBlock), 0);
    }

    #[test]
    fn test_flags_round_trip() {
        let mut w = world();
        let flags = MapFlags {
            infjump: true,
            dotkid: true,
            save_type: SaveType::ShootOrBullet,
            death_border: DeathBorder::Solid,
            death_enable: false,
            save: PlayerSave { x: 100.0, y: 200.0, face: -1.0, grav: 1.0 },
        };
        w.apply_flags(&flags);
        assert_eq!(w.read_flags(), flags);
    }

    #[test]
    fn test_restart_respawns_at_save() {
        let mut w = world();
        w.create(384.0, 384.0, ObjectKind::PlayerStart);
        let first = w.player.player.unwrap();

        w.input = InputSnapshot::new().with_press(Key::Restart);
        w.tick();

        assert!(!w.store.is_alive(first));
        let p = w.player.player.unwrap();
        assert_ne!(p, first);
        assert_eq!(w.store.count(ObjectKind::Player), 1);
    }

    #[test]
    fn test_palette_placements_skip_runtime_objects() {
        let mut w = world();
        w.create(0.0, 0.0, ObjectKind::Block);
        w.create(384.0, 384.0, ObjectKind::PlayerStart);
        let gone = w.create(32.0, 0.0, ObjectKind::Water);
        w.destroy(gone);

        let placements = w.palette_placements();
        assert_eq!(
            placements,
            vec![
                Placement::new(0.0, 0.0, ObjectKind::Block),
                Placement::new(384.0, 384.0, ObjectKind::PlayerStart),
            ]
        );

        w.clear_map();
        assert!(w.palette_placements().is_empty());
        assert_eq!(w.store.count(ObjectKind::Player), 1);
    }
}
