//! Per-kind hooks
//!
//! `init` sets kind defaults on a fresh object before it is stored.
//! `on_create`, `step` and `after_movement` run against the whole world and
//! dispatch on the object's kind; kinds without a hook fall through.

use rand::Rng;
use crate::input::Key;
use super::kind::ObjectKind;
use super::object::{GameObject, ObjectState, PlayerBody, WHITE};
use super::player::SaveType;
use super::store::ObjectId;
use super::{World, ROOM_HEIGHT, ROOM_WIDTH};

pub const PLAYER_GRAVITY: f32 = 0.4;
pub const JUMP: f32 = 8.5;
pub const DOUBLE_JUMP: f32 = 7.0;
pub const MAX_HSPEED: f32 = 3.0;
pub const MAX_VSPEED: f32 = 9.0;
/// Vertical speed kept when jump is released mid-rise
pub const JUMP_CUT: f32 = 0.45;
pub const MAX_BULLETS: usize = 4;
pub const BULLET_SPEED: f32 = 16.0;
pub const BULLET_LIFETIME: i32 = 40;
pub const BLOOD_COUNT: usize = 200;
pub const SAVE_COOLDOWN: i32 = 30;
pub const SAVE_LIT: i32 = 59;
pub const REFRESHER_COOLDOWN: u32 = 100;
pub const HIGHLIGHT_FRAMES: u32 = 10;

const HIGHLIGHT_TINT: [u8; 4] = [255, 204, 204, 255];
const DIMMED_TINT: [u8; 4] = [255, 255, 255, 26];

/// Kind defaults applied at creation, before any hook sees the object
pub(crate) fn init(obj: &mut GameObject) {
    use ObjectKind::*;

    obj.depth = match obj.kind() {
        Player => -10,
        Block | MiniBlock | Save => 1,
        Platform => 10,
        Water | Water2 | Water3 => -50,
        WalljumpL | WalljumpR | PlayerBullet => -1,
        Blood => -5,
        _ => 0,
    };

    match obj.kind() {
        Player => {
            obj.gravity = PLAYER_GRAVITY;
            obj.state = ObjectState::Player(PlayerBody { on_platform: false, djump: true });
        }
        Apple => {
            obj.image_speed = 1.0 / 15.0;
            obj.state = ObjectState::Killer { highlight: 0 };
        }
        kind if kind.is_a(Killer) => obj.state = ObjectState::Killer { highlight: 0 },
        Save => {
            obj.image_speed = 0.0;
            obj.state = ObjectState::Save { cooldown: 0, lit: 0, can_save: true };
        }
        JumpRefresher => obj.state = ObjectState::JumpRefresher { cooldown: 0 },
        Blood => {
            obj.image_speed = 0.0;
            obj.x_scale = 1.5;
            obj.y_scale = 1.5;
        }
        PlayerBullet => {
            obj.image_speed = 1.0;
            obj.state = ObjectState::Bullet { lifetime: BULLET_LIFETIME };
        }
        _ => {}
    }
}

pub(crate) fn on_create(world: &mut World, id: ObjectId) {
    let Some(kind) = world.store.get(id).map(|o| o.kind()) else {
        return;
    };

    match kind {
        ObjectKind::Player => {
            let mask = player_mask_name(world);
            world.set_mask(id, mask);
            let grav = world.player.grav;
            if let Some(obj) = world.store.get_mut(id) {
                obj.gravity = PLAYER_GRAVITY * grav;
            }
            world.player.player = Some(id);
        }
        ObjectKind::Blood => {
            let grav = world.player.grav;
            let image_index = world.rng.gen::<f32>() * 2.0;
            let gravity = (0.1 + world.rng.gen::<f32>() * 0.2) * grav;
            let direction = world.rng.gen::<f32>() * 360.0;
            let speed = world.rng.gen::<f32>() * 6.0;
            if let Some(obj) = world.store.get_mut(id) {
                obj.image_index = image_index;
                obj.gravity = gravity;
                obj.set_direction(direction);
                obj.set_speed(speed);
            }
        }
        ObjectKind::PlayerStart => {
            let others: Vec<ObjectId> = world
                .store
                .query(Some(ObjectKind::PlayerStart))
                .iter()
                .copied()
                .filter(|&other| other != id)
                .collect();
            for other in others {
                world.store.destroy(other);
            }
            world.store.destroy_all_of_type(ObjectKind::Player);
            world.store.destroy_all_of_type(ObjectKind::Blood);

            let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
                return;
            };
            world.create(x + 17.0, y + 23.0, ObjectKind::Player);
            world.save_player();
        }
        _ => {}
    }
}

pub(crate) fn step(world: &mut World, id: ObjectId) {
    let Some(kind) = world.store.get(id).map(|o| o.kind()) else {
        return;
    };

    match kind {
        ObjectKind::Player => player_step(world, id),
        ObjectKind::Save => save_step(world, id),
        ObjectKind::JumpRefresher => {
            if let Some(obj) = world.store.get_mut(id) {
                if let ObjectState::JumpRefresher { cooldown } = &mut obj.state {
                    *cooldown = cooldown.saturating_sub(1);
                    obj.tint = if *cooldown == 0 { WHITE } else { DIMMED_TINT };
                }
            }
        }
        ObjectKind::PlayerBullet => bullet_step(world, id),
        kind if kind.is_a(ObjectKind::Killer) => {
            if let Some(obj) = world.store.get_mut(id) {
                if let ObjectState::Killer { highlight } = &mut obj.state {
                    if *highlight > 0 {
                        *highlight -= 1;
                        obj.tint = HIGHLIGHT_TINT;
                    } else {
                        obj.tint = WHITE;
                    }
                }
            }
        }
        _ => {}
    }
}

pub(crate) fn after_movement(world: &mut World, id: ObjectId) {
    let Some(kind) = world.store.get(id).map(|o| o.kind()) else {
        return;
    };

    match kind {
        ObjectKind::Player => player_after_movement(world, id),
        ObjectKind::Blood => {
            let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
                return;
            };
            if world.store.place_meeting(id, x, y, Some(ObjectKind::Block)) {
                let Some((direction, speed)) = world.store.get_mut(id).map(|o| {
                    o.restore_previous();
                    (o.direction(), o.speed())
                }) else {
                    return;
                };
                world.store.move_contact(id, direction, speed, Some(ObjectKind::Block));
                if let Some(o) = world.store.get_mut(id) {
                    o.set_hspeed(0.0);
                    o.set_vspeed(0.0);
                    o.gravity = 0.0;
                }
            }
        }
        _ => {}
    }
}

/// Mask the player should use for the current dot-kid and gravity settings
fn player_mask_name(world: &World) -> &'static str {
    if world.player.dotkid {
        "dotkid"
    } else if world.player.grav > 0.0 {
        "player_mask"
    } else {
        "player_mask_flip"
    }
}

fn body(world: &World, id: ObjectId) -> PlayerBody {
    match world.store.get(id).map(|o| o.state) {
        Some(ObjectState::Player(body)) => body,
        _ => PlayerBody { on_platform: false, djump: true },
    }
}

fn set_body(world: &mut World, id: ObjectId, body: PlayerBody) {
    if let Some(obj) = world.store.get_mut(id) {
        obj.state = ObjectState::Player(body);
    }
}

fn player_step(world: &mut World, id: ObjectId) {
    let mask = player_mask_name(world);
    world.set_mask(id, mask);

    let g = world.player.grav;
    let input = world.input.clone();
    let mut body = body(world, id);

    let h = if input.held(Key::Right) {
        1.0
    } else if input.held(Key::Left) {
        -1.0
    } else {
        0.0
    };
    if h != 0.0 {
        world.player.face = h;
    }

    let Some(obj) = world.store.get_mut(id) else {
        return;
    };
    obj.image_speed = if h != 0.0 { 0.5 } else { 0.2 };
    obj.set_hspeed(MAX_HSPEED * h);
    let (x, y) = obj.position();

    let store = &world.store;
    let meets = |dx: f32, dy: f32, kind: ObjectKind| store.place_meeting(id, x + dx, y + dy, Some(kind));

    if !meets(0.0, 4.0 * g, ObjectKind::Platform) {
        body.on_platform = false;
    }

    let water = meets(0.0, 0.0, ObjectKind::Water);
    let water2 = meets(0.0, 0.0, ObjectKind::Water2);
    let water3 = meets(0.0, 0.0, ObjectKind::Water3);
    let on_ground = meets(0.0, g, ObjectKind::Block);
    let on_platform_below = meets(0.0, g, ObjectKind::Platform);
    let on_vine_l = meets(-1.0, 0.0, ObjectKind::WalljumpL) && !on_ground;
    let on_vine_r = meets(1.0, 0.0, ObjectKind::WalljumpR) && !on_ground;
    let bullets = store.count(ObjectKind::PlayerBullet);

    let mut vspeed = store.get(id).map_or(0.0, |o| o.vspeed());
    let mut hspeed = MAX_HSPEED * h;

    if vspeed.abs() > MAX_VSPEED {
        vspeed = vspeed.signum() * MAX_VSPEED;
    }

    if water || water2 || water3 {
        vspeed = (vspeed * g).min(2.0) * g;
        if !water2 {
            body.djump = true;
        }
    }

    if input.pressed(Key::Shoot) && bullets < MAX_BULLETS {
        let by = if world.player.dotkid { y + 6.0 } else { y };
        let face = world.player.face;
        let bullet = world.create(x, by, ObjectKind::PlayerBullet);
        if let Some(b) = world.store.get_mut(bullet) {
            b.set_hspeed(face * BULLET_SPEED);
        }
    }

    if input.pressed(Key::Jump) {
        if on_ground || on_platform_below || body.on_platform || water {
            vspeed = -JUMP * g;
            body.djump = true;
        } else if body.djump || water2 || world.player.infjump {
            vspeed = -DOUBLE_JUMP * g;
            body.djump = water3;
        }
    }

    if input.released(Key::Jump) && vspeed * g < 0.0 {
        vspeed *= JUMP_CUT;
    }

    if on_vine_l || on_vine_r {
        world.player.face = if on_vine_l { 1.0 } else { -1.0 };
        vspeed = 2.0 * g;

        // Kick off by pressing away from the wall
        let away = (on_vine_l && input.pressed(Key::Right)) || (on_vine_r && input.pressed(Key::Left));
        if away {
            let dir = if on_vine_r { -1.0 } else { 1.0 };
            if input.held(Key::Jump) {
                hspeed = 15.0 * dir;
                vspeed = -9.0 * g;
            } else {
                hspeed = 3.0 * dir;
            }
        }
    }

    if on_ground {
        if input.pressed(Key::NudgeLeft) {
            hspeed = -1.0;
        }
        if input.pressed(Key::NudgeRight) {
            hspeed = 1.0;
        }
    }

    if let Some(obj) = world.store.get_mut(id) {
        obj.set_hspeed(hspeed);
        obj.set_vspeed(vspeed);
    }
    set_body(world, id, body);
}

fn player_after_movement(world: &mut World, id: ObjectId) {
    let g = world.player.grav;
    let mut body = body(world, id);
    let block = Some(ObjectKind::Block);

    let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
        return;
    };

    if world.store.place_meeting(id, x, y, block) {
        let Some((mut hspeed, mut vspeed)) = world.store.get_mut(id).map(|o| {
            o.restore_previous();
            (o.hspeed(), o.vspeed())
        }) else {
            return;
        };
        let pos = |world: &World| world.store.get(id).map_or((x, y), |o| o.position());

        let (px, py) = pos(world);
        if world.store.place_meeting(id, px + hspeed, py, block) {
            let leftwards = if g > 0.0 { hspeed <= 0.0 } else { hspeed < 0.0 };
            let dir = if leftwards { 180.0 } else { 0.0 };
            world.store.move_contact(id, dir, hspeed.abs(), block);
            hspeed = 0.0;
        }

        let (px, py) = pos(world);
        if world.store.place_meeting(id, px, py + vspeed, block) {
            let dir = if vspeed <= 0.0 { 90.0 } else { 270.0 };
            world.store.move_contact(id, dir, vspeed.abs(), block);
            // Landing on the floor the current gravity points at
            let landed = if g > 0.0 { vspeed > 0.0 } else { vspeed <= 0.0 };
            if landed {
                body.djump = true;
            }
            vspeed = 0.0;
        }

        let (px, py) = pos(world);
        if world.store.place_meeting(id, px + hspeed, py + vspeed, block) {
            hspeed = 0.0;
        }

        if let Some(obj) = world.store.get_mut(id) {
            obj.set_hspeed(hspeed);
            obj.set_vspeed(vspeed);
            obj.x += hspeed;
            obj.y += vspeed;
        }
    }

    let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
        return;
    };

    // One-way platforms only catch a player coming from the gravity side
    if let Some(pf) = world.store.instance_place(id, x, y, Some(ObjectKind::Platform)) {
        let (pf_y, pf_h) = world
            .store
            .get(pf)
            .map(|p| (p.y, p.mask().map_or(0.0, |m| m.frame(0.0).height as f32)))
            .unwrap_or((0.0, 0.0));
        if let Some(obj) = world.store.get_mut(id) {
            let vspeed = obj.vspeed();
            let landing = if g > 0.0 {
                obj.y - vspeed / 2.0 <= pf_y
            } else {
                obj.y - vspeed / 2.0 >= pf_y + pf_h - 1.0
            };
            if landing {
                obj.y = if g > 0.0 { pf_y - 9.0 } else { pf_y + pf_h + 8.0 };
                obj.set_vspeed(0.0);
                body.on_platform = true;
                body.djump = true;
            }
        }
    }

    let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
        return;
    };

    // Touching a refresher always restores the double jump and restarts its cooldown
    if let Some(jr) = world.store.instance_place(id, x, y, Some(ObjectKind::JumpRefresher)) {
        body.djump = true;
        if let Some(refresher) = world.store.get_mut(jr) {
            if let ObjectState::JumpRefresher { cooldown } = &mut refresher.state {
                *cooldown = REFRESHER_COOLDOWN;
            }
        }
    }

    set_body(world, id, body);

    let flip_up = g > 0.0 && world.store.place_meeting(id, x, y, Some(ObjectKind::GravityArrowUp));
    let flip_down = g < 0.0 && world.store.place_meeting(id, x, y, Some(ObjectKind::GravityArrowDown));
    if flip_up || flip_down {
        flip_gravity(world, id);
    }

    let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
        return;
    };

    if let Some(killer) = world.store.instance_place(id, x, y, Some(ObjectKind::Killer)) {
        if let Some(k) = world.store.get_mut(killer) {
            k.state = ObjectState::Killer { highlight: HIGHLIGHT_FRAMES };
            k.tint = HIGHLIGHT_TINT;
        }
        if world.player.death_enable {
            kill_player(world, id);
            return;
        }
    }

    if x < 0.0 || x > ROOM_WIDTH || y < 0.0 || y > ROOM_HEIGHT {
        kill_player(world, id);
    }
}

fn flip_gravity(world: &mut World, id: ObjectId) {
    world.player.grav = -world.player.grav;
    let g = world.player.grav;

    if !world.player.dotkid {
        let mask = player_mask_name(world);
        world.set_mask(id, mask);
    }

    let mut body = body(world, id);
    body.djump = true;
    set_body(world, id, body);

    if let Some(obj) = world.store.get_mut(id) {
        obj.gravity = PLAYER_GRAVITY * g;
        obj.set_vspeed(0.0);
        obj.y += 4.0 * g;
    }
    log::debug!("Gravity flipped to {}", g);
}

/// Burst into blood and remove the player
pub fn kill_player(world: &mut World, id: ObjectId) {
    let Some((x, y)) = world.store.get(id).map(|o| o.position()) else {
        return;
    };
    for _ in 0..BLOOD_COUNT {
        world.create(x, y, ObjectKind::Blood);
    }
    world.store.destroy(id);
    if world.player.player == Some(id) {
        world.player.player = None;
    }
    log::info!("Player died at ({}, {})", x, y);
}

fn save_step(world: &mut World, id: ObjectId) {
    let Some(obj) = world.store.get_mut(id) else {
        return;
    };
    let ObjectState::Save { mut cooldown, mut lit, mut can_save } = obj.state else {
        return;
    };

    if cooldown > 0 {
        cooldown -= 1;
        if cooldown == 0 {
            can_save = true;
        }
    }
    if lit > 0 {
        lit -= 1;
        if lit == 0 {
            obj.image_index = 0.0;
        }
    }
    let (x, y) = obj.position();

    let shoot = world.input.pressed(Key::Shoot);
    let touched = world.store.place_meeting(id, x, y, Some(ObjectKind::Player));
    let shot = world.player.save_type == SaveType::ShootOrBullet
        && world.store.place_meeting(id, x, y, Some(ObjectKind::PlayerBullet));

    let saving = can_save && ((touched && shoot) || shot);
    if saving {
        cooldown = SAVE_COOLDOWN;
        lit = SAVE_LIT;
        can_save = false;
    }

    if let Some(obj) = world.store.get_mut(id) {
        obj.state = ObjectState::Save { cooldown, lit, can_save };
        if saving {
            obj.image_index = 1.0;
        }
    }
    if saving {
        world.save_player();
    }
}

fn bullet_step(world: &mut World, id: ObjectId) {
    let Some(obj) = world.store.get_mut(id) else {
        return;
    };
    let expired = match &mut obj.state {
        ObjectState::Bullet { lifetime } => {
            *lifetime -= 1;
            *lifetime <= 0
        }
        _ => false,
    };
    let (x, y) = obj.position();

    let blocked = expired
        || x < 0.0
        || x > ROOM_WIDTH
        || world.store.place_meeting(id, x, y, Some(ObjectKind::Block))
        || world.store.place_meeting(id, x, y, Some(ObjectKind::BulletBlocker));
    if blocked {
        world.store.destroy(id);
    }
}
