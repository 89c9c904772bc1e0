//! Game objects
//!
//! Transform, motion and the per-pixel collision math. Angles are in degrees,
//! counter-clockwise positive, with screen y pointing down.

use std::rc::Rc;
use crate::sprite::{MaskFrame, SpriteInfo, SpriteMask};
use super::kind::ObjectKind;

/// Integer axis-aligned box, all four edges inclusive
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BBox {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl BBox {
    pub fn new(left: i32, right: i32, top: i32, bottom: i32) -> Self {
        Self { left, right, top, bottom }
    }

    pub fn intersection(&self, other: &BBox) -> Option<BBox> {
        let b = BBox {
            left: self.left.max(other.left),
            right: self.right.min(other.right),
            top: self.top.max(other.top),
            bottom: self.bottom.min(other.bottom),
        };
        (b.left <= b.right && b.top <= b.bottom).then_some(b)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x <= self.right && y >= self.top && y <= self.bottom
    }
}

/// Unit vector for a direction in degrees. Components within float noise of
/// zero are snapped so axis-aligned motion stays on integer coordinates.
pub fn unit_vector(direction: f32) -> (f32, f32) {
    let (s, c) = direction.to_radians().sin_cos();
    let clean = |v: f32| if v.abs() < 1e-6 { 0.0 } else { v };
    (clean(c), clean(-s))
}

/// Player physics flags kept between frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerBody {
    pub on_platform: bool,
    pub djump: bool,
}

/// Kind-specific state
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ObjectState {
    None,
    Player(PlayerBody),
    /// Frames left in the touched highlight
    Killer { highlight: u32 },
    Save { cooldown: i32, lit: i32, can_save: bool },
    JumpRefresher { cooldown: u32 },
    Bullet { lifetime: i32 },
}

/// RGBA display tint
pub type Tint = [u8; 4];

pub const WHITE: Tint = [255, 255, 255, 255];

#[derive(Debug, Clone)]
pub struct GameObject {
    kind: ObjectKind,

    pub x: f32,
    pub y: f32,
    /// Position at the start of the current step
    pub x_previous: f32,
    pub y_previous: f32,
    /// Negative values mirror the mask
    pub x_scale: f32,
    pub y_scale: f32,
    pub rotation: f32,

    hspeed: f32,
    vspeed: f32,
    speed: f32,
    direction: f32,

    pub gravity: f32,
    pub gravity_direction: f32,

    pub depth: i32,
    pub visible: bool,
    pub tint: Tint,

    mask: Option<Rc<SpriteMask>>,
    pub image_index: f32,
    pub image_speed: f32,

    need_destroy: bool,
    bbox: BBox,

    pub state: ObjectState,
}

impl GameObject {
    pub fn new(kind: ObjectKind, x: f32, y: f32, sprite: Option<SpriteInfo>) -> Self {
        let (mask, image_speed) = match sprite {
            Some(info) => (Some(info.mask), info.image_speed),
            None => (None, None),
        };

        Self {
            kind,
            x,
            y,
            x_previous: x,
            y_previous: y,
            x_scale: 1.0,
            y_scale: 1.0,
            rotation: 0.0,
            hspeed: 0.0,
            vspeed: 0.0,
            speed: 0.0,
            direction: 0.0,
            gravity: 0.0,
            gravity_direction: 270.0,
            depth: 0,
            visible: true,
            tint: WHITE,
            mask,
            image_index: 0.0,
            image_speed: image_speed.unwrap_or(1.0),
            need_destroy: false,
            bbox: BBox::default(),
            state: ObjectState::None,
        }
    }

    pub fn kind(&self) -> ObjectKind {
        self.kind
    }

    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn set_position(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
    }

    // Motion: hspeed/vspeed are stored; speed/direction follow them, and
    // setting either pair recomputes the other.

    pub fn hspeed(&self) -> f32 {
        self.hspeed
    }

    pub fn vspeed(&self) -> f32 {
        self.vspeed
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn direction(&self) -> f32 {
        self.direction
    }

    pub fn set_hspeed(&mut self, hspeed: f32) {
        self.hspeed = hspeed;
        self.sync_polar();
    }

    pub fn set_vspeed(&mut self, vspeed: f32) {
        self.vspeed = vspeed;
        self.sync_polar();
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
        self.sync_cartesian();
    }

    pub fn set_direction(&mut self, direction: f32) {
        self.direction = direction;
        self.sync_cartesian();
    }

    fn sync_polar(&mut self) {
        self.speed = self.hspeed.hypot(self.vspeed);
        self.direction = (-self.vspeed).atan2(self.hspeed).to_degrees();
    }

    fn sync_cartesian(&mut self) {
        let (s, c) = self.direction.to_radians().sin_cos();
        self.hspeed = self.speed * c;
        self.vspeed = -self.speed * s;
    }

    pub fn mask(&self) -> Option<&Rc<SpriteMask>> {
        self.mask.as_ref()
    }

    pub fn set_mask(&mut self, mask: Option<Rc<SpriteMask>>) {
        self.mask = mask;
    }

    /// Frame the mask shows for the current image index
    pub fn frame(&self) -> Option<&MaskFrame> {
        self.mask.as_ref().map(|m| m.frame(self.image_index))
    }

    pub fn is_destroyed(&self) -> bool {
        self.need_destroy
    }

    /// Flag for removal; the object stays in the store until the next sweep
    pub fn destroy(&mut self) {
        if !self.need_destroy {
            log::debug!("Destroyed {:?} at ({}, {})", self.kind, self.x, self.y);
        }
        self.need_destroy = true;
    }

    // Step phases, called by the world in this order

    pub(crate) fn begin_step(&mut self) {
        self.x_previous = self.x;
        self.y_previous = self.y;
    }

    pub(crate) fn advance_frame(&mut self) {
        self.image_index += self.image_speed;
    }

    /// Apply gravity along its direction, then move by the velocity
    pub(crate) fn integrate(&mut self) {
        if self.gravity != 0.0 {
            let (gx, gy) = unit_vector(self.gravity_direction);
            self.hspeed += self.gravity * gx;
            self.vspeed += self.gravity * gy;
            self.sync_polar();
        }
        self.x += self.hspeed;
        self.y += self.vspeed;
    }

    /// Roll back to the position at the start of the step
    pub fn restore_previous(&mut self) {
        self.x = self.x_previous;
        self.y = self.y_previous;
    }

    // Collision

    /// Collision view at the current position; `None` when untestable
    pub fn collider(&self) -> Option<Collider<'_>> {
        self.collider_at(self.x, self.y)
    }

    /// Collision view as if the object stood at `(x, y)`
    pub fn collider_at(&self, x: f32, y: f32) -> Option<Collider<'_>> {
        let mask = self.mask.as_deref()?;
        if self.x_scale == 0.0 || self.y_scale == 0.0 {
            return None;
        }
        Some(Collider {
            frame: mask.frame(self.image_index),
            x_origin: mask.x_origin as f32,
            y_origin: mask.y_origin as f32,
            x,
            y,
            x_scale: self.x_scale,
            y_scale: self.y_scale,
            rotation: self.rotation,
        })
    }

    /// Recompute and cache the bounding box from the current transform
    pub fn compute_bounding_box(&mut self) -> Option<BBox> {
        let bbox = self.collider()?.bounding_box()?;
        self.bbox = bbox;
        Some(bbox)
    }

    /// Box from the last `compute_bounding_box`; stale after any transform change
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn test_point(&self, px: f32, py: f32) -> bool {
        self.collider().map_or(false, |c| c.test_point(px, py))
    }

    /// Precise mask-against-mask overlap
    pub fn intersects(&self, other: &GameObject) -> bool {
        match (self.collider(), other.collider()) {
            (Some(a), Some(b)) => a.intersects(&b),
            _ => false,
        }
    }
}

/// A mask frame placed in the room with a transform
#[derive(Debug, Clone, Copy)]
pub struct Collider<'a> {
    frame: &'a MaskFrame,
    x_origin: f32,
    y_origin: f32,
    x: f32,
    y: f32,
    x_scale: f32,
    y_scale: f32,
    rotation: f32,
}

impl<'a> Collider<'a> {
    /// Conservative box around the opaque pixels; `None` for an empty frame
    pub fn bounding_box(&self) -> Option<BBox> {
        let b = self.frame.bounds()?;
        let (l, r) = (b.left as f32 - self.x_origin, b.right as f32 - self.x_origin + 1.0);
        let (t, btm) = (b.top as f32 - self.y_origin, b.bottom as f32 - self.y_origin + 1.0);

        if self.rotation == 0.0 {
            let mut left = (self.x + self.x_scale * l).round() as i32;
            let mut right = (self.x + self.x_scale * r - 1.0).round() as i32;
            if left > right {
                std::mem::swap(&mut left, &mut right);
            }

            let mut top = (self.y + self.y_scale * t).round() as i32;
            let mut bottom = (self.y + self.y_scale * btm - 1.0).round() as i32;
            if top > bottom {
                std::mem::swap(&mut top, &mut bottom);
            }

            return Some(BBox { left, right, top, bottom });
        }

        // Local extents before rotation
        let (xmin, xmax) = (self.x_scale * l, self.x_scale * r);
        let (ymin, ymax) = (self.y_scale * t, self.y_scale * btm);
        let (s, c) = self.rotation.to_radians().sin_cos();

        let span = |a: f32, b: f32| if a < b { (a, b) } else { (b, a) };

        // world dx = c*u + s*v, world dy = c*v - s*u
        let (cx_lo, cx_hi) = span(c * xmin, c * xmax);
        let (sy_lo, sy_hi) = span(s * ymin, s * ymax);
        let (cy_lo, cy_hi) = span(c * ymin, c * ymax);
        let (sx_lo, sx_hi) = span(s * xmin, s * xmax);

        // One pixel of slack absorbs float noise in the inverse transform
        Some(BBox {
            left: (self.x + cx_lo + sy_lo).floor() as i32 - 1,
            right: (self.x + cx_hi + sy_hi).floor() as i32 + 1,
            top: (self.y + cy_lo - sx_hi).floor() as i32 - 1,
            bottom: (self.y + cy_hi - sx_lo).floor() as i32 + 1,
        })
    }

    pub fn test_point(&self, px: f32, py: f32) -> bool {
        match self.sampler() {
            Sampler::Plain(p) => p.hit(px, py),
            Sampler::Scaled(p) => p.hit(px, py),
            Sampler::Rotated(p) => p.hit(px, py),
        }
    }

    /// Scan every integer point of the box overlap; true on the first point
    /// both masks cover
    pub fn intersects(&self, other: &Collider<'_>) -> bool {
        let (Some(a), Some(b)) = (self.bounding_box(), other.bounding_box()) else {
            return false;
        };
        let Some(area) = a.intersection(&b) else {
            return false;
        };

        match self.sampler() {
            Sampler::Plain(p) => scan_against(&p, other.sampler(), area),
            Sampler::Scaled(p) => scan_against(&p, other.sampler(), area),
            Sampler::Rotated(p) => scan_against(&p, other.sampler(), area),
        }
    }

    /// Pick the cheapest point test for this transform
    fn sampler(&self) -> Sampler<'a> {
        if self.rotation != 0.0 {
            let (sin, cos) = self.rotation.to_radians().sin_cos();
            Sampler::Rotated(RotatedSampler {
                frame: self.frame,
                x: self.x,
                y: self.y,
                rxs: 1.0 / self.x_scale,
                rys: 1.0 / self.y_scale,
                sin,
                cos,
                xo: self.x_origin,
                yo: self.y_origin,
            })
        } else if self.x_scale != 1.0 || self.y_scale != 1.0 {
            Sampler::Scaled(ScaledSampler {
                frame: self.frame,
                x: self.x,
                y: self.y,
                rxs: 1.0 / self.x_scale,
                rys: 1.0 / self.y_scale,
                xo: self.x_origin,
                yo: self.y_origin,
            })
        } else {
            Sampler::Plain(PlainSampler {
                frame: self.frame,
                dx: self.x_origin - self.x,
                dy: self.y_origin - self.y,
            })
        }
    }
}

/// Maps a room point into mask cells and reads the opacity bit
trait PointTest {
    fn hit(&self, px: f32, py: f32) -> bool;
}

enum Sampler<'a> {
    Plain(PlainSampler<'a>),
    Scaled(ScaledSampler<'a>),
    Rotated(RotatedSampler<'a>),
}

struct PlainSampler<'a> {
    frame: &'a MaskFrame,
    dx: f32,
    dy: f32,
}

impl PointTest for PlainSampler<'_> {
    #[inline]
    fn hit(&self, px: f32, py: f32) -> bool {
        self.frame.is_opaque((px + self.dx).floor() as i32, (py + self.dy).floor() as i32)
    }
}

struct ScaledSampler<'a> {
    frame: &'a MaskFrame,
    x: f32,
    y: f32,
    rxs: f32,
    rys: f32,
    xo: f32,
    yo: f32,
}

impl PointTest for ScaledSampler<'_> {
    #[inline]
    fn hit(&self, px: f32, py: f32) -> bool {
        let cx = ((px - self.x) * self.rxs + self.xo).floor() as i32;
        let cy = ((py - self.y) * self.rys + self.yo).floor() as i32;
        self.frame.is_opaque(cx, cy)
    }
}

struct RotatedSampler<'a> {
    frame: &'a MaskFrame,
    x: f32,
    y: f32,
    rxs: f32,
    rys: f32,
    sin: f32,
    cos: f32,
    xo: f32,
    yo: f32,
}

impl PointTest for RotatedSampler<'_> {
    #[inline]
    fn hit(&self, px: f32, py: f32) -> bool {
        let dx = px - self.x;
        let dy = py - self.y;
        let cx = ((self.cos * dx - self.sin * dy) * self.rxs + self.xo).floor() as i32;
        let cy = ((self.cos * dy + self.sin * dx) * self.rys + self.yo).floor() as i32;
        self.frame.is_opaque(cx, cy)
    }
}

fn scan_against<A: PointTest>(a: &A, b: Sampler<'_>, area: BBox) -> bool {
    match b {
        Sampler::Plain(p) => scan(a, &p, area),
        Sampler::Scaled(p) => scan(a, &p, area),
        Sampler::Rotated(p) => scan(a, &p, area),
    }
}

fn scan<A: PointTest, B: PointTest>(a: &A, b: &B, area: BBox) -> bool {
    for j in area.top..=area.bottom {
        let py = j as f32;
        for i in area.left..=area.right {
            let px = i as f32;
            if a.hit(px, py) && b.hit(px, py) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sprite::{SpriteBank, SpriteSource};

    fn make(kind: ObjectKind, x: f32, y: f32) -> GameObject {
        let bank = SpriteBank::builtin();
        GameObject::new(kind, x, y, bank.sprite_for(kind))
    }

    fn with_mask(frame: MaskFrame, xo: i32, yo: i32, x: f32, y: f32) -> GameObject {
        let mask = Rc::new(SpriteMask::single("test", xo, yo, frame));
        GameObject::new(
            ObjectKind::Block,
            x,
            y,
            Some(SpriteInfo { mask, image_speed: None }),
        )
    }

    #[test]
    fn test_motion_invariant() {
        let mut obj = make(ObjectKind::Block, 0.0, 0.0);
        obj.set_hspeed(3.0);
        obj.set_vspeed(-4.0);
        assert!((obj.speed() - 5.0).abs() < 1e-5);

        obj.set_direction(90.0);
        assert!(obj.hspeed().abs() < 1e-5);
        assert!((obj.vspeed() + 5.0).abs() < 1e-5);

        obj.set_speed(2.0);
        let d = obj.direction().to_radians();
        assert!((obj.hspeed() - 2.0 * d.cos()).abs() < 1e-5);
        assert!((obj.vspeed() + 2.0 * d.sin()).abs() < 1e-5);
    }

    #[test]
    fn test_gravity_direction_is_respected() {
        let mut obj = make(ObjectKind::Block, 0.0, 0.0);
        obj.gravity = 1.0;
        obj.integrate();
        assert_eq!(obj.position(), (0.0, 1.0));

        let mut up = make(ObjectKind::Block, 0.0, 0.0);
        up.gravity = 1.0;
        up.gravity_direction = 90.0;
        up.integrate();
        assert_eq!(up.position(), (0.0, -1.0));
    }

    #[test]
    fn test_unrotated_bbox() {
        let mut obj = make(ObjectKind::Block, 64.0, 32.0);
        assert_eq!(obj.compute_bounding_box(), Some(BBox::new(64, 95, 32, 63)));
        assert_eq!(obj.bbox(), BBox::new(64, 95, 32, 63));

        obj.x_scale = 2.0;
        assert_eq!(obj.compute_bounding_box(), Some(BBox::new(64, 127, 32, 63)));
    }

    #[test]
    fn test_mirrored_bbox_still_ordered() {
        let mut obj = make(ObjectKind::Block, 64.0, 0.0);
        obj.x_scale = -1.0;
        let b = obj.compute_bounding_box().unwrap();
        assert!(b.left <= b.right);
        // Mirrored mask covers x in [33, 64]
        assert!(b.left <= 33 && b.right >= 64);
        assert!(obj.test_point(40.0, 10.0));
        assert!(!obj.test_point(70.0, 10.0));
    }

    #[test]
    fn test_point_uses_origin() {
        let obj = make(ObjectKind::Player, 100.0, 100.0);
        // Hitbox spans x 95..=105, y 88..=108 around origin (17, 23)
        assert!(obj.test_point(100.0, 100.0));
        assert!(obj.test_point(95.0, 88.0));
        assert!(!obj.test_point(94.0, 100.0));
        assert!(!obj.test_point(100.0, 109.0));
    }

    #[test]
    fn test_maskless_object_never_collides() {
        let a = GameObject::new(ObjectKind::Block, 0.0, 0.0, None);
        let b = make(ObjectKind::Block, 0.0, 0.0);
        assert!(!a.test_point(1.0, 1.0));
        assert!(!a.intersects(&b));
        assert!(!b.intersects(&a));
    }

    #[test]
    fn test_intersects_respects_pixels() {
        // Apexes meet on row 0 but half a cell apart, so the boxes overlap
        // only where at least one spike is transparent
        let up = make(ObjectKind::SpikeUp, 0.0, 0.0);
        let down = make(ObjectKind::SpikeDown, 16.0, -31.0);
        assert!(up.collider().unwrap().bounding_box().unwrap()
            .intersection(&down.collider().unwrap().bounding_box().unwrap())
            .is_some());
        assert!(!up.intersects(&down));

        let block = make(ObjectKind::Block, 16.0, 16.0);
        assert!(up.intersects(&block));
    }

    #[test]
    fn test_intersects_is_symmetric() {
        let mut shapes = Vec::new();
        for (i, kind) in [ObjectKind::SpikeUp, ObjectKind::Apple, ObjectKind::Block, ObjectKind::SpikeLeft]
            .into_iter()
            .enumerate()
        {
            let mut o = make(kind, 10.0 + i as f32 * 7.0, 5.0 + i as f32 * 3.0);
            o.x_scale = if i % 2 == 0 { 1.0 } else { -1.5 };
            o.rotation = (i as f32) * 30.0;
            shapes.push(o);
        }
        for a in &shapes {
            for b in &shapes {
                assert_eq!(a.intersects(b), b.intersects(a));
            }
        }
    }

    #[test]
    fn test_fast_paths_agree() {
        // The scaled and rotated samplers must give the plain answer at identity-equivalent transforms
        let obj = make(ObjectKind::SpikeRight, 3.0, 4.0);
        let plain = obj.collider().unwrap();
        let frame = plain.frame;
        let scaled = ScaledSampler { frame, x: 3.0, y: 4.0, rxs: 1.0, rys: 1.0, xo: 0.0, yo: 0.0 };
        let rotated = RotatedSampler {
            frame,
            x: 3.0,
            y: 4.0,
            rxs: 1.0,
            rys: 1.0,
            sin: 0.0,
            cos: 1.0,
            xo: 0.0,
            yo: 0.0,
        };
        for j in -2..40 {
            for i in -2..40 {
                let (px, py) = (i as f32, j as f32);
                let expected = plain.test_point(px, py);
                assert_eq!(scaled.hit(px, py), expected);
                assert_eq!(rotated.hit(px, py), expected);
            }
        }
    }

    #[test]
    fn test_rotated_scaled_bbox_contains_occupied_pixels() {
        let frame = MaskFrame::from_fn(12, 7, |x, y| (x + y) % 3 != 0);
        for &rotation in &[15.0f32, 45.0, 90.0, 137.0, 180.0, 270.0, 333.0] {
            for &(sx, sy) in &[(1.0f32, 1.0f32), (2.0, 0.5), (-1.5, 2.0), (-1.0, -1.0)] {
                let mut obj = with_mask(frame.clone(), 4, 3, 50.25, 40.0);
                obj.rotation = rotation;
                obj.x_scale = sx;
                obj.y_scale = sy;
                let b = obj.compute_bounding_box().unwrap();
                for j in 0..100 {
                    for i in 0..100 {
                        if obj.test_point(i as f32, j as f32) {
                            assert!(
                                b.contains(i, j),
                                "pixel ({}, {}) outside {:?} at rot {} scale {},{}",
                                i, j, b, rotation, sx, sy
                            );
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn test_rotation_quarter_turn() {
        // A 4x1 bar rotated 90 degrees counter-clockwise stands upright above the origin
        let mut bar = with_mask(MaskFrame::solid(4, 1), 0, 0, 10.0, 10.0);
        bar.rotation = 90.0;
        assert!(bar.test_point(10.0, 9.5));
        assert!(bar.test_point(10.5, 7.0));
        assert!(!bar.test_point(12.0, 10.5));
    }
}
