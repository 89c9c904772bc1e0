//! Collision queries over the store
//!
//! Every query takes an optional kind (matched with its children; `None`
//! matches everything) and skips objects that are flagged for destruction or
//! have no mask.

use super::kind::ObjectKind;
use super::line::Segment;
use super::object::{unit_vector, Collider};
use super::store::{ObjectId, ObjectStore};

impl ObjectStore {
    fn testable(&self, kind: Option<ObjectKind>) -> impl Iterator<Item = (ObjectId, Collider<'_>)> + '_ {
        self.query_with_children(kind).into_iter().filter_map(move |id| {
            let obj = self.get(id)?;
            if obj.is_destroyed() {
                return None;
            }
            Some((id, obj.collider()?))
        })
    }

    /// First object whose mask covers `(x, y)`
    pub fn collision_point(&self, x: f32, y: f32, kind: Option<ObjectKind>) -> Option<ObjectId> {
        self.testable(kind).find(|(_, c)| c.test_point(x, y)).map(|(id, _)| id)
    }

    /// Every object whose mask covers `(x, y)`, in pool order
    pub fn collision_point_list(&self, x: f32, y: f32, kind: Option<ObjectKind>) -> Vec<ObjectId> {
        self.testable(kind)
            .filter(|(_, c)| c.test_point(x, y))
            .map(|(id, _)| id)
            .collect()
    }

    /// Every object the segment passes over
    pub fn collision_line_list(
        &self,
        x1: f32,
        y1: f32,
        x2: f32,
        y2: f32,
        kind: Option<ObjectKind>,
    ) -> Vec<ObjectId> {
        let seg = Segment::new(x1, y1, x2, y2);
        if seg.is_point() {
            return self.collision_point_list(x1, y1, kind);
        }

        let mut hits = Vec::new();
        for (id, collider) in self.testable(kind) {
            let Some(bbox) = collider.bounding_box() else {
                continue;
            };
            if seg.separated_from(&bbox) || !seg.touches(&bbox) {
                continue;
            }
            if seg.walk_clipped(&bbox).any(|(px, py)| collider.test_point(px, py)) {
                hits.push(id);
            }
        }
        hits
    }

    /// First object of `kind` that `id` would overlap if it stood at `(x, y)`
    pub fn instance_place(&self, id: ObjectId, x: f32, y: f32, kind: Option<ObjectKind>) -> Option<ObjectId> {
        let me = self.get(id)?.collider_at(x, y)?;
        self.testable(kind)
            .find(|(other, c)| *other != id && me.intersects(c))
            .map(|(other, _)| other)
    }

    pub fn place_meeting(&self, id: ObjectId, x: f32, y: f32, kind: Option<ObjectKind>) -> bool {
        self.instance_place(id, x, y, kind).is_some()
    }

    /// Step one unit at a time along `direction` for up to `round(max_distance)`
    /// steps, stopping before the first position that would overlap `kind`.
    /// Does nothing when the object already overlaps.
    pub fn move_contact(&mut self, id: ObjectId, direction: f32, max_distance: f32, kind: Option<ObjectKind>) {
        let Some((mut x, mut y)) = self.get(id).map(|o| o.position()) else {
            return;
        };
        if self.place_meeting(id, x, y, kind) {
            return;
        }

        let (dx, dy) = unit_vector(direction);
        let steps = max_distance.round() as i32;
        for _ in 0..steps {
            if self.place_meeting(id, x + dx, y + dy, kind) {
                break;
            }
            x += dx;
            y += dy;
        }

        if let Some(obj) = self.get_mut(id) {
            obj.set_position(x, y);
        }
    }
}
