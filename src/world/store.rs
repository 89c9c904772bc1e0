//! Object store
//!
//! Objects live in a slot arena addressed by generational ids. `order` keeps
//! insertion order across all kinds and each kind has its own pool of ids.
//! Destruction only flags an object; `sweep` removes flagged objects and
//! frees their slots, bumping the generation so old ids stop resolving.

use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use crate::sprite::SpriteSource;
use super::behavior;
use super::kind::ObjectKind;
use super::object::GameObject;

/// Handle to an object in an `ObjectStore`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObjectId {
    index: u32,
    generation: u32,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    object: Option<GameObject>,
}

pub struct ObjectStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
    order: Vec<ObjectId>,
    pools: HashMap<ObjectKind, Vec<ObjectId>>,
    sprites: Rc<dyn SpriteSource>,
}

impl ObjectStore {
    pub fn new(sprites: Rc<dyn SpriteSource>) -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            order: Vec::new(),
            pools: HashMap::new(),
            sprites,
        }
    }

    pub fn sprites(&self) -> &dyn SpriteSource {
        self.sprites.as_ref()
    }

    /// Create an object with its kind's defaults and register it in the
    /// global order and its kind's pool before returning
    pub fn create(&mut self, x: f32, y: f32, kind: ObjectKind) -> ObjectId {
        let sprite = self.sprites.sprite_for(kind);
        if sprite.is_none() && kind.sprite_name().is_some() {
            log::warn!("No mask for {:?}; it will not collide", kind);
        }

        let speed_override = sprite.as_ref().and_then(|s| s.image_speed);

        let mut obj = GameObject::new(kind, x, y, sprite);
        behavior::init(&mut obj);
        if let Some(speed) = speed_override {
            obj.image_speed = speed;
        }
        obj.compute_bounding_box();

        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.object = Some(obj);
                ObjectId { index, generation: slot.generation }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot { generation: 0, object: Some(obj) });
                ObjectId { index, generation: 0 }
            }
        };

        self.order.push(id);
        self.pools.entry(kind).or_default().push(id);
        log::debug!("Created {:?} at ({}, {})", kind, x, y);
        id
    }

    pub fn get(&self, id: ObjectId) -> Option<&GameObject> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_ref()
    }

    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut GameObject> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.object.as_mut()
    }

    /// Still stored, flagged or not
    pub fn contains(&self, id: ObjectId) -> bool {
        self.get(id).is_some()
    }

    /// Stored and not flagged for destruction
    pub fn is_alive(&self, id: ObjectId) -> bool {
        self.get(id).map_or(false, |o| !o.is_destroyed())
    }

    /// Flag an object for removal at the next sweep. Returns false for a
    /// stale id.
    pub fn destroy(&mut self, id: ObjectId) -> bool {
        match self.get_mut(id) {
            Some(obj) => {
                obj.destroy();
                true
            }
            None => false,
        }
    }

    /// All stored ids in insertion order
    pub fn ids(&self) -> &[ObjectId] {
        &self.order
    }

    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &GameObject)> + '_ {
        self.order.iter().filter_map(move |&id| self.get(id).map(|o| (id, o)))
    }

    /// Stored objects, including ones pending removal
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Pool for exactly `kind`; `None` means every object
    pub fn query(&self, kind: Option<ObjectKind>) -> &[ObjectId] {
        match kind {
            None => &self.order,
            Some(kind) => self.pools.get(&kind).map(Vec::as_slice).unwrap_or(&[]),
        }
    }

    /// Pool for `kind` followed by the pools of its children, each id once
    pub fn query_with_children(&self, kind: Option<ObjectKind>) -> Vec<ObjectId> {
        let Some(kind) = kind else {
            return self.order.clone();
        };

        let mut seen = HashSet::new();
        let mut result = Vec::new();
        for k in std::iter::once(kind).chain(kind.children().iter().copied()) {
            for &id in self.query(Some(k)) {
                if seen.insert(id) {
                    result.push(id);
                }
            }
        }
        result
    }

    /// Live objects of exactly `kind`
    pub fn count(&self, kind: ObjectKind) -> usize {
        self.query(Some(kind)).iter().filter(|&&id| self.is_alive(id)).count()
    }

    /// Flag every member of the kind's own pool; children are untouched
    pub fn destroy_all_of_type(&mut self, kind: ObjectKind) {
        let ids = self.query(Some(kind)).to_vec();
        for id in ids {
            self.destroy(id);
        }
    }

    /// Live objects standing exactly at `(x, y)`
    pub fn at_position(&self, x: f32, y: f32, kind: Option<ObjectKind>) -> Vec<ObjectId> {
        self.query_with_children(kind)
            .into_iter()
            .filter(|&id| {
                self.get(id)
                    .map_or(false, |o| !o.is_destroyed() && o.x == x && o.y == y)
            })
            .collect()
    }

    /// Physically remove flagged objects. Returns how many were removed.
    pub fn sweep(&mut self) -> usize {
        let mut removed = Vec::new();
        for &id in &self.order {
            if self.get(id).map_or(true, |o| o.is_destroyed()) {
                removed.push(id);
            }
        }
        if removed.is_empty() {
            return 0;
        }

        let gone: HashSet<ObjectId> = removed.iter().copied().collect();
        self.order.retain(|id| !gone.contains(id));
        for pool in self.pools.values_mut() {
            pool.retain(|id| !gone.contains(id));
        }

        for id in &removed {
            let slot = &mut self.slots[id.index as usize];
            slot.object = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }

        removed.len()
    }
}
