//! Entity records and typed tables.
//!
//! Four closed entity kinds (players, monsters, props, bullets), each stored
//! in its own table keyed by id. Tables are ordered so that iteration (and
//! therefore collision resolution order) is stable across runs.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::math::Vec2;

/// Opaque entity id as assigned by the server.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Anything stored in an [`EntityTable`].
pub trait Entity {
    fn id(&self) -> &EntityId;
}

/// Player state.
///
/// For remote players `position` is the last rendered interpolation point and
/// `target` the last network position. For the local player both the
/// predicted instance and its ghost are `Player` values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: EntityId,
    pub name: String,
    pub position: Vec2,
    pub target: Vec2,
    pub rotation: f32,
    pub lives: u32,
    pub max_lives: u32,
    pub kills: u32,
    pub radius: f32,
    /// Newest action timestamp the server has folded into this state.
    pub last_ack: Option<u64>,
    /// Local clock millis of the last accepted shot.
    pub last_shot_at: Option<u64>,
    pub is_local: bool,
}

impl Player {
    pub fn is_alive(&self) -> bool {
        self.lives > 0
    }
}

/// Monster state. Pure interpolation target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Monster {
    pub id: EntityId,
    pub position: Vec2,
    pub target: Vec2,
    pub rotation: f32,
    /// Hits applied locally since the last authoritative update; feedback only.
    pub damage_taken: u32,
}

/// Static or toggle-only map object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prop {
    pub id: EntityId,
    pub position: Vec2,
    pub active: bool,
}

/// Projectile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub position: Vec2,
    pub radius: f32,
    pub rotation: f32,
    pub active: bool,
    pub owner_id: EntityId,
    pub spawn: Vec2,
    pub fired_at: u64,
    /// Spawned by local prediction rather than by a server event.
    pub predicted: bool,
}

impl Bullet {
    /// Marks the bullet retired. Returns false if it already was.
    pub fn retire(&mut self) -> bool {
        std::mem::replace(&mut self.active, false)
    }
}

macro_rules! impl_entity {
    ($($ty:ty),*) => {
        $(impl Entity for $ty {
            fn id(&self) -> &EntityId {
                &self.id
            }
        })*
    };
}

impl_entity!(Player, Monster, Prop, Bullet);

/// Typed collection of one entity kind.
#[derive(Debug, Clone)]
pub struct EntityTable<T> {
    rows: BTreeMap<EntityId, T>,
}

impl<T> Default for EntityTable<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<T: Entity> EntityTable<T> {
    /// Inserts or replaces by the entity's own id.
    pub fn insert(&mut self, entity: T) -> Option<T> {
        self.rows.insert(entity.id().clone(), entity)
    }

    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.rows.get(id)
    }

    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.rows.get_mut(id)
    }

    pub fn remove(&mut self, id: &EntityId) -> Option<T> {
        self.rows.remove(id)
    }

    pub fn contains(&self, id: &EntityId) -> bool {
        self.rows.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterates in id order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.rows.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.rows.values_mut()
    }

    pub fn ids(&self) -> Vec<EntityId> {
        self.rows.keys().cloned().collect()
    }

    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) {
        self.rows.retain(|_, v| keep(v));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prop(id: &str) -> Prop {
        Prop {
            id: id.into(),
            position: Vec2::ZERO,
            active: true,
        }
    }

    #[test]
    fn table_insert_get_remove() {
        let mut table = EntityTable::default();
        table.insert(prop("chest"));
        assert!(table.contains(&"chest".into()));
        assert!(table.get(&"door".into()).is_none());
        assert!(table.remove(&"chest".into()).is_some());
        assert!(table.is_empty());
    }

    #[test]
    fn table_iterates_in_id_order() {
        let mut table = EntityTable::default();
        for id in ["c", "a", "b"] {
            table.insert(prop(id));
        }
        let ids: Vec<_> = table.iter().map(|p| p.id.as_str().to_string()).collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn bullet_retires_once() {
        let mut b = Bullet {
            id: "b1".into(),
            position: Vec2::ZERO,
            radius: 1.0,
            rotation: 0.0,
            active: true,
            owner_id: "p1".into(),
            spawn: Vec2::ZERO,
            fired_at: 0,
            predicted: false,
        };
        assert!(b.retire());
        assert!(!b.retire());
    }
}
