//! Collision resolver.
//!
//! Answers layer queries by combining the external map (tiles) with the
//! bodies the store knows about (monsters, players). Body hits come back in
//! id order.

use arena_shared::{
    collision::{CollisionMap, Footprint, Hit, Layer},
    ecs::EntityId,
};

use crate::store::EntityStore;

pub struct Resolver<'a> {
    map: &'a dyn CollisionMap,
    store: &'a EntityStore,
    monster_radius: f32,
}

impl<'a> Resolver<'a> {
    pub fn new(map: &'a dyn CollisionMap, store: &'a EntityStore, monster_radius: f32) -> Self {
        Self {
            map,
            store,
            monster_radius,
        }
    }
}

impl CollisionMap for Resolver<'_> {
    fn collides_on_layer(&self, entity: &EntityId, footprint: Footprint, layer: Layer) -> Vec<Hit> {
        let hit = |id: &EntityId| Hit {
            id: id.clone(),
            layer,
        };
        match layer {
            Layer::Tiles => self.map.collides_on_layer(entity, footprint, layer),
            Layer::Monsters => self
                .store
                .monsters
                .iter()
                .filter(|m| m.id != *entity)
                .filter(|m| footprint.overlaps_circle(m.position, self.monster_radius))
                .map(|m| hit(&m.id))
                .collect(),
            Layer::Players => self
                .store
                .players
                .iter()
                .filter(|p| p.id != *entity && p.is_alive())
                .filter(|p| footprint.overlaps_circle(p.position, p.radius))
                .map(|p| hit(&p.id))
                .collect(),
        }
    }
}
