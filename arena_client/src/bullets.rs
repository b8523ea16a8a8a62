//! Bullet lifecycle.
//!
//! Each tick every active bullet moves along its rotation, then resolves at
//! most one collision, in priority order:
//! 1. monsters (first hit takes damage)
//! 2. tiles (no damage)
//! 3. players, only when player collisions are enabled
//!
//! A hit retires the bullet, applies damage once and fires one impact
//! effect. Retired bullets are skipped until the server removes them;
//! locally predicted ones are purged right away since no removal will come.

use arena_shared::{
    collision::{CollisionMap, Footprint, Layer},
    config::GameConfig,
    ecs::{Bullet, EntityId, Player},
    event::EffectHook,
    math::Vec2,
};
use tracing::debug;

use crate::{collide::Resolver, store::EntityStore};

pub const MONSTER_HIT_COLOR: u32 = 0xc0392b;
pub const WALL_HIT_COLOR: u32 = 0xbdc3c7;
pub const PLAYER_HIT_COLOR: u32 = 0xf1c40f;

/// How a bullet ended this tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BulletOutcome {
    Monster(EntityId),
    Wall,
    Player(EntityId),
}

#[derive(Debug, Clone, Copy)]
pub struct BulletManager {
    speed: f32,
    radius: f32,
    monster_radius: f32,
    player_collisions: bool,
    friendly_fire: bool,
}

impl BulletManager {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            speed: cfg.bullet_speed,
            radius: cfg.bullet_radius,
            monster_radius: cfg.monster_radius,
            player_collisions: cfg.player_collisions,
            friendly_fire: cfg.friendly_fire,
        }
    }

    /// Spawns a predicted bullet at the owner's muzzle point.
    pub fn spawn_local(&self, store: &mut EntityStore, owner: &Player, angle: f32, now: u64) -> EntityId {
        let muzzle = owner.position.add(Vec2::from_angle(angle).scale(owner.radius));
        let id = EntityId::new(format!("{}:shot:{now}", owner.id));
        store.bullets.insert(Bullet {
            id: id.clone(),
            position: muzzle,
            radius: self.radius,
            rotation: angle,
            active: true,
            owner_id: owner.id.clone(),
            spawn: muzzle,
            fired_at: now,
            predicted: true,
        });
        id
    }

    /// Advances every active bullet by one tick and resolves collisions.
    pub fn advance(
        &self,
        store: &mut EntityStore,
        map: &dyn CollisionMap,
        effects: &mut dyn EffectHook,
    ) -> Vec<(EntityId, BulletOutcome)> {
        for b in store.bullets.iter_mut().filter(|b| b.active) {
            b.position = b.position.add(Vec2::from_angle(b.rotation).scale(self.speed));
        }

        let active: Vec<EntityId> = store
            .bullets
            .iter()
            .filter(|b| b.active)
            .map(|b| b.id.clone())
            .collect();

        let mut outcomes = Vec::new();
        for id in active {
            let outcome = {
                let Some(bullet) = store.bullets.get(&id) else {
                    continue;
                };
                let resolver = Resolver::new(map, store, self.monster_radius);
                self.resolve(bullet, &resolver, store)
            };
            if let Some(outcome) = outcome {
                if self.apply(store, &id, &outcome, effects) {
                    outcomes.push((id, outcome));
                }
            }
        }

        store.bullets.retain(|b| b.active || !b.predicted);
        outcomes
    }

    fn resolve(&self, bullet: &Bullet, resolver: &Resolver<'_>, store: &EntityStore) -> Option<BulletOutcome> {
        let footprint = Footprint::Circle {
            center: bullet.position,
            radius: bullet.radius,
        };

        if let Some(hit) = resolver
            .collides_on_layer(&bullet.id, footprint, Layer::Monsters)
            .into_iter()
            .next()
        {
            return Some(BulletOutcome::Monster(hit.id));
        }

        if !resolver
            .collides_on_layer(&bullet.id, footprint, Layer::Tiles)
            .is_empty()
        {
            return Some(BulletOutcome::Wall);
        }

        if !self.hits_players(bullet, store) {
            return None;
        }
        resolver
            .collides_on_layer(&bullet.id, footprint, Layer::Players)
            .into_iter()
            .find(|hit| hit.id != bullet.owner_id)
            .map(|hit| BulletOutcome::Player(hit.id))
    }

    /// Whether this bullet may hit players at all.
    fn hits_players(&self, bullet: &Bullet, store: &EntityStore) -> bool {
        if !self.player_collisions {
            return false;
        }
        self.friendly_fire || store.monsters.contains(&bullet.owner_id)
    }

    /// Retires the bullet and applies the outcome. False if the bullet was
    /// already retired.
    fn apply(
        &self,
        store: &mut EntityStore,
        id: &EntityId,
        outcome: &BulletOutcome,
        effects: &mut dyn EffectHook,
    ) -> bool {
        let Some(bullet) = store.bullets.get_mut(id) else {
            return false;
        };
        if !bullet.retire() {
            return false;
        }
        let at = bullet.position;

        match outcome {
            BulletOutcome::Monster(target) => {
                if let Some(m) = store.monsters.get_mut(target) {
                    m.damage_taken += 1;
                }
                debug!(bullet = %id, monster = %target, "Monster hit");
                effects.spawn_impact(at, MONSTER_HIT_COLOR);
            }
            BulletOutcome::Wall => {
                effects.spawn_impact(at, WALL_HIT_COLOR);
            }
            BulletOutcome::Player(target) => {
                if let Some(p) = store.players.get_mut(target) {
                    p.lives = p.lives.saturating_sub(1);
                }
                debug!(bullet = %id, player = %target, "Player hit");
                effects.spawn_impact(at, PLAYER_HIT_COLOR);
            }
        }
        true
    }
}
