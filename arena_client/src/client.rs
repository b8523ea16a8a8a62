//! Client implementation.
//!
//! The client maintains:
//! - The entity store (remote entities, local predicted player and ghost)
//! - The reconciler with its log of unacknowledged actions
//! - Interpolation and bullet settings derived from config
//! - The map used for collision queries
//!
//! Inbound messages are applied here, between ticks. A message for an
//! unknown id is dropped silently; removal/update races are expected.

use anyhow::Context;
use arena_shared::{
    collision::CollisionMap,
    config::GameConfig,
    ecs::{Bullet, EntityId, Monster, Prop},
    math::Vec2,
    net::{BulletAttrs, EntityEvent, MonsterAttrs, PlayerAttrs, PropAttrs, ServerMsg},
};
use tracing::{debug, info, trace};

use crate::{
    bullets::BulletManager,
    interp::Interpolator,
    reconcile::{Correction, Reconciler},
    store::{player_from_attrs, refresh_non_positional, EntityStore},
};

/// High-level game client core.
pub struct GameClient {
    pub config: GameConfig,
    pub store: EntityStore,
    pub(crate) reconciler: Reconciler,
    pub(crate) interp: Interpolator,
    pub(crate) bullets: BulletManager,
    pub(crate) map: Box<dyn CollisionMap>,
    /// Clock millis of the most recent tick.
    pub(crate) now: u64,
}

impl GameClient {
    pub fn new(
        config: GameConfig,
        local_id: EntityId,
        map: Box<dyn CollisionMap>,
    ) -> anyhow::Result<Self> {
        config.validate().context("invalid game config")?;
        info!(local = %local_id, factor = config.interpolation_factor(), "Client core ready");
        Ok(Self {
            reconciler: Reconciler::from_config(&config),
            interp: Interpolator::from_config(&config),
            bullets: BulletManager::from_config(&config),
            store: EntityStore::new(local_id),
            map,
            now: 0,
            config,
        })
    }

    pub fn local_id(&self) -> &EntityId {
        &self.store.local_id
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    /// Applies one inbound message.
    pub fn handle(&mut self, msg: ServerMsg) {
        match msg {
            ServerMsg::Player(ev) => self.on_player(ev),
            ServerMsg::Monster(ev) => self.on_monster(ev),
            ServerMsg::Prop(ev) => self.on_prop(ev),
            ServerMsg::Bullet(ev) => self.on_bullet(ev),
            ServerMsg::Room(room) => {
                debug!(state = ?room.state, room = %room.room_name, "Room state");
                self.store.room = room;
            }
        }
    }

    fn on_player(&mut self, ev: EntityEvent<PlayerAttrs>) {
        match ev {
            EntityEvent::Add { id, attrs } => {
                let is_local = self.store.is_local(&id);
                let player = player_from_attrs(id, &attrs, is_local);
                if is_local {
                    self.reconciler.reset(attrs.ack);
                    self.store.ghost = Some(player.clone());
                }
                debug!(id = %player.id, is_local, "Player added");
                self.store.players.insert(player);
            }
            EntityEvent::Update { id, attrs } if self.store.is_local(&id) => {
                let map = self.map.as_ref();
                let Some((predicted, ghost)) = self.store.local_pair_mut() else {
                    trace!(%id, "Update for local player before add");
                    return;
                };
                let correction = self
                    .reconciler
                    .on_authoritative_update(&attrs, ghost, predicted, Some(map));
                if let Correction::Replayed { residual, .. } = correction {
                    trace!(residual, "Reconciled local player");
                }
            }
            EntityEvent::Update { id, attrs } => {
                let Some(player) = self.store.players.get_mut(&id) else {
                    trace!(%id, "Update for unknown player");
                    return;
                };
                Interpolator::retarget(player, Vec2::new(attrs.x, attrs.y));
                player.rotation = attrs.rotation;
                refresh_non_positional(player, &attrs);
                player.last_ack = attrs.ack;
            }
            EntityEvent::Remove { id } => {
                if self.store.is_local(&id) {
                    self.store.ghost = None;
                    self.reconciler.reset(None);
                }
                if self.store.players.remove(&id).is_some() {
                    debug!(%id, "Player removed");
                }
            }
        }
    }

    fn on_monster(&mut self, ev: EntityEvent<MonsterAttrs>) {
        match ev {
            EntityEvent::Add { id, attrs } => {
                let at = Vec2::new(attrs.x, attrs.y);
                self.store.monsters.insert(Monster {
                    id,
                    position: at,
                    target: at,
                    rotation: attrs.rotation,
                    damage_taken: 0,
                });
            }
            EntityEvent::Update { id, attrs } => {
                let Some(monster) = self.store.monsters.get_mut(&id) else {
                    trace!(%id, "Update for unknown monster");
                    return;
                };
                Interpolator::retarget(monster, Vec2::new(attrs.x, attrs.y));
                monster.rotation = attrs.rotation;
                monster.damage_taken = 0;
            }
            EntityEvent::Remove { id } => {
                self.store.monsters.remove(&id);
            }
        }
    }

    fn on_prop(&mut self, ev: EntityEvent<PropAttrs>) {
        match ev {
            EntityEvent::Add { id, attrs } | EntityEvent::Update { id, attrs } => {
                self.store.props.insert(Prop {
                    id,
                    position: Vec2::new(attrs.x, attrs.y),
                    active: attrs.active,
                });
            }
            EntityEvent::Remove { id } => {
                self.store.props.remove(&id);
            }
        }
    }

    fn on_bullet(&mut self, ev: EntityEvent<BulletAttrs>) {
        match ev {
            EntityEvent::Add { id, attrs } => {
                if self.store.is_local(&attrs.owner_id) {
                    trace!(%id, "Skipping echo of local shot");
                    return;
                }
                let at = Vec2::new(attrs.x, attrs.y);
                self.store.bullets.insert(Bullet {
                    id,
                    position: at,
                    radius: attrs.radius,
                    rotation: attrs.rotation,
                    active: attrs.active,
                    owner_id: attrs.owner_id,
                    spawn: at,
                    fired_at: self.now,
                    predicted: false,
                });
            }
            EntityEvent::Update { id, attrs } => {
                let Some(bullet) = self.store.bullets.get_mut(&id) else {
                    return;
                };
                // Position stays locally simulated; a retired bullet never revives.
                bullet.rotation = attrs.rotation;
                bullet.radius = attrs.radius;
                if !attrs.active {
                    bullet.retire();
                }
            }
            EntityEvent::Remove { id } => {
                self.store.bullets.remove(&id);
            }
        }
    }
}
