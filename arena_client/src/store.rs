//! Entity store.
//!
//! Owns every entity instance the client knows about. The local player is
//! held twice: the predicted instance lives in `players` next to the remote
//! players (it is what gets rendered and listed), and the ghost is a separate
//! owned copy of the last authoritative state. They are linked by id only.

use arena_shared::{
    ecs::{Bullet, EntityId, EntityTable, Monster, Player, Prop},
    math::Vec2,
    net::{PlayerAttrs, RoomState},
};

pub struct EntityStore {
    pub local_id: EntityId,
    pub players: EntityTable<Player>,
    pub ghost: Option<Player>,
    pub monsters: EntityTable<Monster>,
    pub props: EntityTable<Prop>,
    pub bullets: EntityTable<Bullet>,
    pub room: RoomState,
}

impl EntityStore {
    pub fn new(local_id: EntityId) -> Self {
        Self {
            local_id,
            players: EntityTable::default(),
            ghost: None,
            monsters: EntityTable::default(),
            props: EntityTable::default(),
            bullets: EntityTable::default(),
            room: RoomState::default(),
        }
    }

    pub fn is_local(&self, id: &EntityId) -> bool {
        *id == self.local_id
    }

    /// The predicted local instance, if the server has added it yet.
    pub fn local(&self) -> Option<&Player> {
        self.players.get(&self.local_id)
    }

    pub fn local_mut(&mut self) -> Option<&mut Player> {
        self.players.get_mut(&self.local_id)
    }

    /// Predicted instance and ghost, borrowed together.
    pub fn local_pair_mut(&mut self) -> Option<(&mut Player, &mut Player)> {
        let predicted = self.players.get_mut(&self.local_id)?;
        let ghost = self.ghost.as_mut()?;
        Some((predicted, ghost))
    }

    /// Remote players, excluding the local predicted instance.
    pub fn remote_players_mut(&mut self) -> impl Iterator<Item = &mut Player> {
        self.players.iter_mut().filter(|p| !p.is_local)
    }
}

/// Builds a player from its full attribute set.
pub fn player_from_attrs(id: EntityId, attrs: &PlayerAttrs, is_local: bool) -> Player {
    let at = Vec2::new(attrs.x, attrs.y);
    Player {
        id,
        name: attrs.name.clone(),
        position: at,
        target: at,
        rotation: attrs.rotation,
        lives: attrs.lives,
        max_lives: attrs.max_lives,
        kills: attrs.kills,
        radius: attrs.radius,
        last_ack: attrs.ack,
        last_shot_at: None,
        is_local,
    }
}

/// Copies the fields that are never predicted.
pub fn refresh_non_positional(player: &mut Player, attrs: &PlayerAttrs) {
    player.name.clone_from(&attrs.name);
    player.lives = attrs.lives;
    player.max_lives = attrs.max_lives;
    player.kills = attrs.kills;
    player.radius = attrs.radius;
}
