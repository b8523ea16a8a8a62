//! Stats snapshot for the UI layer.
//!
//! Derived on demand from the store; nothing here is cached.

use arena_shared::{ecs::EntityId, net::GamePhase};
use serde::Serialize;

use crate::{client::GameClient, store::EntityStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub id: EntityId,
    pub name: String,
    pub lives: u32,
    pub max_lives: u32,
    pub kills: u32,
    pub is_local: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub state: GamePhase,
    pub state_ends_at: Option<u64>,
    pub room_name: String,
    pub local_player_name: Option<String>,
    pub local_lives: u32,
    pub local_max_lives: u32,
    /// Most kills first, then by name.
    pub players: Vec<PlayerStats>,
    pub players_count: usize,
    pub players_max_count: u32,
}

impl StatsSnapshot {
    pub fn from_store(store: &EntityStore) -> Self {
        let local = store.local();
        let mut players: Vec<PlayerStats> = store
            .players
            .iter()
            .map(|p| PlayerStats {
                id: p.id.clone(),
                name: p.name.clone(),
                lives: p.lives,
                max_lives: p.max_lives,
                kills: p.kills,
                is_local: p.is_local,
            })
            .collect();
        players.sort_by(|a, b| b.kills.cmp(&a.kills).then_with(|| a.name.cmp(&b.name)));

        Self {
            state: store.room.state,
            state_ends_at: store.room.state_ends_at,
            room_name: store.room.room_name.clone(),
            local_player_name: local.map(|p| p.name.clone()),
            local_lives: local.map_or(0, |p| p.lives),
            local_max_lives: local.map_or(0, |p| p.max_lives),
            players_count: players.len(),
            players,
            players_max_count: store.room.max_players,
        }
    }
}

impl GameClient {
    pub fn stats(&self) -> StatsSnapshot {
        StatsSnapshot::from_store(&self.store)
    }
}
