//! `arena_tests`
//!
//! Harness pieces shared by the integration tests and the session runner.

pub mod loopback;

pub use loopback::LoopbackAuthority;

use arena_shared::net::{GamePhase, RoomState, ServerMsg};

/// Room message putting the client in the active game phase.
pub fn game_room(name: &str, max_players: u32) -> ServerMsg {
    ServerMsg::Room(RoomState {
        state: GamePhase::Game,
        state_ends_at: None,
        room_name: name.to_string(),
        max_players,
    })
}
