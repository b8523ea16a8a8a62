//! Networking contract.
//!
//! The transport itself lives outside this workspace; what is modelled here
//! is the message contract in both directions:
//! - Inbound `ServerMsg`: per-kind entity add/update/remove plus room state.
//! - Outbound `ActionMsg`: sent through an [`ActionSink`], fire-and-forget.
//!
//! Serialization is JSON, framed by the transport.

use anyhow::Context;
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::warn;

use crate::{action::ActionMsg, ecs::EntityId};

/// Lifecycle event for one entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum EntityEvent<A> {
    Add { id: EntityId, attrs: A },
    Update { id: EntityId, attrs: A },
    Remove { id: EntityId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerAttrs {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub rotation: f32,
    pub name: String,
    pub lives: u32,
    pub max_lives: u32,
    pub kills: u32,
    /// Newest client action timestamp folded into this state.
    #[serde(default)]
    pub ack: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonsterAttrs {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropAttrs {
    pub x: f32,
    pub y: f32,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletAttrs {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub rotation: f32,
    pub active: bool,
    pub owner_id: EntityId,
}

/// Match phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum GamePhase {
    #[default]
    Waiting,
    Lobby,
    Game,
    GameEnd,
}

/// Room-level state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomState {
    pub state: GamePhase,
    /// Server clock millis when the current phase ends, if timed.
    #[serde(default)]
    pub state_ends_at: Option<u64>,
    pub room_name: String,
    pub max_players: u32,
}

/// Inbound message envelope, one variant per entity kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "event", rename_all = "camelCase")]
pub enum ServerMsg {
    Player(EntityEvent<PlayerAttrs>),
    Monster(EntityEvent<MonsterAttrs>),
    Prop(EntityEvent<PropAttrs>),
    Bullet(EntityEvent<BulletAttrs>),
    Room(RoomState),
}

/// Outbound action channel. Sends never block and never report delivery.
pub trait ActionSink {
    fn send_action(&mut self, msg: ActionMsg);
}

impl ActionSink for Vec<ActionMsg> {
    fn send_action(&mut self, msg: ActionMsg) {
        self.push(msg);
    }
}

impl ActionSink for mpsc::UnboundedSender<ActionMsg> {
    fn send_action(&mut self, msg: ActionMsg) {
        if let Err(e) = self.send(msg) {
            warn!(ts = e.0.ts, "Outbound channel closed, action dropped");
        }
    }
}

/// Convenience codec helpers.
pub fn encode_to_bytes(msg: &ServerMsg) -> anyhow::Result<Bytes> {
    let payload = serde_json::to_vec(msg).context("serialize")?;
    Ok(Bytes::from(payload))
}

pub fn decode_from_bytes(b: &[u8]) -> anyhow::Result<ServerMsg> {
    serde_json::from_slice(b).context("deserialize")
}
