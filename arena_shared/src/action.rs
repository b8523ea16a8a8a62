//! Locally issued actions and their outbound wire form.

use anyhow::bail;
use serde::{Deserialize, Serialize};

use crate::{ecs::EntityId, math::Vec2};

/// What the local actor did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionKind {
    /// Raw input direction, components in $[-1,1]$, not normalized.
    Move { dir: Vec2 },
    /// Facing angle in radians.
    Rotate { angle: f32 },
    /// Fire along an angle in radians.
    Shoot { angle: f32 },
}

/// An immutable, timestamped action by the local actor.
#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub kind: ActionKind,
    /// Client clock, integer millis.
    pub ts: u64,
    pub actor_id: EntityId,
}

impl Action {
    pub fn new(kind: ActionKind, ts: u64, actor_id: EntityId) -> Self {
        Self { kind, ts, actor_id }
    }

    /// Movement direction if this is a move.
    pub fn move_dir(&self) -> Option<Vec2> {
        match self.kind {
            ActionKind::Move { dir } => Some(dir),
            ActionKind::Rotate { .. } | ActionKind::Shoot { .. } => None,
        }
    }

    pub fn to_msg(&self) -> ActionMsg {
        ActionMsg::from(self)
    }
}

/// Wire discriminant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionType {
    Move,
    Rotate,
    Shoot,
}

/// Variant-specific wire payload.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ActionValue {
    Dir { x: f32, y: f32 },
    Angle { angle: f32 },
}

/// Outbound action message: `{type, ts, actorId, value}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMsg {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub ts: u64,
    pub actor_id: EntityId,
    pub value: ActionValue,
}

impl From<&Action> for ActionMsg {
    fn from(a: &Action) -> Self {
        let (kind, value) = match a.kind {
            ActionKind::Move { dir } => (ActionType::Move, ActionValue::Dir { x: dir.x, y: dir.y }),
            ActionKind::Rotate { angle } => (ActionType::Rotate, ActionValue::Angle { angle }),
            ActionKind::Shoot { angle } => (ActionType::Shoot, ActionValue::Angle { angle }),
        };
        Self {
            kind,
            ts: a.ts,
            actor_id: a.actor_id.clone(),
            value,
        }
    }
}

impl TryFrom<ActionMsg> for Action {
    type Error = anyhow::Error;

    fn try_from(msg: ActionMsg) -> anyhow::Result<Self> {
        let kind = match (msg.kind, msg.value) {
            (ActionType::Move, ActionValue::Dir { x, y }) => ActionKind::Move {
                dir: Vec2::new(x, y),
            },
            (ActionType::Rotate, ActionValue::Angle { angle }) => ActionKind::Rotate { angle },
            (ActionType::Shoot, ActionValue::Angle { angle }) => ActionKind::Shoot { angle },
            (kind, value) => bail!("action {kind:?} cannot carry {value:?}"),
        };
        Ok(Action::new(kind, msg.ts, msg.actor_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_msg_wire_shape() {
        let a = Action::new(
            ActionKind::Move {
                dir: Vec2::new(1.0, -1.0),
            },
            100,
            "p1".into(),
        );
        let json = serde_json::to_value(a.to_msg()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "type": "move",
                "ts": 100,
                "actorId": "p1",
                "value": { "x": 1.0, "y": -1.0 }
            })
        );
    }

    #[test]
    fn shoot_msg_parses_back() {
        let raw = r#"{"type":"shoot","ts":7,"actorId":"p2","value":{"angle":0.5}}"#;
        let msg: ActionMsg = serde_json::from_str(raw).unwrap();
        let action = Action::try_from(msg).unwrap();
        assert_eq!(action.kind, ActionKind::Shoot { angle: 0.5 });
        assert_eq!(action.actor_id, EntityId::from("p2"));
    }

    #[test]
    fn mismatched_value_is_rejected() {
        let msg = ActionMsg {
            kind: ActionType::Rotate,
            ts: 1,
            actor_id: "p1".into(),
            value: ActionValue::Dir { x: 0.0, y: 1.0 },
        };
        assert!(Action::try_from(msg).is_err());
    }
}
