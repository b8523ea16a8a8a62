//! Loopback authority.
//!
//! A stand-in for the server's side of the local-player contract: it
//! consumes outbound actions, moves its copy of the player with the same
//! [`MoveRules`] (against a map, if given), and answers with authoritative
//! updates carrying the newest ack. An optional per-move bias makes it disagree with the
//! client so corrections can be observed.
//!
//! Test harness only; the real server is out of scope.

use arena_shared::{
    action::{Action, ActionKind, ActionMsg},
    collision::CollisionMap,
    config::GameConfig,
    ecs::EntityId,
    math::Vec2,
    net::{EntityEvent, PlayerAttrs, ServerMsg},
    physics::MoveRules,
};
use tracing::debug;

pub struct LoopbackAuthority {
    id: EntityId,
    rules: MoveRules,
    state: PlayerAttrs,
    bias: Vec2,
    map: Option<Box<dyn CollisionMap + Send>>,
    processed: usize,
}

impl LoopbackAuthority {
    pub fn new(cfg: &GameConfig, id: EntityId, spawn: Vec2) -> Self {
        Self {
            id,
            rules: MoveRules::from_config(cfg),
            state: PlayerAttrs {
                x: spawn.x,
                y: spawn.y,
                radius: 12.0,
                rotation: 0.0,
                name: cfg.player_name.clone(),
                lives: 3,
                max_lives: 3,
                kills: 0,
                ack: None,
            },
            bias: Vec2::ZERO,
            map: None,
            processed: 0,
        }
    }

    /// Adds `bias` to every processed move.
    pub fn with_bias(mut self, bias: Vec2) -> Self {
        self.bias = bias;
        self
    }

    /// Moves slide along the walls of `map`.
    pub fn with_map(mut self, map: impl CollisionMap + Send + 'static) -> Self {
        self.map = Some(Box::new(map));
        self
    }

    fn walls(&self) -> Option<&dyn CollisionMap> {
        match &self.map {
            Some(map) => Some(map.as_ref()),
            None => None,
        }
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.state.x, self.state.y)
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn attrs_mut(&mut self) -> &mut PlayerAttrs {
        &mut self.state
    }

    /// The add event that spawns the player on the client.
    pub fn join_msg(&self) -> ServerMsg {
        ServerMsg::Player(EntityEvent::Add {
            id: self.id.clone(),
            attrs: self.state.clone(),
        })
    }

    /// Current authoritative update.
    pub fn update_msg(&self) -> ServerMsg {
        ServerMsg::Player(EntityEvent::Update {
            id: self.id.clone(),
            attrs: self.state.clone(),
        })
    }

    /// Applies one outbound action from the client.
    pub fn receive(&mut self, msg: ActionMsg) -> anyhow::Result<()> {
        let action = Action::try_from(msg)?;
        anyhow::ensure!(action.actor_id == self.id, "action for {} reached {}", action.actor_id, self.id);

        match action.kind {
            ActionKind::Move { dir } => {
                let body = (&self.id, self.state.radius);
                let moved = self
                    .rules
                    .apply(self.position(), dir, body, self.walls())
                    .add(self.bias);
                self.state.x = moved.x;
                self.state.y = moved.y;
            }
            ActionKind::Rotate { angle } => self.state.rotation = angle,
            ActionKind::Shoot { .. } => {}
        }
        self.state.ack = Some(action.ts);
        self.processed += 1;
        debug!(ts = action.ts, x = self.state.x, y = self.state.y, "Authority applied action");
        Ok(())
    }

    /// Applies a batch and returns the resulting update.
    pub fn receive_all(&mut self, msgs: impl IntoIterator<Item = ActionMsg>) -> anyhow::Result<ServerMsg> {
        for msg in msgs {
            self.receive(msg)?;
        }
        Ok(self.update_msg())
    }
}
