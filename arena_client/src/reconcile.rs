//! Prediction and reconciliation.
//!
//! Local actions are applied to the predicted player immediately, sent out,
//! and kept in an [`ActionLog`] until the server acknowledges them. When an
//! authoritative update with a newer ack arrives:
//! 1. The ghost jumps to the authoritative position.
//! 2. Every logged action up to and including the ack is dropped.
//! 3. The remaining moves are replayed on the ghost with the same
//!    [`MoveRules`] the prediction used.
//! 4. If the predicted player disagrees with the replayed ghost, it snaps.
//!
//! The snap is deliberate: smoothing the local actor would itself read as
//! latency. Rotation and shots are never replayed.
//!
//! Prediction always slides along walls when a map is supplied. Replay does
//! too unless `wall_aware_replay` is cleared; then replay ignores walls and
//! server-side wall slides show up as snaps on the next ack.

use std::collections::VecDeque;

use arena_shared::{
    action::{Action, ActionKind},
    collision::CollisionMap,
    config::GameConfig,
    ecs::Player,
    math::Vec2,
    net::{ActionSink, PlayerAttrs},
    physics::MoveRules,
};
use tracing::{debug, trace};

use crate::store::refresh_non_positional;

/// Unacknowledged local actions, in non-decreasing timestamp order.
#[derive(Debug, Default, Clone)]
pub struct ActionLog {
    entries: VecDeque<Action>,
}

impl ActionLog {
    /// Appends, keeping timestamp order even if the caller's clock stepped
    /// backwards.
    pub fn push(&mut self, action: Action) {
        let at = self
            .entries
            .iter()
            .rposition(|a| a.ts <= action.ts)
            .map_or(0, |i| i + 1);
        self.entries.insert(at, action);
    }

    /// Drops every entry with `ts <= ack`. An ack that matches no entry
    /// prunes to the newest entry not past it. Returns the number dropped.
    pub fn prune_through(&mut self, ack: u64) -> usize {
        let keep_from = self
            .entries
            .iter()
            .position(|a| a.ts > ack)
            .unwrap_or(self.entries.len());
        self.entries.drain(..keep_from).count()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Action> {
        self.entries.iter()
    }

    pub fn has_pending_rotate(&self) -> bool {
        self.entries
            .iter()
            .any(|a| matches!(a.kind, ActionKind::Rotate { .. }))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

/// What an authoritative update did to the local actor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Correction {
    /// Same ack as before (or none); only non-positional fields refreshed.
    Duplicate,
    /// Ack older than one already applied; treated like a duplicate.
    Stale { ack: u64, applied: u64 },
    /// Ghost rebased and replayed.
    Replayed {
        pruned: usize,
        replayed: usize,
        /// Distance the predicted instance was off by before snapping.
        residual: f32,
    },
}

#[derive(Debug)]
pub struct Reconciler {
    log: ActionLog,
    rules: MoveRules,
    wall_aware_replay: bool,
    last_ack: Option<u64>,
}

impl Reconciler {
    pub fn new(rules: MoveRules, wall_aware_replay: bool) -> Self {
        Self {
            log: ActionLog::default(),
            rules,
            wall_aware_replay,
            last_ack: None,
        }
    }

    pub fn from_config(cfg: &GameConfig) -> Self {
        Self::new(MoveRules::from_config(cfg), cfg.wall_aware_replay)
    }

    pub fn log(&self) -> &ActionLog {
        &self.log
    }

    pub fn last_ack(&self) -> Option<u64> {
        self.last_ack
    }

    /// Starts over for a freshly added local actor.
    pub fn reset(&mut self, ack: Option<u64>) {
        self.log.clear();
        self.last_ack = ack;
    }

    fn replay_walls<'m>(&self, map: Option<&'m dyn CollisionMap>) -> Option<&'m dyn CollisionMap> {
        map.filter(|_| self.wall_aware_replay)
    }

    /// Applies `action` to the predicted player, sends it and logs it.
    pub fn record_and_apply(
        &mut self,
        action: Action,
        predicted: &mut Player,
        map: Option<&dyn CollisionMap>,
        sink: &mut dyn ActionSink,
    ) {
        match action.kind {
            ActionKind::Move { dir } => {
                predicted.position =
                    self.rules
                        .apply(predicted.position, dir, (&predicted.id, predicted.radius), map);
                predicted.target = predicted.position;
            }
            ActionKind::Rotate { angle } => predicted.rotation = angle,
            ActionKind::Shoot { .. } => predicted.last_shot_at = Some(action.ts),
        }
        trace!(ts = action.ts, kind = ?action.kind, "Predicted action");
        sink.send_action(action.to_msg());
        self.log.push(action);
    }

    /// Folds an authoritative update for the local actor into the ghost and
    /// corrects the predicted instance if replay disagrees with it.
    pub fn on_authoritative_update(
        &mut self,
        attrs: &PlayerAttrs,
        ghost: &mut Player,
        predicted: &mut Player,
        map: Option<&dyn CollisionMap>,
    ) -> Correction {
        refresh_non_positional(ghost, attrs);
        refresh_non_positional(predicted, attrs);

        let correction = self.rebase(attrs, ghost, predicted, map);

        // Authoritative rotation wins once no local rotate is in flight.
        ghost.rotation = attrs.rotation;
        if !self.log.has_pending_rotate() {
            predicted.rotation = attrs.rotation;
        }
        correction
    }

    fn rebase(
        &mut self,
        attrs: &PlayerAttrs,
        ghost: &mut Player,
        predicted: &mut Player,
        map: Option<&dyn CollisionMap>,
    ) -> Correction {
        let ack = match (attrs.ack, self.last_ack) {
            (None, _) => return Correction::Duplicate,
            (Some(ack), Some(applied)) if ack == applied => return Correction::Duplicate,
            (Some(ack), Some(applied)) if ack < applied => {
                debug!(ack, applied, "Ignoring stale ack");
                return Correction::Stale { ack, applied };
            }
            (Some(ack), _) => ack,
        };

        self.last_ack = Some(ack);
        ghost.last_ack = Some(ack);
        predicted.last_ack = Some(ack);

        let pruned = self.log.prune_through(ack);
        let walls = self.replay_walls(map);
        let mut pos = Vec2::new(attrs.x, attrs.y);
        let mut replayed = 0;
        for dir in self.log.pending().filter_map(Action::move_dir) {
            pos = self.rules.apply(pos, dir, (&ghost.id, ghost.radius), walls);
            replayed += 1;
        }
        ghost.position = pos;
        ghost.target = pos;

        let residual = predicted.position.distance(pos);
        if predicted.position != pos {
            debug!(
                ack,
                residual,
                pending = self.log.len(),
                "Prediction diverged, snapping to replayed ghost"
            );
            predicted.position = pos;
            predicted.target = pos;
        }

        Correction::Replayed {
            pruned,
            replayed,
            residual,
        }
    }
}
