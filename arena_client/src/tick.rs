//! Per-frame tick driver.
//!
//! Fixed order, once per frame:
//! 1. local actor: move, rotate, then shoot if the gate allows
//! 2. interpolation of remote players and monsters
//! 3. bullets: advance and resolve collisions
//!
//! Rendering happens after this, outside the core.

use arena_shared::{
    action::{Action, ActionKind},
    ecs::{EntityId, Player},
    event::EffectHook,
    net::{ActionSink, GamePhase},
};
use tracing::trace;

use crate::{bullets::BulletOutcome, client::GameClient, input::InputState};

/// What one tick did.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TickReport {
    pub actions_sent: usize,
    pub interpolated: usize,
    pub bullet_hits: Vec<(EntityId, BulletOutcome)>,
}

/// Alive, in the game phase, and off cooldown.
pub fn shot_allowed(player: &Player, phase: GamePhase, now: u64, cooldown_ms: u64) -> bool {
    if !player.is_alive() || phase != GamePhase::Game {
        return false;
    }
    match player.last_shot_at {
        Some(last) => now.saturating_sub(last) >= cooldown_ms,
        None => true,
    }
}

impl GameClient {
    /// Runs one frame of the simulation.
    pub fn tick(
        &mut self,
        input: &InputState,
        now: u64,
        sink: &mut dyn ActionSink,
        effects: &mut dyn EffectHook,
    ) -> TickReport {
        self.now = now;
        let mut report = TickReport {
            actions_sent: self.run_local(input, now, sink),
            ..TickReport::default()
        };

        report.interpolated = self.interp.step_all(self.store.remote_players_mut());
        report.interpolated += self.interp.step_all(self.store.monsters.iter_mut());

        report.bullet_hits = self
            .bullets
            .advance(&mut self.store, self.map.as_ref(), effects);

        trace!(
            now,
            sent = report.actions_sent,
            interpolated = report.interpolated,
            hits = report.bullet_hits.len(),
            "Tick"
        );
        report
    }

    fn run_local(&mut self, input: &InputState, now: u64, sink: &mut dyn ActionSink) -> usize {
        let phase = self.store.room.state;
        let cooldown = self.config.shoot_cooldown_ms;
        let predict_bullets = self.config.predict_local_bullets;
        let local_id = self.store.local_id.clone();
        let map = self.map.as_ref();

        let Some(predicted) = self.store.players.get_mut(&local_id) else {
            return 0;
        };

        let mut sent = 0;
        let dir = input.direction();
        if !dir.is_zero() {
            let action = Action::new(ActionKind::Move { dir }, now, local_id.clone());
            self.reconciler
                .record_and_apply(action, predicted, Some(map), sink);
            sent += 1;
        }

        if input.aim != predicted.rotation {
            let action = Action::new(ActionKind::Rotate { angle: input.aim }, now, local_id.clone());
            self.reconciler
                .record_and_apply(action, predicted, Some(map), sink);
            sent += 1;
        }

        if input.shooting() && shot_allowed(predicted, phase, now, cooldown) {
            let action = Action::new(ActionKind::Shoot { angle: input.aim }, now, local_id);
            self.reconciler
                .record_and_apply(action, predicted, Some(map), sink);
            sent += 1;

            if predict_bullets {
                let owner = predicted.clone();
                self.bullets
                    .spawn_local(&mut self.store, &owner, input.aim, now);
            }
        }
        sent
    }
}
