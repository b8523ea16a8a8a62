//! Configuration system.
//!
//! Loads game tuning from JSON strings/files. Every field has a default, so a
//! partial file (or `{}`) is a valid config.

use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// Client-side tuning shared by prediction, interpolation and bullets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Local player name.
    pub player_name: String,
    /// Nominal tick length.
    pub frame_interval_ms: f32,
    /// Assumed average period between network updates. Not measured.
    pub average_lag_ms: f32,
    /// Remote entities closer than this to their target are left alone.
    pub interp_epsilon: f32,
    /// Player movement in units per tick.
    pub player_speed: f32,
    /// Ticks covered by one move action.
    pub move_dt: f32,
    /// Bullet movement in units per tick.
    pub bullet_speed: f32,
    pub bullet_radius: f32,
    /// Monster attrs carry no radius, so the client assumes one.
    pub monster_radius: f32,
    pub shoot_cooldown_ms: u64,
    /// Collide against walls when replaying unacknowledged moves. Prediction
    /// always does when a map is present.
    pub wall_aware_replay: bool,
    /// Spawn the local actor's bullets immediately on shoot.
    pub predict_local_bullets: bool,
    /// Resolve bullets against players as well as monsters and tiles.
    pub player_collisions: bool,
    /// With `player_collisions`, whether player-owned bullets hit other players.
    pub friendly_fire: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            player_name: "Player".to_string(),
            frame_interval_ms: 16.0,
            average_lag_ms: 100.0,
            interp_epsilon: 0.01,
            player_speed: 4.0,
            move_dt: 1.0,
            bullet_speed: 10.0,
            bullet_radius: 4.0,
            monster_radius: 14.0,
            shoot_cooldown_ms: 300,
            wall_aware_replay: true,
            predict_local_bullets: false,
            player_collisions: false,
            friendly_fire: false,
        }
    }
}

impl GameConfig {
    /// Parses config from JSON.
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        let cfg: Self = serde_json::from_str(s).context("parse game config")?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reads and parses a JSON config file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("read config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("load config {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.frame_interval_ms > 0.0, "frame_interval_ms must be positive");
        ensure!(self.average_lag_ms > 0.0, "average_lag_ms must be positive");
        ensure!(self.interp_epsilon >= 0.0, "interp_epsilon must not be negative");
        ensure!(self.player_speed >= 0.0, "player_speed must not be negative");
        ensure!(self.bullet_speed >= 0.0, "bullet_speed must not be negative");
        ensure!(self.move_dt > 0.0, "move_dt must be positive");
        Ok(())
    }

    /// Per-tick interpolation fraction, `frame / lag` clamped to $[0,1]$.
    pub fn interpolation_factor(&self) -> f32 {
        (self.frame_interval_ms / self.average_lag_ms).clamp(0.0, 1.0)
    }
}
