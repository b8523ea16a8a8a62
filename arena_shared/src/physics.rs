//! Deterministic movement.
//!
//! One function moves the local actor for both prediction and replay. It
//! must stay bit-identical between the two paths, so neither side is
//! allowed to inline its own arithmetic.

use crate::{
    collision::{CollisionMap, Footprint, Layer},
    config::GameConfig,
    ecs::EntityId,
    math::Vec2,
};

/// Movement parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoveRules {
    /// Units per tick.
    pub speed: f32,
    /// Ticks per move action.
    pub dt: f32,
}

impl MoveRules {
    pub fn from_config(cfg: &GameConfig) -> Self {
        Self {
            speed: cfg.player_speed,
            dt: cfg.move_dt,
        }
    }

    /// `pos + dir * speed * dt`, with `dir` taken raw (not normalized).
    pub fn step(&self, pos: Vec2, dir: Vec2) -> Vec2 {
        pos.add(dir.scale(self.speed * self.dt))
    }

    /// Same as [`step`](Self::step) but slides along walls: each axis is
    /// applied separately and dropped if it would overlap a solid tile.
    pub fn step_walled(
        &self,
        pos: Vec2,
        dir: Vec2,
        body: (&EntityId, f32),
        map: &dyn CollisionMap,
    ) -> Vec2 {
        let (id, radius) = body;
        let full = self.step(pos, dir);
        let blocked = |p: Vec2| {
            !map.collides_on_layer(id, Footprint::Circle { center: p, radius }, Layer::Tiles)
                .is_empty()
        };

        let mut out = pos;
        let try_x = Vec2::new(full.x, out.y);
        if !blocked(try_x) {
            out = try_x;
        }
        let try_y = Vec2::new(out.x, full.y);
        if !blocked(try_y) {
            out = try_y;
        }
        out
    }

    /// Dispatches to the walled variant when a map is supplied.
    pub fn apply(
        &self,
        pos: Vec2,
        dir: Vec2,
        body: (&EntityId, f32),
        map: Option<&dyn CollisionMap>,
    ) -> Vec2 {
        match map {
            Some(map) => self.step_walled(pos, dir, body, map),
            None => self.step(pos, dir),
        }
    }
}
