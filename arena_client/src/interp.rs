//! Interpolation.
//!
//! The server sends discrete position updates for remote entities.
//! The client renders every frame and moves each entity a fixed fraction of
//! the remaining way toward its latest target.
//!
//! The fraction is `frame_interval / average_lag`. That is exponential-decay
//! smoothing rather than simulated velocity: sparse updates close the gap
//! faster, dense ones slower. The lag is an assumed constant, not measured.

use arena_shared::{
    config::GameConfig,
    ecs::{Monster, Player},
    math::Vec2,
};

/// Something with a rendered position and an interpolation target.
pub trait Interpolated {
    fn position(&self) -> Vec2;
    fn target(&self) -> Vec2;
    fn set_position(&mut self, p: Vec2);
    fn set_target(&mut self, t: Vec2);
}

macro_rules! impl_interpolated {
    ($($ty:ty),*) => {
        $(impl Interpolated for $ty {
            fn position(&self) -> Vec2 {
                self.position
            }
            fn target(&self) -> Vec2 {
                self.target
            }
            fn set_position(&mut self, p: Vec2) {
                self.position = p;
            }
            fn set_target(&mut self, t: Vec2) {
                self.target = t;
            }
        })*
    };
}

impl_interpolated!(Player, Monster);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Interpolator {
    factor: f32,
    epsilon: f32,
}

impl Interpolator {
    pub fn new(factor: f32, epsilon: f32) -> Self {
        Self {
            factor: factor.clamp(0.0, 1.0),
            epsilon,
        }
    }

    pub fn from_config(cfg: &GameConfig) -> Self {
        Self::new(cfg.interpolation_factor(), cfg.interp_epsilon)
    }

    /// Applies a fresh network position. The rendered position stays where
    /// it visually is; only the destination moves.
    pub fn retarget<E: Interpolated>(entity: &mut E, target: Vec2) {
        entity.set_target(target);
    }

    /// Advances one entity by one tick. Returns whether it moved.
    pub fn step<E: Interpolated>(&self, entity: &mut E) -> bool {
        let (p, t) = (entity.position(), entity.target());
        if p.distance(t) <= self.epsilon {
            return false;
        }
        entity.set_position(p.lerp(t, self.factor));
        true
    }

    /// Advances every entity; returns how many moved.
    pub fn step_all<'a, E, I>(&self, entities: I) -> usize
    where
        E: Interpolated + 'a,
        I: IntoIterator<Item = &'a mut E>,
    {
        entities
            .into_iter()
            .map(|e| self.step(e))
            .filter(|moved| *moved)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monster(p: Vec2, t: Vec2) -> Monster {
        Monster {
            id: "m1".into(),
            position: p,
            target: t,
            rotation: 0.0,
            damage_taken: 0,
        }
    }

    #[test]
    fn step_stays_on_segment_and_gets_closer() {
        let interp = Interpolator::new(0.16, 0.01);
        let (p, t) = (Vec2::new(0.0, 0.0), Vec2::new(10.0, 5.0));
        let mut m = monster(p, t);
        assert!(interp.step(&mut m));

        let before = p.distance(t);
        let after = m.position.distance(t);
        assert!(after < before);
        // On the segment: distances along it add up.
        let along = p.distance(m.position) + after;
        assert!((along - before).abs() < 1e-4);
    }

    #[test]
    fn full_factor_lands_on_target() {
        let interp = Interpolator::new(4.0, 0.01);
        let mut m = monster(Vec2::ZERO, Vec2::new(3.0, 4.0));
        interp.step(&mut m);
        assert_eq!(m.position, m.target);
    }

    #[test]
    fn within_epsilon_is_left_alone() {
        let interp = Interpolator::new(0.5, 0.01);
        let mut m = monster(Vec2::new(1.0, 1.0), Vec2::new(1.005, 1.0));
        for _ in 0..5 {
            assert!(!interp.step(&mut m));
        }
        assert_eq!(m.position, Vec2::new(1.0, 1.0));
    }

    #[test]
    fn converges_then_settles() {
        let interp = Interpolator::new(0.25, 0.01);
        let mut m = monster(Vec2::ZERO, Vec2::new(8.0, 0.0));
        let mut ticks = 0;
        while interp.step(&mut m) {
            ticks += 1;
            assert!(ticks < 100, "interpolation never settled");
        }
        let settled = m.position;
        interp.step(&mut m);
        assert_eq!(m.position, settled);
        assert!(settled.distance(m.target) <= 0.01);
    }

    #[test]
    fn retarget_keeps_rendered_position() {
        let mut m = monster(Vec2::new(2.0, 0.0), Vec2::new(5.0, 0.0));
        Interpolator::retarget(&mut m, Vec2::new(9.0, 0.0));
        assert_eq!(m.position, Vec2::new(2.0, 0.0));
        assert_eq!(m.target, Vec2::new(9.0, 0.0));
    }
}
