//! Input handling.
//!
//! Raw device polling happens outside the core; the view layer samples it
//! into an [`InputState`] once per frame and hands that to the tick.

use arena_shared::math::Vec2;

bitflags::bitflags! {
    /// Held buttons.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Buttons: u8 {
        const UP = 1 << 0;
        const DOWN = 1 << 1;
        const LEFT = 1 << 2;
        const RIGHT = 1 << 3;
        const SHOOT = 1 << 4;
    }
}

/// User input state at a moment in time.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub buttons: Buttons,
    /// Aim angle in radians (pointer direction relative to the actor).
    pub aim: f32,
}

impl InputState {
    pub fn new(buttons: Buttons, aim: f32) -> Self {
        Self { buttons, aim }
    }

    /// Raw direction from the held keys, each component in $[-1,1]$.
    /// Diagonals are intentionally not normalized.
    pub fn direction(self) -> Vec2 {
        let axis = |neg: Buttons, pos: Buttons| {
            let mut v = 0.0;
            if self.buttons.contains(neg) {
                v -= 1.0;
            }
            if self.buttons.contains(pos) {
                v += 1.0;
            }
            v
        };
        Vec2::new(
            axis(Buttons::LEFT, Buttons::RIGHT),
            axis(Buttons::UP, Buttons::DOWN),
        )
    }

    pub fn shooting(self) -> bool {
        self.buttons.contains(Buttons::SHOOT)
    }
}
