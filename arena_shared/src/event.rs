//! Event and messaging system.
//!
//! This is a small typed event bus.
//! - Client: impact effects for the renderer, anything else the view layer
//!   wants to drain once per frame.
//!
//! Visual side effects leave the core through [`EffectHook`]; the bus is the
//! default sink for them.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
};

use crate::math::Vec2;

/// Typed event bus.
#[derive(Default)]
pub struct EventBus {
    queues: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl EventBus {
    /// Queues an event behind earlier ones of the same type.
    pub fn push<E: 'static + Send + Sync>(&mut self, e: E) {
        let slot = self
            .queues
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(Vec::<E>::new()));
        // Keyed by `TypeId::of::<E>()`, so the downcast cannot miss.
        if let Some(queue) = slot.downcast_mut::<Vec<E>>() {
            queue.push(e);
        }
    }

    /// Number of queued events of a type.
    pub fn pending<E: 'static + Send + Sync>(&self) -> usize {
        self.queues
            .get(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast_ref::<Vec<E>>())
            .map_or(0, Vec::len)
    }

    /// Drains all queued events of a type.
    pub fn drain<E: 'static + Send + Sync>(&mut self) -> Vec<E> {
        self.queues
            .remove(&TypeId::of::<E>())
            .and_then(|boxed| boxed.downcast::<Vec<E>>().ok())
            .map(|boxed| *boxed)
            .unwrap_or_default()
    }
}

/// A requested impact effect.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpactEffect {
    pub at: Vec2,
    /// 0xRRGGBB.
    pub color: u32,
}

/// Fire-and-forget visual side effects.
pub trait EffectHook {
    fn spawn_impact(&mut self, at: Vec2, color: u32);
}

impl EffectHook for EventBus {
    fn spawn_impact(&mut self, at: Vec2, color: u32) {
        self.push(ImpactEffect { at, color });
    }
}

impl EffectHook for Vec<ImpactEffect> {
    fn spawn_impact(&mut self, at: Vec2, color: u32) {
        self.push(ImpactEffect { at, color });
    }
}
