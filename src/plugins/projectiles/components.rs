use bevy::prelude::*;

use super::messages::Side;

/// Per-shot payload, rewritten on every activation.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub side: Side,
    pub damage: i32,
    pub blast_radius: Option<f32>,
}

impl Projectile {
    #[inline]
    pub fn is_explosive(&self) -> bool {
        self.blast_radius.is_some_and(|r| r > 0.0)
    }
}
