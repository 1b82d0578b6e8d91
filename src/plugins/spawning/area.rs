use bevy::prelude::*;
use rand::Rng;

use crate::common::tunables::AreaTunables;

/// Axis-aligned rectangle enemies may appear in.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SpawnArea {
    pub min: Vec2,
    pub max: Vec2,
}

impl SpawnArea {
    /// Corners may be given in any order.
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Uniform point inside the rectangle, edges included.
    pub fn sample(&self, rng: &mut impl Rng) -> Vec2 {
        Vec2::new(
            rng.random_range(self.min.x..=self.max.x),
            rng.random_range(self.min.y..=self.max.y),
        )
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }
}

impl From<&AreaTunables> for SpawnArea {
    fn from(t: &AreaTunables) -> Self {
        Self::new(Vec2::from_array(t.min), Vec2::from_array(t.max))
    }
}
