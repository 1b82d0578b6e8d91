//! Shared random source.
//!
//! One `StdRng` for all gameplay rolls so tests can pin the sequence with a
//! seed.

use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

#[derive(Resource, Deref, DerefMut)]
pub struct GameRng(pub StdRng);

impl GameRng {
    pub fn from_entropy() -> Self {
        Self(StdRng::from_os_rng())
    }

    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}
