//! Global state machine.
//!
//! Wave progression is not a Bevy state: its guards must apply within the
//! same tick, so it lives on the `HordeDirector` resource instead.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, States, Default)]
pub enum GameState {
    #[default]
    InGame,
}
