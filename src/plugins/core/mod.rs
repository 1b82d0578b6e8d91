//! Core plugin: tunables, the shared rng and global settings.
//!
//! Must be registered before any plugin that reads `Tunables` while building.

use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::{TUNABLES_PATH, Tunables};

pub fn plugin(app: &mut App) {
    app.insert_resource(load_tunables(TUNABLES_PATH))
        .insert_resource(GameRng::from_entropy())
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.07)));
}

/// Read tunables from `path`, falling back to the built-in defaults.
pub fn load_tunables(path: &str) -> Tunables {
    match Tunables::read(path) {
        Ok(tunables) => {
            info!("tunables loaded from {path}");
            tunables
        }
        Err(e) => {
            warn!("{e}; using default tunables");
            Tunables::default()
        }
    }
}

#[cfg(test)]
mod tests;
