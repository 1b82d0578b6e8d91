//! Feature plugins.
//!
//! Registration order matters: `core` inserts `Tunables`, which the other
//! plugins read while building.

use bevy::prelude::*;

pub mod core;
pub mod enemies;
pub mod events;
pub mod horde;
pub mod physics;
pub mod player;
pub mod pool;
pub mod projectiles;
pub mod schedule;
pub mod spawning;
pub mod weapons;
pub mod world;

// Render-only
pub mod camera;

/// Register gameplay plugins that work in headless tests.
pub fn register_gameplay(app: &mut App) {
    core::plugin(app);
    events::plugin(app);
    physics::plugin(app);
    pool::plugin(app);
    world::plugin(app);
    weapons::plugin(app);
    player::plugin(app);
    enemies::plugin(app);
    spawning::plugin(app);
    projectiles::plugin(app);
    horde::plugin(app);
}

/// Register render-only plugins (requires DefaultPlugins / render infra).
pub fn register_render(app: &mut App) {
    camera::plugin(app);
}

/// Register all plugins (full app).
pub fn register_all(app: &mut App) {
    register_gameplay(app);
    register_render(app);
}
