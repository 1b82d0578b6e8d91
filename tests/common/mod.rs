//! Integration test harness.
//!
//! Keep integration tests headless:
//! - `MinimalPlugins` provides core ECS runtime.
//! - we then call `horde_runtime::game::configure_headless` to install gameplay plugins.

use std::time::Duration;

use bevy::asset::AssetPlugin;
use bevy::prelude::*;
use bevy::scene::ScenePlugin;
use bevy::state::app::StatesPlugin;
use bevy::time::TimeUpdateStrategy;

/// Simulated seconds per `app.update()`.
pub const FRAME_SECS: f32 = 0.1;

pub fn app_headless() -> App {
    let mut app = App::new();

    // AssetPlugin + ScenePlugin so SceneSpawner exists for the physics plugins.
    app.add_plugins((
        MinimalPlugins,
        StatesPlugin,
        AssetPlugin::default(),
        ScenePlugin,
    ));
    // Fixed frame length so timers do not depend on wall-clock speed.
    app.insert_resource(TimeUpdateStrategy::ManualDuration(
        Duration::from_secs_f32(FRAME_SECS),
    ));

    horde_runtime::game::configure_headless(&mut app);
    app
}

/// Run updates until roughly `secs` of game time have passed.
pub fn run_for(app: &mut App, secs: f32) {
    let frames = (secs / FRAME_SECS).ceil() as u32;
    for _ in 0..frames {
        app.update();
    }
}
