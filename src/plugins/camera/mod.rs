//! Camera plugin: a 2D camera that eases toward the tracked target.
//!
//! ```text
//! OnEnter(InGame): spawn MainCamera
//! PostUpdate:      follow_target (before transform propagation)
//! ```
//!
//! The two `Transform` queries are made disjoint with `Without<MainCamera>`
//! so the system passes Bevy's aliasing check (B0001).

use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::state::GameState;
use crate::plugins::player::TrackedTarget;

#[derive(Component)]
pub struct MainCamera {
    pub responsiveness: f32,
}

pub fn plugin(app: &mut App) {
    app.add_systems(OnEnter(GameState::InGame), spawn_camera)
        .add_systems(
            PostUpdate,
            follow_target
                .before(TransformSystems::Propagate)
                .run_if(in_state(GameState::InGame)),
        );
}

fn spawn_camera(mut commands: Commands) {
    commands.spawn((
        Name::new("MainCamera"),
        Camera2d,
        MainCamera { responsiveness: 5.0 },
        Transform::from_xyz(0.0, 0.0, 999.0),
        DespawnOnExit(GameState::InGame),
    ));
}

fn follow_target(
    time: Res<Time>,
    target: Res<TrackedTarget>,
    q_target: Query<&Transform, Without<MainCamera>>,
    mut q_cam: Query<(&mut Transform, &MainCamera)>,
) {
    let Some(tf_target) = target.0.and_then(|e| q_target.get(e).ok()) else {
        return;
    };
    let Ok((mut tf_cam, cam)) = q_cam.single_mut() else {
        return;
    };

    let alpha = 1.0 - (-cam.responsiveness * time.delta_secs()).exp();
    let goal = tf_target.translation.truncate();
    let eased = tf_cam.translation.truncate().lerp(goal, alpha);
    tf_cam.translation.x = eased.x;
    tf_cam.translation.y = eased.y;
}
