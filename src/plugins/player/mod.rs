//! Player plugin: the single tracked target.
//!
//! Pipeline:
//! - Update: sample input into `PlayerInput`; apply `DamageTarget` /
//!   `HealTarget` to `Health` and report `HealthChanged` / `TargetDied`
//! - FixedUpdate: snap the input to 8 directions, ease `LinearVelocity`
//!   toward it and turn `Facing` with it
//!
//! Enemies never query for `Player`; they aim at whatever `TrackedTarget`
//! names.

use std::f32::consts::FRAC_PI_4;

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::{PLAYER_RADIUS, player_layers};
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::events::{DamageTarget, HealTarget, HealthChanged, TargetDied};
use crate::plugins::weapons::{Arsenal, WeaponRig};

#[derive(Component)]
pub struct Player;

/// The entity every enemy aims at, if one exists.
#[derive(Resource, Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedTarget(pub Option<Entity>);

/// Unit vector the owner is facing. Weapons fire along it.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct Facing(pub Vec2);

impl Default for Facing {
    fn default() -> Self {
        Self(Vec2::X)
    }
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Health {
    pub current: i32,
    pub max: i32,
}

impl Health {
    pub fn full(max: i32) -> Self {
        Self { current: max, max }
    }

    /// Subtract `amount` (never below zero). Returns the new current value.
    pub fn apply_damage(&mut self, amount: i32) -> i32 {
        self.current = (self.current - amount.max(0)).max(0);
        self.current
    }

    /// Add `amount` (never above max). Returns the new current value.
    pub fn heal(&mut self, amount: i32) -> i32 {
        self.current = (self.current + amount.max(0)).min(self.max);
        self.current
    }

    pub fn is_depleted(&self) -> bool {
        self.current <= 0
    }
}

#[derive(Resource, Default, Debug)]
struct PlayerInput {
    move_axis: Vec2,
}

pub fn plugin(app: &mut App) {
    app.init_resource::<PlayerInput>()
        .init_resource::<TrackedTarget>()
        .add_systems(OnEnter(GameState::InGame), spawn)
        .add_systems(
            Update,
            (gather_input, apply_target_health).run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedUpdate,
            apply_movement.run_if(in_state(GameState::InGame)),
        );
}

fn spawn(
    mut commands: Commands,
    tunables: Res<Tunables>,
    arsenal: Res<Arsenal>,
    time: Res<Time>,
    mut target: ResMut<TrackedTarget>,
) {
    let settings = &tunables.player;
    let mut rig = WeaponRig::default();
    for name in &settings.starting_weapons {
        match arsenal.get(name) {
            Some(def) => rig.add_weapon(def, time.elapsed()),
            None => warn!("starting weapon '{name}' is not in the arsenal"),
        }
    }

    let player = commands
        .spawn((
            Name::new("Player"),
            Player,
            Health::full(settings.max_health),
            Facing::default(),
            rig,
            Sprite::from_color(Color::srgb(0.2, 0.75, 0.9), Vec2::splat(PLAYER_RADIUS * 2.0)),
            Transform::from_xyz(0.0, 0.0, 1.0),
            RigidBody::Dynamic,
            Collider::circle(PLAYER_RADIUS),
            LockedAxes::ROTATION_LOCKED,
            player_layers(),
            LinearVelocity::ZERO,
            CollisionEventsEnabled,
            DespawnOnExit(GameState::InGame),
        ))
        .id();
    target.0 = Some(player);
    info!("player spawned with {} weapon(s)", settings.starting_weapons.len());
}

fn gather_input(keys: Option<Res<ButtonInput<KeyCode>>>, mut input: ResMut<PlayerInput>) {
    let Some(keys) = keys else {
        return;
    };
    let mut axis = Vec2::ZERO;

    if keys.pressed(KeyCode::KeyW) {
        axis.y += 1.0;
    }
    if keys.pressed(KeyCode::KeyS) {
        axis.y -= 1.0;
    }
    if keys.pressed(KeyCode::KeyA) {
        axis.x -= 1.0;
    }
    if keys.pressed(KeyCode::KeyD) {
        axis.x += 1.0;
    }

    input.move_axis = axis;
}

/// Snap an input axis to the nearest of the 8 compass directions.
pub fn snap_8(axis: Vec2) -> Vec2 {
    if axis.length_squared() <= f32::EPSILON {
        return Vec2::ZERO;
    }
    let octant = (axis.y.atan2(axis.x) / FRAC_PI_4).round();
    Vec2::from_angle(octant * FRAC_PI_4)
}

/// Move `current` toward `target` by at most `max_delta`.
fn ease_toward(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let delta = target - current;
    let distance = delta.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + delta / distance * max_delta
    }
}

fn apply_movement(
    time: Res<Time>,
    tunables: Res<Tunables>,
    input: Res<PlayerInput>,
    mut q_player: Query<(&mut LinearVelocity, &mut Facing), With<Player>>,
) {
    let Ok((mut vel, mut facing)) = q_player.single_mut() else {
        return;
    };
    let settings = &tunables.player;
    let direction = snap_8(input.move_axis);
    let (wanted, rate) = if direction == Vec2::ZERO {
        (Vec2::ZERO, settings.deceleration)
    } else {
        facing.0 = direction;
        (direction * settings.move_speed, settings.acceleration)
    };
    vel.0 = ease_toward(vel.0, wanted, rate * time.delta_secs());
}

fn apply_target_health(
    target: Res<TrackedTarget>,
    mut damage: MessageReader<DamageTarget>,
    mut heals: MessageReader<HealTarget>,
    mut q_health: Query<&mut Health>,
    mut changed: MessageWriter<HealthChanged>,
    mut died: MessageWriter<TargetDied>,
) {
    let Some(mut health) = target.0.and_then(|e| q_health.get_mut(e).ok()) else {
        // Nothing to hit; drain so stale requests do not pile up.
        damage.clear();
        heals.clear();
        return;
    };

    for req in damage.read() {
        let was_alive = !health.is_depleted();
        health.apply_damage(req.amount);
        changed.write(HealthChanged {
            current: health.current,
            max: health.max,
        });
        if was_alive && health.is_depleted() {
            info!("target died");
            died.write(TargetDied);
        }
    }
    for req in heals.read() {
        health.heal(req.amount);
        changed.write(HealthChanged {
            current: health.current,
            max: health.max,
        });
    }
}
