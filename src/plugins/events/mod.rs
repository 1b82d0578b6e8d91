//! Message bus.
//!
//! Every cross-feature notification is a typed Bevy `Message` registered
//! here, so any plugin (or an external presentation layer) can read it
//! without knowing who wrote it.
//!
//! ```text
//!   horde     ──SpawnBatch──────────▶ spawning ──EnemySpawned/SpawnAborted──▶ horde
//!   enemies   ──FireRequest─────────▶ projectiles
//!   weapons   ──FireRequest─────────▶ projectiles
//!   projectiles ──DamageEnemy───────▶ enemies ──EnemyDied──▶ horde
//!   projectiles/enemies ──DamageTarget/TargetHit──▶ player ──HealthChanged──▶ *
//!   pickups   ──UpgradePicked───────▶ horde
//! ```

use avian2d::prelude::CollisionStart;
use bevy::ecs::message::Messages;
use bevy::prelude::*;

use crate::plugins::enemies::EnemyTypeId;
use crate::plugins::projectiles::messages::FireRequest;

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveStarted {
    pub wave: u32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaveEnded {
    pub wave: u32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct CalmPhaseStarted {
    pub wave: u32,
}

/// Difficulty scalar for the wave that just started (`multiplier^(wave-1)`).
#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct DifficultyChanged {
    pub value: f32,
}

/// The tracked target was struck by `source` (an enemy body or bolt).
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetHit {
    pub source: Entity,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpawned {
    pub entity: Entity,
    pub enemy: EnemyTypeId,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemyDied {
    pub entity: Entity,
    pub enemy: EnemyTypeId,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageEnemy {
    pub entity: Entity,
    pub amount: i32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct DamageTarget {
    pub amount: i32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealTarget {
    pub amount: i32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct HealthChanged {
    pub current: i32,
    pub max: i32,
}

#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetDied;

/// Stage `count` spawn sequences of one enemy type.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnBatch {
    pub enemy: EnemyTypeId,
    pub count: u32,
}

/// One staged enemy will never materialize (no area, unknown type, pool
/// exhausted). Lets the wave write it off instead of waiting forever.
#[derive(Message, Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnAborted {
    pub enemy: EnemyTypeId,
}

#[derive(Message, Clone, Debug, PartialEq, Eq)]
pub struct UpgradePicked {
    pub weapon: String,
}

pub fn plugin(app: &mut App) {
    app.add_message::<WaveStarted>()
        .add_message::<WaveEnded>()
        .add_message::<CalmPhaseStarted>()
        .add_message::<DifficultyChanged>()
        .add_message::<TargetHit>()
        .add_message::<EnemySpawned>()
        .add_message::<EnemyDied>()
        .add_message::<DamageEnemy>()
        .add_message::<DamageTarget>()
        .add_message::<HealTarget>()
        .add_message::<HealthChanged>()
        .add_message::<TargetDied>()
        .add_message::<SpawnBatch>()
        .add_message::<SpawnAborted>()
        .add_message::<UpgradePicked>()
        .add_message::<FireRequest>();
}

/// Message storage without an `App`, for systems run directly on a `World`.
/// Includes the physics `CollisionStart` queue.
pub fn init_message_queues(world: &mut World) {
    world.init_resource::<Messages<WaveStarted>>();
    world.init_resource::<Messages<WaveEnded>>();
    world.init_resource::<Messages<CalmPhaseStarted>>();
    world.init_resource::<Messages<DifficultyChanged>>();
    world.init_resource::<Messages<TargetHit>>();
    world.init_resource::<Messages<EnemySpawned>>();
    world.init_resource::<Messages<EnemyDied>>();
    world.init_resource::<Messages<DamageEnemy>>();
    world.init_resource::<Messages<DamageTarget>>();
    world.init_resource::<Messages<HealTarget>>();
    world.init_resource::<Messages<HealthChanged>>();
    world.init_resource::<Messages<TargetDied>>();
    world.init_resource::<Messages<SpawnBatch>>();
    world.init_resource::<Messages<SpawnAborted>>();
    world.init_resource::<Messages<UpgradePicked>>();
    world.init_resource::<Messages<FireRequest>>();
    world.init_resource::<Messages<CollisionStart>>();
}
