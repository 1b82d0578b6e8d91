//! Actor pool: every transient entity (enemies, bolts, melee slashes, spawn
//! warnings, upgrade pickups) is recycled through here.
//!
//! # Lifecycle
//! ```text
//!   acquire(prefab, pos, rot)
//!      ├─ idle entity available  → reuse it
//!      ├─ below prefab ceiling   → spawn a fresh shell (hidden, inert)
//!      └─ at ceiling             → None (capacity decision, logged at debug)
//!   then: Transform + Visible + active collision filters + PoolState::Active
//!
//!   release(entity)
//!      ├─ active   → Hidden + zero velocity + empty filters + PoolState::Idle
//!      ├─ idle     → nothing (double release is expected, not an error)
//!      └─ unknown  → warn + despawn
//!
//!   release_after(lease, delay)
//!      → Timeline<DelayedRelease>; fires only if the lease is still current
//! ```
//!
//! Nothing here removes components or despawns pooled entities. Disabling is
//! done by value writes so entities never move between archetypes on churn.

pub mod store;

use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::common::layers::{
    ENEMY_RADIUS, Layer, enemy_bullet_layers, enemy_layers, inert, pickup_layers,
    player_bullet_layers,
};
use crate::common::state::GameState;
use crate::common::tunables::{PoolKind, PoolTunables, Tunables};
use crate::plugins::enemies::EnemyTypeId;
use crate::plugins::schedule::Timeline;

pub use store::{Acquired, ActorPool, Lease, PoolError, Release};

/// Template identity: one pool per distinct value.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Prefab {
    Enemy(EnemyTypeId),
    EnemyBolt,
    PlayerBolt,
    MeleeSlash,
    SpawnWarning,
    UpgradePickup,
}

impl Prefab {
    /// Collision membership, or `None` for purely visual prefabs.
    pub fn layer(self) -> Option<Layer> {
        match self {
            Prefab::Enemy(_) => Some(Layer::Enemy),
            Prefab::EnemyBolt => Some(Layer::EnemyBullet),
            Prefab::PlayerBolt | Prefab::MeleeSlash => Some(Layer::PlayerBullet),
            Prefab::UpgradePickup => Some(Layer::Pickup),
            Prefab::SpawnWarning => None,
        }
    }

    pub fn active_layers(self) -> Option<CollisionLayers> {
        match self {
            Prefab::Enemy(_) => Some(enemy_layers()),
            Prefab::EnemyBolt => Some(enemy_bullet_layers()),
            Prefab::PlayerBolt | Prefab::MeleeSlash => Some(player_bullet_layers()),
            Prefab::UpgradePickup => Some(pickup_layers()),
            Prefab::SpawnWarning => None,
        }
    }

    fn depth(self) -> f32 {
        match self {
            Prefab::SpawnWarning => 0.5,
            Prefab::UpgradePickup => 0.8,
            Prefab::Enemy(_) => 1.0,
            Prefab::EnemyBolt | Prefab::PlayerBolt | Prefab::MeleeSlash => 2.0,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Prefab::Enemy(_) => "Enemy(Pooled)",
            Prefab::EnemyBolt => "EnemyBolt(Pooled)",
            Prefab::PlayerBolt => "PlayerBolt(Pooled)",
            Prefab::MeleeSlash => "MeleeSlash(Pooled)",
            Prefab::SpawnWarning => "SpawnWarning(Pooled)",
            Prefab::UpgradePickup => "UpgradePickup(Pooled)",
        }
    }
}

/// Component mirror of the pool's active flag, for query filtering.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PoolState {
    #[default]
    Idle,
    Active,
}

#[derive(Debug, Clone, Copy)]
pub struct DelayedRelease(pub Lease);

pub fn plugin(app: &mut App) {
    let tunables = app.world().resource::<Tunables>();
    let pool = configured_pool(&tunables.pool, tunables.enemies.len());
    app.insert_resource(pool)
        .init_resource::<Timeline<DelayedRelease>>()
        .add_systems(
            Update,
            run_delayed_releases.run_if(in_state(GameState::InGame)),
        );
}

/// An empty pool with the configured default ceiling and per-kind overrides.
pub fn configured_pool(settings: &PoolTunables, enemy_types: usize) -> ActorPool {
    let mut pool = ActorPool::new(settings.max_active);
    for ceiling in &settings.ceilings {
        let prefabs: Vec<Prefab> = match ceiling.kind {
            PoolKind::Enemies => (0..enemy_types).map(|i| Prefab::Enemy(EnemyTypeId(i))).collect(),
            PoolKind::EnemyBolt => vec![Prefab::EnemyBolt],
            PoolKind::PlayerBolt => vec![Prefab::PlayerBolt],
            PoolKind::MeleeSlash => vec![Prefab::MeleeSlash],
            PoolKind::SpawnWarning => vec![Prefab::SpawnWarning],
            PoolKind::UpgradePickup => vec![Prefab::UpgradePickup],
        };
        for prefab in prefabs {
            pool.set_capacity(prefab, ceiling.max_active);
        }
    }
    pool
}

/// Pool access for systems: bookkeeping plus the component writes that go
/// with it.
#[derive(SystemParam)]
pub struct Pooling<'w, 's> {
    commands: Commands<'w, 's>,
    pool: ResMut<'w, ActorPool>,
    releases: ResMut<'w, Timeline<DelayedRelease>>,
    time: Res<'w, Time>,
}

impl<'w, 's> Pooling<'w, 's> {
    pub fn commands(&mut self) -> &mut Commands<'w, 's> {
        &mut self.commands
    }

    pub fn pool(&self) -> &ActorPool {
        &self.pool
    }

    pub fn acquire(&mut self, prefab: Prefab, position: Vec2, rotation: f32) -> Option<Lease> {
        let commands = &mut self.commands;
        let acquired = match self
            .pool
            .acquire_with(prefab, || spawn_shell(commands, prefab))
        {
            Ok(a) => a,
            Err(e) => {
                debug!("{e}");
                return None;
            }
        };

        let mut ec = self.commands.entity(acquired.lease.entity);
        ec.insert((
            Transform::from_translation(position.extend(prefab.depth()))
                .with_rotation(Quat::from_rotation_z(rotation)),
            Visibility::Visible,
            PoolState::Active,
        ));
        if let Some(layers) = prefab.active_layers() {
            ec.insert((layers, LinearVelocity::ZERO));
        }
        Some(acquired.lease)
    }

    pub fn release(&mut self, entity: Entity) -> Release {
        let outcome = self.pool.release(entity);
        match outcome {
            Release::Released(prefab) => {
                let mut ec = self.commands.entity(entity);
                ec.insert((Visibility::Hidden, PoolState::Idle));
                if let Some(layer) = prefab.layer() {
                    ec.insert((inert(layer), LinearVelocity::ZERO));
                }
            }
            Release::AlreadyIdle => {}
            Release::Unknown => {
                warn!("release of {entity:?} which the pool never issued; despawning it");
                if let Ok(mut ec) = self.commands.get_entity(entity) {
                    ec.despawn();
                }
            }
        }
        outcome
    }

    pub fn release_after(&mut self, lease: Lease, delay_secs: f32) {
        let now = self.time.elapsed();
        self.releases
            .schedule_in(now, delay_secs, DelayedRelease(lease));
    }

    /// Fire every delayed release that has come due. Stale leases are skipped.
    pub fn release_due(&mut self) {
        let now = self.time.elapsed();
        for DelayedRelease(lease) in self.releases.drain_due(now) {
            if self.pool.is_current(lease) {
                self.release(lease.entity);
            } else {
                debug!("skipping stale delayed release of {:?}", lease.entity);
            }
        }
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.pool.is_active(entity)
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.time.elapsed()
    }
}

fn run_delayed_releases(mut pooling: Pooling) {
    pooling.release_due();
}

/// Create the hidden, inert shell for a prefab. Activation data (health,
/// velocity, damage) is written by the feature that acquired it.
fn spawn_shell(commands: &mut Commands, prefab: Prefab) -> Entity {
    let mut ec = commands.spawn((
        Name::new(prefab.label()),
        PoolState::Idle,
        Transform::default(),
        Visibility::Hidden,
    ));

    match prefab {
        Prefab::Enemy(_) => {
            ec.insert((
                Sprite::from_color(Color::srgb(0.9, 0.25, 0.25), Vec2::splat(ENEMY_RADIUS * 2.0)),
                RigidBody::Dynamic,
                Collider::circle(ENEMY_RADIUS),
                LockedAxes::ROTATION_LOCKED,
                inert(Layer::Enemy),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ));
        }
        Prefab::EnemyBolt => {
            ec.insert((
                Sprite::from_color(Color::srgb(1.0, 0.35, 0.6), Vec2::splat(10.0)),
                RigidBody::Dynamic,
                Collider::circle(5.0),
                Sensor,
                inert(Layer::EnemyBullet),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ));
        }
        Prefab::PlayerBolt => {
            ec.insert((
                Sprite::from_color(Color::srgb(1.0, 0.85, 0.3), Vec2::splat(8.0)),
                RigidBody::Dynamic,
                Collider::circle(4.0),
                Sensor,
                inert(Layer::PlayerBullet),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ));
        }
        Prefab::MeleeSlash => {
            ec.insert((
                Sprite::from_color(Color::srgba(0.85, 0.95, 1.0, 0.6), Vec2::new(36.0, 20.0)),
                RigidBody::Dynamic,
                Collider::rectangle(36.0, 20.0),
                Sensor,
                inert(Layer::PlayerBullet),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ));
        }
        Prefab::SpawnWarning => {
            ec.insert(Sprite::from_color(
                Color::srgba(1.0, 0.2, 0.2, 0.35),
                Vec2::splat(ENEMY_RADIUS * 2.5),
            ));
        }
        Prefab::UpgradePickup => {
            ec.insert((
                Sprite::from_color(Color::srgb(0.35, 0.95, 0.45), Vec2::splat(24.0)),
                RigidBody::Static,
                Collider::circle(12.0),
                Sensor,
                inert(Layer::Pickup),
                LinearVelocity::ZERO,
                CollisionEventsEnabled,
            ));
        }
    }
    ec.id()
}
