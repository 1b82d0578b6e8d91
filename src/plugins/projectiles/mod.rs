//! Projectiles plugin: message-based producer → consumer firing on top of the
//! actor pool.
//!
//! ```text
//!   Update (variable dt)
//!┌──────────────────────────────────────────────────────────────────────────┐
//!│  Producers (enemy fire gates, weapon rig, burst wakes)                   │
//!│      - write: FireRequest { kind, origin, direction, speed, damage, .. } │
//!│                                                                          │
//!│  Consumer: allocate_projectiles                                          │
//!│      - Pooling::acquire(kind.prefab())                                   │
//!│      - writes: Projectile, LinearVelocity                                │
//!│      - Pooling::release_after(lease, lifetime)                           │
//!└──────────────────────────────────────────────────────────────────────────┘
//!                │
//!                v
//!   FixedPostUpdate (fixed dt)
//!┌──────────────────────────────────────────────────────────────────────────┐
//!│  Physics emits CollisionStart messages (Avian)                           │
//!│                                                                          │
//!│  resolve_projectile_collisions                                           │
//!│      - enemy bolt × target → DamageTarget + TargetHit, release           │
//!│      - enemy bolt × world  → release                                     │
//!│      - player shot × enemy → DamageEnemy (single or blast), release      │
//!└──────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Lifetime expiry and impact both release through the pool; whichever comes
//! first wins and the other finds a stale lease.

pub mod allocator;
pub mod collision;
pub mod components;
pub mod messages;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use bevy::prelude::*;

use crate::common::state::GameState;

pub use collision::purge_enemy_projectiles;

pub fn plugin(app: &mut App) {
    app.add_systems(
        Update,
        allocator::allocate_projectiles.run_if(in_state(GameState::InGame)),
    )
    .add_systems(
        FixedPostUpdate,
        collision::resolve_projectile_collisions
            .after(CollisionEventSystems)
            .run_if(in_state(GameState::InGame)),
    );
}
