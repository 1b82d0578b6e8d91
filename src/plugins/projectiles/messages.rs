//! Buffered fire requests.
//!
//! Shooters (enemy fire gates, the player's weapon rig, burst wakes) never
//! touch the pool. They write intent; `allocate_projectiles` is the single
//! consumer that acquires pooled entities and writes their components.

use bevy::prelude::*;

use crate::plugins::pool::Prefab;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShotKind {
    EnemyBolt,
    PlayerBolt,
    /// Stationary player hit volume with a short lifetime.
    MeleeSlash,
}

impl ShotKind {
    pub fn prefab(self) -> Prefab {
        match self {
            ShotKind::EnemyBolt => Prefab::EnemyBolt,
            ShotKind::PlayerBolt => Prefab::PlayerBolt,
            ShotKind::MeleeSlash => Prefab::MeleeSlash,
        }
    }

    pub fn side(self) -> Side {
        match self {
            ShotKind::EnemyBolt => Side::Enemy,
            ShotKind::PlayerBolt | ShotKind::MeleeSlash => Side::Player,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Enemy,
    Player,
}

#[derive(Message, Clone, Copy, Debug, PartialEq)]
pub struct FireRequest {
    pub kind: ShotKind,
    pub origin: Vec2,
    /// Unit vector; also orients the sprite.
    pub direction: Vec2,
    pub speed: f32,
    pub damage: i32,
    /// Explosive shots damage everything in this radius on impact.
    pub blast_radius: Option<f32>,
}
