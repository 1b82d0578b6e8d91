//! Fire consumer: activate projectiles from the pool.
//!
//! Exhaustion is a capacity decision (the pool logs it); the request is
//! dropped and nothing else happens.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::Projectile;
use super::messages::{FireRequest, ShotKind};
use crate::common::tunables::Tunables;
use crate::plugins::pool::Pooling;

pub fn allocate_projectiles(
    tunables: Res<Tunables>,
    mut requests: MessageReader<FireRequest>,
    mut pooling: Pooling,
) {
    let limits = &tunables.projectiles;
    for req in requests.read() {
        let rotation = req.direction.y.atan2(req.direction.x);
        let Some(lease) = pooling.acquire(req.kind.prefab(), req.origin, rotation) else {
            continue;
        };

        let lifetime = match req.kind {
            ShotKind::MeleeSlash => limits.melee_lifetime,
            ShotKind::EnemyBolt | ShotKind::PlayerBolt => limits.lifetime,
        };

        pooling.commands().entity(lease.entity).insert((
            Projectile {
                side: req.kind.side(),
                damage: req.damage,
                blast_radius: req.blast_radius,
            },
            LinearVelocity(req.direction * req.speed),
        ));
        pooling.release_after(lease, lifetime);
    }
}
