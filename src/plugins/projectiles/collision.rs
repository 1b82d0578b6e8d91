//! Projectile impact resolution.
//!
//! One pass over this tick's `CollisionStart` messages. A projectile resolves
//! at most once: the pool's active flag is checked first, and the projectile
//! is released (flag cleared immediately) as soon as it resolves, so any
//! later pair for it in the same batch is skipped.
//!
//! Damage is never applied here. Enemy damage goes out as `DamageEnemy`,
//! target damage as `DamageTarget`; their owners apply it.

use avian2d::prelude::*;
use bevy::prelude::*;

use super::components::Projectile;
use super::messages::Side;
use crate::common::contact::split_by;
use crate::common::layers::{ENEMY_RADIUS, Layer, PLAYER_RADIUS, is_in_layer};
use crate::plugins::enemies::{CombatActor, Vitals};
use crate::plugins::events::{DamageEnemy, DamageTarget, TargetHit};
use crate::plugins::player::TrackedTarget;
use crate::plugins::pool::{Prefab, Pooling};

/// Who an explosion at `center` with `radius` reaches. Bodies count as
/// reached when they overlap the blast circle.
#[derive(Debug, Default, PartialEq)]
pub struct Blast {
    pub enemies: Vec<Entity>,
    pub target: bool,
}

pub fn blast_reach(
    center: Vec2,
    radius: f32,
    enemies: impl IntoIterator<Item = (Entity, Vec2)>,
    target: Option<Vec2>,
) -> Blast {
    let enemies = enemies
        .into_iter()
        .filter(|(_, pos)| pos.distance(center) <= radius + ENEMY_RADIUS)
        .map(|(e, _)| e)
        .collect();
    let target = target.is_some_and(|pos| pos.distance(center) <= radius + PLAYER_RADIUS);
    Blast { enemies, target }
}

#[allow(clippy::too_many_arguments)]
pub fn resolve_projectile_collisions(
    mut started: MessageReader<CollisionStart>,
    target: Res<TrackedTarget>,
    q_projectiles: Query<(&Projectile, &Transform)>,
    q_layers: Query<&CollisionLayers>,
    q_enemies: Query<(Entity, &Transform, &Vitals), With<CombatActor>>,
    q_transforms: Query<&Transform, Without<Projectile>>,
    mut pooling: Pooling,
    mut enemy_damage: MessageWriter<DamageEnemy>,
    mut target_damage: MessageWriter<DamageTarget>,
    mut hits: MessageWriter<TargetHit>,
) {
    for ev in started.read() {
        let Some((shot_side, other)) = split_by(ev, |s| q_projectiles.contains(s.owner())) else {
            continue;
        };
        let shot = shot_side.owner();
        if !pooling.is_active(shot) {
            continue;
        }
        let Ok((projectile, shot_tf)) = q_projectiles.get(shot) else {
            continue;
        };
        let struck = other.owner();

        match projectile.side {
            Side::Enemy => {
                if target.0 == Some(struck) {
                    target_damage.write(DamageTarget {
                        amount: projectile.damage,
                    });
                    hits.write(TargetHit { source: shot });
                    pooling.release(shot);
                } else if q_layers
                    .get(other.collider)
                    .is_ok_and(|layers| is_in_layer(layers, Layer::World))
                {
                    pooling.release(shot);
                }
            }
            Side::Player => {
                let live_enemy = pooling.is_active(struck)
                    && q_enemies.get(struck).is_ok_and(|(_, _, v)| !v.dead);
                if !live_enemy {
                    continue;
                }

                match projectile.blast_radius.filter(|_| projectile.is_explosive()) {
                    Some(radius) => {
                        let center = shot_tf.translation.truncate();
                        let blast = blast_reach(
                            center,
                            radius,
                            q_enemies
                                .iter()
                                .filter(|(e, _, v)| !v.dead && pooling.is_active(*e))
                                .map(|(e, tf, _)| (e, tf.translation.truncate())),
                            target
                                .0
                                .and_then(|t| q_transforms.get(t).ok())
                                .map(|tf| tf.translation.truncate()),
                        );
                        debug!(
                            "explosion at {center} reached {} enemies (target: {})",
                            blast.enemies.len(),
                            blast.target
                        );
                        for entity in blast.enemies {
                            enemy_damage.write(DamageEnemy {
                                entity,
                                amount: projectile.damage,
                            });
                        }
                        if blast.target {
                            target_damage.write(DamageTarget {
                                amount: projectile.damage / 2,
                            });
                        }
                    }
                    None => {
                        enemy_damage.write(DamageEnemy {
                            entity: struck,
                            amount: projectile.damage,
                        });
                    }
                }
                pooling.release(shot);
            }
        }
    }
}

/// Return every active enemy bolt to the pool. Returns how many were live.
pub fn purge_enemy_projectiles(pooling: &mut Pooling) -> usize {
    let live = pooling.pool().active_of(Prefab::EnemyBolt);
    for &e in &live {
        pooling.release(e);
    }
    live.len()
}
