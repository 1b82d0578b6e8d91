//! Enemies plugin: pooled combat actors.
//!
//! ```text
//! FixedUpdate       steer_enemies         Transform(target) → LinearVelocity
//!                   enemy_fire_control    next_fire gate    → FireRequest
//! FixedPostUpdate   enemy_contact_damage  CollisionStart    → TargetHit + DamageTarget
//! Update            apply_enemy_damage    DamageEnemy       → EnemyDied + pool release
//! ```
//!
//! An actor is "live" while the pool reports it active and its vitals are not
//! dead. Everything that mutates health goes through `apply_enemy_damage`, so
//! death (message + release) happens in exactly one place.

pub mod behaviour;

use std::time::Duration;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::prelude::*;

use crate::common::contact::split_by;
use crate::common::layers::ENEMY_RADIUS;
use crate::common::state::GameState;
use crate::common::tunables::{EnemyTemplate, EnemyTypeEntry, Tunables, fire_interval};
use crate::plugins::events::{DamageEnemy, DamageTarget, EnemyDied, TargetHit};
use crate::plugins::player::TrackedTarget;
use crate::plugins::pool::{PoolState, Pooling};
use crate::plugins::projectiles::messages::{FireRequest, ShotKind};

/// Index into the enemy roster.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EnemyTypeId(pub usize);

/// Configured enemy types, in config order.
#[derive(Resource, Debug, Default, Clone)]
pub struct EnemyRoster {
    entries: Vec<EnemyTypeEntry>,
}

impl EnemyRoster {
    pub fn new(entries: Vec<EnemyTypeEntry>) -> Self {
        Self { entries }
    }

    pub fn get(&self, id: EnemyTypeId) -> Option<&EnemyTypeEntry> {
        self.entries.get(id.0)
    }

    /// Types allowed to appear in `wave`.
    pub fn eligible(&self, wave: u32) -> Vec<EnemyTypeId> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.min_wave <= wave)
            .map(|(i, _)| EnemyTypeId(i))
            .collect()
    }

    pub fn id_of(&self, name: &str) -> Option<EnemyTypeId> {
        self.entries
            .iter()
            .position(|e| e.name == name)
            .map(EnemyTypeId)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DamageOutcome {
    Alive,
    /// This call took health to zero or below.
    Died,
    AlreadyDead,
}

#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vitals {
    pub current: i32,
    pub max: i32,
    pub dead: bool,
}

impl Vitals {
    pub fn full(max: i32) -> Self {
        Self {
            current: max,
            max,
            dead: false,
        }
    }

    pub fn apply_damage(&mut self, amount: i32) -> DamageOutcome {
        if self.dead {
            return DamageOutcome::AlreadyDead;
        }
        self.current -= amount;
        if self.current <= 0 {
            self.dead = true;
            DamageOutcome::Died
        } else {
            DamageOutcome::Alive
        }
    }
}

#[derive(Component, Debug, Clone)]
pub struct CombatActor {
    pub enemy: EnemyTypeId,
    pub template: EnemyTemplate,
    pub target: Option<Entity>,
    pub next_fire: Duration,
}

pub fn plugin(app: &mut App) {
    let roster = EnemyRoster::new(app.world().resource::<Tunables>().enemies.clone());
    app.insert_resource(roster)
        .add_systems(
            FixedUpdate,
            (steer_enemies, enemy_fire_control).run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            enemy_contact_damage
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            Update,
            apply_enemy_damage.run_if(in_state(GameState::InGame)),
        );
}

/// Write the per-activation state onto a freshly acquired enemy: full health,
/// not dead, fire gate open, aimed at `target`.
pub fn activate_enemy(
    commands: &mut Commands,
    entity: Entity,
    enemy: EnemyTypeId,
    template: &EnemyTemplate,
    target: Option<Entity>,
) {
    if target.is_none() {
        warn!("enemy {entity:?} activated without a tracked target; it will stay idle");
    }
    commands.entity(entity).insert((
        CombatActor {
            enemy,
            template: template.clone(),
            target,
            next_fire: Duration::ZERO,
        },
        Vitals::full(template.max_health),
        Sprite::from_color(
            behaviour::tint(template.kind),
            Vec2::splat(ENEMY_RADIUS * 2.0),
        ),
    ));
}

fn steer_enemies(
    time: Res<Time>,
    mut q_actors: Query<(&CombatActor, &Vitals, &PoolState, &Transform, &mut LinearVelocity)>,
    q_positions: Query<&Transform, Without<CombatActor>>,
) {
    let dt = time.delta_secs();
    for (actor, vitals, state, tf, mut vel) in &mut q_actors {
        if *state != PoolState::Active || vitals.dead {
            continue;
        }
        let Some(target) = actor.target.and_then(|t| q_positions.get(t).ok()) else {
            vel.0 = Vec2::ZERO;
            continue;
        };
        vel.0 = behaviour::steer(
            &actor.template,
            tf.translation.truncate(),
            target.translation.truncate(),
            dt,
        );
    }
}

fn enemy_fire_control(
    time: Res<Time>,
    mut q_actors: Query<(&mut CombatActor, &Vitals, &PoolState, &Transform)>,
    q_positions: Query<&Transform, Without<CombatActor>>,
    mut fire: MessageWriter<FireRequest>,
) {
    let now = time.elapsed();
    for (mut actor, vitals, state, tf) in &mut q_actors {
        if *state != PoolState::Active || vitals.dead || !behaviour::shoots(actor.template.kind) {
            continue;
        }
        if now < actor.next_fire {
            continue;
        }
        let Some(interval) = fire_interval(actor.template.fire_rate) else {
            continue;
        };
        let Some(target) = actor.target.and_then(|t| q_positions.get(t).ok()) else {
            continue;
        };
        let origin = tf.translation.truncate();
        let Some(direction) = (target.translation.truncate() - origin).try_normalize() else {
            continue;
        };

        fire.write(FireRequest {
            kind: ShotKind::EnemyBolt,
            origin,
            direction,
            speed: actor.template.projectile_speed,
            damage: actor.template.projectile_damage,
            blast_radius: None,
        });
        actor.next_fire = now + interval;
    }
}

fn enemy_contact_damage(
    mut started: MessageReader<CollisionStart>,
    target: Res<TrackedTarget>,
    q_actors: Query<(&CombatActor, &Vitals, &PoolState)>,
    mut hits: MessageWriter<TargetHit>,
    mut damage: MessageWriter<DamageTarget>,
) {
    let Some(target) = target.0 else {
        return;
    };
    for ev in started.read() {
        let Some((enemy_side, other)) = split_by(ev, |s| q_actors.contains(s.owner())) else {
            continue;
        };
        if other.owner() != target {
            continue;
        }
        let Ok((actor, vitals, state)) = q_actors.get(enemy_side.owner()) else {
            continue;
        };
        if *state != PoolState::Active || vitals.dead {
            continue;
        }
        hits.write(TargetHit {
            source: enemy_side.owner(),
        });
        damage.write(DamageTarget {
            amount: actor.template.contact_damage,
        });
    }
}

pub fn apply_enemy_damage(
    mut requests: MessageReader<DamageEnemy>,
    mut q_actors: Query<(&CombatActor, &mut Vitals)>,
    mut pooling: Pooling,
    mut died: MessageWriter<EnemyDied>,
) {
    for req in requests.read() {
        if !pooling.is_active(req.entity) {
            debug!("damage for inactive enemy {:?} dropped", req.entity);
            continue;
        }
        let Ok((actor, mut vitals)) = q_actors.get_mut(req.entity) else {
            continue;
        };
        if vitals.apply_damage(req.amount) == DamageOutcome::Died {
            died.write(EnemyDied {
                entity: req.entity,
                enemy: actor.enemy,
            });
            pooling.release(req.entity);
        }
    }
}
