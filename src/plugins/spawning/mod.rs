//! Spawning: turns `SpawnBatch` requests into staged "warning → materialize"
//! sequences.
//!
//! ```text
//!   SpawnBatch { enemy, count }
//!      └─ per unit: random area → sample position
//!           ├─ warnings on:  acquire SpawnWarning, wake after warning_duration
//!           └─ warnings off: wake immediately
//!   wake (SpawnStep::Materialize)
//!      ├─ release the warning (if its lease is still current)
//!      ├─ acquire Enemy(id) at the position, activate from template
//!      └─ EnemySpawned  (or SpawnAborted if the pool is full)
//! ```
//!
//! Units are independent timeline tasks; nothing here knows about waves.

pub mod area;

use bevy::prelude::*;
use rand::Rng;

use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::{EnemyRoster, EnemyTypeId, activate_enemy};
use crate::plugins::events::{EnemySpawned, SpawnAborted, SpawnBatch};
use crate::plugins::player::TrackedTarget;
use crate::plugins::pool::{Lease, Pooling, Prefab};
use crate::plugins::schedule::Timeline;

pub use area::SpawnArea;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpawnStep {
    Materialize {
        enemy: EnemyTypeId,
        position: Vec2,
        warning: Option<Lease>,
    },
}

pub fn plugin(app: &mut App) {
    app.init_resource::<Timeline<SpawnStep>>().add_systems(
        Update,
        (stage_spawn_batches, run_spawn_steps)
            .chain()
            .run_if(in_state(GameState::InGame)),
    );
}

#[allow(clippy::too_many_arguments)]
pub fn stage_spawn_batches(
    mut batches: MessageReader<SpawnBatch>,
    tunables: Res<Tunables>,
    roster: Res<EnemyRoster>,
    q_areas: Query<&SpawnArea>,
    mut rng: ResMut<GameRng>,
    mut pooling: Pooling,
    mut steps: ResMut<Timeline<SpawnStep>>,
    mut aborted: MessageWriter<SpawnAborted>,
) {
    let areas: Vec<SpawnArea> = q_areas.iter().copied().collect();
    let settings = &tunables.spawning;

    for batch in batches.read() {
        if roster.get(batch.enemy).is_none() {
            warn!("spawn batch for unknown enemy {:?} dropped", batch.enemy);
            aborted.write_batch((0..batch.count).map(|_| SpawnAborted { enemy: batch.enemy }));
            continue;
        }
        if areas.is_empty() {
            warn!("no spawn areas configured; dropping {} spawns", batch.count);
            aborted.write_batch((0..batch.count).map(|_| SpawnAborted { enemy: batch.enemy }));
            continue;
        }

        let now = pooling.elapsed();
        for _ in 0..batch.count {
            let area = areas[rng.random_range(0..areas.len())];
            let position = area.sample(&mut rng.0);

            let (warning, delay) = if settings.warnings {
                (
                    pooling.acquire(Prefab::SpawnWarning, position, 0.0),
                    settings.warning_duration,
                )
            } else {
                (None, 0.0)
            };

            steps.schedule_in(
                now,
                delay,
                SpawnStep::Materialize {
                    enemy: batch.enemy,
                    position,
                    warning,
                },
            );
        }
    }
}

pub fn run_spawn_steps(
    mut steps: ResMut<Timeline<SpawnStep>>,
    roster: Res<EnemyRoster>,
    target: Res<TrackedTarget>,
    mut pooling: Pooling,
    mut spawned: MessageWriter<EnemySpawned>,
    mut aborted: MessageWriter<SpawnAborted>,
) {
    let now = pooling.elapsed();
    for step in steps.drain_due(now) {
        let SpawnStep::Materialize {
            enemy,
            position,
            warning,
        } = step;

        if let Some(lease) = warning.filter(|l| pooling.pool().is_current(*l)) {
            pooling.release(lease.entity);
        }

        let Some(entry) = roster.get(enemy) else {
            aborted.write(SpawnAborted { enemy });
            continue;
        };
        let Some(lease) = pooling.acquire(Prefab::Enemy(enemy), position, 0.0) else {
            aborted.write(SpawnAborted { enemy });
            continue;
        };

        activate_enemy(
            pooling.commands(),
            lease.entity,
            enemy,
            &entry.template,
            target.0,
        );
        spawned.write(EnemySpawned {
            entity: lease.entity,
            enemy,
        });
    }
}

#[cfg(test)]
mod tests;
