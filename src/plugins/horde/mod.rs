//! Horde plugin: wave progression on top of `HordeDirector`.
//!
//! ```text
//! OnEnter(InGame)   schedule_first_wave   HordeCue::StartWave after first_wave_delay
//! Update            run_horde_cues        StartWave / SpawnStep → SpawnBatch(1)
//!                   count_losses          EnemyDied + SpawnAborted → alive -= 1
//!                   close_cleared_wave    purge bolts, WaveEnded, CalmPhaseStarted,
//!                                         upgrade offers (or straight to next wave)
//!                   apply_upgrade_pick    UpgradePicked → rig + next wave
//! FixedPostUpdate   pickup_contact        CollisionStart(offer, target) → UpgradePicked
//! ```
//!
//! Spawn steps carry the wave they belong to; a step from an older wave is a
//! no-op when it wakes. The Update chain runs after `allocate_projectiles`, so
//! a bolt requested on the frame a wave clears is already pooled when the
//! purge runs.

pub mod director;

use avian2d::collision::narrow_phase::CollisionEventSystems;
use avian2d::prelude::*;
use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use rand::Rng;
use rand::seq::index::sample;

use crate::common::contact::split_by;
use crate::common::rng::GameRng;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::EnemyRoster;
use crate::plugins::events::{
    CalmPhaseStarted, DifficultyChanged, EnemyDied, SpawnAborted, SpawnBatch, UpgradePicked,
    WaveEnded, WaveStarted,
};
use crate::plugins::player::TrackedTarget;
use crate::plugins::pool::{Pooling, Prefab};
use crate::plugins::projectiles::allocator::allocate_projectiles;
use crate::plugins::projectiles::purge_enemy_projectiles;
use crate::plugins::schedule::Timeline;
use crate::plugins::spawning;
use crate::plugins::weapons::{Arsenal, WeaponRig};

pub use director::{HordeDirector, Loss, WaveCounters, WaveStart, WaveState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HordeCue {
    StartWave,
    SpawnStep { wave: u32 },
}

/// Weapon granted by an upgrade pickup.
#[derive(Component, Debug, Clone, PartialEq, Eq)]
pub struct UpgradeOffer {
    pub weapon: String,
}

pub fn plugin(app: &mut App) {
    let wave = &app.world().resource::<Tunables>().wave;
    let director = HordeDirector::new(wave.base_per_wave, wave.difficulty_multiplier);
    app.insert_resource(director)
        .init_resource::<Timeline<HordeCue>>()
        .add_systems(OnEnter(GameState::InGame), schedule_first_wave)
        .add_systems(
            Update,
            (
                run_horde_cues,
                count_losses,
                close_cleared_wave,
                apply_upgrade_pick,
            )
                .chain()
                .after(allocate_projectiles)
                .before(spawning::stage_spawn_batches)
                .run_if(in_state(GameState::InGame)),
        )
        .add_systems(
            FixedPostUpdate,
            pickup_contact
                .after(CollisionEventSystems)
                .run_if(in_state(GameState::InGame)),
        );
}

/// Run condition: false only during the calm phase.
pub fn combat_active(director: Option<Res<HordeDirector>>) -> bool {
    director.is_none_or(|d| d.state() != WaveState::CalmPhase)
}

/// The director plus what it takes to open a wave: announce it and queue the
/// first spawn step.
#[derive(SystemParam)]
pub struct WaveControl<'w> {
    director: ResMut<'w, HordeDirector>,
    cues: ResMut<'w, Timeline<HordeCue>>,
    time: Res<'w, Time>,
    started: MessageWriter<'w, WaveStarted>,
    difficulty: MessageWriter<'w, DifficultyChanged>,
}

impl WaveControl<'_> {
    pub fn start_next_wave(&mut self) -> Option<WaveStart> {
        let start = self.director.start_next_wave()?;
        info!(
            "wave {} started: {} enemies (difficulty {:.2})",
            start.wave, start.to_spawn, start.difficulty
        );
        self.started.write(WaveStarted { wave: start.wave });
        self.difficulty.write(DifficultyChanged {
            value: start.difficulty,
        });
        self.cues.schedule_in(
            self.time.elapsed(),
            0.0,
            HordeCue::SpawnStep { wave: start.wave },
        );
        Some(start)
    }
}

fn schedule_first_wave(
    tunables: Res<Tunables>,
    time: Res<Time>,
    mut cues: ResMut<Timeline<HordeCue>>,
) {
    cues.schedule_in(
        time.elapsed(),
        tunables.wave.first_wave_delay,
        HordeCue::StartWave,
    );
}

fn spawn_delay(rng: &mut GameRng, [lo, hi]: [f32; 2]) -> f32 {
    if hi > lo {
        rng.random_range(lo..=hi)
    } else {
        lo.max(0.0)
    }
}

pub fn run_horde_cues(
    mut control: WaveControl,
    tunables: Res<Tunables>,
    roster: Res<EnemyRoster>,
    mut rng: ResMut<GameRng>,
    mut batches: MessageWriter<SpawnBatch>,
) {
    let now = control.time.elapsed();
    for cue in control.cues.drain_due(now) {
        match cue {
            HordeCue::StartWave => {
                control.start_next_wave();
            }
            HordeCue::SpawnStep { wave } => {
                let director = &mut control.director;
                if director.counters().wave != wave || director.state() != WaveState::Spawning {
                    debug!("stale spawn step for wave {wave} skipped");
                    continue;
                }

                if director.record_spawn() {
                    let eligible = roster.eligible(wave);
                    if eligible.is_empty() {
                        warn!("no enemy type is eligible for wave {wave}; writing one off");
                        director.record_loss();
                    } else {
                        let enemy = eligible[rng.random_range(0..eligible.len())];
                        batches.write(SpawnBatch { enemy, count: 1 });
                    }
                }

                if director.wants_spawn() {
                    let delay = spawn_delay(&mut rng, tunables.wave.spawn_interval);
                    control
                        .cues
                        .schedule_in(now, delay, HordeCue::SpawnStep { wave });
                } else {
                    director.finish_spawning();
                    debug!("wave {wave}: all {} spawns requested", director.counters().to_spawn);
                }
            }
        }
    }
}

pub fn count_losses(
    mut director: ResMut<HordeDirector>,
    mut died: MessageReader<EnemyDied>,
    mut aborted: MessageReader<SpawnAborted>,
) {
    let deaths = died.read().count();
    let aborts = aborted.read().count();
    if aborts > 0 {
        debug!("{aborts} staged enemies will never arrive; writing them off");
    }
    for _ in 0..deaths + aborts {
        if director.record_loss() == Loss::Ignored {
            debug!("loss outside an active wave ignored");
        }
    }
}

pub fn close_cleared_wave(
    mut control: WaveControl,
    tunables: Res<Tunables>,
    mut rng: ResMut<GameRng>,
    mut pooling: Pooling,
    mut ended: MessageWriter<WaveEnded>,
    mut calm: MessageWriter<CalmPhaseStarted>,
) {
    let Some(wave) = control.director.take_cleared() else {
        return;
    };

    let purged = purge_enemy_projectiles(&mut pooling);
    info!("wave {wave} cleared ({purged} enemy bolts purged)");
    ended.write(WaveEnded { wave });
    calm.write(CalmPhaseStarted { wave });

    let upgrades = &tunables.upgrades;
    let points = &tunables.pickup_points;
    let count = tunables
        .wave
        .max_upgrade_offers
        .min(upgrades.len())
        .min(points.len());
    if count == 0 {
        warn!("no upgrades or pickup points configured; starting the next wave");
        control.start_next_wave();
        return;
    }

    let picks = sample(&mut rng.0, upgrades.len(), count);
    for (point, index) in points.iter().zip(picks.iter()) {
        let Some(lease) = pooling.acquire(Prefab::UpgradePickup, Vec2::from_array(*point), 0.0)
        else {
            continue;
        };
        pooling.commands().entity(lease.entity).insert(UpgradeOffer {
            weapon: upgrades[index].clone(),
        });
        control.director.offers.push(lease.entity);
    }

    if control.director.offers.is_empty() {
        warn!("no upgrade pickup could be placed; starting the next wave");
        control.start_next_wave();
    }
}

pub fn apply_upgrade_pick(
    mut control: WaveControl,
    mut picks: MessageReader<UpgradePicked>,
    arsenal: Res<Arsenal>,
    target: Res<TrackedTarget>,
    mut q_rigs: Query<&mut WeaponRig>,
    mut pooling: Pooling,
) {
    for pick in picks.read() {
        if control.director.state() != WaveState::CalmPhase {
            debug!("upgrade '{}' picked outside the calm phase; ignored", pick.weapon);
            continue;
        }

        let rig = target.0.and_then(|e| q_rigs.get_mut(e).ok());
        match (arsenal.get(&pick.weapon), rig) {
            (Some(def), Some(mut rig)) => rig.add_weapon(def, pooling.elapsed()),
            (None, _) => warn!("picked unknown weapon '{}'", pick.weapon),
            (_, None) => warn!("upgrade picked with no armed target"),
        }

        for offer in std::mem::take(&mut control.director.offers) {
            pooling.release(offer);
        }
        control.start_next_wave();
    }
}

pub fn pickup_contact(
    mut started: MessageReader<CollisionStart>,
    target: Res<TrackedTarget>,
    director: Res<HordeDirector>,
    q_offers: Query<&UpgradeOffer>,
    mut picked: MessageWriter<UpgradePicked>,
) {
    let Some(target) = target.0 else {
        return;
    };
    for ev in started.read() {
        let Some((offer_side, other)) = split_by(ev, |s| q_offers.contains(s.owner())) else {
            continue;
        };
        let offer_entity = offer_side.owner();
        if other.owner() != target || !director.offers().contains(&offer_entity) {
            continue;
        }
        if let Ok(offer) = q_offers.get(offer_entity) {
            picked.write(UpgradePicked {
                weapon: offer.weapon.clone(),
            });
        }
    }
}

#[cfg(test)]
mod tests;
