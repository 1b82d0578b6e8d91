use std::collections::HashSet;

use avian2d::prelude::*;
use bevy::prelude::*;

use super::*;
use crate::common::test_utils::{
    advance, clear_messages, gameplay_world, read_messages, run_system_once,
};
use crate::common::tunables::{EnemyTemplate, EnemyTypeEntry};
use crate::plugins::enemies::{EnemyTypeId, activate_enemy, apply_enemy_damage};
use crate::plugins::events::DamageEnemy;
use crate::plugins::pool::ActorPool;

fn horde_world() -> World {
    let mut world = gameplay_world();
    let tunables = world.resource::<Tunables>().clone();
    world.insert_resource(HordeDirector::new(
        tunables.wave.base_per_wave,
        tunables.wave.difficulty_multiplier,
    ));
    world.insert_resource(Arsenal::new(tunables.weapons));
    world.init_resource::<Timeline<HordeCue>>();
    world
}

fn director(world: &World) -> &HordeDirector {
    world.resource::<HordeDirector>()
}

/// Put wave 1 in `Fighting` with `alive` enemies left and every spawn done.
fn fighting(world: &mut World, alive: u32) {
    let mut d = world.resource_mut::<HordeDirector>();
    let start = d.start_next_wave().expect("no wave running");
    d.counters.spawned = start.to_spawn;
    d.counters.alive = alive;
    d.state = WaveState::Fighting;
}

fn kill(world: &mut World) {
    let entity = world.spawn_empty().id();
    world.write_message(EnemyDied {
        entity,
        enemy: EnemyTypeId(0),
    });
}

fn clear_wave(world: &mut World) {
    fighting(world, 1);
    kill(world);
    run_system_once(world, count_losses);
    clear_messages::<EnemyDied>(world);
    run_system_once(world, close_cleared_wave);
}

fn spawn_armed_target(world: &mut World) -> Entity {
    let target = world
        .spawn((Transform::default(), WeaponRig::default()))
        .id();
    world.resource_mut::<TrackedTarget>().0 = Some(target);
    target
}

// -----------------------------------------------------------------------------
// Director arithmetic
// -----------------------------------------------------------------------------

#[test]
fn wave_sizes_follow_the_difficulty_curve() {
    let d = HordeDirector::new(5, 1.2);
    assert_eq!(d.enemies_for_wave(1), 5);
    assert_eq!(d.enemies_for_wave(2), 6);
    assert_eq!(d.enemies_for_wave(3), 7);
    assert_eq!(d.difficulty(1), 1.0);
}

#[test]
fn wave_sizes_never_shrink() {
    for multiplier in [1.0, 1.05, 1.2, 1.5] {
        let d = HordeDirector::new(4, multiplier);
        for wave in 1..30 {
            assert!(
                d.enemies_for_wave(wave + 1) >= d.enemies_for_wave(wave),
                "x{multiplier} shrank after wave {wave}"
            );
        }
    }
}

#[test]
fn starting_is_refused_while_a_wave_runs() {
    let mut d = HordeDirector::new(5, 1.2);
    let start = d.start_next_wave().unwrap();
    assert_eq!(start.wave, 1);
    assert_eq!(d.counters().alive, 5);
    assert!(d.start_next_wave().is_none());

    d.state = WaveState::Fighting;
    assert!(d.start_next_wave().is_none());
    assert_eq!(d.counters().wave, 1);
}

#[test]
fn spawn_counter_never_passes_the_wave_size() {
    let mut d = HordeDirector::new(2, 1.0);
    d.start_next_wave();
    assert!(d.record_spawn());
    assert!(d.record_spawn());
    assert!(!d.record_spawn());
    assert_eq!(d.counters().spawned, 2);
}

#[test]
fn wave_clears_only_after_the_last_spawn() {
    let mut d = HordeDirector::new(2, 1.0);
    d.start_next_wave();
    d.record_spawn();
    assert_eq!(d.record_loss(), Loss::Counted);
    assert_eq!(d.record_loss(), Loss::Counted);
    assert_eq!(d.state(), WaveState::Spawning);

    d.record_spawn();
    assert!(d.finish_spawning());
    assert_eq!(d.state(), WaveState::CalmPhase);
    assert_eq!(d.take_cleared(), Some(1));
    assert_eq!(d.take_cleared(), None);
}

// -----------------------------------------------------------------------------
// Losses
// -----------------------------------------------------------------------------

#[test]
fn deaths_during_the_calm_phase_are_ignored() {
    let mut world = horde_world();
    {
        let mut d = world.resource_mut::<HordeDirector>();
        d.state = WaveState::CalmPhase;
        d.counters.alive = 3;
    }

    kill(&mut world);
    run_system_once(&mut world, count_losses);

    assert_eq!(director(&world).counters().alive, 3);
    assert_eq!(director(&world).state(), WaveState::CalmPhase);
}

#[test]
fn double_death_of_one_enemy_counts_once() {
    let mut world = horde_world();
    fighting(&mut world, 5);

    let enemy = run_system_once(&mut world, |mut pooling: Pooling| {
        let lease = pooling
            .acquire(Prefab::Enemy(EnemyTypeId(0)), Vec2::ZERO, 0.0)
            .expect("pool has room");
        activate_enemy(
            pooling.commands(),
            lease.entity,
            EnemyTypeId(0),
            &EnemyTemplate::default(),
            None,
        );
        lease.entity
    });

    world.write_message(DamageEnemy {
        entity: enemy,
        amount: 100,
    });
    world.write_message(DamageEnemy {
        entity: enemy,
        amount: 100,
    });
    run_system_once(&mut world, apply_enemy_damage);
    run_system_once(&mut world, count_losses);

    assert_eq!(director(&world).counters().alive, 4);
}

#[test]
fn aborted_spawns_are_written_off() {
    let mut world = horde_world();
    fighting(&mut world, 2);

    world.write_message(SpawnAborted {
        enemy: EnemyTypeId(0),
    });
    kill(&mut world);
    run_system_once(&mut world, count_losses);

    assert_eq!(director(&world).state(), WaveState::CalmPhase);
    assert_eq!(director(&world).counters().alive, 0);
}

// -----------------------------------------------------------------------------
// Wave loop
// -----------------------------------------------------------------------------

#[test]
fn first_wave_starts_after_the_delay_and_requests_every_enemy() {
    let mut world = horde_world();
    run_system_once(&mut world, schedule_first_wave);

    advance(&mut world, 1.0);
    run_system_once(&mut world, run_horde_cues);
    assert_eq!(director(&world).state(), WaveState::WaitingToStart);

    advance(&mut world, 1.0);
    run_system_once(&mut world, run_horde_cues);
    assert_eq!(
        read_messages::<WaveStarted>(&mut world),
        vec![WaveStarted { wave: 1 }]
    );
    assert_eq!(
        read_messages::<DifficultyChanged>(&mut world),
        vec![DifficultyChanged { value: 1.0 }]
    );

    for _ in 0..5 {
        run_system_once(&mut world, run_horde_cues);
        advance(&mut world, 1.5);
    }

    let batches = read_messages::<SpawnBatch>(&mut world);
    assert_eq!(batches.len(), 5);
    // Only the first roster entry has no minimum wave.
    assert!(
        batches
            .iter()
            .all(|b| b.enemy == EnemyTypeId(0) && b.count == 1)
    );
    let counters = director(&world).counters();
    assert_eq!((counters.spawned, counters.alive), (5, 5));
    assert_eq!(director(&world).state(), WaveState::Fighting);
}

#[test]
fn wave_without_eligible_enemies_still_clears() {
    let mut world = horde_world();
    let late = EnemyTypeEntry {
        name: "late".into(),
        template: EnemyTemplate::default(),
        spawn_weight: 1.0,
        min_wave: 9,
    };
    world.insert_resource(EnemyRoster::new(vec![late]));
    world.resource_mut::<Timeline<HordeCue>>().schedule_in(
        Default::default(),
        0.0,
        HordeCue::StartWave,
    );

    for _ in 0..6 {
        run_system_once(&mut world, run_horde_cues);
        advance(&mut world, 1.5);
    }

    assert!(read_messages::<SpawnBatch>(&mut world).is_empty());
    assert_eq!(director(&world).state(), WaveState::CalmPhase);
    assert_eq!(director(&world).counters().alive, 0);

    run_system_once(&mut world, close_cleared_wave);
    assert_eq!(
        read_messages::<WaveEnded>(&mut world),
        vec![WaveEnded { wave: 1 }]
    );
}

#[test]
fn spawn_step_from_an_older_wave_does_nothing() {
    let mut world = horde_world();
    world.resource_mut::<HordeDirector>().start_next_wave();
    world.resource_mut::<Timeline<HordeCue>>().schedule_in(
        Default::default(),
        0.0,
        HordeCue::SpawnStep { wave: 7 },
    );

    run_system_once(&mut world, run_horde_cues);

    assert!(read_messages::<SpawnBatch>(&mut world).is_empty());
    assert_eq!(director(&world).counters().spawned, 0);
    assert!(world.resource::<Timeline<HordeCue>>().is_empty());
}

#[test]
fn combat_pauses_only_in_the_calm_phase() {
    let mut world = horde_world();
    assert!(run_system_once(&mut world, combat_active));

    world.resource_mut::<HordeDirector>().state = WaveState::CalmPhase;
    assert!(!run_system_once(&mut world, combat_active));

    world.remove_resource::<HordeDirector>();
    assert!(run_system_once(&mut world, combat_active));
}

// -----------------------------------------------------------------------------
// Clear and upgrade phase
// -----------------------------------------------------------------------------

#[test]
fn clearing_a_wave_purges_bolts_and_offers_distinct_upgrades() {
    let mut world = horde_world();
    let bolt = run_system_once(&mut world, |mut pooling: Pooling| {
        pooling
            .acquire(Prefab::EnemyBolt, Vec2::ZERO, 0.0)
            .expect("pool has room")
            .entity
    });

    clear_wave(&mut world);

    assert_eq!(
        read_messages::<WaveEnded>(&mut world),
        vec![WaveEnded { wave: 1 }]
    );
    assert_eq!(
        read_messages::<CalmPhaseStarted>(&mut world),
        vec![CalmPhaseStarted { wave: 1 }]
    );
    assert!(!world.resource::<ActorPool>().is_active(bolt));

    let offers = director(&world).offers().to_vec();
    assert_eq!(offers.len(), 3);
    let weapons: HashSet<String> = offers
        .iter()
        .map(|&e| world.get::<UpgradeOffer>(e).unwrap().weapon.clone())
        .collect();
    assert_eq!(weapons.len(), 3);

    let first = world.get::<Transform>(offers[0]).unwrap().translation;
    assert_eq!(first.truncate(), Vec2::new(-160.0, 140.0));
    assert!(read_messages::<WaveStarted>(&mut world).is_empty());
}

#[test]
fn offers_are_capped_by_pickup_points() {
    let mut world = horde_world();
    world.resource_mut::<Tunables>().pickup_points = vec![[0.0, 0.0]];

    clear_wave(&mut world);

    assert_eq!(director(&world).offers().len(), 1);
}

#[test]
fn missing_upgrades_start_the_next_wave_at_once() {
    let mut world = horde_world();
    world.resource_mut::<Tunables>().upgrades.clear();

    clear_wave(&mut world);

    assert_eq!(
        read_messages::<WaveStarted>(&mut world),
        vec![WaveStarted { wave: 2 }]
    );
    assert_eq!(director(&world).state(), WaveState::Spawning);
    assert_eq!(director(&world).counters().to_spawn, 6);
}

#[test]
fn picking_an_upgrade_arms_the_target_and_starts_the_next_wave() {
    let mut world = horde_world();
    let target = spawn_armed_target(&mut world);
    clear_wave(&mut world);
    let offers = director(&world).offers().to_vec();

    world.write_message(UpgradePicked {
        weapon: "rocket".into(),
    });
    run_system_once(&mut world, apply_upgrade_pick);

    let rig = world.get::<WeaponRig>(target).unwrap();
    assert_eq!(rig.slots().len(), 1);
    assert_eq!(rig.slots()[0].definition.name, "rocket");

    assert!(director(&world).offers().is_empty());
    let pool = world.resource::<ActorPool>();
    assert!(offers.iter().all(|&e| !pool.is_active(e)));

    assert_eq!(
        read_messages::<WaveStarted>(&mut world),
        vec![WaveStarted { wave: 2 }]
    );
    assert_eq!(director(&world).state(), WaveState::Spawning);
}

#[test]
fn picks_outside_the_calm_phase_are_ignored() {
    let mut world = horde_world();
    let target = spawn_armed_target(&mut world);
    fighting(&mut world, 3);

    world.write_message(UpgradePicked {
        weapon: "rocket".into(),
    });
    run_system_once(&mut world, apply_upgrade_pick);

    assert!(world.get::<WeaponRig>(target).unwrap().slots().is_empty());
    assert_eq!(director(&world).counters().wave, 1);
}

#[test]
fn only_the_first_of_several_picks_counts() {
    let mut world = horde_world();
    let target = spawn_armed_target(&mut world);
    clear_wave(&mut world);

    world.write_message(UpgradePicked {
        weapon: "blade".into(),
    });
    world.write_message(UpgradePicked {
        weapon: "rocket".into(),
    });
    run_system_once(&mut world, apply_upgrade_pick);

    assert_eq!(world.get::<WeaponRig>(target).unwrap().slots().len(), 1);
    assert_eq!(director(&world).counters().wave, 2);
}

#[test]
fn touching_an_offer_picks_its_weapon() {
    let mut world = horde_world();
    let target = spawn_armed_target(&mut world);
    clear_wave(&mut world);
    let offer = director(&world).offers()[1];
    let weapon = world.get::<UpgradeOffer>(offer).unwrap().weapon.clone();

    world.write_message(CollisionStart {
        collider1: target,
        collider2: offer,
        body1: Some(target),
        body2: Some(offer),
    });
    run_system_once(&mut world, pickup_contact);

    assert_eq!(
        read_messages::<UpgradePicked>(&mut world),
        vec![UpgradePicked { weapon }]
    );
}

#[test]
fn offers_ignore_anything_but_the_target() {
    let mut world = horde_world();
    spawn_armed_target(&mut world);
    clear_wave(&mut world);
    let offer = director(&world).offers()[0];
    let stranger = world.spawn(Transform::default()).id();

    world.write_message(CollisionStart {
        collider1: offer,
        collider2: stranger,
        body1: Some(offer),
        body2: Some(stranger),
    });
    run_system_once(&mut world, pickup_contact);

    assert!(read_messages::<UpgradePicked>(&mut world).is_empty());
}
