use bevy::prelude::*;
use rand::{SeedableRng, rngs::StdRng};

use super::*;
use crate::common::test_utils::{advance, gameplay_world, read_messages, run_system_once};
use crate::plugins::enemies::{CombatActor, Vitals};
use crate::plugins::pool::ActorPool;

fn spawning_world(warnings: bool) -> World {
    let mut world = gameplay_world();
    world.init_resource::<Timeline<SpawnStep>>();
    world.resource_mut::<Tunables>().spawning.warnings = warnings;
    world
}

fn stage(world: &mut World, enemy: EnemyTypeId, count: u32) {
    world.write_message(SpawnBatch { enemy, count });
    run_system_once(world, stage_spawn_batches);
}

fn area() -> SpawnArea {
    SpawnArea::new(Vec2::new(100.0, 100.0), Vec2::new(200.0, 150.0))
}

fn inside(area: &SpawnArea, p: Vec2) -> bool {
    p.x >= area.min.x && p.x <= area.max.x && p.y >= area.min.y && p.y <= area.max.y
}

// -----------------------------------------------------------------------------
// SpawnArea
// -----------------------------------------------------------------------------

#[test]
fn samples_stay_inside_the_rectangle() {
    let mut rng = StdRng::seed_from_u64(3);
    let a = area();
    for _ in 0..500 {
        assert!(inside(&a, a.sample(&mut rng)));
    }
}

#[test]
fn corners_may_be_given_in_any_order() {
    let a = SpawnArea::new(Vec2::new(5.0, -1.0), Vec2::new(-5.0, 1.0));
    assert_eq!(a.min, Vec2::new(-5.0, -1.0));
    assert_eq!(a.max, Vec2::new(5.0, 1.0));
    assert_eq!(a.center(), Vec2::ZERO);
}

#[test]
fn a_point_area_always_yields_that_point() {
    let mut rng = StdRng::seed_from_u64(1);
    let a = SpawnArea::new(Vec2::new(3.0, 4.0), Vec2::new(3.0, 4.0));
    assert_eq!(a.sample(&mut rng), Vec2::new(3.0, 4.0));
}

// -----------------------------------------------------------------------------
// Director
// -----------------------------------------------------------------------------

#[test]
fn warning_precedes_materialization() {
    let mut world = spawning_world(true);
    world.spawn(area());

    stage(&mut world, EnemyTypeId(0), 3);
    assert_eq!(world.resource::<ActorPool>().active_count(Prefab::SpawnWarning), 3);
    assert_eq!(world.resource::<Timeline<SpawnStep>>().pending(), 3);

    advance(&mut world, 1.4);
    run_system_once(&mut world, run_spawn_steps);
    assert!(read_messages::<EnemySpawned>(&mut world).is_empty());

    advance(&mut world, 0.2);
    run_system_once(&mut world, run_spawn_steps);

    let spawned = read_messages::<EnemySpawned>(&mut world);
    assert_eq!(spawned.len(), 3);
    let pool = world.resource::<ActorPool>();
    assert_eq!(pool.active_count(Prefab::SpawnWarning), 0);
    assert_eq!(pool.active_count(Prefab::Enemy(EnemyTypeId(0))), 3);

    for s in spawned {
        assert_eq!(s.enemy, EnemyTypeId(0));
        let p = world.get::<Transform>(s.entity).unwrap().translation.truncate();
        assert!(inside(&area(), p));
        assert_eq!(*world.get::<Vitals>(s.entity).unwrap(), Vitals::full(30));
    }
}

#[test]
fn without_warnings_enemies_appear_on_the_same_tick() {
    let mut world = spawning_world(false);
    world.spawn(area());

    stage(&mut world, EnemyTypeId(1), 2);
    run_system_once(&mut world, run_spawn_steps);

    assert_eq!(read_messages::<EnemySpawned>(&mut world).len(), 2);
    assert_eq!(world.resource::<ActorPool>().active_count(Prefab::SpawnWarning), 0);
}

#[test]
fn spawned_enemies_track_the_current_target() {
    let mut world = spawning_world(false);
    world.spawn(area());
    let target = world.spawn(Transform::default()).id();
    world.resource_mut::<TrackedTarget>().0 = Some(target);

    stage(&mut world, EnemyTypeId(0), 1);
    run_system_once(&mut world, run_spawn_steps);

    let spawned = read_messages::<EnemySpawned>(&mut world);
    assert_eq!(
        world.get::<CombatActor>(spawned[0].entity).unwrap().target,
        Some(target)
    );
}

#[test]
fn batch_without_areas_is_dropped() {
    let mut world = spawning_world(true);

    stage(&mut world, EnemyTypeId(0), 4);

    assert_eq!(read_messages::<SpawnAborted>(&mut world).len(), 4);
    assert!(world.resource::<Timeline<SpawnStep>>().is_empty());
}

#[test]
fn batch_for_unknown_enemy_is_dropped() {
    let mut world = spawning_world(true);
    world.spawn(area());

    stage(&mut world, EnemyTypeId(99), 2);

    assert_eq!(
        read_messages::<SpawnAborted>(&mut world),
        vec![SpawnAborted { enemy: EnemyTypeId(99) }; 2]
    );
    assert!(world.resource::<Timeline<SpawnStep>>().is_empty());
}

#[test]
fn full_pool_aborts_the_overflow() {
    let mut world = spawning_world(false);
    world.spawn(area());
    world
        .resource_mut::<ActorPool>()
        .set_capacity(Prefab::Enemy(EnemyTypeId(0)), 1);

    stage(&mut world, EnemyTypeId(0), 2);
    run_system_once(&mut world, run_spawn_steps);

    assert_eq!(read_messages::<EnemySpawned>(&mut world).len(), 1);
    assert_eq!(read_messages::<SpawnAborted>(&mut world).len(), 1);
}
