//! Test helpers.
//!
//! Systems that use `Commands` enqueue structural changes; we call
//! `world.flush()` after running so queued commands are applied before
//! assertions.

use std::time::Duration;

use bevy::ecs::message::{Message, MessageReader, Messages};
use bevy::ecs::system::{IntoSystem, RunSystemOnce};
use bevy::prelude::*;

use crate::common::rng::GameRng;
use crate::common::tunables::Tunables;
use crate::plugins::enemies::EnemyRoster;
use crate::plugins::events;
use crate::plugins::player::TrackedTarget;
use crate::plugins::pool::{ActorPool, DelayedRelease};
use crate::plugins::schedule::Timeline;

/// Run a system once on the given world, then flush deferred commands.
/// Returns the system output.
pub fn run_system_once<T, Out, Marker>(world: &mut World, system: T) -> Out
where
    T: IntoSystem<(), Out, Marker>,
{
    let out = world.run_system_once(system).expect("system run failed");
    world.flush();
    out
}

/// A world with the ambient resources every gameplay system expects:
/// generic time at zero, a seeded rng, default tunables, an empty pool, the
/// enemy roster, no tracked target and all message queues.
pub fn gameplay_world() -> World {
    let tunables = Tunables::default();
    let mut world = World::new();
    world.insert_resource(Time::<()>::default());
    world.insert_resource(GameRng::seeded(7));
    world.insert_resource(ActorPool::new(tunables.pool.max_active));
    world.init_resource::<Timeline<DelayedRelease>>();
    world.insert_resource(EnemyRoster::new(tunables.enemies.clone()));
    world.init_resource::<TrackedTarget>();
    world.insert_resource(tunables);
    events::init_message_queues(&mut world);
    world
}

/// Advance the generic clock; `delta_secs()` reports `secs` afterwards.
pub fn advance(world: &mut World, secs: f32) {
    world
        .resource_mut::<Time>()
        .advance_by(Duration::from_secs_f32(secs));
}

/// Collect every message of type `M` still buffered in the world.
pub fn read_messages<M: Message + Clone>(world: &mut World) -> Vec<M> {
    run_system_once(world, |mut reader: MessageReader<M>| {
        reader.read().cloned().collect::<Vec<M>>()
    })
}

/// Drop every buffered message of type `M`.
pub fn clear_messages<M: Message>(world: &mut World) {
    world.resource_mut::<Messages<M>>().clear();
}
