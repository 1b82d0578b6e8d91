//! Weapons: the arsenal of shared definitions and per-owner rigs.
//!
//! A `WeaponRig` is an ordered list of slots. Each slot has its own fire gate
//! and one of two attack shapes:
//!
//! ```text
//!   Attack::Melee                  → one MeleeSlash, `melee_reach` ahead
//!   Attack::Ranged { burst, interval }
//!        shot 0 now, shots 1..burst on Timeline<BurstShot> `interval` apart
//! ```
//!
//! Burst wakes read the owner's position and facing when they fire, not when
//! they were scheduled. Pending wakes are cancelled when the calm phase
//! starts; `fire_weapons` itself only runs while combat is active.

use std::sync::Arc;
use std::time::Duration;

use bevy::platform::collections::HashMap;
use bevy::prelude::*;

use crate::common::state::GameState;
use crate::common::tunables::{ProjectileTunables, Tunables, WeaponDefinition, fire_interval};
use crate::plugins::events::CalmPhaseStarted;
use crate::plugins::horde::combat_active;
use crate::plugins::player::Facing;
use crate::plugins::projectiles::messages::{FireRequest, ShotKind};
use crate::plugins::schedule::{TaskId, Timeline};

/// Every configured weapon, shared by `Arc` with the rigs that use it.
#[derive(Resource, Debug, Default, Clone)]
pub struct Arsenal {
    weapons: HashMap<String, Arc<WeaponDefinition>>,
}

impl Arsenal {
    pub fn new(definitions: impl IntoIterator<Item = WeaponDefinition>) -> Self {
        Self {
            weapons: definitions
                .into_iter()
                .map(|d| (d.name.clone(), Arc::new(d)))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<Arc<WeaponDefinition>> {
        self.weapons.get(name).cloned()
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Attack {
    Melee,
    Ranged { burst: u32, interval: f32 },
}

impl Attack {
    pub fn for_definition(def: &WeaponDefinition) -> Self {
        if def.melee {
            Attack::Melee
        } else {
            Attack::Ranged {
                burst: def.projectile_count.max(1),
                interval: def.time_between_projectiles.max(0.0),
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeaponSlot {
    pub definition: Arc<WeaponDefinition>,
    pub attack: Attack,
    pub next_fire: Duration,
}

#[derive(Component, Debug, Default)]
pub struct WeaponRig {
    slots: Vec<WeaponSlot>,
    pending: Vec<TaskId>,
}

impl WeaponRig {
    /// Append a slot. Its gate is open immediately.
    pub fn add_weapon(&mut self, definition: Arc<WeaponDefinition>, now: Duration) {
        info!("weapon added: {}", definition.name);
        self.slots.push(WeaponSlot {
            attack: Attack::for_definition(&definition),
            definition,
            next_fire: now,
        });
    }

    pub fn slots(&self) -> &[WeaponSlot] {
        &self.slots
    }
}

/// A follow-up shot of a ranged burst.
#[derive(Debug, Clone)]
pub struct BurstShot {
    pub owner: Entity,
    pub definition: Arc<WeaponDefinition>,
}

pub fn plugin(app: &mut App) {
    let arsenal = Arsenal::new(app.world().resource::<Tunables>().weapons.clone());
    app.insert_resource(arsenal)
        .init_resource::<Timeline<BurstShot>>()
        .add_systems(
            Update,
            (
                cancel_bursts_on_calm,
                fire_weapons.run_if(combat_active),
                run_burst_shots,
            )
                .chain()
                .run_if(in_state(GameState::InGame)),
        );
}

fn ranged_shot(
    def: &WeaponDefinition,
    position: Vec2,
    facing: Vec2,
    limits: &ProjectileTunables,
) -> FireRequest {
    FireRequest {
        kind: ShotKind::PlayerBolt,
        origin: position + facing * limits.muzzle_offset,
        direction: facing,
        speed: def.speed,
        damage: def.damage,
        blast_radius: def.explosive.then_some(def.area_of_effect),
    }
}

fn melee_slash(
    def: &WeaponDefinition,
    position: Vec2,
    facing: Vec2,
    limits: &ProjectileTunables,
) -> FireRequest {
    FireRequest {
        kind: ShotKind::MeleeSlash,
        origin: position + facing * limits.melee_reach,
        direction: facing,
        speed: 0.0,
        damage: def.damage,
        blast_radius: None,
    }
}

pub fn fire_weapons(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut bursts: ResMut<Timeline<BurstShot>>,
    mut q_rigs: Query<(Entity, &mut WeaponRig, &Transform, &Facing)>,
    mut fire: MessageWriter<FireRequest>,
) {
    let now = time.elapsed();
    let limits = &tunables.projectiles;

    for (owner, mut rig, tf, facing) in &mut q_rigs {
        let position = tf.translation.truncate();
        let rig = &mut *rig;
        rig.pending.retain(|id| bursts.is_scheduled(*id));

        for slot in &mut rig.slots {
            if now < slot.next_fire {
                continue;
            }
            let Some(period) = fire_interval(slot.definition.fire_rate) else {
                continue;
            };
            let def = &slot.definition;
            match slot.attack {
                Attack::Melee => {
                    fire.write(melee_slash(def, position, facing.0, limits));
                }
                Attack::Ranged { burst, interval } => {
                    fire.write(ranged_shot(def, position, facing.0, limits));
                    for i in 1..burst {
                        let id = bursts.schedule_in(
                            now,
                            interval * i as f32,
                            BurstShot {
                                owner,
                                definition: Arc::clone(def),
                            },
                        );
                        rig.pending.push(id);
                    }
                }
            }
            slot.next_fire = now + period;
        }
    }
}

pub fn run_burst_shots(
    time: Res<Time>,
    tunables: Res<Tunables>,
    mut bursts: ResMut<Timeline<BurstShot>>,
    q_owners: Query<(&Transform, &Facing)>,
    mut fire: MessageWriter<FireRequest>,
) {
    for shot in bursts.drain_due(time.elapsed()) {
        let Ok((tf, facing)) = q_owners.get(shot.owner) else {
            debug!("burst owner {:?} is gone; shot dropped", shot.owner);
            continue;
        };
        fire.write(ranged_shot(
            &shot.definition,
            tf.translation.truncate(),
            facing.0,
            &tunables.projectiles,
        ));
    }
}

pub fn cancel_bursts_on_calm(
    mut calm: MessageReader<CalmPhaseStarted>,
    mut bursts: ResMut<Timeline<BurstShot>>,
    mut q_rigs: Query<&mut WeaponRig>,
) {
    if calm.read().count() == 0 {
        return;
    }
    for mut rig in &mut q_rigs {
        for id in rig.pending.drain(..) {
            bursts.cancel(id);
        }
    }
}
