//! Pool bookkeeping.
//!
//! `ActorPool` is the single source of truth for which pooled entities are
//! active. It knows nothing about components; `Pooling` (see `mod.rs`) pairs
//! each bookkeeping change with the matching component writes.
//!
//! Invariants:
//! - an entity is either in its prefab's idle list or counted as active,
//!   never both;
//! - `active + idle` for a prefab only grows (entities are never destroyed);
//! - a prefab never has more than `capacity` active entities;
//! - every acquisition bumps the entity's generation, so a lease taken before
//!   a release can be told apart from the current activation.

use bevy::platform::collections::HashMap;
use bevy::prelude::*;
use thiserror::Error;

use super::Prefab;

/// Proof of one particular activation of a pooled entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Lease {
    pub entity: Entity,
    pub generation: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Acquired {
    pub lease: Lease,
    /// True when the entity was created for this request.
    pub fresh: bool,
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum PoolError {
    #[error("pool for {prefab:?} is exhausted ({capacity} active)")]
    Exhausted { prefab: Prefab, capacity: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Release {
    Released(Prefab),
    AlreadyIdle,
    /// The pool never issued this entity.
    Unknown,
}

#[derive(Debug)]
struct PrefabPool {
    idle: Vec<Entity>,
    active: usize,
    capacity: usize,
}

#[derive(Clone, Copy, Debug)]
struct Slot {
    prefab: Prefab,
    active: bool,
    generation: u32,
}

#[derive(Resource, Debug)]
pub struct ActorPool {
    pools: HashMap<Prefab, PrefabPool>,
    slots: HashMap<Entity, Slot>,
    default_capacity: usize,
    capacities: HashMap<Prefab, usize>,
}

impl ActorPool {
    pub fn new(default_capacity: usize) -> Self {
        Self {
            pools: HashMap::default(),
            slots: HashMap::default(),
            default_capacity,
            capacities: HashMap::default(),
        }
    }

    /// Override the ceiling for one prefab. Applies to the existing pool too.
    pub fn set_capacity(&mut self, prefab: Prefab, capacity: usize) {
        self.capacities.insert(prefab, capacity);
        if let Some(pool) = self.pools.get_mut(&prefab) {
            pool.capacity = capacity;
        }
    }

    /// Take an idle entity for `prefab`, or create one with `spawn`.
    ///
    /// `spawn` is only called when the idle list is empty and the prefab is
    /// below its ceiling.
    pub fn acquire_with(
        &mut self,
        prefab: Prefab,
        spawn: impl FnOnce() -> Entity,
    ) -> Result<Acquired, PoolError> {
        let capacity = self
            .capacities
            .get(&prefab)
            .copied()
            .unwrap_or(self.default_capacity);
        let pool = self.pools.entry(prefab).or_insert_with(|| PrefabPool {
            idle: Vec::new(),
            active: 0,
            capacity,
        });

        if pool.active >= pool.capacity {
            return Err(PoolError::Exhausted {
                prefab,
                capacity: pool.capacity,
            });
        }

        let (entity, fresh) = match pool.idle.pop() {
            Some(e) => (e, false),
            None => (spawn(), true),
        };
        pool.active += 1;

        let slot = self.slots.entry(entity).or_insert(Slot {
            prefab,
            active: false,
            generation: 0,
        });
        slot.active = true;
        slot.generation = slot.generation.wrapping_add(1);

        Ok(Acquired {
            lease: Lease {
                entity,
                generation: slot.generation,
            },
            fresh,
        })
    }

    pub fn release(&mut self, entity: Entity) -> Release {
        let Some(slot) = self.slots.get_mut(&entity) else {
            return Release::Unknown;
        };
        if !slot.active {
            return Release::AlreadyIdle;
        }
        slot.active = false;

        let prefab = slot.prefab;
        if let Some(pool) = self.pools.get_mut(&prefab) {
            pool.active = pool.active.saturating_sub(1);
            pool.idle.push(entity);
        }
        Release::Released(prefab)
    }

    pub fn is_active(&self, entity: Entity) -> bool {
        self.slots.get(&entity).is_some_and(|s| s.active)
    }

    /// True while `lease` still names the entity's current activation.
    pub fn is_current(&self, lease: Lease) -> bool {
        self.slots
            .get(&lease.entity)
            .is_some_and(|s| s.active && s.generation == lease.generation)
    }

    pub fn active_count(&self, prefab: Prefab) -> usize {
        self.pools.get(&prefab).map_or(0, |p| p.active)
    }

    pub fn idle_count(&self, prefab: Prefab) -> usize {
        self.pools.get(&prefab).map_or(0, |p| p.idle.len())
    }

    /// Active entities of one prefab, in no particular order.
    pub fn active_of(&self, prefab: Prefab) -> Vec<Entity> {
        self.slots
            .iter()
            .filter(|(_, s)| s.active && s.prefab == prefab)
            .map(|(e, _)| *e)
            .collect()
    }

    /// Number of distinct prefabs ever requested.
    pub fn prefab_count(&self) -> usize {
        self.pools.len()
    }
}
