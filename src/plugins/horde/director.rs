//! Wave state machine, free of ECS so every transition is a plain call.
//!
//! ```text
//!   WaitingToStart ─start─▶ Spawning ─last spawn─▶ Fighting ─alive=0─▶ CalmPhase
//!                              ▲                                          │
//!                              └──────────────── start ◀──────────────────┘
//! ```
//!
//! Invariants:
//! - `spawned <= to_spawn` at every observation;
//! - `alive` starts at `to_spawn` and only goes down, saturating at zero;
//! - the wave clears only when `alive == 0` and `spawned == to_spawn`;
//! - losses outside an active wave are ignored.

use bevy::prelude::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WaveState {
    #[default]
    WaitingToStart,
    Spawning,
    Fighting,
    CalmPhase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WaveCounters {
    pub wave: u32,
    pub to_spawn: u32,
    pub spawned: u32,
    pub alive: u32,
}

/// What a started wave looks like.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveStart {
    pub wave: u32,
    pub to_spawn: u32,
    pub difficulty: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Loss {
    /// Not in an active wave.
    Ignored,
    Counted,
    /// This loss cleared the wave; the director is now in `CalmPhase`.
    Cleared,
}

#[derive(Resource, Debug, Clone)]
pub struct HordeDirector {
    pub(crate) state: WaveState,
    pub(crate) counters: WaveCounters,
    base_per_wave: u32,
    multiplier: f32,
    /// Pickup entities currently offered.
    pub(crate) offers: Vec<Entity>,
    /// Wave that cleared and has not been closed yet.
    cleared: Option<u32>,
}

impl HordeDirector {
    pub fn new(base_per_wave: u32, multiplier: f32) -> Self {
        Self {
            state: WaveState::WaitingToStart,
            counters: WaveCounters::default(),
            base_per_wave,
            multiplier,
            offers: Vec::new(),
            cleared: None,
        }
    }

    pub fn state(&self) -> WaveState {
        self.state
    }

    pub fn counters(&self) -> WaveCounters {
        self.counters
    }

    pub fn offers(&self) -> &[Entity] {
        &self.offers
    }

    /// `multiplier^(wave-1)`; wave 1 is the baseline.
    pub fn difficulty(&self, wave: u32) -> f32 {
        self.multiplier.powi(wave.saturating_sub(1) as i32)
    }

    /// `round(base × multiplier^(wave-1))`.
    pub fn enemies_for_wave(&self, wave: u32) -> u32 {
        (self.base_per_wave as f32 * self.difficulty(wave)).round() as u32
    }

    /// Begin the next wave. `None` while a wave is already running.
    pub fn start_next_wave(&mut self) -> Option<WaveStart> {
        if matches!(self.state, WaveState::Spawning | WaveState::Fighting) {
            return None;
        }
        let wave = self.counters.wave + 1;
        let to_spawn = self.enemies_for_wave(wave);
        self.counters = WaveCounters {
            wave,
            to_spawn,
            spawned: 0,
            alive: to_spawn,
        };
        self.state = WaveState::Spawning;
        Some(WaveStart {
            wave,
            to_spawn,
            difficulty: self.difficulty(wave),
        })
    }

    /// True while the spawn loop should keep going.
    pub fn wants_spawn(&self) -> bool {
        self.state == WaveState::Spawning && self.counters.spawned < self.counters.to_spawn
    }

    /// Count one spawn request. Returns false if none was wanted.
    pub fn record_spawn(&mut self) -> bool {
        if !self.wants_spawn() {
            return false;
        }
        self.counters.spawned += 1;
        true
    }

    /// Leave `Spawning` once every unit has been requested. Returns true if
    /// the wave is already clear (everything was written off).
    pub fn finish_spawning(&mut self) -> bool {
        if self.state != WaveState::Spawning || self.counters.spawned < self.counters.to_spawn {
            return false;
        }
        self.state = WaveState::Fighting;
        self.try_clear()
    }

    /// One scheduled enemy is gone: it died, or it will never arrive.
    pub fn record_loss(&mut self) -> Loss {
        if !matches!(self.state, WaveState::Spawning | WaveState::Fighting) {
            return Loss::Ignored;
        }
        self.counters.alive = self.counters.alive.saturating_sub(1);
        if self.try_clear() {
            Loss::Cleared
        } else {
            Loss::Counted
        }
    }

    /// The wave that cleared since the last call, if any.
    pub fn take_cleared(&mut self) -> Option<u32> {
        self.cleared.take()
    }

    fn try_clear(&mut self) -> bool {
        let c = self.counters;
        if c.alive == 0 && c.spawned == c.to_spawn {
            self.state = WaveState::CalmPhase;
            self.cleared = Some(c.wave);
            true
        } else {
            false
        }
    }
}
