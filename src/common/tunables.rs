//! Tunable gameplay configuration.
//!
//! Loaded once from `assets/tunables.ron` and treated as immutable for the
//! rest of the run. Every section has defaults so a partial file is fine.

use std::fs;
use std::time::Duration;

use bevy::prelude::*;
use serde::Deserialize;
use thiserror::Error;

pub const TUNABLES_PATH: &str = "assets/tunables.ron";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("unable to parse tunables: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("invalid tunables: {0}")]
    Invalid(String),
}

#[derive(Resource, Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Tunables {
    pub pixels_per_meter: f32,
    pub wave: WaveTunables,
    pub spawning: SpawningTunables,
    pub enemies: Vec<EnemyTypeEntry>,
    pub weapons: Vec<WeaponDefinition>,
    pub player: PlayerTunables,
    /// Weapon names offered during the calm phase.
    pub upgrades: Vec<String>,
    pub pickup_points: Vec<[f32; 2]>,
    pub projectiles: ProjectileTunables,
    pub pool: PoolTunables,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct WaveTunables {
    pub base_per_wave: u32,
    pub difficulty_multiplier: f32,
    pub first_wave_delay: f32,
    /// Seconds between single-enemy spawn requests, sampled uniformly.
    pub spawn_interval: [f32; 2],
    pub max_upgrade_offers: usize,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SpawningTunables {
    pub warnings: bool,
    pub warning_duration: f32,
    pub areas: Vec<AreaTunables>,
}

#[derive(Deserialize, Debug, Clone, Copy)]
pub struct AreaTunables {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PlayerTunables {
    pub max_health: i32,
    pub move_speed: f32,
    pub acceleration: f32,
    pub deceleration: f32,
    pub starting_weapons: Vec<String>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct ProjectileTunables {
    pub lifetime: f32,
    pub melee_lifetime: f32,
    pub melee_reach: f32,
    pub muzzle_offset: f32,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct PoolTunables {
    /// Ceiling on concurrently active entities per prefab.
    pub max_active: usize,
    /// Per-kind overrides of `max_active`.
    pub ceilings: Vec<PoolCeiling>,
}

/// Pooled entity families a ceiling can be set for. `Enemies` covers every
/// enemy type, each with its own pool.
#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolKind {
    Enemies,
    EnemyBolt,
    PlayerBolt,
    MeleeSlash,
    SpawnWarning,
    UpgradePickup,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolCeiling {
    pub kind: PoolKind,
    pub max_active: usize,
}

#[derive(Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyKind {
    Chaser,
    Kiter,
    Turret,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct EnemyTemplate {
    pub kind: EnemyKind,
    pub max_health: i32,
    pub move_speed: f32,
    pub stopping_distance: f32,
    pub retreat_distance: f32,
    pub contact_damage: i32,
    pub fire_rate: f32,
    pub projectile_speed: f32,
    pub projectile_damage: i32,
}

#[derive(Deserialize, Debug, Clone)]
pub struct EnemyTypeEntry {
    pub name: String,
    pub template: EnemyTemplate,
    #[serde(default = "full_weight")]
    pub spawn_weight: f32,
    #[serde(default)]
    pub min_wave: u32,
}

fn full_weight() -> f32 {
    1.0
}

/// Time between two attacks at `rate` per second. `None` when the rate is not
/// positive or the interval does not fit a `Duration`.
pub fn fire_interval(rate: f32) -> Option<Duration> {
    if rate > 0.0 {
        Duration::try_from_secs_f32(1.0 / rate).ok()
    } else {
        None
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct WeaponDefinition {
    pub name: String,
    pub damage: i32,
    /// Attacks per second.
    pub fire_rate: f32,
    pub speed: f32,
    pub melee: bool,
    pub explosive: bool,
    pub area_of_effect: f32,
    pub projectile_count: u32,
    pub time_between_projectiles: f32,
}

impl Tunables {
    pub fn read(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_string(),
            source,
        })?;
        let tunables: Self = ron::from_str(&content)?;
        tunables.validate()?;
        Ok(tunables)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.wave.difficulty_multiplier <= 0.0 {
            return Err(ConfigError::Invalid(
                "wave.difficulty_multiplier must be positive".into(),
            ));
        }
        let [lo, hi] = self.wave.spawn_interval;
        if !(lo >= 0.0 && hi > lo) {
            return Err(ConfigError::Invalid(format!(
                "wave.spawn_interval [{lo}, {hi}] is not a valid range"
            )));
        }
        if let Some(w) = self
            .weapons
            .iter()
            .find(|w| fire_interval(w.fire_rate).is_none())
        {
            return Err(ConfigError::Invalid(format!(
                "weapon '{}' has an unusable fire rate {}",
                w.name, w.fire_rate
            )));
        }
        if let Some(e) = self.enemies.iter().find(|e| {
            e.template.kind != EnemyKind::Chaser && fire_interval(e.template.fire_rate).is_none()
        }) {
            return Err(ConfigError::Invalid(format!(
                "enemy '{}' shoots but has an unusable fire rate {}",
                e.name, e.template.fire_rate
            )));
        }
        if let Some(e) = self
            .enemies
            .iter()
            .find(|e| !(0.0..=1.0).contains(&e.spawn_weight))
        {
            return Err(ConfigError::Invalid(format!(
                "enemy '{}' has spawn_weight {} outside [0, 1]",
                e.name, e.spawn_weight
            )));
        }
        for name in self.player.starting_weapons.iter().chain(&self.upgrades) {
            if self.weapon(name).is_none() {
                return Err(ConfigError::Invalid(format!("unknown weapon '{name}'")));
            }
        }
        Ok(())
    }

    pub fn weapon(&self, name: &str) -> Option<&WeaponDefinition> {
        self.weapons.iter().find(|w| w.name == name)
    }
}

impl Default for Tunables {
    fn default() -> Self {
        Self {
            pixels_per_meter: 20.0,
            wave: WaveTunables::default(),
            spawning: SpawningTunables::default(),
            enemies: vec![
                EnemyTypeEntry {
                    name: "grunt".into(),
                    template: EnemyTemplate::default(),
                    spawn_weight: 1.0,
                    min_wave: 0,
                },
                EnemyTypeEntry {
                    name: "skirmisher".into(),
                    template: EnemyTemplate {
                        kind: EnemyKind::Kiter,
                        max_health: 40,
                        move_speed: 80.0,
                        stopping_distance: 260.0,
                        retreat_distance: 160.0,
                        fire_rate: 0.8,
                        ..default()
                    },
                    spawn_weight: 0.6,
                    min_wave: 2,
                },
                EnemyTypeEntry {
                    name: "sentry".into(),
                    template: EnemyTemplate {
                        kind: EnemyKind::Turret,
                        max_health: 60,
                        move_speed: 0.0,
                        fire_rate: 0.5,
                        projectile_speed: 220.0,
                        projectile_damage: 8,
                        ..default()
                    },
                    spawn_weight: 0.3,
                    min_wave: 3,
                },
            ],
            weapons: vec![
                WeaponDefinition {
                    name: "pistol".into(),
                    ..default()
                },
                WeaponDefinition {
                    name: "blade".into(),
                    damage: 25,
                    fire_rate: 1.2,
                    speed: 0.0,
                    melee: true,
                    ..default()
                },
                WeaponDefinition {
                    name: "scatter".into(),
                    damage: 8,
                    fire_rate: 1.0,
                    projectile_count: 3,
                    time_between_projectiles: 0.1,
                    ..default()
                },
                WeaponDefinition {
                    name: "rocket".into(),
                    damage: 20,
                    fire_rate: 0.5,
                    speed: 450.0,
                    explosive: true,
                    area_of_effect: 80.0,
                    ..default()
                },
            ],
            player: PlayerTunables::default(),
            upgrades: vec!["blade".into(), "scatter".into(), "rocket".into()],
            pickup_points: vec![[-160.0, 140.0], [0.0, 180.0], [160.0, 140.0]],
            projectiles: ProjectileTunables::default(),
            pool: PoolTunables::default(),
        }
    }
}

impl Default for WaveTunables {
    fn default() -> Self {
        Self {
            base_per_wave: 5,
            difficulty_multiplier: 1.2,
            first_wave_delay: 2.0,
            spawn_interval: [0.5, 1.5],
            max_upgrade_offers: 3,
        }
    }
}

impl Default for SpawningTunables {
    fn default() -> Self {
        Self {
            warnings: true,
            warning_duration: 1.5,
            areas: vec![
                AreaTunables { min: [-960.0, -500.0], max: [-760.0, 500.0] },
                AreaTunables { min: [760.0, -500.0], max: [960.0, 500.0] },
                AreaTunables { min: [-600.0, 380.0], max: [600.0, 520.0] },
                AreaTunables { min: [-600.0, -520.0], max: [600.0, -380.0] },
            ],
        }
    }
}

impl Default for PlayerTunables {
    fn default() -> Self {
        Self {
            max_health: 100,
            move_speed: 260.0,
            acceleration: 1600.0,
            deceleration: 2400.0,
            starting_weapons: vec!["pistol".into()],
        }
    }
}

impl Default for ProjectileTunables {
    fn default() -> Self {
        Self {
            lifetime: 5.0,
            melee_lifetime: 0.2,
            melee_reach: 30.0,
            muzzle_offset: 18.0,
        }
    }
}

impl Default for PoolTunables {
    fn default() -> Self {
        Self {
            max_active: 200,
            ceilings: Vec::new(),
        }
    }
}

impl Default for EnemyTemplate {
    fn default() -> Self {
        Self {
            kind: EnemyKind::Chaser,
            max_health: 30,
            move_speed: 90.0,
            stopping_distance: 0.0,
            retreat_distance: 0.0,
            contact_damage: 10,
            fire_rate: 1.0,
            projectile_speed: 260.0,
            projectile_damage: 5,
        }
    }
}

impl Default for WeaponDefinition {
    fn default() -> Self {
        Self {
            name: String::new(),
            damage: 10,
            fire_rate: 2.0,
            speed: 700.0,
            melee: false,
            explosive: false,
            area_of_effect: 0.0,
            projectile_count: 1,
            time_between_projectiles: 0.1,
        }
    }
}
