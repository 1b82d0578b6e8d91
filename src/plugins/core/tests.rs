use bevy::prelude::*;

use super::*;
use std::time::Duration;

use crate::common::tunables::{ConfigError, EnemyKind, PoolKind, fire_interval};

#[test]
fn inserts_resources() {
    let mut app = App::new();
    plugin(&mut app);
    assert!(app.world().get_resource::<Tunables>().is_some());
    assert!(app.world().get_resource::<GameRng>().is_some());
    assert!(app.world().get_resource::<ClearColor>().is_some());
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let tunables = load_tunables("assets/does-not-exist.ron");
    assert_eq!(tunables.wave.base_per_wave, 5);
    assert_eq!(tunables.pool.max_active, 200);
}

#[test]
fn shipped_tunables_are_valid() {
    let tunables = Tunables::read(TUNABLES_PATH).expect("assets/tunables.ron parses");
    assert!(!tunables.spawning.areas.is_empty());
    assert!(!tunables.upgrades.is_empty());
}

#[test]
fn partial_file_keeps_defaults_for_missing_sections() {
    let tunables: Tunables = ron::from_str("(wave: (base_per_wave: 8))").unwrap();
    assert_eq!(tunables.wave.base_per_wave, 8);
    assert_eq!(tunables.wave.difficulty_multiplier, 1.2);
    assert_eq!(tunables.weapons.len(), 4);
}

#[test]
fn validation_rejects_bad_values() {
    let mut t = Tunables::default();
    t.wave.difficulty_multiplier = 0.0;
    assert!(matches!(t.validate(), Err(ConfigError::Invalid(_))));

    let mut t = Tunables::default();
    t.wave.spawn_interval = [1.0, 1.0];
    assert!(t.validate().is_err());

    let mut t = Tunables::default();
    t.upgrades.push("laser".into());
    assert!(t.validate().is_err());

    let mut t = Tunables::default();
    t.weapons[0].fire_rate = 0.0;
    assert!(t.validate().is_err());

    assert!(Tunables::default().validate().is_ok());
}

#[test]
fn fire_rates_too_small_for_a_duration_are_rejected() {
    assert_eq!(fire_interval(2.0), Some(Duration::from_millis(500)));
    assert_eq!(fire_interval(0.0), None);
    assert_eq!(fire_interval(f32::NAN), None);
    assert_eq!(fire_interval(1e-45), None);

    let mut t = Tunables::default();
    t.weapons[0].fire_rate = 1e-45;
    assert!(matches!(t.validate(), Err(ConfigError::Invalid(_))));

    let mut t = Tunables::default();
    let shooter = t
        .enemies
        .iter_mut()
        .find(|e| e.template.kind != EnemyKind::Chaser)
        .expect("default roster has a shooter");
    shooter.template.fire_rate = f32::MIN_POSITIVE / 4.0;
    assert!(t.validate().is_err());
}

#[test]
fn spawn_weight_outside_unit_range_is_rejected() {
    let mut t = Tunables::default();
    t.enemies[0].spawn_weight = 1.5;
    assert!(matches!(t.validate(), Err(ConfigError::Invalid(_))));

    t.enemies[0].spawn_weight = -0.1;
    assert!(t.validate().is_err());

    t.enemies[0].spawn_weight = 0.0;
    assert!(t.validate().is_ok());
}

#[test]
fn shipped_pool_ceilings_parse() {
    let tunables = Tunables::read(TUNABLES_PATH).expect("assets/tunables.ron parses");
    assert!(
        tunables
            .pool
            .ceilings
            .iter()
            .any(|c| c.kind == PoolKind::EnemyBolt)
    );
}

#[test]
fn malformed_file_is_a_parse_error() {
    let err = ron::from_str::<Tunables>("(wave: [").unwrap_err();
    assert!(matches!(ConfigError::from(err), ConfigError::Parse(_)));
}
