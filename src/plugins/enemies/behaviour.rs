//! Pure steering rules. No ECS access, so every case is a plain function call
//! in tests.

use bevy::prelude::*;

use crate::common::tunables::{EnemyKind, EnemyTemplate};

/// Velocity that moves `from` toward `to` at `speed`, slowed on the last step
/// so one tick of `dt` lands exactly on the target instead of past it.
pub fn approach(from: Vec2, to: Vec2, speed: f32, dt: f32) -> Vec2 {
    let delta = to - from;
    let distance = delta.length();
    if distance <= f32::EPSILON || speed <= 0.0 {
        return Vec2::ZERO;
    }
    if dt > 0.0 && speed * dt > distance {
        return delta / dt;
    }
    delta / distance * speed
}

/// Desired velocity for one actor this tick.
pub fn steer(template: &EnemyTemplate, from: Vec2, to: Vec2, dt: f32) -> Vec2 {
    match template.kind {
        EnemyKind::Chaser => approach(from, to, template.move_speed, dt),
        EnemyKind::Kiter => {
            let distance = from.distance(to);
            if distance > template.stopping_distance {
                approach(from, to, template.move_speed, dt)
            } else if distance < template.retreat_distance {
                (from - to).normalize_or_zero() * template.move_speed
            } else {
                Vec2::ZERO
            }
        }
        EnemyKind::Turret => Vec2::ZERO,
    }
}

#[inline]
pub fn shoots(kind: EnemyKind) -> bool {
    matches!(kind, EnemyKind::Kiter | EnemyKind::Turret)
}

/// Sprite tint per behaviour so the three kinds read apart at a glance.
pub fn tint(kind: EnemyKind) -> Color {
    match kind {
        EnemyKind::Chaser => Color::srgb(0.9, 0.25, 0.25),
        EnemyKind::Kiter => Color::srgb(0.95, 0.6, 0.2),
        EnemyKind::Turret => Color::srgb(0.6, 0.3, 0.85),
    }
}
