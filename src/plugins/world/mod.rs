//! World plugin: arena walls, floor and the configured spawn areas.

use avian2d::prelude::*;
use bevy::prelude::*;
use bevy::state::state_scoped::DespawnOnExit;

use crate::common::layers::Layer;
use crate::common::state::GameState;
use crate::common::tunables::Tunables;
use crate::plugins::spawning::area::SpawnArea;

const TILE: i32 = 64;
pub const HALF_W: i32 = TILE * 16;
pub const HALF_H: i32 = TILE * 9;

pub fn plugin(app: &mut App) {
    app.add_systems(
        OnEnter(GameState::InGame),
        (spawn_arena, spawn_floor, spawn_areas),
    );
}

fn spawn_arena(mut commands: Commands) {
    let wall_color = Color::srgb(0.25, 0.27, 0.33);
    let thickness = 30.0;

    let wall_layers = CollisionLayers::new(
        Layer::World,
        [
            Layer::Player,
            Layer::Enemy,
            Layer::PlayerBullet,
            Layer::EnemyBullet,
        ],
    );

    let mut spawn_wall = |name: &'static str, pos: Vec3, size: Vec2| {
        commands.spawn((
            Name::new(name),
            Sprite::from_color(wall_color, size),
            Transform::from_translation(pos),
            RigidBody::Static,
            Collider::rectangle(size.x, size.y),
            wall_layers,
            DespawnOnExit(GameState::InGame),
        ));
    };

    let (w, h) = (HALF_W as f32, HALF_H as f32);
    spawn_wall(
        "WallTop",
        Vec3::new(0.0, h + thickness * 0.5, 0.0),
        Vec2::new(w * 2.0 + thickness * 2.0, thickness),
    );
    spawn_wall(
        "WallBottom",
        Vec3::new(0.0, -h - thickness * 0.5, 0.0),
        Vec2::new(w * 2.0 + thickness * 2.0, thickness),
    );
    spawn_wall(
        "WallLeft",
        Vec3::new(-w - thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, h * 2.0),
    );
    spawn_wall(
        "WallRight",
        Vec3::new(w + thickness * 0.5, 0.0, 0.0),
        Vec2::new(thickness, h * 2.0),
    );
}

/// Checkerboard of plain sprites; the game ships without textures.
fn spawn_floor(mut commands: Commands) {
    (-(HALF_H / TILE)..=HALF_H / TILE)
        .flat_map(|y| (-(HALF_W / TILE)..=HALF_W / TILE).map(move |x| (x, y)))
        .for_each(|(x, y)| {
            let world_pos = Vec3::new(x as f32 * TILE as f32, y as f32 * TILE as f32, 0.0);
            let color = if (x + y) % 2 == 0 {
                Color::srgb(0.14, 0.14, 0.16)
            } else {
                Color::srgb(0.12, 0.12, 0.14)
            };

            commands.spawn((
                Sprite::from_color(color, Vec2::splat(TILE as f32)),
                Transform::from_translation(world_pos),
                DespawnOnExit(GameState::InGame),
            ));
        });
}

fn spawn_areas(mut commands: Commands, tunables: Res<Tunables>) {
    let areas = &tunables.spawning.areas;
    if areas.is_empty() {
        warn!("no spawn areas configured; enemies will not appear");
    }
    for (i, t) in areas.iter().enumerate() {
        let area = SpawnArea::from(t);
        commands.spawn((
            Name::new(format!("SpawnArea{i}")),
            area,
            Transform::from_translation(area.center().extend(0.0)),
            DespawnOnExit(GameState::InGame),
        ));
    }
    debug!("{} spawn area(s) placed", areas.len());
}
