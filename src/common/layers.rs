//! Collision layers.
//!
//! Pooled entities are never structurally disabled. An idle entity keeps its
//! membership but has empty filters, so it collides with nothing.

use avian2d::prelude::*;

#[derive(PhysicsLayer, Default, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Layer {
    #[default]
    Default,
    World,
    Player,
    Enemy,
    PlayerBullet,
    EnemyBullet,
    Pickup,
}

/// Body radius of the tracked target, in world units.
pub const PLAYER_RADIUS: f32 = 13.0;

/// Body radius of every enemy kind, in world units.
pub const ENEMY_RADIUS: f32 = 16.0;

#[inline]
pub fn player_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Player,
        [Layer::World, Layer::Enemy, Layer::EnemyBullet, Layer::Pickup],
    )
}

#[inline]
pub fn enemy_layers() -> CollisionLayers {
    CollisionLayers::new(
        Layer::Enemy,
        [Layer::World, Layer::Player, Layer::PlayerBullet],
    )
}

#[inline]
pub fn player_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::PlayerBullet, [Layer::Enemy])
}

#[inline]
pub fn enemy_bullet_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::EnemyBullet, [Layer::World, Layer::Player])
}

#[inline]
pub fn pickup_layers() -> CollisionLayers {
    CollisionLayers::new(Layer::Pickup, [Layer::Player])
}

/// Same membership, no filters.
#[inline]
pub fn inert(layer: Layer) -> CollisionLayers {
    CollisionLayers::new(layer, [] as [Layer; 0])
}

#[inline]
pub fn is_in_layer(layers: &CollisionLayers, layer: Layer) -> bool {
    layers.memberships.has_all(layer)
}
