//! Collision pair helpers shared by every `CollisionStart` consumer.

use avian2d::prelude::*;
use bevy::prelude::*;

#[derive(Clone, Copy, Debug)]
pub struct ContactSide {
    pub collider: Entity,
    pub body: Option<Entity>,
}

impl ContactSide {
    /// The entity that owns gameplay data: the rigid body if there is one,
    /// otherwise the collider itself.
    #[inline]
    pub fn owner(self) -> Entity {
        self.body.unwrap_or(self.collider)
    }
}

#[inline]
pub fn sides(ev: &CollisionStart) -> (ContactSide, ContactSide) {
    (
        ContactSide {
            collider: ev.collider1,
            body: ev.body1,
        },
        ContactSide {
            collider: ev.collider2,
            body: ev.body2,
        },
    )
}

/// Order a pair so the side matching `is_a` comes first. `None` unless
/// exactly one side matches.
#[inline]
pub fn split_by(
    ev: &CollisionStart,
    mut is_a: impl FnMut(ContactSide) -> bool,
) -> Option<(ContactSide, ContactSide)> {
    let (s1, s2) = sides(ev);
    match (is_a(s1), is_a(s2)) {
        (true, false) => Some((s1, s2)),
        (false, true) => Some((s2, s1)),
        _ => None,
    }
}
