//! Axis-aligned bounding boxes for entity overlap tests.

use bevy::math::bounding::{Aabb3d, IntersectsVolume};
use bevy::prelude::*;

/// Cubic box of `half_extent` around `center`.
#[inline]
pub fn cube_around(center: Vec3, half_extent: f32) -> Aabb3d {
    Aabb3d::new(center, Vec3::splat(half_extent))
}

/// Inclusive overlap test; touching faces count as a hit.
#[inline]
pub fn overlaps(a: &Aabb3d, b: &Aabb3d) -> bool {
    a.intersects(b)
}

/// Degenerate box used for free slots.
#[inline]
pub fn empty_at(center: Vec3) -> Aabb3d {
    Aabb3d::new(center, Vec3::ZERO)
}
