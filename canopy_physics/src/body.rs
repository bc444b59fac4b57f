// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-body physics state: mass, forces, velocity, and collision mesh.

use alloc::vec::Vec;
use core::fmt;

use canopy_scene::NodeId;
use hashbrown::HashSet;
use kurbo::{Size, Vec2};

/// Why a physics operation failed.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum PhysicsError {
    /// Mass must be a positive finite number.
    InvalidMass(f64),
    /// The node has no attached body (or no usable geometry).
    NotABody,
}

impl fmt::Display for PhysicsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMass(m) => write!(f, "mass must be positive and finite, got {m}"),
            Self::NotABody => f.write_str("node has no attached body"),
        }
    }
}

impl core::error::Error for PhysicsError {}

/// Collision mesh: the shape tested during exact contact scanning.
///
/// The broad sweep always uses the entity's AABB; the mesh only refines
/// [`World::contact_points`](crate::World::contact_points).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum Mesh {
    /// The entity's half-open box.
    #[default]
    Rect,
    /// A disc inscribed in the box (radius = extent / 2, inclusive).
    Disc,
}

impl Mesh {
    /// Test a point given relative to the body's center.
    pub(crate) fn contains_local(&self, p: Vec2, size: Size) -> bool {
        match self {
            Self::Rect => {
                let half = size / 2.0;
                p.x >= -half.width && p.x < half.width && p.y >= -half.height && p.y < half.height
            }
            Self::Disc => {
                let radius = size.width.max(size.height) / 2.0;
                p.hypot() <= radius
            }
        }
    }
}

/// Physics state attached to a spatial node.
///
/// A body does nothing on its own: attach it to a [`crate::World`] and let
/// the per-tick [`crate::World::step`] integrate it.
#[derive(Clone, Debug)]
pub struct Body {
    mass: f64,
    /// Current velocity, in world units per tick.
    pub velocity: Vec2,
    /// Shape used for exact contact scanning.
    pub mesh: Mesh,
    forces: Vec<Vec2>,
    pub(crate) collisions: HashSet<NodeId>,
}

impl Body {
    /// A unit-mass body at rest with a [`Mesh::Rect`] mesh.
    pub fn new() -> Self {
        Self::with_mesh(Mesh::Rect)
    }

    /// A unit-mass body at rest with the given mesh.
    pub fn with_mesh(mesh: Mesh) -> Self {
        Self {
            mass: 1.0,
            velocity: Vec2::ZERO,
            mesh,
            forces: Vec::new(),
            collisions: HashSet::new(),
        }
    }

    /// The body's mass.
    pub const fn mass(&self) -> f64 {
        self.mass
    }

    /// Set the mass. Non-positive or non-finite values are rejected and the
    /// prior mass stays in effect.
    pub fn set_mass(&mut self, mass: f64) -> Result<(), PhysicsError> {
        if !(mass > 0.0 && mass.is_finite()) {
            return Err(PhysicsError::InvalidMass(mass));
        }
        self.mass = mass;
        Ok(())
    }

    /// Add a persistent force. Forces accumulate until cleared.
    pub fn apply_force(&mut self, force: Vec2) {
        self.forces.push(force);
    }

    /// Drop all applied forces.
    pub fn clear_forces(&mut self) {
        self.forces.clear();
    }

    /// Net acceleration: the force sum over the mass. Zero with no forces,
    /// so an untouched body keeps its velocity.
    pub fn acceleration(&self) -> Vec2 {
        let sum = self.forces.iter().fold(Vec2::ZERO, |acc, f| acc + *f);
        sum / self.mass
    }

    /// Nodes this body currently overlaps, as of the last sweep.
    pub fn collisions(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.collisions.iter().copied()
    }

    /// Whether the last sweep left this body overlapping `other`.
    pub fn is_colliding_with(&self, other: NodeId) -> bool {
        self.collisions.contains(&other)
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mass_must_be_positive_and_finite() {
        let mut body = Body::new();
        assert_eq!(body.set_mass(0.0), Err(PhysicsError::InvalidMass(0.0)));
        assert_eq!(body.set_mass(-1.0), Err(PhysicsError::InvalidMass(-1.0)));
        assert!(body.set_mass(f64::NAN).is_err());
        assert!(body.set_mass(f64::INFINITY).is_err());
        assert_eq!(body.mass(), 1.0, "rejected values leave the prior mass");

        body.set_mass(2.5).unwrap();
        assert_eq!(body.mass(), 2.5);
    }

    #[test]
    fn acceleration_is_force_sum_over_mass() {
        let mut body = Body::new();
        body.set_mass(2.0).unwrap();
        body.apply_force(Vec2::new(4.0, 0.0));
        body.apply_force(Vec2::new(0.0, -2.0));
        assert_eq!(body.acceleration(), Vec2::new(2.0, -1.0));

        body.clear_forces();
        assert_eq!(body.acceleration(), Vec2::ZERO);
    }

    #[test]
    fn rect_mesh_is_half_open() {
        let size = Size::new(10.0, 10.0);
        assert!(Mesh::Rect.contains_local(Vec2::new(4.0, 4.0), size));
        assert!(!Mesh::Rect.contains_local(Vec2::new(5.0, 4.0), size));
        assert!(Mesh::Rect.contains_local(Vec2::new(-5.0, -5.0), size));
    }

    #[test]
    fn disc_mesh_is_inclusive_at_the_rim() {
        let size = Size::new(4.0, 4.0);
        assert!(Mesh::Disc.contains_local(Vec2::new(2.0, 0.0), size));
        assert!(!Mesh::Disc.contains_local(Vec2::new(2.0, 1.0), size));
        assert!(Mesh::Disc.contains_local(Vec2::ZERO, size));
    }
}
