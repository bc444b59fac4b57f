// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Physics: per-tick integration and collision detection for Canopy
//! scenes.
//!
//! A [`Body`] attaches mass, forces, velocity, and a collision [`Mesh`] to a
//! spatial scene node. The [`World`] owns the attached bodies and a live
//! registry that mirrors scene connectivity (fed from drained scene events
//! via [`World::observe`]). Each call to [`World::step`]:
//!
//! 1. integrates every live body (`velocity += ΣF / mass`, then the node's
//!    position moves by `velocity · dt`), in connect order;
//! 2. sweeps every unordered pair with an inclusive AABB test and emits
//!    [`CollisionEvent`]s for the begin/collide/end transitions.
//!
//! The sweep is deliberately the quadratic one: scenes here are small and
//! deterministic iteration order matters more than asymptotics. Exact
//! contact points are available on demand through
//! [`World::contact_points`], which refines an overlap by the bodies'
//! meshes over the integer lattice.

#![no_std]

extern crate alloc;

mod body;
mod contact;
mod sweep;

pub use body::{Body, Mesh, PhysicsError};
pub use sweep::{CollisionEvent, CollisionKind, World};
