// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Scene: a generational-arena scene tree for 2D simulations.
//!
//! This crate is the structural core of Canopy. It models a hierarchy of
//! nodes with composable capabilities and keeps three things coherent as the
//! hierarchy changes:
//!
//! - **Membership**: adoption and abandonment run a four-phase handshake.
//!   The request phases are cancelable through an [`AdoptPolicy`]; the
//!   confirmation phases are [`SceneEvent`] records in an outbox the caller
//!   drains. A refused handshake leaves the tree untouched.
//! - **Connectivity**: every node knows whether it is reachable from the
//!   designated root. Connect propagates top-down, disconnect bottom-up,
//!   exactly once per node per transition.
//! - **Geometry**: nodes with [`NodeCaps::SPATIAL`] carry a centered box
//!   (position, size, optional interface anchor) with world-space accessors,
//!   half-open point containment, and directional sector classification.
//!
//! Events move through the tree with [`Scene::dispatch`]: depth-first
//! pre-order over a snapshot of the subtree, with cancellation reported as a
//! [`Delivery`] value rather than raised as an error.
//!
//! Capabilities replace inheritance: a physics body or interface item is a
//! node with extra flags, not a subclass. Higher-level crates (gesture
//! recognition, physics, the frame driver) attach their state to [`NodeId`]s
//! and keep themselves in sync from the drained [`SceneEvent`] stream.

#![no_std]

extern crate alloc;

mod dispatch;
mod scene;
mod spatial;
mod types;

pub use dispatch::Event;
pub use scene::{AdoptPolicy, Consent, Open, Scene};
pub use types::{
    AdoptError, Delivery, NodeCaps, NodeId, Outcome, SceneError, SceneEvent, Sector,
};
