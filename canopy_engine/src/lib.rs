// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Canopy Engine: the frame driver that ties scene, physics, and gestures
//! together.
//!
//! The [`Driver`] owns the tick clock and the raw-input edge. Each tick it:
//!
//! 1. broadcasts [`FrameEvent::Start`] (first tick only) and
//!    [`FrameEvent::Update`] from the scene root;
//! 2. drains the scene's membership/connectivity events into the physics
//!    [`World`](canopy_physics::World);
//! 3. steps physics (integration plus the collision sweep);
//! 4. flushes latched pointer state as cancelable [`FrameEvent::Pointer`]
//!    broadcasts, feeding the gesture recognizer — targets resolve to the
//!    most recently connected spatial node under the pointer;
//! 5. broadcasts [`FrameEvent::Render`];
//! 6. returns a [`Frame`] digest of the tick's pointer events, gestures,
//!    and collisions.
//!
//! Raw samples are normalized by a [`Viewport`] (canvas-local, center
//! origin, y up), gated by an input [`Modality`] latch, and filtered to the
//! primary button. One-shot interactions (wait for the next release or
//! movement) are modeled by [`OneShot`] waiters fed from the frame's
//! pointer stream.
//!
//! Only one driver exists at a time; the claim is released when it drops.

#![no_std]

extern crate alloc;

#[cfg(test)]
extern crate std;

mod driver;
mod input;

pub use driver::{Driver, DriverError, Frame, FrameEvent};
pub use input::{Action, Modality, OneShot, PointerEvent, RawSample, Source, Viewport};
