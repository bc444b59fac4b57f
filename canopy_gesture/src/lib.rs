// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Pointer gesture recognition over a canonical event stream.
//!
//! [`GestureState`] is a small state machine that turns pointer down/move/up
//! samples plus a tick clock into higher-level gestures:
//!
//! - **Click**: press and release on the same target, no movement between.
//! - **Hold**: press kept still for a configurable number of ticks
//!   (default 300).
//! - **Drag**: any movement while pressed opens a `DragBegin … Drag* …
//!   DragEnd` sequence on the target hit at press time.
//!
//! At most one gesture is in flight; a pointer down while one is active is
//! ignored. Exactly one of click, hold, or a drag sequence results from each
//! press/release cycle.
//!
//! The machine is generic over the target key `K`, so callers decide what a
//! "target" is (a node handle, an index, a widget id). Time is a tick count
//! supplied by the caller: the hold timer is a deadline (`fire at tick N
//! unless canceled`), checked by [`GestureState::on_tick`], not a background
//! timer.
//!
//! ```
//! use canopy_gesture::{GestureKind, GestureState};
//! use kurbo::Point;
//!
//! let mut gestures: GestureState<u32> = GestureState::new();
//! gestures.on_down(7, Point::new(2.0, 3.0), 0);
//! let click = gestures.on_up(Point::new(2.0, 3.0), |_| true).unwrap();
//! assert_eq!(click.kind, GestureKind::Click);
//! assert_eq!(click.target, 7);
//! ```

#![no_std]

extern crate alloc;

use kurbo::Point;
use smallvec::SmallVec;

/// Default hold duration, in ticks.
pub const DEFAULT_HOLD_TICKS: u64 = 300;

/// Where the machine currently is in a press/release cycle.
#[derive(Clone, Debug, PartialEq)]
pub enum Phase<K> {
    /// No gesture in flight.
    Idle,
    /// Pointer is down and has not moved.
    Pressed {
        /// Target hit at press time.
        target: K,
        /// Pointer position at press time.
        origin: Point,
        /// Tick at which the press becomes a hold.
        deadline: u64,
    },
    /// The hold deadline fired; waiting for release.
    Holding {
        /// Target hit at press time.
        target: K,
    },
    /// The pointer moved while pressed; a drag is open.
    Dragging {
        /// Target hit at press time. Never re-resolved mid-drag.
        target: K,
    },
}

/// Kind of a recognized gesture event.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GestureKind {
    /// Press and release on the same target with no movement.
    Click,
    /// Press kept still past the hold deadline.
    Hold,
    /// First movement while pressed; carries the press origin.
    DragBegin,
    /// Movement while dragging; carries the current position.
    Drag,
    /// Release while dragging.
    DragEnd,
}

/// A recognized gesture on a target.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct GestureEvent<K> {
    /// The target the gesture applies to.
    pub target: K,
    /// World-space position the event fired at.
    pub position: Point,
    /// What was recognized.
    pub kind: GestureKind,
}

/// Single-pointer gesture state machine.
///
/// Feed it the canonical pointer stream (`on_down` / `on_move` / `on_up`) and
/// drive the hold timer with `on_tick` once per frame. Events come back as
/// return values; nothing is buffered internally.
#[derive(Clone, Debug)]
pub struct GestureState<K> {
    /// Ticks a press must stay still before it becomes a hold.
    pub hold_ticks: u64,
    phase: Phase<K>,
}

impl<K: Clone> GestureState<K> {
    /// Create a machine with the default hold duration.
    pub const fn new() -> Self {
        Self::with_hold_ticks(DEFAULT_HOLD_TICKS)
    }

    /// Create a machine with a custom hold duration in ticks.
    pub const fn with_hold_ticks(hold_ticks: u64) -> Self {
        Self {
            hold_ticks,
            phase: Phase::Idle,
        }
    }

    /// The current phase.
    pub const fn phase(&self) -> &Phase<K> {
        &self.phase
    }

    /// `true` if no gesture is in flight.
    pub const fn is_idle(&self) -> bool {
        matches!(self.phase, Phase::Idle)
    }

    /// Record a pointer down on `target` at tick `now`.
    ///
    /// Arms the hold deadline at `now + hold_ticks`. Returns `false` if a
    /// gesture is already in flight, in which case the press is ignored.
    pub fn on_down(&mut self, target: K, position: Point, now: u64) -> bool {
        if !self.is_idle() {
            return false;
        }
        self.phase = Phase::Pressed {
            target,
            origin: position,
            deadline: now.saturating_add(self.hold_ticks),
        };
        true
    }

    /// Advance the tick clock, firing the hold deadline if it is due.
    ///
    /// Emits `Hold` at the press origin when a press reaches its deadline.
    /// A deadline that became stale (the press turned into a drag, or was
    /// released or canceled) is a no-op.
    pub fn on_tick(&mut self, now: u64) -> Option<GestureEvent<K>> {
        let Phase::Pressed { target, origin, deadline } = &self.phase else {
            return None;
        };
        if now < *deadline {
            return None;
        }
        let event = GestureEvent {
            target: target.clone(),
            // The pointer cannot have moved while Pressed, so the origin is
            // the current position.
            position: *origin,
            kind: GestureKind::Hold,
        };
        self.phase = Phase::Holding {
            target: event.target.clone(),
        };
        Some(event)
    }

    /// Record pointer movement.
    ///
    /// The first movement of a press cancels the hold deadline and opens a
    /// drag: `DragBegin` at the press origin, then `Drag` at the new
    /// position. Further movement emits a `Drag` each. Movement in any other
    /// phase emits nothing.
    pub fn on_move(&mut self, position: Point) -> SmallVec<[GestureEvent<K>; 2]> {
        let mut out = SmallVec::new();
        match &self.phase {
            Phase::Pressed { target, origin, .. } => {
                out.push(GestureEvent {
                    target: target.clone(),
                    position: *origin,
                    kind: GestureKind::DragBegin,
                });
                out.push(GestureEvent {
                    target: target.clone(),
                    position,
                    kind: GestureKind::Drag,
                });
                self.phase = Phase::Dragging {
                    target: target.clone(),
                };
            }
            Phase::Dragging { target } => {
                out.push(GestureEvent {
                    target: target.clone(),
                    position,
                    kind: GestureKind::Drag,
                });
            }
            Phase::Idle | Phase::Holding { .. } => {}
        }
        out
    }

    /// Record the pointer release, closing the cycle.
    ///
    /// A still press clicks iff `hit(target)` says the release landed inside
    /// the target; a drag ends with `DragEnd`; a hold ends silently. The
    /// machine returns to idle in every case.
    pub fn on_up(
        &mut self,
        position: Point,
        hit: impl FnOnce(&K) -> bool,
    ) -> Option<GestureEvent<K>> {
        match core::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::Pressed { target, .. } => hit(&target).then_some(GestureEvent {
                target,
                position,
                kind: GestureKind::Click,
            }),
            Phase::Dragging { target } => Some(GestureEvent {
                target,
                position,
                kind: GestureKind::DragEnd,
            }),
            Phase::Idle | Phase::Holding { .. } => None,
        }
    }

    /// Reset to idle, discarding any gesture in flight. Idempotent.
    pub fn cancel(&mut self) {
        self.phase = Phase::Idle;
    }
}

impl<K: Clone> Default for GestureState<K> {
    fn default() -> Self {
        Self::new()
    }
}
