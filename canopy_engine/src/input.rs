// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Raw input plumbing: coordinate normalization, input modality, canonical
//! pointer events, and one-shot waiters.
//!
//! Raw samples arrive in client coordinates (y down, origin wherever the
//! platform put the canvas). [`Viewport::normalize`] maps them into world
//! space: canvas-local, origin at the canvas center, y up. Everything past
//! this module works in world space only.

use kurbo::{Point, Size};

/// Maps raw client coordinates into world space.
///
/// `origin` is the canvas's position in client space and `size` its extent.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Canvas position in client coordinates.
    pub origin: Point,
    /// Canvas extent in client coordinates.
    pub size: Size,
}

impl Viewport {
    /// Create a viewport from the canvas's client-space placement.
    pub const fn new(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// Map a client-space point to world space.
    ///
    /// Subtracts the canvas origin, re-centers on the canvas middle, and
    /// flips the y axis so that up is positive:
    /// `((client − origin) − size/2) · (1, −1)`.
    pub fn normalize(&self, client: Point) -> Point {
        let local = client - self.origin.to_vec2();
        Point::new(
            local.x - self.size.width / 2.0,
            -(local.y - self.size.height / 2.0),
        )
    }
}

/// Where a raw sample came from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// A mouse-like device with buttons.
    Mouse,
    /// A touch surface.
    Touch,
}

/// What a pointer sample reports.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Action {
    /// Contact began.
    Down,
    /// Contact ended.
    Up,
    /// The pointer moved.
    Move,
}

/// A raw platform pointer sample, in client coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RawSample {
    /// Originating device class.
    pub source: Source,
    /// What happened.
    pub action: Action,
    /// Position in client coordinates.
    pub client: Point,
    /// Device button, `0` for the primary button. Touch samples should
    /// report `0`.
    pub button: u8,
}

/// A canonical pointer event, in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PointerEvent {
    /// What happened.
    pub action: Action,
    /// Normalized position.
    pub position: Point,
}

/// Input modality latch: exactly one source class per session.
///
/// The first raw sample decides whether this session is mouse-driven or
/// touch-driven; samples from the other source are ignored from then on.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Modality {
    latched: Option<Source>,
}

impl Modality {
    /// Admit or reject a sample's source, latching on first use.
    pub fn admits(&mut self, source: Source) -> bool {
        match self.latched {
            None => {
                self.latched = Some(source);
                true
            }
            Some(latched) => latched == source,
        }
    }

    /// The latched source, if any sample has arrived yet.
    pub const fn current(&self) -> Option<Source> {
        self.latched
    }
}

/// Awaits a single canonical pointer event of a given action.
///
/// Feed it the per-tick pointer stream; [`OneShot::observe`] yields the
/// position of the first match and never fires again. [`OneShot::abort`]
/// retires the waiter early and is idempotent.
///
/// ```
/// use canopy_engine::{Action, OneShot, PointerEvent};
/// use kurbo::Point;
///
/// let mut waiter = OneShot::new(Action::Up);
/// let event = PointerEvent { action: Action::Up, position: Point::new(1.0, 2.0) };
/// assert_eq!(waiter.observe(&event), Some(Point::new(1.0, 2.0)));
/// assert_eq!(waiter.observe(&event), None);
/// ```
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct OneShot {
    action: Action,
    done: bool,
}

impl OneShot {
    /// A waiter for the next event of `action`.
    pub const fn new(action: Action) -> Self {
        Self {
            action,
            done: false,
        }
    }

    /// Observe one canonical event; yields the position on the first match.
    pub fn observe(&mut self, event: &PointerEvent) -> Option<Point> {
        if self.done || event.action != self.action {
            return None;
        }
        self.done = true;
        Some(event.position)
    }

    /// Retire the waiter without firing. Idempotent.
    pub fn abort(&mut self) {
        self.done = true;
    }

    /// `true` once the waiter has fired or was aborted.
    pub const fn is_done(&self) -> bool {
        self.done
    }
}
