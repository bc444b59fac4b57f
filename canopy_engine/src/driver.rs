// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The frame driver: one object that turns raw input and a tick clock into
//! scene broadcasts, physics steps, and gestures.

use alloc::vec::Vec;
use core::fmt;
use core::sync::atomic::{AtomicBool, Ordering};

use canopy_gesture::{GestureEvent, GestureState};
use canopy_physics::{CollisionEvent, World};
use canopy_scene::{Event, NodeId, Outcome, Scene};
use kurbo::Point;

use crate::input::{Action, Modality, PointerEvent, RawSample, Viewport};

/// Only one driver may exist at a time.
static CLAIMED: AtomicBool = AtomicBool::new(false);

/// Why a driver could not be constructed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DriverError {
    /// Another driver is alive; drop it first.
    AlreadyRunning,
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AlreadyRunning => f.write_str("a driver is already running"),
        }
    }
}

impl core::error::Error for DriverError {}

/// Broadcast payloads delivered to every connected node each tick.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FrameEvent {
    /// First tick only, before the first update.
    Start,
    /// Every tick, before physics.
    Update,
    /// A canonical pointer event. The only cancelable frame event.
    Pointer(PointerEvent),
    /// Every tick, after physics and pointer work.
    Render,
}

impl Event for FrameEvent {
    fn cancelable(&self) -> bool {
        matches!(self, Self::Pointer(_))
    }
}

/// Per-tick digest returned by [`Driver::tick`].
#[derive(Clone, Debug, Default)]
pub struct Frame {
    /// Canonical pointer events flushed this tick, in flush order.
    pub pointer: Vec<PointerEvent>,
    /// Gestures recognized this tick.
    pub gestures: Vec<GestureEvent<NodeId>>,
    /// Collision transitions from this tick's sweep.
    pub collisions: Vec<CollisionEvent>,
}

/// The frame driver.
///
/// At most one driver exists at a time: [`Driver::new`] claims a global flag
/// and fails with [`DriverError::AlreadyRunning`] while another instance is
/// alive; dropping the driver releases the claim. Everything else about it
/// is an ordinary explicit context, threaded into [`Driver::tick`] along
/// with the scene and physics world.
///
/// Raw pointer samples arrive between ticks via [`Driver::push_raw`], which
/// gates them by input modality, filters non-primary buttons, normalizes
/// coordinates, and latches down/up/move flags. The next tick flushes the
/// latched state as canonical [`FrameEvent::Pointer`] broadcasts and feeds
/// the gesture recognizer.
#[derive(Debug)]
pub struct Driver {
    viewport: Viewport,
    modality: Modality,
    gestures: GestureState<NodeId>,
    started: bool,
    now: u64,
    pending_down: bool,
    pending_up: bool,
    pending_move: bool,
    /// Last normalized pointer position.
    position: Point,
    /// Pointer is currently held down; gates `Up` samples.
    engaged: bool,
}

impl Driver {
    /// Claim the driver slot.
    pub fn new(viewport: Viewport) -> Result<Self, DriverError> {
        if CLAIMED.swap(true, Ordering::AcqRel) {
            return Err(DriverError::AlreadyRunning);
        }
        Ok(Self {
            viewport,
            modality: Modality::default(),
            gestures: GestureState::new(),
            started: false,
            now: 0,
            pending_down: false,
            pending_up: false,
            pending_move: false,
            position: Point::ORIGIN,
            engaged: false,
        })
    }

    /// The driver's tick clock.
    pub const fn now(&self) -> u64 {
        self.now
    }

    /// The viewport used for normalization.
    pub const fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// The latched input modality.
    pub const fn modality(&self) -> Modality {
        self.modality
    }

    /// Set how many ticks a still press takes to become a hold.
    pub fn set_hold_ticks(&mut self, ticks: u64) {
        self.gestures.hold_ticks = ticks;
    }

    /// Feed a raw platform sample.
    ///
    /// Samples from the non-latched modality and non-primary buttons are
    /// dropped. `Up` is honored only while the pointer is engaged by a seen
    /// `Down`. The sample's position replaces the latched one.
    pub fn push_raw(&mut self, sample: RawSample) {
        if !self.modality.admits(sample.source) {
            return;
        }
        match sample.action {
            Action::Down => {
                if sample.button != 0 {
                    return;
                }
                self.position = self.viewport.normalize(sample.client);
                self.pending_down = true;
                self.engaged = true;
            }
            Action::Up => {
                if sample.button != 0 || !self.engaged {
                    return;
                }
                self.position = self.viewport.normalize(sample.client);
                self.pending_up = true;
                self.engaged = false;
            }
            Action::Move => {
                self.position = self.viewport.normalize(sample.client);
                self.pending_move = true;
            }
        }
    }

    /// Topmost connected spatial node under a world-space point.
    ///
    /// Walks the connect-order registry in reverse: the most recently
    /// connected node wins.
    pub fn pick(&self, scene: &Scene, position: Point) -> Option<NodeId> {
        scene
            .connect_order()
            .iter()
            .rev()
            .copied()
            .find(|node| scene.contains_point(*node, position).unwrap_or(false))
    }

    /// Run one tick.
    ///
    /// In order: `Start` (first tick only), `Update`, drain scene events
    /// into the physics world, physics step, pointer flush (down, up, move)
    /// with gesture recognition, `Render`. The returned [`Frame`] digests
    /// what the tick produced; `on_event` sees every broadcast at every
    /// visited node and may cancel `Pointer` events.
    pub fn tick(
        &mut self,
        scene: &mut Scene,
        world: &mut World,
        dt: f64,
        mut on_event: impl FnMut(&mut Scene, NodeId, &FrameEvent) -> Outcome,
    ) -> Frame {
        let mut frame = Frame::default();

        if !self.started {
            self.started = true;
            broadcast(scene, &mut on_event, FrameEvent::Start);
        }
        broadcast(scene, &mut on_event, FrameEvent::Update);

        world.observe(&scene.drain_events());
        world.step(scene, dt, &mut frame.collisions);

        let (down, up, moved) = (self.pending_down, self.pending_up, self.pending_move);
        self.pending_down = false;
        self.pending_up = false;
        self.pending_move = false;
        let position = self.position;

        if down {
            let event = PointerEvent { action: Action::Down, position };
            frame.pointer.push(event);
            broadcast(scene, &mut on_event, FrameEvent::Pointer(event));
            if let Some(target) = self.pick(scene, position) {
                self.gestures.on_down(target, position, self.now);
            }
        }
        if up {
            let event = PointerEvent { action: Action::Up, position };
            frame.pointer.push(event);
            broadcast(scene, &mut on_event, FrameEvent::Pointer(event));
            let released = self
                .gestures
                .on_up(position, |target| {
                    scene.contains_point(*target, position).unwrap_or(false)
                });
            frame.gestures.extend(released);
        }
        if moved {
            let event = PointerEvent { action: Action::Move, position };
            frame.pointer.push(event);
            broadcast(scene, &mut on_event, FrameEvent::Pointer(event));
            frame.gestures.extend(self.gestures.on_move(position));
        }
        frame.gestures.extend(self.gestures.on_tick(self.now));

        broadcast(scene, &mut on_event, FrameEvent::Render);

        self.now += 1;
        frame
    }
}

impl Drop for Driver {
    fn drop(&mut self) {
        CLAIMED.store(false, Ordering::Release);
    }
}

fn broadcast(
    scene: &mut Scene,
    on_event: &mut impl FnMut(&mut Scene, NodeId, &FrameEvent) -> Outcome,
    event: FrameEvent,
) {
    let root = scene.root();
    let mut event = event;
    scene.dispatch(root, &mut event, |scene, id, event| {
        on_event(scene, id, event)
    });
}
