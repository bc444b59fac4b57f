// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The world: live-body registry, per-tick integration, and the pairwise
//! collision sweep.
//!
//! Bodies are attached to scene nodes but only *live* bodies participate in
//! the tick. Liveness follows scene connectivity: [`World::observe`] consumes
//! the drained [`SceneEvent`] stream, registering attached bodies on
//! `Connected` and deregistering them on `Disconnected`. Registration order
//! is connect order, and both integration and the sweep walk it
//! deterministically.
//!
//! The sweep is the simple quadratic one: every unordered pair of live
//! bodies, tested with an inclusive AABB overlap (touching edges collide).
//! Each pair's previous state lives in the bodies' collision sets, giving
//! the begin/collide/end transitions:
//!
//! | was | is  | effect                                      |
//! |-----|-----|---------------------------------------------|
//! | no  | yes | insert both sets, `Begin` ×2, `Collide` ×2  |
//! | yes | yes | `Collide` ×2                                |
//! | yes | no  | remove both sets, `End` ×2                  |
//! | no  | no  | nothing                                     |

use alloc::vec::Vec;

use canopy_scene::{NodeId, Scene, SceneEvent};
use hashbrown::HashMap;
use kurbo::Point;

use crate::body::{Body, PhysicsError};

/// What happened between a pair of bodies this tick.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CollisionKind {
    /// The pair started overlapping this tick.
    Begin,
    /// The pair overlaps (emitted every overlapping tick, including the
    /// first).
    Collide,
    /// The pair stopped overlapping this tick.
    End,
}

/// A collision transition, emitted once per involved body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// The body this event is addressed to.
    pub node: NodeId,
    /// The body it collided with.
    pub other: NodeId,
    /// The transition.
    pub kind: CollisionKind,
}

/// Physics state for a scene: attached bodies plus the live registry.
#[derive(Clone, Debug, Default)]
pub struct World {
    bodies: HashMap<NodeId, Body>,
    /// Live bodies in connect order; integration and sweep order.
    live: Vec<NodeId>,
}

impl World {
    /// An empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach physics state to a node. Replaces any previous body.
    ///
    /// The body stays out of the tick until the node connects (see
    /// [`World::observe`]). Replacing a live body severs its recorded
    /// overlaps on both sides; the next sweep rediscovers them as fresh
    /// `Begin`s.
    pub fn attach(&mut self, node: NodeId, body: Body) {
        self.purge_links(node);
        self.bodies.insert(node, body);
    }

    /// Detach a node's body, returning it.
    ///
    /// The node leaves the live registry and every other body's collision
    /// set immediately, with no `End` events.
    pub fn detach(&mut self, node: NodeId) -> Option<Body> {
        self.forget(node);
        self.bodies.remove(&node)
    }

    /// The body attached to a node.
    pub fn body(&self, node: NodeId) -> Option<&Body> {
        self.bodies.get(&node)
    }

    /// Mutable access to the body attached to a node.
    pub fn body_mut(&mut self, node: NodeId) -> Option<&mut Body> {
        self.bodies.get_mut(&node)
    }

    /// Live bodies in connect order.
    pub fn live(&self) -> &[NodeId] {
        &self.live
    }

    /// Set the mass of a node's body.
    pub fn set_mass(&mut self, node: NodeId, mass: f64) -> Result<(), PhysicsError> {
        self.bodies
            .get_mut(&node)
            .ok_or(PhysicsError::NotABody)?
            .set_mass(mass)
    }

    /// Add a persistent force to a node's body.
    pub fn apply_force(&mut self, node: NodeId, force: kurbo::Vec2) -> Result<(), PhysicsError> {
        self.bodies
            .get_mut(&node)
            .ok_or(PhysicsError::NotABody)?
            .apply_force(force);
        Ok(())
    }

    /// Drop all forces on a node's body.
    pub fn clear_forces(&mut self, node: NodeId) -> Result<(), PhysicsError> {
        self.bodies
            .get_mut(&node)
            .ok_or(PhysicsError::NotABody)?
            .clear_forces();
        Ok(())
    }

    /// Sync the live registry with a drained scene event batch.
    ///
    /// `Connected` registers an attached body at the end of the registry;
    /// `Disconnected` removes it from the registry and from every remaining
    /// body's collision set. A vanished body emits no `End` events: collision
    /// events only ever reference live bodies.
    pub fn observe(&mut self, events: &[SceneEvent]) {
        for event in events {
            match *event {
                SceneEvent::Connected(node) => {
                    if self.bodies.contains_key(&node) && !self.live.contains(&node) {
                        self.live.push(node);
                    }
                }
                SceneEvent::Disconnected(node) => self.forget(node),
                _ => {}
            }
        }
    }

    fn forget(&mut self, node: NodeId) {
        self.live.retain(|n| *n != node);
        if let Some(body) = self.bodies.get_mut(&node) {
            body.collisions.clear();
        }
        self.purge_links(node);
    }

    /// Remove `node` from every other body's collision set.
    fn purge_links(&mut self, node: NodeId) {
        for body in self.bodies.values_mut() {
            body.collisions.remove(&node);
        }
    }

    /// Advance one tick: integrate every live body, then sweep for
    /// collisions, appending transitions to `out`.
    ///
    /// Integration updates velocity by the net acceleration and the node's
    /// local position by `velocity · dt`, in registration order. The sweep
    /// then tests every unordered pair once and emits each transition twice,
    /// once addressed to each body.
    pub fn step(&mut self, scene: &mut Scene, dt: f64, out: &mut Vec<CollisionEvent>) {
        for i in 0..self.live.len() {
            let node = self.live[i];
            let Some(body) = self.bodies.get_mut(&node) else {
                continue;
            };
            body.velocity += body.acceleration();
            let step = body.velocity * dt;
            if let Ok(position) = scene.position(node) {
                // Position write cannot fail after the read succeeded.
                let _ = scene.set_position(node, position + step);
            }
        }

        for i in 0..self.live.len() {
            for j in (i + 1)..self.live.len() {
                let a = self.live[i];
                let b = self.live[j];
                let is = overlaps(scene, a, b);
                let was = self
                    .bodies
                    .get(&a)
                    .is_some_and(|body| body.collisions.contains(&b));
                match (was, is) {
                    (false, true) => {
                        self.link(a, b);
                        out.push(CollisionEvent { node: a, other: b, kind: CollisionKind::Begin });
                        out.push(CollisionEvent { node: b, other: a, kind: CollisionKind::Begin });
                        out.push(CollisionEvent { node: a, other: b, kind: CollisionKind::Collide });
                        out.push(CollisionEvent { node: b, other: a, kind: CollisionKind::Collide });
                    }
                    (true, true) => {
                        out.push(CollisionEvent { node: a, other: b, kind: CollisionKind::Collide });
                        out.push(CollisionEvent { node: b, other: a, kind: CollisionKind::Collide });
                    }
                    (true, false) => {
                        self.unlink(a, b);
                        out.push(CollisionEvent { node: a, other: b, kind: CollisionKind::End });
                        out.push(CollisionEvent { node: b, other: a, kind: CollisionKind::End });
                    }
                    (false, false) => {}
                }
            }
        }
    }

    fn link(&mut self, a: NodeId, b: NodeId) {
        if let Some(body) = self.bodies.get_mut(&a) {
            body.collisions.insert(b);
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.collisions.insert(a);
        }
    }

    fn unlink(&mut self, a: NodeId, b: NodeId) {
        if let Some(body) = self.bodies.get_mut(&a) {
            body.collisions.remove(&b);
        }
        if let Some(body) = self.bodies.get_mut(&b) {
            body.collisions.remove(&a);
        }
    }
}

/// Inclusive AABB overlap of two entity boxes: touching edges collide.
fn overlaps(scene: &Scene, a: NodeId, b: NodeId) -> bool {
    let (Ok(ca), Ok(cb)) = (scene.global_position(a), scene.global_position(b)) else {
        return false;
    };
    let (Ok(sa), Ok(sb)) = (scene.size(a), scene.size(b)) else {
        return false;
    };
    let (ha, hb) = (sa / 2.0, sb / 2.0);
    ca.x - ha.width <= cb.x + hb.width
        && cb.x - hb.width <= ca.x + ha.width
        && ca.y - ha.height <= cb.y + hb.height
        && cb.y - hb.height <= ca.y + ha.height
}

pub(crate) fn box_bounds(scene: &Scene, node: NodeId) -> Option<(Point, Point)> {
    let center = scene.global_position(node).ok()?;
    let half = scene.size(node).ok()? / 2.0;
    Some((
        Point::new(center.x - half.width, center.y - half.height),
        Point::new(center.x + half.width, center.y + half.height),
    ))
}
