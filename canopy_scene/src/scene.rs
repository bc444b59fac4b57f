// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene storage and the membership handshake.
//!
//! The scene is a generational arena: nodes live in slots, handles are
//! `(index, generation)` pairs, and freed slots are recycled with a bumped
//! generation so stale handles read as dead rather than aliasing a new node.
//!
//! Membership changes go through a four-phase handshake. The two "request"
//! phases are cancelable and run through an [`AdoptPolicy`] before anything
//! mutates; the two "confirmation" phases are [`SceneEvent`] records appended
//! to the outbox after the mutation commits. Connectivity (reachability from
//! the designated root) is maintained incrementally: adoption into a
//! connected chain connects the new subtree top-down, abandonment disconnects
//! it bottom-up.

use alloc::string::String;
use alloc::vec::Vec;

use crate::spatial::Spatial;
use crate::types::{AdoptError, NodeCaps, NodeId, SceneError, SceneEvent};

/// A veto point's answer during the membership handshake.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Consent {
    /// Let the handshake proceed.
    Allow,
    /// Refuse; the operation fails with no state change.
    Veto,
}

/// Veto points consulted during [`Scene::add_child_with`] and
/// [`Scene::remove_child_with`].
///
/// The four methods are the cancelable "request" phases of the handshake:
/// the parent side is asked first, then the child side, and a [`Consent::Veto`]
/// from either aborts the operation before any mutation. Every method defaults
/// to [`Consent::Allow`]; [`Open`] is the policy that overrides none of them.
///
/// The policy receives the scene immutably, so a veto decision can inspect
/// names, capabilities, and geometry but never mutate mid-handshake.
pub trait AdoptPolicy {
    /// Asked of the prospective parent before it adopts `child`.
    fn try_adopt_child(&mut self, scene: &Scene, parent: NodeId, child: NodeId) -> Consent {
        let _ = (scene, parent, child);
        Consent::Allow
    }

    /// Asked of the prospective child before it joins `parent`.
    fn try_adopt(&mut self, scene: &Scene, child: NodeId, parent: NodeId) -> Consent {
        let _ = (scene, child, parent);
        Consent::Allow
    }

    /// Asked of the parent before it releases `child`.
    fn try_abandon_child(&mut self, scene: &Scene, parent: NodeId, child: NodeId) -> Consent {
        let _ = (scene, parent, child);
        Consent::Allow
    }

    /// Asked of the child before it leaves `parent`.
    fn try_abandon(&mut self, scene: &Scene, child: NodeId, parent: NodeId) -> Consent {
        let _ = (scene, child, parent);
        Consent::Allow
    }
}

/// The policy that vetoes nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct Open;

impl AdoptPolicy for Open {}

#[derive(Clone, Debug)]
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) connected: bool,
    pub(crate) caps: NodeCaps,
    pub(crate) spatial: Option<Spatial>,
}

/// The scene: an arena of nodes with a designated root.
///
/// Construct one with [`Scene::new`], spawn detached nodes with
/// [`Scene::spawn`], and wire them together with the handshake operations.
/// Confirmation and connectivity records accumulate in an outbox; callers
/// drain them with [`Scene::drain_events`] (typically once per tick).
///
/// ```
/// use canopy_scene::{NodeCaps, Scene, SceneEvent};
///
/// let mut scene = Scene::new();
/// let a = scene.spawn("a", NodeCaps::SPATIAL);
/// scene.add_child(scene.root(), a).unwrap();
///
/// assert!(scene.is_connected(a));
/// let events = scene.drain_events();
/// assert!(events.contains(&SceneEvent::Connected(a)));
/// ```
#[derive(Debug)]
pub struct Scene {
    nodes: Vec<Option<Node>>,
    generations: Vec<u32>,
    free_list: Vec<usize>,
    root: NodeId,
    outbox: Vec<SceneEvent>,
    connect_order: Vec<NodeId>,
}

impl Scene {
    /// Create a scene containing only the designated root.
    ///
    /// The root is born connected, has no capabilities, and can never be
    /// adopted or removed.
    pub fn new() -> Self {
        let mut scene = Self {
            nodes: Vec::new(),
            generations: Vec::new(),
            free_list: Vec::new(),
            root: NodeId::new(0, 0),
            outbox: Vec::new(),
            connect_order: Vec::new(),
        };
        let root = scene.alloc(Node {
            name: String::from("root"),
            parent: None,
            children: Vec::new(),
            connected: true,
            caps: NodeCaps::empty(),
            spatial: None,
        });
        scene.root = root;
        scene
    }

    /// The designated root.
    pub const fn root(&self) -> NodeId {
        self.root
    }

    /// Create a detached node.
    ///
    /// `PHYSICS` and `UI` capabilities imply `SPATIAL`; the flag set is
    /// upgraded accordingly. Only the root is born connected, so the new node
    /// is disconnected until adopted into a connected chain.
    pub fn spawn(&mut self, name: &str, caps: NodeCaps) -> NodeId {
        let mut caps = caps;
        if caps.intersects(NodeCaps::PHYSICS | NodeCaps::UI) {
            caps |= NodeCaps::SPATIAL;
        }
        let spatial = caps.contains(NodeCaps::SPATIAL).then(Spatial::default);
        self.alloc(Node {
            name: String::from(name),
            parent: None,
            children: Vec::new(),
            connected: false,
            caps,
            spatial,
        })
    }

    fn alloc(&mut self, node: Node) -> NodeId {
        if let Some(idx) = self.free_list.pop() {
            debug_assert!(self.nodes[idx].is_none(), "free list pointed at a live slot");
            self.nodes[idx] = Some(node);
            #[expect(clippy::cast_possible_truncation, reason = "arena capped at u32::MAX slots")]
            let id = NodeId::new(idx as u32, self.generations[idx]);
            id
        } else {
            let idx = self.nodes.len();
            self.nodes.push(Some(node));
            self.generations.push(0);
            #[expect(clippy::cast_possible_truncation, reason = "arena capped at u32::MAX slots")]
            let id = NodeId::new(idx as u32, 0);
            id
        }
    }

    /// `true` if the handle names a live node.
    pub fn is_alive(&self, id: NodeId) -> bool {
        let idx = id.idx();
        idx < self.nodes.len() && self.generations[idx] == id.1 && self.nodes[idx].is_some()
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.idx()].as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        if !self.is_alive(id) {
            return None;
        }
        self.nodes[id.idx()].as_mut()
    }

    /// Internal accessor for handles already validated by the caller.
    fn node(&self, id: NodeId) -> &Node {
        self.get(id).expect("dangling NodeId")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        self.get_mut(id).expect("dangling NodeId")
    }

    /// The node's name, if it is alive.
    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.get(id).map(|n| n.name.as_str())
    }

    /// Rename a node. No-op on a stale handle.
    pub fn set_name(&mut self, id: NodeId, name: &str) {
        if let Some(node) = self.get_mut(id) {
            node.name = String::from(name);
        }
    }

    /// The node's capability flags, if it is alive.
    pub fn caps(&self, id: NodeId) -> Option<NodeCaps> {
        self.get(id).map(|n| n.caps)
    }

    /// The node's parent. `None` for the root, detached nodes, and stale
    /// handles.
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    /// The node's parent, with the failure reason made explicit.
    pub fn require_parent(&self, id: NodeId) -> Result<NodeId, SceneError> {
        self.get(id)
            .ok_or(SceneError::Stale)?
            .parent
            .ok_or(SceneError::NoParent)
    }

    /// The node's children in insertion order. Empty for stale handles.
    pub fn children_of(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map_or(&[], |n| n.children.as_slice())
    }

    /// `true` if the node is reachable from the root. Stale handles read as
    /// disconnected.
    pub fn is_connected(&self, id: NodeId) -> bool {
        self.get(id).is_some_and(|n| n.connected)
    }

    /// The topmost ancestor of a node (the node itself if detached).
    pub fn peak(&self, id: NodeId) -> Option<NodeId> {
        self.get(id)?;
        let mut at = id;
        while let Some(parent) = self.node(at).parent {
            at = parent;
        }
        Some(at)
    }

    /// Connected spatial nodes in the order they connected.
    ///
    /// Hit priority walks this in reverse: the most recently connected node
    /// wins.
    pub fn connect_order(&self) -> &[NodeId] {
        &self.connect_order
    }

    /// Drain the outbox of confirmation and connectivity records.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        core::mem::take(&mut self.outbox)
    }

    /// Adopt `child` under `parent` with the allow-everything policy.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), AdoptError> {
        self.add_child_with(parent, child, &mut Open)
    }

    /// Adopt `child` under `parent`, running the full handshake.
    ///
    /// Structural checks come first, then the parent-side and child-side veto
    /// points. Failure at any phase leaves the tree untouched. On success the
    /// outbox records `AdoptChild` then `Adopt`, and if `parent` is connected
    /// the new subtree connects top-down (a `Connected` record per node,
    /// parent before descendants).
    pub fn add_child_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        policy: &mut dyn AdoptPolicy,
    ) -> Result<(), AdoptError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(AdoptError::Stale);
        }
        if child == self.root {
            return Err(AdoptError::RootAdoption);
        }
        match self.node(child).parent {
            Some(p) if p == parent => return Err(AdoptError::DuplicateChild),
            Some(_) => return Err(AdoptError::AlreadyParented),
            None => {}
        }
        // Cycle check: `child` must not already be an ancestor of `parent`.
        let mut at = parent;
        loop {
            if at == child {
                return Err(AdoptError::WouldCycle);
            }
            match self.node(at).parent {
                Some(p) => at = p,
                None => break,
            }
        }
        if self.node(parent).caps.contains(NodeCaps::SPATIAL)
            && !self.node(child).caps.contains(NodeCaps::SPATIAL)
        {
            return Err(AdoptError::CapabilityMismatch);
        }
        if policy.try_adopt_child(self, parent, child) == Consent::Veto {
            return Err(AdoptError::VetoedByParent);
        }
        if policy.try_adopt(self, child, parent) == Consent::Veto {
            return Err(AdoptError::VetoedByChild);
        }

        self.node_mut(parent).children.push(child);
        self.node_mut(child).parent = Some(parent);
        self.outbox.push(SceneEvent::AdoptChild { parent, child });
        self.outbox.push(SceneEvent::Adopt { child, parent });

        if self.node(parent).connected {
            self.connect_subtree(child);
        }
        Ok(())
    }

    /// Release `child` from `parent` with the allow-everything policy.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), AdoptError> {
        self.remove_child_with(parent, child, &mut Open)
    }

    /// Release `child` from `parent`, running the full handshake.
    ///
    /// On success the outbox records `AbandonChild` then `Abandon`, and the
    /// subtree disconnects bottom-up (a `Disconnected` record per node,
    /// descendants before the node) if it was connected.
    pub fn remove_child_with(
        &mut self,
        parent: NodeId,
        child: NodeId,
        policy: &mut dyn AdoptPolicy,
    ) -> Result<(), AdoptError> {
        if !self.is_alive(parent) || !self.is_alive(child) {
            return Err(AdoptError::Stale);
        }
        if self.node(child).parent != Some(parent) {
            return Err(AdoptError::NotAChild);
        }
        if policy.try_abandon_child(self, parent, child) == Consent::Veto {
            return Err(AdoptError::VetoedByParent);
        }
        if policy.try_abandon(self, child, parent) == Consent::Veto {
            return Err(AdoptError::VetoedByChild);
        }

        self.node_mut(parent).children.retain(|c| *c != child);
        self.node_mut(child).parent = None;
        self.outbox.push(SceneEvent::AbandonChild { parent, child });
        self.outbox.push(SceneEvent::Abandon { child, parent });

        if self.node(child).connected {
            self.disconnect_subtree(child);
        }
        Ok(())
    }

    /// Detach a node from its parent (full handshake) and free its subtree's
    /// slots.
    ///
    /// Freed handles read as stale afterwards. The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Result<(), AdoptError> {
        if !self.is_alive(id) {
            return Err(AdoptError::Stale);
        }
        if id == self.root {
            return Err(AdoptError::RootAdoption);
        }
        if let Some(parent) = self.node(id).parent {
            self.remove_child(parent, id)?;
        }
        self.free_subtree(id);
        Ok(())
    }

    /// Connect top-down: each node before its descendants.
    fn connect_subtree(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.connected = true;
        let spatial = node.caps.contains(NodeCaps::SPATIAL);
        self.outbox.push(SceneEvent::Connected(id));
        if spatial {
            self.connect_order.push(id);
        }
        let children = self.node(id).children.clone();
        for child in children {
            self.connect_subtree(child);
        }
    }

    /// Disconnect bottom-up: descendants before the node.
    fn disconnect_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.disconnect_subtree(child);
        }
        self.node_mut(id).connected = false;
        self.connect_order.retain(|n| *n != id);
        self.outbox.push(SceneEvent::Disconnected(id));
    }

    fn free_subtree(&mut self, id: NodeId) {
        let children = self.node(id).children.clone();
        for child in children {
            self.free_subtree(child);
        }
        let idx = id.idx();
        self.nodes[idx] = None;
        self.generations[idx] = self.generations[idx].wrapping_add(1);
        self.free_list.push(idx);
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
