// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Public types for the scene: node identifiers, capabilities, outbox
//! records, dispatch control, and error enums.

use core::fmt;

/// Identifier for a node in the scene (generational).
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct NodeId(pub(crate) u32, pub(crate) u32);

impl NodeId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

bitflags::bitflags! {
    /// Capabilities attached to a node at spawn time.
    ///
    /// Capabilities compose rather than inherit: a node may be purely
    /// structural (empty flags), carry geometry ([`SPATIAL`](Self::SPATIAL)),
    /// or layer physics or interface behavior on top of geometry.
    /// [`PHYSICS`](Self::PHYSICS) and [`UI`](Self::UI) require geometry, so
    /// [`Scene::spawn`](crate::Scene::spawn) upgrades them to include
    /// `SPATIAL`.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct NodeCaps: u8 {
        /// Node has a spatial component (position, size, hit testing).
        const SPATIAL = 0b0000_0001;
        /// Node participates in the physics sweep.
        const PHYSICS = 0b0000_0010;
        /// Node is an anchor-positioned interface item.
        const UI      = 0b0000_0100;
    }
}

impl Default for NodeCaps {
    fn default() -> Self {
        Self::empty()
    }
}

/// Confirmation and connectivity records drained from the scene outbox.
///
/// These are the non-cancelable half of the membership handshake: by the time
/// a record lands in the outbox the mutation has already happened. Callers
/// drain them once per tick via [`Scene::drain_events`](crate::Scene::drain_events)
/// and fan them out to whatever mirrors the tree (physics registries, hit
/// registries, and so on).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneEvent {
    /// `parent` committed to adopting `child`.
    AdoptChild {
        /// The adopting node.
        parent: NodeId,
        /// The adopted node.
        child: NodeId,
    },
    /// `child` committed to its new `parent`.
    Adopt {
        /// The adopted node.
        child: NodeId,
        /// The adopting node.
        parent: NodeId,
    },
    /// `parent` released `child` from its child set.
    AbandonChild {
        /// The releasing node.
        parent: NodeId,
        /// The released node.
        child: NodeId,
    },
    /// `child` left its former `parent`.
    Abandon {
        /// The released node.
        child: NodeId,
        /// The former parent.
        parent: NodeId,
    },
    /// The node became reachable from the root.
    Connected(NodeId),
    /// The node stopped being reachable from the root.
    Disconnected(NodeId),
}

/// Handler verdict for a single dispatch step.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// Keep propagating.
    Continue,
    /// Cancel the event. Stops propagation if the event is cancelable,
    /// otherwise ignored.
    Cancel,
}

/// Where a dispatch ended up.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Every node in the traversal saw the event.
    Delivered,
    /// A handler canceled the event at the given node.
    Canceled(NodeId),
}

impl Delivery {
    /// `true` if propagation ran to completion.
    pub const fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered)
    }
}

/// Directional classification of another entity relative to a box.
///
/// The plane around a box divides into four sectors along its corner
/// diagonals; see [`Scene::sector_of`](crate::Scene::sector_of).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Sector {
    /// Above the box (between the two upper diagonals).
    Top,
    /// To the right of the box.
    Right,
    /// Below the box.
    Bottom,
    /// To the left of the box.
    Left,
}

/// Why a membership operation was refused.
///
/// Refusal at any phase leaves the tree untouched.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AdoptError {
    /// A handle names a freed or recycled slot.
    Stale,
    /// The child already has a parent.
    AlreadyParented,
    /// The child is already in this parent's child set.
    DuplicateChild,
    /// Adoption would make a node its own ancestor.
    WouldCycle,
    /// The designated root cannot be adopted or removed.
    RootAdoption,
    /// A spatial parent only adopts spatial children.
    CapabilityMismatch,
    /// The parent-side veto point refused.
    VetoedByParent,
    /// The child-side veto point refused.
    VetoedByChild,
    /// The node is not a child of the named parent.
    NotAChild,
}

impl fmt::Display for AdoptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stale => "stale node handle",
            Self::AlreadyParented => "child already has a parent",
            Self::DuplicateChild => "child already present in the child set",
            Self::WouldCycle => "adoption would create a cycle",
            Self::RootAdoption => "the root cannot be adopted or removed",
            Self::CapabilityMismatch => "a spatial parent only adopts spatial children",
            Self::VetoedByParent => "parent vetoed the handshake",
            Self::VetoedByChild => "child vetoed the handshake",
            Self::NotAChild => "node is not a child of the named parent",
        })
    }
}

impl core::error::Error for AdoptError {}

/// Why a scene accessor failed.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SceneError {
    /// A handle names a freed or recycled slot.
    Stale,
    /// The node has no parent.
    NoParent,
    /// The node has no spatial component.
    NotSpatial,
    /// The node is not an interface item (no anchor).
    NotInterface,
    /// Anchor components must lie in `[-1, 1]`.
    AnchorOutOfRange,
    /// Size components must be non-negative.
    NegativeSize,
}

impl fmt::Display for SceneError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stale => "stale node handle",
            Self::NoParent => "node has no parent",
            Self::NotSpatial => "node has no spatial component",
            Self::NotInterface => "node is not an interface item",
            Self::AnchorOutOfRange => "anchor components must lie in [-1, 1]",
            Self::NegativeSize => "size components must be non-negative",
        })
    }
}

impl core::error::Error for SceneError {}
