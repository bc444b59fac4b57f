// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Spatial component: local geometry, global position, hit testing, and
//! sector classification.
//!
//! A spatial node owns a local `position` (the center of its box, relative to
//! its nearest spatial ancestor), a non-negative `size`, and, for interface
//! items, an `anchor`. Global position accumulates local positions up the
//! ancestor chain; ancestors without a spatial component are skipped, not
//! chain-breaking.

use core::f64::consts::{PI, TAU};

use kurbo::{Point, Size, Vec2};

use crate::scene::Scene;
use crate::types::{NodeCaps, NodeId, SceneError, Sector};

/// Local geometry for a spatial node. Anchor is stored halved.
#[derive(Clone, Debug)]
pub(crate) struct Spatial {
    pub(crate) position: Point,
    pub(crate) size: Size,
    pub(crate) anchor: Vec2,
}

impl Default for Spatial {
    fn default() -> Self {
        Self {
            position: Point::ORIGIN,
            size: Size::ZERO,
            anchor: Vec2::ZERO,
        }
    }
}

impl Scene {
    fn spatial(&self, id: NodeId) -> Result<&Spatial, SceneError> {
        let node = self.get(id).ok_or(SceneError::Stale)?;
        node.spatial.as_ref().ok_or(SceneError::NotSpatial)
    }

    fn spatial_mut(&mut self, id: NodeId) -> Result<&mut Spatial, SceneError> {
        let node = self.get_mut(id).ok_or(SceneError::Stale)?;
        node.spatial.as_mut().ok_or(SceneError::NotSpatial)
    }

    /// Local position: the center of the node's box, relative to its nearest
    /// spatial ancestor.
    pub fn position(&self, id: NodeId) -> Result<Point, SceneError> {
        Ok(self.spatial(id)?.position)
    }

    /// Set the local position.
    pub fn set_position(&mut self, id: NodeId, position: Point) -> Result<(), SceneError> {
        self.spatial_mut(id)?.position = position;
        Ok(())
    }

    /// The node's box size.
    pub fn size(&self, id: NodeId) -> Result<Size, SceneError> {
        Ok(self.spatial(id)?.size)
    }

    /// Set the box size. Negative components are rejected and leave the old
    /// size in place.
    pub fn set_size(&mut self, id: NodeId, size: Size) -> Result<(), SceneError> {
        let spatial = self.spatial_mut(id)?;
        if size.width < 0.0 || size.height < 0.0 {
            return Err(SceneError::NegativeSize);
        }
        spatial.size = size;
        Ok(())
    }

    /// The larger of the box's width and height.
    pub fn extent(&self, id: NodeId) -> Result<f64, SceneError> {
        let size = self.spatial(id)?.size;
        Ok(size.width.max(size.height))
    }

    /// Set a square size of the given extent.
    pub fn set_extent(&mut self, id: NodeId, extent: f64) -> Result<(), SceneError> {
        self.set_size(id, Size::new(extent, extent))
    }

    /// The interface anchor, in the public `[-1, 1]` range per axis.
    pub fn anchor(&self, id: NodeId) -> Result<Vec2, SceneError> {
        let node = self.get(id).ok_or(SceneError::Stale)?;
        if !node.caps.contains(NodeCaps::UI) {
            return Err(SceneError::NotInterface);
        }
        let spatial = node.spatial.as_ref().ok_or(SceneError::NotSpatial)?;
        Ok(spatial.anchor * 2.0)
    }

    /// Set the interface anchor. Components outside `[-1, 1]` are rejected.
    ///
    /// `(-1, -1)` pins the node to its spatial ancestor's bottom-left corner,
    /// `(1, 1)` to the top-right, `(0, 0)` to the center.
    pub fn set_anchor(&mut self, id: NodeId, anchor: Vec2) -> Result<(), SceneError> {
        let node = self.get(id).ok_or(SceneError::Stale)?;
        if !node.caps.contains(NodeCaps::UI) {
            return Err(SceneError::NotInterface);
        }
        if !(-1.0..=1.0).contains(&anchor.x) || !(-1.0..=1.0).contains(&anchor.y) {
            return Err(SceneError::AnchorOutOfRange);
        }
        let spatial = self
            .get_mut(id)
            .and_then(|n| n.spatial.as_mut())
            .ok_or(SceneError::NotSpatial)?;
        spatial.anchor = anchor / 2.0;
        Ok(())
    }

    fn nearest_spatial_ancestor(&self, id: NodeId) -> Option<NodeId> {
        let mut at = self.parent_of(id)?;
        loop {
            if self.spatial(at).is_ok() {
                return Some(at);
            }
            at = self.parent_of(at)?;
        }
    }

    /// The node's position in world space.
    ///
    /// Sums local positions along the spatial ancestor chain. Interface items
    /// additionally shift by `(ancestor.size − size) · anchor / 2`, placing
    /// the anchored edge flush with the ancestor's.
    pub fn global_position(&self, id: NodeId) -> Result<Point, SceneError> {
        let node = self.get(id).ok_or(SceneError::Stale)?;
        let spatial = node.spatial.as_ref().ok_or(SceneError::NotSpatial)?;
        let mut out = spatial.position.to_vec2();
        if let Some(ancestor) = self.nearest_spatial_ancestor(id) {
            out += self.global_position(ancestor)?.to_vec2();
            if node.caps.contains(NodeCaps::UI) {
                let around = self.spatial(ancestor)?.size;
                out.x += (around.width - spatial.size.width) * spatial.anchor.x;
                out.y += (around.height - spatial.size.height) * spatial.anchor.y;
            }
        }
        Ok(out.to_point())
    }

    /// Move the node so that its world-space position becomes `target`.
    ///
    /// Exact inverse of [`Scene::global_position`] while the ancestor chain
    /// stays fixed.
    pub fn set_global_position(&mut self, id: NodeId, target: Point) -> Result<(), SceneError> {
        let current = self.global_position(id)?;
        let spatial = self.spatial_mut(id)?;
        spatial.position += target - current;
        Ok(())
    }

    /// Whether a world-space point falls inside the node's box.
    ///
    /// The box is centered on the global position and half-open: the minimum
    /// edges are inside, the maximum edges are not, so adjacent boxes never
    /// both claim a shared edge.
    pub fn contains_point(&self, id: NodeId, point: Point) -> Result<bool, SceneError> {
        let center = self.global_position(id)?;
        let half = self.spatial(id)?.size / 2.0;
        Ok(point.x >= center.x - half.width
            && point.x < center.x + half.width
            && point.y >= center.y - half.height
            && point.y < center.y + half.height)
    }

    /// Classify which side of `id`'s box the center of `other` lies on.
    ///
    /// The plane splits into four sectors along the box's corner diagonals:
    /// a wide box has wide top/bottom sectors, a tall box wide left/right
    /// ones. Works in the y-up world space produced by pointer
    /// normalization, so [`Sector::Top`] means greater `y`.
    pub fn sector_of(&self, id: NodeId, other: NodeId) -> Result<Sector, SceneError> {
        let origin = self.global_position(id)?;
        let size = self.spatial(id)?.size;
        let target = self.global_position(other)?;

        // Angle of the corner diagonal from the +y axis, then the angle of
        // `other`, measured the same way and shifted so the top sector starts
        // at zero.
        let alpha = Vec2::new(size.height / 2.0, size.width / 2.0).atan2();
        let d = target - origin;
        let mut angle = Vec2::new(d.y, d.x).atan2() + alpha;
        if angle < 0.0 {
            angle += TAU;
        }

        let spans = [
            (2.0 * alpha, Sector::Top),
            (PI - 2.0 * alpha, Sector::Right),
            (2.0 * alpha, Sector::Bottom),
            (PI - 2.0 * alpha, Sector::Left),
        ];
        let mut end = 0.0;
        for (span, sector) in spans {
            end += span;
            if angle < end {
                return Ok(sector);
            }
        }
        Ok(Sector::Left)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scene_with_entity(size: Size) -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let e = scene.spawn("e", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, e).unwrap();
        scene.set_size(e, size).unwrap();
        (scene, e)
    }

    #[test]
    fn spatial_accessors_reject_bare_nodes() {
        let mut scene = Scene::new();
        let plain = scene.spawn("plain", NodeCaps::empty());
        assert_eq!(scene.position(plain), Err(SceneError::NotSpatial));
        assert_eq!(
            scene.set_position(plain, Point::new(1.0, 1.0)),
            Err(SceneError::NotSpatial)
        );
    }

    #[test]
    fn negative_size_is_rejected_and_keeps_the_old_size() {
        let (mut scene, e) = scene_with_entity(Size::new(4.0, 4.0));
        assert_eq!(
            scene.set_size(e, Size::new(-1.0, 2.0)),
            Err(SceneError::NegativeSize)
        );
        assert_eq!(scene.size(e).unwrap(), Size::new(4.0, 4.0));
    }

    #[test]
    fn extent_is_the_larger_side() {
        let (mut scene, e) = scene_with_entity(Size::new(4.0, 9.0));
        assert_eq!(scene.extent(e).unwrap(), 9.0);
        scene.set_extent(e, 6.0).unwrap();
        assert_eq!(scene.size(e).unwrap(), Size::new(6.0, 6.0));
    }

    #[test]
    fn global_position_sums_the_ancestor_chain() {
        let mut scene = Scene::new();
        let outer = scene.spawn("outer", NodeCaps::SPATIAL);
        let inner = scene.spawn("inner", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, outer).unwrap();
        scene.add_child(outer, inner).unwrap();
        scene.set_position(outer, Point::new(10.0, 10.0)).unwrap();
        scene.set_position(inner, Point::new(5.0, -5.0)).unwrap();

        assert_eq!(scene.global_position(inner).unwrap(), Point::new(15.0, 5.0));
    }

    #[test]
    fn non_spatial_ancestors_are_skipped() {
        let mut scene = Scene::new();
        let group = scene.spawn("group", NodeCaps::empty());
        let e = scene.spawn("e", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, group).unwrap();
        scene.add_child(group, e).unwrap();
        scene.set_position(e, Point::new(3.0, 4.0)).unwrap();

        assert_eq!(scene.global_position(e).unwrap(), Point::new(3.0, 4.0));
    }

    #[test]
    fn set_global_position_round_trips() {
        let mut scene = Scene::new();
        let outer = scene.spawn("outer", NodeCaps::SPATIAL);
        let inner = scene.spawn("inner", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, outer).unwrap();
        scene.add_child(outer, inner).unwrap();
        scene.set_position(outer, Point::new(10.0, 10.0)).unwrap();
        scene.set_position(inner, Point::new(5.0, 5.0)).unwrap();

        scene.set_global_position(inner, Point::new(20.0, 20.0)).unwrap();
        assert_eq!(scene.position(inner).unwrap(), Point::new(10.0, 10.0));
        assert_eq!(scene.global_position(inner).unwrap(), Point::new(20.0, 20.0));
    }

    #[test]
    fn anchored_interface_item_hugs_the_ancestor_corner() {
        let mut scene = Scene::new();
        let panel = scene.spawn("panel", NodeCaps::SPATIAL);
        let badge = scene.spawn("badge", NodeCaps::UI);
        let root = scene.root();
        scene.add_child(root, panel).unwrap();
        scene.add_child(panel, badge).unwrap();
        scene.set_size(panel, Size::new(100.0, 50.0)).unwrap();
        scene.set_size(badge, Size::new(10.0, 10.0)).unwrap();

        scene.set_anchor(badge, Vec2::new(1.0, 1.0)).unwrap();
        // (100 - 10) / 2 = 45, (50 - 10) / 2 = 20: flush with the top-right.
        assert_eq!(scene.global_position(badge).unwrap(), Point::new(45.0, 20.0));

        scene.set_anchor(badge, Vec2::new(0.0, 0.0)).unwrap();
        assert_eq!(scene.global_position(badge).unwrap(), Point::ORIGIN);
    }

    #[test]
    fn anchor_reads_back_in_the_public_range() {
        let mut scene = Scene::new();
        let panel = scene.spawn("panel", NodeCaps::SPATIAL);
        let badge = scene.spawn("badge", NodeCaps::UI);
        scene.add_child(panel, badge).unwrap();
        scene.set_anchor(badge, Vec2::new(-1.0, 0.5)).unwrap();
        assert_eq!(scene.anchor(badge).unwrap(), Vec2::new(-1.0, 0.5));
    }

    #[test]
    fn anchor_is_validated() {
        let mut scene = Scene::new();
        let badge = scene.spawn("badge", NodeCaps::UI);
        let e = scene.spawn("e", NodeCaps::SPATIAL);
        assert_eq!(
            scene.set_anchor(badge, Vec2::new(1.5, 0.0)),
            Err(SceneError::AnchorOutOfRange)
        );
        assert_eq!(
            scene.set_anchor(e, Vec2::ZERO),
            Err(SceneError::NotInterface)
        );
    }

    #[test]
    fn hit_test_is_half_open() {
        let (scene, e) = scene_with_entity(Size::new(10.0, 10.0));
        // Box spans [-5, 5) on both axes.
        assert!(scene.contains_point(e, Point::new(4.0, 4.0)).unwrap());
        assert!(!scene.contains_point(e, Point::new(5.0, 4.0)).unwrap());
        assert!(scene.contains_point(e, Point::new(-5.0, -5.0)).unwrap());
        assert!(!scene.contains_point(e, Point::new(-5.0, 5.0)).unwrap());
        assert!(scene.contains_point(e, Point::ORIGIN).unwrap());
    }

    #[test]
    fn zero_size_boxes_contain_nothing() {
        let (scene, e) = scene_with_entity(Size::ZERO);
        assert!(!scene.contains_point(e, Point::ORIGIN).unwrap());
    }

    #[test]
    fn sectors_of_a_square_box() {
        let (mut scene, e) = scene_with_entity(Size::new(2.0, 2.0));
        let other = scene.spawn("other", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, other).unwrap();

        let mut at = |x: f64, y: f64| {
            scene.set_position(other, Point::new(x, y)).unwrap();
            scene.sector_of(e, other).unwrap()
        };
        assert_eq!(at(0.0, 5.0), Sector::Top);
        assert_eq!(at(5.0, 0.0), Sector::Right);
        assert_eq!(at(0.0, -5.0), Sector::Bottom);
        assert_eq!(at(-5.0, 0.0), Sector::Left);
        // Exactly on the up-right diagonal: the sector boundary is half-open,
        // the next sector claims it.
        assert_eq!(at(5.0, 5.0), Sector::Right);
    }

    #[test]
    fn wide_boxes_widen_their_top_and_bottom_sectors() {
        let (mut scene, e) = scene_with_entity(Size::new(8.0, 2.0));
        let other = scene.spawn("other", NodeCaps::SPATIAL);
        let root = scene.root();
        scene.add_child(root, other).unwrap();

        // 45° up-right is still "top" for a box this wide.
        scene.set_position(other, Point::new(3.0, 3.0)).unwrap();
        assert_eq!(scene.sector_of(e, other).unwrap(), Sector::Top);
        scene.set_position(other, Point::new(3.0, -3.0)).unwrap();
        assert_eq!(scene.sector_of(e, other).unwrap(), Sector::Bottom);
    }
}
