// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Exact contact points between two overlapping bodies.
//!
//! The broad sweep only reports that two boxes overlap. When a caller needs
//! the actual contact region (to tear geometry, spawn particles, anchor a
//! joint), this module scans the integer lattice of the boxes' overlap and
//! keeps the points both bodies' meshes claim. It is intended as an
//! on-demand fallback, not something to run for every pair every tick.

use alloc::vec::Vec;

use canopy_scene::{NodeId, Scene};
use kurbo::Point;

#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::body::PhysicsError;
use crate::sweep::{World, box_bounds};

impl World {
    /// World-space integer lattice points inside both bodies' meshes.
    ///
    /// The scan covers the inclusive intersection of the two boxes, so two
    /// boxes touching along an edge can still report the shared lattice
    /// points their meshes admit. Nodes without a body or without usable
    /// geometry report [`PhysicsError::NotABody`]. Disjoint boxes report an
    /// empty set.
    pub fn contact_points(
        &self,
        scene: &Scene,
        a: NodeId,
        b: NodeId,
    ) -> Result<Vec<Point>, PhysicsError> {
        let body_a = self.body(a).ok_or(PhysicsError::NotABody)?;
        let body_b = self.body(b).ok_or(PhysicsError::NotABody)?;
        let (min_a, max_a) = box_bounds(scene, a).ok_or(PhysicsError::NotABody)?;
        let (min_b, max_b) = box_bounds(scene, b).ok_or(PhysicsError::NotABody)?;
        let center_a = scene.global_position(a).map_err(|_| PhysicsError::NotABody)?;
        let center_b = scene.global_position(b).map_err(|_| PhysicsError::NotABody)?;
        let size_a = scene.size(a).map_err(|_| PhysicsError::NotABody)?;
        let size_b = scene.size(b).map_err(|_| PhysicsError::NotABody)?;

        let lo = Point::new(min_a.x.max(min_b.x).ceil(), min_a.y.max(min_b.y).ceil());
        let hi = Point::new(max_a.x.min(max_b.x).floor(), max_a.y.min(max_b.y).floor());

        let mut points = Vec::new();
        let mut y = lo.y;
        while y <= hi.y {
            let mut x = lo.x;
            while x <= hi.x {
                let p = Point::new(x, y);
                if body_a.mesh.contains_local(p - center_a, size_a)
                    && body_b.mesh.contains_local(p - center_b, size_b)
                {
                    points.push(p);
                }
                x += 1.0;
            }
            y += 1.0;
        }
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::body::{Body, Mesh};
    use canopy_scene::NodeCaps;
    use kurbo::Size;

    fn body_at(
        scene: &mut Scene,
        world: &mut World,
        name: &str,
        at: Point,
        size: Size,
        mesh: Mesh,
    ) -> NodeId {
        let node = scene.spawn(name, NodeCaps::PHYSICS);
        scene.set_size(node, size).unwrap();
        scene.set_position(node, at).unwrap();
        world.attach(node, Body::with_mesh(mesh));
        let root = scene.root();
        scene.add_child(root, node).unwrap();
        node
    }

    #[test]
    fn overlapping_rects_report_the_shared_lattice() {
        let mut scene = Scene::new();
        let mut world = World::new();
        let size = Size::new(4.0, 4.0);
        let a = body_at(&mut scene, &mut world, "a", Point::ORIGIN, size, Mesh::Rect);
        let b = body_at(&mut scene, &mut world, "b", Point::new(2.0, 0.0), size, Mesh::Rect);

        let points = world.contact_points(&scene, a, b).unwrap();
        // Half-open boxes [-2,2) and [0,4): shared lattice x ∈ {0,1},
        // y ∈ {-2..1}.
        assert_eq!(points.len(), 8);
        assert!(points.contains(&Point::ORIGIN));
        assert!(points.contains(&Point::new(1.0, -2.0)));
        assert!(!points.contains(&Point::new(2.0, 0.0)));
    }

    #[test]
    fn disc_meshes_trim_the_corners() {
        let mut scene = Scene::new();
        let mut world = World::new();
        let size = Size::new(4.0, 4.0);
        let a = body_at(&mut scene, &mut world, "a", Point::ORIGIN, size, Mesh::Disc);
        let b = body_at(&mut scene, &mut world, "b", Point::new(3.0, 0.0), size, Mesh::Disc);

        let mut points = world.contact_points(&scene, a, b).unwrap();
        points.sort_by(|p, q| p.x.total_cmp(&q.x));
        assert_eq!(points, [Point::new(1.0, 0.0), Point::new(2.0, 0.0)]);
    }

    #[test]
    fn disjoint_boxes_report_nothing() {
        let mut scene = Scene::new();
        let mut world = World::new();
        let size = Size::new(4.0, 4.0);
        let a = body_at(&mut scene, &mut world, "a", Point::ORIGIN, size, Mesh::Rect);
        let b = body_at(&mut scene, &mut world, "b", Point::new(50.0, 0.0), size, Mesh::Rect);
        assert!(world.contact_points(&scene, a, b).unwrap().is_empty());
    }

    #[test]
    fn bodiless_nodes_are_rejected() {
        let mut scene = Scene::new();
        let world = World::new();
        let a = scene.spawn("a", NodeCaps::SPATIAL);
        let b = scene.spawn("b", NodeCaps::SPATIAL);
        assert_eq!(
            world.contact_points(&scene, a, b),
            Err(PhysicsError::NotABody)
        );
    }
}
