// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Two bodies crossing paths, printing the collision stream.
//!
//! A static block sits at the origin while a runner sweeps through it from
//! the right; each tick prints the transitions the sweep reports, which
//! should read Begin, Collide while overlapping, then End.
//!
//! Run:
//! - `cargo run -p canopy_demos --example collision_playground`

use canopy_engine::{Driver, Viewport};
use canopy_physics::{Body, World};
use canopy_scene::{NodeCaps, NodeId, Outcome, Scene};
use kurbo::{Point, Size, Vec2};

fn spawn_body(scene: &mut Scene, world: &mut World, name: &str, at: Point) -> NodeId {
    let node = scene.spawn(name, NodeCaps::PHYSICS);
    scene.set_size(node, Size::new(10.0, 10.0)).unwrap();
    scene.set_position(node, at).unwrap();
    world.attach(node, Body::new());
    let root = scene.root();
    scene.add_child(root, node).unwrap();
    node
}

fn main() {
    let mut scene = Scene::new();
    let mut world = World::new();
    let mut driver = Driver::new(Viewport::new(Point::ORIGIN, Size::new(200.0, 200.0)))
        .expect("no other driver is running");

    let block = spawn_body(&mut scene, &mut world, "block", Point::ORIGIN);
    let runner = spawn_body(&mut scene, &mut world, "runner", Point::new(24.0, 0.0));
    world.body_mut(runner).unwrap().velocity = Vec2::new(-8.0, 0.0);

    for _ in 0..6 {
        let frame = driver.tick(&mut scene, &mut world, 1.0, |_, _, _| Outcome::Continue);

        let tick = driver.now() - 1;
        let at = scene.position(runner).unwrap();
        if frame.collisions.is_empty() {
            println!("tick {tick}: runner at {at:?}, no contact");
        }
        for event in &frame.collisions {
            let name = scene.name(event.node).unwrap_or("?");
            let other = scene.name(event.other).unwrap_or("?");
            println!("tick {tick}: {name} {:?} {other} (runner at {at:?})", event.kind);
        }
    }

    let contacts = world.contact_points(&scene, block, runner).unwrap();
    println!("final shared lattice points: {}", contacts.len());
}
