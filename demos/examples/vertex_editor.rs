// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A tiny vertex editor driven entirely through the frame driver.
//!
//! Interaction rules, fed from a scripted pointer stream:
//! - pressing empty space places a round vertex under the pointer (and the
//!   press immediately targets it, so you can place-and-drag in one motion),
//! - dragging a vertex moves it,
//! - clicking a vertex deletes it.
//!
//! Run:
//! - `cargo run -p canopy_demos --example vertex_editor`

use canopy_engine::{Action, Driver, FrameEvent, PointerEvent, RawSample, Source, Viewport};
use canopy_gesture::GestureKind;
use canopy_physics::World;
use canopy_scene::{NodeCaps, NodeId, Outcome, Scene};
use kurbo::{Point, Size};

const VERTEX_EXTENT: f64 = 8.0;

/// Topmost connected spatial node under a world-space point.
fn pick(scene: &Scene, position: Point) -> Option<NodeId> {
    scene
        .connect_order()
        .iter()
        .rev()
        .copied()
        .find(|node| scene.contains_point(*node, position).unwrap_or(false))
}

fn place_vertex(scene: &mut Scene, at: Point) -> NodeId {
    let vertex = scene.spawn("vertex", NodeCaps::SPATIAL);
    scene.set_extent(vertex, VERTEX_EXTENT).unwrap();
    scene.set_position(vertex, at).unwrap();
    let root = scene.root();
    scene.add_child(root, vertex).unwrap();
    vertex
}

fn main() {
    let viewport = Viewport::new(Point::ORIGIN, Size::new(200.0, 200.0));
    let mut scene = Scene::new();
    let mut world = World::new();
    let mut driver = Driver::new(viewport).expect("no other driver is running");

    // The scripted session: place a vertex with a press on empty space, drag
    // it elsewhere, release, then click it to delete it. Client coordinates;
    // world (0, 0) is client (100, 100).
    let script: &[&[RawSample]] = &[
        &[sample(Action::Down, 110.0, 90.0)], // press empty space at world (10, 10)
        &[sample(Action::Move, 130.0, 80.0)], // drag to world (30, 20)
        &[sample(Action::Up, 130.0, 80.0)],
        &[sample(Action::Down, 130.0, 80.0)], // click the vertex
        &[sample(Action::Up, 130.0, 80.0)],
        &[],
    ];

    for samples in script {
        for sample in *samples {
            driver.push_raw(*sample);
        }

        let frame = driver.tick(&mut scene, &mut world, 1.0, |scene, _, event| {
            // Pressing empty space places a vertex before gesture targeting
            // runs, so the new vertex catches the press.
            if let FrameEvent::Pointer(PointerEvent { action: Action::Down, position }) = event
                && pick(scene, *position).is_none()
            {
                let vertex = place_vertex(scene, *position);
                println!("placed vertex {vertex:?} at {position:?}");
            }
            Outcome::Continue
        });

        for gesture in &frame.gestures {
            match gesture.kind {
                GestureKind::Drag => {
                    scene.set_global_position(gesture.target, gesture.position).unwrap();
                    println!("dragged {:?} to {:?}", gesture.target, gesture.position);
                }
                GestureKind::Click => {
                    println!("deleted {:?}", gesture.target);
                    scene.remove(gesture.target).unwrap();
                }
                GestureKind::DragBegin | GestureKind::DragEnd | GestureKind::Hold => {
                    println!("{:?} on {:?}", gesture.kind, gesture.target);
                }
            }
        }
    }

    println!(
        "session over: {} vertices remain",
        scene.connect_order().len()
    );
}

fn sample(action: Action, x: f64, y: f64) -> RawSample {
    RawSample {
        source: Source::Mouse,
        action,
        client: Point::new(x, y),
        button: 0,
    }
}
