// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bubbling dispatch over a traversal snapshot.
//!
//! [`Scene::dispatch`] walks an event from an origin node down through its
//! subtree in depth-first pre-order. The traversal is snapshotted before any
//! handler runs, so structural mutations made by handlers never affect the
//! dispatch in flight; they apply to the next one. Nodes freed mid-dispatch
//! are skipped.
//!
//! Cancellation is a return value, not an exception: handlers answer with an
//! [`Outcome`], and `dispatch` reports where propagation stopped as a
//! [`Delivery`]. A [`Outcome::Cancel`] only stops propagation when the event
//! declares itself cancelable; confirmation-style events ignore it.

use alloc::vec::Vec;

use crate::scene::Scene;
use crate::types::{Delivery, NodeId, Outcome};

/// Payload contract for [`Scene::dispatch`].
pub trait Event {
    /// Whether a [`Outcome::Cancel`] stops propagation. Defaults to `false`.
    fn cancelable(&self) -> bool {
        false
    }

    /// Whether dispatch continues into the origin's descendants. Defaults to
    /// `true`; non-bubbling events visit only the origin.
    fn bubbles(&self) -> bool {
        true
    }
}

impl Scene {
    /// Dispatch `event` from `origin` through its subtree.
    ///
    /// The handler runs once per visited node, in depth-first pre-order,
    /// with mutable access to both the scene and the event payload. A stale
    /// `origin` delivers to nothing.
    pub fn dispatch<E: Event>(
        &mut self,
        origin: NodeId,
        event: &mut E,
        mut handler: impl FnMut(&mut Self, NodeId, &mut E) -> Outcome,
    ) -> Delivery {
        let mut order = Vec::new();
        if event.bubbles() {
            self.collect_preorder(origin, &mut order);
        } else if self.is_alive(origin) {
            order.push(origin);
        }
        let cancelable = event.cancelable();
        for id in order {
            // The snapshot may outlive a node freed by an earlier handler.
            if !self.is_alive(id) {
                continue;
            }
            match handler(self, id, event) {
                Outcome::Continue => {}
                Outcome::Cancel if cancelable => return Delivery::Canceled(id),
                Outcome::Cancel => {}
            }
        }
        Delivery::Delivered
    }

    fn collect_preorder(&self, id: NodeId, out: &mut Vec<NodeId>) {
        if !self.is_alive(id) {
            return;
        }
        out.push(id);
        for child in self.children_of(id) {
            self.collect_preorder(*child, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::NodeCaps;
    use alloc::vec;

    struct Bubbling {
        cancelable: bool,
    }

    impl Event for Bubbling {
        fn cancelable(&self) -> bool {
            self.cancelable
        }
    }

    struct Local;

    impl Event for Local {
        fn bubbles(&self) -> bool {
            false
        }
    }

    /// root → a → (b, c), with c → d.
    fn build(scene: &mut Scene) -> (NodeId, NodeId, NodeId, NodeId) {
        let a = scene.spawn("a", NodeCaps::empty());
        let b = scene.spawn("b", NodeCaps::empty());
        let c = scene.spawn("c", NodeCaps::empty());
        let d = scene.spawn("d", NodeCaps::empty());
        let root = scene.root();
        scene.add_child(root, a).unwrap();
        scene.add_child(a, b).unwrap();
        scene.add_child(a, c).unwrap();
        scene.add_child(c, d).unwrap();
        (a, b, c, d)
    }

    #[test]
    fn visits_subtree_in_preorder() {
        let mut scene = Scene::new();
        let (a, b, c, d) = build(&mut scene);

        let mut seen = Vec::new();
        let delivery = scene.dispatch(a, &mut Bubbling { cancelable: false }, |_, id, _| {
            seen.push(id);
            Outcome::Continue
        });
        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(seen, vec![a, b, c, d]);
    }

    #[test]
    fn cancel_stops_and_reports_the_node() {
        let mut scene = Scene::new();
        let (a, b, _c, _d) = build(&mut scene);

        let mut seen = Vec::new();
        let delivery = scene.dispatch(a, &mut Bubbling { cancelable: true }, |_, id, _| {
            seen.push(id);
            if id == b { Outcome::Cancel } else { Outcome::Continue }
        });
        assert_eq!(delivery, Delivery::Canceled(b));
        assert_eq!(seen, vec![a, b]);
    }

    #[test]
    fn cancel_is_ignored_on_non_cancelable_events() {
        let mut scene = Scene::new();
        let (a, _b, _c, _d) = build(&mut scene);

        let mut count = 0;
        let delivery = scene.dispatch(a, &mut Bubbling { cancelable: false }, |_, _, _| {
            count += 1;
            Outcome::Cancel
        });
        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(count, 4);
    }

    #[test]
    fn non_bubbling_events_visit_only_the_origin() {
        let mut scene = Scene::new();
        let (a, _b, _c, _d) = build(&mut scene);

        let mut seen = Vec::new();
        scene.dispatch(a, &mut Local, |_, id, _| {
            seen.push(id);
            Outcome::Continue
        });
        assert_eq!(seen, vec![a]);
    }

    #[test]
    fn mutations_apply_to_the_next_dispatch_only() {
        let mut scene = Scene::new();
        let (a, b, c, d) = build(&mut scene);

        let mut seen = Vec::new();
        scene.dispatch(a, &mut Bubbling { cancelable: false }, |scene, id, _| {
            seen.push(id);
            if id == a {
                // Grafting a node mid-flight must not extend this traversal.
                let late = scene.spawn("late", NodeCaps::empty());
                scene.add_child(a, late).unwrap();
            }
            Outcome::Continue
        });
        assert_eq!(seen, vec![a, b, c, d]);

        let mut second = Vec::new();
        scene.dispatch(a, &mut Bubbling { cancelable: false }, |_, id, _| {
            second.push(id);
            Outcome::Continue
        });
        assert_eq!(second.len(), 5, "the grafted node joins the next dispatch");
    }

    #[test]
    fn nodes_freed_mid_dispatch_are_skipped() {
        let mut scene = Scene::new();
        let (a, b, c, d) = build(&mut scene);

        let mut seen = Vec::new();
        scene.dispatch(a, &mut Bubbling { cancelable: false }, |scene, id, _| {
            seen.push(id);
            if id == b {
                scene.remove(c).unwrap();
            }
            Outcome::Continue
        });
        assert_eq!(seen, vec![a, b]);
        assert!(!scene.is_alive(d));
    }

    #[test]
    fn stale_origin_delivers_to_nothing() {
        let mut scene = Scene::new();
        let a = scene.spawn("a", NodeCaps::empty());
        scene.remove(a).unwrap();

        let mut count = 0;
        let delivery = scene.dispatch(a, &mut Bubbling { cancelable: true }, |_, _, _| {
            count += 1;
            Outcome::Continue
        });
        assert_eq!(delivery, Delivery::Delivered);
        assert_eq!(count, 0);
    }
}
