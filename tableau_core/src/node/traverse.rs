// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tree traversal utilities.

use core::slice;

use super::id::{INVALID, NodeId};
use super::store::SceneGraph;

/// An iterator over the direct children of a node, in paint order.
///
/// Created by [`SceneGraph::children`].
#[derive(Debug)]
pub struct Children<'a> {
    graph: &'a SceneGraph,
    slots: slice::Iter<'a, u32>,
}

impl<'a> Children<'a> {
    pub(crate) fn new(graph: &'a SceneGraph, slots: &'a [u32]) -> Self {
        Self {
            graph,
            slots: slots.iter(),
        }
    }
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.slots.next().map(|&idx| self.graph.id_at(idx))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.slots.size_hint()
    }
}

impl SceneGraph {
    /// Returns the current traversal order (depth-first pre-order).
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called at least
    /// once.
    #[must_use]
    pub fn traversal_order(&self) -> &[u32] {
        &self.traversal_order
    }

    /// Rebuilds the depth-first pre-order traversal of all live nodes.
    pub(crate) fn rebuild_traversal_order(&mut self) {
        let mut order = core::mem::take(&mut self.traversal_order);
        order.clear();
        let mut stack = Vec::new();
        for root in 0..self.len {
            if self.parent[root as usize] != INVALID || !self.alive[root as usize] {
                continue;
            }
            stack.push(root);
            while let Some(idx) = stack.pop() {
                order.push(idx);
                stack.extend(self.children[idx as usize].iter().rev());
            }
        }
        self.traversal_order = order;
    }
}
