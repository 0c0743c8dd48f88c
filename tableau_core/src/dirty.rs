// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dirty tracking at two granularities.
//!
//! # Per-node bits
//!
//! Every shape and 3D shape carries a [`DirtyBits`] set. A set bit means the
//! derived or peer-visible state it names is stale. Mutators call
//! [`mark_dirty`]; the synchronization pass reads the bits, pushes exactly the
//! stale state to the node's peer and then clears each bit once the push for
//! it has completed. Clearing is per bit, except at full resync points (a
//! freshly created peer) where everything is cleared together.
//!
//! # Scene-graph channels
//!
//! The [`SceneGraph`](crate::node::SceneGraph) additionally uses
//! multi-channel tracking (via [`understory_dirty`]) to know *which nodes* to
//! visit:
//!
//! - [`TRANSFORM`] propagates eagerly to descendants, since world transforms
//!   are inherited.
//! - [`CONTENT`] is local-only. It is marked whenever a node's shape may have
//!   been mutated, so the sync pass only visits those nodes.
//! - [`TOPOLOGY`] is marked on structural mutations and triggers a traversal
//!   rebuild.

use bitflags::bitflags;
use understory_dirty::Channel;

/// Local transform changed; world transforms of the subtree are stale.
pub const TRANSFORM: Channel = Channel::new(0);

/// Node content (shape attributes, geometry, mesh binding) may have changed.
pub const CONTENT: Channel = Channel::new(1);

/// Tree topology changed.
pub const TOPOLOGY: Channel = Channel::new(2);

bitflags! {
    /// Per-node invalidation flags.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct DirtyBits: u32 {
        /// Geometric outline or dimensions changed.
        const GEOMETRY = 1 << 0;
        /// Fill paint changed.
        const SHAPE_FILL = 1 << 1;
        /// Stroke paint changed.
        const SHAPE_STROKE = 1 << 2;
        /// Stroke width, type, cap, join, miter limit or dashing changed.
        const STROKE_ATTRS = 1 << 3;
        /// Paint mode (empty / fill / stroke / both) changed.
        const SHAPE_MODE = 1 << 4;
        /// Antialiasing hint changed.
        const NODE_SMOOTH = 1 << 5;
        /// The mesh bound to a 3D shape was replaced.
        const MESH = 1 << 6;
        /// The contents of the bound mesh changed.
        const MESH_GEOM = 1 << 7;
        /// Material changed.
        const MATERIAL = 1 << 8;
        /// Draw mode changed.
        const DRAW_MODE = 1 << 9;
        /// Cull face changed.
        const CULL_FACE = 1 << 10;
        /// Node content was replaced wholesale.
        const CONTENTS = 1 << 11;
    }
}

impl Default for DirtyBits {
    fn default() -> Self {
        Self::empty()
    }
}

/// Anything that owns a [`DirtyBits`] set.
pub trait DirtyNode {
    /// Returns the current dirty bits.
    fn dirty_bits(&self) -> DirtyBits;

    /// Returns the dirty bits for mutation.
    fn dirty_bits_mut(&mut self) -> &mut DirtyBits;
}

/// Marks `flag` dirty on `node`.
///
/// Returns `true` if the node was completely clean before the call, which is
/// the moment an owner needs to schedule the node for the next sync pass.
pub fn mark_dirty<N: DirtyNode + ?Sized>(node: &mut N, flag: DirtyBits) -> bool {
    let was_clean = node.dirty_bits().is_empty();
    node.dirty_bits_mut().insert(flag);
    was_clean
}

/// Returns whether any bit of `flag` is set on `node`.
pub fn is_dirty<N: DirtyNode + ?Sized>(node: &N, flag: DirtyBits) -> bool {
    node.dirty_bits().intersects(flag)
}

/// Clears `flag` on `node`, leaving other bits untouched.
pub fn clear_dirty<N: DirtyNode + ?Sized>(node: &mut N, flag: DirtyBits) {
    node.dirty_bits_mut().remove(flag);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Probe(DirtyBits);

    impl DirtyNode for Probe {
        fn dirty_bits(&self) -> DirtyBits {
            self.0
        }
        fn dirty_bits_mut(&mut self) -> &mut DirtyBits {
            &mut self.0
        }
    }

    #[test]
    fn first_mark_reports_clean_transition() {
        let mut p = Probe::default();
        assert!(mark_dirty(&mut p, DirtyBits::GEOMETRY), "was clean");
        assert!(!mark_dirty(&mut p, DirtyBits::SHAPE_FILL), "already dirty");
        assert!(is_dirty(&p, DirtyBits::GEOMETRY | DirtyBits::MATERIAL));
    }

    #[test]
    fn clearing_is_per_bit() {
        let mut p = Probe::default();
        mark_dirty(&mut p, DirtyBits::GEOMETRY | DirtyBits::SHAPE_MODE);
        clear_dirty(&mut p, DirtyBits::GEOMETRY);
        assert!(!is_dirty(&p, DirtyBits::GEOMETRY));
        assert!(is_dirty(&p, DirtyBits::SHAPE_MODE));
    }
}
