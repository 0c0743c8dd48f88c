// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Render-side peer contract.
//!
//! Every visible scene node and every displayed mesh has a *peer*: the
//! render-side counterpart that a toolkit backend maintains. The core never
//! renders anything itself. It owns CPU-side state and, during
//! [`SceneGraph::sync`](crate::node::SceneGraph::sync), pushes exactly the
//! state whose dirty bits are set.
//!
//! The contract has three pieces:
//!
//! - **Factory** — [`PeerFactory`] is called once per node (and once per
//!   mesh while it is referenced) to obtain a peer.
//! - **Node peers** — [`ShapePeer`] and [`Shape3dPeer`] receive
//!   dirty-gated property pushes. A freshly created peer receives every
//!   property once.
//! - **Mesh peers** — [`MeshPeer`] receives flat array updates, either the
//!   whole array or just the merged pending range.
//!
//! # Sync pseudocode
//!
//! ```rust,ignore
//! fn on_pulse(graph: &mut SceneGraph, factory: &mut MyToolkit) {
//!     // Mutate: set properties, replace mesh arrays, move nodes between parents.
//!     graph.shape_mut(node).set_fill(Some(Color::WHITE.into()));
//!
//!     // Sync: evaluate transforms and push dirty state to peers.
//!     let report = graph.sync(factory);
//!     tracing::debug!(?report, "pulse complete");
//! }
//! ```

use kurbo::BezPath;

use crate::mesh::MeshId;
use crate::paint::{Material, Paint};
use crate::pick::CullFace;
use crate::shape::{FillRule, ShapeMode, StrokeStyle};
use crate::shape3d::DrawMode;
use crate::transform::Transform3d;

/// One update to a flat mesh array.
///
/// Indices are raw positions in the flat array, not element indices.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ArrayUpdate<'a, T> {
    /// The entire array.
    Full(&'a [T]),
    /// A contiguous sub-range starting at raw `index`.
    Range {
        /// First raw index covered by `data`.
        index: usize,
        /// The new contents of `index..index + data.len()`.
        data: &'a [T],
    },
}

impl<T> ArrayUpdate<'_, T> {
    /// Raw start index of the update.
    #[must_use]
    pub fn index(&self) -> usize {
        match self {
            Self::Full(_) => 0,
            Self::Range { index, .. } => *index,
        }
    }

    /// Number of raw values carried by the update.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Full(data) | Self::Range { data, .. } => data.len(),
        }
    }

    /// Whether the update carries no values.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Render-side counterpart of a 2D shape node.
pub trait ShapePeer {
    /// Replaces the outline geometry.
    fn set_geometry(&mut self, outline: &BezPath, fill_rule: FillRule);
    /// Sets the paint mode.
    fn set_mode(&mut self, mode: ShapeMode);
    /// Sets the fill paint.
    fn set_fill_paint(&mut self, paint: Option<&Paint>);
    /// Sets the stroke paint.
    fn set_draw_paint(&mut self, paint: Option<&Paint>);
    /// Sets stroke geometry attributes (already clamped).
    fn set_draw_stroke(&mut self, style: &StrokeStyle);
    /// Sets the antialiasing hint.
    fn set_smooth(&mut self, smooth: bool);
    /// Sets the node's world transform.
    fn set_transform(&mut self, transform: &Transform3d);
    /// Called once when the owning node is destroyed.
    fn release(&mut self) {}
}

/// Render-side counterpart of a 3D shape node.
pub trait Shape3dPeer {
    /// Sets the surface material; `None` selects the toolkit default.
    fn set_material(&mut self, material: Option<&Material>);
    /// Sets the draw mode.
    fn set_draw_mode(&mut self, mode: DrawMode);
    /// Sets the cull face.
    fn set_cull_face(&mut self, cull: CullFace);
    /// Binds the mesh drawn by this node.
    fn set_mesh(&mut self, mesh: Option<MeshId>);
    /// Notifies that the bound mesh's contents were pushed to its peer.
    fn mesh_geometry_changed(&mut self) {}
    /// Sets the node's world transform.
    fn set_transform(&mut self, transform: &Transform3d);
    /// Called once when the owning node is destroyed.
    fn release(&mut self) {}
}

/// Render-side counterpart of a [`TriangleMesh`](crate::mesh::TriangleMesh).
///
/// Mesh peers may be released from a rendering thread, so they must be
/// `Send`.
pub trait MeshPeer: Send {
    /// Updates vertex positions (3 values per point).
    fn update_points(&mut self, update: ArrayUpdate<'_, f32>);
    /// Updates texture coordinates (2 values per coordinate).
    fn update_tex_coords(&mut self, update: ArrayUpdate<'_, f32>);
    /// Updates faces (6 indices per triangle).
    fn update_faces(&mut self, update: ArrayUpdate<'_, i32>);
    /// Updates smoothing groups (1 bitmask per triangle). An empty full
    /// update means every face is in group 1.
    fn update_face_smoothing_groups(&mut self, update: ArrayUpdate<'_, i32>);
    /// Frees the render-side representation. Called when the last reference
    /// is dropped.
    fn release(&mut self);
}

/// Creates peers for nodes and meshes.
pub trait PeerFactory {
    /// Creates the peer for a 2D shape node.
    fn create_shape_peer(&mut self) -> Box<dyn ShapePeer>;
    /// Creates the peer for a 3D shape node.
    fn create_shape3d_peer(&mut self) -> Box<dyn Shape3dPeer>;
    /// Creates the peer for a mesh.
    fn create_mesh_peer(&mut self, mesh: MeshId) -> Box<dyn MeshPeer>;
}

/// Summary of one [`SceneGraph::sync`](crate::node::SceneGraph::sync) call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Nodes whose peers received at least one push.
    pub nodes_synced: usize,
    /// Meshes whose peers received at least one array update.
    pub meshes_synced: usize,
    /// Peers created during this pass (node and mesh peers).
    pub peers_created: usize,
    /// Peers released during this pass.
    pub peers_released: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_reports_raw_range() {
        let data = [1.0_f32, 2.0, 3.0];
        let full = ArrayUpdate::Full(&data);
        assert_eq!((full.index(), full.len()), (0, 3));
        let range = ArrayUpdate::Range {
            index: 9,
            data: &data[..2],
        };
        assert_eq!((range.index(), range.len()), (9, 2));
        assert!(!range.is_empty());
    }
}
