// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The synchronization barrier between CPU-side state and peers.
//!
//! One [`SceneGraph::sync`] call runs, in order:
//!
//! 1. [`evaluate`](SceneGraph::evaluate), yielding the nodes whose world
//!    transform or content changed.
//! 2. Mesh binding for changed 3D nodes: boxes resolve their generated mesh
//!    through the [`PredefinedMeshCache`](crate::mesh::PredefinedMeshCache)
//!    and every 3D node moves its peer reference from the mesh it held to the
//!    mesh it now displays.
//! 3. Mesh sync: every referenced mesh pushes its dirty arrays.
//! 4. Node sync: changed nodes (plus nodes whose mesh was just pushed) get a
//!    peer if they lack one and receive their dirty state, then nodes with a
//!    recomputed world transform receive it.

use crate::dirty::{DirtyBits, mark_dirty};
use crate::mesh::MeshId;
use crate::peer::{PeerFactory, SyncReport};
use crate::shape3d::Shape3dKind;

use super::store::{NodeContent, NodePeer, SceneGraph};

impl SceneGraph {
    /// Pushes every pending change to the render side.
    ///
    /// Peers are created through `factory` the first time a node (or a
    /// referenced mesh) is synced; a new peer receives its complete state.
    /// Afterwards only state whose dirty bits are set is pushed, and the bits
    /// are cleared.
    pub fn sync(&mut self, factory: &mut dyn PeerFactory) -> SyncReport {
        let changes = self.evaluate();
        let mut report = SyncReport {
            peers_released: core::mem::take(&mut self.released_since_sync),
            ..SyncReport::default()
        };

        let mut visit: Vec<u32> = changes
            .content
            .iter()
            .copied()
            .filter(|&idx| self.alive[idx as usize])
            .collect();

        for &idx in &visit {
            report.peers_released += self.bind_mesh(idx);
        }

        let mut pushed_meshes: Vec<MeshId> = Vec::new();
        for (id, mesh) in self.meshes.iter_mut() {
            let outcome = mesh.sync(id, factory);
            if outcome.created_peer {
                report.peers_created += 1;
            }
            if outcome.pushed {
                report.meshes_synced += 1;
                pushed_meshes.push(id);
            }
        }
        if !pushed_meshes.is_empty() {
            for idx in 0..self.len {
                let i = idx as usize;
                let Some(mesh) = self.attached_mesh[i] else {
                    continue;
                };
                if pushed_meshes.contains(&mesh)
                    && let NodeContent::Shape3d(shape) = &mut self.content[i]
                {
                    mark_dirty(shape, DirtyBits::MESH_GEOM);
                    visit.push(idx);
                }
            }
        }

        visit.sort_unstable();
        visit.dedup();
        let mut synced = vec![false; self.len as usize];
        let mut transform_sent = vec![false; self.len as usize];
        for &idx in &visit {
            let i = idx as usize;
            let fresh = self.ensure_peer(i, factory);
            if fresh {
                report.peers_created += 1;
            }
            let world = self.world_transform[i];
            synced[i] = match (&mut self.content[i], &mut self.peer[i]) {
                (NodeContent::Shape(shape), Some(NodePeer::Shape(peer))) => {
                    if fresh {
                        peer.set_transform(&world);
                    }
                    shape.sync_peer(peer.as_mut(), fresh) || fresh
                }
                (NodeContent::Shape3d(shape), Some(NodePeer::Shape3d(peer))) => {
                    if fresh {
                        peer.set_transform(&world);
                    }
                    shape.sync_peer(peer.as_mut(), fresh) || fresh
                }
                _ => false,
            };
            transform_sent[i] = fresh;
        }

        for &idx in &changes.transforms {
            let i = idx as usize;
            if !self.alive[i] || transform_sent[i] {
                continue;
            }
            let world = self.world_transform[i];
            match &mut self.peer[i] {
                Some(NodePeer::Shape(peer)) => peer.set_transform(&world),
                Some(NodePeer::Shape3d(peer)) => peer.set_transform(&world),
                None => continue,
            }
            synced[i] = true;
        }

        report.nodes_synced = synced.iter().filter(|&&s| s).count();
        if report != SyncReport::default() {
            tracing::debug!(?report, "scene graph synced");
        }
        report
    }

    /// Points the node's mesh reference at the mesh it displays now,
    /// resolving a box's generated mesh first. Returns how many mesh peers
    /// were released.
    fn bind_mesh(&mut self, idx: u32) -> usize {
        let i = idx as usize;
        let NodeContent::Shape3d(shape) = &mut self.content[i] else {
            return 0;
        };
        if matches!(shape.kind(), Shape3dKind::Box(_))
            && shape.mesh().is_some_and(|id| !self.meshes.is_alive(id))
        {
            shape.forget_box_mesh();
        }
        if let Some(key) = shape.pending_box_mesh() {
            let id = self.mesh_cache.box_mesh(key, &mut self.meshes);
            shape.resolve_box_mesh(key, id);
        }
        let wanted = shape.mesh().filter(|&id| self.meshes.is_alive(id));

        let held = self.attached_mesh[i];
        if held == wanted {
            return 0;
        }
        if let Some(mesh) = wanted.and_then(|id| self.meshes.get(id)) {
            mesh.refs().inc_ref();
        }
        self.attached_mesh[i] = wanted;
        held.map_or(0, |old| self.drop_mesh_ref(old))
    }

    /// Creates the peer matching the node's content if it lacks one. Returns
    /// whether a peer was created.
    fn ensure_peer(&mut self, i: usize, factory: &mut dyn PeerFactory) -> bool {
        let matches = matches!(
            (&self.content[i], &self.peer[i]),
            (NodeContent::Group, None)
                | (NodeContent::Shape(_), Some(NodePeer::Shape(_)))
                | (NodeContent::Shape3d(_), Some(NodePeer::Shape3d(_)))
        );
        if matches {
            return false;
        }
        if let Some(mut stale) = self.peer[i].take() {
            stale.release();
        }
        self.peer[i] = match &self.content[i] {
            NodeContent::Group => None,
            NodeContent::Shape(_) => Some(NodePeer::Shape(factory.create_shape_peer())),
            NodeContent::Shape3d(_) => Some(NodePeer::Shape3d(factory.create_shape3d_peer())),
        };
        self.peer[i].is_some()
    }
}
