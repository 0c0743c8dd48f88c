// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cache of generated meshes for primitive 3D shapes.
//!
//! Boxes with identical dimensions share one generated mesh. The cache is an
//! ordinary value owned by the scene graph; shapes hold a [`BoxKey`] and
//! clear it whenever their dimensions change.

use std::collections::HashMap;

use super::{MeshArena, MeshId, TriangleMesh};

/// Dimensions of a generated box mesh, compared bitwise.
#[derive(Clone, Copy, Debug)]
pub struct BoxKey {
    /// Width along X.
    pub width: f64,
    /// Height along Y.
    pub height: f64,
    /// Depth along Z.
    pub depth: f64,
}

impl BoxKey {
    fn bits(self) -> [u64; 3] {
        // `+ 0.0` folds -0.0 into 0.0 so both hash alike.
        [
            (self.width + 0.0).to_bits(),
            (self.height + 0.0).to_bits(),
            (self.depth + 0.0).to_bits(),
        ]
    }
}

impl PartialEq for BoxKey {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for BoxKey {}

impl core::hash::Hash for BoxKey {
    fn hash<H: core::hash::Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

/// Maps primitive dimensions to shared meshes in a [`MeshArena`].
#[derive(Debug, Default)]
pub struct PredefinedMeshCache {
    boxes: HashMap<BoxKey, MeshId>,
}

impl PredefinedMeshCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the shared mesh for `key`, generating it on first use.
    pub fn box_mesh(&mut self, key: BoxKey, arena: &mut MeshArena) -> MeshId {
        if let Some(&id) = self.boxes.get(&key)
            && arena.is_alive(id)
        {
            return id;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "mesh points are stored in single precision"
        )]
        let mesh = TriangleMesh::new_box(key.width as f32, key.height as f32, key.depth as f32);
        let id = arena.insert(mesh);
        tracing::trace!(?key, ?id, "generated box mesh");
        self.boxes.insert(key, id);
        id
    }

    /// Drops generated meshes no node references. Returns how many were
    /// removed.
    pub fn purge_unused(&mut self, arena: &mut MeshArena) -> usize {
        let before = self.boxes.len();
        self.boxes.retain(|_, id| {
            let in_use = arena.get(*id).is_some_and(|m| m.refs().count() > 0);
            if !in_use {
                let _ = arena.remove(*id);
            }
            in_use
        });
        before - self.boxes.len()
    }

    /// Number of cached meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.boxes.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.boxes.is_empty()
    }
}
