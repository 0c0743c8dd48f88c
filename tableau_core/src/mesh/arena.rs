// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Generational storage for meshes shared between nodes.

use core::fmt;

use super::TriangleMesh;
use crate::error::{Error, Result};

/// A handle to a mesh in a [`MeshArena`].
///
/// Like node handles, it carries a generation so that a handle to a removed
/// mesh never resolves to a mesh later stored in the same slot.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshId {
    pub(crate) idx: u32,
    pub(crate) generation: u32,
}

impl MeshId {
    /// Returns the raw slot index (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.idx
    }

    /// Returns the generation counter.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Debug for MeshId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MeshId({}@gen{})", self.idx, self.generation)
    }
}

/// Slot storage for meshes with free-list reuse.
#[derive(Debug, Default)]
pub struct MeshArena {
    slots: Vec<Option<TriangleMesh>>,
    generation: Vec<u32>,
    free_list: Vec<u32>,
}

impl MeshArena {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `mesh` and returns its handle.
    pub fn insert(&mut self, mesh: TriangleMesh) -> MeshId {
        if let Some(idx) = self.free_list.pop() {
            self.slots[idx as usize] = Some(mesh);
            return MeshId {
                idx,
                generation: self.generation[idx as usize],
            };
        }
        let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
        self.slots.push(Some(mesh));
        self.generation.push(0);
        MeshId { idx, generation: 0 }
    }

    /// Returns the mesh, or `None` for a stale handle.
    #[must_use]
    pub fn get(&self, id: MeshId) -> Option<&TriangleMesh> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.idx as usize].as_ref()
    }

    /// Returns the mesh mutably, or `None` for a stale handle.
    #[must_use]
    pub fn get_mut(&mut self, id: MeshId) -> Option<&mut TriangleMesh> {
        if !self.is_alive(id) {
            return None;
        }
        self.slots[id.idx as usize].as_mut()
    }

    /// Whether `id` refers to a stored mesh.
    #[must_use]
    pub fn is_alive(&self, id: MeshId) -> bool {
        (id.idx as usize) < self.slots.len()
            && self.generation[id.idx as usize] == id.generation
            && self.slots[id.idx as usize].is_some()
    }

    /// Removes and returns a mesh that no node references.
    ///
    /// # Errors
    ///
    /// Fails for a stale handle, or while any node still displays the mesh.
    pub fn remove(&mut self, id: MeshId) -> Result<TriangleMesh> {
        let mesh = self
            .get(id)
            .ok_or_else(|| Error::invalid("mesh", format!("{id:?} is not alive")))?;
        let refs = mesh.refs().count();
        if refs > 0 {
            return Err(Error::invalid(
                "mesh",
                format!("{id:?} is still referenced by {refs} node(s)"),
            ));
        }
        let slot = id.idx as usize;
        self.generation[slot] = self.generation[slot].wrapping_add(1);
        self.free_list.push(id.idx);
        self.slots[slot]
            .take()
            .ok_or_else(|| Error::invalid("mesh", "slot already empty"))
    }

    /// Iterates over all live meshes.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (MeshId, &mut TriangleMesh)> {
        self.slots
            .iter_mut()
            .zip(&self.generation)
            .enumerate()
            .filter_map(|(idx, (slot, &generation))| {
                let mesh = slot.as_mut()?;
                let idx = u32::try_from(idx).ok()?;
                Some((MeshId { idx, generation }, mesh))
            })
    }

    /// Number of live meshes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Whether the arena holds no meshes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn removed_handles_go_stale() {
        let mut arena = MeshArena::new();
        let a = arena.insert(TriangleMesh::new());
        arena.remove(a).expect("unreferenced");
        assert!(arena.get(a).is_none());
        let b = arena.insert(TriangleMesh::new());
        assert_eq!(a.index(), b.index());
        assert_ne!(a.generation(), b.generation());
        assert!(arena.remove(a).is_err(), "stale handle");
        assert_eq!(arena.len(), 1);
    }

    #[test]
    fn referenced_mesh_cannot_be_removed() {
        let mut arena = MeshArena::new();
        let id = arena.insert(TriangleMesh::new());
        arena.get(id).expect("alive").refs().inc_ref();
        assert!(arena.remove(id).is_err());
        arena.get(id).expect("alive").refs().dec_ref();
        assert!(arena.remove(id).is_ok());
        assert!(arena.is_empty());
    }
}
