// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Triangle meshes.
//!
//! A [`TriangleMesh`] owns four flat arrays (points, texture coordinates,
//! faces, smoothing groups). Writes either replace an array or patch a raw
//! sub-range; patches issued between syncs merge into one enclosing range per
//! array so the peer receives a single contiguous update.
//!
//! Meshes live in a [`MeshArena`] and are shared by handle ([`MeshId`]).
//! Each mesh carries a [`PeerRefCount`] counting the nodes that display it;
//! its peer exists only while that count is non-zero.
//!
//! Primitive shapes obtain their generated meshes from a
//! [`PredefinedMeshCache`], which deduplicates meshes by dimensions.

mod arena;
mod intersect;
mod predefined;
mod refcount;
mod triangle;

pub use arena::{MeshArena, MeshId};
pub use predefined::{BoxKey, PredefinedMeshCache};
pub use refcount::PeerRefCount;
pub use triangle::{ArrayRange, MeshSync, TriangleMesh};
