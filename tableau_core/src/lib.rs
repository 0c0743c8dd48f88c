// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Retained-mode scene core: shapes, meshes, picking and peer sync.
//!
//! `tableau_core` owns the CPU-side state of a scene and keeps a render-side
//! *peer* for every visible node in step with it. Nothing here draws; a
//! toolkit backend implements the [`peer`] traits and receives exactly the
//! state that changed since the last pulse.
//!
//! # Architecture
//!
//! Mutation and synchronization are separate phases:
//!
//! ```text
//!   caller mutations
//!       │  (set_fill, set_points_range, set_local_transform, …)
//!       ▼
//!   DirtyBits per node ──┐     TriangleMesh pending ranges
//!   dirty channels ──────┤              │
//!                        ▼              ▼
//!              SceneGraph::sync(&mut dyn PeerFactory)
//!                        │
//!       ┌────────────────┼──────────────────────┐
//!       ▼                ▼                      ▼
//!   ShapePeer        Shape3dPeer            MeshPeer
//!   (dirty-gated     (dirty-gated           (full array or merged
//!    properties)      properties)            sub-range updates)
//! ```
//!
//! **[`node`]**: Struct-of-arrays scene graph with generational handles.
//! Local transforms are set by the caller; world transforms are computed by
//! evaluation. Also hosts bounds, containment and picking across the tree.
//!
//! **[`dirty`]**: Per-node [`DirtyBits`](dirty::DirtyBits) plus
//! multi-channel tracking via `understory_dirty` for choosing which nodes a
//! sync visits.
//!
//! **[`shape`]**: 2D shape kinds, their outlines, transformed bounds,
//! containment, and boolean algebra via [`Area`](shape::Area).
//!
//! **[`shape3d`]**: Boxes and mesh views, with slab and triangle picking.
//!
//! **[`mesh`]**: The [`TriangleMesh`](mesh::TriangleMesh) store with
//! partial-range update merging, a bounds cache, and the reference count that
//! decides when its peer exists.
//!
//! **[`pick`]**: Pick rays and closest-hit resolution.
//!
//! **[`peer`]**: The contract between this crate and a rendering toolkit.
//!
//! **[`transform`]**: 3D affine transform type for node positioning.

pub mod bounds;
pub mod config;
pub mod dirty;
pub mod error;
pub mod math;
pub mod mesh;
pub mod node;
pub mod paint;
pub mod peer;
pub mod pick;
pub mod shape;
pub mod shape3d;
pub mod transform;

pub use error::{Error, Result};
