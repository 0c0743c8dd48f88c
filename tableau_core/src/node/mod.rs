// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scene graph: node tree, transforms, and the sync barrier.
//!
//! Nodes are stored in a [`SceneGraph`] using struct-of-arrays layout for
//! cache-friendly traversal. Each node is addressed by a [`NodeId`], a
//! generational handle that detects use-after-free.
//!
//! A node holds [`NodeContent`]: nothing (a group), a 2D
//! [`Shape`](crate::shape::Shape) or a 3D [`Shape3d`](crate::shape3d::Shape3d).
//! Mutating content through [`SceneGraph::shape_mut`] or
//! [`SceneGraph::shape3d_mut`] schedules the node for the next
//! [`SceneGraph::sync`], which pushes only the state whose dirty bits are
//! set.

mod evaluate;
mod id;
mod query;
mod store;
mod sync;
mod traverse;

pub use evaluate::FrameChanges;
pub use id::NodeId;
pub use store::{NodeContent, SceneGraph};
pub use traverse::Children;
