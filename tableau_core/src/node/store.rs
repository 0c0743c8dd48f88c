// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Struct-of-arrays node storage: allocation, parent links, content and
//! the shared mesh arena.

use core::fmt;

use understory_dirty::{CycleHandling, DirtyTracker, EagerPolicy};

use crate::config::GeometryConfig;
use crate::dirty;
use crate::error::{Error, Result};
use crate::mesh::{MeshArena, MeshId, PredefinedMeshCache, TriangleMesh};
use crate::peer::{Shape3dPeer, ShapePeer};
use crate::shape::Shape;
use crate::shape3d::Shape3d;
use crate::transform::Transform3d;

use super::id::{INVALID, NodeId};
use super::traverse::Children;

/// What a node draws.
#[derive(Clone, Debug, Default)]
pub enum NodeContent {
    /// Nothing; the node only groups and transforms its children.
    #[default]
    Group,
    /// A 2D shape in the node's `z = 0` plane.
    Shape(Shape),
    /// A 3D shape.
    Shape3d(Shape3d),
}

/// A node's render-side peer.
pub(crate) enum NodePeer {
    Shape(Box<dyn ShapePeer>),
    Shape3d(Box<dyn Shape3dPeer>),
}

impl NodePeer {
    pub(crate) fn release(&mut self) {
        match self {
            Self::Shape(p) => p.release(),
            Self::Shape3d(p) => p.release(),
        }
    }
}

impl fmt::Debug for NodePeer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(_) => f.write_str("NodePeer::Shape"),
            Self::Shape3d(_) => f.write_str("NodePeer::Shape3d"),
        }
    }
}

/// Struct-of-arrays storage for all scene nodes.
///
/// Nodes are addressed by [`NodeId`] handles. Internally, each node occupies
/// a slot in parallel arrays. Destroyed nodes are recycled via a free list,
/// and generation counters prevent stale handle access.
///
/// The graph also owns the meshes its 3D nodes display, the cache of
/// generated primitive meshes, and the [`GeometryConfig`] used whenever
/// shape geometry is flattened.
#[derive(Debug)]
pub struct SceneGraph {
    // -- Topology --
    pub(crate) parent: Vec<u32>,
    /// Child slots in paint order.
    pub(crate) children: Vec<Vec<u32>>,

    // -- Local properties (set by callers) --
    pub(crate) local_transform: Vec<Transform3d>,
    pub(crate) content: Vec<NodeContent>,

    // -- Computed properties (written by evaluate) --
    pub(crate) world_transform: Vec<Transform3d>,

    // -- Render side (written by sync) --
    pub(crate) peer: Vec<Option<NodePeer>>,
    /// Mesh whose peer reference count this node currently holds.
    pub(crate) attached_mesh: Vec<Option<MeshId>>,
    pub(crate) released_since_sync: usize,

    // -- Allocation --
    pub(crate) generation: Vec<u32>,
    pub(crate) alive: Vec<bool>,
    pub(crate) free_list: Vec<u32>,
    pub(crate) len: u32,

    // -- Dirty tracking --
    pub(crate) dirty: DirtyTracker<u32>,

    // -- Traversal cache --
    pub(crate) traversal_order: Vec<u32>,
    pub(crate) traversal_dirty: bool,

    // -- Lifecycle tracking --
    pub(crate) pending_added: Vec<u32>,
    pub(crate) pending_removed: Vec<u32>,

    // -- Shared resources --
    pub(crate) meshes: MeshArena,
    pub(crate) mesh_cache: PredefinedMeshCache,
    pub(crate) config: GeometryConfig,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates an empty graph with [`GeometryConfig::DEFAULT`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(GeometryConfig::DEFAULT)
    }

    /// Creates an empty graph with the given geometry settings.
    #[must_use]
    pub fn with_config(config: GeometryConfig) -> Self {
        Self {
            parent: Vec::new(),
            children: Vec::new(),
            local_transform: Vec::new(),
            content: Vec::new(),
            world_transform: Vec::new(),
            peer: Vec::new(),
            attached_mesh: Vec::new(),
            released_since_sync: 0,
            generation: Vec::new(),
            alive: Vec::new(),
            free_list: Vec::new(),
            len: 0,
            dirty: DirtyTracker::with_cycle_handling(CycleHandling::Error),
            traversal_order: Vec::new(),
            traversal_dirty: true,
            pending_added: Vec::new(),
            pending_removed: Vec::new(),
            meshes: MeshArena::new(),
            mesh_cache: PredefinedMeshCache::new(),
            config,
        }
    }

    /// Geometry settings used for bounds, containment, picking and algebra.
    #[must_use]
    pub fn config(&self) -> &GeometryConfig {
        &self.config
    }

    // -- Allocation API --

    /// Creates a new node and returns its handle.
    ///
    /// The node starts with an identity transform and no parent. Slots freed
    /// by [`destroy_node`](Self::destroy_node) are reused; their generation
    /// was already bumped on destruction.
    pub fn create_node(&mut self, content: NodeContent) -> NodeId {
        let idx = self.free_list.pop().unwrap_or_else(|| self.push_slot());
        let i = idx as usize;
        self.content[i] = content;
        self.local_transform[i] = Transform3d::IDENTITY;
        self.world_transform[i] = Transform3d::IDENTITY;
        self.alive[i] = true;

        self.traversal_dirty = true;
        self.pending_added.push(idx);
        self.dirty.mark(idx, dirty::TOPOLOGY);
        self.dirty.mark(idx, dirty::CONTENT);
        self.dirty.mark_with(idx, dirty::TRANSFORM, &EagerPolicy);

        self.id_at(idx)
    }

    /// Creates a group node.
    pub fn create_group(&mut self) -> NodeId {
        self.create_node(NodeContent::Group)
    }

    /// Creates a 2D shape node.
    pub fn create_shape(&mut self, shape: Shape) -> NodeId {
        self.create_node(NodeContent::Shape(shape))
    }

    /// Creates a 3D shape node.
    pub fn create_shape3d(&mut self, shape: Shape3d) -> NodeId {
        self.create_node(NodeContent::Shape3d(shape))
    }

    /// Destroys a node, freeing its slot for reuse.
    ///
    /// The node's peer is released and any mesh reference it holds is
    /// dropped.
    ///
    /// # Panics
    ///
    /// Panics if the node has children (remove them first) or if the handle
    /// is stale.
    pub fn destroy_node(&mut self, id: NodeId) {
        self.validate(id);
        let idx = id.idx;
        assert!(
            self.children[idx as usize].is_empty(),
            "cannot destroy node with children"
        );

        if self.parent[idx as usize] != INVALID {
            self.detach(idx);
        }
        self.detach_render_state(idx);
        self.content[idx as usize] = NodeContent::Group;

        self.dirty.remove_key(idx);

        // Bump generation so old handles immediately fail validation.
        self.generation[idx as usize] += 1;
        self.alive[idx as usize] = false;

        self.free_list.push(idx);
        self.traversal_dirty = true;
        self.pending_removed.push(idx);
        tracing::trace!(?id, "node destroyed");
    }

    /// Returns whether the given handle refers to a live node.
    #[must_use]
    pub fn is_alive(&self, id: NodeId) -> bool {
        id.idx < self.len
            && self.generation[id.idx as usize] == id.generation
            && self.alive[id.idx as usize]
    }

    // -- Topology API --

    /// Adds `child` as the last child of `parent`.
    ///
    /// Marks the world transforms of `child`'s subtree dirty.
    ///
    /// # Panics
    ///
    /// Panics if either handle is stale, or if `child` already has a parent.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId) {
        self.validate(parent);
        self.validate(child);
        let (p, c) = (parent.idx, child.idx);
        assert!(
            self.parent[c as usize] == INVALID,
            "child already has a parent"
        );
        self.parent[c as usize] = p;
        self.children[p as usize].push(c);
        let _ = self.dirty.add_dependency(c, p, dirty::TRANSFORM);
        self.topology_changed(c, p);
    }

    /// Removes `child` from its current parent, making it a root.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or the node has no parent.
    pub fn remove_from_parent(&mut self, child: NodeId) {
        self.validate(child);
        let c = child.idx;
        let p = self.parent[c as usize];
        assert!(p != INVALID, "node has no parent");
        self.detach(c);
        self.topology_changed(c, p);
    }

    /// Returns the parent of a node, if any.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.validate(id);
        let p = self.parent[id.idx as usize];
        (p != INVALID).then(|| self.id_at(p))
    }

    /// Returns an iterator over the direct children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        self.validate(id);
        Children::new(self, &self.children[id.idx as usize])
    }

    // -- Content --

    /// Returns a node's content.
    #[must_use]
    pub fn content(&self, id: NodeId) -> &NodeContent {
        self.validate(id);
        &self.content[id.idx as usize]
    }

    /// Replaces a node's content.
    ///
    /// The old peer is released and any mesh reference dropped; the next
    /// [`sync`](Self::sync) creates a peer for the new content.
    pub fn set_content(&mut self, id: NodeId, content: NodeContent) {
        self.validate(id);
        self.detach_render_state(id.idx);
        self.content[id.idx as usize] = content;
        self.dirty.mark(id.idx, dirty::CONTENT);
    }

    /// Returns the 2D shape of a node, if it has one.
    #[must_use]
    pub fn shape(&self, id: NodeId) -> Option<&Shape> {
        match self.content(id) {
            NodeContent::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the 2D shape of a node for mutation, scheduling the node for
    /// the next sync.
    pub fn shape_mut(&mut self, id: NodeId) -> Option<&mut Shape> {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
        match &mut self.content[id.idx as usize] {
            NodeContent::Shape(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the 3D shape of a node, if it has one.
    #[must_use]
    pub fn shape3d(&self, id: NodeId) -> Option<&Shape3d> {
        match self.content(id) {
            NodeContent::Shape3d(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the 3D shape of a node for mutation, scheduling the node for
    /// the next sync.
    pub fn shape3d_mut(&mut self, id: NodeId) -> Option<&mut Shape3d> {
        self.validate(id);
        self.dirty.mark(id.idx, dirty::CONTENT);
        match &mut self.content[id.idx as usize] {
            NodeContent::Shape3d(s) => Some(s),
            _ => None,
        }
    }

    // -- Transforms --

    /// Returns the local transform of a node.
    #[must_use]
    pub fn local_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.local_transform[id.idx as usize]
    }

    /// Sets the local transform of a node.
    ///
    /// Marks the TRANSFORM channel dirty with eager propagation to
    /// descendants.
    pub fn set_local_transform(&mut self, id: NodeId, transform: Transform3d) {
        self.validate(id);
        self.local_transform[id.idx as usize] = transform;
        self.dirty.mark_with(id.idx, dirty::TRANSFORM, &EagerPolicy);
    }

    /// Returns the computed world transform of a node.
    ///
    /// Only valid after [`evaluate`](Self::evaluate) has been called.
    #[must_use]
    pub fn world_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        self.world_transform[id.idx as usize]
    }

    /// Composes local transforms from the root down to `id`.
    ///
    /// Unlike [`world_transform`](Self::world_transform) this does not depend
    /// on a prior [`evaluate`](Self::evaluate).
    #[must_use]
    pub fn node_to_scene_transform(&self, id: NodeId) -> Transform3d {
        self.validate(id);
        let mut idx = id.idx;
        let mut out = self.local_transform[idx as usize];
        loop {
            idx = self.parent[idx as usize];
            if idx == INVALID {
                return out;
            }
            out = self.local_transform[idx as usize] * out;
        }
    }

    // -- Meshes --

    /// Adds a mesh to the graph.
    pub fn add_mesh(&mut self, mesh: TriangleMesh) -> MeshId {
        self.meshes.insert(mesh)
    }

    /// Returns a mesh.
    #[must_use]
    pub fn mesh(&self, id: MeshId) -> Option<&TriangleMesh> {
        self.meshes.get(id)
    }

    /// Returns a mesh for mutation. Changes reach the mesh peer, and every
    /// node displaying the mesh, on the next [`sync`](Self::sync).
    pub fn mesh_mut(&mut self, id: MeshId) -> Option<&mut TriangleMesh> {
        self.meshes.get_mut(id)
    }

    /// Removes a mesh.
    ///
    /// # Errors
    ///
    /// Fails when the handle is stale or a synced node still displays the
    /// mesh.
    pub fn remove_mesh(&mut self, id: MeshId) -> Result<TriangleMesh> {
        self.meshes.remove(id)
    }

    /// All meshes, including generated primitive meshes.
    #[must_use]
    pub fn meshes(&self) -> &MeshArena {
        &self.meshes
    }

    /// Drops generated primitive meshes that no node displays. Returns how
    /// many were removed.
    pub fn purge_unused_meshes(&mut self) -> usize {
        self.mesh_cache.purge_unused(&mut self.meshes)
    }

    // -- Internal helpers --

    /// Builds the current handle for a raw slot.
    pub(crate) fn id_at(&self, idx: u32) -> NodeId {
        NodeId {
            idx,
            generation: self.generation[idx as usize],
        }
    }

    /// Panics if the handle is stale.
    pub(crate) fn validate(&self, id: NodeId) {
        assert!(
            self.is_alive(id),
            "stale NodeId: {id:?} (current gen: {})",
            if id.idx < self.len {
                self.generation[id.idx as usize]
            } else {
                u32::MAX
            }
        );
    }

    /// Returns the 2D shape of a node or an error naming the operation.
    pub(crate) fn expect_shape(&self, id: NodeId, what: &'static str) -> Result<&Shape> {
        self.shape(id)
            .ok_or_else(|| Error::invalid(what, format!("{id:?} is not a 2D shape node")))
    }

    /// Appends an empty, dead slot.
    fn push_slot(&mut self) -> u32 {
        let idx = self.len;
        self.len += 1;
        self.parent.push(INVALID);
        self.children.push(Vec::new());
        self.local_transform.push(Transform3d::IDENTITY);
        self.content.push(NodeContent::Group);
        self.world_transform.push(Transform3d::IDENTITY);
        self.peer.push(None);
        self.attached_mesh.push(None);
        self.generation.push(0);
        self.alive.push(false);
        idx
    }

    /// Unlinks `idx` from its parent and drops the inherited transform.
    fn detach(&mut self, idx: u32) {
        let p = self.parent[idx as usize];
        self.children[p as usize].retain(|&c| c != idx);
        self.parent[idx as usize] = INVALID;
        self.dirty.remove_dependency(idx, p, dirty::TRANSFORM);
    }

    fn topology_changed(&mut self, child: u32, parent: u32) {
        self.dirty.mark_with(child, dirty::TRANSFORM, &EagerPolicy);
        self.traversal_dirty = true;
        self.dirty.mark(parent, dirty::TOPOLOGY);
    }

    /// Releases the node's peer and drops its mesh reference.
    fn detach_render_state(&mut self, idx: u32) {
        if let Some(mut peer) = self.peer[idx as usize].take() {
            peer.release();
            self.released_since_sync += 1;
        }
        if let Some(mesh) = self.attached_mesh[idx as usize].take() {
            self.released_since_sync += self.drop_mesh_ref(mesh);
        }
    }

    /// Drops one reference to `mesh`. Returns 1 if that released its peer.
    pub(crate) fn drop_mesh_ref(&self, mesh: MeshId) -> usize {
        let Some(m) = self.meshes.get(mesh) else {
            return 0;
        };
        let had_peer = m.refs().has_peer();
        usize::from(m.refs().dec_ref() == 0 && had_peer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_and_destroy() {
        let mut graph = SceneGraph::new();
        let id = graph.create_group();
        assert!(graph.is_alive(id));
        graph.destroy_node(id);
        assert!(!graph.is_alive(id));
    }

    #[test]
    fn generation_prevents_stale_access() {
        let mut graph = SceneGraph::new();
        let id1 = graph.create_group();
        graph.destroy_node(id1);
        let id2 = graph.create_group();
        // id2 reuses the same slot but has a different generation.
        assert!(!graph.is_alive(id1));
        assert!(graph.is_alive(id2));
        assert_eq!(id1.index(), id2.index());
        assert_ne!(id1.generation(), id2.generation());
    }

    #[test]
    fn add_child_and_query() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let child1 = graph.create_shape(Shape::circle(0.0, 0.0, 1.0));
        let child2 = graph.create_group();

        graph.add_child(parent, child1);
        graph.add_child(parent, child2);

        assert_eq!(graph.parent(child1), Some(parent));
        let kids: Vec<_> = graph.children(parent).collect();
        assert_eq!(kids, vec![child1, child2]);
    }

    #[test]
    fn remove_keeps_sibling_order() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let [a, b, c] = [(); 3].map(|()| graph.create_group());
        for kid in [a, b, c] {
            graph.add_child(parent, kid);
        }

        graph.remove_from_parent(b);
        assert_eq!(graph.parent(b), None);
        assert_eq!(graph.children(parent).collect::<Vec<_>>(), vec![a, c]);

        graph.add_child(parent, b);
        assert_eq!(graph.children(parent).collect::<Vec<_>>(), vec![a, c, b]);
    }

    #[test]
    fn recycled_slot_starts_clean() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let old = graph.create_shape(Shape::circle(0.0, 0.0, 1.0));
        graph.add_child(parent, old);
        graph.set_local_transform(old, Transform3d::from_translation(1.0, 2.0, 3.0));
        graph.destroy_node(old);
        assert!(graph.children(parent).next().is_none());

        let new = graph.create_group();
        assert_eq!(new.index(), old.index());
        assert_eq!(graph.parent(new), None);
        assert_eq!(graph.local_transform(new), Transform3d::IDENTITY);
        assert!(matches!(graph.content(new), NodeContent::Group));
    }

    #[test]
    fn node_to_scene_composes_ancestors() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let child = graph.create_group();
        graph.add_child(root, child);
        graph.set_local_transform(root, Transform3d::from_translation(10.0, 0.0, 0.0));
        graph.set_local_transform(child, Transform3d::from_scale(2.0, 2.0, 1.0));

        let t = graph.node_to_scene_transform(child);
        assert_eq!(
            t,
            Transform3d::from_translation(10.0, 0.0, 0.0) * Transform3d::from_scale(2.0, 2.0, 1.0)
        );
    }

    #[test]
    fn shape_accessors_match_content() {
        let mut graph = SceneGraph::new();
        let s = graph.create_shape(Shape::rectangle(0.0, 0.0, 1.0, 1.0));
        let g = graph.create_group();
        assert!(graph.shape(s).is_some());
        assert!(graph.shape3d(s).is_none());
        assert!(graph.shape_mut(g).is_none());
    }

    #[test]
    #[should_panic(expected = "cannot destroy node with children")]
    fn destroy_with_children_panics() {
        let mut graph = SceneGraph::new();
        let parent = graph.create_group();
        let child = graph.create_group();
        graph.add_child(parent, child);
        graph.destroy_node(parent);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_transform() {
        let mut graph = SceneGraph::new();
        let id = graph.create_group();
        graph.destroy_node(id);
        graph.set_local_transform(id, Transform3d::IDENTITY);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_add_child() {
        let mut graph = SceneGraph::new();
        let root = graph.create_group();
        let id = graph.create_group();
        graph.destroy_node(id);
        graph.add_child(root, id);
    }

    #[test]
    #[should_panic(expected = "stale NodeId")]
    fn destroyed_handle_panics_on_shape_mut() {
        let mut graph = SceneGraph::new();
        let id = graph.create_shape(Shape::circle(0.0, 0.0, 1.0));
        graph.destroy_node(id);
        let _ = graph.shape_mut(id);
    }
}
