// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 3D shapes.
//!
//! Both kinds render through a [`TriangleMesh`](crate::mesh::TriangleMesh):
//! a [`MeshView`](Shape3dKind::MeshView) names one explicitly, while a
//! [`BoxShape`] obtains a generated mesh from the scene graph's
//! [`PredefinedMeshCache`](crate::mesh::PredefinedMeshCache). The generated
//! mesh is resolved lazily during sync and forgotten whenever the box's
//! dimensions change.

mod box_shape;

use kurbo::Point;

pub use box_shape::{BoxFace, BoxIntersection, BoxShape, DEFAULT_BOX_SIZE};

use crate::bounds::Bounds;
use crate::dirty::{DirtyBits, DirtyNode, mark_dirty};
use crate::error::{Error, Result};
use crate::mesh::{BoxKey, MeshArena, MeshId};
use crate::paint::Material;
use crate::peer::Shape3dPeer;
use crate::pick::{CullFace, PickRay, PickResultChooser};

/// Every bit a 3D shape pushes to its peer.
const SHAPE3D_BITS: DirtyBits = DirtyBits::GEOMETRY
    .union(DirtyBits::MESH)
    .union(DirtyBits::MESH_GEOM)
    .union(DirtyBits::MATERIAL)
    .union(DirtyBits::DRAW_MODE)
    .union(DirtyBits::CULL_FACE);

/// How triangles are rasterized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DrawMode {
    /// Filled triangles.
    #[default]
    Fill,
    /// Wireframe.
    Line,
}

/// The geometry of a [`Shape3d`].
#[derive(Clone, Debug, PartialEq)]
pub enum Shape3dKind {
    /// A box with a generated mesh.
    Box(BoxShape),
    /// A view of a shared mesh.
    MeshView {
        /// The displayed mesh, if any.
        mesh: Option<MeshId>,
    },
}

/// A 3D shape node's content.
#[derive(Clone, Debug)]
pub struct Shape3d {
    kind: Shape3dKind,
    material: Option<Material>,
    draw_mode: DrawMode,
    cull_face: CullFace,
    dirty: DirtyBits,
    /// Generated mesh for a box, with the key it was generated for.
    box_mesh: Option<(BoxKey, MeshId)>,
}

impl Shape3d {
    fn new(kind: Shape3dKind) -> Self {
        Self {
            kind,
            material: None,
            draw_mode: DrawMode::Fill,
            cull_face: CullFace::Back,
            dirty: SHAPE3D_BITS,
            box_mesh: None,
        }
    }

    /// A box of the given size.
    #[must_use]
    pub fn new_box(width: f64, height: f64, depth: f64) -> Self {
        Self::new(Shape3dKind::Box(BoxShape::new(width, height, depth)))
    }

    /// A view of `mesh`.
    #[must_use]
    pub fn mesh_view(mesh: Option<MeshId>) -> Self {
        Self::new(Shape3dKind::MeshView { mesh })
    }

    /// The geometry.
    #[must_use]
    pub fn kind(&self) -> &Shape3dKind {
        &self.kind
    }

    /// Resizes a box and forgets its generated mesh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] on a mesh view.
    pub fn set_box_size(&mut self, width: f64, height: f64, depth: f64) -> Result<()> {
        let Shape3dKind::Box(b) = &mut self.kind else {
            return Err(Error::Unsupported("resizing a mesh view"));
        };
        *b = BoxShape::new(width, height, depth);
        self.box_mesh = None;
        mark_dirty(self, DirtyBits::GEOMETRY | DirtyBits::MESH);
        Ok(())
    }

    /// Points a mesh view at another mesh.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] on a box, whose mesh is generated.
    pub fn set_mesh(&mut self, mesh: Option<MeshId>) -> Result<()> {
        let Shape3dKind::MeshView { mesh: current } = &mut self.kind else {
            return Err(Error::Unsupported("assigning a mesh to a box"));
        };
        if *current != mesh {
            *current = mesh;
            mark_dirty(self, DirtyBits::MESH);
        }
        Ok(())
    }

    /// The mesh this shape renders: a view's mesh, or a box's generated mesh
    /// once resolved.
    #[must_use]
    pub fn mesh(&self) -> Option<MeshId> {
        match &self.kind {
            Shape3dKind::Box(_) => self.box_mesh.map(|(_, id)| id),
            Shape3dKind::MeshView { mesh } => *mesh,
        }
    }

    /// Material, if any.
    #[must_use]
    pub fn material(&self) -> Option<&Material> {
        self.material.as_ref()
    }

    /// Sets the material.
    pub fn set_material(&mut self, material: Option<Material>) {
        self.material = material;
        mark_dirty(self, DirtyBits::MATERIAL);
    }

    /// Draw mode.
    #[must_use]
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    /// Sets the draw mode.
    pub fn set_draw_mode(&mut self, mode: DrawMode) {
        if self.draw_mode != mode {
            self.draw_mode = mode;
            mark_dirty(self, DirtyBits::DRAW_MODE);
        }
    }

    /// Face culling.
    #[must_use]
    pub fn cull_face(&self) -> CullFace {
        self.cull_face
    }

    /// Sets face culling.
    pub fn set_cull_face(&mut self, cull: CullFace) {
        if self.cull_face != cull {
            self.cull_face = cull;
            mark_dirty(self, DirtyBits::CULL_FACE);
        }
    }

    /// Local bounds. A mesh view takes its mesh's cached bounds.
    #[must_use]
    pub fn bounds(&self, meshes: &MeshArena) -> Bounds {
        match &self.kind {
            Shape3dKind::Box(b) => b.bounds(),
            Shape3dKind::MeshView { mesh } => mesh
                .and_then(|id| meshes.get(id))
                .map_or(Bounds::EMPTY, |m| m.compute_bounds()),
        }
    }

    /// Local XY containment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unsupported`] on a mesh view.
    pub fn contains(&self, p: Point) -> Result<bool> {
        match &self.kind {
            Shape3dKind::Box(b) => Ok(b.contains(p)),
            Shape3dKind::MeshView { .. } => Err(Error::Unsupported("contains on a mesh view")),
        }
    }

    /// Picks the shape with `ray` in local space.
    pub fn compute_intersects(
        &self,
        ray: &PickRay,
        chooser: &mut PickResultChooser,
        meshes: &MeshArena,
    ) -> bool {
        match &self.kind {
            Shape3dKind::Box(b) => b.compute_intersects(ray, chooser, self.cull_face),
            Shape3dKind::MeshView { mesh } => mesh
                .and_then(|id| meshes.get(id))
                .is_some_and(|m| m.compute_intersects(ray, chooser, self.cull_face)),
        }
    }

    /// The generated mesh key a box still needs, if any.
    pub(crate) fn pending_box_mesh(&self) -> Option<BoxKey> {
        match &self.kind {
            Shape3dKind::Box(b) if !b.is_degenerate() => {
                let key = b.mesh_key();
                match self.box_mesh {
                    Some((k, _)) if k == key => None,
                    _ => Some(key),
                }
            }
            _ => None,
        }
    }

    pub(crate) fn resolve_box_mesh(&mut self, key: BoxKey, id: MeshId) {
        self.box_mesh = Some((key, id));
        mark_dirty(self, DirtyBits::MESH);
    }

    /// Drops a generated mesh that is no longer alive.
    pub(crate) fn forget_box_mesh(&mut self) {
        if self.box_mesh.take().is_some() {
            mark_dirty(self, DirtyBits::MESH);
        }
    }

    /// Pushes the dirty state to `peer` and clears the pushed bits.
    pub(crate) fn sync_peer(&mut self, peer: &mut dyn Shape3dPeer, fresh: bool) -> bool {
        if fresh {
            self.dirty.insert(SHAPE3D_BITS);
        }
        let pending = self.dirty.intersection(SHAPE3D_BITS);
        if pending.is_empty() {
            return false;
        }
        if pending.contains(DirtyBits::MATERIAL) {
            peer.set_material(self.material.as_ref());
        }
        if pending.contains(DirtyBits::DRAW_MODE) {
            peer.set_draw_mode(self.draw_mode);
        }
        if pending.contains(DirtyBits::CULL_FACE) {
            peer.set_cull_face(self.cull_face);
        }
        if pending.intersects(DirtyBits::MESH | DirtyBits::GEOMETRY) {
            peer.set_mesh(self.mesh());
        } else if pending.contains(DirtyBits::MESH_GEOM) {
            peer.mesh_geometry_changed();
        }
        self.dirty.remove(pending);
        true
    }
}

impl DirtyNode for Shape3d {
    fn dirty_bits(&self) -> DirtyBits {
        self.dirty
    }

    fn dirty_bits_mut(&mut self) -> &mut DirtyBits {
        &mut self.dirty
    }
}
