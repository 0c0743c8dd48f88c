// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flat-array triangle mesh with partial-range dirty tracking.

use core::cell::Cell;
use std::sync::Arc;

use super::refcount::PeerRefCount;
use super::MeshId;
use crate::bounds::Bounds;
use crate::error::{Error, Result};
use crate::math::Vec3;
use crate::peer::{ArrayUpdate, PeerFactory};

/// A pending contiguous update in raw array indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayRange {
    /// First raw index.
    pub index: usize,
    /// Number of raw values.
    pub length: usize,
}

impl ArrayRange {
    fn end(self) -> usize {
        self.index + self.length
    }

    fn merged(self, other: Self) -> Self {
        let index = self.index.min(other.index);
        let end = self.end().max(other.end());
        Self {
            index,
            length: end - index,
        }
    }
}

/// One of the four flat arrays of a mesh.
#[derive(Clone, Debug)]
pub(crate) struct MeshArray<T> {
    name: &'static str,
    element_size: usize,
    data: Vec<T>,
    dirty: bool,
    /// `None` while dirty means the whole array is pending.
    range: Option<ArrayRange>,
}

impl<T: Copy> MeshArray<T> {
    fn new(name: &'static str, element_size: usize) -> Self {
        Self {
            name,
            element_size,
            data: Vec::new(),
            dirty: false,
            range: None,
        }
    }

    /// An array holding `data`, with the whole array pending.
    fn filled(name: &'static str, element_size: usize, data: Vec<T>) -> Self {
        debug_assert!(
            data.len() % element_size == 0,
            "{name}: length {} is not a multiple of {element_size}",
            data.len()
        );
        Self {
            name,
            element_size,
            data,
            dirty: true,
            range: None,
        }
    }

    pub(crate) fn as_slice(&self) -> &[T] {
        &self.data
    }

    fn element_count(&self) -> usize {
        self.data.len() / self.element_size
    }

    fn set_all(&mut self, src: &[T]) -> Result<()> {
        if src.len() % self.element_size != 0 {
            return Err(Error::invalid(
                self.name,
                format!(
                    "length {} is not a multiple of {}",
                    src.len(),
                    self.element_size
                ),
            ));
        }
        self.data.clear();
        self.data.extend_from_slice(src);
        self.mark_full();
        Ok(())
    }

    fn set_range(&mut self, index: usize, src: &[T], start: usize, length: usize) -> Result<()> {
        let src_end = start
            .checked_add(length)
            .filter(|&end| end <= src.len())
            .ok_or_else(|| {
                Error::invalid(
                    self.name,
                    format!(
                        "source range {start}+{length} exceeds source length {}",
                        src.len()
                    ),
                )
            })?;
        let dst_end = index
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::invalid(
                    self.name,
                    format!(
                        "destination range {index}+{length} exceeds array length {}",
                        self.data.len()
                    ),
                )
            })?;
        if length == 0 {
            return Ok(());
        }
        self.data[index..dst_end].copy_from_slice(&src[start..src_end]);

        let new = ArrayRange { index, length };
        if !self.dirty {
            self.dirty = true;
            self.range = Some(new);
        } else if let Some(pending) = self.range {
            self.range = Some(pending.merged(new));
        }
        // Already dirty in full: the whole-array push covers this write.
        Ok(())
    }

    fn copy_all(&self, buf: Option<Vec<T>>) -> Vec<T> {
        let mut out = buf.unwrap_or_default();
        out.clear();
        out.extend_from_slice(&self.data);
        out
    }

    fn copy_range(&self, index: usize, dst: &mut [T], start: usize, length: usize) -> Result<()> {
        let src_end = index
            .checked_add(length)
            .filter(|&end| end <= self.data.len())
            .ok_or_else(|| {
                Error::invalid(
                    self.name,
                    format!(
                        "source range {index}+{length} exceeds array length {}",
                        self.data.len()
                    ),
                )
            })?;
        let dst_end = start
            .checked_add(length)
            .filter(|&end| end <= dst.len())
            .ok_or_else(|| {
                Error::invalid(
                    self.name,
                    format!(
                        "destination range {start}+{length} exceeds buffer length {}",
                        dst.len()
                    ),
                )
            })?;
        dst[start..dst_end].copy_from_slice(&self.data[index..src_end]);
        Ok(())
    }

    fn pending(&self) -> Option<ArrayUpdate<'_, T>> {
        if !self.dirty {
            return None;
        }
        Some(match self.range {
            None => ArrayUpdate::Full(&self.data),
            Some(r) => ArrayUpdate::Range {
                index: r.index,
                data: &self.data[r.index..r.end()],
            },
        })
    }

    fn mark_full(&mut self) {
        self.dirty = true;
        self.range = None;
    }

    fn clear_dirty(&mut self) {
        self.dirty = false;
        self.range = None;
    }
}

/// What a [`TriangleMesh::sync`] call did.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MeshSync {
    /// A new mesh peer was created.
    pub created_peer: bool,
    /// At least one array update was pushed.
    pub pushed: bool,
}

/// A triangle mesh stored as four parallel flat arrays.
///
/// - **points**: 3 values (x, y, z) per vertex.
/// - **texture coordinates**: 2 values (u, v) per coordinate.
/// - **faces**: 6 indices per triangle, alternating point index and texture
///   coordinate index for each of the three corners.
/// - **face smoothing groups**: one 32-bit group mask per triangle. An empty
///   array means every face is in group 1.
///
/// Each array tracks its own dirty flag and pending partial range. Ranged
/// writes issued before a sync are merged into the smallest enclosing range;
/// a whole-array write overrides any pending range. The mesh-level dirty flag
/// gates the whole sync.
#[derive(Debug)]
pub struct TriangleMesh {
    points: MeshArray<f32>,
    tex_coords: MeshArray<f32>,
    faces: MeshArray<i32>,
    smoothing_groups: MeshArray<i32>,
    dirty: bool,
    cached_bounds: Cell<Option<Bounds>>,
    bounds_scans: Cell<usize>,
    refs: Arc<PeerRefCount>,
}

impl Default for TriangleMesh {
    fn default() -> Self {
        Self::new()
    }
}

impl TriangleMesh {
    /// Values per point.
    pub const POINT_ELEMENT_SIZE: usize = 3;
    /// Values per texture coordinate.
    pub const TEX_COORD_ELEMENT_SIZE: usize = 2;
    /// Values per face.
    pub const FACE_ELEMENT_SIZE: usize = 6;

    /// Creates an empty mesh.
    #[must_use]
    pub fn new() -> Self {
        Self {
            points: MeshArray::new("points", Self::POINT_ELEMENT_SIZE),
            tex_coords: MeshArray::new("tex_coords", Self::TEX_COORD_ELEMENT_SIZE),
            faces: MeshArray::new("faces", Self::FACE_ELEMENT_SIZE),
            smoothing_groups: MeshArray::new("face_smoothing_groups", 1),
            dirty: true,
            cached_bounds: Cell::new(None),
            bounds_scans: Cell::new(0),
            refs: Arc::new(PeerRefCount::new()),
        }
    }

    /// Generates the 12-triangle mesh of an axis-aligned box centered at the
    /// origin.
    #[must_use]
    pub fn new_box(width: f32, height: f32, depth: f32) -> Self {
        let (hw, hh, hd) = (width / 2.0, height / 2.0, depth / 2.0);
        #[rustfmt::skip]
        let points = vec![
            -hw, -hh, -hd,
             hw, -hh, -hd,
             hw,  hh, -hd,
            -hw,  hh, -hd,
            -hw, -hh,  hd,
             hw, -hh,  hd,
             hw,  hh,  hd,
            -hw,  hh,  hd,
        ];
        let tex_coords = vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 1.0];
        #[rustfmt::skip]
        let faces = vec![
            0, 0, 2, 2, 1, 1,
            2, 2, 0, 0, 3, 3,
            1, 0, 6, 2, 5, 1,
            6, 2, 1, 0, 2, 3,
            5, 0, 7, 2, 4, 1,
            7, 2, 5, 0, 6, 3,
            4, 0, 3, 2, 0, 1,
            3, 2, 4, 0, 7, 3,
            3, 0, 6, 2, 2, 1,
            6, 2, 3, 0, 7, 3,
            4, 0, 1, 2, 5, 1,
            1, 2, 4, 0, 0, 3,
        ];
        let smoothing = vec![1, 1, 1, 1, 2, 2, 2, 2, 4, 4, 4, 4];

        Self {
            points: MeshArray::filled("points", Self::POINT_ELEMENT_SIZE, points),
            tex_coords: MeshArray::filled("tex_coords", Self::TEX_COORD_ELEMENT_SIZE, tex_coords),
            faces: MeshArray::filled("faces", Self::FACE_ELEMENT_SIZE, faces),
            smoothing_groups: MeshArray::filled("face_smoothing_groups", 1, smoothing),
            ..Self::new()
        }
    }

    // -- Counts --

    /// Number of points.
    #[must_use]
    pub fn point_count(&self) -> usize {
        self.points.element_count()
    }

    /// Number of texture coordinates.
    #[must_use]
    pub fn tex_coord_count(&self) -> usize {
        self.tex_coords.element_count()
    }

    /// Number of triangles.
    #[must_use]
    pub fn face_count(&self) -> usize {
        self.faces.element_count()
    }

    /// Values per point in [`points`](Self::points).
    #[must_use]
    pub const fn point_element_size(&self) -> usize {
        Self::POINT_ELEMENT_SIZE
    }

    /// Values per texture coordinate in [`tex_coords`](Self::tex_coords).
    #[must_use]
    pub const fn tex_coord_element_size(&self) -> usize {
        Self::TEX_COORD_ELEMENT_SIZE
    }

    /// Values per triangle in [`faces`](Self::faces).
    #[must_use]
    pub const fn face_element_size(&self) -> usize {
        Self::FACE_ELEMENT_SIZE
    }

    // -- Whole-array setters --

    /// Replaces all points.
    ///
    /// # Errors
    ///
    /// Fails if the length is not a multiple of 3.
    pub fn set_points(&mut self, points: &[f32]) -> Result<()> {
        self.points.set_all(points)?;
        self.invalidate_bounds();
        self.dirty = true;
        Ok(())
    }

    /// Replaces all texture coordinates.
    ///
    /// # Errors
    ///
    /// Fails if the length is not a multiple of 2.
    pub fn set_tex_coords(&mut self, tex_coords: &[f32]) -> Result<()> {
        self.tex_coords.set_all(tex_coords)?;
        self.dirty = true;
        Ok(())
    }

    /// Replaces all faces.
    ///
    /// # Errors
    ///
    /// Fails if the length is not a multiple of 6.
    pub fn set_faces(&mut self, faces: &[i32]) -> Result<()> {
        self.faces.set_all(faces)?;
        self.dirty = true;
        Ok(())
    }

    /// Replaces the smoothing groups. `None` (or an empty slice) puts every
    /// face in group 1.
    ///
    /// # Errors
    ///
    /// Fails if a non-empty array does not have one entry per face.
    pub fn set_face_smoothing_groups(&mut self, groups: Option<&[i32]>) -> Result<()> {
        let groups = groups.unwrap_or(&[]);
        if !groups.is_empty() && groups.len() != self.face_count() {
            return Err(Error::invalid(
                "face_smoothing_groups",
                format!(
                    "length {} does not match face count {}",
                    groups.len(),
                    self.face_count()
                ),
            ));
        }
        self.smoothing_groups.set_all(groups)?;
        self.dirty = true;
        Ok(())
    }

    // -- Ranged setters --

    /// Copies `src[start..start + length]` into the points at raw `index`.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn set_points_range(
        &mut self,
        index: usize,
        src: &[f32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.points.set_range(index, src, start, length)?;
        self.invalidate_bounds();
        self.dirty = true;
        Ok(())
    }

    /// Ranged write into the texture coordinates.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn set_tex_coords_range(
        &mut self,
        index: usize,
        src: &[f32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.tex_coords.set_range(index, src, start, length)?;
        self.dirty = true;
        Ok(())
    }

    /// Ranged write into the faces.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn set_faces_range(
        &mut self,
        index: usize,
        src: &[i32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.faces.set_range(index, src, start, length)?;
        self.dirty = true;
        Ok(())
    }

    /// Ranged write into the smoothing groups.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn set_face_smoothing_groups_range(
        &mut self,
        index: usize,
        src: &[i32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.smoothing_groups.set_range(index, src, start, length)?;
        self.dirty = true;
        Ok(())
    }

    // -- Getters --

    /// Borrowed view of the points.
    #[must_use]
    pub fn points(&self) -> &[f32] {
        self.points.as_slice()
    }

    /// Borrowed view of the texture coordinates.
    #[must_use]
    pub fn tex_coords(&self) -> &[f32] {
        self.tex_coords.as_slice()
    }

    /// Borrowed view of the faces.
    #[must_use]
    pub fn faces(&self) -> &[i32] {
        self.faces.as_slice()
    }

    /// Borrowed view of the smoothing groups.
    #[must_use]
    pub fn face_smoothing_groups(&self) -> &[i32] {
        self.smoothing_groups.as_slice()
    }

    /// Copies the points, reusing `buf`'s allocation when given.
    #[must_use]
    pub fn copy_points(&self, buf: Option<Vec<f32>>) -> Vec<f32> {
        self.points.copy_all(buf)
    }

    /// Copies the texture coordinates, reusing `buf`'s allocation when given.
    #[must_use]
    pub fn copy_tex_coords(&self, buf: Option<Vec<f32>>) -> Vec<f32> {
        self.tex_coords.copy_all(buf)
    }

    /// Copies the faces, reusing `buf`'s allocation when given.
    #[must_use]
    pub fn copy_faces(&self, buf: Option<Vec<i32>>) -> Vec<i32> {
        self.faces.copy_all(buf)
    }

    /// Copies the smoothing groups, reusing `buf`'s allocation when given.
    #[must_use]
    pub fn copy_face_smoothing_groups(&self, buf: Option<Vec<i32>>) -> Vec<i32> {
        self.smoothing_groups.copy_all(buf)
    }

    /// Copies `length` points values starting at raw `index` into
    /// `dst[start..]`.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn copy_points_range(
        &self,
        index: usize,
        dst: &mut [f32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.points.copy_range(index, dst, start, length)
    }

    /// Ranged copy out of the texture coordinates.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn copy_tex_coords_range(
        &self,
        index: usize,
        dst: &mut [f32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.tex_coords.copy_range(index, dst, start, length)
    }

    /// Ranged copy out of the faces.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn copy_faces_range(
        &self,
        index: usize,
        dst: &mut [i32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.faces.copy_range(index, dst, start, length)
    }

    /// Ranged copy out of the smoothing groups.
    ///
    /// # Errors
    ///
    /// Fails without copying if either range is out of bounds.
    pub fn copy_face_smoothing_groups_range(
        &self,
        index: usize,
        dst: &mut [i32],
        start: usize,
        length: usize,
    ) -> Result<()> {
        self.smoothing_groups.copy_range(index, dst, start, length)
    }

    // -- Validity --

    /// Whether the mesh can be rendered: every face refers to existing points
    /// and texture coordinates, and the smoothing groups (if any) have one
    /// entry per face.
    #[must_use]
    pub fn validate(&self) -> bool {
        let points = self.point_count();
        let tex_coords = self.tex_coord_count();
        let in_range = |i: i32, n: usize| usize::try_from(i).is_ok_and(|i| i < n);
        let faces_ok = self
            .faces()
            .chunks_exact(2)
            .all(|pair| in_range(pair[0], points) && in_range(pair[1], tex_coords));
        let groups = self.smoothing_groups.as_slice().len();
        faces_ok && (groups == 0 || groups == self.face_count())
    }

    // -- Dirty state --

    /// Whether anything changed since the last sync.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Sets the mesh-level dirty flag.
    ///
    /// Setting `true` schedules a full push of every array. Setting `false`
    /// drops all pending array state without pushing it; the cached bounds
    /// stay valid.
    pub fn set_dirty(&mut self, dirty: bool) {
        self.dirty = dirty;
        if dirty {
            self.points.mark_full();
            self.tex_coords.mark_full();
            self.faces.mark_full();
            self.smoothing_groups.mark_full();
            self.invalidate_bounds();
        } else {
            self.clear_all_dirty();
        }
    }

    /// Pending range of the points array. `None` when clean or when the
    /// whole array is pending.
    #[must_use]
    pub fn pending_points_range(&self) -> Option<ArrayRange> {
        self.points.range
    }

    // -- Bounds --

    /// Axis-aligned bounds of all points. Empty for a mesh with no points.
    ///
    /// The result is cached until the points change.
    pub fn compute_bounds(&self) -> Bounds {
        if let Some(bounds) = self.cached_bounds.get() {
            return bounds;
        }
        let mut bounds = Bounds::EMPTY;
        for p in self.points().chunks_exact(3) {
            bounds.add_point(Vec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])));
        }
        self.bounds_scans.set(self.bounds_scans.get() + 1);
        tracing::trace!(points = self.point_count(), "recomputed mesh bounds");
        self.cached_bounds.set(Some(bounds));
        bounds
    }

    /// Number of full point scans performed by [`compute_bounds`](Self::compute_bounds).
    #[must_use]
    pub fn bounds_scans(&self) -> usize {
        self.bounds_scans.get()
    }

    fn invalidate_bounds(&self) {
        self.cached_bounds.set(None);
    }

    // -- Peer --

    /// Shared handle to the peer reference count.
    ///
    /// Clones may be moved to a rendering thread to drop references there.
    #[must_use]
    pub fn ref_count(&self) -> Arc<PeerRefCount> {
        Arc::clone(&self.refs)
    }

    pub(crate) fn refs(&self) -> &PeerRefCount {
        &self.refs
    }

    /// Pushes dirty arrays to the mesh peer.
    ///
    /// Does nothing while no node references the mesh. A freshly created peer
    /// receives every array in full; otherwise each dirty array is pushed in
    /// full or as its merged pending range. All dirty state is cleared
    /// together once the four arrays have been handled.
    pub fn sync(&mut self, id: MeshId, factory: &mut dyn PeerFactory) -> MeshSync {
        let refs = Arc::clone(&self.refs);
        let outcome = refs.with_peer(
            || factory.create_mesh_peer(id),
            |peer, fresh| {
                if fresh {
                    self.points.mark_full();
                    self.tex_coords.mark_full();
                    self.faces.mark_full();
                    self.smoothing_groups.mark_full();
                } else if !self.dirty {
                    return MeshSync::default();
                }
                if let Some(update) = self.points.pending() {
                    peer.update_points(update);
                }
                if let Some(update) = self.tex_coords.pending() {
                    peer.update_tex_coords(update);
                }
                if let Some(update) = self.faces.pending() {
                    peer.update_faces(update);
                }
                if let Some(update) = self.smoothing_groups.pending() {
                    peer.update_face_smoothing_groups(update);
                }
                MeshSync {
                    created_peer: fresh,
                    pushed: true,
                }
            },
        );
        let outcome = outcome.unwrap_or_default();
        if outcome.pushed {
            tracing::debug!(?id, faces = self.face_count(), "mesh synced");
            self.clear_all_dirty();
        }
        outcome
    }

    fn clear_all_dirty(&mut self) {
        self.points.clear_dirty();
        self.tex_coords.clear_dirty();
        self.faces.clear_dirty();
        self.smoothing_groups.clear_dirty();
        self.dirty = false;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;
    use crate::peer::{MeshPeer, Shape3dPeer, ShapePeer};

    #[derive(Clone, Debug, PartialEq)]
    enum Pushed {
        Points(usize, usize),
        TexCoords(usize, usize),
        Faces(usize, usize),
        Groups(usize, usize),
    }

    struct LogPeer(Arc<Mutex<Vec<Pushed>>>);

    impl MeshPeer for LogPeer {
        fn update_points(&mut self, u: ArrayUpdate<'_, f32>) {
            self.0.lock().push(Pushed::Points(u.index(), u.len()));
        }
        fn update_tex_coords(&mut self, u: ArrayUpdate<'_, f32>) {
            self.0.lock().push(Pushed::TexCoords(u.index(), u.len()));
        }
        fn update_faces(&mut self, u: ArrayUpdate<'_, i32>) {
            self.0.lock().push(Pushed::Faces(u.index(), u.len()));
        }
        fn update_face_smoothing_groups(&mut self, u: ArrayUpdate<'_, i32>) {
            self.0.lock().push(Pushed::Groups(u.index(), u.len()));
        }
        fn release(&mut self) {}
    }

    struct MeshOnlyFactory(Arc<Mutex<Vec<Pushed>>>);

    impl PeerFactory for MeshOnlyFactory {
        fn create_shape_peer(&mut self) -> Box<dyn ShapePeer> {
            unreachable!("meshes only")
        }
        fn create_shape3d_peer(&mut self) -> Box<dyn Shape3dPeer> {
            unreachable!("meshes only")
        }
        fn create_mesh_peer(&mut self, _: MeshId) -> Box<dyn MeshPeer> {
            Box::new(LogPeer(Arc::clone(&self.0)))
        }
    }

    const ID: MeshId = MeshId {
        idx: 0,
        generation: 0,
    };

    fn referenced_mesh() -> (TriangleMesh, MeshOnlyFactory, Arc<Mutex<Vec<Pushed>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut factory = MeshOnlyFactory(Arc::clone(&log));
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[0.0; 60]).expect("points");
        mesh.set_tex_coords(&[0.0; 4]).expect("tex coords");
        mesh.set_faces(&[0; 12]).expect("faces");
        mesh.refs().inc_ref();
        let first = mesh.sync(ID, &mut factory);
        assert!(first.created_peer && first.pushed);
        log.lock().clear();
        (mesh, factory, log)
    }

    #[test]
    fn set_then_get_is_identical() {
        let mut mesh = TriangleMesh::new();
        let points = [0.5, -1.0, 2.0, 3.0, 4.0, 5.25];
        mesh.set_points(&points).expect("valid points");
        mesh.set_tex_coords(&[0.0, 1.0]).expect("valid tex coords");
        mesh.set_faces(&[0, 0, 1, 0, 0, 0]).expect("valid faces");
        assert_eq!(mesh.copy_points(None), points);
        assert_eq!(mesh.faces(), &[0, 0, 1, 0, 0, 0]);
        assert_eq!(mesh.point_count(), 2);
        assert_eq!(mesh.tex_coord_count(), 1);
        assert_eq!(mesh.face_count(), 1);
        assert_eq!(
            mesh.point_count() * mesh.point_element_size(),
            mesh.points().len()
        );
        assert_eq!(mesh.tex_coord_element_size(), 2);
        assert_eq!(mesh.face_element_size(), 6);
    }

    #[test]
    fn wrong_modulus_is_rejected_without_mutation() {
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[1.0, 2.0, 3.0]).expect("valid");
        let err = mesh.set_points(&[1.0, 2.0]).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { what: "points", .. }));
        assert_eq!(mesh.points(), &[1.0, 2.0, 3.0]);
        assert!(mesh.set_faces(&[0; 7]).is_err());
        assert!(mesh.set_tex_coords(&[0.0; 3]).is_err());
    }

    #[test]
    fn smoothing_groups_must_match_faces() {
        let mut mesh = TriangleMesh::new();
        mesh.set_faces(&[0; 12]).expect("two faces");
        assert!(mesh.set_face_smoothing_groups(Some(&[1])).is_err());
        mesh.set_face_smoothing_groups(Some(&[1, 2])).expect("matching");
        mesh.set_face_smoothing_groups(None).expect("uniform");
        assert!(mesh.face_smoothing_groups().is_empty());
    }

    #[test]
    fn ranged_set_checks_bounds_before_copying() {
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[0.0; 6]).expect("valid");
        let src = [9.0; 4];
        assert!(mesh.set_points_range(4, &src, 0, 3).is_err(), "past the end");
        assert!(mesh.set_points_range(0, &src, 2, 3).is_err(), "past source");
        assert!(mesh.set_points_range(usize::MAX, &src, 0, 2).is_err(), "overflow");
        assert_eq!(mesh.points(), &[0.0; 6], "nothing copied on failure");

        mesh.set_points_range(2, &src, 1, 3).expect("in bounds");
        assert_eq!(mesh.points(), &[0.0, 0.0, 9.0, 9.0, 9.0, 0.0]);
        assert_eq!(mesh.point_count(), 2, "ranged writes never grow");
    }

    #[test]
    fn ranged_get_checks_bounds() {
        let mut mesh = TriangleMesh::new();
        mesh.set_faces(&[1, 2, 3, 4, 5, 6]).expect("valid");
        let mut dst = [0; 4];
        mesh.copy_faces_range(2, &mut dst, 1, 3).expect("in bounds");
        assert_eq!(dst, [0, 3, 4, 5]);
        assert!(mesh.copy_faces_range(4, &mut dst, 0, 3).is_err());
        assert!(mesh.copy_faces_range(0, &mut dst, 2, 3).is_err());
    }

    #[test]
    fn disjoint_ranges_merge_to_enclosing_range() {
        let (mut mesh, mut factory, log) = referenced_mesh();
        let src = [1.0; 5];
        mesh.set_points_range(0, &src, 0, 5).expect("first");
        mesh.set_points_range(10, &src, 0, 5).expect("second");
        assert_eq!(
            mesh.pending_points_range(),
            Some(ArrayRange {
                index: 0,
                length: 15
            })
        );
        let outcome = mesh.sync(ID, &mut factory);
        assert!(outcome.pushed && !outcome.created_peer);
        assert_eq!(*log.lock(), vec![Pushed::Points(0, 15)]);
        assert!(!mesh.is_dirty());
        assert_eq!(mesh.pending_points_range(), None);
    }

    #[test]
    fn full_write_overrides_pending_range() {
        let (mut mesh, mut factory, log) = referenced_mesh();
        mesh.set_points_range(3, &[1.0; 3], 0, 3).expect("ranged");
        mesh.set_points(&[2.0; 60]).expect("full");
        mesh.set_points_range(6, &[1.0; 3], 0, 3).expect("ranged after full");
        mesh.sync(ID, &mut factory);
        assert_eq!(*log.lock(), vec![Pushed::Points(0, 60)]);
    }

    #[test]
    fn clean_mesh_sync_is_a_no_op() {
        let (mut mesh, mut factory, log) = referenced_mesh();
        let outcome = mesh.sync(ID, &mut factory);
        assert_eq!(outcome, MeshSync::default());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn only_dirty_arrays_are_pushed() {
        let (mut mesh, mut factory, log) = referenced_mesh();
        mesh.set_faces_range(6, &[1, 1], 0, 2).expect("ranged");
        mesh.set_tex_coords(&[0.5; 4]).expect("full");
        mesh.sync(ID, &mut factory);
        assert_eq!(
            *log.lock(),
            vec![Pushed::TexCoords(0, 4), Pushed::Faces(6, 2)]
        );
    }

    #[test]
    fn peer_recreated_after_release_gets_full_arrays() {
        let (mut mesh, mut factory, log) = referenced_mesh();
        mesh.refs().dec_ref();
        mesh.set_points_range(0, &[1.0; 3], 0, 3).expect("ranged");
        assert_eq!(mesh.sync(ID, &mut factory), MeshSync::default());

        mesh.refs().inc_ref();
        let outcome = mesh.sync(ID, &mut factory);
        assert!(outcome.created_peer);
        assert_eq!(
            *log.lock(),
            vec![
                Pushed::Points(0, 60),
                Pushed::TexCoords(0, 4),
                Pushed::Faces(0, 12),
                Pushed::Groups(0, 0),
            ]
        );
    }

    #[test]
    fn bounds_are_cached_until_points_change() {
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[-1.0, 0.0, 2.0, 3.0, 4.0, -5.0]).expect("valid");
        let first = mesh.compute_bounds();
        assert_eq!(first.min, Vec3::new(-1.0, 0.0, -5.0));
        assert_eq!(first.max, Vec3::new(3.0, 4.0, 2.0));
        assert_eq!(mesh.compute_bounds(), first);
        assert_eq!(mesh.bounds_scans(), 1);

        mesh.set_dirty(false);
        assert_eq!(mesh.compute_bounds(), first);
        assert_eq!(mesh.bounds_scans(), 1, "no rescan after set_dirty(false)");

        mesh.set_points_range(0, &[-7.0], 0, 1).expect("one coordinate");
        let moved = mesh.compute_bounds();
        assert_ne!(moved, first);
        assert_eq!(moved.min.x, -7.0);
        assert_eq!(mesh.bounds_scans(), 2);
    }

    #[test]
    fn empty_mesh_has_empty_bounds() {
        assert!(TriangleMesh::new().compute_bounds().is_empty());
    }

    #[test]
    fn generated_box_is_valid() {
        let mesh = TriangleMesh::new_box(2.0, 4.0, 6.0);
        assert_eq!(mesh.point_count(), 8);
        assert_eq!(mesh.tex_coord_count(), 4);
        assert_eq!(mesh.face_count(), 12);
        assert_eq!(mesh.smoothing_groups.as_slice().len(), 12);
        assert!(mesh.validate());
        assert!(mesh.is_dirty());
        assert!(mesh.points.dirty && mesh.faces.dirty, "every array starts fully pending");
        assert!(mesh.tex_coords.dirty && mesh.smoothing_groups.dirty);
        assert_eq!(mesh.pending_points_range(), None);
        let b = mesh.compute_bounds();
        assert_eq!(b.min, Vec3::new(-1.0, -2.0, -3.0));
        assert_eq!(b.max, Vec3::new(1.0, 2.0, 3.0));
    }

    #[test]
    fn validate_catches_out_of_range_indices() {
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[0.0; 9]).expect("three points");
        mesh.set_tex_coords(&[0.0; 2]).expect("one tex coord");
        mesh.set_faces(&[0, 0, 1, 0, 2, 0]).expect("valid");
        assert!(mesh.validate());
        mesh.set_faces(&[0, 0, 1, 0, 3, 0]).expect("structurally valid");
        assert!(!mesh.validate());
        mesh.set_faces(&[0, 0, 1, 1, 2, 0]).expect("structurally valid");
        assert!(!mesh.validate());
    }
}
