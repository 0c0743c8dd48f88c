// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A peer factory that records every push instead of rendering.

use core::fmt;
use std::sync::Arc;

use kurbo::BezPath;
use parking_lot::Mutex;
use tableau_core::mesh::MeshId;
use tableau_core::paint::{Material, Paint};
use tableau_core::peer::{ArrayUpdate, MeshPeer, PeerFactory, Shape3dPeer, ShapePeer};
use tableau_core::pick::CullFace;
use tableau_core::shape::{FillRule, ShapeMode, StrokeStyle};
use tableau_core::shape3d::DrawMode;
use tableau_core::transform::Transform3d;

/// Identifies the peer an event was delivered to.
///
/// Node peers are numbered in creation order per kind, since the factory is
/// not told which node it is creating a peer for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PeerKey {
    /// The n-th 2D shape peer created.
    Shape(u32),
    /// The n-th 3D shape peer created.
    Shape3d(u32),
    /// The peer of a mesh.
    Mesh(MeshId),
}

impl fmt::Display for PeerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape(n) => write!(f, "shape#{n}"),
            Self::Shape3d(n) => write!(f, "shape3d#{n}"),
            Self::Mesh(id) => write!(f, "mesh#{}", id.index()),
        }
    }
}

/// One of the four flat mesh arrays.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MeshArray {
    /// Vertex positions.
    Points,
    /// Texture coordinates.
    TexCoords,
    /// Face indices.
    Faces,
    /// Per-face smoothing group masks.
    FaceSmoothingGroups,
}

impl MeshArray {
    const fn name(self) -> &'static str {
        match self {
            Self::Points => "points",
            Self::TexCoords => "tex_coords",
            Self::Faces => "faces",
            Self::FaceSmoothingGroups => "face_smoothing_groups",
        }
    }
}

/// Shape of one mesh array update, without its data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ArrayWrite {
    /// Whether the whole array was sent.
    pub full: bool,
    /// First raw index written.
    pub index: usize,
    /// Number of raw values written.
    pub len: usize,
}

impl ArrayWrite {
    fn of<T>(update: &ArrayUpdate<'_, T>) -> Self {
        Self {
            full: matches!(update, ArrayUpdate::Full(_)),
            index: update.index(),
            len: update.len(),
        }
    }
}

/// Something a sync pass did to a peer.
#[derive(Clone, Debug, PartialEq)]
pub enum SyncEvent {
    /// The factory created a peer.
    Created(PeerKey),
    /// A shape outline was pushed, with its element count.
    Geometry(PeerKey, usize, FillRule),
    /// A shape paint mode was pushed.
    Mode(PeerKey, ShapeMode),
    /// A fill paint was pushed.
    FillPaint(PeerKey, Option<Paint>),
    /// A stroke paint was pushed.
    DrawPaint(PeerKey, Option<Paint>),
    /// Stroke attributes were pushed.
    DrawStroke(PeerKey, StrokeStyle),
    /// The antialiasing hint was pushed.
    Smooth(PeerKey, bool),
    /// A world transform was pushed.
    Transform(PeerKey, Transform3d),
    /// A material was pushed; `true` when one was set.
    Material(PeerKey, bool),
    /// A draw mode was pushed.
    DrawMode(PeerKey, DrawMode),
    /// A cull face was pushed.
    CullFace(PeerKey, CullFace),
    /// A mesh binding was pushed.
    BindMesh(PeerKey, Option<MeshId>),
    /// A bound mesh's contents changed.
    MeshGeometryChanged(PeerKey),
    /// A mesh array update.
    MeshArray(MeshId, MeshArray, ArrayWrite),
    /// A peer was released.
    Released(PeerKey),
}

impl SyncEvent {
    /// The peer that received the event.
    #[must_use]
    pub fn peer(&self) -> PeerKey {
        match self {
            Self::Created(p)
            | Self::Geometry(p, ..)
            | Self::Mode(p, _)
            | Self::FillPaint(p, _)
            | Self::DrawPaint(p, _)
            | Self::DrawStroke(p, _)
            | Self::Smooth(p, _)
            | Self::Transform(p, _)
            | Self::Material(p, _)
            | Self::DrawMode(p, _)
            | Self::CullFace(p, _)
            | Self::BindMesh(p, _)
            | Self::MeshGeometryChanged(p)
            | Self::Released(p) => *p,
            Self::MeshArray(id, ..) => PeerKey::Mesh(*id),
        }
    }
}

impl fmt::Display for SyncEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let peer = self.peer();
        match self {
            Self::Created(_) => write!(f, "{peer} created"),
            Self::Geometry(_, n, rule) => write!(f, "{peer} geometry {n} elements {rule:?}"),
            Self::Mode(_, mode) => write!(f, "{peer} mode {mode:?}"),
            Self::FillPaint(_, p) => write!(f, "{peer} fill {}", set_or(p.is_some(), "none")),
            Self::DrawPaint(_, p) => write!(f, "{peer} stroke {}", set_or(p.is_some(), "none")),
            Self::DrawStroke(_, s) => write!(f, "{peer} stroke width {}", s.width()),
            Self::Smooth(_, s) => write!(f, "{peer} smooth {s}"),
            Self::Transform(..) => write!(f, "{peer} transform"),
            Self::Material(_, set) => write!(f, "{peer} material {}", set_or(*set, "default")),
            Self::DrawMode(_, m) => write!(f, "{peer} draw mode {m:?}"),
            Self::CullFace(_, c) => write!(f, "{peer} cull {c:?}"),
            Self::BindMesh(_, Some(id)) => write!(f, "{peer} mesh {}", id.index()),
            Self::BindMesh(_, None) => write!(f, "{peer} mesh none"),
            Self::MeshGeometryChanged(_) => write!(f, "{peer} mesh geometry changed"),
            Self::MeshArray(_, array, w) if w.full => {
                write!(f, "{peer} {} full {}", array.name(), w.len)
            }
            Self::MeshArray(_, array, w) => {
                write!(f, "{peer} {}[{}+{}]", array.name(), w.index, w.len)
            }
            Self::Released(_) => write!(f, "{peer} released"),
        }
    }
}

fn set_or(set: bool, unset: &'static str) -> &'static str {
    if set { "set" } else { unset }
}

/// Shared, append-only event log.
///
/// Cloning yields another handle to the same log, so a test can keep one
/// while the factory and its peers hold others.
#[derive(Clone, Debug, Default)]
pub struct SyncLog(Arc<Mutex<Vec<SyncEvent>>>);

impl SyncLog {
    fn push(&self, event: SyncEvent) {
        self.0.lock().push(event);
    }

    /// Removes and returns everything recorded so far.
    #[must_use]
    pub fn take(&self) -> Vec<SyncEvent> {
        core::mem::take(&mut *self.0.lock())
    }

    /// A copy of everything recorded so far.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SyncEvent> {
        self.0.lock().clone()
    }

    /// Number of recorded events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }

    /// Updates of one mesh array, in order.
    #[must_use]
    pub fn array_writes(&self, mesh: MeshId, array: MeshArray) -> Vec<ArrayWrite> {
        self.0
            .lock()
            .iter()
            .filter_map(|e| match e {
                SyncEvent::MeshArray(id, a, w) if *id == mesh && *a == array => Some(*w),
                _ => None,
            })
            .collect()
    }

    /// Events delivered to `peer`, in order.
    #[must_use]
    pub fn events_for(&self, peer: PeerKey) -> Vec<SyncEvent> {
        self.0
            .lock()
            .iter()
            .filter(|e| e.peer() == peer)
            .cloned()
            .collect()
    }

    /// The log as one line per event.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::new();
        for event in self.0.lock().iter() {
            out.push_str(&event.to_string());
            out.push('\n');
        }
        out
    }
}

/// A [`PeerFactory`] whose peers append to a [`SyncLog`].
#[derive(Debug, Default)]
pub struct RecordingFactory {
    log: SyncLog,
    shapes: u32,
    shapes3d: u32,
}

impl RecordingFactory {
    /// Creates a factory with an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A handle to the log.
    #[must_use]
    pub fn log(&self) -> SyncLog {
        self.log.clone()
    }

    fn peer(&self, key: PeerKey) -> RecordingPeer {
        self.log.push(SyncEvent::Created(key));
        RecordingPeer {
            key,
            log: self.log.clone(),
        }
    }
}

impl PeerFactory for RecordingFactory {
    fn create_shape_peer(&mut self) -> Box<dyn ShapePeer> {
        let key = PeerKey::Shape(self.shapes);
        self.shapes += 1;
        Box::new(self.peer(key))
    }

    fn create_shape3d_peer(&mut self) -> Box<dyn Shape3dPeer> {
        let key = PeerKey::Shape3d(self.shapes3d);
        self.shapes3d += 1;
        Box::new(self.peer(key))
    }

    fn create_mesh_peer(&mut self, mesh: MeshId) -> Box<dyn MeshPeer> {
        Box::new(self.peer(PeerKey::Mesh(mesh)))
    }
}

#[derive(Debug)]
struct RecordingPeer {
    key: PeerKey,
    log: SyncLog,
}

impl RecordingPeer {
    fn mesh_write<T>(&self, array: MeshArray, update: &ArrayUpdate<'_, T>) {
        if let PeerKey::Mesh(id) = self.key {
            let write = ArrayWrite::of(update);
            self.log.push(SyncEvent::MeshArray(id, array, write));
        }
    }
}

impl ShapePeer for RecordingPeer {
    fn set_geometry(&mut self, outline: &BezPath, fill_rule: FillRule) {
        let elements = outline.elements().len();
        self.log
            .push(SyncEvent::Geometry(self.key, elements, fill_rule));
    }

    fn set_mode(&mut self, mode: ShapeMode) {
        self.log.push(SyncEvent::Mode(self.key, mode));
    }

    fn set_fill_paint(&mut self, paint: Option<&Paint>) {
        self.log.push(SyncEvent::FillPaint(self.key, paint.cloned()));
    }

    fn set_draw_paint(&mut self, paint: Option<&Paint>) {
        self.log.push(SyncEvent::DrawPaint(self.key, paint.cloned()));
    }

    fn set_draw_stroke(&mut self, style: &StrokeStyle) {
        self.log.push(SyncEvent::DrawStroke(self.key, style.clone()));
    }

    fn set_smooth(&mut self, smooth: bool) {
        self.log.push(SyncEvent::Smooth(self.key, smooth));
    }

    fn set_transform(&mut self, transform: &Transform3d) {
        self.log.push(SyncEvent::Transform(self.key, *transform));
    }

    fn release(&mut self) {
        self.log.push(SyncEvent::Released(self.key));
    }
}

impl Shape3dPeer for RecordingPeer {
    fn set_material(&mut self, material: Option<&Material>) {
        self.log
            .push(SyncEvent::Material(self.key, material.is_some()));
    }

    fn set_draw_mode(&mut self, mode: DrawMode) {
        self.log.push(SyncEvent::DrawMode(self.key, mode));
    }

    fn set_cull_face(&mut self, cull: CullFace) {
        self.log.push(SyncEvent::CullFace(self.key, cull));
    }

    fn set_mesh(&mut self, mesh: Option<MeshId>) {
        self.log.push(SyncEvent::BindMesh(self.key, mesh));
    }

    fn mesh_geometry_changed(&mut self) {
        self.log.push(SyncEvent::MeshGeometryChanged(self.key));
    }

    fn set_transform(&mut self, transform: &Transform3d) {
        self.log.push(SyncEvent::Transform(self.key, *transform));
    }

    fn release(&mut self) {
        self.log.push(SyncEvent::Released(self.key));
    }
}

impl MeshPeer for RecordingPeer {
    fn update_points(&mut self, update: ArrayUpdate<'_, f32>) {
        self.mesh_write(MeshArray::Points, &update);
    }

    fn update_tex_coords(&mut self, update: ArrayUpdate<'_, f32>) {
        self.mesh_write(MeshArray::TexCoords, &update);
    }

    fn update_faces(&mut self, update: ArrayUpdate<'_, i32>) {
        self.mesh_write(MeshArray::Faces, &update);
    }

    fn update_face_smoothing_groups(&mut self, update: ArrayUpdate<'_, i32>) {
        self.mesh_write(MeshArray::FaceSmoothingGroups, &update);
    }

    fn release(&mut self) {
        self.log.push(SyncEvent::Released(self.key));
    }
}
