// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! 2D shapes.
//!
//! A [`Shape`] pairs a [`ShapeKind`] geometry with paint and stroke state.
//! Its [`ShapeMode`] is derived from which paints are present and decides
//! what the bounds, containment and area computations include:
//!
//! | mode          | fill | stroke |
//! |---------------|------|--------|
//! | `Empty`       |      |        |
//! | `Fill`        | yes  |        |
//! | `Stroke`      |      | yes    |
//! | `StrokeFill`  | yes  | yes    |
//!
//! An inside stroke never extends past the fill, so wherever both would be
//! included it is folded into the fill.

mod algebra;
mod area;
mod bounds;
mod kind;
mod path;
mod stroke;

use core::cell::OnceCell;

use kurbo::{Affine, BezPath, Point, Shape as _};

pub use algebra::{intersect, subtract, union};
pub use area::Area;
pub use kind::{
    Arc, ArcType, Circle, CubicCurve, Ellipse, Line, Polygon, Polyline, QuadCurve, Rectangle,
    ShapeKind,
};
pub use path::{FillRule, Path, PathElement, SvgPath};
pub use stroke::{
    MIN_STROKE_MITER_LIMIT, MIN_STROKE_WIDTH, StrokeLineCap, StrokeLineJoin, StrokeStyle,
    StrokeType,
};

use crate::config::GeometryConfig;
use crate::dirty::{DirtyBits, DirtyNode, mark_dirty};
use crate::error::Result;
use crate::paint::Paint;
use crate::peer::ShapePeer;
use crate::pick::{PickRay, PickResultChooser};

/// Tolerance for converting arcs to cubic Béziers when building outlines.
pub(crate) const ARC_TOLERANCE: f64 = 1e-4;

/// Every bit a 2D shape pushes to its peer.
const SHAPE_BITS: DirtyBits = DirtyBits::GEOMETRY
    .union(DirtyBits::SHAPE_FILL)
    .union(DirtyBits::SHAPE_STROKE)
    .union(DirtyBits::STROKE_ATTRS)
    .union(DirtyBits::SHAPE_MODE)
    .union(DirtyBits::NODE_SMOOTH);

/// Which of fill and stroke a shape draws.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ShapeMode {
    /// Neither.
    #[default]
    Empty,
    /// Fill only.
    Fill,
    /// Stroke only.
    Stroke,
    /// Both.
    StrokeFill,
}

impl ShapeMode {
    /// Derives the mode from paint presence.
    #[must_use]
    pub const fn from_paints(has_fill: bool, has_stroke: bool) -> Self {
        match (has_fill, has_stroke) {
            (true, true) => Self::StrokeFill,
            (true, false) => Self::Fill,
            (false, true) => Self::Stroke,
            (false, false) => Self::Empty,
        }
    }

    /// Whether the fill is drawn.
    #[must_use]
    pub const fn has_fill(self) -> bool {
        matches!(self, Self::Fill | Self::StrokeFill)
    }

    /// Whether the stroke is drawn.
    #[must_use]
    pub const fn has_stroke(self) -> bool {
        matches!(self, Self::Stroke | Self::StrokeFill)
    }
}

/// A 2D shape node's content.
#[derive(Clone, Debug)]
pub struct Shape {
    kind: ShapeKind,
    fill: Option<Paint>,
    stroke: Option<Paint>,
    stroke_style: StrokeStyle,
    smooth: bool,
    mode: ShapeMode,
    dirty: DirtyBits,
    outline: OnceCell<BezPath>,
}

impl Shape {
    /// Creates a shape with the default paints for its kind.
    #[must_use]
    pub fn new(kind: ShapeKind) -> Self {
        let (fill, stroke) = kind.default_paints();
        let mode = ShapeMode::from_paints(fill.is_some(), stroke.is_some());
        Self {
            kind,
            fill,
            stroke,
            stroke_style: StrokeStyle::default(),
            smooth: true,
            mode,
            dirty: SHAPE_BITS,
            outline: OnceCell::new(),
        }
    }

    /// Plain rectangle.
    #[must_use]
    pub fn rectangle(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(ShapeKind::Rectangle(Rectangle {
            x,
            y,
            width,
            height,
            arc_width: 0.0,
            arc_height: 0.0,
        }))
    }

    /// Circle.
    #[must_use]
    pub fn circle(center_x: f64, center_y: f64, radius: f64) -> Self {
        Self::new(ShapeKind::Circle(Circle {
            center_x,
            center_y,
            radius,
        }))
    }

    /// Ellipse.
    #[must_use]
    pub fn ellipse(center_x: f64, center_y: f64, radius_x: f64, radius_y: f64) -> Self {
        Self::new(ShapeKind::Ellipse(Ellipse {
            center_x,
            center_y,
            radius_x,
            radius_y,
        }))
    }

    /// Line segment. Stroked, not filled.
    #[must_use]
    pub fn line(start_x: f64, start_y: f64, end_x: f64, end_y: f64) -> Self {
        Self::new(ShapeKind::Line(Line {
            start_x,
            start_y,
            end_x,
            end_y,
        }))
    }

    /// Closed polygon from flat coordinates.
    #[must_use]
    pub fn polygon(points: Vec<f64>) -> Self {
        Self::new(ShapeKind::Polygon(Polygon { points }))
    }

    /// Open polyline from flat coordinates. Stroked, not filled.
    #[must_use]
    pub fn polyline(points: Vec<f64>) -> Self {
        Self::new(ShapeKind::Polyline(Polyline { points }))
    }

    /// Path. Stroked, not filled.
    #[must_use]
    pub fn path(path: Path) -> Self {
        Self::new(ShapeKind::Path(path))
    }

    /// Shape from SVG path data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgPath`](crate::Error::SvgPath) for malformed data.
    pub fn svg_path(content: &str) -> Result<Self> {
        Ok(Self::new(ShapeKind::SvgPath(SvgPath::new(content)?)))
    }

    /// The geometry.
    #[must_use]
    pub fn kind(&self) -> &ShapeKind {
        &self.kind
    }

    /// Replaces the geometry.
    pub fn set_kind(&mut self, kind: ShapeKind) {
        *self.geometry_mut() = kind;
    }

    /// Mutable access to the geometry. Marks it changed.
    pub fn geometry_mut(&mut self) -> &mut ShapeKind {
        mark_dirty(self, DirtyBits::GEOMETRY);
        self.outline = OnceCell::new();
        &mut self.kind
    }

    /// Fill paint.
    #[must_use]
    pub fn fill(&self) -> Option<&Paint> {
        self.fill.as_ref()
    }

    /// Sets the fill paint. `None` stops filling.
    pub fn set_fill(&mut self, paint: Option<Paint>) {
        self.fill = paint;
        mark_dirty(self, DirtyBits::SHAPE_FILL);
        self.update_mode();
    }

    /// Stroke paint.
    #[must_use]
    pub fn stroke(&self) -> Option<&Paint> {
        self.stroke.as_ref()
    }

    /// Sets the stroke paint. `None` stops stroking.
    pub fn set_stroke(&mut self, paint: Option<Paint>) {
        self.stroke = paint;
        mark_dirty(self, DirtyBits::SHAPE_STROKE);
        self.update_mode();
    }

    /// Stroke attributes.
    #[must_use]
    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke_style
    }

    /// Replaces all stroke attributes.
    pub fn set_stroke_style(&mut self, style: StrokeStyle) {
        *self.stroke_style_mut() = style;
    }

    /// Mutable access to the stroke attributes. Marks them changed.
    pub fn stroke_style_mut(&mut self) -> &mut StrokeStyle {
        mark_dirty(self, DirtyBits::STROKE_ATTRS);
        &mut self.stroke_style
    }

    /// Sets the stroke width.
    pub fn set_stroke_width(&mut self, width: f64) {
        self.stroke_style_mut().stroke_width = width;
    }

    /// Sets the stroke placement.
    pub fn set_stroke_type(&mut self, stroke_type: StrokeType) {
        self.stroke_style_mut().stroke_type = stroke_type;
    }

    /// Whether antialiasing is requested.
    #[must_use]
    pub fn is_smooth(&self) -> bool {
        self.smooth
    }

    /// Requests or disables antialiasing.
    pub fn set_smooth(&mut self, smooth: bool) {
        if self.smooth != smooth {
            self.smooth = smooth;
            mark_dirty(self, DirtyBits::NODE_SMOOTH);
        }
    }

    /// The derived paint mode.
    #[must_use]
    pub fn mode(&self) -> ShapeMode {
        self.mode
    }

    /// The untransformed outline, built on first use after each geometry
    /// change.
    #[must_use]
    pub fn outline(&self) -> &BezPath {
        self.outline.get_or_init(|| self.kind.outline(ARC_TOLERANCE))
    }

    /// Fill rule of the outline.
    #[must_use]
    pub fn fill_rule(&self) -> FillRule {
        self.kind.fill_rule()
    }

    /// Stroke attributes with clamping and the geometry's effective join.
    #[must_use]
    pub fn effective_stroke_style(&self) -> StrokeStyle {
        self.stroke_style
            .resolved(self.kind.effective_join(self.stroke_style.line_join))
    }

    /// Intersects `ray` with the shape's plane (`z = 0`) and offers the hit
    /// to `chooser` if the point is contained.
    pub fn compute_intersects(
        &self,
        ray: &PickRay,
        chooser: &mut PickResultChooser,
        config: &GeometryConfig,
    ) -> bool {
        if ray.direction.z == 0.0 {
            return false;
        }
        let t = -ray.origin.z / ray.direction.z;
        if !t.is_finite() || !ray.in_clip(t) {
            return false;
        }
        let hit = ray.point_at(t);
        if !self.contains(Point::new(hit.x, hit.y), config) {
            return false;
        }
        if chooser.is_closer(t) {
            chooser.offer(t, None, hit, None);
        }
        true
    }

    /// Area covered by the drawn fill and stroke, in the space `transform`
    /// maps to. Dashes are honoured.
    #[must_use]
    pub fn occupied_area(&self, transform: Affine, config: &GeometryConfig) -> Area {
        algebra::occupied_area(self, transform, config)
    }

    /// Pushes the dirty state to `peer` and clears the pushed bits. A fresh
    /// peer receives everything. Returns whether anything was pushed.
    pub(crate) fn sync_peer(&mut self, peer: &mut dyn ShapePeer, fresh: bool) -> bool {
        if fresh {
            self.dirty.insert(SHAPE_BITS);
        }
        let pending = self.dirty.intersection(SHAPE_BITS);
        if pending.is_empty() {
            return false;
        }
        if pending.contains(DirtyBits::GEOMETRY) {
            peer.set_geometry(self.outline(), self.fill_rule());
        }
        if pending.contains(DirtyBits::SHAPE_MODE) {
            peer.set_mode(self.mode);
        }
        if pending.contains(DirtyBits::SHAPE_FILL) {
            peer.set_fill_paint(self.fill.as_ref());
        }
        if pending.contains(DirtyBits::SHAPE_STROKE) {
            peer.set_draw_paint(self.stroke.as_ref());
        }
        if pending.contains(DirtyBits::STROKE_ATTRS) {
            peer.set_draw_stroke(&self.effective_stroke_style());
        }
        if pending.contains(DirtyBits::NODE_SMOOTH) {
            peer.set_smooth(self.smooth);
        }
        self.dirty.remove(pending);
        true
    }

    fn update_mode(&mut self) {
        let mode = ShapeMode::from_paints(self.fill.is_some(), self.stroke.is_some());
        if mode != self.mode {
            self.mode = mode;
            mark_dirty(self, DirtyBits::SHAPE_MODE);
        }
    }

    /// Fill containment under the outline's fill rule.
    fn fill_contains(&self, p: Point) -> bool {
        self.fill_rule().is_inside(self.outline().winding(p))
    }
}

impl DirtyNode for Shape {
    fn dirty_bits(&self) -> DirtyBits {
        self.dirty
    }

    fn dirty_bits_mut(&mut self) -> &mut DirtyBits {
        &mut self.dirty
    }
}
