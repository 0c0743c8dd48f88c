// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Path elements and the path-backed shape kinds.

use kurbo::{Arc, BezPath, PathEl, Point, SvgArc, Vec2};

use crate::error::{Error, Result};

/// Rule deciding which points a self-intersecting outline encloses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillRule {
    /// Inside where the winding number is non-zero.
    #[default]
    NonZero,
    /// Inside where the winding number is odd.
    EvenOdd,
}

impl FillRule {
    /// Whether a point with winding number `winding` is inside.
    #[must_use]
    pub fn is_inside(self, winding: i32) -> bool {
        match self {
            Self::NonZero => winding != 0,
            Self::EvenOdd => winding % 2 != 0,
        }
    }
}

/// One element of a [`Path`].
///
/// Coordinates are absolute unless `relative` is set, in which case they
/// are offsets from the current point.
#[derive(Clone, Debug, PartialEq)]
pub enum PathElement {
    /// Starts a new subpath.
    MoveTo {
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Relative coordinates.
        relative: bool,
    },
    /// Straight line.
    LineTo {
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Relative coordinates.
        relative: bool,
    },
    /// Horizontal line.
    HLineTo {
        /// Target X.
        x: f64,
        /// Relative coordinate.
        relative: bool,
    },
    /// Vertical line.
    VLineTo {
        /// Target Y.
        y: f64,
        /// Relative coordinate.
        relative: bool,
    },
    /// Quadratic Bézier.
    QuadCurveTo {
        /// Control point X.
        control_x: f64,
        /// Control point Y.
        control_y: f64,
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Relative coordinates.
        relative: bool,
    },
    /// Cubic Bézier.
    CubicCurveTo {
        /// First control point X.
        control_x1: f64,
        /// First control point Y.
        control_y1: f64,
        /// Second control point X.
        control_x2: f64,
        /// Second control point Y.
        control_y2: f64,
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Relative coordinates.
        relative: bool,
    },
    /// Elliptical arc in SVG endpoint parameterization.
    ArcTo {
        /// X radius.
        radius_x: f64,
        /// Y radius.
        radius_y: f64,
        /// Ellipse rotation in degrees.
        x_axis_rotation: f64,
        /// Target X.
        x: f64,
        /// Target Y.
        y: f64,
        /// Choose the larger of the two candidate arcs.
        large_arc: bool,
        /// Sweep in the positive-angle direction.
        sweep: bool,
        /// Relative coordinates.
        relative: bool,
    },
    /// Closes the current subpath.
    ClosePath,
}

impl PathElement {
    /// Absolute `MoveTo`.
    #[must_use]
    pub const fn move_to(x: f64, y: f64) -> Self {
        Self::MoveTo {
            x,
            y,
            relative: false,
        }
    }

    /// Absolute `LineTo`.
    #[must_use]
    pub const fn line_to(x: f64, y: f64) -> Self {
        Self::LineTo {
            x,
            y,
            relative: false,
        }
    }
}

/// An arbitrary outline built from [`PathElement`]s.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Path {
    /// The elements, starting with a `MoveTo`.
    pub elements: Vec<PathElement>,
    /// Fill rule.
    pub fill_rule: FillRule,
}

impl Path {
    /// Creates a non-zero path from elements.
    #[must_use]
    pub fn new(elements: Vec<PathElement>) -> Self {
        Self {
            elements,
            fill_rule: FillRule::NonZero,
        }
    }

    /// Builds the outline. A path whose first element is not a `MoveTo`
    /// produces an empty outline.
    pub(crate) fn outline(&self, tolerance: f64) -> BezPath {
        let mut out = BezPath::new();
        if !matches!(self.elements.first(), Some(PathElement::MoveTo { .. })) {
            if !self.elements.is_empty() {
                tracing::warn!("path does not start with a MoveTo; ignoring its elements");
            }
            return out;
        }
        let mut current = Point::ZERO;
        let mut subpath_start = Point::ZERO;
        let at = |current: Point, relative: bool, x: f64, y: f64| {
            if relative {
                current + Vec2::new(x, y)
            } else {
                Point::new(x, y)
            }
        };
        for el in &self.elements {
            match *el {
                PathElement::MoveTo { x, y, relative } => {
                    current = at(current, relative, x, y);
                    subpath_start = current;
                    out.move_to(current);
                }
                PathElement::LineTo { x, y, relative } => {
                    current = at(current, relative, x, y);
                    out.line_to(current);
                }
                PathElement::HLineTo { x, relative } => {
                    current = Point::new(if relative { current.x + x } else { x }, current.y);
                    out.line_to(current);
                }
                PathElement::VLineTo { y, relative } => {
                    current = Point::new(current.x, if relative { current.y + y } else { y });
                    out.line_to(current);
                }
                PathElement::QuadCurveTo {
                    control_x,
                    control_y,
                    x,
                    y,
                    relative,
                } => {
                    let c = at(current, relative, control_x, control_y);
                    current = at(current, relative, x, y);
                    out.quad_to(c, current);
                }
                PathElement::CubicCurveTo {
                    control_x1,
                    control_y1,
                    control_x2,
                    control_y2,
                    x,
                    y,
                    relative,
                } => {
                    let c1 = at(current, relative, control_x1, control_y1);
                    let c2 = at(current, relative, control_x2, control_y2);
                    current = at(current, relative, x, y);
                    out.curve_to(c1, c2, current);
                }
                PathElement::ArcTo {
                    radius_x,
                    radius_y,
                    x_axis_rotation,
                    x,
                    y,
                    large_arc,
                    sweep,
                    relative,
                } => {
                    let to = at(current, relative, x, y);
                    let svg = SvgArc {
                        from: current,
                        to,
                        radii: Vec2::new(radius_x.abs(), radius_y.abs()),
                        x_rotation: x_axis_rotation.to_radians(),
                        large_arc,
                        sweep,
                    };
                    match Arc::from_svg_arc(&svg) {
                        Some(arc) => {
                            for el in arc.append_iter(tolerance) {
                                out.push(el);
                            }
                        }
                        // Zero radii or coincident endpoints degrade to a line.
                        None => out.line_to(to),
                    }
                    current = to;
                }
                PathElement::ClosePath => {
                    out.close_path();
                    current = subpath_start;
                }
            }
        }
        out
    }
}

/// A shape described by SVG path data.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SvgPath {
    content: String,
    parsed: BezPath,
    /// Fill rule.
    pub fill_rule: FillRule,
}

impl SvgPath {
    /// Parses `content`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgPath`] if the data is malformed.
    pub fn new(content: impl Into<String>) -> Result<Self> {
        let mut path = Self::default();
        path.set_content(content)?;
        Ok(path)
    }

    /// The SVG path data.
    #[must_use]
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Replaces the path data. On error the previous content is kept.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SvgPath`] if the data is malformed.
    pub fn set_content(&mut self, content: impl Into<String>) -> Result<()> {
        let content = content.into();
        let parsed = BezPath::from_svg(content.trim())
            .map_err(|e| Error::SvgPath(format!("{e}")))?;
        self.content = content;
        self.parsed = parsed;
        Ok(())
    }

    pub(crate) fn outline(&self) -> BezPath {
        self.parsed.clone()
    }
}

/// Appends `arc` to `out`, starting a subpath at its start point when
/// `move_first` is set.
pub(crate) fn push_arc(out: &mut BezPath, arc: &Arc, tolerance: f64, move_first: bool) {
    let (ux, uy) = (
        arc.radii.x * arc.start_angle.cos(),
        arc.radii.y * arc.start_angle.sin(),
    );
    let (sin, cos) = arc.x_rotation.sin_cos();
    let start = arc.center + Vec2::new(ux * cos - uy * sin, ux * sin + uy * cos);
    if move_first {
        out.move_to(start);
    } else {
        out.line_to(start);
    }
    for el in arc.append_iter(tolerance) {
        if !matches!(el, PathEl::MoveTo(_)) {
            out.push(el);
        }
    }
}
