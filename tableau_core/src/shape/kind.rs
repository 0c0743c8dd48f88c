// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The concrete 2D shape geometries.

use core::f64::consts::FRAC_PI_2;

use kurbo::{BezPath, Point, Shape as _, Vec2};

use super::path::{push_arc, FillRule, Path, SvgPath};
use super::stroke::StrokeLineJoin;
use crate::paint::{Color, Paint};

/// Axis-aligned rectangle, optionally with elliptical corners.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rectangle {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width. Negative widths produce no geometry.
    pub width: f64,
    /// Height. Negative heights produce no geometry.
    pub height: f64,
    /// Horizontal diameter of the corner arcs.
    pub arc_width: f64,
    /// Vertical diameter of the corner arcs.
    pub arc_height: f64,
}

impl Rectangle {
    /// Whether both corner diameters are positive.
    #[must_use]
    pub fn is_rounded(&self) -> bool {
        self.arc_width > 0.0 && self.arc_height > 0.0
    }
}

/// Circle.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Circle {
    /// Center X.
    pub center_x: f64,
    /// Center Y.
    pub center_y: f64,
    /// Radius. Negative radii produce no geometry.
    pub radius: f64,
}

/// Axis-aligned ellipse.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Ellipse {
    /// Center X.
    pub center_x: f64,
    /// Center Y.
    pub center_y: f64,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
}

/// Line segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Line {
    /// Start X.
    pub start_x: f64,
    /// Start Y.
    pub start_y: f64,
    /// End X.
    pub end_x: f64,
    /// End Y.
    pub end_y: f64,
}

/// Closed polygon from flat `[x0, y0, x1, y1, ...]` coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polygon {
    /// Flat coordinates. A trailing odd value is ignored.
    pub points: Vec<f64>,
}

/// Open polyline from flat `[x0, y0, x1, y1, ...]` coordinates.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Polyline {
    /// Flat coordinates. A trailing odd value is ignored.
    pub points: Vec<f64>,
}

/// Quadratic Bézier segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct QuadCurve {
    /// Start point.
    pub start: Point,
    /// Control point.
    pub control: Point,
    /// End point.
    pub end: Point,
}

/// Cubic Bézier segment.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CubicCurve {
    /// Start point.
    pub start: Point,
    /// First control point.
    pub control1: Point,
    /// Second control point.
    pub control2: Point,
    /// End point.
    pub end: Point,
}

/// How an [`Arc`] is closed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ArcType {
    /// Not closed.
    #[default]
    Open,
    /// Closed by a straight chord.
    Chord,
    /// Closed through the center, like a pie slice.
    Round,
}

/// Elliptical arc.
///
/// Angles are in degrees and increase counter-clockwise on screen, so an
/// arc starting at 0° with length 90° runs from the right extreme to the top.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Arc {
    /// Center X.
    pub center_x: f64,
    /// Center Y.
    pub center_y: f64,
    /// Horizontal radius.
    pub radius_x: f64,
    /// Vertical radius.
    pub radius_y: f64,
    /// Start angle in degrees.
    pub start_angle: f64,
    /// Angular extent in degrees.
    pub length: f64,
    /// Closure.
    pub arc_type: ArcType,
}

/// The geometry of a [`Shape`](super::Shape).
#[derive(Clone, Debug, PartialEq)]
pub enum ShapeKind {
    /// See [`Rectangle`].
    Rectangle(Rectangle),
    /// See [`Circle`].
    Circle(Circle),
    /// See [`Ellipse`].
    Ellipse(Ellipse),
    /// See [`Line`].
    Line(Line),
    /// See [`Polygon`].
    Polygon(Polygon),
    /// See [`Polyline`].
    Polyline(Polyline),
    /// See [`QuadCurve`].
    QuadCurve(QuadCurve),
    /// See [`CubicCurve`].
    CubicCurve(CubicCurve),
    /// See [`Arc`].
    Arc(Arc),
    /// See [`Path`].
    Path(Path),
    /// See [`SvgPath`].
    SvgPath(SvgPath),
}

/// Axis-aligned frame of a rectangle-like shape, used by the bounds fast path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Frame {
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) w: f64,
    pub(crate) h: f64,
    /// The outline is curved, so the frame is tight only under rectilinear
    /// transforms.
    pub(crate) curved: bool,
}

impl ShapeKind {
    /// Builds the untransformed outline. `tolerance` bounds the error of
    /// arc-to-cubic conversion.
    #[must_use]
    pub fn outline(&self, tolerance: f64) -> BezPath {
        match self {
            Self::Rectangle(r) => rectangle_outline(r, tolerance),
            Self::Circle(c) => {
                if c.radius < 0.0 {
                    return BezPath::new();
                }
                kurbo::Circle::new((c.center_x, c.center_y), c.radius).to_path(tolerance)
            }
            Self::Ellipse(e) => {
                if e.radius_x < 0.0 || e.radius_y < 0.0 {
                    return BezPath::new();
                }
                kurbo::Ellipse::new((e.center_x, e.center_y), (e.radius_x, e.radius_y), 0.0)
                    .to_path(tolerance)
            }
            Self::Line(l) => {
                let mut out = BezPath::new();
                out.move_to((l.start_x, l.start_y));
                out.line_to((l.end_x, l.end_y));
                out
            }
            Self::Polygon(p) => {
                let mut out = points_outline(&p.points);
                if !out.elements().is_empty() {
                    out.close_path();
                }
                out
            }
            Self::Polyline(p) => points_outline(&p.points),
            Self::QuadCurve(q) => {
                let mut out = BezPath::new();
                out.move_to(q.start);
                out.quad_to(q.control, q.end);
                out
            }
            Self::CubicCurve(c) => {
                let mut out = BezPath::new();
                out.move_to(c.start);
                out.curve_to(c.control1, c.control2, c.end);
                out
            }
            Self::Arc(a) => arc_outline(a, tolerance),
            Self::Path(p) => p.outline(tolerance),
            Self::SvgPath(p) => p.outline(),
        }
    }

    /// Fill rule of the outline.
    #[must_use]
    pub fn fill_rule(&self) -> FillRule {
        match self {
            Self::Path(p) => p.fill_rule,
            Self::SvgPath(p) => p.fill_rule,
            _ => FillRule::NonZero,
        }
    }

    /// Join actually used for `join` on this geometry. Smooth outlines have
    /// no true corners, so miters become bevels.
    #[must_use]
    pub fn effective_join(&self, join: StrokeLineJoin) -> StrokeLineJoin {
        let smooth = match self {
            Self::Circle(_) | Self::Ellipse(_) => true,
            Self::Rectangle(r) => r.is_rounded(),
            _ => false,
        };
        if smooth && join == StrokeLineJoin::Miter {
            StrokeLineJoin::Bevel
        } else {
            join
        }
    }

    /// Whether the geometry can enclose area.
    #[must_use]
    pub fn has_fill_area(&self) -> bool {
        !matches!(self, Self::Line(_))
    }

    /// Default `(fill, stroke)` paints for a new shape of this kind.
    pub(crate) fn default_paints(&self) -> (Option<Paint>, Option<Paint>) {
        match self {
            Self::Line(_) | Self::Polyline(_) | Self::Path(_) => {
                (None, Some(Paint::Solid(Color::BLACK)))
            }
            _ => (Some(Paint::Solid(Color::BLACK)), None),
        }
    }

    pub(crate) fn frame(&self) -> Option<Frame> {
        match self {
            Self::Rectangle(r) => Some(Frame {
                x: r.x,
                y: r.y,
                w: r.width,
                h: r.height,
                curved: r.is_rounded(),
            }),
            Self::Circle(c) => Some(Frame {
                x: c.center_x - c.radius,
                y: c.center_y - c.radius,
                w: c.radius * 2.0,
                h: c.radius * 2.0,
                curved: true,
            }),
            Self::Ellipse(e) => Some(Frame {
                x: e.center_x - e.radius_x,
                y: e.center_y - e.radius_y,
                w: e.radius_x * 2.0,
                h: e.radius_y * 2.0,
                curved: true,
            }),
            _ => None,
        }
    }
}

fn rectangle_outline(r: &Rectangle, tolerance: f64) -> BezPath {
    let mut out = BezPath::new();
    if r.width < 0.0 || r.height < 0.0 {
        return out;
    }
    if !r.is_rounded() {
        return kurbo::Rect::new(r.x, r.y, r.x + r.width, r.y + r.height).to_path(tolerance);
    }
    let rx = r.arc_width.min(r.width) / 2.0;
    let ry = r.arc_height.min(r.height) / 2.0;
    let (x0, y0, x1, y1) = (r.x, r.y, r.x + r.width, r.y + r.height);
    let corners = [
        (Point::new(x1 - rx, y0 + ry), -FRAC_PI_2),
        (Point::new(x1 - rx, y1 - ry), 0.0),
        (Point::new(x0 + rx, y1 - ry), FRAC_PI_2),
        (Point::new(x0 + rx, y0 + ry), 2.0 * FRAC_PI_2),
    ];
    for (i, (center, start)) in corners.into_iter().enumerate() {
        let arc = kurbo::Arc {
            center,
            radii: Vec2::new(rx, ry),
            start_angle: start,
            sweep_angle: FRAC_PI_2,
            x_rotation: 0.0,
        };
        push_arc(&mut out, &arc, tolerance, i == 0);
    }
    out.close_path();
    out
}

fn points_outline(points: &[f64]) -> BezPath {
    let mut out = BezPath::new();
    for (i, xy) in points.chunks_exact(2).enumerate() {
        let p = Point::new(xy[0], xy[1]);
        if i == 0 {
            out.move_to(p);
        } else {
            out.line_to(p);
        }
    }
    out
}

fn arc_outline(a: &Arc, tolerance: f64) -> BezPath {
    let mut out = BezPath::new();
    if a.radius_x < 0.0 || a.radius_y < 0.0 {
        return out;
    }
    // Screen Y points down, so counter-clockwise degrees negate.
    let arc = kurbo::Arc {
        center: Point::new(a.center_x, a.center_y),
        radii: Vec2::new(a.radius_x, a.radius_y),
        start_angle: -a.start_angle.to_radians(),
        sweep_angle: -a.length.to_radians(),
        x_rotation: 0.0,
    };
    push_arc(&mut out, &arc, tolerance, true);
    match a.arc_type {
        ArcType::Open => {}
        ArcType::Chord => out.close_path(),
        ArcType::Round => {
            out.line_to(arc.center);
            out.close_path();
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-4;

    #[test]
    fn rounded_rectangle_keeps_its_frame() {
        let kind = ShapeKind::Rectangle(Rectangle {
            x: 10.0,
            y: 20.0,
            width: 100.0,
            height: 50.0,
            arc_width: 20.0,
            arc_height: 10.0,
        });
        let bbox = kind.outline(TOL).bounding_box();
        assert!((bbox.x0 - 10.0).abs() < 1e-9 && (bbox.x1 - 110.0).abs() < 1e-9);
        assert!((bbox.y0 - 20.0).abs() < 1e-9 && (bbox.y1 - 70.0).abs() < 1e-9);
        // Each corner loses a square minus a quarter ellipse.
        let cut = 4.0 * (10.0 * 5.0) * (1.0 - core::f64::consts::FRAC_PI_4);
        assert!((kind.outline(TOL).area().abs() - (5000.0 - cut)).abs() < 1e-2);
    }

    #[test]
    fn negative_sizes_have_no_outline() {
        let r = ShapeKind::Rectangle(Rectangle {
            width: -1.0,
            height: 5.0,
            ..Rectangle::default()
        });
        assert!(r.outline(TOL).elements().is_empty());
        let c = ShapeKind::Circle(Circle {
            radius: -2.0,
            ..Circle::default()
        });
        assert!(c.outline(TOL).elements().is_empty());
    }

    #[test]
    fn arc_angles_run_counter_clockwise_on_screen() {
        let kind = ShapeKind::Arc(Arc {
            center_x: 0.0,
            center_y: 0.0,
            radius_x: 10.0,
            radius_y: 10.0,
            start_angle: 0.0,
            length: 90.0,
            arc_type: ArcType::Round,
        });
        let bbox = kind.outline(TOL).bounding_box();
        assert!((bbox.x0).abs() < 1e-9 && (bbox.x1 - 10.0).abs() < 1e-9);
        assert!((bbox.y0 + 10.0).abs() < 1e-9 && bbox.y1.abs() < 1e-9, "{bbox:?}");
    }

    #[test]
    fn polygon_closes_and_ignores_trailing_value() {
        let kind = ShapeKind::Polygon(Polygon {
            points: vec![0.0, 0.0, 10.0, 0.0, 10.0, 10.0, 99.0],
        });
        let outline = kind.outline(TOL);
        assert!(matches!(outline.elements().last(), Some(kurbo::PathEl::ClosePath)));
        assert!((outline.area().abs() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn smooth_outlines_bevel_miters() {
        let circle = ShapeKind::Circle(Circle::default());
        assert_eq!(circle.effective_join(StrokeLineJoin::Miter), StrokeLineJoin::Bevel);
        assert_eq!(circle.effective_join(StrokeLineJoin::Round), StrokeLineJoin::Round);
        let square = ShapeKind::Rectangle(Rectangle::default());
        assert_eq!(square.effective_join(StrokeLineJoin::Miter), StrokeLineJoin::Miter);
    }

    #[test]
    fn open_kinds_default_to_stroke_only() {
        let (fill, stroke) = ShapeKind::Line(Line::default()).default_paints();
        assert!(fill.is_none() && stroke.is_some());
        let (fill, stroke) = ShapeKind::Circle(Circle::default()).default_paints();
        assert!(fill.is_some() && stroke.is_none());
    }
}
