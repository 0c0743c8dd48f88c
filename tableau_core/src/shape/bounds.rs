// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Transformed bounds and point containment for 2D shapes.

use kurbo::{Affine, BezPath, ParamCurveExtrema, PathEl, Point, Rect, StrokeOpts};

use super::kind::{Frame, ShapeKind};
use super::{Shape, ShapeMode, StrokeType};
use crate::bounds::Bounds;
use crate::config::GeometryConfig;

/// Antialiasing allowance added around stroked bounds.
const STROKE_PAD: f64 = 0.5;

impl Shape {
    /// Bounds of the drawn shape after `transform`, or [`Bounds::EMPTY`].
    ///
    /// Fill-only shapes use the outline. Stroked shapes use the swept stroke
    /// (dashes ignored) plus a half-unit antialiasing pad. Rectangles, and
    /// circles and ellipses under rectilinear transforms, take a closed-form
    /// path that never builds the stroke.
    #[must_use]
    pub fn bounds(&self, transform: Affine, config: &GeometryConfig) -> Bounds {
        if self.mode == ShapeMode::Empty {
            return Bounds::EMPTY;
        }
        let inside_stroke = self.stroke_style.stroke_type == StrokeType::Inside;
        if matches!(self.kind, ShapeKind::Line(_)) && (self.mode == ShapeMode::Fill || inside_stroke)
        {
            return Bounds::EMPTY;
        }
        if let Some(frame) = self.kind.frame()
            && (!frame.curved || is_rectilinear(transform))
        {
            let upad = if self.mode == ShapeMode::Fill || inside_stroke {
                0.0
            } else if self.stroke_style.stroke_type == StrokeType::Centered {
                self.stroke_style.width() / 2.0
            } else {
                self.stroke_style.width()
            };
            return frame_bounds(frame, transform, upad, 0.0);
        }
        self.general_bounds(transform, config)
    }

    /// Whether `p`, in local coordinates, is inside the drawn fill or stroke.
    #[must_use]
    pub fn contains(&self, p: Point, config: &GeometryConfig) -> bool {
        if self.mode == ShapeMode::Empty {
            return false;
        }
        let include_shape = self.mode != ShapeMode::Stroke;
        let mut include_stroke = self.mode != ShapeMode::Fill;
        if include_shape && include_stroke && self.stroke_style.stroke_type == StrokeType::Inside {
            include_stroke = false;
        }
        if include_shape && self.fill_contains(p) {
            return true;
        }
        include_stroke && self.stroke_contains(p, config)
    }

    /// The outline swept by the stroke, in local coordinates. Inside and
    /// outside strokes are swept at double width and not yet clipped.
    pub(crate) fn swept_stroke(&self, config: &GeometryConfig, dashed: bool) -> BezPath {
        let join = self.kind.effective_join(self.stroke_style.line_join);
        kurbo::stroke(
            self.outline().elements().iter().copied(),
            &self.stroke_style.to_kurbo(join, dashed),
            &StrokeOpts::default(),
            config.flatten_tolerance,
        )
    }

    fn stroke_contains(&self, p: Point, config: &GeometryConfig) -> bool {
        use kurbo::Shape as _;
        if self.swept_stroke(config, false).winding(p) == 0 {
            return false;
        }
        match self.stroke_style.stroke_type {
            StrokeType::Centered => true,
            StrokeType::Inside => self.fill_contains(p),
            StrokeType::Outside => !self.fill_contains(p),
        }
    }

    fn general_bounds(&self, transform: Affine, config: &GeometryConfig) -> Bounds {
        let mut include_shape = self.mode != ShapeMode::Stroke;
        let mut include_stroke = self.mode != ShapeMode::Fill;
        if include_stroke && self.stroke_style.stroke_type == StrokeType::Inside {
            include_shape = true;
            include_stroke = false;
        }
        let rect = if include_stroke {
            accumulate(&(transform * self.swept_stroke(config, false)))
                .map(|r| r.inflate(STROKE_PAD, STROKE_PAD))
        } else if include_shape {
            accumulate(&(transform * self.outline().clone()))
        } else {
            None
        };
        match rect {
            Some(r) if r.x1 >= r.x0 && r.y1 >= r.y0 => Bounds::from_rect(r),
            Some(r) => {
                tracing::debug!(?r, "degenerate shape bounds");
                Bounds::EMPTY
            }
            None => Bounds::EMPTY,
        }
    }
}

/// Whether `transform` maps axis-aligned rectangles to axis-aligned
/// rectangles.
pub(crate) fn is_rectilinear(transform: Affine) -> bool {
    let [a, b, c, d, _, _] = transform.as_coeffs();
    (b == 0.0 && c == 0.0) || (a == 0.0 && d == 0.0)
}

/// Tight bounds of a path's elements, including lone move points.
fn accumulate(path: &BezPath) -> Option<Rect> {
    let mut out: Option<Rect> = None;
    let mut add = |r: Rect| {
        out = Some(out.map_or(r, |o| o.union(r)));
    };
    for el in path.elements() {
        if let PathEl::MoveTo(p) = el {
            add(Rect::from_points(*p, *p));
        }
    }
    for seg in path.segments() {
        add(seg.bounding_box());
    }
    out.filter(|r| r.is_finite())
}

/// Closed-form bounds of the frame `(x, y, w, h)` grown by `upad` in local
/// space and `dpad` in device space.
fn frame_bounds(frame: Frame, transform: Affine, upad: f64, dpad: f64) -> Bounds {
    let Frame { x, y, w, h, .. } = frame;
    if w < 0.0 || h < 0.0 {
        return Bounds::EMPTY;
    }
    let [mxx, myx, mxy, myy, mxt, myt] = transform.as_coeffs();
    let (x0, y0, x1, y1, pad);
    if mxx == 1.0 && myy == 1.0 && mxy == 0.0 && myx == 0.0 {
        x0 = x + mxt;
        y0 = y + myt;
        x1 = x + w + mxt;
        y1 = y + h + myt;
        pad = dpad + upad;
    } else {
        // Corners of the grown frame are the unit square mapped by the
        // transform scaled to (w, h) and shifted to (x, y).
        let (x, y) = (x - upad, y - upad);
        let (w, h) = (w + upad * 2.0, h + upad * 2.0);
        let tx = x * mxx + y * mxy + mxt;
        let ty = x * myx + y * myy + myt;
        let (ax, bx) = (mxx * w, mxy * h);
        let (ay, by) = (myx * w, myy * h);
        x0 = 0.0_f64.min(ax).min(bx.min(ax + bx)) + tx;
        y0 = 0.0_f64.min(ay).min(by.min(ay + by)) + ty;
        x1 = 0.0_f64.max(ax).max(bx.max(ax + bx)) + tx;
        y1 = 0.0_f64.max(ay).max(by.max(ay + by)) + ty;
        pad = dpad;
    }
    Bounds::from_rect(Rect::new(x0 - pad, y0 - pad, x1 + pad, y1 + pad))
}

#[cfg(test)]
mod tests {
    use core::f64::consts::{FRAC_PI_2, FRAC_PI_4, SQRT_2};

    use super::*;
    use crate::paint::Color;
    use crate::shape::{StrokeLineCap, StrokeStyle};

    const CFG: GeometryConfig = GeometryConfig::DEFAULT;

    fn rect_of(b: Bounds) -> (f64, f64, f64, f64) {
        (b.min.x, b.min.y, b.max.x, b.max.y)
    }

    fn close(a: (f64, f64, f64, f64), b: (f64, f64, f64, f64), tol: f64) -> bool {
        (a.0 - b.0).abs() <= tol
            && (a.1 - b.1).abs() <= tol
            && (a.2 - b.2).abs() <= tol
            && (a.3 - b.3).abs() <= tol
    }

    #[test]
    fn filled_rectangle_identity() {
        let s = Shape::rectangle(10.0, 20.0, 100.0, 50.0);
        let b = s.bounds(Affine::IDENTITY, &CFG);
        assert_eq!(rect_of(b), (10.0, 20.0, 110.0, 70.0));
        assert_eq!(b.min.z, 0.0);
    }

    #[test]
    fn stroked_rectangle_translated() {
        let mut s = Shape::rectangle(10.0, 20.0, 100.0, 50.0);
        s.set_stroke(Some(Color::BLACK.into()));
        s.set_stroke_width(4.0);
        let b = s.bounds(Affine::translate((5.0, 5.0)), &CFG);
        assert_eq!(rect_of(b), (13.0, 23.0, 117.0, 77.0));

        s.set_stroke_type(StrokeType::Outside);
        let b = s.bounds(Affine::IDENTITY, &CFG);
        assert_eq!(rect_of(b), (6.0, 16.0, 114.0, 74.0));

        s.set_stroke_type(StrokeType::Inside);
        let b = s.bounds(Affine::IDENTITY, &CFG);
        assert_eq!(rect_of(b), (10.0, 20.0, 110.0, 70.0));
    }

    #[test]
    fn rotated_rectangle_uses_corner_extremes() {
        let s = Shape::rectangle(0.0, 0.0, 10.0, 10.0);
        let b = s.bounds(Affine::rotate(FRAC_PI_4), &CFG);
        assert!((b.width() - 10.0 * SQRT_2).abs() < 1e-9);
        assert!((b.height() - 10.0 * SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn circle_under_general_rotation_stays_tight() {
        let s = Shape::circle(0.0, 0.0, 10.0);
        assert!(!is_rectilinear(Affine::rotate(0.5)));
        let b = s.bounds(Affine::rotate(0.5), &CFG);
        assert!(close(rect_of(b), (-10.0, -10.0, 10.0, 10.0), 1e-3), "{b:?}");
        let fast = s.bounds(Affine::scale_non_uniform(2.0, 1.0), &CFG);
        assert_eq!(rect_of(fast), (-20.0, -10.0, 20.0, 10.0));
    }

    #[test]
    fn quarter_turn_is_rectilinear() {
        let quarter = Affine::new([0.0, 1.0, -1.0, 0.0, 0.0, 0.0]);
        assert!(is_rectilinear(quarter));
        let s = Shape::ellipse(0.0, 0.0, 4.0, 2.0);
        let b = s.bounds(quarter, &CFG);
        assert_eq!(rect_of(b), (-2.0, -4.0, 2.0, 4.0));
        assert!(!is_rectilinear(Affine::rotate(FRAC_PI_2 / 3.0)));
    }

    #[test]
    fn empty_mode_and_filled_line_have_no_bounds() {
        let mut s = Shape::rectangle(0.0, 0.0, 1.0, 1.0);
        s.set_fill(None);
        assert!(s.bounds(Affine::IDENTITY, &CFG).is_empty());

        let mut line = Shape::line(0.0, 0.0, 10.0, 0.0);
        line.set_stroke(None);
        line.set_fill(Some(Color::BLACK.into()));
        assert!(line.bounds(Affine::IDENTITY, &CFG).is_empty());
    }

    #[test]
    fn stroked_line_is_padded() {
        let mut line = Shape::line(0.0, 0.0, 10.0, 0.0);
        line.set_stroke_style(StrokeStyle {
            stroke_width: 2.0,
            line_cap: StrokeLineCap::Square,
            ..StrokeStyle::default()
        });
        let b = line.bounds(Affine::IDENTITY, &CFG);
        assert!(close(rect_of(b), (-1.5, -1.5, 11.5, 1.5), 1e-9), "{b:?}");
    }

    #[test]
    fn negative_width_rectangle_is_empty() {
        let s = Shape::rectangle(0.0, 0.0, -5.0, 5.0);
        assert!(s.bounds(Affine::IDENTITY, &CFG).is_empty());
    }

    #[test]
    fn containment_respects_stroke_placement() {
        let mut s = Shape::rectangle(0.0, 0.0, 100.0, 100.0);
        s.set_fill(None);
        s.set_stroke(Some(Color::BLACK.into()));
        s.set_stroke_width(4.0);

        assert!(s.contains(Point::new(1.0, 50.0), &CFG));
        assert!(s.contains(Point::new(-1.0, 50.0), &CFG));
        assert!(!s.contains(Point::new(50.0, 50.0), &CFG));

        s.set_stroke_type(StrokeType::Outside);
        assert!(!s.contains(Point::new(1.0, 50.0), &CFG));
        assert!(s.contains(Point::new(-3.0, 50.0), &CFG));

        s.set_stroke_type(StrokeType::Inside);
        assert!(s.contains(Point::new(3.0, 50.0), &CFG));
        assert!(!s.contains(Point::new(-1.0, 50.0), &CFG));

        s.set_fill(Some(Color::WHITE.into()));
        assert!(s.contains(Point::new(50.0, 50.0), &CFG));
        s.set_fill(None);
        s.set_stroke(None);
        assert!(!s.contains(Point::new(50.0, 50.0), &CFG));
    }
}
