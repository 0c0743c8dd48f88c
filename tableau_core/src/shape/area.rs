// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Polygonal areas and boolean composition.
//!
//! An [`Area`] is a set of closed polygonal contours plus a fill rule. Curved
//! outlines are flattened on the way in. Boolean operations run on
//! [`i_overlay`]: each operand is first resolved under its own fill rule,
//! then the two are overlaid under the non-zero rule. Vertices lying on a
//! straight run (within [`GeometryConfig::snap_epsilon`], scaled by the
//! coordinate magnitude) are dropped from the output.
//!
//! Results are *normalized*: contours never cross, and the non-zero rule
//! and the even-odd rule select the same points.

use i_overlay::core::fill_rule::FillRule as OverlayFill;
use i_overlay::core::overlay_rule::OverlayRule;
use i_overlay::float::single::SingleFloatOverlay;
use kurbo::{Affine, BezPath, PathEl, Point, Rect};

use super::path::FillRule;
use crate::config::GeometryConfig;

/// A region of the plane bounded by polygonal contours.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Area {
    contours: Vec<Vec<Point>>,
    fill_rule: FillRule,
    normalized: bool,
}

impl Area {
    /// The empty area.
    #[must_use]
    pub fn new() -> Self {
        Self {
            normalized: true,
            ..Self::default()
        }
    }

    /// Flattens `path` into an area. Subpaths are implicitly closed.
    #[must_use]
    pub fn from_path(path: &BezPath, fill_rule: FillRule, tolerance: f64) -> Self {
        let mut contours = Vec::new();
        let mut current: Vec<Point> = Vec::new();
        let mut finish = |current: &mut Vec<Point>| {
            let contour = core::mem::take(current);
            if contour.len() >= 3 {
                if contour.iter().all(|p| p.is_finite()) {
                    contours.push(contour);
                } else {
                    tracing::warn!("dropping contour with non-finite coordinates");
                }
            }
        };
        kurbo::flatten(path.elements().iter().copied(), tolerance, |el| match el {
            PathEl::MoveTo(p) => {
                finish(&mut current);
                current.push(p);
            }
            PathEl::LineTo(p) => {
                if current.last() != Some(&p) {
                    current.push(p);
                }
            }
            PathEl::ClosePath => finish(&mut current),
            // `flatten` only emits lines.
            PathEl::QuadTo(..) | PathEl::CurveTo(..) => {}
        });
        finish(&mut current);
        Self {
            contours,
            fill_rule,
            normalized: false,
        }
    }

    /// The contours, each implicitly closed.
    #[must_use]
    pub fn contours(&self) -> &[Vec<Point>] {
        &self.contours
    }

    /// Fill rule selecting the enclosed points.
    #[must_use]
    pub fn fill_rule(&self) -> FillRule {
        self.fill_rule
    }

    /// Whether the area has no contours.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.contours.is_empty()
    }

    /// Winding number of the contours around `p`.
    #[must_use]
    pub fn winding(&self, p: Point) -> i32 {
        winding(&self.contours, p)
    }

    /// Whether `p` is enclosed.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        self.fill_rule.is_inside(self.winding(p))
    }

    /// Enclosed area. Overlapping contours are counted once.
    #[must_use]
    pub fn area(&self) -> f64 {
        if self.normalized {
            self.contours.iter().map(|c| signed_area(c)).sum::<f64>().abs()
        } else {
            self.normalized(&GeometryConfig::DEFAULT).area()
        }
    }

    /// Bounding box of all contour vertices.
    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        let mut points = self.contours.iter().flatten();
        let first = *points.next()?;
        Some(points.fold(Rect::from_points(first, first), |r, p| r.union_pt(*p)))
    }

    /// Maps every vertex through `transform`.
    #[must_use]
    pub fn transformed(&self, transform: Affine) -> Self {
        let flip = transform.determinant() < 0.0;
        let contours = self
            .contours
            .iter()
            .map(|c| {
                let mut out: Vec<Point> = c.iter().map(|p| transform * *p).collect();
                // Keep the inside on the left of each edge.
                if flip {
                    out.reverse();
                }
                out
            })
            .collect();
        Self {
            contours,
            fill_rule: self.fill_rule,
            normalized: self.normalized,
        }
    }

    /// The contours as a path of straight segments.
    #[must_use]
    pub fn to_bez_path(&self) -> BezPath {
        let mut out = BezPath::new();
        for contour in &self.contours {
            let mut points = contour.iter();
            if let Some(first) = points.next() {
                out.move_to(*first);
                for p in points {
                    out.line_to(*p);
                }
                out.close_path();
            }
        }
        out
    }

    /// Rebuilds the area so that no contours cross.
    #[must_use]
    pub fn normalized(&self, config: &GeometryConfig) -> Self {
        compose(self, &Self::new(), config, OverlayRule::Subject)
    }

    /// Points in either area.
    #[must_use]
    pub fn union(&self, other: &Self, config: &GeometryConfig) -> Self {
        compose(self, other, config, OverlayRule::Union)
    }

    /// Points in both areas.
    #[must_use]
    pub fn intersect(&self, other: &Self, config: &GeometryConfig) -> Self {
        compose(self, other, config, OverlayRule::Intersect)
    }

    /// Points in `self` but not in `other`.
    #[must_use]
    pub fn subtract(&self, other: &Self, config: &GeometryConfig) -> Self {
        compose(self, other, config, OverlayRule::Difference)
    }
}

fn winding(contours: &[Vec<Point>], p: Point) -> i32 {
    let mut w = 0;
    for contour in contours {
        for (a, b) in edges(contour) {
            let side = (b.x - a.x) * (p.y - a.y) - (p.x - a.x) * (b.y - a.y);
            if a.y <= p.y {
                if b.y > p.y && side > 0.0 {
                    w += 1;
                }
            } else if b.y <= p.y && side < 0.0 {
                w -= 1;
            }
        }
    }
    w
}

fn signed_area(contour: &[Point]) -> f64 {
    edges(contour).map(|(a, b)| a.x * b.y - b.x * a.y).sum::<f64>() * 0.5
}

fn edges(contour: &[Point]) -> impl Iterator<Item = (Point, Point)> + '_ {
    let next = contour.iter().cycle().skip(1);
    contour.iter().copied().zip(next.copied())
}

/// Converts contours to the point layout the overlay engine consumes.
fn overlay_contours(area: &Area) -> Vec<Vec<[f64; 2]>> {
    area.contours
        .iter()
        .map(|c| c.iter().map(|p| [p.x, p.y]).collect())
        .collect()
}

const fn overlay_fill(rule: FillRule) -> OverlayFill {
    match rule {
        FillRule::NonZero => OverlayFill::NonZero,
        FillRule::EvenOdd => OverlayFill::EvenOdd,
    }
}

/// Rewrites `area` as non-crossing contours, if it is not already.
fn resolve(area: &Area) -> Vec<Vec<[f64; 2]>> {
    let contours = overlay_contours(area);
    if area.normalized || contours.is_empty() {
        return contours;
    }
    let none: Vec<Vec<[f64; 2]>> = Vec::new();
    contours
        .overlay(&none, OverlayRule::Subject, overlay_fill(area.fill_rule))
        .into_iter()
        .flatten()
        .collect()
}

fn compose(subject: &Area, clip: &Area, config: &GeometryConfig, rule: OverlayRule) -> Area {
    let subj = resolve(subject);
    let clip = resolve(clip);
    let scale = subj
        .iter()
        .chain(&clip)
        .flatten()
        .flat_map(|p| [p[0].abs(), p[1].abs()])
        .fold(1.0_f64, f64::max);
    let eps = (config.snap_epsilon * scale).max(f64::EPSILON * scale);

    let shapes = if subj.is_empty() && clip.is_empty() {
        Vec::new()
    } else {
        subj.overlay(&clip, rule, OverlayFill::NonZero)
    };
    let contours: Vec<Vec<Point>> = shapes
        .iter()
        .flatten()
        .map(|c| simplify(c.iter().map(|p| Point::new(p[0], p[1])).collect(), eps))
        .filter(|c| c.len() >= 3)
        .collect();
    tracing::trace!(
        shapes = shapes.len(),
        contours = contours.len(),
        "composed area"
    );
    Area {
        contours,
        fill_rule: FillRule::NonZero,
        normalized: true,
    }
}

/// Drops vertices lying on the straight line through their neighbours.
fn simplify(points: Vec<Point>, eps: f64) -> Vec<Point> {
    let mut out: Vec<Point> = Vec::with_capacity(points.len());
    for p in points {
        while out.len() >= 2 {
            let a = out[out.len() - 2];
            let b = out[out.len() - 1];
            if is_straight(a, b, p, eps) {
                out.pop();
            } else {
                break;
            }
        }
        out.push(p);
    }
    // The seam between the last and first vertex.
    while out.len() >= 3 {
        let n = out.len();
        if is_straight(out[n - 2], out[n - 1], out[0], eps) {
            out.pop();
        } else if is_straight(out[n - 1], out[0], out[1], eps) {
            out.remove(0);
        } else {
            break;
        }
    }
    out
}

fn is_straight(a: Point, b: Point, c: Point, eps: f64) -> bool {
    let (ab, bc) = (b - a, c - b);
    ab.cross(bc).abs() <= eps * (ab.hypot() + bc.hypot()) && ab.dot(bc) > 0.0
}

#[cfg(test)]
mod tests {
    use kurbo::{Circle, Shape as _};

    use super::*;

    const CFG: GeometryConfig = GeometryConfig::DEFAULT;

    fn rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Area {
        Area::from_path(&Rect::new(x0, y0, x1, y1).to_path(0.1), FillRule::NonZero, 0.1)
    }

    fn close(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    #[test]
    fn overlapping_squares() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(5.0, 5.0, 15.0, 15.0);
        assert!(close(a.union(&b, &CFG).area(), 175.0, 1e-6));
        assert!(close(a.intersect(&b, &CFG).area(), 25.0, 1e-6));
        assert!(close(a.subtract(&b, &CFG).area(), 75.0, 1e-6));
        assert!(close(b.subtract(&a, &CFG).area(), 75.0, 1e-6));
    }

    #[test]
    fn shared_edge_merges_into_one_contour() {
        let a = rect(0.0, 0.0, 10.0, 10.0);
        let b = rect(10.0, 0.0, 20.0, 10.0);
        let u = a.union(&b, &CFG);
        assert_eq!(u.contours().len(), 1);
        assert_eq!(u.contours()[0].len(), 4, "collinear vertices removed");
        assert!(close(u.area(), 200.0, 1e-6));
        assert!(u.intersect(&a, &CFG).area() > 99.999);
    }

    #[test]
    fn disjoint_union_then_intersect_recovers_operand() {
        let a = Area::from_path(
            &Circle::new((0.0, 0.0), 10.0).to_path(1e-3),
            FillRule::NonZero,
            CFG.flatten_tolerance,
        );
        let b = rect(30.0, 30.0, 40.0, 50.0);
        let u = a.union(&b, &CFG);
        assert!(close(u.area(), a.area() + 200.0, 1e-4));
        assert!(close(u.intersect(&a, &CFG).area(), a.area(), 1e-4));
        assert!(close(a.area(), core::f64::consts::PI * 100.0, 0.5));
    }

    #[test]
    fn hole_is_subtracted() {
        let outer = rect(0.0, 0.0, 10.0, 10.0);
        let inner = rect(2.0, 2.0, 8.0, 8.0);
        let ring = outer.subtract(&inner, &CFG);
        assert_eq!(ring.contours().len(), 2);
        assert!(close(ring.area(), 64.0, 1e-6));
        assert!(!ring.contains(Point::new(5.0, 5.0)));
        assert!(ring.contains(Point::new(1.0, 5.0)));
    }

    #[test]
    fn even_odd_overlap_normalizes() {
        let mut path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
        path.extend(Rect::new(5.0, 0.0, 15.0, 10.0).to_path(0.1).elements().iter().copied());
        let eo = Area::from_path(&path, FillRule::EvenOdd, 0.1);
        assert!(!eo.contains(Point::new(7.0, 5.0)));
        let n = eo.normalized(&CFG);
        assert!(close(n.area(), 100.0, 1e-6));
        assert!(!n.contains(Point::new(7.0, 5.0)));
        assert!(n.contains(Point::new(2.0, 5.0)));
    }

    #[test]
    fn mirrored_area_keeps_positive_measure() {
        let a = rect(0.0, 0.0, 4.0, 5.0).normalized(&CFG);
        let m = a.transformed(Affine::FLIP_X);
        assert!(close(m.area(), 20.0, 1e-6));
        let bounds = m.bounds().expect("non-empty");
        assert_eq!((bounds.x0, bounds.x1), (-4.0, 0.0));
    }

    #[test]
    fn filling_a_hole_yields_a_single_contour() {
        let ring = rect(0.0, 0.0, 10.0, 10.0).subtract(&rect(2.0, 2.0, 8.0, 8.0), &CFG);
        let plug = rect(2.0, 2.0, 8.0, 8.0);
        let solid = ring.union(&plug, &CFG);
        assert_eq!(solid.contours().len(), 1);
        assert_eq!(solid.contours()[0].len(), 4);
        assert!(close(solid.area(), 100.0, 1e-6));
        assert!(solid.contains(Point::new(5.0, 5.0)));
    }

    #[test]
    fn operands_keep_their_own_fill_rule() {
        let mut path = Rect::new(0.0, 0.0, 10.0, 10.0).to_path(0.1);
        path.extend(Rect::new(2.0, 2.0, 8.0, 8.0).to_path(0.1).elements().iter().copied());
        let even_odd = Area::from_path(&path, FillRule::EvenOdd, 0.1);
        let non_zero = Area::from_path(&path, FillRule::NonZero, 0.1);
        let center = rect(4.0, 4.0, 6.0, 6.0);
        assert!(even_odd.intersect(&center, &CFG).is_empty());
        assert!(close(non_zero.intersect(&center, &CFG).area(), 4.0, 1e-6));
    }

    #[test]
    fn empty_inputs_compose_to_empty() {
        let e = Area::new();
        assert!(e.union(&e, &CFG).is_empty());
        assert!(rect(0.0, 0.0, 1.0, 1.0).intersect(&e, &CFG).is_empty());
        assert_eq!(e.area(), 0.0);
    }
}
