// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Axis-aligned boxes centered on the origin.

use kurbo::Point;

use crate::bounds::Bounds;
use crate::math::Vec3;
use crate::mesh::BoxKey;
use crate::pick::{CullFace, PickRay, PickResultChooser};

/// Default edge length of a new box.
pub const DEFAULT_BOX_SIZE: f64 = 2.0;

/// The face of a box a ray enters or leaves through.
///
/// Names follow the viewer's frame: `-X` is left, `-Y` is top (Y points
/// down), `-Z` is front (the camera looks down `+Z`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BoxFace {
    /// The `-X` face.
    Left,
    /// The `+X` face.
    Right,
    /// The `-Y` face.
    Top,
    /// The `+Y` face.
    Bottom,
    /// The `-Z` face.
    Front,
    /// The `+Z` face.
    Back,
}

/// A slab-test hit: ray parameter and face.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxIntersection {
    /// Ray parameter of the hit.
    pub distance: f64,
    /// Face the hit lies on.
    pub face: BoxFace,
}

/// Box dimensions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoxShape {
    /// Extent along X.
    pub width: f64,
    /// Extent along Y.
    pub height: f64,
    /// Extent along Z.
    pub depth: f64,
}

impl Default for BoxShape {
    fn default() -> Self {
        Self::new(DEFAULT_BOX_SIZE, DEFAULT_BOX_SIZE, DEFAULT_BOX_SIZE)
    }
}

impl BoxShape {
    /// Creates a box.
    #[must_use]
    pub const fn new(width: f64, height: f64, depth: f64) -> Self {
        Self {
            width,
            height,
            depth,
        }
    }

    /// Whether any dimension is non-positive or not finite.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        [self.width, self.height, self.depth]
            .iter()
            .any(|d| !(d.is_finite() && *d > 0.0))
    }

    /// Key of the generated mesh for these dimensions.
    #[must_use]
    pub fn mesh_key(&self) -> BoxKey {
        BoxKey {
            width: self.width,
            height: self.height,
            depth: self.depth,
        }
    }

    /// Local bounds, empty for a degenerate box.
    #[must_use]
    pub fn bounds(&self) -> Bounds {
        if self.is_degenerate() {
            return Bounds::EMPTY;
        }
        let half = Vec3::new(self.width / 2.0, self.height / 2.0, self.depth / 2.0);
        Bounds::new(-half, half)
    }

    /// Whether the local point lies within the box's XY footprint.
    #[must_use]
    pub fn contains(&self, p: Point) -> bool {
        p.x.abs() <= self.width / 2.0 && p.y.abs() <= self.height / 2.0
    }

    /// Slab test of `ray` against the box.
    ///
    /// Returns the entry hit when it is in the clip range and front faces are
    /// not culled, otherwise the exit hit when it is in range and back faces
    /// are not culled.
    #[must_use]
    pub fn intersect_ray(&self, ray: &PickRay, cull: CullFace) -> Option<BoxIntersection> {
        if self.is_degenerate() {
            return None;
        }
        // A ray parallel to a slab is unbounded along it when the origin lies
        // between the planes, faces included, and misses otherwise.
        let slab = |half: f64, origin: f64, dir: f64| {
            if dir == 0.0 {
                let inside = origin.abs() <= half;
                return inside.then_some((f64::NEG_INFINITY, f64::INFINITY, false));
            }
            let inv = 1.0 / dir;
            let sign = inv < 0.0;
            let t0 = ((if sign { half } else { -half }) - origin) * inv;
            let t1 = ((if sign { -half } else { half }) - origin) * inv;
            Some((t0, t1, sign))
        };

        let (mut t0, mut t1, sx) = slab(self.width / 2.0, ray.origin.x, ray.direction.x)?;
        let mut near_face = if sx { BoxFace::Right } else { BoxFace::Left };
        let mut far_face = if sx { BoxFace::Left } else { BoxFace::Right };

        let (ty0, ty1, sy) = slab(self.height / 2.0, ray.origin.y, ray.direction.y)?;
        if t0 > ty1 || ty0 > t1 {
            return None;
        }
        if ty0 > t0 {
            near_face = if sy { BoxFace::Bottom } else { BoxFace::Top };
            t0 = ty0;
        }
        if ty1 < t1 {
            far_face = if sy { BoxFace::Top } else { BoxFace::Bottom };
            t1 = ty1;
        }

        let (tz0, tz1, sz) = slab(self.depth / 2.0, ray.origin.z, ray.direction.z)?;
        if t0 > tz1 || tz0 > t1 {
            return None;
        }
        if tz0 > t0 {
            near_face = if sz { BoxFace::Back } else { BoxFace::Front };
            t0 = tz0;
        }
        if tz1 < t1 {
            far_face = if sz { BoxFace::Front } else { BoxFace::Back };
            t1 = tz1;
        }

        if t0 > ray.far_clip {
            return None;
        }
        let (distance, face) = if t0 < ray.near_clip || cull == CullFace::Front {
            if ray.in_clip(t1) && cull != CullFace::Back {
                (t1, far_face)
            } else {
                return None;
            }
        } else {
            (t0, near_face)
        };
        if !distance.is_finite() {
            return None;
        }
        Some(BoxIntersection { distance, face })
    }

    /// Texture coordinate of local `point` on `face`.
    #[must_use]
    pub fn tex_coord(&self, face: BoxFace, point: Vec3) -> Point {
        let (w, h, d) = (self.width, self.height, self.depth);
        match face {
            BoxFace::Left => Point::new(0.5 - point.z / d, 0.5 + point.y / h),
            BoxFace::Right => Point::new(0.5 + point.z / d, 0.5 + point.y / h),
            BoxFace::Top => Point::new(0.5 + point.x / w, 0.5 - point.z / d),
            BoxFace::Bottom => Point::new(0.5 + point.x / w, 0.5 + point.z / d),
            BoxFace::Front => Point::new(0.5 + point.x / w, 0.5 + point.y / h),
            BoxFace::Back => Point::new(0.5 - point.x / w, 0.5 + point.y / h),
        }
    }

    /// Picks the box, offering a closer hit to `chooser`.
    ///
    /// Returns whether the ray hits at all, even when the chooser already
    /// holds something closer.
    pub fn compute_intersects(
        &self,
        ray: &PickRay,
        chooser: &mut PickResultChooser,
        cull: CullFace,
    ) -> bool {
        let Some(hit) = self.intersect_ray(ray, cull) else {
            return false;
        };
        if chooser.is_closer(hit.distance) {
            let point = ray.point_at(hit.distance);
            let uv = self.tex_coord(hit.face, point);
            chooser.offer(hit.distance, None, point, Some(uv));
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis_ray() -> PickRay {
        PickRay::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z_AXIS)
    }

    #[test]
    fn entry_and_exit_follow_culling() {
        let b = BoxShape::default();
        let back = b.intersect_ray(&axis_ray(), CullFace::Back).expect("hit");
        assert_eq!(back.distance, 9.0);
        assert_eq!(back.face, BoxFace::Front);

        let front = b.intersect_ray(&axis_ray(), CullFace::Front).expect("hit");
        assert_eq!(front.distance, 11.0);
        assert_eq!(front.face, BoxFace::Back);

        let none = b.intersect_ray(&axis_ray(), CullFace::None).expect("hit");
        assert_eq!(none.distance, 9.0);
    }

    #[test]
    fn origin_inside_reports_exit_unless_back_culled() {
        let b = BoxShape::default();
        let ray = PickRay::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = b.intersect_ray(&ray, CullFace::None).expect("exit");
        assert_eq!((hit.distance, hit.face), (1.0, BoxFace::Right));
        assert!(b.intersect_ray(&ray, CullFace::Back).is_none());
    }

    #[test]
    fn parallel_ray_outside_a_slab_misses() {
        let b = BoxShape::default();
        let ray = PickRay::new(Vec3::new(5.0, 0.0, -10.0), Vec3::Z_AXIS);
        assert!(b.intersect_ray(&ray, CullFace::None).is_none());
        let behind = PickRay::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z_AXIS);
        assert!(b.intersect_ray(&behind, CullFace::None).is_none());
    }

    #[test]
    fn parallel_ray_on_a_face_plane_still_exits() {
        let b = BoxShape::default();
        let grazing = PickRay::new(Vec3::new(1.0, 0.0, -10.0), Vec3::Z_AXIS);
        let exit = b.intersect_ray(&grazing, CullFace::Front).expect("hit");
        assert_eq!(exit.distance, 11.0);
        assert_eq!(exit.face, BoxFace::Back);

        let on_face = PickRay::new(Vec3::new(1.0, 0.0, 0.0), Vec3::Z_AXIS);
        let exit = b.intersect_ray(&on_face, CullFace::None).expect("hit");
        assert_eq!(exit.distance, 1.0);
        assert_eq!(exit.face, BoxFace::Back);

        let outside = PickRay::new(Vec3::new(1.0 + 1e-9, 0.0, -10.0), Vec3::Z_AXIS);
        assert!(b.intersect_ray(&outside, CullFace::None).is_none());
    }

    #[test]
    fn far_clip_rejects() {
        let b = BoxShape::default();
        let ray = axis_ray().with_clip(0.0, 5.0);
        assert!(b.intersect_ray(&ray, CullFace::Back).is_none());
    }

    #[test]
    fn negative_direction_enters_the_back_face() {
        let b = BoxShape::new(2.0, 4.0, 6.0);
        let ray = PickRay::new(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z_AXIS);
        let hit = b.intersect_ray(&ray, CullFace::Back).expect("hit");
        assert_eq!((hit.distance, hit.face), (7.0, BoxFace::Back));
        let side = PickRay::new(Vec3::new(0.0, -10.0, 0.0), Vec3::new(0.0, 1.0, 0.0));
        let hit = b.intersect_ray(&side, CullFace::Back).expect("hit");
        assert_eq!((hit.distance, hit.face), (8.0, BoxFace::Top));
    }

    #[test]
    fn face_uvs_are_not_mirror_images() {
        let b = BoxShape::new(2.0, 2.0, 2.0);
        let p = Vec3::new(0.5, 0.5, 0.5);
        assert_eq!(b.tex_coord(BoxFace::Front, p), Point::new(0.75, 0.75));
        assert_eq!(b.tex_coord(BoxFace::Back, p), Point::new(0.25, 0.75));
        assert_eq!(b.tex_coord(BoxFace::Left, p), Point::new(0.25, 0.75));
        assert_eq!(b.tex_coord(BoxFace::Right, p), Point::new(0.75, 0.75));
        assert_eq!(b.tex_coord(BoxFace::Top, p), Point::new(0.75, 0.25));
        assert_eq!(b.tex_coord(BoxFace::Bottom, p), Point::new(0.75, 0.75));
    }

    #[test]
    fn pick_offers_uv_at_entry() {
        let b = BoxShape::default();
        let mut chooser = PickResultChooser::new();
        let ray = PickRay::new(Vec3::new(0.5, -0.5, -10.0), Vec3::Z_AXIS);
        assert!(b.compute_intersects(&ray, &mut chooser, CullFace::Back));
        let hit = chooser.into_result().expect("hit");
        assert_eq!(hit.distance, 9.0);
        assert_eq!(hit.face, None);
        assert_eq!(hit.tex_coord, Some(Point::new(0.75, 0.25)));
    }

    #[test]
    fn degenerate_boxes_are_empty() {
        let b = BoxShape::new(0.0, 2.0, 2.0);
        assert!(b.is_degenerate());
        assert!(b.bounds().is_empty());
        assert!(b.intersect_ray(&axis_ray(), CullFace::None).is_none());
        assert!(BoxShape::new(1.0, f64::NAN, 1.0).is_degenerate());
    }

    #[test]
    fn containment_uses_the_footprint() {
        let b = BoxShape::new(4.0, 2.0, 1.0);
        assert!(b.contains(Point::new(2.0, -1.0)));
        assert!(!b.contains(Point::new(2.1, 0.0)));
    }
}
