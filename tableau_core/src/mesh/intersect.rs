// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Ray/triangle picking against a [`TriangleMesh`].

use core::f64::consts::FRAC_PI_2;

use kurbo::{Affine, Point};

use super::TriangleMesh;
use crate::math::Vec3;
use crate::pick::{CullFace, PickRay, PickResultChooser};
use crate::transform::Transform3d;

impl TriangleMesh {
    /// Tests `ray` (in mesh-local space) against every triangle.
    ///
    /// Returns `true` if any triangle is hit. Every triangle is tested so the
    /// chooser ends up holding the closest hit; hit points and texture
    /// coordinates are only computed for candidates closer than the current
    /// best. Faces whose indices fall outside the point array are skipped.
    pub fn compute_intersects(
        &self,
        ray: &PickRay,
        chooser: &mut PickResultChooser,
        cull: CullFace,
    ) -> bool {
        let points = self.points();
        let tex_coords = self.tex_coords();
        let point_at = |i: i32| -> Option<Vec3> {
            let i = usize::try_from(i).ok()? * 3;
            let p = points.get(i..i + 3)?;
            Some(Vec3::new(f64::from(p[0]), f64::from(p[1]), f64::from(p[2])))
        };
        let tex_at = |i: i32| -> Option<Point> {
            let i = usize::try_from(i).ok()? * 2;
            let t = tex_coords.get(i..i + 2)?;
            Some(Point::new(f64::from(t[0]), f64::from(t[1])))
        };

        let mut hit = false;
        for (face, f) in self.faces().chunks_exact(6).enumerate() {
            let (Some(v0), Some(v1), Some(v2)) = (point_at(f[0]), point_at(f[2]), point_at(f[4]))
            else {
                continue;
            };
            let uv = match (tex_at(f[1]), tex_at(f[3]), tex_at(f[5])) {
                (Some(a), Some(b), Some(c)) => Some([a, b, c]),
                _ => None,
            };
            let triangle = Triangle { v: [v0, v1, v2], uv };
            // No short-circuit: a later face may be closer.
            hit |= triangle.intersect(ray, chooser, cull, face);
        }
        hit
    }
}

struct Triangle {
    v: [Vec3; 3],
    uv: Option<[Point; 3]>,
}

impl Triangle {
    fn intersect(
        &self,
        ray: &PickRay,
        chooser: &mut PickResultChooser,
        cull: CullFace,
        face: usize,
    ) -> bool {
        let [v0, v1, v2] = self.v;
        let dir = ray.direction;
        let e1 = v1 - v0;
        let e2 = v2 - v0;

        let h = dir.cross(e2);
        let a = e1.dot(h);
        if a == 0.0 {
            return false;
        }
        let f = 1.0 / a;

        let s = ray.origin - v0;
        let u = f * s.dot(h);
        if !(0.0..=1.0).contains(&u) {
            return false;
        }

        let q = s.cross(e1);
        let v = f * dir.dot(q);
        if v < 0.0 || u + v > 1.0 {
            return false;
        }

        let t = f * e2.dot(q);
        if !ray.in_clip(t) {
            return false;
        }

        if cull != CullFace::None {
            let normal = e1.cross(e2);
            let angle = normal.angle(-dir);
            if (angle >= FRAC_PI_2 && cull == CullFace::Back)
                || (angle <= FRAC_PI_2 && cull == CullFace::Front)
            {
                return false;
            }
        }

        if t.is_infinite() || t.is_nan() {
            return false;
        }

        if !chooser.is_closer(t) {
            return true;
        }

        let point = ray.point_at(t);
        let tex_coord = self.uv.and_then(|uv| self.tex_coord_at(point, uv));
        chooser.offer(t, Some(face), point, tex_coord);
        true
    }

    /// Maps `point` (on the triangle's plane) to texture space.
    ///
    /// The triangle is rotated so its normal lines up with Z, which flattens
    /// it onto the XY plane. The affine taking the unit basis onto the
    /// flattened triangle is inverted and composed with the one taking the
    /// unit basis onto the texture triangle. Returns `None` when the
    /// flattened triangle is degenerate.
    fn tex_coord_at(&self, point: Vec3, uv: [Point; 3]) -> Option<Point> {
        let [v0, v1, v2] = self.v;
        let centroid = (v0 + v1 + v2) * (1.0 / 3.0);
        let normal = (v1 - v0).cross(v2 - v0);
        let rotation = Transform3d::from_rotation(normal.cross(Vec3::Z_AXIS), normal.angle(Vec3::Z_AXIS));

        let flat = |p: Vec3| {
            let r = rotation.transform_point(p - centroid);
            Point::new(r.x, r.y)
        };
        let (p0, p1, p2) = (flat(v0), flat(v1), flat(v2));
        let to_triangle = Affine::new([p1.x - p0.x, p1.y - p0.y, p2.x - p0.x, p2.y - p0.y, p0.x, p0.y]);
        let det = to_triangle.determinant();
        if det == 0.0 || !det.is_finite() {
            return None;
        }
        let to_texture = Affine::new([
            uv[1].x - uv[0].x,
            uv[1].y - uv[0].y,
            uv[2].x - uv[0].x,
            uv[2].y - uv[0].y,
            uv[0].x,
            uv[0].y,
        ]);
        let mapped = to_texture * to_triangle.inverse() * flat(point);
        (mapped.x.is_finite() && mapped.y.is_finite()).then_some(mapped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One triangle in the z = 0 plane, facing -Z.
    fn quad_half() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        mesh.set_points(&[0.0, 0.0, 0.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0])
            .expect("points");
        mesh.set_tex_coords(&[0.0, 0.0, 0.0, 1.0, 1.0, 0.0])
            .expect("tex coords");
        mesh.set_faces(&[0, 0, 1, 1, 2, 2]).expect("faces");
        mesh
    }

    fn ray_from_front() -> PickRay {
        PickRay::new(Vec3::new(0.25, 0.25, -5.0), Vec3::Z_AXIS)
    }

    #[test]
    fn hit_reports_distance_point_and_uv() {
        let mesh = quad_half();
        let mut chooser = PickResultChooser::new();
        assert!(mesh.compute_intersects(&ray_from_front(), &mut chooser, CullFace::None));
        let hit = chooser.result().expect("hit");
        assert!((hit.distance - 5.0).abs() < 1e-12);
        assert_eq!(hit.face, Some(0));
        assert!((hit.point - Vec3::new(0.25, 0.25, 0.0)).length() < 1e-12);
        let uv = hit.tex_coord.expect("uv");
        assert!((uv.x - 0.25).abs() < 1e-9 && (uv.y - 0.25).abs() < 1e-9, "got {uv:?}");
    }

    #[test]
    fn cull_face_uses_normal_against_ray() {
        // e1 x e2 = (0,1,0) x (1,0,0) = (0,0,-1): faces the ray origin.
        let mesh = quad_half();
        let ray = ray_from_front();
        let mut back = PickResultChooser::new();
        assert!(mesh.compute_intersects(&ray, &mut back, CullFace::Back));
        let mut front = PickResultChooser::new();
        assert!(!mesh.compute_intersects(&ray, &mut front, CullFace::Front));
        assert!(front.is_empty());

        let behind = PickRay::new(Vec3::new(0.25, 0.25, 5.0), -Vec3::Z_AXIS);
        let mut back = PickResultChooser::new();
        assert!(!mesh.compute_intersects(&behind, &mut back, CullFace::Back));
    }

    #[test]
    fn misses_outside_and_parallel() {
        let mesh = quad_half();
        let mut chooser = PickResultChooser::new();
        let outside = PickRay::new(Vec3::new(0.9, 0.9, -5.0), Vec3::Z_AXIS);
        assert!(!mesh.compute_intersects(&outside, &mut chooser, CullFace::None));
        let parallel = PickRay::new(Vec3::new(0.25, 0.25, -5.0), Vec3::new(1.0, 0.0, 0.0));
        assert!(!mesh.compute_intersects(&parallel, &mut chooser, CullFace::None));
        let clipped = ray_from_front().with_clip(0.0, 4.0);
        assert!(!mesh.compute_intersects(&clipped, &mut chooser, CullFace::None));
    }

    #[test]
    fn farther_hit_still_counts_but_keeps_closest() {
        let mesh = quad_half();
        let mut chooser = PickResultChooser::new();
        chooser.offer(1.0, None, Vec3::ZERO, None);
        assert!(mesh.compute_intersects(&ray_from_front(), &mut chooser, CullFace::None));
        let best = chooser.result().expect("prior hit");
        assert_eq!(best.distance, 1.0, "closer prior hit is kept");
        assert_eq!(best.face, None);
    }

    #[test]
    fn all_faces_are_tested_for_closest() {
        let mut mesh = TriangleMesh::new();
        // Two stacked triangles: the far one first.
        mesh.set_points(&[
            0.0, 0.0, 2.0, 0.0, 1.0, 2.0, 1.0, 0.0, 2.0, //
            0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 1.0, 0.0, 1.0,
        ])
        .expect("points");
        mesh.set_tex_coords(&[0.0, 0.0]).expect("tex");
        mesh.set_faces(&[0, 0, 1, 0, 2, 0, 3, 0, 4, 0, 5, 0])
            .expect("faces");
        let mut chooser = PickResultChooser::new();
        assert!(mesh.compute_intersects(&ray_from_front(), &mut chooser, CullFace::None));
        let best = chooser.result().expect("hit");
        assert_eq!(best.face, Some(1));
        assert!((best.distance - 6.0).abs() < 1e-12);
    }

    #[test]
    fn missing_tex_coords_give_no_uv() {
        let mut mesh = quad_half();
        mesh.set_tex_coords(&[]).expect("empty");
        let mut chooser = PickResultChooser::new();
        assert!(mesh.compute_intersects(&ray_from_front(), &mut chooser, CullFace::None));
        assert_eq!(chooser.result().expect("hit").tex_coord, None);
    }
}
