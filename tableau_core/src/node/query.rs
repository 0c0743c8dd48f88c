// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometric queries over the tree: bounds, containment, picking and shape
//! algebra between nodes.

use kurbo::{Affine, Point};

use crate::bounds::Bounds;
use crate::error::Result;
use crate::math::Vec3;
use crate::pick::{PickRay, PickResult, PickResultChooser};
use crate::shape::{self, Shape};
use crate::transform::Transform3d;

use super::id::NodeId;
use super::store::{NodeContent, SceneGraph};

/// Whether `t` keeps the `z = 0` plane parallel to itself, so 2D bounds can
/// be computed through the equivalent [`Affine`].
fn is_planar(t: &Transform3d) -> bool {
    let c = &t.cols;
    c[0][2] == 0.0 && c[1][2] == 0.0 && c[0][3] == 0.0 && c[1][3] == 0.0 && c[3][3] == 1.0
}

impl SceneGraph {
    /// Bounds of the node and its subtree in its parent's coordinates.
    #[must_use]
    pub fn bounds_in_parent(&self, id: NodeId) -> Bounds {
        self.validate(id);
        self.subtree_bounds(id.idx, &self.local_transform[id.idx as usize])
    }

    /// Bounds of the node and its subtree in its own coordinates.
    #[must_use]
    pub fn bounds_in_local(&self, id: NodeId) -> Bounds {
        self.validate(id);
        self.subtree_bounds(id.idx, &Transform3d::IDENTITY)
    }

    fn subtree_bounds(&self, idx: u32, transform: &Transform3d) -> Bounds {
        let mut bounds = self.content_bounds(idx, transform);
        for &child in &self.children[idx as usize] {
            let to_child = *transform * self.local_transform[child as usize];
            bounds = bounds.union(self.subtree_bounds(child, &to_child));
        }
        bounds
    }

    fn content_bounds(&self, idx: u32, transform: &Transform3d) -> Bounds {
        match &self.content[idx as usize] {
            NodeContent::Group => Bounds::EMPTY,
            NodeContent::Shape(shape) if is_planar(transform) => {
                let mut b = shape.bounds(transform.to_affine2d(), &self.config);
                if !b.is_empty() {
                    b.min.z = transform.cols[3][2];
                    b.max.z = transform.cols[3][2];
                }
                b
            }
            NodeContent::Shape(shape) => shape
                .bounds(Affine::IDENTITY, &self.config)
                .transformed(transform),
            NodeContent::Shape3d(shape) => shape.bounds(&self.meshes).transformed(transform),
        }
    }

    /// Whether the node's subtree contains `point`, given in the node's local
    /// coordinates.
    ///
    /// # Errors
    ///
    /// Fails with [`Error::Unsupported`](crate::Error::Unsupported) when the
    /// test reaches a mesh view.
    pub fn contains(&self, id: NodeId, point: Point) -> Result<bool> {
        self.validate(id);
        self.subtree_contains(id.idx, point)
    }

    fn subtree_contains(&self, idx: u32, point: Point) -> Result<bool> {
        let hit = match &self.content[idx as usize] {
            NodeContent::Group => false,
            NodeContent::Shape(shape) => shape.contains(point, &self.config),
            NodeContent::Shape3d(shape) => shape.contains(point)?,
        };
        if hit {
            return Ok(true);
        }
        for &child in &self.children[idx as usize] {
            if let Some(inverse) = self.local_transform[child as usize].inverse() {
                let local = inverse.transform_point(Vec3::new(point.x, point.y, 0.0));
                if self.subtree_contains(child, Point::new(local.x, local.y))? {
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }

    /// Finds the closest node hit by `ray`, given in scene coordinates.
    ///
    /// Uses the world transforms of the last [`evaluate`](Self::evaluate).
    /// Nodes with a singular world transform are skipped.
    #[must_use]
    pub fn pick(&self, ray: &PickRay) -> Option<PickResult> {
        let mut chooser = PickResultChooser::new();
        for idx in 0..self.len {
            let i = idx as usize;
            if !self.alive[i] || matches!(self.content[i], NodeContent::Group) {
                continue;
            }
            let Some(inverse) = self.world_transform[i].inverse() else {
                continue;
            };
            let local = ray.transformed(&inverse);
            chooser.set_candidate(Some(self.id_at(idx)));
            match &self.content[i] {
                NodeContent::Shape(shape) => {
                    shape.compute_intersects(&local, &mut chooser, &self.config);
                }
                NodeContent::Shape3d(shape) => {
                    shape.compute_intersects(&local, &mut chooser, &self.meshes);
                }
                NodeContent::Group => {}
            }
        }
        chooser.into_result()
    }

    /// Points drawn by either node, in scene coordinates.
    ///
    /// # Errors
    ///
    /// Fails when either node is not a 2D shape.
    pub fn union(&self, a: NodeId, b: NodeId) -> Result<Shape> {
        let (sa, ta, sb, tb) = self.operands(a, b)?;
        Ok(shape::union(sa, ta, sb, tb, &self.config))
    }

    /// Points drawn by `a` but not `b`, in scene coordinates.
    ///
    /// # Errors
    ///
    /// Fails when either node is not a 2D shape.
    pub fn subtract(&self, a: NodeId, b: NodeId) -> Result<Shape> {
        let (sa, ta, sb, tb) = self.operands(a, b)?;
        Ok(shape::subtract(sa, ta, sb, tb, &self.config))
    }

    /// Points drawn by both nodes, in scene coordinates.
    ///
    /// # Errors
    ///
    /// Fails when either node is not a 2D shape.
    pub fn intersect(&self, a: NodeId, b: NodeId) -> Result<Shape> {
        let (sa, ta, sb, tb) = self.operands(a, b)?;
        Ok(shape::intersect(sa, ta, sb, tb, &self.config))
    }

    fn operands(&self, a: NodeId, b: NodeId) -> Result<(&Shape, Affine, &Shape, Affine)> {
        let sa = self.expect_shape(a, "lhs")?;
        let sb = self.expect_shape(b, "rhs")?;
        Ok((
            sa,
            self.node_to_scene_transform(a).to_affine2d(),
            sb,
            self.node_to_scene_transform(b).to_affine2d(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::mesh::TriangleMesh;
    use crate::pick::CullFace;
    use crate::shape3d::Shape3d;

    #[test]
    fn bounds_in_parent_applies_the_local_transform() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let rect = graph.create_shape(Shape::rectangle(0.0, 0.0, 10.0, 20.0));
        graph.add_child(group, rect);
        graph.set_local_transform(rect, Transform3d::from_translation(5.0, 5.0, 0.0));

        let b = graph.bounds_in_parent(rect);
        assert_eq!(b.to_rect(), Some(kurbo::Rect::new(5.0, 5.0, 15.0, 25.0)));
        assert_eq!(graph.bounds_in_local(group), b);

        graph.set_local_transform(group, Transform3d::from_scale(2.0, 2.0, 1.0));
        let g = graph.bounds_in_parent(group);
        assert_eq!(g.to_rect(), Some(kurbo::Rect::new(10.0, 10.0, 30.0, 50.0)));
    }

    #[test]
    fn box_bounds_include_depth() {
        let mut graph = SceneGraph::new();
        let b = graph.create_shape3d(Shape3d::new_box(2.0, 4.0, 6.0));
        graph.set_local_transform(b, Transform3d::from_translation(0.0, 0.0, 10.0));
        let bounds = graph.bounds_in_parent(b);
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, 7.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 2.0, 13.0));
    }

    #[test]
    fn containment_descends_into_children() {
        let mut graph = SceneGraph::new();
        let group = graph.create_group();
        let circle = graph.create_shape(Shape::circle(0.0, 0.0, 5.0));
        graph.add_child(group, circle);
        graph.set_local_transform(circle, Transform3d::from_translation(100.0, 0.0, 0.0));

        assert_eq!(graph.contains(group, Point::new(102.0, 0.0)), Ok(true));
        assert_eq!(graph.contains(group, Point::new(2.0, 0.0)), Ok(false));
    }

    #[test]
    fn mesh_view_containment_surfaces_unsupported() {
        let mut graph = SceneGraph::new();
        let mesh = graph.add_mesh(TriangleMesh::new_box(1.0, 1.0, 1.0));
        let view = graph.create_shape3d(Shape3d::mesh_view(Some(mesh)));
        assert!(matches!(
            graph.contains(view, Point::ZERO),
            Err(Error::Unsupported(_))
        ));
    }

    #[test]
    fn pick_returns_the_closest_node() {
        let mut graph = SceneGraph::new();
        let near = graph.create_shape3d(Shape3d::new_box(2.0, 2.0, 2.0));
        let far = graph.create_shape3d(Shape3d::new_box(2.0, 2.0, 2.0));
        let flat = graph.create_shape(Shape::rectangle(-5.0, -5.0, 10.0, 10.0));
        graph.set_local_transform(near, Transform3d::from_translation(0.0, 0.0, 5.0));
        graph.set_local_transform(far, Transform3d::from_translation(0.0, 0.0, 20.0));
        graph.set_local_transform(flat, Transform3d::from_translation(0.0, 0.0, 30.0));
        let _ = graph.evaluate();

        let ray = PickRay::new(Vec3::new(0.0, 0.0, -10.0), Vec3::Z_AXIS);
        let hit = graph.pick(&ray).expect("hit");
        assert_eq!(hit.node, Some(near));
        assert_eq!(hit.distance, 14.0);

        if let Some(s) = graph.shape3d_mut(near) {
            s.set_cull_face(CullFace::Front);
        }
        let hit = graph.pick(&ray).expect("hit");
        assert_eq!((hit.node, hit.distance), (Some(near), 16.0));

        let offset = PickRay::new(Vec3::new(4.0, 4.0, -10.0), Vec3::Z_AXIS);
        let hit = graph.pick(&offset).expect("hit");
        assert_eq!((hit.node, hit.distance), (Some(flat), 40.0));
    }

    #[test]
    fn algebra_uses_scene_transforms() {
        let mut graph = SceneGraph::new();
        let a = graph.create_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        let b = graph.create_shape(Shape::rectangle(0.0, 0.0, 10.0, 10.0));
        graph.set_local_transform(b, Transform3d::from_translation(5.0, 0.0, 0.0));
        let cfg = *graph.config();

        let i = graph.intersect(a, b).expect("shapes");
        assert!((i.occupied_area(Affine::IDENTITY, &cfg).area() - 50.0).abs() < 1e-6);
        let u = graph.union(a, b).expect("shapes");
        assert!((u.occupied_area(Affine::IDENTITY, &cfg).area() - 150.0).abs() < 1e-6);
        let d = graph.subtract(a, b).expect("shapes");
        assert!(d.contains(Point::new(2.0, 5.0), &cfg));
        assert!(!d.contains(Point::new(7.0, 5.0), &cfg));

        let g = graph.create_group();
        assert!(matches!(graph.union(a, g), Err(Error::InvalidArgument { .. })));
    }
}
