// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Boolean operations between shapes.
//!
//! Each operand contributes the area it actually draws (see
//! [`Shape::occupied_area`]) mapped into a common space by its transform.
//! The result is a new filled [`Path`] shape in that space.

use kurbo::Affine;

use super::area::Area;
use super::path::{FillRule, Path, PathElement};
use super::{Shape, ShapeKind, ShapeMode, StrokeType};
use crate::config::GeometryConfig;
use crate::paint::{Color, Paint};

/// Points drawn by either shape.
#[must_use]
pub fn union(
    a: &Shape,
    a_transform: Affine,
    b: &Shape,
    b_transform: Affine,
    config: &GeometryConfig,
) -> Shape {
    let lhs = a.occupied_area(a_transform, config);
    let rhs = b.occupied_area(b_transform, config);
    shape_from_area(&lhs.union(&rhs, config))
}

/// Points drawn by `a` but not by `b`.
#[must_use]
pub fn subtract(
    a: &Shape,
    a_transform: Affine,
    b: &Shape,
    b_transform: Affine,
    config: &GeometryConfig,
) -> Shape {
    let lhs = a.occupied_area(a_transform, config);
    let rhs = b.occupied_area(b_transform, config);
    shape_from_area(&lhs.subtract(&rhs, config))
}

/// Points drawn by both shapes.
#[must_use]
pub fn intersect(
    a: &Shape,
    a_transform: Affine,
    b: &Shape,
    b_transform: Affine,
    config: &GeometryConfig,
) -> Shape {
    let lhs = a.occupied_area(a_transform, config);
    let rhs = b.occupied_area(b_transform, config);
    shape_from_area(&lhs.intersect(&rhs, config))
}

pub(super) fn occupied_area(shape: &Shape, transform: Affine, config: &GeometryConfig) -> Area {
    let tolerance = config.flatten_tolerance;
    let stroke_type = shape.stroke_style.stroke_type;
    let fill = || {
        Area::from_path(
            &(transform * shape.outline().clone()),
            shape.fill_rule(),
            tolerance,
        )
    };
    match shape.mode {
        ShapeMode::Empty => return Area::new(),
        ShapeMode::Fill => return fill(),
        ShapeMode::StrokeFill if stroke_type == StrokeType::Inside => return fill(),
        ShapeMode::Stroke | ShapeMode::StrokeFill => {}
    }
    let swept = Area::from_path(
        &(transform * shape.swept_stroke(config, true)),
        FillRule::NonZero,
        tolerance,
    );
    let stroke = match stroke_type {
        StrokeType::Centered => swept,
        StrokeType::Inside => swept.intersect(&fill(), config),
        StrokeType::Outside => swept.subtract(&fill(), config),
    };
    if shape.mode == ShapeMode::Stroke {
        stroke
    } else {
        fill().union(&stroke, config)
    }
}

/// Builds a black-filled, unstroked path shape tracing `area`.
fn shape_from_area(area: &Area) -> Shape {
    let mut elements = Vec::new();
    for contour in area.contours() {
        let mut points = contour.iter();
        let Some(first) = points.next() else {
            continue;
        };
        elements.push(PathElement::move_to(first.x, first.y));
        elements.extend(points.map(|p| PathElement::line_to(p.x, p.y)));
        elements.push(PathElement::ClosePath);
    }
    let mut shape = Shape::new(ShapeKind::Path(Path {
        elements,
        fill_rule: area.fill_rule(),
    }));
    shape.set_fill(Some(Paint::Solid(Color::BLACK)));
    shape.set_stroke(None);
    shape
}
