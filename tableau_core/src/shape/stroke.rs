// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Stroke attributes.

use kurbo::{Cap, Join, Stroke};

/// Where the stroke lies relative to the outline.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeType {
    /// Entirely inside the filled area.
    Inside,
    /// Entirely outside the filled area.
    Outside,
    /// Straddling the outline, half on each side.
    #[default]
    Centered,
}

/// Decoration at the ends of open subpaths and dashes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeLineCap {
    /// Square extension by half the stroke width.
    #[default]
    Square,
    /// Flat end at the endpoint.
    Butt,
    /// Semicircular end.
    Round,
}

/// Decoration where two segments meet.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum StrokeLineJoin {
    /// Sharp corner, limited by the miter limit.
    #[default]
    Miter,
    /// Corner cut off flat.
    Bevel,
    /// Rounded corner.
    Round,
}

/// The smallest stroke width used in geometry math.
pub const MIN_STROKE_WIDTH: f64 = 0.0;

/// The smallest miter limit used in geometry math.
pub const MIN_STROKE_MITER_LIMIT: f64 = 1.0;

/// Stroke geometry attributes of a shape.
///
/// Values are stored as configured. Geometry code reads them through
/// [`width`](Self::width) and [`miter_limit`](Self::miter_limit), which clamp
/// to [`MIN_STROKE_WIDTH`] and [`MIN_STROKE_MITER_LIMIT`].
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeStyle {
    /// Placement relative to the outline.
    pub stroke_type: StrokeType,
    /// Configured width.
    pub stroke_width: f64,
    /// End cap.
    pub line_cap: StrokeLineCap,
    /// Join style.
    pub line_join: StrokeLineJoin,
    /// Configured miter limit.
    pub miter_limit: f64,
    /// Alternating dash and gap lengths. Empty means solid.
    pub dash_array: Vec<f64>,
    /// Distance into the dash pattern at which the stroke starts.
    pub dash_offset: f64,
}

impl Default for StrokeStyle {
    fn default() -> Self {
        Self {
            stroke_type: StrokeType::Centered,
            stroke_width: 1.0,
            line_cap: StrokeLineCap::Square,
            line_join: StrokeLineJoin::Miter,
            miter_limit: 10.0,
            dash_array: Vec::new(),
            dash_offset: 0.0,
        }
    }
}

impl StrokeStyle {
    /// Width clamped to [`MIN_STROKE_WIDTH`]. NaN clamps too.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.stroke_width.max(MIN_STROKE_WIDTH)
    }

    /// Miter limit clamped to [`MIN_STROKE_MITER_LIMIT`].
    #[must_use]
    pub fn miter_limit(&self) -> f64 {
        self.miter_limit.max(MIN_STROKE_MITER_LIMIT)
    }

    /// Returns a copy with clamped values and `join` as the join style.
    #[must_use]
    pub fn resolved(&self, join: StrokeLineJoin) -> Self {
        Self {
            stroke_width: self.width(),
            miter_limit: self.miter_limit(),
            line_join: join,
            ..self.clone()
        }
    }

    /// Builds the kurbo stroke that sweeps this style's outline.
    ///
    /// Inside and outside strokes are swept at twice the width; callers clip
    /// the result against the fill.
    pub(crate) fn to_kurbo(&self, join: StrokeLineJoin, dashed: bool) -> Stroke {
        let width = match self.stroke_type {
            StrokeType::Centered => self.width(),
            StrokeType::Inside | StrokeType::Outside => self.width() * 2.0,
        };
        let join = match join {
            StrokeLineJoin::Miter => Join::Miter,
            StrokeLineJoin::Bevel => Join::Bevel,
            StrokeLineJoin::Round => Join::Round,
        };
        let cap = match self.line_cap {
            StrokeLineCap::Square => Cap::Square,
            StrokeLineCap::Butt => Cap::Butt,
            StrokeLineCap::Round => Cap::Round,
        };
        let stroke = Stroke::new(width)
            .with_join(join)
            .with_miter_limit(self.miter_limit())
            .with_caps(cap);
        let has_dashes = self.dash_array.iter().any(|d| *d > 0.0);
        if dashed && has_dashes {
            stroke.with_dashes(self.dash_offset, self.dash_array.iter().copied())
        } else {
            stroke
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_toolkit() {
        let s = StrokeStyle::default();
        assert_eq!(s.stroke_type, StrokeType::Centered);
        assert_eq!(s.width(), 1.0);
        assert_eq!(s.line_cap, StrokeLineCap::Square);
        assert_eq!(s.line_join, StrokeLineJoin::Miter);
        assert_eq!(s.miter_limit(), 10.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let s = StrokeStyle {
            stroke_width: -4.0,
            miter_limit: 0.25,
            ..StrokeStyle::default()
        };
        assert_eq!(s.width(), 0.0);
        assert_eq!(s.miter_limit(), 1.0);
        let r = s.resolved(StrokeLineJoin::Bevel);
        assert_eq!(r.stroke_width, 0.0);
        assert_eq!(r.line_join, StrokeLineJoin::Bevel);
    }

    #[test]
    fn inside_and_outside_sweep_double_width() {
        let s = StrokeStyle {
            stroke_type: StrokeType::Outside,
            stroke_width: 3.0,
            ..StrokeStyle::default()
        };
        assert_eq!(s.to_kurbo(StrokeLineJoin::Miter, false).width, 6.0);
    }
}
