// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Named anchor corners.

/// The corner of a popup that is placed at the anchor point.
///
/// `Window*` corners refer to the popup's extended bounds (window decoration
/// and content together); `Content*` corners refer to the root's layout
/// bounds only.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AnchorLocation {
    /// Top-left corner of the window.
    #[default]
    WindowTopLeft,
    /// Top-right corner of the window.
    WindowTopRight,
    /// Bottom-left corner of the window.
    WindowBottomLeft,
    /// Bottom-right corner of the window.
    WindowBottomRight,
    /// Top-left corner of the content.
    ContentTopLeft,
    /// Top-right corner of the content.
    ContentTopRight,
    /// Bottom-left corner of the content.
    ContentBottomLeft,
    /// Bottom-right corner of the content.
    ContentBottomRight,
}

impl AnchorLocation {
    /// All eight locations.
    pub const ALL: [Self; 8] = [
        Self::WindowTopLeft,
        Self::WindowTopRight,
        Self::WindowBottomLeft,
        Self::WindowBottomRight,
        Self::ContentTopLeft,
        Self::ContentTopRight,
        Self::ContentBottomLeft,
        Self::ContentBottomRight,
    ];

    /// Fraction of the anchor bounds' width between its left edge and the
    /// anchor point.
    #[must_use]
    pub const fn x_coef(self) -> f64 {
        match self {
            Self::WindowTopLeft
            | Self::WindowBottomLeft
            | Self::ContentTopLeft
            | Self::ContentBottomLeft => 0.0,
            Self::WindowTopRight
            | Self::WindowBottomRight
            | Self::ContentTopRight
            | Self::ContentBottomRight => 1.0,
        }
    }

    /// Fraction of the anchor bounds' height between its top edge and the
    /// anchor point.
    #[must_use]
    pub const fn y_coef(self) -> f64 {
        match self {
            Self::WindowTopLeft
            | Self::WindowTopRight
            | Self::ContentTopLeft
            | Self::ContentTopRight => 0.0,
            Self::WindowBottomLeft
            | Self::WindowBottomRight
            | Self::ContentBottomLeft
            | Self::ContentBottomRight => 1.0,
        }
    }

    /// Whether the corner belongs to the content rather than the window.
    #[must_use]
    pub const fn is_content_location(self) -> bool {
        matches!(
            self,
            Self::ContentTopLeft
                | Self::ContentTopRight
                | Self::ContentBottomLeft
                | Self::ContentBottomRight
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficients_are_corner_fractions() {
        for loc in AnchorLocation::ALL {
            assert!(loc.x_coef() == 0.0 || loc.x_coef() == 1.0, "{loc:?}");
            assert!(loc.y_coef() == 0.0 || loc.y_coef() == 1.0, "{loc:?}");
        }
        assert_eq!(AnchorLocation::WindowBottomRight.x_coef(), 1.0);
        assert_eq!(AnchorLocation::ContentTopRight.y_coef(), 0.0);
    }

    #[test]
    fn half_the_locations_are_content_relative() {
        let content = AnchorLocation::ALL
            .iter()
            .filter(|l| l.is_content_location())
            .count();
        assert_eq!(content, 4);
        assert!(!AnchorLocation::default().is_content_location());
    }
}
