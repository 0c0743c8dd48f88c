// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paints and materials.
//!
//! The scene graph never inspects these beyond checking for presence: a
//! shape's paint mode is derived from whether it has a fill and a stroke.
//! Resolution to a platform paint happens in the peer at sync time.

/// A straight-alpha sRGB color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red, `0.0..=1.0`.
    pub r: f32,
    /// Green, `0.0..=1.0`.
    pub g: f32,
    /// Blue, `0.0..=1.0`.
    pub b: f32,
    /// Alpha, `0.0..=1.0`.
    pub a: f32,
}

impl Color {
    /// Opaque black.
    pub const BLACK: Self = Self::rgb(0.0, 0.0, 0.0);
    /// Opaque white.
    pub const WHITE: Self = Self::rgb(1.0, 1.0, 1.0);
    /// Light gray, the diffuse color of the default material.
    pub const LIGHT_GRAY: Self = Self::rgb(0.827, 0.827, 0.827);
    /// Fully transparent.
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    /// Creates an opaque color.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }
}

/// A fill or stroke paint.
#[derive(Clone, Debug, PartialEq)]
pub enum Paint {
    /// A solid color.
    Solid(Color),
    /// A paint owned by the embedder (gradient, image pattern, ...), resolved
    /// by the peer from this handle.
    External(u64),
}

impl From<Color> for Paint {
    fn from(color: Color) -> Self {
        Self::Solid(color)
    }
}

/// Phong-style surface material for 3D shapes.
#[derive(Clone, Debug, PartialEq)]
pub struct Material {
    /// Diffuse color.
    pub diffuse: Color,
    /// Specular color, if the surface has a highlight.
    pub specular: Option<Color>,
    /// Specular exponent.
    pub specular_power: f64,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            diffuse: Color::LIGHT_GRAY,
            specular: None,
            specular_power: 32.0,
        }
    }
}
