// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type for window placement.

use thiserror::Error;

/// Result alias used throughout `tableau_stage`.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors reported by popup windows.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum Error {
    /// An anchor coordinate was NaN or infinite.
    #[error("anchor coordinates must be finite, got ({x}, {y})")]
    NonFiniteAnchor {
        /// Requested X.
        x: f64,
        /// Requested Y.
        y: f64,
    },
}
