// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Error type shared by the mesh store, shape constructors and 3D shapes.
//!
//! Only genuinely caller-visible failures are modelled here. Degenerate
//! geometry and non-invertible transforms are recovered where they occur
//! (empty bounds, absent texture coordinates) and never reach this type.

use thiserror::Error;

/// Convenience alias used throughout the crate.
pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Errors raised synchronously by mutating or querying calls.
///
/// A call that returns an error has not committed any partial mutation.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// An index, length, or array size violated its constraint.
    #[error("invalid argument `{what}`: {reason}")]
    InvalidArgument {
        /// The argument or array that failed validation.
        what: &'static str,
        /// Human-readable description of the violated constraint.
        reason: String,
    },

    /// The operation is not available for this kind of node.
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// SVG path data could not be parsed.
    #[error("invalid SVG path data: {0}")]
    SvgPath(String),
}

impl Error {
    pub(crate) fn invalid(what: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            what,
            reason: reason.into(),
        }
    }
}
