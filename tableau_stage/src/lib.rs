// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screens and anchor-positioned popup windows.
//!
//! `tableau_stage` decides *where* a popup goes; it never opens a native
//! window. A toolkit reads [`PopupWindow::position`], [`PopupWindow::size`]
//! and [`PopupWindow::root_translation`] after each call and applies them to
//! its own window.
//!
//! **[`screen`]**: The [`Desktop`](screen::Desktop) contract for enumerating
//! screens and their usable areas, plus point-to-screen lookup.
//!
//! **[`anchor`]**: The eight named anchor corners.
//!
//! **[`popup`]**: The [`PopupWindow`](popup::PopupWindow) positioner with
//! bounds caching, autofix clamping and autohide activation.

pub mod anchor;
pub mod error;
pub mod popup;
pub mod screen;

pub use anchor::AnchorLocation;
pub use error::{Error, Result};
pub use popup::{PopupRoot, PopupWindow};
pub use screen::{Desktop, Screen, StaticDesktop};
