// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Popup placement relative to an anchor point.
//!
//! A [`PopupWindow`] is positioned by naming a point on the desktop and the
//! corner of the popup ([`AnchorLocation`]) that should sit on it. The window
//! itself is sized to the *extended bounds* of its root (layout bounds unioned
//! with the drawn bounds), while the corner is measured on the *anchor bounds*
//! (the extended bounds, or just the layout bounds for content corners).
//!
//! With autofix active the anchor bounds are slid back onto the usable area
//! of the screen under the anchor point. The published anchor then reports
//! where the corner actually ended up.

use kurbo::{Point, Rect, Vec2};
use tableau_core::node::{NodeId, SceneGraph};

use crate::anchor::AnchorLocation;
use crate::error::{Error, Result};
use crate::screen::{Desktop, screen_for_point, usable_bounds};

/// The measured geometry of a popup's root node.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PopupRoot {
    /// Bounds the root's layout assigned to it.
    pub layout_bounds: Rect,
    /// Bounds of everything the root draws, in its own coordinates. `None`
    /// when it draws nothing.
    pub bounds_in_local: Option<Rect>,
}

impl PopupRoot {
    /// Root geometry with identical layout and drawn bounds.
    #[must_use]
    pub const fn from_layout(layout_bounds: Rect) -> Self {
        Self {
            layout_bounds,
            bounds_in_local: Some(layout_bounds),
        }
    }

    /// Measures the drawn bounds of scene node `id` and pairs them with the
    /// layout bounds its container assigned.
    #[must_use]
    pub fn from_scene(graph: &SceneGraph, id: NodeId, layout_bounds: Rect) -> Self {
        Self {
            layout_bounds,
            bounds_in_local: graph.bounds_in_local(id).to_rect(),
        }
    }

    fn extended_bounds(&self) -> Rect {
        match self.bounds_in_local {
            Some(drawn) => self.layout_bounds.union(drawn),
            None => self.layout_bounds,
        }
    }
}

/// A borderless window placed by anchor point.
#[derive(Debug)]
pub struct PopupWindow<D: Desktop> {
    desktop: D,
    root: Option<PopupRoot>,
    root_translation: Vec2,
    anchor_location: AnchorLocation,
    anchor: Point,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    showing: bool,
    auto_fix: bool,
    auto_hide: bool,
    consume_auto_hiding_events: bool,
    hide_on_escape: bool,
    auto_fix_active: bool,
    auto_hide_active: bool,
    extended_bounds: Option<Rect>,
    anchor_bounds: Option<Rect>,
}

impl<D: Desktop> PopupWindow<D> {
    /// Creates a hidden popup with no root.
    ///
    /// Autofix starts enabled; autohide starts disabled.
    pub fn new(desktop: D) -> Self {
        Self {
            desktop,
            root: None,
            root_translation: Vec2::ZERO,
            anchor_location: AnchorLocation::default(),
            anchor: Point::new(f64::NAN, f64::NAN),
            x: f64::NAN,
            y: f64::NAN,
            width: 0.0,
            height: 0.0,
            showing: false,
            auto_fix: true,
            auto_hide: false,
            consume_auto_hiding_events: true,
            hide_on_escape: true,
            auto_fix_active: false,
            auto_hide_active: false,
            extended_bounds: None,
            anchor_bounds: None,
        }
    }

    /// The desktop this popup is placed on.
    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// Mutable access to the desktop. Call [`screens_changed`](Self::screens_changed)
    /// after reconfiguring its screens.
    pub fn desktop_mut(&mut self) -> &mut D {
        &mut self.desktop
    }

    // --- Placement ---

    /// Shows the popup with its anchor corner at (`anchor_x`, `anchor_y`).
    ///
    /// Showing an already visible popup moves it.
    ///
    /// # Errors
    ///
    /// Fails when either coordinate is not finite. The popup is left as it
    /// was.
    pub fn show(&mut self, anchor_x: f64, anchor_y: f64) -> Result<()> {
        if !anchor_x.is_finite() || !anchor_y.is_finite() {
            return Err(Error::NonFiniteAnchor {
                x: anchor_x,
                y: anchor_y,
            });
        }
        self.showing = true;
        self.refresh_activation();
        self.update_window(anchor_x, anchor_y);
        tracing::debug!(x = self.x, y = self.y, "popup shown");
        Ok(())
    }

    /// Hides the popup. Its position is kept for the next
    /// [`show`](Self::show).
    pub fn hide(&mut self) {
        if !self.showing {
            return;
        }
        self.showing = false;
        self.refresh_activation();
        tracing::debug!("popup hidden");
    }

    /// Moves the window directly, deriving the anchor from the new position.
    ///
    /// This is the inverse of the anchor placement: no autofix is applied.
    pub fn set_window_position(&mut self, x: f64, y: f64) {
        let anchor_bounds = self.anchor_bounds();
        let extended = self.extended_bounds();
        let loc = self.anchor_location;
        self.x = x;
        self.y = y;
        self.anchor = Point::new(
            x - extended.x0 + anchor_bounds.x0 + loc.x_coef() * anchor_bounds.width(),
            y - extended.y0 + anchor_bounds.y0 + loc.y_coef() * anchor_bounds.height(),
        );
    }

    /// Changes which corner sits on the anchor point, keeping the point.
    pub fn set_anchor_location(&mut self, location: AnchorLocation) {
        if self.anchor_location == location {
            return;
        }
        self.anchor_location = location;
        self.invalidate_and_update();
    }

    /// Replaces the root. The window is resized and repositioned around the
    /// current anchor point.
    pub fn set_root(&mut self, root: Option<PopupRoot>) {
        self.root = root;
        self.invalidate_and_update();
    }

    /// Reports new geometry for the current root.
    ///
    /// Ignored when the popup has no root.
    pub fn content_bounds_changed(&mut self, root: PopupRoot) {
        if self.root.is_none() {
            return;
        }
        self.root = Some(root);
        self.invalidate_and_update();
    }

    /// Re-applies autofix after the desktop's screens changed.
    ///
    /// Only acts while autofix is active.
    pub fn screens_changed(&mut self) {
        if self.auto_fix_active {
            let anchor = self.anchor;
            self.update_window(anchor.x, anchor.y);
        }
    }

    fn invalidate_and_update(&mut self) {
        self.extended_bounds = None;
        self.anchor_bounds = None;
        let anchor = self.anchor;
        self.update_window(anchor.x, anchor.y);
    }

    fn update_window(&mut self, anchor_x: f64, anchor_y: f64) {
        let loc = self.anchor_location;
        let anchor_bounds = self.anchor_bounds();
        let extended = self.extended_bounds();

        let delta = Vec2::new(
            loc.x_coef() * anchor_bounds.width(),
            loc.y_coef() * anchor_bounds.height(),
        );
        let mut min_x = anchor_x - delta.x;
        let mut min_y = anchor_y - delta.y;

        if self.auto_fix_active
            && min_x.is_finite()
            && min_y.is_finite()
            && let Some(screen) =
                screen_for_point(self.desktop.screens(), Point::new(anchor_x, anchor_y))
        {
            let area = usable_bounds(&self.desktop, screen);
            min_x = keep_on_screen(min_x, anchor_bounds.width(), area.x0, area.x1, loc.x_coef());
            min_y = keep_on_screen(min_y, anchor_bounds.height(), area.y0, area.y1, loc.y_coef());
        }

        let window_x = min_x - anchor_bounds.x0 + extended.x0;
        let window_y = min_y - anchor_bounds.y0 + extended.y0;

        self.width = extended.width();
        self.height = extended.height();
        self.root_translation = Vec2::new(-extended.x0, -extended.y0);

        if !window_x.is_nan() {
            self.x = window_x;
        }
        if !window_y.is_nan() {
            self.y = window_y;
        }
        self.anchor = Point::new(min_x + delta.x, min_y + delta.y);
    }

    fn extended_bounds(&mut self) -> Rect {
        if let Some(bounds) = self.extended_bounds {
            return bounds;
        }
        let bounds = self
            .root
            .as_ref()
            .map_or(Rect::ZERO, PopupRoot::extended_bounds);
        tracing::trace!(?bounds, "recomputed popup extended bounds");
        self.extended_bounds = Some(bounds);
        bounds
    }

    fn anchor_bounds(&mut self) -> Rect {
        if let Some(bounds) = self.anchor_bounds {
            return bounds;
        }
        let bounds = if self.anchor_location.is_content_location() {
            self.root.as_ref().map_or(Rect::ZERO, |r| r.layout_bounds)
        } else {
            self.extended_bounds()
        };
        self.anchor_bounds = Some(bounds);
        bounds
    }

    // --- Activation ---

    /// Enables or disables keeping the popup on screen.
    pub fn set_auto_fix(&mut self, auto_fix: bool) {
        self.auto_fix = auto_fix;
        self.refresh_activation();
    }

    /// Enables or disables hiding the popup on presses outside it.
    pub fn set_auto_hide(&mut self, auto_hide: bool) {
        self.auto_hide = auto_hide;
        self.refresh_activation();
    }

    /// Sets whether a press that auto-hides the popup is consumed.
    pub fn set_consume_auto_hiding_events(&mut self, consume: bool) {
        self.consume_auto_hiding_events = consume;
    }

    /// Sets whether Escape hides the popup.
    pub fn set_hide_on_escape(&mut self, hide_on_escape: bool) {
        self.hide_on_escape = hide_on_escape;
    }

    /// Applies activation edges: entering or leaving "showing with autofix"
    /// and "showing with autohide".
    fn refresh_activation(&mut self) {
        let fix = self.showing && self.auto_fix;
        if fix != self.auto_fix_active {
            self.auto_fix_active = fix;
            if fix {
                self.desktop.watch_screens();
                let anchor = self.anchor;
                self.update_window(anchor.x, anchor.y);
            } else {
                self.desktop.unwatch_screens();
            }
        }

        let hide = self.showing && self.auto_hide;
        if hide != self.auto_hide_active {
            self.auto_hide_active = hide;
            if hide {
                self.desktop.grab_focus();
            } else {
                self.desktop.release_focus();
            }
        }
    }

    // --- Events ---

    /// Handles a press outside the popup. Returns whether the press should be
    /// consumed.
    pub fn on_outside_press(&mut self) -> bool {
        if !self.auto_hide_active {
            return false;
        }
        self.hide();
        self.consume_auto_hiding_events
    }

    /// Handles the Escape key. Returns whether the popup was hidden.
    pub fn on_escape(&mut self) -> bool {
        if !self.showing || !self.hide_on_escape {
            return false;
        }
        self.hide();
        true
    }

    // --- Accessors ---

    /// Whether the popup is showing.
    pub const fn is_showing(&self) -> bool {
        self.showing
    }

    /// Whether autofix is enabled.
    pub const fn auto_fix(&self) -> bool {
        self.auto_fix
    }

    /// Whether autohide is enabled.
    pub const fn auto_hide(&self) -> bool {
        self.auto_hide
    }

    /// Whether autofix is in effect (enabled and showing).
    pub const fn is_auto_fix_active(&self) -> bool {
        self.auto_fix_active
    }

    /// Whether autohide is in effect (enabled and showing).
    pub const fn is_auto_hide_active(&self) -> bool {
        self.auto_hide_active
    }

    /// Whether an auto-hiding press is consumed.
    pub const fn consume_auto_hiding_events(&self) -> bool {
        self.consume_auto_hiding_events
    }

    /// Whether Escape hides the popup.
    pub const fn hide_on_escape(&self) -> bool {
        self.hide_on_escape
    }

    /// The corner placed on the anchor point.
    pub const fn anchor_location(&self) -> AnchorLocation {
        self.anchor_location
    }

    /// Where the anchor corner actually is, after autofix. NaN before the
    /// first [`show`](Self::show).
    pub const fn anchor(&self) -> Point {
        self.anchor
    }

    /// Window top-left corner. NaN until a finite position is computed.
    pub const fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Window width and height, the size of the extended bounds.
    pub const fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    /// Offset applied to the root so its extended bounds start at the
    /// window's origin.
    pub const fn root_translation(&self) -> Vec2 {
        self.root_translation
    }

    /// The current root geometry.
    pub const fn root(&self) -> Option<&PopupRoot> {
        self.root.as_ref()
    }
}

impl<D: Desktop> Drop for PopupWindow<D> {
    fn drop(&mut self) {
        self.showing = false;
        self.refresh_activation();
    }
}

/// Slides a span `[min, min + size)` inside `[lo, hi)`.
///
/// Near-biased anchors (`coef <= 0.5`) clamp the far edge first, so the near
/// edge stays visible when the span does not fit; far-biased anchors do the
/// opposite.
fn keep_on_screen(min: f64, size: f64, lo: f64, hi: f64, coef: f64) -> f64 {
    if coef <= 0.5 {
        min.min(hi - size).max(lo)
    } else {
        min.max(lo).min(hi - size)
    }
}
