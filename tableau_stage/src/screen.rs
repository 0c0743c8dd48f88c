// Copyright 2026 the Tableau Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Screen enumeration.

use kurbo::{Point, Rect};

/// One physical screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Screen {
    /// Full screen rectangle in desktop coordinates.
    pub bounds: Rect,
    /// Usable area, excluding task bars, menu bars and docks.
    pub visual_bounds: Rect,
}

impl Screen {
    /// A screen whose usable area is all of `bounds`.
    #[must_use]
    pub const fn new(bounds: Rect) -> Self {
        Self {
            bounds,
            visual_bounds: bounds,
        }
    }

    /// A screen with a reduced usable area.
    #[must_use]
    pub const fn with_visual_bounds(bounds: Rect, visual_bounds: Rect) -> Self {
        Self {
            bounds,
            visual_bounds,
        }
    }
}

/// Source of the current screen configuration.
///
/// Popups call the watch and grab hooks on activation edges only, so every
/// `watch_screens` is eventually paired with an `unwatch_screens` and every
/// `grab_focus` with a `release_focus`.
pub trait Desktop {
    /// The screens, primary first.
    fn screens(&self) -> &[Screen];

    /// Whether a full-screen window currently covers `screen`.
    fn has_full_screen_window(&self, _screen: &Screen) -> bool {
        false
    }

    /// A popup wants to hear about screen reconfiguration.
    fn watch_screens(&mut self) {}

    /// A popup no longer needs screen reconfiguration events.
    fn unwatch_screens(&mut self) {}

    /// A popup that hides on outside presses became active.
    fn grab_focus(&mut self) {}

    /// A popup that hides on outside presses became inactive.
    fn release_focus(&mut self) {}
}

/// A fixed set of screens, optionally with some marked full-screen.
#[derive(Clone, Debug, Default)]
pub struct StaticDesktop {
    screens: Vec<Screen>,
    full_screen: Vec<bool>,
    screen_watchers: u32,
    focus_grabs: u32,
}

impl StaticDesktop {
    /// Creates a desktop from screens, primary first.
    #[must_use]
    pub fn new(screens: Vec<Screen>) -> Self {
        let full_screen = vec![false; screens.len()];
        Self {
            screens,
            full_screen,
            screen_watchers: 0,
            focus_grabs: 0,
        }
    }

    /// Replaces the screen list. Full-screen marks are reset.
    pub fn set_screens(&mut self, screens: Vec<Screen>) {
        self.full_screen = vec![false; screens.len()];
        self.screens = screens;
    }

    /// Marks whether screen `index` hosts a full-screen window. Out-of-range
    /// indices are ignored.
    pub fn set_full_screen(&mut self, index: usize, full_screen: bool) {
        if let Some(flag) = self.full_screen.get_mut(index) {
            *flag = full_screen;
        }
    }

    /// Number of popups currently watching for screen changes.
    #[must_use]
    pub const fn screen_watchers(&self) -> u32 {
        self.screen_watchers
    }

    /// Number of outstanding focus grabs.
    #[must_use]
    pub const fn focus_grabs(&self) -> u32 {
        self.focus_grabs
    }
}

impl Desktop for StaticDesktop {
    fn screens(&self) -> &[Screen] {
        &self.screens
    }

    fn has_full_screen_window(&self, screen: &Screen) -> bool {
        self.screens
            .iter()
            .zip(&self.full_screen)
            .any(|(s, &fs)| fs && s == screen)
    }

    fn watch_screens(&mut self) {
        self.screen_watchers += 1;
    }

    fn unwatch_screens(&mut self) {
        self.screen_watchers = self.screen_watchers.saturating_sub(1);
    }

    fn grab_focus(&mut self) {
        self.focus_grabs += 1;
    }

    fn release_focus(&mut self) {
        self.focus_grabs = self.focus_grabs.saturating_sub(1);
    }
}

/// The screen showing `point`: the one containing it, else the nearest one,
/// else the primary screen. `None` only when there are no screens.
#[must_use]
pub fn screen_for_point(screens: &[Screen], point: Point) -> Option<&Screen> {
    if let Some(s) = screens.iter().find(|s| contains(s.bounds, point)) {
        return Some(s);
    }
    screens
        .iter()
        .map(|s| (s, distance_squared(s.bounds, point)))
        .filter(|(_, d)| d.is_finite())
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(s, _)| s)
        .or_else(|| screens.first())
}

/// The rectangle a popup on `screen` is kept within: the full bounds when a
/// full-screen window covers it, otherwise the visual bounds.
#[must_use]
pub fn usable_bounds(desktop: &dyn Desktop, screen: &Screen) -> Rect {
    if desktop.has_full_screen_window(screen) {
        screen.bounds
    } else {
        screen.visual_bounds
    }
}

/// Half-open containment, so adjacent screens never both claim an edge.
fn contains(r: Rect, p: Point) -> bool {
    p.x >= r.x0 && p.x < r.x1 && p.y >= r.y0 && p.y < r.y1
}

fn distance_squared(r: Rect, p: Point) -> f64 {
    let dx = (r.x0 - p.x).max(0.0).max(p.x - r.x1);
    let dy = (r.y0 - p.y).max(0.0).max(p.y - r.y1);
    dx * dx + dy * dy
}
