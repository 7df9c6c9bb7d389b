//! Interface to the widget displaying the curves.

use std::cell::Cell;

/// Receives redraw requests from commands.
pub trait CurveView {
    /// Redraw everything.
    fn refresh(&self);

    /// The selected keys moved.
    fn refresh_selected_keys(&self);

    /// A displayed tangent changed.
    fn refresh_displayed_tangents(&self);
}

/// A view that ignores every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullView;

impl CurveView for NullView {
    fn refresh(&self) {}
    fn refresh_selected_keys(&self) {}
    fn refresh_displayed_tangents(&self) {}
}

/// A view that counts requests. Handy for headless sessions and tests.
#[derive(Debug, Default)]
pub struct CountingView {
    refreshes: Cell<u32>,
    selection_refreshes: Cell<u32>,
    tangent_refreshes: Cell<u32>,
}

impl CountingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn refreshes(&self) -> u32 {
        self.refreshes.get()
    }

    pub fn selection_refreshes(&self) -> u32 {
        self.selection_refreshes.get()
    }

    pub fn tangent_refreshes(&self) -> u32 {
        self.tangent_refreshes.get()
    }
}

impl CurveView for CountingView {
    fn refresh(&self) {
        self.refreshes.set(self.refreshes.get() + 1);
    }

    fn refresh_selected_keys(&self) {
        self.selection_refreshes.set(self.selection_refreshes.get() + 1);
    }

    fn refresh_displayed_tangents(&self) {
        self.tangent_refreshes.set(self.tangent_refreshes.get() + 1);
    }
}
