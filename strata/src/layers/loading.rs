//! Reentrant gate for the shared loading indicator.

use std::sync::{Arc, Mutex};

use log::debug;

use crate::host::Indicator;
use crate::sync::lock;

struct GateState {
    count: usize,
    indicator: Box<dyn Indicator>,
}

/// Counts overlapping loads and shows the indicator while any is running.
///
/// The indicator is visible exactly while the count is above zero. Extra
/// releases are clamped at zero instead of going negative.
#[derive(Clone)]
pub struct LoadingGate {
    state: Arc<Mutex<GateState>>,
}

impl LoadingGate {
    /// Create a gate with the indicator hidden.
    pub fn new(mut indicator: Box<dyn Indicator>) -> Self {
        indicator.set_visible(false);
        Self {
            state: Arc::new(Mutex::new(GateState {
                count: 0,
                indicator,
            })),
        }
    }

    /// Increment the count, showing the indicator on the first acquire.
    pub fn acquire(&self) {
        let mut state = lock(&self.state);
        state.count += 1;
        if state.count == 1 {
            state.indicator.set_visible(true);
        }
    }

    /// Decrement the count, hiding the indicator when it reaches zero.
    pub fn release(&self) {
        let mut state = lock(&self.state);
        match state.count {
            0 => {
                debug!("Loading gate released more often than acquired");
                state.indicator.set_visible(false);
            }
            1 => {
                state.count = 0;
                state.indicator.set_visible(false);
            }
            _ => state.count -= 1,
        }
    }

    /// Acquire the gate until the returned guard is dropped.
    pub fn guard(&self) -> LoadingGuard {
        self.acquire();
        LoadingGuard { gate: self.clone() }
    }

    /// Whether the indicator is showing.
    pub fn is_visible(&self) -> bool {
        lock(&self.state).count > 0
    }
}

impl std::fmt::Debug for LoadingGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadingGate")
            .field("visible", &self.is_visible())
            .finish()
    }
}

/// Scoped acquisition of a [`LoadingGate`]; releases on drop.
#[must_use = "the gate is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LoadingGuard {
    gate: LoadingGate,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.gate.release();
    }
}
