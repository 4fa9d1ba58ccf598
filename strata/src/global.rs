//! Process-wide layer manager.
//!
//! The host installs its layer manager once at startup so code without a
//! direct reference (dialog hooks, background tasks) can reach it, and
//! removes it at shutdown.

use std::sync::RwLock;

use crate::manager::LayerManager;

static CURRENT: RwLock<Option<LayerManager>> = RwLock::new(None);

/// Install the process-wide layer manager, returning the one it replaces.
pub fn install(manager: LayerManager) -> Option<LayerManager> {
    CURRENT
        .write()
        .unwrap_or_else(|e| e.into_inner())
        .replace(manager)
}

/// Remove the process-wide layer manager.
pub fn uninstall() -> Option<LayerManager> {
    CURRENT.write().unwrap_or_else(|e| e.into_inner()).take()
}

/// The installed layer manager, if any.
pub fn current() -> Option<LayerManager> {
    CURRENT.read().unwrap_or_else(|e| e.into_inner()).clone()
}
