//! Layers module - dialogs, tips and the loading indicator.

pub mod dialog;
pub mod loading;
pub mod tip;

pub use dialog::{Args, Dialog, DialogHandle, DialogRegistry, PlainDialog};
pub use loading::{LoadingGate, LoadingGuard};
pub use tip::{TipData, TipPool, TipView};
