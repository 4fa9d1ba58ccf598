//! Layered overlay management.
//!
//! A [`LayerManager`] owns four host surfaces (main content, dialogs, tips
//! and a loading indicator) and exposes one API to switch screens, open and
//! close dialogs, show pooled tips and gate the loading indicator across
//! overlapping loads. The host plugs in through the traits in [`host`] and
//! [`resource`]; [`headless`] provides a recording implementation.

pub mod completion;
pub mod config;
pub mod error;
pub mod global;
pub mod headless;
pub mod host;
pub mod layers;
pub mod manager;
pub mod resource;

mod sync;

pub use completion::{Completion, ExitWaiter};
pub use config::{ConfigError, LayerConfig, TipDefaults};
pub use error::LayerError;
pub use host::{Animator, Indicator, NodeId, Surface, Tween, Vec2};
pub use layers::{Args, Dialog, DialogHandle, PlainDialog, TipData, TipView};
pub use manager::{LayerManager, Surfaces};
pub use resource::{Instance, ResourceProvider, Template};

pub mod prelude {
    pub use crate::completion::{Completion, ExitWaiter};
    pub use crate::config::LayerConfig;
    pub use crate::error::LayerError;
    pub use crate::host::{Animator, Indicator, NodeId, Surface, Vec2};
    pub use crate::layers::{Args, Dialog, DialogHandle, PlainDialog, TipData, TipView};
    pub use crate::manager::{LayerManager, Surfaces};
    pub use crate::resource::{Instance, ResourceProvider, Template};
}
