//! Tip notifications.
//!
//! Tips are short-lived text popups on the tip surface. They fade out and
//! drift to an end position after a hold time, then go back to a pool for
//! reuse.

mod pool;

use std::time::Duration;

use crate::config::TipDefaults;
use crate::host::Vec2;

pub use pool::TipPool;

pub(crate) use pool::TipInstance;

/// Rendering of a single tip item, provided by the host.
pub trait TipView: Send {
    /// Replace the displayed text and recompute layout.
    fn set_text(&mut self, text: &str);
}

/// A tip request. Unset timings and positions take the layer's configured
/// defaults.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use strata::{TipData, Vec2};
///
/// let tip = TipData::new("Saved")
///     .unique()
///     .duration(Duration::from_secs(2))
///     .end(Vec2::new(0.0, 80.0));
/// assert!(tip.unique);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct TipData {
    pub text: String,
    /// Drop this request while the same text is already showing.
    pub unique: bool,
    /// How long the tip stays before fading.
    pub duration: Option<Duration>,
    /// Length of the fade and move at the end.
    pub fade: Option<Duration>,
    /// Where the tip appears.
    pub start: Option<Vec2>,
    /// Where the tip drifts to while fading.
    pub end: Option<Vec2>,
}

impl TipData {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            unique: false,
            duration: None,
            fade: None,
            start: None,
            end: None,
        }
    }

    /// Only show this text once at a time.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn fade(mut self, fade: Duration) -> Self {
        self.fade = Some(fade);
        self
    }

    pub fn start(mut self, start: Vec2) -> Self {
        self.start = Some(start);
        self
    }

    pub fn end(mut self, end: Vec2) -> Self {
        self.end = Some(end);
        self
    }

    /// Fill unset fields from the defaults.
    pub(crate) fn resolve(self, defaults: &TipDefaults) -> Tip {
        Tip {
            text: self.text,
            unique: self.unique,
            duration: self.duration.unwrap_or_else(|| defaults.duration()),
            fade: self.fade.unwrap_or_else(|| defaults.fade()),
            start: self.start.unwrap_or(defaults.start),
            end: self.end.unwrap_or(defaults.end),
        }
    }
}

impl From<String> for TipData {
    fn from(text: String) -> Self {
        TipData::new(text)
    }
}

impl From<&str> for TipData {
    fn from(text: &str) -> Self {
        TipData::new(text)
    }
}

/// A fully resolved tip request.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Tip {
    pub text: String,
    pub unique: bool,
    pub duration: Duration,
    pub fade: Duration,
    pub start: Vec2,
    pub end: Vec2,
}
