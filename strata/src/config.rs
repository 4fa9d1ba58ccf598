//! Layer configuration.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::host::Vec2;

/// Errors reading a [`LayerConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Configuration for a [`LayerManager`](crate::LayerManager).
///
/// Every field has a default, so a config file only needs the fields it
/// changes.
///
/// # Example
///
/// ```
/// use strata::LayerConfig;
///
/// let config = LayerConfig::from_json(r#"{ "dialog_dir": "ui/dialogs/" }"#).unwrap();
/// assert_eq!(config.dialog_dir, "ui/dialogs/");
/// assert_eq!(config.tip_template, "prefab/tip");
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayerConfig {
    /// Prefix joined with a dialog tag to form its template id.
    ///
    /// Default: `prefab/dialog/`
    pub dialog_dir: String,

    /// Template id of the tip widget.
    ///
    /// Default: `prefab/tip`
    pub tip_template: String,

    /// Timings and positions for tips that don't set their own.
    pub tip: TipDefaults,
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            dialog_dir: "prefab/dialog/".to_string(),
            tip_template: "prefab/tip".to_string(),
            tip: TipDefaults::default(),
        }
    }
}

impl LayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config from JSON.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Read a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Sets the dialog directory prefix.
    pub fn with_dialog_dir(mut self, dir: impl Into<String>) -> Self {
        self.dialog_dir = dir.into();
        self
    }

    /// Sets the tip template id.
    pub fn with_tip_template(mut self, id: impl Into<String>) -> Self {
        self.tip_template = id.into();
        self
    }

    /// Sets the default tip timings.
    pub fn with_tip_defaults(mut self, tip: TipDefaults) -> Self {
        self.tip = tip;
        self
    }

    /// Template id for a dialog tag.
    pub fn dialog_id(&self, tag: &str) -> String {
        format!("{}{}", self.dialog_dir, tag)
    }
}

/// Defaults for tips that don't set their own timings or positions.
///
/// Timings are in seconds; positions are relative to the tip surface
/// origin.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TipDefaults {
    /// Time a tip stays before fading.
    ///
    /// Default: 1 second
    pub duration_secs: f64,

    /// Length of the fade and move.
    ///
    /// Default: 0.5 seconds
    pub fade_secs: f64,

    /// Where tips appear.
    ///
    /// Default: origin
    pub start: Vec2,

    /// Where tips drift to while fading.
    ///
    /// Default: origin
    pub end: Vec2,
}

impl Default for TipDefaults {
    fn default() -> Self {
        Self {
            duration_secs: 1.0,
            fade_secs: 0.5,
            start: Vec2::ZERO,
            end: Vec2::ZERO,
        }
    }
}

impl TipDefaults {
    pub fn duration(&self) -> Duration {
        secs(self.duration_secs)
    }

    pub fn fade(&self) -> Duration {
        secs(self.fade_secs)
    }
}

/// Negative, NaN and overflowing values count as zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LayerConfig::default();
        assert_eq!(config.dialog_id("DlgAudio"), "prefab/dialog/DlgAudio");
        assert_eq!(config.tip.duration(), Duration::from_secs(1));
        assert_eq!(config.tip.fade(), Duration::from_millis(500));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = LayerConfig::from_json(r#"{ "tip": { "fade_secs": 0.25 } }"#).unwrap();
        assert_eq!(config.dialog_dir, "prefab/dialog/");
        assert_eq!(config.tip.duration(), Duration::from_secs(1));
        assert_eq!(config.tip.fade(), Duration::from_millis(250));
    }

    #[test]
    fn test_tip_positions_from_json() {
        let config = LayerConfig::from_json(
            r#"{ "tip": { "start": { "x": 0.0, "y": -20.0 }, "end": { "x": 0.0, "y": 60.0 } } }"#,
        )
        .unwrap();
        assert_eq!(config.tip.start, Vec2::new(0.0, -20.0));
        assert_eq!(config.tip.end, Vec2::new(0.0, 60.0));
        assert_eq!(config.tip.fade(), Duration::from_millis(500));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            LayerConfig::from_json("{ nope"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_negative_seconds_clamp_to_zero() {
        let tip = TipDefaults {
            duration_secs: -1.0,
            fade_secs: f64::NAN,
            ..TipDefaults::default()
        };
        assert_eq!(tip.duration(), Duration::ZERO);
        assert_eq!(tip.fade(), Duration::ZERO);
    }

    #[test]
    fn test_builder() {
        let config = LayerConfig::new()
            .with_dialog_dir("dlg/")
            .with_tip_template("tip")
            .with_tip_defaults(TipDefaults {
                duration_secs: 2.0,
                fade_secs: 1.0,
                ..TipDefaults::default()
            });
        assert_eq!(config.dialog_id("a"), "dlg/a");
        assert_eq!(config.tip_template, "tip");
        assert_eq!(config.tip.duration(), Duration::from_secs(2));
    }
}
