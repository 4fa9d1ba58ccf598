//! Dialog system.
//!
//! Dialogs are overlay instances attached to the dialog surface. Each one
//! carries the tag of the template it was created from, which is what the
//! registry looks it up by. Closing always goes through
//! [`DialogHandle::close`], which runs the dialog's teardown hook, resolves
//! its exit waiters in registration order, and only then detaches it.

mod instance;
mod registry;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

pub use instance::DialogHandle;
pub use registry::DialogRegistry;

/// Behaviour of a specific dialog kind.
///
/// Every hook has a default, so a template may provide a dialog with no
/// behaviour at all.
pub trait Dialog: Send {
    /// Called once after the dialog is attached and its open clip started.
    ///
    /// The handle may be stored to close the dialog later.
    fn open(&mut self, dialog: &DialogHandle, args: &Args) {
        let _ = (dialog, args);
    }

    /// Teardown run at the start of close, before exit waiters resolve and
    /// before the dialog is detached. Stop owned audio, timers, etc. here.
    fn on_close(&mut self, args: &Args) {
        let _ = args;
    }

    /// Clip played when the dialog opens.
    fn open_clip(&self) -> Option<&str> {
        None
    }

    /// Clip played by [`DialogHandle::dismiss`] before closing.
    fn close_clip(&self) -> Option<&str> {
        None
    }
}

/// Ordered, dynamically typed arguments passed to open and close hooks.
///
/// # Example
///
/// ```
/// use strata::Args;
///
/// let args = Args::new().arg("level-3").arg(42);
/// assert_eq!(args.get::<String>(0).as_deref(), Some("level-3"));
/// assert_eq!(args.get::<u32>(1), Some(42));
/// assert_eq!(args.get::<u32>(2), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args(Vec<Value>);

impl Args {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an argument.
    ///
    /// Values that cannot be represented as JSON are stored as `null`.
    pub fn arg(mut self, value: impl Serialize) -> Self {
        self.0.push(serde_json::to_value(value).unwrap_or(Value::Null));
        self
    }

    /// Decode the argument at `index`, or `None` if it is missing or of
    /// another type.
    pub fn get<T: DeserializeOwned>(&self, index: usize) -> Option<T> {
        self.0
            .get(index)
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Raw argument at `index`.
    pub fn raw(&self, index: usize) -> Option<&Value> {
        self.0.get(index)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<Vec<Value>> for Args {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}

/// A dialog kind with no behaviour of its own.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainDialog;

impl Dialog for PlainDialog {}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Reward {
        coins: u32,
    }

    #[test]
    fn test_args_keep_order() {
        let args = Args::new().arg(1).arg(2).arg(3);
        let values: Vec<u8> = (0..args.len()).filter_map(|i| args.get(i)).collect();
        assert_eq!(values, vec![1, 2, 3]);
    }

    #[test]
    fn test_args_decode_structs() {
        let args = Args::new().arg(Reward { coins: 5 });
        assert_eq!(args.get::<Reward>(0), Some(Reward { coins: 5 }));
    }

    #[test]
    fn test_args_type_mismatch_is_none() {
        let args = Args::new().arg("text");
        assert_eq!(args.get::<u32>(0), None);
        assert!(args.raw(0).is_some());
    }

    #[test]
    fn test_empty_args() {
        let args = Args::new();
        assert!(args.is_empty());
        assert_eq!(args.get::<String>(0), None);
    }
}
