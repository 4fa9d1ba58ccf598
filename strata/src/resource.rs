//! Templates and the provider that resolves them.

use std::sync::Arc;

use async_trait::async_trait;

use crate::host::NodeId;
use crate::layers::dialog::Dialog;
use crate::layers::tip::TipView;

/// A loadable blueprint for a UI element.
pub trait Template: Send + Sync {
    /// Build a fresh live instance.
    fn instantiate(&self) -> Instance;
}

/// A freshly instantiated node and the components its template carries.
///
/// The tag is stamped by the template that produced the instance and stays
/// fixed for the instance's lifetime.
pub struct Instance {
    /// Host node backing this instance.
    pub node: NodeId,
    /// Identity of the template that produced this instance.
    pub tag: String,
    /// Dialog behaviour, for dialog templates.
    pub dialog: Option<Box<dyn Dialog>>,
    /// Text view, for tip templates.
    pub tip: Option<Box<dyn TipView>>,
}

impl Instance {
    /// Create a bare instance on a new node.
    pub fn new(tag: impl Into<String>) -> Self {
        Self::with_node(NodeId::new(), tag)
    }

    /// Create a bare instance for an existing host node.
    pub fn with_node(node: NodeId, tag: impl Into<String>) -> Self {
        Self {
            node,
            tag: tag.into(),
            dialog: None,
            tip: None,
        }
    }

    /// Attach a dialog behaviour.
    pub fn dialog(mut self, dialog: impl Dialog + 'static) -> Self {
        self.dialog = Some(Box::new(dialog));
        self
    }

    /// Attach a tip view.
    pub fn tip(mut self, tip: impl TipView + 'static) -> Self {
        self.tip = Some(Box::new(tip));
        self
    }
}

impl std::fmt::Debug for Instance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Instance")
            .field("node", &self.node)
            .field("tag", &self.tag)
            .field("dialog", &self.dialog.is_some())
            .field("tip", &self.tip.is_some())
            .finish()
    }
}

/// Resolves template ids to templates.
///
/// Both lookups report absence as `None`, never as an error.
#[async_trait]
pub trait ResourceProvider: Send + Sync {
    /// Look up a pre-loaded template without blocking.
    fn cached(&self, id: &str) -> Option<Arc<dyn Template>>;

    /// Load a template, from the cache or the backing store.
    ///
    /// Concurrent fetches of the same id may race; each resolves on its own.
    async fn fetch(&self, id: &str) -> Option<Arc<dyn Template>>;
}
