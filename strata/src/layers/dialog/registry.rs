//! Registry of dialogs attached to the dialog surface.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use futures::FutureExt;
use futures::future::{BoxFuture, join_all};
use log::{debug, error};
use tokio::runtime::Handle;

use super::instance::{DialogHandle, DialogInstance};
use super::Args;
use crate::completion::Completion;
use crate::error::{LayerError, extract_panic_message};
use crate::host::{Animator, NodeId, Surface, Vec2};
use crate::resource::Instance;
use crate::sync::lock;

struct RegistryState {
    surface: Box<dyn Surface>,
    /// Attached dialogs, in attachment order.
    attached: Vec<Arc<DialogInstance>>,
}

/// Tracks every dialog attached to the dialog surface.
///
/// The registry is the dialog surface's own child list: a dialog is in the
/// registry exactly while it is attached. Lookups return matches in
/// attachment order.
///
/// The lock is never held while dialog hooks or exit waiters run, so those
/// may call back into the registry.
#[derive(Clone)]
pub struct DialogRegistry {
    state: Arc<Mutex<RegistryState>>,
    animator: Arc<dyn Animator>,
    /// Runtime current at construction, if any.
    runtime: Option<Handle>,
}

impl DialogRegistry {
    /// Create a registry over a dialog surface.
    ///
    /// If called inside a Tokio runtime, that runtime drives close clips
    /// started from threads outside any runtime.
    pub fn new(surface: Box<dyn Surface>, animator: Arc<dyn Animator>) -> Self {
        Self {
            state: Arc::new(Mutex::new(RegistryState {
                surface,
                attached: Vec::new(),
            })),
            animator,
            runtime: Handle::try_current().ok(),
        }
    }

    pub(crate) fn runtime(&self) -> Option<Handle> {
        self.runtime.clone()
    }

    fn handle(&self, instance: Arc<DialogInstance>) -> DialogHandle {
        DialogHandle::new(instance, self.clone(), Arc::clone(&self.animator))
    }

    /// Attach a new instance at the surface origin.
    ///
    /// The caller is responsible for starting it.
    pub(crate) fn attach(&self, instance: Instance) -> DialogHandle {
        let instance = Arc::new(DialogInstance::new(instance));
        {
            let mut state = lock(&self.state);
            state.surface.attach(instance.node(), Vec2::ZERO);
            state.attached.push(Arc::clone(&instance));
        }
        debug!("Attached dialog '{}' ({})", instance.tag(), instance.node());
        self.handle(instance)
    }

    /// Remove a closed dialog from the surface.
    pub(crate) fn detach(&self, node: NodeId) {
        let mut state = lock(&self.state);
        let before = state.attached.len();
        state.attached.retain(|i| i.node() != node);
        if state.attached.len() != before {
            state.surface.detach(node);
        }
    }

    /// Detach and dispose every dialog without closing it.
    ///
    /// Exit waiters are dropped unresolved.
    pub(crate) fn clear(&self) {
        let abandoned: Vec<_> = {
            let mut state = lock(&self.state);
            state.surface.detach_all();
            state
                .attached
                .drain(..)
                .flat_map(|i| i.discard())
                .collect()
        };
        if !abandoned.is_empty() {
            debug!("Abandoned {} dialog exit waiter(s)", abandoned.len());
        }
    }

    /// First attached dialog with the given tag.
    pub fn find(&self, tag: &str) -> Option<DialogHandle> {
        let instance = lock(&self.state)
            .attached
            .iter()
            .find(|i| i.tag() == tag)
            .cloned();
        instance.map(|i| self.handle(i))
    }

    /// Every attached dialog with the given tag, in attachment order.
    pub fn find_all(&self, tag: &str) -> Vec<DialogHandle> {
        let matches: Vec<_> = lock(&self.state)
            .attached
            .iter()
            .filter(|i| i.tag() == tag)
            .cloned()
            .collect();
        matches.into_iter().map(|i| self.handle(i)).collect()
    }

    /// Whether a dialog with the given tag is attached.
    pub fn contains(&self, tag: &str) -> bool {
        lock(&self.state).attached.iter().any(|i| i.tag() == tag)
    }

    /// Number of attached dialogs.
    pub fn len(&self) -> usize {
        lock(&self.state).attached.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).attached.is_empty()
    }

    /// Close the first dialog with the given tag. Returns false if none.
    pub fn close(&self, tag: &str, args: &Args) -> bool {
        match self.find(tag) {
            Some(dialog) => {
                dialog.close(args);
                true
            }
            None => false,
        }
    }

    /// Close every dialog with the given tag.
    ///
    /// Each close is isolated: a panic while closing one dialog is logged
    /// and the rest are still closed. Returns how many dialogs matched.
    pub fn close_all(&self, tag: &str, args: &Args) -> usize {
        let matches = self.find_all(tag);
        for dialog in &matches {
            if let Err(panic) = catch_unwind(AssertUnwindSafe(|| dialog.close(args))) {
                error!(
                    "Closing dialog '{}' ({}) panicked: {}",
                    tag,
                    dialog.node(),
                    extract_panic_message(&panic)
                );
            }
        }
        matches.len()
    }

    /// Resolve when the first dialog with the given tag closes.
    ///
    /// Resolves immediately if no such dialog is attached.
    pub fn wait_close(&self, tag: &str) -> Completion {
        match self.find(tag) {
            Some(dialog) => dialog.wait_close(),
            None => Completion::ready(),
        }
    }

    /// Resolve when every dialog with the given tag has closed.
    ///
    /// The set of dialogs is taken when this is called; dialogs opened
    /// afterwards are not waited on.
    pub fn wait_close_all(&self, tag: &str) -> BoxFuture<'static, Result<(), LayerError>> {
        let waits: Vec<Completion> = self
            .find_all(tag)
            .iter()
            .map(DialogHandle::wait_close)
            .collect();
        async move {
            join_all(waits)
                .await
                .into_iter()
                .collect::<Result<Vec<()>, LayerError>>()
                .map(|_| ())
        }
        .boxed()
    }
}

impl std::fmt::Debug for DialogRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogRegistry")
            .field("attached", &self.len())
            .finish()
    }
}
