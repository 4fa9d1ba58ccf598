//! Live dialog instances and the handles used to drive them.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use log::{debug, error, warn};
use tokio::runtime::Handle;

use super::registry::DialogRegistry;
use super::{Args, Dialog, PlainDialog};
use crate::completion::{Completion, ExitWaiter};
use crate::error::extract_panic_message;
use crate::host::{Animator, NodeId};
use crate::resource::Instance;
use crate::sync::lock;

/// Where an instance is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    /// Attached and accepting waiters.
    Open,
    /// Close is running: hook done or running, waiters being resolved.
    Closing,
    /// Closed normally and detached.
    Closed,
    /// Removed by a hard reset; waiters were dropped unresolved.
    Discarded,
}

struct InstanceState {
    lifecycle: Lifecycle,
    waiters: Vec<ExitWaiter>,
}

/// Slot holding the dialog behaviour between hooks.
struct Behavior {
    /// Taken out while a hook runs so hooks can call back into the layer.
    dialog: Option<Box<dyn Dialog>>,
    /// Close requested while another hook held the dialog.
    deferred_close: Option<Args>,
}

/// Outcome of [`DialogInstance::run_hook`].
enum HookRun {
    /// The hook ran. Carries a close that arrived while it was running.
    Ran { deferred_close: Option<Args> },
    /// Another hook held the dialog; the close was parked for it.
    Deferred,
    /// Another hook held the dialog; nothing was done.
    Skipped,
}

/// One dialog attached to the dialog surface.
pub(crate) struct DialogInstance {
    node: NodeId,
    tag: String,
    behavior: Mutex<Behavior>,
    state: Mutex<InstanceState>,
}

impl DialogInstance {
    pub(crate) fn new(instance: Instance) -> Self {
        let behavior = instance
            .dialog
            .unwrap_or_else(|| Box::new(PlainDialog));
        Self {
            node: instance.node,
            tag: instance.tag,
            behavior: Mutex::new(Behavior {
                dialog: Some(behavior),
                deferred_close: None,
            }),
            state: Mutex::new(InstanceState {
                lifecycle: Lifecycle::Open,
                waiters: Vec::new(),
            }),
        }
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn tag(&self) -> &str {
        &self.tag
    }

    /// Mark the instance discarded and hand back its unresolved waiters.
    pub(crate) fn discard(&self) -> Vec<ExitWaiter> {
        let mut state = lock(&self.state);
        state.lifecycle = Lifecycle::Discarded;
        std::mem::take(&mut state.waiters)
    }

    fn lifecycle(&self) -> Lifecycle {
        lock(&self.state).lifecycle
    }

    fn clip(&self, pick: impl FnOnce(&dyn Dialog) -> Option<&str>) -> Option<String> {
        lock(&self.behavior)
            .dialog
            .as_deref()
            .and_then(|d| pick(d).map(str::to_owned))
    }

    /// Run a hook on the dialog behaviour, isolating panics.
    ///
    /// If another hook holds the behaviour (the dialog closes itself from
    /// `open`, or is closed from another thread while `open` runs), a close
    /// passed as `defer` is parked and handed back to that hook's caller
    /// once the behaviour is returned.
    fn run_hook(
        &self,
        hook: &str,
        defer: Option<&Args>,
        f: impl FnOnce(&mut dyn Dialog),
    ) -> HookRun {
        let mut behavior = {
            let mut slot = lock(&self.behavior);
            match (slot.dialog.take(), defer) {
                (Some(behavior), _) => behavior,
                (None, Some(args)) => {
                    slot.deferred_close = Some(args.clone());
                    return HookRun::Deferred;
                }
                (None, None) => {
                    debug!(
                        "Dialog '{}' hook '{}' skipped: another hook is running",
                        self.tag, hook
                    );
                    return HookRun::Skipped;
                }
            }
        };

        let result = catch_unwind(AssertUnwindSafe(|| f(behavior.as_mut())));
        let deferred_close = {
            let mut slot = lock(&self.behavior);
            slot.dialog = Some(behavior);
            slot.deferred_close.take()
        };

        if let Err(panic) = result {
            error!(
                "Dialog '{}' hook '{}' panicked: {}",
                self.tag,
                hook,
                extract_panic_message(&panic)
            );
        }
        HookRun::Ran { deferred_close }
    }
}

/// Handle to a live dialog.
///
/// Cheap to clone. Handles stay valid after the dialog closes; operations
/// on a closed dialog are no-ops.
#[derive(Clone)]
pub struct DialogHandle {
    instance: Arc<DialogInstance>,
    registry: DialogRegistry,
    animator: Arc<dyn Animator>,
}

impl DialogHandle {
    pub(crate) fn new(
        instance: Arc<DialogInstance>,
        registry: DialogRegistry,
        animator: Arc<dyn Animator>,
    ) -> Self {
        Self {
            instance,
            registry,
            animator,
        }
    }

    /// Tag of the template this dialog was created from.
    pub fn tag(&self) -> &str {
        self.instance.tag()
    }

    /// Host node backing this dialog.
    pub fn node(&self) -> NodeId {
        self.instance.node()
    }

    /// Whether the dialog is still open (not closing, closed or discarded).
    pub fn is_open(&self) -> bool {
        self.instance.lifecycle() == Lifecycle::Open
    }

    /// Check whether two handles refer to the same dialog.
    pub fn same_dialog(&self, other: &DialogHandle) -> bool {
        Arc::ptr_eq(&self.instance, &other.instance)
    }

    /// Play the open clip and run the dialog's `open` hook.
    pub(crate) fn start(&self, args: &Args) {
        if !self.is_open() {
            return;
        }
        if let Some(clip) = self.instance.clip(|d| d.open_clip()) {
            self.animator.play(self.node(), &clip);
        }
        let run = self.instance.run_hook("open", None, |d| d.open(self, args));
        if let HookRun::Ran {
            deferred_close: Some(close_args),
        } = run
        {
            debug!("Finishing close of dialog '{}' requested during open", self.tag());
            self.teardown(&close_args);
        }
    }

    /// Close the dialog.
    ///
    /// Runs the `on_close` hook, resolves every exit waiter once in the
    /// order they were registered, then detaches and disposes the node.
    /// Waiters added while close is running are resolved too. Calling close
    /// on a dialog that is not open does nothing.
    ///
    /// Closing from inside the dialog's own `open` hook finishes once `open`
    /// returns.
    pub fn close(&self, args: &Args) {
        {
            let mut state = lock(&self.instance.state);
            if state.lifecycle != Lifecycle::Open {
                return;
            }
            state.lifecycle = Lifecycle::Closing;
        }

        debug!("Closing dialog '{}' ({})", self.tag(), self.node());
        self.teardown(args);
    }

    /// Run `on_close`, resolve waiters, detach. The dialog is `Closing`.
    fn teardown(&self, args: &Args) {
        let run = self
            .instance
            .run_hook("on_close", Some(args), |d| d.on_close(args));
        if matches!(run, HookRun::Deferred) {
            return;
        }

        loop {
            let waiters = std::mem::take(&mut lock(&self.instance.state).waiters);
            if waiters.is_empty() {
                break;
            }
            for waiter in waiters {
                if let Err(panic) = catch_unwind(AssertUnwindSafe(|| waiter.resolve())) {
                    error!(
                        "Exit waiter of dialog '{}' panicked: {}",
                        self.tag(),
                        extract_panic_message(&panic)
                    );
                }
            }
        }

        {
            let mut state = lock(&self.instance.state);
            // A hard reset may have discarded us while waiters ran.
            if state.lifecycle == Lifecycle::Closing {
                state.lifecycle = Lifecycle::Closed;
            }
        }
        self.registry.detach(self.node());
    }

    /// Play the close clip, then close once it finishes.
    ///
    /// Without a close clip this closes immediately. The wait for the clip
    /// runs on the current Tokio runtime, or on the one the registry was
    /// created in. With neither available the clip is skipped and the
    /// dialog closes immediately.
    pub fn dismiss(&self, args: Args) {
        if !self.is_open() {
            return;
        }
        let Some(clip) = self.instance.clip(|d| d.close_clip()) else {
            self.close(&args);
            return;
        };
        let runtime = Handle::try_current()
            .ok()
            .or_else(|| self.registry.runtime());
        let Some(runtime) = runtime else {
            warn!(
                "No runtime to play close clip of dialog '{}'; closing now",
                self.tag()
            );
            self.close(&args);
            return;
        };

        debug!("Dismissing dialog '{}' with clip '{}'", self.tag(), clip);
        self.animator.play(self.node(), &clip);
        let handle = self.clone();
        runtime.spawn(async move {
            handle.animator.finished(handle.node()).await;
            handle.close(&args);
        });
    }

    /// Register a waiter to be resolved when this dialog closes.
    ///
    /// On a dialog that already closed the waiter resolves immediately; on a
    /// discarded dialog it is dropped unresolved.
    pub fn add_exit_waiter(&self, waiter: ExitWaiter) {
        let mut state = lock(&self.instance.state);
        let lifecycle = state.lifecycle;
        match lifecycle {
            Lifecycle::Open | Lifecycle::Closing => state.waiters.push(waiter),
            Lifecycle::Closed => {
                drop(state);
                waiter.resolve();
            }
            Lifecycle::Discarded => {}
        }
    }

    /// Completion that resolves when this dialog closes.
    pub fn wait_close(&self) -> Completion {
        let (waiter, completion) = ExitWaiter::channel();
        self.add_exit_waiter(waiter);
        completion
    }
}

impl std::fmt::Debug for DialogHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DialogHandle")
            .field("tag", &self.tag())
            .field("node", &self.node())
            .field("open", &self.is_open())
            .finish()
    }
}
