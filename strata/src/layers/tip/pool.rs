//! Reusable tip instances and duplicate-text bookkeeping.

use std::collections::{HashMap, VecDeque};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::{Arc, Mutex};

use log::{debug, error, warn};

use super::{Tip, TipView};
use crate::error::extract_panic_message;
use crate::host::{Animator, NodeId, Surface, Tween, Vec2};
use crate::resource::Instance;
use crate::sync::lock;

/// A tip instance owned either by the pool or by its running dismissal.
pub(crate) struct TipInstance {
    node: NodeId,
    view: Option<Box<dyn TipView>>,
}

impl TipInstance {
    pub(crate) fn node(&self) -> NodeId {
        self.node
    }
}

struct PoolState {
    surface: Box<dyn Surface>,
    available: VecDeque<TipInstance>,
    /// Texts on screen, with how many tips show each.
    active_texts: HashMap<String, usize>,
    /// Bumped by every hard reset. Work started under an older epoch must
    /// not touch the pool or the text set.
    epoch: u64,
    created: usize,
}

impl PoolState {
    fn remove_text(&mut self, text: &str) {
        if let Some(count) = self.active_texts.get_mut(text) {
            *count -= 1;
            if *count == 0 {
                self.active_texts.remove(text);
            }
        }
    }

    fn add_text(&mut self, text: &str) {
        *self.active_texts.entry(text.to_string()).or_insert(0) += 1;
    }
}

/// Pool of tip instances on the tip surface.
///
/// Every instance the pool created is either idle in the pool (attached but
/// hidden) or showing a tip, never both.
#[derive(Clone)]
pub struct TipPool {
    state: Arc<Mutex<PoolState>>,
}

impl TipPool {
    /// Create an empty pool over a tip surface.
    pub fn new(surface: Box<dyn Surface>) -> Self {
        Self {
            state: Arc::new(Mutex::new(PoolState {
                surface,
                available: VecDeque::new(),
                active_texts: HashMap::new(),
                epoch: 0,
                created: 0,
            })),
        }
    }

    /// Number of idle instances ready for reuse.
    pub fn available(&self) -> usize {
        lock(&self.state).available.len()
    }

    /// Number of live instances (idle or showing) created since the last
    /// reset.
    pub fn created(&self) -> usize {
        lock(&self.state).created
    }

    /// Whether a tip showing `text` is on screen or about to be.
    pub fn is_showing(&self, text: &str) -> bool {
        lock(&self.state).active_texts.contains_key(text)
    }

    /// Record a tip's text before any waiting happens.
    ///
    /// Returns `None` if the tip is unique and its text is already showing.
    /// Dropping the returned admission before it is settled withdraws the
    /// text again.
    pub(crate) fn admit(&self, text: &str, unique: bool) -> Option<Admission> {
        let mut state = lock(&self.state);
        if unique && state.active_texts.contains_key(text) {
            return None;
        }
        state.add_text(text);
        Some(Admission {
            pool: self.clone(),
            text: text.to_owned(),
            epoch: state.epoch,
            settled: false,
        })
    }

    fn abort(&self, text: &str, epoch: u64) {
        let mut state = lock(&self.state);
        if state.epoch == epoch {
            state.remove_text(text);
        }
    }

    /// Take an idle instance, if any.
    pub(crate) fn pop(&self) -> Option<TipInstance> {
        lock(&self.state).available.pop_front()
    }

    /// Attach a freshly instantiated tip to the surface.
    ///
    /// If a reset happened while the template loaded, the text is recorded
    /// again under the current epoch, which is returned.
    pub(crate) fn adopt(&self, instance: Instance, text: &str, epoch: u64) -> (TipInstance, u64) {
        let mut state = lock(&self.state);
        state.surface.attach(instance.node, Vec2::ZERO);
        state.created += 1;
        if state.epoch != epoch {
            state.add_text(text);
        }
        let tip = TipInstance {
            node: instance.node,
            view: instance.tip,
        };
        (tip, state.epoch)
    }

    /// Show a tip on an instance, then hold, fade and move it and return
    /// the instance to the pool.
    ///
    /// The text stays recorded until the animation has fully completed. If
    /// the animation fails the text is withdrawn and the node disposed.
    pub(crate) fn show(
        &self,
        instance: TipInstance,
        tip: Tip,
        epoch: u64,
        animator: Arc<dyn Animator>,
    ) {
        let node = instance.node;
        let mut dismissal = Dismissal {
            pool: self.clone(),
            instance: Some(instance),
            text: tip.text.clone(),
            epoch,
        };
        if let Some(instance) = dismissal.instance.as_mut() {
            self.present(instance, &tip);
        }

        tokio::spawn(async move {
            let tween = Tween {
                delay: tip.duration,
                duration: tip.fade,
                opacity: 0.0,
                position: tip.end,
            };
            animator.tween(node, tween).await;
            dismissal.finish();
        });
    }

    /// Reset an instance's visuals and show the tip text on it.
    fn present(&self, instance: &mut TipInstance, tip: &Tip) {
        {
            let mut state = lock(&self.state);
            let surface = &mut state.surface;
            surface.set_active(instance.node, true);
            surface.set_opacity(instance.node, 1.0);
            surface.set_position(instance.node, tip.start);
            surface.raise(instance.node);
        }
        if let Some(view) = instance.view.as_mut() {
            let result = catch_unwind(AssertUnwindSafe(|| view.set_text(&tip.text)));
            if let Err(panic) = result {
                error!(
                    "Tip view failed to show '{}': {}",
                    tip.text,
                    extract_panic_message(&panic)
                );
            }
        }
    }

    fn recycle(&self, instance: TipInstance, text: &str, epoch: u64) {
        let mut state = lock(&self.state);
        if state.epoch != epoch {
            debug!("Dropping tip '{}' finished after a reset", text);
            return;
        }
        state.surface.set_active(instance.node, false);
        state.available.push_back(instance);
        state.remove_text(text);
    }

    /// Withdraw a tip whose dismissal never completed and dispose its node.
    fn discard(&self, instance: TipInstance, text: &str, epoch: u64) {
        let mut state = lock(&self.state);
        if state.epoch != epoch {
            return;
        }
        warn!("Tip '{}' did not finish; disposing {}", text, instance.node);
        state.surface.detach(instance.node);
        state.created = state.created.saturating_sub(1);
        state.remove_text(text);
    }

    /// Empty the pool and the text set and dispose every tip node.
    pub(crate) fn clear(&self) {
        let mut state = lock(&self.state);
        state.available.clear();
        state.active_texts.clear();
        state.created = 0;
        state.epoch += 1;
        state.surface.detach_all();
    }
}

impl std::fmt::Debug for TipPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = lock(&self.state);
        f.debug_struct("TipPool")
            .field("available", &state.available.len())
            .field("active_texts", &state.active_texts.len())
            .field("epoch", &state.epoch)
            .finish()
    }
}

/// A tip's text, recorded but not yet on screen.
pub(crate) struct Admission {
    pool: TipPool,
    text: String,
    epoch: u64,
    settled: bool,
}

impl Admission {
    /// Hand the text over to the tip being shown, returning its epoch.
    pub(crate) fn settle(mut self) -> u64 {
        self.settled = true;
        self.epoch
    }
}

impl Drop for Admission {
    fn drop(&mut self) {
        if !self.settled {
            self.pool.abort(&self.text, self.epoch);
        }
    }
}

/// Owns a showing tip until it is back in the pool.
struct Dismissal {
    pool: TipPool,
    instance: Option<TipInstance>,
    text: String,
    epoch: u64,
}

impl Dismissal {
    fn finish(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.pool.recycle(instance, &self.text, self.epoch);
        }
    }
}

impl Drop for Dismissal {
    fn drop(&mut self) {
        if let Some(instance) = self.instance.take() {
            self.pool.discard(instance, &self.text, self.epoch);
        }
    }
}
