//! The layer manager - owns every surface and exposes the overlay API.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use futures::future::BoxFuture;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::completion::Completion;
use crate::config::LayerConfig;
use crate::error::{LayerError, require_id};
use crate::host::{Animator, Indicator, NodeId, Surface, Vec2};
use crate::layers::dialog::{Args, DialogHandle, DialogRegistry};
use crate::layers::loading::{LoadingGate, LoadingGuard};
use crate::layers::tip::{Tip, TipData, TipInstance, TipPool};
use crate::resource::{ResourceProvider, Template};
use crate::sync::lock;

/// Error handler callback.
type ErrorHandler = Arc<dyn Fn(&LayerError) + Send + Sync>;

/// The host surfaces the layer manager takes ownership of.
pub struct Surfaces {
    /// Main content (one screen at a time).
    pub main: Box<dyn Surface>,
    /// Dialogs, above main content.
    pub dialog: Box<dyn Surface>,
    /// Tips, above dialogs.
    pub tip: Box<dyn Surface>,
    /// The shared loading indicator.
    pub loading: Box<dyn Indicator>,
}

struct MainStage {
    surface: Box<dyn Surface>,
    current: Option<NodeId>,
}

struct Inner {
    config: LayerConfig,
    resources: Arc<dyn ResourceProvider>,
    animator: Arc<dyn Animator>,
    main: Mutex<MainStage>,
    dialogs: DialogRegistry,
    tips: TipPool,
    loading: LoadingGate,
    /// Tags with a unique async open in flight.
    opening: Arc<Mutex<HashSet<String>>>,
    error_handler: Mutex<Option<ErrorHandler>>,
}

/// Orchestrates main content, dialogs, tips and the loading indicator.
///
/// Cheap to clone; all clones drive the same layers. Operations that load
/// templates run on a spawned task, so dropping the returned future does not
/// cancel the load: it still completes and attaches its instance.
///
/// # Example
///
/// ```ignore
/// let layers = LayerManager::new(surfaces, resources, animator, LayerConfig::default());
/// layers.enter_main("prefab/home")?;
/// layers.open_unique_dialog_async("DlgSettings", Args::new()).await?;
/// layers.show_tip(TipData::new("Saved").unique()).await?;
/// layers.wait_close_dialog("DlgSettings").await?;
/// ```
#[derive(Clone)]
pub struct LayerManager {
    inner: Arc<Inner>,
}

impl LayerManager {
    /// Create a layer manager over the given surfaces.
    ///
    /// The loading indicator starts hidden.
    pub fn new(
        surfaces: Surfaces,
        resources: Arc<dyn ResourceProvider>,
        animator: Arc<dyn Animator>,
        config: LayerConfig,
    ) -> Self {
        let Surfaces {
            main,
            dialog,
            tip,
            loading,
        } = surfaces;

        Self {
            inner: Arc::new(Inner {
                config,
                resources,
                dialogs: DialogRegistry::new(dialog, Arc::clone(&animator)),
                animator,
                main: Mutex::new(MainStage {
                    surface: main,
                    current: None,
                }),
                tips: TipPool::new(tip),
                loading: LoadingGate::new(loading),
                opening: Arc::new(Mutex::new(HashSet::new())),
                error_handler: Mutex::new(None),
            }),
        }
    }

    /// Set a callback invoked with every reported failure.
    pub fn on_error<F>(&self, handler: F)
    where
        F: Fn(&LayerError) + Send + Sync + 'static,
    {
        *lock(&self.inner.error_handler) = Some(Arc::new(handler));
    }

    pub fn config(&self) -> &LayerConfig {
        &self.inner.config
    }

    /// The dialog registry.
    pub fn dialogs(&self) -> &DialogRegistry {
        &self.inner.dialogs
    }

    /// The tip pool.
    pub fn tips(&self) -> &TipPool {
        &self.inner.tips
    }

    /// Log a failure and pass it to the error handler.
    fn report(&self, err: LayerError) -> LayerError {
        error!("{}", err);
        let handler = lock(&self.inner.error_handler).clone();
        if let Some(handler) = handler {
            handler(&err);
        }
        err
    }

    fn check_id(&self, id: &str) -> Result<(), LayerError> {
        require_id(id).map_err(|e| self.report(e))
    }

    /// Wait for a spawned operation, reporting panics.
    async fn join<T>(&self, task: JoinHandle<Result<T, LayerError>>) -> Result<T, LayerError> {
        match task.await {
            Ok(result) => result,
            Err(err) => Err(self.report(err.into())),
        }
    }

    // -------------------------------------------------------------------------
    // Main content
    // -------------------------------------------------------------------------

    /// Replace the main content with a cached template, clearing every
    /// dialog and tip.
    ///
    /// Fails without touching any surface if the template is not cached.
    pub fn enter_main(&self, id: &str) -> Result<NodeId, LayerError> {
        self.enter("main", id)
    }

    /// Like [`enter_main`](Self::enter_main), for the secondary screen.
    pub fn enter_secondary(&self, id: &str) -> Result<NodeId, LayerError> {
        self.enter("secondary", id)
    }

    fn enter(&self, screen: &str, id: &str) -> Result<NodeId, LayerError> {
        self.check_id(id)?;
        let template = self
            .inner
            .resources
            .cached(id)
            .ok_or_else(|| self.report(LayerError::not_found(id)))?;

        self.clear_overlays();
        let node = template.instantiate().node;
        {
            let mut main = lock(&self.inner.main);
            main.surface.detach_all();
            main.surface.attach(node, Vec2::ZERO);
            main.current = Some(node);
        }
        info!("Entered {} screen '{}' ({})", screen, id, node);
        Ok(node)
    }

    /// Node currently shown as main content.
    pub fn current_main(&self) -> Option<NodeId> {
        lock(&self.inner.main).current
    }

    // -------------------------------------------------------------------------
    // Dialogs
    // -------------------------------------------------------------------------

    /// Open a dialog from a cached template.
    ///
    /// The template id is the configured dialog directory joined with `tag`.
    pub fn open_dialog(&self, tag: &str, args: Args) -> Result<DialogHandle, LayerError> {
        self.check_id(tag)?;
        let id = self.inner.config.dialog_id(tag);
        let template = self
            .inner
            .resources
            .cached(&id)
            .ok_or_else(|| self.report(LayerError::not_found(id)))?;
        Ok(self.attach_dialog(template.as_ref(), tag, &args))
    }

    /// Open a dialog from a cached template unless one with the same tag is
    /// already attached. Returns `None` when nothing was opened.
    pub fn open_unique_dialog(
        &self,
        tag: &str,
        args: Args,
    ) -> Result<Option<DialogHandle>, LayerError> {
        if self.inner.dialogs.contains(tag) {
            debug!("Dialog '{}' already open", tag);
            return Ok(None);
        }
        self.open_dialog(tag, args).map(Some)
    }

    /// Load a dialog template (showing the loading indicator meanwhile) and
    /// open it.
    pub async fn open_dialog_async(&self, tag: &str, args: Args) -> Result<DialogHandle, LayerError> {
        self.check_id(tag)?;
        let this = self.clone();
        let tag = tag.to_owned();
        let task = tokio::spawn(async move {
            let template = this.fetch_dialog(&tag).await?;
            Ok(this.attach_dialog(template.as_ref(), &tag, &args))
        });
        self.join(task).await
    }

    /// Load and open a dialog unless one with the same tag is attached or
    /// already being opened this way. Returns `None` when nothing was opened.
    pub async fn open_unique_dialog_async(
        &self,
        tag: &str,
        args: Args,
    ) -> Result<Option<DialogHandle>, LayerError> {
        self.check_id(tag)?;
        if self.inner.dialogs.contains(tag) {
            debug!("Dialog '{}' already open", tag);
            return Ok(None);
        }
        let Some(claim) = OpeningClaim::acquire(&self.inner.opening, tag) else {
            debug!("Dialog '{}' already opening", tag);
            return Ok(None);
        };

        let this = self.clone();
        let tag = tag.to_owned();
        let task = tokio::spawn(async move {
            let _claim = claim;
            let template = this.fetch_dialog(&tag).await?;
            // A sync open may have attached one while we were loading.
            if this.inner.dialogs.contains(&tag) {
                debug!("Dialog '{}' opened while loading", tag);
                return Ok(None);
            }
            Ok(Some(this.attach_dialog(template.as_ref(), &tag, &args)))
        });
        self.join(task).await
    }

    async fn fetch_dialog(&self, tag: &str) -> Result<Arc<dyn Template>, LayerError> {
        let id = self.inner.config.dialog_id(tag);
        let template = {
            let _loading = self.inner.loading.guard();
            self.inner.resources.fetch(&id).await
        };
        template.ok_or_else(|| self.report(LayerError::not_found(id)))
    }

    fn attach_dialog(&self, template: &dyn Template, tag: &str, args: &Args) -> DialogHandle {
        let mut instance = template.instantiate();
        if instance.tag.is_empty() {
            instance.tag = tag.to_owned();
        } else if instance.tag != tag {
            warn!(
                "Dialog template for '{}' produced tag '{}'; lookups use the template's tag",
                tag, instance.tag
            );
        }
        let dialog = self.inner.dialogs.attach(instance);
        dialog.start(args);
        dialog
    }

    /// First attached dialog with the given tag.
    pub fn find_dialog(&self, tag: &str) -> Option<DialogHandle> {
        self.inner.dialogs.find(tag)
    }

    /// Every attached dialog with the given tag, in attachment order.
    pub fn find_dialogs(&self, tag: &str) -> Vec<DialogHandle> {
        self.inner.dialogs.find_all(tag)
    }

    /// Close the first dialog with the given tag. Returns false if none.
    pub fn close_dialog(&self, tag: &str, args: Args) -> bool {
        self.inner.dialogs.close(tag, &args)
    }

    /// Close every dialog with the given tag. Returns how many matched.
    pub fn close_dialogs(&self, tag: &str, args: Args) -> usize {
        self.inner.dialogs.close_all(tag, &args)
    }

    /// Play the close clip of the first dialog with the given tag, then
    /// close it. Returns false if none.
    pub fn dismiss_dialog(&self, tag: &str, args: Args) -> bool {
        match self.inner.dialogs.find(tag) {
            Some(dialog) => {
                dialog.dismiss(args);
                true
            }
            None => false,
        }
    }

    /// Resolve when the first dialog with the given tag closes, or
    /// immediately if there is none.
    pub fn wait_close_dialog(&self, tag: &str) -> Completion {
        self.inner.dialogs.wait_close(tag)
    }

    /// Resolve when every dialog currently carrying the tag has closed.
    pub fn wait_close_dialogs(&self, tag: &str) -> BoxFuture<'static, Result<(), LayerError>> {
        self.inner.dialogs.wait_close_all(tag)
    }

    // -------------------------------------------------------------------------
    // Tips
    // -------------------------------------------------------------------------

    /// Show a tip.
    ///
    /// Returns once the tip is on screen; it fades and is recycled on its
    /// own. A unique tip whose text is already showing is dropped silently.
    pub async fn show_tip(&self, data: impl Into<TipData>) -> Result<(), LayerError> {
        let tip = data.into().resolve(&self.inner.config.tip);
        let Some(admission) = self.inner.tips.admit(&tip.text, tip.unique) else {
            debug!("Suppressed duplicate tip '{}'", tip.text);
            return Ok(());
        };

        if let Some(instance) = self.inner.tips.pop() {
            self.display_tip(instance, tip, admission.settle());
            return Ok(());
        }

        let this = self.clone();
        let task = tokio::spawn(async move {
            let id = this.inner.config.tip_template.clone();
            let template = {
                let _loading = this.inner.loading.guard();
                this.inner.resources.fetch(&id).await
            };
            let Some(template) = template else {
                return Err(this.report(LayerError::not_found(id)));
            };
            let instance = template.instantiate();
            let (instance, epoch) = this
                .inner
                .tips
                .adopt(instance, &tip.text, admission.settle());
            this.display_tip(instance, tip, epoch);
            Ok(())
        });
        self.join(task).await
    }

    fn display_tip(&self, instance: TipInstance, tip: Tip, epoch: u64) {
        debug!("Showing tip '{}' on {}", tip.text, instance.node());
        self.inner
            .tips
            .show(instance, tip, epoch, Arc::clone(&self.inner.animator));
    }

    // -------------------------------------------------------------------------
    // Reset and loading
    // -------------------------------------------------------------------------

    /// Remove every dialog and tip at once.
    ///
    /// Dialogs are not closed: their hooks don't run and pending waits on
    /// them resolve to [`LayerError::Abandoned`]. The tip pool is emptied.
    pub fn clear_overlays(&self) {
        self.inner.tips.clear();
        self.inner.dialogs.clear();
        debug!("Cleared dialogs and tips");
    }

    /// Clear every surface. Call before dropping the host.
    pub fn shutdown(&self) {
        self.clear_overlays();
        let mut main = lock(&self.inner.main);
        main.surface.detach_all();
        main.current = None;
        info!("Layer manager shut down");
    }

    /// Show the loading indicator. Pair every call with
    /// [`hide_loading`](Self::hide_loading), or use [`loading`](Self::loading).
    pub fn show_loading(&self) {
        self.inner.loading.acquire();
    }

    /// Undo one [`show_loading`](Self::show_loading).
    pub fn hide_loading(&self) {
        self.inner.loading.release();
    }

    /// Show the loading indicator until the guard is dropped.
    pub fn loading(&self) -> LoadingGuard {
        self.inner.loading.guard()
    }

    /// Whether the loading indicator is showing.
    pub fn is_loading(&self) -> bool {
        self.inner.loading.is_visible()
    }
}

impl std::fmt::Debug for LayerManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayerManager")
            .field("config", &self.inner.config)
            .field("dialogs", &self.inner.dialogs)
            .field("tips", &self.inner.tips)
            .field("loading", &self.inner.loading)
            .finish()
    }
}

/// Marks a tag as being opened by a unique async open; released on drop.
struct OpeningClaim {
    opening: Arc<Mutex<HashSet<String>>>,
    tag: String,
}

impl OpeningClaim {
    fn acquire(opening: &Arc<Mutex<HashSet<String>>>, tag: &str) -> Option<Self> {
        if !lock(opening).insert(tag.to_owned()) {
            return None;
        }
        Some(Self {
            opening: Arc::clone(opening),
            tag: tag.to_owned(),
        })
    }
}

impl Drop for OpeningClaim {
    fn drop(&mut self) {
        lock(&self.opening).remove(&self.tag);
    }
}
