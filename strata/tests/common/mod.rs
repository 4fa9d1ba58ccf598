//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use strata::headless::{
    HeadlessAnimator, HeadlessIndicator, HeadlessSurface, MemoryResources, template,
};
use strata::{
    Animator, Args, Dialog, DialogHandle, Instance, LayerConfig, LayerManager, Surfaces, Template,
};

/// Simulated load time of every fetch.
pub const LATENCY: Duration = Duration::from_millis(100);

/// Length of every animation clip.
pub const CLIP: Duration = Duration::from_millis(200);

/// A layer manager over headless surfaces, with clones of every part kept
/// for inspection.
pub struct Harness {
    pub layers: LayerManager,
    pub main: HeadlessSurface,
    pub dialogs: HeadlessSurface,
    pub tips: HeadlessSurface,
    pub loading: HeadlessIndicator,
    pub resources: Arc<MemoryResources>,
    pub animator: HeadlessAnimator,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_config(LayerConfig::default())
    }

    pub fn with_config(config: LayerConfig) -> Self {
        Self::build(config, None)
    }

    /// Drive animations with `animator` instead of the recording one.
    pub fn with_animator(animator: Arc<dyn Animator>) -> Self {
        Self::build(LayerConfig::default(), Some(animator))
    }

    fn build(config: LayerConfig, custom: Option<Arc<dyn Animator>>) -> Self {
        let main = HeadlessSurface::new();
        let dialogs = HeadlessSurface::new();
        let tips = HeadlessSurface::new();
        let loading = HeadlessIndicator::new();
        let resources = Arc::new(MemoryResources::new().with_latency(LATENCY));
        let animator = HeadlessAnimator::new()
            .with_clip_length(CLIP)
            .with_tween_target(tips.clone());
        let driver: Arc<dyn Animator> = match custom {
            Some(custom) => custom,
            None => Arc::new(animator.clone()),
        };

        let layers = LayerManager::new(
            Surfaces {
                main: Box::new(main.clone()),
                dialog: Box::new(dialogs.clone()),
                tip: Box::new(tips.clone()),
                loading: Box::new(loading.clone()),
            },
            resources.clone(),
            driver,
            config,
        );

        Self {
            layers,
            main,
            dialogs,
            tips,
            loading,
            resources,
            animator,
        }
    }

    /// Register the tip widget as pre-loaded.
    pub fn with_tip_template(self) -> Self {
        self.resources.cache("prefab/tip", self.tips.tip_template("Tip"));
        self
    }

    /// Register a pre-loaded dialog with the default directory.
    pub fn cache_dialog(&self, tag: &str, template: Arc<dyn Template>) {
        self.resources.cache(format!("prefab/dialog/{}", tag), template);
    }

    /// Register a dialog that has to be fetched first.
    pub fn remote_dialog(&self, tag: &str, template: Arc<dyn Template>) {
        self.resources.remote(format!("prefab/dialog/{}", tag), template);
    }
}

/// Ordered record of hook and waiter calls.
#[derive(Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    pub fn push(&self, entry: impl Into<String>) {
        self.0.lock().unwrap().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

/// Dialog that writes its hook calls to a journal.
pub struct SpyDialog {
    journal: Journal,
    panic_on_close: bool,
    close_clip: Option<&'static str>,
}

impl SpyDialog {
    pub fn new(journal: Journal) -> Self {
        Self {
            journal,
            panic_on_close: false,
            close_clip: None,
        }
    }

    pub fn panicking(mut self) -> Self {
        self.panic_on_close = true;
        self
    }

    pub fn close_clip(mut self, clip: &'static str) -> Self {
        self.close_clip = Some(clip);
        self
    }
}

impl Dialog for SpyDialog {
    fn open(&mut self, _dialog: &DialogHandle, args: &Args) {
        let arg = args.get::<String>(0).unwrap_or_default();
        self.journal.push(format!("open {}", arg).trim_end().to_string());
    }

    fn on_close(&mut self, _args: &Args) {
        if self.panic_on_close {
            panic!("teardown failed");
        }
        self.journal.push("on_close");
    }

    fn open_clip(&self) -> Option<&str> {
        Some("pop_in")
    }

    fn close_clip(&self) -> Option<&str> {
        self.close_clip
    }
}

/// Template for a spy dialog with the given tag.
pub fn spy(tag: &'static str, journal: &Journal) -> Arc<dyn Template> {
    let journal = journal.clone();
    template(move || Instance::new(tag).dialog(SpyDialog::new(journal.clone())))
}

/// Template for a dialog with no behaviour.
pub fn plain(tag: &'static str) -> Arc<dyn Template> {
    template(move || Instance::new(tag))
}
