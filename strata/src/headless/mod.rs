//! Headless host.
//!
//! Surfaces, an animator, an indicator and a template store that render
//! nothing and record everything. Used by tests, tooling and servers that
//! drive the overlay logic without a scene graph.

mod animator;
mod resources;
mod surface;

use std::sync::Arc;

use crate::resource::{Instance, Template};

pub use animator::HeadlessAnimator;
pub use resources::MemoryResources;
pub use surface::{HeadlessIndicator, HeadlessSurface, HeadlessTipView, NodeState};

struct FnTemplate<F>(F);

impl<F> Template for FnTemplate<F>
where
    F: Fn() -> Instance + Send + Sync,
{
    fn instantiate(&self) -> Instance {
        (self.0)()
    }
}

/// Build a template from a closure.
///
/// # Example
///
/// ```
/// use strata::headless::template;
/// use strata::{Instance, PlainDialog, Template};
///
/// let dialog = template(|| Instance::new("DlgShake").dialog(PlainDialog));
/// assert_eq!(dialog.instantiate().tag, "DlgShake");
/// ```
pub fn template<F>(f: F) -> Arc<dyn Template>
where
    F: Fn() -> Instance + Send + Sync + 'static,
{
    Arc::new(FnTemplate(f))
}
