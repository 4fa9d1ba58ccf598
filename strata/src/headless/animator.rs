//! Animator that only keeps time.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::host::{Animator, NodeId, Surface, Tween};
use crate::sync::lock;

use super::HeadlessSurface;

#[derive(Default)]
struct AnimatorState {
    played: Vec<(NodeId, String)>,
    tweens: Vec<(NodeId, Tween)>,
}

/// Animator that waits out clip and tween durations on the Tokio clock.
///
/// Every clip lasts `clip_length`. Tweens applied to nodes of the optional
/// target surface set their end opacity and position there when they finish.
/// Under a paused test clock everything completes deterministically.
#[derive(Clone, Default)]
pub struct HeadlessAnimator {
    state: Arc<Mutex<AnimatorState>>,
    clip_length: Duration,
    target: Option<HeadlessSurface>,
}

impl HeadlessAnimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how long every clip plays.
    pub fn with_clip_length(mut self, length: Duration) -> Self {
        self.clip_length = length;
        self
    }

    /// Apply finished tweens to this surface.
    pub fn with_tween_target(mut self, surface: HeadlessSurface) -> Self {
        self.target = Some(surface);
        self
    }

    /// Clips played so far, in order.
    pub fn played(&self) -> Vec<(NodeId, String)> {
        lock(&self.state).played.clone()
    }

    /// Clips played on one node, in order.
    pub fn played_on(&self, node: NodeId) -> Vec<String> {
        lock(&self.state)
            .played
            .iter()
            .filter(|(id, _)| *id == node)
            .map(|(_, clip)| clip.clone())
            .collect()
    }

    /// Tweens started so far, in order.
    pub fn tweens(&self) -> Vec<(NodeId, Tween)> {
        lock(&self.state).tweens.clone()
    }
}

#[async_trait]
impl Animator for HeadlessAnimator {
    fn play(&self, node: NodeId, clip: &str) {
        lock(&self.state).played.push((node, clip.to_owned()));
    }

    async fn finished(&self, _node: NodeId) {
        tokio::time::sleep(self.clip_length).await;
    }

    async fn tween(&self, node: NodeId, tween: Tween) {
        lock(&self.state).tweens.push((node, tween));
        tokio::time::sleep(tween.delay + tween.duration).await;
        if let Some(mut surface) = self.target.clone() {
            surface.set_opacity(node, tween.opacity);
            surface.set_position(node, tween.position);
        }
    }
}
