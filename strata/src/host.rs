//! Host primitives consumed by the layer manager.
//!
//! The scene graph, the animation player and the loading indicator all
//! belong to the host application. The layer manager only drives them
//! through the traits in this module.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use uuid::Uuid;

/// Unique identifier of a node on the host scene graph.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(Uuid);

impl NodeId {
    /// Create a new unique node id.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the underlying UUID.
    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for NodeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A position on a surface, relative to its origin.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The surface origin.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// A presentation container holding attached nodes.
///
/// Attachment order is the order nodes were attached in; `raise` only
/// changes the visual stacking.
pub trait Surface: Send {
    /// Attach a node at the given position.
    fn attach(&mut self, node: NodeId, position: Vec2);

    /// Detach a node and dispose it.
    fn detach(&mut self, node: NodeId);

    /// Detach and dispose every node on this surface.
    fn detach_all(&mut self);

    /// Move a node.
    fn set_position(&mut self, node: NodeId, position: Vec2);

    /// Set a node's opacity (0.0 to 1.0).
    fn set_opacity(&mut self, node: NodeId, opacity: f32);

    /// Show or hide a node without detaching it.
    fn set_active(&mut self, node: NodeId, active: bool);

    /// Move a node to the top of the visual stack.
    fn raise(&mut self, node: NodeId);
}

/// The shared loading indicator.
pub trait Indicator: Send {
    fn set_visible(&mut self, visible: bool);
}

/// Composite property animation.
///
/// Waits `delay`, then fades to `opacity` and moves to `position`
/// concurrently over `duration`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    pub delay: Duration,
    pub duration: Duration,
    pub opacity: f32,
    pub position: Vec2,
}

/// Per-node animation player.
#[async_trait]
pub trait Animator: Send + Sync {
    /// Start playing a named clip on a node.
    fn play(&self, node: NodeId, clip: &str);

    /// Resolve when the clip currently playing on `node` finishes.
    async fn finished(&self, node: NodeId);

    /// Run a tween on `node`, resolving once it completes.
    async fn tween(&self, node: NodeId, tween: Tween);
}
