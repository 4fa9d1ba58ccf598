//! Surface and indicator that only record state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::host::{Indicator, NodeId, Surface, Vec2};
use crate::layers::tip::TipView;
use crate::resource::{Instance, Template};
use crate::sync::lock;

use super::template;

/// Recorded state of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeState {
    pub id: NodeId,
    pub position: Vec2,
    pub opacity: f32,
    pub active: bool,
    /// Text set through a [`HeadlessTipView`].
    pub text: Option<String>,
}

#[derive(Default)]
struct SurfaceState {
    /// Attached nodes, in attachment order.
    nodes: Vec<NodeState>,
    /// Visual stacking, bottom first.
    stack: Vec<NodeId>,
    disposed: usize,
}

impl SurfaceState {
    fn node_mut(&mut self, id: NodeId) -> Option<&mut NodeState> {
        self.nodes.iter_mut().find(|n| n.id == id)
    }
}

/// A surface with no rendering that records what was done to it.
///
/// Clones share state, so a clone kept by the caller can inspect a surface
/// owned by a [`LayerManager`](crate::LayerManager).
#[derive(Clone, Default)]
pub struct HeadlessSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl HeadlessSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every attached node, in attachment order.
    pub fn nodes(&self) -> Vec<NodeState> {
        lock(&self.state).nodes.clone()
    }

    /// Snapshot of one node.
    pub fn node(&self, id: NodeId) -> Option<NodeState> {
        lock(&self.state).nodes.iter().find(|n| n.id == id).cloned()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.node(id).is_some()
    }

    /// Number of attached nodes.
    pub fn len(&self) -> usize {
        lock(&self.state).nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.state).nodes.is_empty()
    }

    /// Topmost node in the visual stack.
    pub fn top(&self) -> Option<NodeId> {
        lock(&self.state).stack.last().copied()
    }

    /// Number of nodes disposed so far.
    pub fn disposed(&self) -> usize {
        lock(&self.state).disposed
    }

    /// Number of active nodes showing `text`.
    pub fn visible_with_text(&self, text: &str) -> usize {
        lock(&self.state)
            .nodes
            .iter()
            .filter(|n| n.active && n.text.as_deref() == Some(text))
            .count()
    }

    fn set_text(&self, id: NodeId, text: &str) {
        if let Some(node) = lock(&self.state).node_mut(id) {
            node.text = Some(text.to_owned());
        }
    }

    /// Template producing tip instances whose text is recorded on this
    /// surface.
    pub fn tip_template(&self, tag: impl Into<String>) -> Arc<dyn Template> {
        let surface = self.clone();
        let tag = tag.into();
        template(move || {
            let instance = Instance::new(tag.clone());
            let view = HeadlessTipView {
                node: instance.node,
                surface: surface.clone(),
            };
            instance.tip(view)
        })
    }
}

impl Surface for HeadlessSurface {
    fn attach(&mut self, node: NodeId, position: Vec2) {
        let mut state = lock(&self.state);
        state.nodes.push(NodeState {
            id: node,
            position,
            opacity: 1.0,
            active: true,
            text: None,
        });
        state.stack.push(node);
    }

    fn detach(&mut self, node: NodeId) {
        let mut state = lock(&self.state);
        let before = state.nodes.len();
        state.nodes.retain(|n| n.id != node);
        state.stack.retain(|&id| id != node);
        let removed = before - state.nodes.len();
        state.disposed += removed;
    }

    fn detach_all(&mut self) {
        let mut state = lock(&self.state);
        let removed = state.nodes.len();
        state.disposed += removed;
        state.nodes.clear();
        state.stack.clear();
    }

    fn set_position(&mut self, node: NodeId, position: Vec2) {
        if let Some(n) = lock(&self.state).node_mut(node) {
            n.position = position;
        }
    }

    fn set_opacity(&mut self, node: NodeId, opacity: f32) {
        if let Some(n) = lock(&self.state).node_mut(node) {
            n.opacity = opacity;
        }
    }

    fn set_active(&mut self, node: NodeId, active: bool) {
        if let Some(n) = lock(&self.state).node_mut(node) {
            n.active = active;
        }
    }

    fn raise(&mut self, node: NodeId) {
        let mut state = lock(&self.state);
        if state.stack.contains(&node) {
            state.stack.retain(|&id| id != node);
            state.stack.push(node);
        }
    }
}

/// Tip view that writes its text to a [`HeadlessSurface`].
pub struct HeadlessTipView {
    node: NodeId,
    surface: HeadlessSurface,
}

impl TipView for HeadlessTipView {
    fn set_text(&mut self, text: &str) {
        self.surface.set_text(self.node, text);
    }
}

/// Loading indicator that records its visibility.
#[derive(Clone, Default)]
pub struct HeadlessIndicator {
    visible: Arc<AtomicBool>,
}

impl HeadlessIndicator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_visible(&self) -> bool {
        self.visible.load(Ordering::SeqCst)
    }
}

impl Indicator for HeadlessIndicator {
    fn set_visible(&mut self, visible: bool) {
        self.visible.store(visible, Ordering::SeqCst);
    }
}
