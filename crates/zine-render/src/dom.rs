//! Overlay-node layer contract and its in-memory implementation

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use zine_core::{Color, NodeId, ViewportSize};

/// Inline style of one CSS-animated particle node
#[derive(Clone, Debug, PartialEq)]
pub struct NodeStyle {
    /// CSS class selecting the node's keyframe animation
    pub class: &'static str,
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    pub opacity: f32,
    pub rotation_deg: f32,
    pub color: Color,
}

/// A container element that particle nodes are appended to.
///
/// Methods take `&self`: the host document is shared, and nodes may be
/// removed by the host (or by a timer) behind the engine's back. Removing a
/// node that is already gone is a no-op that returns `false`.
pub trait DomLayer {
    fn size(&self) -> ViewportSize;

    /// False once the container has been removed from the document
    fn is_attached(&self) -> bool;

    fn append(&self, style: &NodeStyle) -> NodeId;

    /// Restyle a node; `false` when the node no longer exists
    fn update(&self, node: NodeId, style: &NodeStyle) -> bool;

    /// Remove a node; `false` when it was already removed
    fn remove(&self, node: NodeId) -> bool;

    fn contains(&self, node: NodeId) -> bool;

    fn node_count(&self) -> usize;
}

/// In-memory [`DomLayer`] used headless and in tests
pub struct HeadlessDom {
    size: Cell<ViewportSize>,
    attached: Cell<bool>,
    next_id: Cell<u64>,
    nodes: RefCell<BTreeMap<NodeId, NodeStyle>>,
    removed: Cell<usize>,
}

impl HeadlessDom {
    pub fn new(size: ViewportSize) -> Self {
        Self {
            size: Cell::new(size),
            attached: Cell::new(true),
            next_id: Cell::new(1),
            nodes: RefCell::new(BTreeMap::new()),
            removed: Cell::new(0),
        }
    }

    pub fn style(&self, node: NodeId) -> Option<NodeStyle> {
        self.nodes.borrow().get(&node).cloned()
    }

    /// Total successful removals over the layer's lifetime
    pub fn removed_count(&self) -> usize {
        self.removed.get()
    }

    pub fn resize(&self, size: ViewportSize) {
        self.size.set(size);
    }

    /// Simulate the container being removed from the document
    pub fn detach(&self) {
        self.attached.set(false);
    }
}

impl DomLayer for HeadlessDom {
    fn size(&self) -> ViewportSize {
        self.size.get()
    }

    fn is_attached(&self) -> bool {
        self.attached.get()
    }

    fn append(&self, style: &NodeStyle) -> NodeId {
        let id = NodeId::from_raw(self.next_id.get());
        self.next_id.set(id.raw() + 1);
        self.nodes.borrow_mut().insert(id, style.clone());
        id
    }

    fn update(&self, node: NodeId, style: &NodeStyle) -> bool {
        match self.nodes.borrow_mut().get_mut(&node) {
            Some(existing) => {
                *existing = style.clone();
                true
            }
            None => false,
        }
    }

    fn remove(&self, node: NodeId) -> bool {
        let removed = self.nodes.borrow_mut().remove(&node).is_some();
        if removed {
            self.removed.set(self.removed.get() + 1);
        }
        removed
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.borrow().contains_key(&node)
    }

    fn node_count(&self) -> usize {
        self.nodes.borrow().len()
    }
}
