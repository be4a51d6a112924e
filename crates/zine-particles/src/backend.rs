//! Render targets and the two render backends

use crate::config::ScopeConfig;
use crate::particle::Entity;
use crate::render::node_style;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use zine_core::{NodeId, ViewportSize};
use zine_render::{DomLayer, Surface};
use zine_runtime::{TimerHost, TimerId};

/// What a scope is mounted on
#[derive(Clone)]
pub enum RenderTarget {
    Canvas(Rc<RefCell<dyn Surface>>),
    Dom(Rc<dyn DomLayer>),
}

impl RenderTarget {
    pub fn canvas<S: Surface + 'static>(surface: &Rc<RefCell<S>>) -> Self {
        let surface: Rc<RefCell<dyn Surface>> = surface.clone();
        RenderTarget::Canvas(surface)
    }

    pub fn dom<L: DomLayer + 'static>(layer: &Rc<L>) -> Self {
        let layer: Rc<dyn DomLayer> = layer.clone();
        RenderTarget::Dom(layer)
    }

    /// Attached to the document with a non-empty size
    pub fn is_usable(&self) -> bool {
        match self {
            RenderTarget::Canvas(surface) => surface
                .try_borrow()
                .map(|s| s.is_attached() && !s.size().is_empty())
                .unwrap_or(false),
            RenderTarget::Dom(layer) => layer.is_attached() && !layer.size().is_empty(),
        }
    }
}

/// Entities as overlay nodes, one per entity
pub struct DomBackend {
    layer: Rc<dyn DomLayer>,
    timers: Rc<dyn TimerHost>,
    node_lifetime_ms: Option<f64>,
    node_timers: HashMap<NodeId, TimerId>,
}

impl DomBackend {
    pub fn new(layer: Rc<dyn DomLayer>, timers: Rc<dyn TimerHost>, node_lifetime_ms: Option<f64>) -> Self {
        Self {
            layer,
            timers,
            node_lifetime_ms,
            node_timers: HashMap::new(),
        }
    }

    /// Create or restyle the entity's node. Returns false when the node has
    /// gone away on its own (its removal timer fired, or the host removed it).
    pub fn sync(&mut self, entity: &mut Entity) -> bool {
        let style = node_style(entity);
        match entity.node {
            Some(node) => self.layer.update(node, &style),
            None => {
                let node = self.layer.append(&style);
                entity.node = Some(node);
                if let Some(lifetime) = self.node_lifetime_ms {
                    let layer = Rc::downgrade(&self.layer);
                    let timer = self.timers.set_timeout(
                        lifetime,
                        Box::new(move || {
                            if let Some(layer) = layer.upgrade() {
                                if layer.contains(node) {
                                    layer.remove(node);
                                }
                            }
                        }),
                    );
                    self.node_timers.insert(node, timer);
                }
                true
            }
        }
    }

    /// Remove the entity's node if it is still attached and cancel its timer
    pub fn release(&mut self, entity: &Entity) {
        let Some(node) = entity.node else {
            return;
        };
        if self.layer.contains(node) {
            self.layer.remove(node);
        }
        if let Some(timer) = self.node_timers.remove(&node) {
            self.timers.clear_timer(timer);
        }
    }

    /// Cancel every outstanding removal timer
    pub fn clear_timers(&mut self) {
        for (_, timer) in self.node_timers.drain() {
            self.timers.clear_timer(timer);
        }
    }
}

pub enum RenderBackend {
    Canvas(Rc<RefCell<dyn Surface>>),
    Dom(DomBackend),
}

impl RenderBackend {
    pub fn new(target: RenderTarget, timers: Rc<dyn TimerHost>, config: &ScopeConfig) -> Self {
        match target {
            RenderTarget::Canvas(surface) => RenderBackend::Canvas(surface),
            RenderTarget::Dom(layer) => {
                RenderBackend::Dom(DomBackend::new(layer, timers, config.dom_node_lifetime_ms))
            }
        }
    }

    pub fn is_dom(&self) -> bool {
        matches!(self, RenderBackend::Dom(_))
    }

    /// Still attached with a drawable size
    pub fn is_available(&self) -> bool {
        match self {
            RenderBackend::Canvas(surface) => RenderTarget::Canvas(surface.clone()).is_usable(),
            RenderBackend::Dom(dom) => dom.layer.is_attached() && !dom.layer.size().is_empty(),
        }
    }

    /// Current size; `None` while the canvas is borrowed elsewhere
    pub fn size(&self) -> Option<ViewportSize> {
        match self {
            RenderBackend::Canvas(surface) => surface.try_borrow().ok().map(|s| s.size()),
            RenderBackend::Dom(dom) => Some(dom.layer.size()),
        }
    }

    /// Release whatever the backend holds for an entity leaving the store
    pub fn release(&mut self, entity: &Entity) {
        if let RenderBackend::Dom(dom) = self {
            dom.release(entity);
        }
    }

    /// Release every entity and cancel outstanding timers
    pub fn teardown(&mut self, entities: &[Entity]) {
        if let RenderBackend::Dom(dom) = self {
            for entity in entities {
                dom.release(entity);
            }
            dom.clear_timers();
        }
    }
}
