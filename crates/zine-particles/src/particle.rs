//! Entities and the ordered, capped entity store

use crate::behavior::{BehaviorRules, BehaviorTag, Motion, ShapeKind, SpawnKind};
use glam::Vec2;
use zine_core::{Color, NodeId};

/// Everything needed to redraw an entity without recomputation
#[derive(Debug, Clone, PartialEq)]
pub struct Style {
    pub color: Color,
    /// Current computed opacity in [0, 1]
    pub opacity: f32,
    /// Peak opacity the fade curves scale
    pub base_opacity: f32,
    /// Radians
    pub rotation: f32,
    /// Radians per reference frame
    pub spin: f32,
    pub shape: ShapeKind,
    /// Shape-variant index (rune index, palette slot)
    pub variant: u8,
}

/// One decorative particle
#[derive(Debug, Clone)]
pub struct Entity {
    /// Spawn sequence number, assigned by the store
    pub id: u64,
    pub kind: SpawnKind,
    pub tag: BehaviorTag,
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub style: Style,
    pub motion: Motion,
    /// Reference frames lived so far
    pub age: f32,
    pub max_age: f32,
    /// Random phase offset for sway and twinkle
    pub phase: f32,
    pub expired: bool,
    /// Overlay node, for DOM-backed scopes
    pub node: Option<NodeId>,
    pub rules: &'static BehaviorRules,
}

impl Entity {
    /// Normalized age in [0, 1]
    pub fn life_ratio(&self) -> f32 {
        if self.max_age <= 0.0 {
            1.0
        } else {
            (self.age / self.max_age).clamp(0.0, 1.0)
        }
    }

    pub fn remaining_ratio(&self) -> f32 {
        1.0 - self.life_ratio()
    }

    pub(crate) fn rotation_step(&mut self, dt: f32) {
        self.style.rotation += self.style.spin * dt;
    }
}

/// Per-kind population caps
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caps {
    pub ambient: usize,
    pub trail: usize,
    pub burst: usize,
}

impl Caps {
    pub fn get(&self, kind: SpawnKind) -> usize {
        match kind {
            SpawnKind::Ambient => self.ambient,
            SpawnKind::Trail => self.trail,
            SpawnKind::Burst => self.burst,
        }
    }

    pub fn total(&self) -> usize {
        self.ambient + self.trail + self.burst
    }
}

/// Result of offering an entity to the store
#[derive(Debug)]
pub enum Admission {
    Admitted,
    /// Ambient cap reached; the new entity was dropped
    Skipped,
    /// The oldest entity of the same kind made room
    Evicted(Entity),
}

/// Live entities in spawn order; later entries draw on top.
///
/// Ambient spawns beyond their cap are skipped. Trail and burst spawns
/// evict the oldest live entity of their own kind, so fresh input always
/// shows up.
pub struct EntityStore {
    entities: Vec<Entity>,
    counts: [usize; 3],
    caps: Caps,
    next_id: u64,
}

impl EntityStore {
    pub fn new(caps: Caps) -> Self {
        Self {
            entities: Vec::with_capacity(caps.total().min(1024)),
            counts: [0; 3],
            caps,
            next_id: 1,
        }
    }

    pub fn caps(&self) -> Caps {
        self.caps
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn count(&self, kind: SpawnKind) -> usize {
        self.counts[kind.slot()]
    }

    /// Offer a freshly spawned entity; assigns its id when admitted
    pub fn admit(&mut self, mut entity: Entity) -> Admission {
        let kind = entity.kind;
        let cap = self.caps.get(kind);
        if cap == 0 {
            return Admission::Skipped;
        }
        let mut outcome = Admission::Admitted;
        if self.count(kind) >= cap {
            if kind == SpawnKind::Ambient {
                return Admission::Skipped;
            }
            match self.entities.iter().position(|e| e.kind == kind) {
                Some(oldest) => {
                    let evicted = self.entities.remove(oldest);
                    self.counts[kind.slot()] -= 1;
                    outcome = Admission::Evicted(evicted);
                }
                None => return Admission::Skipped,
            }
        }
        entity.id = self.next_id;
        self.next_id += 1;
        self.counts[kind.slot()] += 1;
        self.entities.push(entity);
        outcome
    }

    pub fn iter(&self) -> impl Iterator<Item = &Entity> {
        self.entities.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Entity> {
        self.entities.iter_mut()
    }

    pub fn as_slice(&self) -> &[Entity] {
        &self.entities
    }

    /// Remove every expired entity, preserving the order of the rest.
    /// `on_removed` sees each removed entity before it is dropped.
    pub fn cull_expired(&mut self, mut on_removed: impl FnMut(&Entity)) -> usize {
        let before = self.entities.len();
        let counts = &mut self.counts;
        self.entities.retain(|e| {
            if e.expired {
                on_removed(e);
                counts[e.kind.slot()] -= 1;
                false
            } else {
                true
            }
        });
        before - self.entities.len()
    }

    /// Take every entity out of the store
    pub fn drain(&mut self) -> Vec<Entity> {
        self.counts = [0; 3];
        std::mem::take(&mut self.entities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::EntityFactory;
    use crate::rand::ParticleRng;
    use zine_core::ViewportSize;

    const BOUNDS: ViewportSize = ViewportSize::new(800.0, 600.0);

    fn spawn(rng: &mut ParticleRng, tag: BehaviorTag) -> Entity {
        EntityFactory::new(vec![Color::WHITE]).spawn(rng, Vec2::new(100.0, 100.0), tag, BOUNDS)
    }

    fn caps() -> Caps {
        Caps {
            ambient: 3,
            trail: 2,
            burst: 4,
        }
    }

    #[test]
    fn ambient_over_cap_is_skipped() {
        let mut rng = ParticleRng::new(1);
        let mut store = EntityStore::new(caps());
        for _ in 0..3 {
            assert!(matches!(store.admit(spawn(&mut rng, BehaviorTag::AmbientDrift)), Admission::Admitted));
        }
        assert!(matches!(store.admit(spawn(&mut rng, BehaviorTag::GenreBubble)), Admission::Skipped));
        assert_eq!(store.count(SpawnKind::Ambient), 3);
        let ids: Vec<u64> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn trail_over_cap_evicts_oldest_of_same_kind() {
        let mut rng = ParticleRng::new(2);
        let mut store = EntityStore::new(caps());
        store.admit(spawn(&mut rng, BehaviorTag::AmbientDrift));
        store.admit(spawn(&mut rng, BehaviorTag::TrailSparkle));
        store.admit(spawn(&mut rng, BehaviorTag::TrailSparkle));

        match store.admit(spawn(&mut rng, BehaviorTag::TrailSparkle)) {
            Admission::Evicted(old) => assert_eq!(old.id, 2),
            other => panic!("expected eviction, got {other:?}"),
        }
        let ids: Vec<u64> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3, 4]);
        assert_eq!(store.count(SpawnKind::Trail), 2);
    }

    #[test]
    fn population_never_exceeds_total_cap() {
        let mut rng = ParticleRng::new(3);
        let mut store = EntityStore::new(caps());
        for i in 0..200 {
            let tag = BehaviorTag::ALL[i % BehaviorTag::ALL.len()];
            store.admit(spawn(&mut rng, tag));
            assert!(store.len() <= caps().total());
            for kind in SpawnKind::ALL {
                assert!(store.count(kind) <= caps().get(kind));
            }
        }
    }

    #[test]
    fn cull_preserves_order_and_counts() {
        let mut rng = ParticleRng::new(4);
        let mut store = EntityStore::new(caps());
        for _ in 0..4 {
            store.admit(spawn(&mut rng, BehaviorTag::ClickBurst));
        }
        for e in store.iter_mut() {
            e.expired = e.id % 2 == 0;
        }
        let mut seen = Vec::new();
        assert_eq!(store.cull_expired(|e| seen.push(e.id)), 2);
        assert_eq!(seen, vec![2, 4]);
        let ids: Vec<u64> = store.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![1, 3]);
        assert_eq!(store.count(SpawnKind::Burst), 2);
    }

    #[test]
    fn zero_cap_rejects_kind() {
        let mut rng = ParticleRng::new(5);
        let mut store = EntityStore::new(Caps {
            ambient: 1,
            trail: 0,
            burst: 1,
        });
        assert!(matches!(store.admit(spawn(&mut rng, BehaviorTag::TrailSparkle)), Admission::Skipped));
        assert!(store.is_empty());
    }
}
