//! Fixed-order aspect scheduler
//!
//! Managed entities are kept in one bucket per aspect kind. An update walks
//! the buckets in `AspectKind` order and, within a bucket, the entities in
//! registration order. So every State aspect of every entity runs before any
//! Movement aspect, and so on down the list.

use std::ops::{Deref, DerefMut};

use hashbrown::HashMap;
use strum::{EnumCount, IntoEnumIterator};
use tracing::{debug, trace};

use super::aspect::{Aspect, AspectKind};
use super::{Entity, EntityId};

/// Owns managed entities and drives their per-frame updates
#[derive(Debug)]
pub struct ComponentScheduler {
    entities: HashMap<EntityId, Entity>,
    /// Entity ids per aspect kind, in registration order
    buckets: [Vec<EntityId>; AspectKind::COUNT],
    frame: u64,
}

impl Default for ComponentScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentScheduler {
    pub fn new() -> Self {
        Self {
            entities: HashMap::new(),
            buckets: std::array::from_fn(|_| Vec::new()),
            frame: 0,
        }
    }

    /// Register an entity and its present aspects.
    ///
    /// Returns false, leaving the scheduler untouched, if an entity with the
    /// same id is already managed.
    pub fn add_entity(&mut self, entity: Entity) -> bool {
        let id = entity.id;
        if self.entities.contains_key(&id) {
            return false;
        }
        for kind in entity.aspect_kinds() {
            self.buckets[kind.index()].push(id);
        }
        debug!(%id, name = %entity.name, "entity managed");
        self.entities.insert(id, entity);
        true
    }

    /// Unregister an entity, handing it back. No-op for unmanaged ids.
    pub fn remove_entity(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.entities.remove(&id)?;
        for bucket in &mut self.buckets {
            bucket.retain(|managed| *managed != id);
        }
        debug!(%id, "entity released");
        Some(entity)
    }

    /// Attach an aspect to a managed entity and schedule it.
    ///
    /// Returns false if the entity is not managed.
    pub fn attach(&mut self, id: EntityId, aspect: Box<dyn Aspect>) -> bool {
        let Some(entity) = self.entities.get_mut(&id) else {
            return false;
        };
        let kind = aspect.kind();
        entity.attach(aspect);
        let bucket = &mut self.buckets[kind.index()];
        if !bucket.contains(&id) {
            bucket.push(id);
        }
        true
    }

    /// Detach an aspect from a managed entity and unschedule it
    pub fn detach(&mut self, id: EntityId, kind: AspectKind) -> Option<Box<dyn Aspect>> {
        let aspect = self.entities.get_mut(&id)?.detach(kind)?;
        self.buckets[kind.index()].retain(|managed| *managed != id);
        Some(aspect)
    }

    /// Advance every managed aspect by `delta_time` seconds
    pub fn update(&mut self, delta_time: f64) {
        for kind in AspectKind::iter() {
            for id in &self.buckets[kind.index()] {
                if let Some(aspect) = self
                    .entities
                    .get_mut(id)
                    .and_then(|entity| entity.aspect_mut(kind))
                {
                    aspect.update(*id, delta_time);
                }
            }
        }
        self.frame += 1;
        trace!(frame = self.frame, entities = self.entities.len(), "scheduler tick");
    }

    pub fn is_managed(&self, id: EntityId) -> bool {
        self.entities.contains_key(&id)
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(&id)
    }

    /// Mutable access to a managed entity.
    ///
    /// Aspects may be attached or detached through the returned handle; the
    /// entity's bucket membership is brought up to date when it is dropped.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<EntityMut<'_>> {
        let entity = self.entities.get_mut(&id)?;
        Some(EntityMut {
            id,
            entity,
            buckets: &mut self.buckets,
        })
    }

    /// Ids scheduled for one aspect kind, in update order
    pub fn scheduled(&self, kind: AspectKind) -> &[EntityId] {
        &self.buckets[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Number of completed updates
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

/// Borrowed managed entity that re-syncs its schedule on drop
pub struct EntityMut<'a> {
    id: EntityId,
    entity: &'a mut Entity,
    buckets: &'a mut [Vec<EntityId>; AspectKind::COUNT],
}

impl Deref for EntityMut<'_> {
    type Target = Entity;

    fn deref(&self) -> &Entity {
        self.entity
    }
}

impl DerefMut for EntityMut<'_> {
    fn deref_mut(&mut self) -> &mut Entity {
        self.entity
    }
}

impl Drop for EntityMut<'_> {
    fn drop(&mut self) {
        let id = self.id;
        for kind in AspectKind::iter() {
            let bucket = &mut self.buckets[kind.index()];
            let scheduled = bucket.contains(&id);
            match (self.entity.has_aspect(kind), scheduled) {
                (true, false) => bucket.push(id),
                (false, true) => bucket.retain(|managed| *managed != id),
                _ => {}
            }
        }
    }
}
