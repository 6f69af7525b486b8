//! Entities: identity, inventory and attached aspects

use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{EnumCount, IntoEnumIterator};

use super::aspect::{Aspect, AspectKind};

/// Opaque handle to a simulated game object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity:{}", self.0)
    }
}

/// Hands out entity ids in increasing order
#[derive(Debug, Clone, Default)]
pub struct EntityIdAllocator {
    next: u32,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// Carried object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub value: u32,
}

impl Item {
    pub fn new(name: impl Into<String>, value: u32) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// A simulated game object and its aspects
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub level: u32,
    pub items: Vec<Item>,
    /// One slot per aspect kind, indexed by `AspectKind::index`
    aspects: [Option<Box<dyn Aspect>>; AspectKind::COUNT],
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("level", &self.level)
            .field("items", &self.items)
            .field("aspects", &self.aspect_kinds().collect::<Vec<_>>())
            .finish()
    }
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>, level: u32) -> Self {
        Self {
            id,
            name: name.into(),
            level,
            items: Vec::new(),
            aspects: std::array::from_fn(|_| None),
        }
    }

    /// Builder-style attach
    pub fn with(mut self, aspect: impl Aspect) -> Self {
        self.attach(Box::new(aspect));
        self
    }

    pub fn with_items(mut self, items: Vec<Item>) -> Self {
        self.items = items;
        self
    }

    /// Attach an aspect, returning the one it replaces
    pub fn attach(&mut self, aspect: Box<dyn Aspect>) -> Option<Box<dyn Aspect>> {
        let slot = aspect.kind().index();
        self.aspects[slot].replace(aspect)
    }

    pub fn detach(&mut self, kind: AspectKind) -> Option<Box<dyn Aspect>> {
        self.aspects[kind.index()].take()
    }

    pub fn has_aspect(&self, kind: AspectKind) -> bool {
        self.aspects[kind.index()].is_some()
    }

    pub fn aspect(&self, kind: AspectKind) -> Option<&dyn Aspect> {
        self.aspects[kind.index()].as_deref()
    }

    pub fn aspect_mut(&mut self, kind: AspectKind) -> Option<&mut (dyn Aspect + 'static)> {
        self.aspects[kind.index()].as_deref_mut()
    }

    /// Kinds of the attached aspects, in update order
    pub fn aspect_kinds(&self) -> impl Iterator<Item = AspectKind> + '_ {
        AspectKind::iter().filter(|kind| self.has_aspect(*kind))
    }

    /// Typed access to an attached aspect
    pub fn get<A: Aspect>(&self) -> Option<&A> {
        self.aspects
            .iter()
            .flatten()
            .find_map(|aspect| (**aspect).as_any().downcast_ref::<A>())
    }

    pub fn get_mut<A: Aspect>(&mut self) -> Option<&mut A> {
        self.aspects
            .iter_mut()
            .flatten()
            .find_map(|aspect| (**aspect).as_any_mut().downcast_mut::<A>())
    }
}
