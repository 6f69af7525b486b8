//! Simulated entities, their aspects, and the per-frame scheduler

mod actor;
mod aspect;
pub mod aspects;
mod scheduler;

pub use actor::{Entity, EntityId, EntityIdAllocator, Item};
pub use aspect::{AsAny, Aspect, AspectKind};
pub use scheduler::{ComponentScheduler, EntityMut};
