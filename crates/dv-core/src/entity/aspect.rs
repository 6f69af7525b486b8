//! Aspect kinds and the aspect trait
//!
//! An aspect is one orthogonal facet of an entity's behaviour. The scheduler
//! updates aspects bucket by bucket in the order `AspectKind` declares.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumCount, EnumIter};

use super::EntityId;

/// Facet of entity behaviour, declared in update order
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumIter,
    EnumCount,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AspectKind {
    State,
    Movement,
    Condition,
    Attack,
    Aura,
    Subject,
    Target,
    PickUp,
    Speech,
    Log,
    Visual,
    Barrier,
    Perception,
    Stealth,
    Touch,
    Skill,
}

impl AspectKind {
    /// Position in the update order
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Downcasting support for boxed aspects
pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Per-frame behaviour attached to an entity
pub trait Aspect: AsAny + fmt::Debug {
    /// Bucket this aspect is scheduled in
    fn kind(&self) -> AspectKind;

    /// Advance by `delta_time` seconds
    fn update(&mut self, entity: EntityId, delta_time: f64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use strum::IntoEnumIterator;

    #[test]
    fn test_order_matches_declaration() {
        let order: Vec<AspectKind> = AspectKind::iter().collect();
        assert_eq!(order.len(), AspectKind::COUNT);
        assert_eq!(order[0], AspectKind::State);
        assert_eq!(order[1], AspectKind::Movement);
        assert_eq!(order[AspectKind::COUNT - 1], AspectKind::Skill);
        for (i, kind) in order.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
        assert!(AspectKind::Movement < AspectKind::Attack);
        assert!(AspectKind::Visual < AspectKind::Perception);
    }
}
