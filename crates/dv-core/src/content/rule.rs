//! Content categories and their placement rules

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Category of placeable content
///
/// Iteration order (`ContentType::iter()`) is the order mandatory content is
/// scheduled in.
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
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ContentType {
    Protagonist,
    Companion,
    Entrance,
    Exit,
    Merchant,
    Enemy,
    Destructible,
    Treasure,
}

impl ContentType {
    /// Map glyph for renderers that draw placed content
    pub const fn glyph(self) -> char {
        match self {
            ContentType::Protagonist => '@',
            ContentType::Companion => 'd',
            ContentType::Entrance => '<',
            ContentType::Exit => '>',
            ContentType::Merchant => 'M',
            ContentType::Enemy => 'E',
            ContentType::Destructible => '0',
            ContentType::Treasure => '$',
        }
    }
}

/// How many instances of a type a level receives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CreationRule {
    /// Exactly one per level; generation fails if it cannot be placed
    ExactlyOnce,
    /// Unbounded, governed by density and weight
    Any,
    /// Governed by density and weight, capped level-wide
    AtMost(u32),
}

impl CreationRule {
    /// Whether the type takes part in the weighted density fill
    pub fn is_optional(self) -> bool {
        !matches!(self, CreationRule::ExactlyOnce)
    }

    /// Level-wide cap for optional content
    pub fn cap(self) -> Option<u32> {
        match self {
            CreationRule::AtMost(n) => Some(n),
            _ => None,
        }
    }
}

/// Which region a type may appear in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocalizationRule {
    /// Only in the level's designated main room
    MainRoom,
    #[default]
    Any,
}

/// Which cells of a region a type may occupy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementRule {
    #[default]
    Any,
    /// Only cells orthogonally next to a wall or rock
    Edge,
}

/// Per-type placement policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentRule {
    pub creation: CreationRule,
    #[serde(default)]
    pub localization: LocalizationRule,
    #[serde(default)]
    pub placement: PlacementRule,
}

impl ContentRule {
    pub const fn new(
        creation: CreationRule,
        localization: LocalizationRule,
        placement: PlacementRule,
    ) -> Self {
        Self {
            creation,
            localization,
            placement,
        }
    }

    /// Unbounded content placed anywhere
    pub const fn any() -> Self {
        Self::new(CreationRule::Any, LocalizationRule::Any, PlacementRule::Any)
    }

    /// Exactly one instance with the given location constraints
    pub const fn exactly_once(localization: LocalizationRule, placement: PlacementRule) -> Self {
        Self::new(CreationRule::ExactlyOnce, localization, placement)
    }

    pub const fn with_placement(mut self, placement: PlacementRule) -> Self {
        self.placement = placement;
        self
    }
}
