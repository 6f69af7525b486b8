//! Map cell types

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

use super::RegionId;

/// Cell/terrain type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
#[repr(u8)]
pub enum CellType {
    #[default]
    Stone = 0,
    Wall = 1,
    Door = 2,
    Corridor = 3,
    Floor = 4,
}

impl CellType {
    /// Solid terrain a corridor or room boundary is made of
    pub const fn is_solid(&self) -> bool {
        matches!(self, CellType::Stone | CellType::Wall)
    }

    /// Check if this is passable (can walk through)
    pub const fn is_passable(&self) -> bool {
        matches!(self, CellType::Floor | CellType::Corridor | CellType::Door)
    }

    /// ASCII glyph used by the map renderer
    pub const fn glyph(&self) -> char {
        match self {
            CellType::Stone => ' ',
            CellType::Wall => '#',
            CellType::Door => '+',
            CellType::Corridor => ',',
            CellType::Floor => '.',
        }
    }
}

/// A single map cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cell {
    pub typ: CellType,
    /// Room or corridor region owning this cell, if any
    pub region: Option<RegionId>,
}

impl Cell {
    /// Solid rock, the initial state of every cell
    pub const fn stone() -> Self {
        Self {
            typ: CellType::Stone,
            region: None,
        }
    }
}
