//! Rooms and corridors as placement containers

use core::fmt;

use serde::{Deserialize, Serialize};
use strum::Display;

/// Index of a region within its level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RegionId(pub usize);

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Whether a region is a room or a corridor; each uses its own density range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegionKind {
    Room,
    Corridor,
}

/// A set of floor cells that receives content as a unit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub kind: RegionKind,
    /// Walkable cells owned by this region, in carving order
    pub cells: Vec<(usize, usize)>,
}

impl Region {
    pub fn new(id: RegionId, kind: RegionKind, cells: Vec<(usize, usize)>) -> Self {
        Self { id, kind, cells }
    }

    /// Number of floor cells
    pub fn area(&self) -> usize {
        self.cells.len()
    }

    pub fn is_room(&self) -> bool {
        self.kind == RegionKind::Room
    }

    pub fn contains(&self, x: usize, y: usize) -> bool {
        self.cells.contains(&(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_basics() {
        let region = Region::new(RegionId(2), RegionKind::Corridor, vec![(1, 1), (2, 1)]);
        assert_eq!(region.area(), 2);
        assert!(!region.is_room());
        assert!(region.contains(2, 1));
        assert!(!region.contains(3, 1));
        assert_eq!(region.id.to_string(), "#2");
        assert_eq!(region.kind.to_string(), "corridor");
    }
}
