//! Level structure: cell grid plus the regions content is placed into

use serde::{Deserialize, Serialize};

use super::{Cell, CellType, Region, RegionId, RegionKind};

/// Orthogonal neighbour offsets
pub(crate) const ORTHOGONAL: [(i64, i64); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// A carved level
///
/// Cells are indexed `cells[x][y]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Level {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Vec<Cell>>,
    regions: Vec<Region>,
    main_region: Option<RegionId>,
}

impl Level {
    /// Create a level of solid stone
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![vec![Cell::stone(); height]; width],
            regions: Vec::new(),
            main_region: None,
        }
    }

    pub fn in_bounds(&self, x: i64, y: i64) -> bool {
        x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        self.cells.get(x).and_then(|col| col.get(y))
    }

    /// Terrain at a signed position; out-of-bounds reads as stone
    pub fn cell_type(&self, x: i64, y: i64) -> CellType {
        if !self.in_bounds(x, y) {
            return CellType::Stone;
        }
        self.cells[x as usize][y as usize].typ
    }

    pub fn set_cell_type(&mut self, x: usize, y: usize, typ: CellType) {
        if let Some(cell) = self.cells.get_mut(x).and_then(|col| col.get_mut(y)) {
            cell.typ = typ;
        }
    }

    pub fn is_passable(&self, x: usize, y: usize) -> bool {
        self.cell(x, y).is_some_and(|cell| cell.typ.is_passable())
    }

    /// Register a region over `cells` and tag those cells with its id
    pub fn add_region(&mut self, kind: RegionKind, cells: Vec<(usize, usize)>) -> RegionId {
        let id = RegionId(self.regions.len());
        for &(x, y) in &cells {
            if let Some(cell) = self.cells.get_mut(x).and_then(|col| col.get_mut(y)) {
                cell.region = Some(id);
            }
        }
        self.regions.push(Region::new(id, kind, cells));
        id
    }

    pub fn region(&self, id: RegionId) -> Option<&Region> {
        self.regions.get(id.0)
    }

    pub fn regions(&self) -> &[Region] {
        &self.regions
    }

    /// Region owning the cell at (x, y)
    pub fn region_at(&self, x: usize, y: usize) -> Option<RegionId> {
        self.cell(x, y).and_then(|cell| cell.region)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind == RegionKind::Room)
    }

    pub fn corridors(&self) -> impl Iterator<Item = &Region> {
        self.regions.iter().filter(|r| r.kind == RegionKind::Corridor)
    }

    /// The designated primary room
    pub fn main_region(&self) -> Option<&Region> {
        self.main_region.and_then(|id| self.region(id))
    }

    pub fn main_region_id(&self) -> Option<RegionId> {
        self.main_region
    }

    pub fn set_main_region(&mut self, id: RegionId) {
        if id.0 < self.regions.len() {
            self.main_region = Some(id);
        }
    }

    /// Check if a cell touches a wall, rock, or the map edge orthogonally
    pub fn is_boundary_adjacent(&self, x: usize, y: usize) -> bool {
        ORTHOGONAL.iter().any(|(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            self.cell_type(nx, ny).is_solid()
        })
    }

    /// Check if there's a door next to a position (4 cardinal directions)
    pub fn is_beside_door(&self, x: usize, y: usize) -> bool {
        ORTHOGONAL.iter().any(|(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            self.cell_type(nx, ny) == CellType::Door
        })
    }

    /// Passable orthogonal neighbours of a cell
    pub fn passable_neighbours(&self, x: usize, y: usize) -> impl Iterator<Item = (usize, usize)> + '_ {
        ORTHOGONAL.iter().filter_map(move |(dx, dy)| {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;
            if self.cell_type(nx, ny).is_passable() {
                Some((nx as usize, ny as usize))
            } else {
                None
            }
        })
    }

    /// Render the terrain as one string per row
    pub fn render(&self) -> Vec<String> {
        (0..self.height)
            .map(|y| (0..self.width).map(|x| self.cells[x][y].typ.glyph()).collect())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_room_level() -> Level {
        // 7x5 level: a 3x3 room at (2,1) inside walls, door on the east wall
        let mut level = Level::new(7, 5);
        for x in 1..=5 {
            for y in 0..=4 {
                level.set_cell_type(x, y, CellType::Wall);
            }
        }
        let mut cells = Vec::new();
        for x in 2..=4 {
            for y in 1..=3 {
                level.set_cell_type(x, y, CellType::Floor);
                cells.push((x, y));
            }
        }
        level.set_cell_type(5, 2, CellType::Door);
        let id = level.add_region(RegionKind::Room, cells);
        level.set_main_region(id);
        level
    }

    #[test]
    fn test_new_level_is_stone() {
        let level = Level::new(10, 4);
        assert_eq!(level.cells.len(), 10);
        assert!(level.cells.iter().all(|col| col.len() == 4));
        assert!(level
            .cells
            .iter()
            .flatten()
            .all(|cell| cell.typ == CellType::Stone));
        assert_eq!(level.cell_type(-1, 0), CellType::Stone);
    }

    #[test]
    fn test_regions_tag_cells() {
        let level = small_room_level();
        assert_eq!(level.regions().len(), 1);
        assert_eq!(level.region_at(3, 2), Some(RegionId(0)));
        assert_eq!(level.region_at(1, 1), None);
        assert_eq!(level.main_region().map(|r| r.area()), Some(9));
    }

    #[test]
    fn test_boundary_adjacency() {
        let level = small_room_level();
        assert!(level.is_boundary_adjacent(2, 1));
        assert!(level.is_boundary_adjacent(4, 3));
        assert!(!level.is_boundary_adjacent(3, 2));
    }

    #[test]
    fn test_beside_door() {
        let level = small_room_level();
        assert!(level.is_beside_door(4, 2));
        assert!(!level.is_beside_door(2, 2));
    }

    #[test]
    fn test_set_main_region_ignores_unknown() {
        let mut level = small_room_level();
        level.set_main_region(RegionId(9));
        assert_eq!(level.main_region_id(), Some(RegionId(0)));
    }

    #[test]
    fn test_render_dimensions() {
        let level = small_room_level();
        let rows = level.render();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|row| row.chars().count() == 7));
        assert_eq!(rows[2].chars().nth(5), Some('+'));
    }
}
