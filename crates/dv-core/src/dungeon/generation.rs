//! Level topology generation
//!
//! Places rectangular rooms by rejection sampling, carves them with walls,
//! joins them with corridors and designates the main room. The result is
//! the region layout the content engine fills.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{GenResult, GenerationError};
use crate::rng::GameRng;

use super::corridor::generate_corridors;
use super::room::Room;
use super::{CellType, Level, RegionId, RegionKind};

/// Default map width
pub const COLNO: usize = 80;
/// Default map height
pub const ROWNO: usize = 21;

/// Margin applied to both rooms in overlap checks, so interiors stay four
/// cells apart: wall, two cells of rock, wall
const ROOM_BUFFER: usize = 2;

/// Inclusive integer range read from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeRange {
    pub min: usize,
    pub max: usize,
}

impl SizeRange {
    pub const fn new(min: usize, max: usize) -> Self {
        Self { min, max }
    }

    pub fn sample(&self, rng: &mut GameRng) -> usize {
        if self.max <= self.min {
            return self.min;
        }
        self.min + rng.rn2((self.max - self.min + 1) as u32) as usize
    }
}

/// Parameters of the room-and-corridor carver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopologyConfig {
    pub width: usize,
    pub height: usize,
    /// How many rooms the carver tries to place
    pub rooms: SizeRange,
    /// Fewest rooms that still make a usable level
    pub min_rooms: usize,
    pub room_width: SizeRange,
    pub room_height: SizeRange,
    /// Percent chance for each extra (loop-forming) corridor
    pub extra_corridor_chance: u32,
}

impl Default for TopologyConfig {
    fn default() -> Self {
        Self {
            width: COLNO,
            height: ROWNO,
            rooms: SizeRange::new(6, 9),
            min_rooms: 3,
            room_width: SizeRange::new(3, 9),
            room_height: SizeRange::new(3, 5),
            extra_corridor_chance: 40,
        }
    }
}

impl TopologyConfig {
    /// Check that the configured rooms can fit on the map at all
    pub fn validate(&self) -> GenResult<()> {
        if self.room_width.min == 0 || self.room_height.min == 0 {
            return Err(GenerationError::Config(
                "room dimensions must be at least 1".to_string(),
            ));
        }
        if self.room_width.min > self.room_width.max
            || self.room_height.min > self.room_height.max
            || self.rooms.min > self.rooms.max
        {
            return Err(GenerationError::Config(
                "size ranges must have min <= max".to_string(),
            ));
        }
        // Interior plus walls plus a doorstep ring on each side
        if self.width < self.room_width.max + 6 || self.height < self.room_height.max + 6 {
            return Err(GenerationError::Config(format!(
                "{}x{} map is too small for {}x{} rooms",
                self.width, self.height, self.room_width.max, self.room_height.max
            )));
        }
        if self.min_rooms > self.rooms.max {
            return Err(GenerationError::Config(
                "min_rooms exceeds the room target".to_string(),
            ));
        }
        Ok(())
    }
}

/// Place non-overlapping rooms, sorted left to right
fn place_rooms(config: &TopologyConfig, rng: &mut GameRng) -> Vec<Room> {
    let target = config.rooms.sample(rng);
    let mut rooms: Vec<Room> = Vec::new();

    for _ in 0..target * 10 {
        let width = config.room_width.sample(rng);
        let height = config.room_height.sample(rng);

        // Interior starts at 2 so walls and doorsteps stay on the map
        let max_x = config.width - width - 2;
        let max_y = config.height - height - 2;
        let x = 2 + rng.rn2((max_x - 2) as u32) as usize;
        let y = 2 + rng.rn2((max_y - 2) as u32) as usize;

        let room = Room::new(x, y, width, height);
        if rooms.iter().any(|r| room.overlaps(r, ROOM_BUFFER)) {
            continue;
        }

        rooms.push(room);
        if rooms.len() >= target {
            break;
        }
    }

    rooms.sort_by_key(|room| (room.x, room.y));
    rooms
}

/// Carve a room's floor and surrounding walls
fn carve_room(level: &mut Level, room: &Room) {
    let (lx, ly, hx, hy) = room.wall_bounds();
    for x in lx..=hx {
        for y in ly..=hy {
            let typ = if room.contains(x, y) {
                CellType::Floor
            } else {
                CellType::Wall
            };
            level.set_cell_type(x, y, typ);
        }
    }
}

/// Index of the largest room; ties go to the lowest index
fn pick_main_room(rooms: &[Room]) -> Option<usize> {
    rooms
        .iter()
        .enumerate()
        .max_by(|(ia, a), (ib, b)| a.area().cmp(&b.area()).then(ib.cmp(ia)))
        .map(|(i, _)| i)
}

/// Generate a connected level of rooms and corridors
pub fn generate_topology(config: &TopologyConfig, rng: &mut GameRng) -> GenResult<Level> {
    config.validate()?;

    let rooms = place_rooms(config, rng);
    if rooms.len() < config.min_rooms {
        return Err(GenerationError::Topology(format!(
            "placed {} rooms, need at least {}",
            rooms.len(),
            config.min_rooms
        )));
    }

    let mut level = Level::new(config.width, config.height);
    let mut room_regions: Vec<RegionId> = Vec::with_capacity(rooms.len());
    for room in &rooms {
        carve_room(&mut level, room);
        room_regions.push(level.add_region(RegionKind::Room, room.interior_cells().collect()));
    }

    let corridors = generate_corridors(&mut level, &rooms, config.extra_corridor_chance, rng)?;

    if let Some(main) = pick_main_room(&rooms) {
        level.set_main_region(room_regions[main]);
        debug!(region = %room_regions[main], area = rooms[main].area(), "main room chosen");
    }

    info!(
        rooms = rooms.len(),
        corridors = corridors.len(),
        seed = rng.seed(),
        "level topology generated"
    );
    Ok(level)
}
