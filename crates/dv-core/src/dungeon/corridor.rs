//! Corridor generation
//!
//! Joins rooms with the 4-phase scheme:
//! 1. Connect adjacent rooms (room[i] to room[i+1])
//! 2. Connect rooms two steps apart if not already connected
//! 3. Connect every room still unreachable from room 0
//! 4. Add random extra corridors for variety
//!
//! Each join opens a door on the wall facing the other room and carves the
//! cheapest route between the two doorsteps. Existing corridor is cheaper
//! than rock, so corridors tend to merge.

use tracing::{debug, warn};

use crate::error::{GenResult, GenerationError};
use crate::rng::GameRng;

use super::path::cheapest_path;
use super::room::Room;
use super::{CellType, Level, RegionId, RegionKind};

/// Entry cost of unworked rock
const ROCK_COST: u32 = 3;
/// Entry cost of an existing corridor cell
const CORRIDOR_COST: u32 = 1;

/// Disjoint sets of rooms already joined by corridors
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    /// Parent link per room; a root points at itself
    parent: Vec<usize>,
    /// Rank bound per root, keeps trees shallow
    rank: Vec<u8>,
    groups: usize,
}

impl ConnectivityTracker {
    pub fn new(num_rooms: usize) -> Self {
        Self {
            parent: (0..num_rooms).collect(),
            rank: vec![0; num_rooms],
            groups: num_rooms,
        }
    }

    fn root(&self, mut room: usize) -> usize {
        while self.parent[room] != room {
            room = self.parent[room];
        }
        room
    }

    /// Whether a corridor path already links the two rooms.
    /// Out-of-range rooms are never connected.
    pub fn are_connected(&self, a: usize, b: usize) -> bool {
        let n = self.parent.len();
        a < n && b < n && self.root(a) == self.root(b)
    }

    /// Record that `a` and `b` are now linked
    pub fn merge(&mut self, a: usize, b: usize) {
        let n = self.parent.len();
        if a >= n || b >= n {
            return;
        }
        let (ra, rb) = (self.root(a), self.root(b));
        if ra == rb {
            return;
        }
        let (low, high) = if self.rank[ra] < self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[low] = high;
        if self.rank[low] == self.rank[high] {
            self.rank[high] += 1;
        }
        self.groups -= 1;
        // Flatten the merged path for later lookups
        self.parent[a] = high;
        self.parent[b] = high;
    }

    /// True once every room sits in one group
    pub fn all_connected(&self) -> bool {
        self.groups <= 1
    }
}

fn carve_cost(level: &Level) -> impl Fn(usize, usize) -> Option<u32> + '_ {
    move |x, y| match level.cells[x][y].typ {
        CellType::Stone => Some(ROCK_COST),
        CellType::Corridor => Some(CORRIDOR_COST),
        _ => None,
    }
}

/// Join two rooms with a corridor.
///
/// Returns the region holding the newly carved cells, if any were carved.
/// Leaves the map untouched when no route exists.
fn join_rooms(
    level: &mut Level,
    rooms: &[Room],
    room_a: usize,
    room_b: usize,
    tracker: &mut ConnectivityTracker,
    rng: &mut GameRng,
) -> Option<RegionId> {
    if room_a >= rooms.len() || room_b >= rooms.len() || room_a == room_b {
        return None;
    }

    let a = &rooms[room_a];
    let b = &rooms[room_b];
    let (door_a, step_a) = a.door_towards(b, rng);
    let (door_b, step_b) = b.door_towards(a, rng);

    for &(x, y) in &[step_a, step_b] {
        if !matches!(level.cell_type(x as i64, y as i64), CellType::Stone | CellType::Corridor)
            || !level.in_bounds(x as i64, y as i64)
        {
            debug!(room_a, room_b, "doorstep blocked, skipping join");
            return None;
        }
    }

    let path = cheapest_path(level, step_a, step_b, carve_cost(level))?;

    level.set_cell_type(door_a.0, door_a.1, CellType::Door);
    level.set_cell_type(door_b.0, door_b.1, CellType::Door);

    let mut carved = Vec::new();
    for (x, y) in path {
        if level.cells[x][y].typ == CellType::Stone {
            level.set_cell_type(x, y, CellType::Corridor);
            carved.push((x, y));
        }
    }

    tracker.merge(room_a, room_b);

    if carved.is_empty() {
        None
    } else {
        Some(level.add_region(RegionKind::Corridor, carved))
    }
}

/// Generate corridors using the 4-phase algorithm.
///
/// Fails when some room stays unreachable.
pub fn generate_corridors(
    level: &mut Level,
    rooms: &[Room],
    extra_chance: u32,
    rng: &mut GameRng,
) -> GenResult<Vec<RegionId>> {
    let mut corridors = Vec::new();
    if rooms.len() < 2 {
        return Ok(corridors);
    }

    let mut tracker = ConnectivityTracker::new(rooms.len());

    // Phase 1
    for i in 0..rooms.len() - 1 {
        corridors.extend(join_rooms(level, rooms, i, i + 1, &mut tracker, rng));
    }

    // Phase 2
    for i in 0..rooms.len().saturating_sub(2) {
        if !tracker.are_connected(i, i + 2) {
            corridors.extend(join_rooms(level, rooms, i, i + 2, &mut tracker, rng));
        }
    }

    // Phase 3
    for attempt in 0..2 {
        for b in 1..rooms.len() {
            if !tracker.are_connected(0, b) {
                let a = if attempt == 0 { 0 } else { rng.rn2(rooms.len() as u32) as usize };
                corridors.extend(join_rooms(level, rooms, a, b, &mut tracker, rng));
            }
        }
    }

    // Phase 4
    if rooms.len() > 2 {
        let extra = rng.rn2(rooms.len() as u32) as usize + 1;
        for _ in 0..extra {
            if !rng.percent(extra_chance) {
                continue;
            }
            let a = rng.rn2(rooms.len() as u32) as usize;
            let b = rng.rn2(rooms.len() as u32) as usize;
            corridors.extend(join_rooms(level, rooms, a, b, &mut tracker, rng));
        }
    }

    if !tracker.all_connected() {
        warn!(rooms = rooms.len(), "rooms left disconnected after corridor phases");
        return Err(GenerationError::Topology(
            "could not connect every room".to_string(),
        ));
    }

    Ok(corridors)
}
