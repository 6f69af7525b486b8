//! Dungeon topology
//!
//! Contains the cell grid, rooms and corridors as placement regions, the
//! carver that produces them, and distance queries over the result.

mod cell;
mod corridor;
mod generation;
mod level;
pub mod path;
mod region;
mod room;

pub use cell::{Cell, CellType};
pub use corridor::{generate_corridors, ConnectivityTracker};
pub use generation::{generate_topology, SizeRange, TopologyConfig, COLNO, ROWNO};
pub use level::Level;
pub use region::{Region, RegionId, RegionKind};
pub use room::Room;
