//! Procedural content engine for a dungeon crawler
//!
//! This crate builds playable levels and drives the entities placed in them:
//! - Level topology: rooms, corridors, connectivity and path queries
//! - Content rules: per-phase probability tables with density bounds
//! - Content sets: factories that turn content types into entities
//! - Aspect scheduling: fixed-order per-frame updates
//!
//! Generation is single-threaded and reproducible from a seed. Presentation,
//! input and persistence belong to the host.

pub mod build;
pub mod collections;
pub mod config;
pub mod content;
pub mod dungeon;
pub mod entity;
pub mod error;
pub mod logging;
pub mod rng;

pub use build::{ActiveLevel, BuiltLevel, LevelBuilder, PlacedContent};
pub use config::GeneratorConfig;
pub use error::{DistributionError, GenResult, GenerationError};
pub use rng::GameRng;
