//! Error types for level generation
//!
//! Generation either completes a level or aborts the whole build with a
//! `GenerationError`. Nothing is retried here; callers that want another
//! attempt rebuild from scratch with a fresh seed.

use thiserror::Error;

use crate::content::ContentType;
use crate::dungeon::RegionId;

/// Fatal errors that abort a level build
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// The generator was invoked out of order or with corrupt inputs
    #[error("precondition violated: {0}")]
    Precondition(String),

    /// A content probability table failed validation
    #[error("invalid content table: {reason}")]
    InvalidTable { reason: String },

    /// Mandatory content found no legal cell
    #[error("no legal cell for mandatory {kind} content in region {region}")]
    UnsatisfiablePlacement { kind: ContentType, region: RegionId },

    /// The carver could not produce a usable level
    #[error("topology generation failed: {0}")]
    Topology(String),

    /// Configuration could not be read or parsed
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors building a weighted distribution
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DistributionError {
    #[error("weighted distribution needs at least one entry")]
    Empty,

    #[error("weight at index {index} must be positive and finite, got {weight}")]
    NonPositiveWeight { index: usize, weight: f64 },
}

impl From<DistributionError> for GenerationError {
    fn from(err: DistributionError) -> Self {
        GenerationError::InvalidTable {
            reason: err.to_string(),
        }
    }
}

/// Result alias used across the generator
pub type GenResult<T> = Result<T, GenerationError>;
