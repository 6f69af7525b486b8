//! Generator configuration
//!
//! Everything a level build reads comes from one [`GeneratorConfig`],
//! loaded from TOML or built in code. Content tables are validated while
//! they are deserialized, so a bad table never reaches the generator.
//!
//! ```toml
//! seed = 7
//!
//! [topology]
//! width = 60
//! height = 21
//!
//! [phases.first_visit]
//! room_density = { min = 0.0, max = 0.1 }
//! corridor_density = { min = 0.0, max = 0.075 }
//!
//! [phases.first_visit.rules]
//! protagonist = { creation = "exactly_once", localization = "main_room" }
//! destructible = { creation = "any", placement = "edge" }
//!
//! [phases.first_visit.weights]
//! destructible = 1.0
//! ```
//!
//! A `[phases]` table replaces the built-in phase tables as a whole.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::content::{PhaseRules, ScalingConfig};
use crate::dungeon::TopologyConfig;
use crate::error::{GenResult, GenerationError};

/// Complete input of a level build
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Fixed seed; `None` draws one from entropy
    pub seed: Option<u64>,
    pub topology: TopologyConfig,
    pub scaling: ScalingConfig,
    pub phases: PhaseRules,
}

impl GeneratorConfig {
    pub fn from_toml_str(text: &str) -> GenResult<Self> {
        let config: GeneratorConfig =
            toml::from_str(text).map_err(|e| GenerationError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GenerationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    pub fn to_toml_string(&self) -> GenResult<String> {
        toml::to_string(self).map_err(|e| GenerationError::Config(e.to_string()))
    }

    pub fn validate(&self) -> GenResult<()> {
        self.topology.validate()?;
        if self.scaling.min_level_offset > self.scaling.max_level_offset {
            return Err(GenerationError::Config(format!(
                "scaling offsets {}..{} are inverted",
                self.scaling.min_level_offset, self.scaling.max_level_offset
            )));
        }
        Ok(())
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}
