//! Level build orchestration
//!
//! A build carves the topology, looks up the phase table and populates the
//! level. The result owns every placed entity until it is activated, at
//! which point the entities move into a [`ComponentScheduler`] and the level
//! keeps only lightweight records of what went where.

use tracing::{info, warn};

use crate::config::GeneratorConfig;
use crate::content::{
    AttachmentPoint, ContentFlags, ContentSet, ContentType, Phase, Placement, populate,
};
use crate::dungeon::{Level, RegionId, generate_topology};
use crate::entity::{ComponentScheduler, EntityId};
use crate::error::GenResult;
use crate::rng::GameRng;

/// Builds levels from one configuration
#[derive(Debug, Clone, Default)]
pub struct LevelBuilder {
    config: GeneratorConfig,
}

impl LevelBuilder {
    pub fn new(config: GeneratorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// RNG for this configuration: seeded if a seed is set, otherwise from entropy
    pub fn rng(&self) -> GameRng {
        match self.config.seed {
            Some(seed) => GameRng::new(seed),
            None => GameRng::from_entropy(),
        }
    }

    /// Carve and populate one level.
    ///
    /// Any error aborts the whole build; nothing partial is returned.
    pub fn build<S: ContentSet + ?Sized>(
        &self,
        phase: Phase,
        set: &mut S,
        rng: &mut GameRng,
    ) -> GenResult<BuiltLevel> {
        let level = generate_topology(&self.config.topology, rng)?;
        let table = self.config.phases.table(phase)?;
        let placements = populate(&level, &table, set, rng)?;
        info!(
            %phase,
            regions = level.regions().len(),
            placements = placements.len(),
            "level built"
        );
        Ok(BuiltLevel {
            level,
            phase,
            placements,
        })
    }
}

/// A populated level whose entities are not yet simulated
#[derive(Debug)]
pub struct BuiltLevel {
    pub level: Level,
    pub phase: Phase,
    pub placements: Vec<Placement>,
}

impl BuiltLevel {
    pub fn count(&self, kind: ContentType) -> usize {
        self.placements
            .iter()
            .filter(|p| p.content.kind == kind)
            .count()
    }

    pub fn placements_in(&self, region: RegionId) -> impl Iterator<Item = &Placement> {
        self.placements.iter().filter(move |p| p.region == region)
    }

    /// Terrain with content glyphs drawn over it
    pub fn render(&self) -> Vec<String> {
        overlay(
            &self.level,
            self.placements.iter().map(|p| (p.position, p.content.kind)),
        )
    }

    /// Hand every placed entity to the scheduler
    pub fn activate(self, scheduler: &mut ComponentScheduler) -> ActiveLevel {
        let mut contents = Vec::with_capacity(self.placements.len());
        for placement in self.placements {
            let Placement {
                content,
                region,
                position,
            } = placement;
            let record = PlacedContent {
                kind: content.kind,
                flags: content.flags,
                entity: content.entity.id,
                region,
                position,
                attachment: content.attachment,
            };
            if !scheduler.add_entity(content.entity) {
                warn!(entity = %record.entity, "entity already managed");
            }
            contents.push(record);
        }
        info!(
            phase = %self.phase,
            entities = contents.len(),
            "level activated"
        );
        ActiveLevel {
            level: self.level,
            phase: self.phase,
            contents,
        }
    }
}

/// What was placed where, once the entity itself lives in the scheduler
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedContent {
    pub kind: ContentType,
    pub flags: ContentFlags,
    pub entity: EntityId,
    pub region: RegionId,
    pub position: (usize, usize),
    pub attachment: Option<AttachmentPoint>,
}

/// A level whose entities are driven by a scheduler
#[derive(Debug)]
pub struct ActiveLevel {
    pub level: Level,
    pub phase: Phase,
    pub contents: Vec<PlacedContent>,
}

impl ActiveLevel {
    pub fn content_at(&self, x: usize, y: usize) -> Option<&PlacedContent> {
        self.contents.iter().find(|c| c.position == (x, y))
    }

    pub fn render(&self) -> Vec<String> {
        overlay(
            &self.level,
            self.contents.iter().map(|c| (c.position, c.kind)),
        )
    }

    /// Remove this level's entities from the scheduler; returns how many were managed
    pub fn release(&self, scheduler: &mut ComponentScheduler) -> usize {
        self.contents
            .iter()
            .filter(|c| scheduler.remove_entity(c.entity).is_some())
            .count()
    }
}

fn overlay<I>(level: &Level, marks: I) -> Vec<String>
where
    I: IntoIterator<Item = ((usize, usize), ContentType)>,
{
    let mut rows: Vec<Vec<char>> = level
        .render()
        .into_iter()
        .map(|row| row.chars().collect())
        .collect();
    for ((x, y), kind) in marks {
        if let Some(cell) = rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *cell = kind.glyph();
        }
    }
    rows.into_iter().map(|row| row.into_iter().collect()).collect()
}
