//! Content placement
//!
//! Fills a carved level from a phase's probability table in two passes:
//!
//! 1. Mandatory content. Every `ExactlyOnce` type, in `ContentType` order,
//!    gets one placement in a region its localization rule allows. No legal
//!    cell anywhere is a fatal `UnsatisfiablePlacement`.
//! 2. Optional content. Each region, in id order, samples a target density
//!    from the table, turns it into a cell budget against its free cells and
//!    spends the budget on weighted draws. Under-fill is never an error.

use hashbrown::{HashMap, HashSet};
use strum::IntoEnumIterator;
use tracing::{debug, info};

use crate::collections::WeightedDistribution;
use crate::dungeon::{Level, Region, RegionId};
use crate::entity::aspects::MovementAspect;
use crate::error::{GenResult, GenerationError};
use crate::rng::GameRng;

use super::descriptor::Content;
use super::rule::{ContentRule, ContentType, LocalizationRule, PlacementRule};
use super::set::ContentSet;
use super::table::ContentProbabilityTable;

/// Content bound to a cell
#[derive(Debug)]
pub struct Placement {
    pub content: Content,
    pub region: RegionId,
    pub position: (usize, usize),
}

/// Working state of one populate run
struct Populator<'a, S: ContentSet + ?Sized> {
    level: &'a Level,
    table: &'a ContentProbabilityTable,
    set: &'a mut S,
    occupied: HashSet<(usize, usize)>,
    /// Optional placements per type, level-wide
    counts: HashMap<ContentType, u32>,
    placements: Vec<Placement>,
}

impl<'a, S: ContentSet + ?Sized> Populator<'a, S> {
    /// Ask the set for content, dressing it if the set can describe looks
    fn make(&mut self, kind: ContentType, rng: &mut GameRng) -> GenResult<Option<Content>> {
        let Some(mut content) = self.set.make_content(kind, rng)? else {
            return Ok(None);
        };
        let point = self
            .set
            .appearance()
            .and_then(|source| source.attachment_for(kind, &content.entity.name));
        if let Some(point) = point {
            content.attach_appearance(point);
        }
        Ok(Some(content))
    }

    /// Free cells of a region that satisfy a placement rule
    fn legal_cells(
        &self,
        region: &Region,
        placement: PlacementRule,
        obstacle: bool,
    ) -> Vec<(usize, usize)> {
        region
            .cells
            .iter()
            .copied()
            .filter(|cell| !self.occupied.contains(cell))
            .filter(|&(x, y)| match placement {
                PlacementRule::Any => true,
                PlacementRule::Edge => self.level.is_boundary_adjacent(x, y),
            })
            .filter(|&(x, y)| !obstacle || !self.level.is_beside_door(x, y))
            .collect()
    }

    fn free_cells(&self, region: &Region) -> usize {
        region
            .cells
            .iter()
            .filter(|cell| !self.occupied.contains(*cell))
            .count()
    }

    fn place(&mut self, mut content: Content, region: RegionId, position: (usize, usize)) {
        if let Some(movement) = content.entity.get_mut::<MovementAspect>() {
            movement.position = (position.0 as f64, position.1 as f64);
        }
        self.occupied.insert(position);
        self.placements.push(Placement {
            content,
            region,
            position,
        });
    }

    /// Regions a rule may use, in the order they are tried
    fn candidate_regions(
        &self,
        rule: &ContentRule,
        rng: &mut GameRng,
    ) -> GenResult<Vec<RegionId>> {
        match rule.localization {
            LocalizationRule::MainRoom => {
                let main = self.level.main_region_id().ok_or_else(|| {
                    GenerationError::Precondition("level has no main region".to_string())
                })?;
                Ok(vec![main])
            }
            LocalizationRule::Any => {
                let mut ids: Vec<RegionId> = self.level.regions().iter().map(|r| r.id).collect();
                rng.shuffle(&mut ids);
                Ok(ids)
            }
        }
    }

    fn place_mandatory(&mut self, rng: &mut GameRng) -> GenResult<()> {
        for kind in self.table.mandatory_types() {
            let Some(rule) = self.table.rule(kind).copied() else {
                continue;
            };
            let candidates = self.candidate_regions(&rule, rng)?;

            let Some(content) = self.make(kind, rng)? else {
                debug!(%kind, "content set offers no mandatory content, skipping");
                continue;
            };

            let mut spot = None;
            for &id in &candidates {
                let Some(region) = self.level.region(id) else {
                    continue;
                };
                let cells = self.legal_cells(region, rule.placement, content.is_obstacle());
                if let Some(&cell) = rng.choose(&cells) {
                    spot = Some((id, cell));
                    break;
                }
            }

            let Some((region, cell)) = spot else {
                let region = self
                    .level
                    .main_region_id()
                    .or_else(|| candidates.first().copied())
                    .unwrap_or(RegionId(0));
                return Err(GenerationError::UnsatisfiablePlacement { kind, region });
            };
            debug!(%kind, %region, x = cell.0, y = cell.1, "mandatory content placed");
            self.place(content, region, cell);
        }
        Ok(())
    }

    /// Whether an optional type may still be drawn in a region
    fn drawable(&self, kind: ContentType, region: &Region, excluded: &HashSet<ContentType>) -> bool {
        if excluded.contains(&kind) {
            return false;
        }
        let Some(rule) = self.table.rule(kind) else {
            return false;
        };
        if !rule.creation.is_optional() {
            return false;
        }
        if let Some(cap) = rule.creation.cap() {
            if self.counts.get(&kind).copied().unwrap_or(0) >= cap {
                return false;
            }
        }
        match rule.localization {
            LocalizationRule::Any => true,
            LocalizationRule::MainRoom => self.level.main_region_id() == Some(region.id),
        }
    }

    fn distribution(
        &self,
        region: &Region,
        excluded: &HashSet<ContentType>,
    ) -> Option<WeightedDistribution<ContentType>> {
        self.table
            .distribution(|kind| self.drawable(kind, region, excluded))
    }

    fn fill_region(&mut self, region: &Region, rng: &mut GameRng) -> GenResult<()> {
        let density = self.table.density_for(region.kind).sample(rng);
        let free = self.free_cells(region);
        let budget = (density * free as f64).round() as usize;
        if budget == 0 {
            return Ok(());
        }

        let mut excluded: HashSet<ContentType> = HashSet::new();
        let mut distribution = self.distribution(region, &excluded);
        let mut spent = 0;
        let mut placed = 0;

        while spent < budget {
            let Some(dist) = distribution.as_ref() else {
                break;
            };
            let kind = *dist.next_value(rng);
            let Some(rule) = self.table.rule(kind).copied() else {
                break;
            };

            let made = self.make(kind, rng)?;
            let Some(content) = made else {
                excluded.insert(kind);
                distribution = self.distribution(region, &excluded);
                continue;
            };
            // Never spend past the budget
            if spent + content.footprint > budget {
                excluded.insert(kind);
                distribution = self.distribution(region, &excluded);
                continue;
            }
            let cells = self.legal_cells(region, rule.placement, content.is_obstacle());
            let Some(&cell) = rng.choose(&cells) else {
                excluded.insert(kind);
                distribution = self.distribution(region, &excluded);
                continue;
            };

            spent += content.footprint;
            placed += 1;
            self.place(content, region.id, cell);

            let count = {
                let count = self.counts.entry(kind).or_insert(0);
                *count += 1;
                *count
            };
            if rule.creation.cap().is_some_and(|cap| count >= cap) {
                distribution = self.distribution(region, &excluded);
            }
        }

        if spent < budget {
            debug!(
                region = %region.id,
                budget,
                spent,
                "density target not reached"
            );
        }
        debug!(region = %region.id, kind = ?region.kind, free, placed, "optional content placed");
        Ok(())
    }
}

/// Populate a level from a probability table.
///
/// Mandatory content is placed before any optional content, so optional
/// draws can never crowd out a required placement.
pub fn populate<S: ContentSet + ?Sized>(
    level: &Level,
    table: &ContentProbabilityTable,
    set: &mut S,
    rng: &mut GameRng,
) -> GenResult<Vec<Placement>> {
    let mut populator = Populator {
        level,
        table,
        set,
        occupied: HashSet::new(),
        counts: HashMap::new(),
        placements: Vec::new(),
    };

    populator.place_mandatory(rng)?;
    let mandatory = populator.placements.len();

    for region in level.regions() {
        populator.fill_region(region, rng)?;
    }

    let placements = populator.placements;
    let summary: Vec<String> = ContentType::iter()
        .map(|kind| (kind, placements.iter().filter(|p| p.content.kind == kind).count()))
        .filter(|(_, n)| *n > 0)
        .map(|(kind, n)| format!("{kind}={n}"))
        .collect();
    info!(
        mandatory,
        optional = placements.len() - mandatory,
        counts = %summary.join(" "),
        "level populated"
    );
    Ok(placements)
}
