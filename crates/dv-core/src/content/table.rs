//! Content probability tables
//!
//! A table is the declarative ruleset for one level phase: which content
//! types exist, where they may go, how often optional types are drawn
//! relative to each other, and how much of a room's or corridor's floor
//! optional content may cover. Tables are validated once on construction
//! and never mutated; every region of a build shares the same `Arc`.

use std::sync::{Arc, OnceLock};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, IntoEnumIterator};

use crate::collections::WeightedDistribution;
use crate::dungeon::RegionKind;
use crate::error::{GenResult, GenerationError};
use crate::rng::GameRng;

use super::rule::{ContentRule, ContentType, CreationRule, LocalizationRule, PlacementRule};

/// Closed range of floor-coverage fractions, within [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DensityRange {
    pub min: f64,
    pub max: f64,
}

impl DensityRange {
    /// No optional content at all
    pub const ZERO: DensityRange = DensityRange { min: 0.0, max: 0.0 };

    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Uniform target fraction within the range
    pub fn sample(&self, rng: &mut GameRng) -> f64 {
        rng.range_f64(self.min, self.max)
    }

    fn validate(&self, name: &str) -> GenResult<()> {
        let in_unit = |v: f64| v.is_finite() && (0.0..=1.0).contains(&v);
        if !in_unit(self.min) || !in_unit(self.max) {
            return Err(GenerationError::InvalidTable {
                reason: format!("{name} {}..{} is outside [0, 1]", self.min, self.max),
            });
        }
        if self.max < self.min {
            return Err(GenerationError::InvalidTable {
                reason: format!("{name} upper bound {} is below {}", self.max, self.min),
            });
        }
        Ok(())
    }
}

/// Serialized form of a table, validated on conversion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableSpec {
    pub rules: HashMap<ContentType, ContentRule>,
    #[serde(default)]
    pub weights: HashMap<ContentType, f64>,
    pub room_density: DensityRange,
    pub corridor_density: DensityRange,
}

/// Immutable ruleset for one level phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TableSpec", into = "TableSpec")]
pub struct ContentProbabilityTable {
    rules: HashMap<ContentType, ContentRule>,
    weights: HashMap<ContentType, f64>,
    room_density: DensityRange,
    corridor_density: DensityRange,
}

impl ContentProbabilityTable {
    /// Build and validate a table
    pub fn new(
        rules: HashMap<ContentType, ContentRule>,
        weights: HashMap<ContentType, f64>,
        room_density: DensityRange,
        corridor_density: DensityRange,
    ) -> GenResult<Self> {
        let table = Self {
            rules,
            weights,
            room_density,
            corridor_density,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn builder() -> TableBuilder {
        TableBuilder::default()
    }

    /// Check density bounds and that every weight belongs to an optional rule
    pub fn validate(&self) -> GenResult<()> {
        self.room_density.validate("room density")?;
        self.corridor_density.validate("corridor density")?;

        for kind in ContentType::iter() {
            let Some(&weight) = self.weights.get(&kind) else {
                continue;
            };
            if !weight.is_finite() || weight <= 0.0 {
                return Err(GenerationError::InvalidTable {
                    reason: format!("weight for {kind} must be positive, got {weight}"),
                });
            }
            match self.rules.get(&kind) {
                None => {
                    return Err(GenerationError::InvalidTable {
                        reason: format!("weight given for {kind} but it has no rule"),
                    });
                }
                Some(rule) if !rule.creation.is_optional() => {
                    return Err(GenerationError::InvalidTable {
                        reason: format!("{kind} is placed exactly once and cannot be weighted"),
                    });
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    pub fn rule(&self, kind: ContentType) -> Option<&ContentRule> {
        self.rules.get(&kind)
    }

    pub fn weight(&self, kind: ContentType) -> Option<f64> {
        self.weights.get(&kind).copied()
    }

    pub fn room_density(&self) -> DensityRange {
        self.room_density
    }

    pub fn corridor_density(&self) -> DensityRange {
        self.corridor_density
    }

    /// Density range that applies to a region kind
    pub fn density_for(&self, kind: RegionKind) -> DensityRange {
        match kind {
            RegionKind::Room => self.room_density,
            RegionKind::Corridor => self.corridor_density,
        }
    }

    /// Types placed exactly once, in scheduling order
    pub fn mandatory_types(&self) -> Vec<ContentType> {
        ContentType::iter()
            .filter(|kind| {
                self.rules
                    .get(kind)
                    .is_some_and(|rule| rule.creation == CreationRule::ExactlyOnce)
            })
            .collect()
    }

    /// Distribution over weighted optional types that `allow` accepts.
    ///
    /// `None` when no type remains, which means nothing optional is placed.
    pub fn distribution<F>(&self, allow: F) -> Option<WeightedDistribution<ContentType>>
    where
        F: Fn(ContentType) -> bool,
    {
        let pairs: Vec<(ContentType, f64)> = ContentType::iter()
            .filter(|kind| allow(*kind))
            .filter_map(|kind| self.weights.get(&kind).map(|w| (kind, *w)))
            .collect();
        if pairs.is_empty() {
            return None;
        }
        // Weights were validated on construction
        WeightedDistribution::new(pairs).ok()
    }
}

impl TryFrom<TableSpec> for ContentProbabilityTable {
    type Error = GenerationError;

    fn try_from(spec: TableSpec) -> Result<Self, Self::Error> {
        Self::new(
            spec.rules,
            spec.weights,
            spec.room_density,
            spec.corridor_density,
        )
    }
}

impl From<ContentProbabilityTable> for TableSpec {
    fn from(table: ContentProbabilityTable) -> Self {
        Self {
            rules: table.rules,
            weights: table.weights,
            room_density: table.room_density,
            corridor_density: table.corridor_density,
        }
    }
}

/// Incremental construction of a [`ContentProbabilityTable`]
#[derive(Debug, Clone)]
pub struct TableBuilder {
    rules: HashMap<ContentType, ContentRule>,
    weights: HashMap<ContentType, f64>,
    room_density: DensityRange,
    corridor_density: DensityRange,
}

impl Default for TableBuilder {
    fn default() -> Self {
        Self {
            rules: HashMap::new(),
            weights: HashMap::new(),
            room_density: DensityRange::ZERO,
            corridor_density: DensityRange::ZERO,
        }
    }
}

impl TableBuilder {
    pub fn rule(mut self, kind: ContentType, rule: ContentRule) -> Self {
        self.rules.insert(kind, rule);
        self
    }

    /// Add an optional type with its relative weight
    pub fn weighted(mut self, kind: ContentType, rule: ContentRule, weight: f64) -> Self {
        self.rules.insert(kind, rule);
        self.weights.insert(kind, weight);
        self
    }

    pub fn room_density(mut self, min: f64, max: f64) -> Self {
        self.room_density = DensityRange::new(min, max);
        self
    }

    pub fn corridor_density(mut self, min: f64, max: f64) -> Self {
        self.corridor_density = DensityRange::new(min, max);
        self
    }

    pub fn build(self) -> GenResult<ContentProbabilityTable> {
        ContentProbabilityTable::new(
            self.rules,
            self.weights,
            self.room_density,
            self.corridor_density,
        )
    }
}

// ============================================================================
// Phases
// ============================================================================

/// Stage of a level's life with its own content rules
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "kebab-case")]
pub enum Phase {
    /// First time the level is entered
    FirstVisit,
    /// Any later visit
    Revisit,
}

/// Table per phase, shared by reference across a build
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(
    from = "HashMap<Phase, ContentProbabilityTable>",
    into = "HashMap<Phase, ContentProbabilityTable>"
)]
pub struct PhaseRules {
    tables: HashMap<Phase, Arc<ContentProbabilityTable>>,
}

impl Default for PhaseRules {
    fn default() -> Self {
        let tables = Phase::iter().map(|p| (p, builtin_table(p))).collect();
        Self { tables }
    }
}

impl PhaseRules {
    /// No tables at all
    pub fn empty() -> Self {
        Self {
            tables: HashMap::new(),
        }
    }

    pub fn insert(&mut self, phase: Phase, table: ContentProbabilityTable) {
        self.tables.insert(phase, Arc::new(table));
    }

    /// Shared table for a phase
    pub fn table(&self, phase: Phase) -> GenResult<Arc<ContentProbabilityTable>> {
        self.tables
            .get(&phase)
            .cloned()
            .ok_or_else(|| GenerationError::Precondition(format!("no content table for {phase}")))
    }
}

impl From<HashMap<Phase, ContentProbabilityTable>> for PhaseRules {
    fn from(map: HashMap<Phase, ContentProbabilityTable>) -> Self {
        Self {
            tables: map.into_iter().map(|(p, t)| (p, Arc::new(t))).collect(),
        }
    }
}

impl From<PhaseRules> for HashMap<Phase, ContentProbabilityTable> {
    fn from(rules: PhaseRules) -> Self {
        rules
            .tables
            .into_iter()
            .map(|(p, t)| (p, Arc::unwrap_or_clone(t)))
            .collect()
    }
}

/// Built-in table for a phase, constructed once and shared
pub fn builtin_table(phase: Phase) -> Arc<ContentProbabilityTable> {
    static FIRST_VISIT: OnceLock<Arc<ContentProbabilityTable>> = OnceLock::new();
    static REVISIT: OnceLock<Arc<ContentProbabilityTable>> = OnceLock::new();

    match phase {
        Phase::FirstVisit => FIRST_VISIT.get_or_init(|| Arc::new(first_visit_table())),
        Phase::Revisit => REVISIT.get_or_init(|| Arc::new(revisit_table())),
    }
    .clone()
}

fn first_visit_table() -> ContentProbabilityTable {
    use LocalizationRule::{Any as Anywhere, MainRoom};
    use PlacementRule::{Any as AnyCell, Edge};

    let rules = HashMap::from([
        (ContentType::Protagonist, ContentRule::exactly_once(MainRoom, AnyCell)),
        (ContentType::Companion, ContentRule::exactly_once(MainRoom, AnyCell)),
        (ContentType::Entrance, ContentRule::exactly_once(MainRoom, Edge)),
        (ContentType::Exit, ContentRule::exactly_once(Anywhere, Edge)),
        (
            ContentType::Merchant,
            ContentRule::new(CreationRule::AtMost(1), Anywhere, Edge),
        ),
        (ContentType::Enemy, ContentRule::any()),
        (ContentType::Destructible, ContentRule::any().with_placement(Edge)),
        (
            ContentType::Treasure,
            ContentRule::new(CreationRule::AtMost(4), Anywhere, AnyCell),
        ),
    ]);
    let weights = HashMap::from([
        (ContentType::Merchant, 0.2),
        (ContentType::Enemy, 3.0),
        (ContentType::Destructible, 2.0),
        (ContentType::Treasure, 0.5),
    ]);

    ContentProbabilityTable {
        rules,
        weights,
        room_density: DensityRange::new(0.05, 0.15),
        corridor_density: DensityRange::new(0.0, 0.075),
    }
}

fn revisit_table() -> ContentProbabilityTable {
    use LocalizationRule::{Any as Anywhere, MainRoom};
    use PlacementRule::{Any as AnyCell, Edge};

    let rules = HashMap::from([
        (ContentType::Protagonist, ContentRule::exactly_once(MainRoom, AnyCell)),
        (ContentType::Entrance, ContentRule::exactly_once(MainRoom, Edge)),
        (ContentType::Exit, ContentRule::exactly_once(Anywhere, Edge)),
        (ContentType::Enemy, ContentRule::any()),
        (ContentType::Destructible, ContentRule::any().with_placement(Edge)),
    ]);
    let weights = HashMap::from([
        (ContentType::Enemy, 1.5),
        (ContentType::Destructible, 1.0),
    ]);

    ContentProbabilityTable {
        rules,
        weights,
        room_density: DensityRange::new(0.02, 0.08),
        corridor_density: DensityRange::new(0.0, 0.05),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_tables_validate() {
        for phase in Phase::iter() {
            builtin_table(phase).validate().unwrap();
        }
    }

    #[test]
    fn test_builtin_table_is_shared() {
        let a = builtin_table(Phase::FirstVisit);
        let b = builtin_table(Phase::FirstVisit);
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_rejects_density_out_of_unit_range() {
        let result = ContentProbabilityTable::builder()
            .room_density(0.0, 1.5)
            .build();
        assert!(matches!(result, Err(GenerationError::InvalidTable { .. })));
    }

    #[test]
    fn test_rejects_inverted_density() {
        let result = ContentProbabilityTable::builder()
            .corridor_density(0.4, 0.1)
            .build();
        assert!(matches!(result, Err(GenerationError::InvalidTable { .. })));
    }

    #[test]
    fn test_rejects_bad_weights() {
        let zero = ContentProbabilityTable::builder()
            .weighted(ContentType::Enemy, ContentRule::any(), 0.0)
            .build();
        assert!(zero.is_err());

        let mandatory = ContentProbabilityTable::builder()
            .weighted(
                ContentType::Exit,
                ContentRule::exactly_once(LocalizationRule::Any, PlacementRule::Any),
                1.0,
            )
            .build();
        assert!(mandatory.is_err());

        let mut weights = HashMap::new();
        weights.insert(ContentType::Enemy, 1.0);
        let orphan = ContentProbabilityTable::new(
            HashMap::new(),
            weights,
            DensityRange::ZERO,
            DensityRange::ZERO,
        );
        assert!(orphan.is_err());
    }

    #[test]
    fn test_mandatory_types_in_order() {
        let table = builtin_table(Phase::FirstVisit);
        assert_eq!(
            table.mandatory_types(),
            vec![
                ContentType::Protagonist,
                ContentType::Companion,
                ContentType::Entrance,
                ContentType::Exit,
            ]
        );
    }

    #[test]
    fn test_distribution_filters_types() {
        let table = builtin_table(Phase::FirstVisit);
        let dist = table.distribution(|k| k != ContentType::Enemy).unwrap();
        assert!(dist.values().all(|k| *k != ContentType::Enemy));
        assert_eq!(dist.len(), 3);

        assert!(table.distribution(|_| false).is_none());
    }

    #[test]
    fn test_empty_weights_yield_no_distribution() {
        let table = ContentProbabilityTable::builder()
            .rule(ContentType::Enemy, ContentRule::any())
            .room_density(0.1, 0.5)
            .build()
            .unwrap();
        assert!(table.distribution(|_| true).is_none());
    }

    #[test]
    fn test_density_for_region_kind() {
        let table = ContentProbabilityTable::builder()
            .room_density(0.1, 0.2)
            .corridor_density(0.0, 0.075)
            .build()
            .unwrap();
        assert_eq!(table.density_for(RegionKind::Room), DensityRange::new(0.1, 0.2));
        assert_eq!(
            table.density_for(RegionKind::Corridor),
            DensityRange::new(0.0, 0.075)
        );
    }

    #[test]
    fn test_table_json_roundtrip_validates() {
        let json = r#"{
            "rules": {"enemy": {"creation": "any"}},
            "weights": {"enemy": -1.0},
            "room_density": {"min": 0.0, "max": 0.1},
            "corridor_density": {"min": 0.0, "max": 0.1}
        }"#;
        let result: Result<ContentProbabilityTable, _> = serde_json::from_str(json);
        assert!(result.is_err());

        let table = builtin_table(Phase::Revisit);
        let json = serde_json::to_string(table.as_ref()).unwrap();
        let restored: ContentProbabilityTable = serde_json::from_str(&json).unwrap();
        assert_eq!(&restored, table.as_ref());
    }

    #[test]
    fn test_missing_phase_is_precondition() {
        let rules = PhaseRules::empty();
        assert!(matches!(
            rules.table(Phase::Revisit),
            Err(GenerationError::Precondition(_))
        ));
        let defaults = PhaseRules::default();
        assert!(defaults.table(Phase::Revisit).is_ok());
    }
}
