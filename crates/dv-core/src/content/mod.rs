//! Content rules, tables, factories and placement
//!
//! A phase's [`ContentProbabilityTable`] says what may appear and how much
//! of it; a [`ContentSet`] builds the concrete entities; [`populate`] binds
//! them to cells of a carved level.

mod descriptor;
mod pack;
mod placement;
mod rule;
mod set;
mod table;

pub use descriptor::{AttachmentPoint, Content, ContentFlags};
pub use pack::{ContentPack, EnemyTemplate, Loadout};
pub use placement::{Placement, populate};
pub use rule::{ContentRule, ContentType, CreationRule, LocalizationRule, PlacementRule};
pub use set::{
    AppearanceSource, ContentContext, ContentSet, Protagonist, ScalingConfig, SpriteAtlas,
    StandardContentSet,
};
pub use table::{
    ContentProbabilityTable, DensityRange, Phase, PhaseRules, TableBuilder, TableSpec,
    builtin_table,
};
