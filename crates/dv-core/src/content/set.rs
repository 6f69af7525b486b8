//! Content sets: factories that turn a content type into a concrete entity
//!
//! The placement engine only sees the [`ContentSet`] trait. Presentation is
//! an optional capability: a set that can describe sprites and sound cues
//! exposes an [`AppearanceSource`], and only then does placed content get an
//! attachment point.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::entity::aspects::{
    AttackAspect, BarrierAspect, ConditionAspect, MovementAspect, PerceptionAspect, StateAspect,
};
use crate::entity::{Entity, EntityIdAllocator};
use crate::error::{GenResult, GenerationError};
use crate::rng::GameRng;

use super::descriptor::{AttachmentPoint, Content, ContentFlags};
use super::pack::{ContentPack, Loadout};
use super::ContentType;

/// Factory for placeable content
pub trait ContentSet {
    /// Build content of the given type.
    ///
    /// `Ok(None)` means the set does not offer this type right now, for
    /// example a companion that has not been unlocked. Errors are fatal to
    /// the level build.
    fn make_content(&mut self, kind: ContentType, rng: &mut GameRng)
    -> GenResult<Option<Content>>;

    /// Presentation capability, if this set has one
    fn appearance(&self) -> Option<&dyn AppearanceSource> {
        None
    }
}

/// Capability of describing how content looks and sounds
pub trait AppearanceSource {
    fn attachment_for(&self, kind: ContentType, name: &str) -> Option<AttachmentPoint>;
}

/// Attachment points keyed by content type, with per-name overrides
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SpriteAtlas {
    #[serde(default)]
    pub by_kind: HashMap<ContentType, AttachmentPoint>,
    #[serde(default)]
    pub by_name: HashMap<String, AttachmentPoint>,
}

impl SpriteAtlas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_kind(mut self, kind: ContentType, point: AttachmentPoint) -> Self {
        self.by_kind.insert(kind, point);
        self
    }

    pub fn with_name(mut self, name: impl Into<String>, point: AttachmentPoint) -> Self {
        self.by_name.insert(name.into(), point);
        self
    }
}

impl AppearanceSource for SpriteAtlas {
    fn attachment_for(&self, kind: ContentType, name: &str) -> Option<AttachmentPoint> {
        self.by_name
            .get(name)
            .or_else(|| self.by_kind.get(&kind))
            .cloned()
    }
}

/// The player character content is built around
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Protagonist {
    pub name: String,
    pub level: u32,
}

impl Protagonist {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Self {
            name: name.into(),
            level,
        }
    }
}

/// Difficulty scaling relative to the protagonist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScalingConfig {
    /// Lowest enemy level offset from the protagonist's level
    pub min_level_offset: i32,
    /// Highest enemy level offset, inclusive
    pub max_level_offset: i32,
    /// Extra enemy health per level above the template's band floor
    pub health_per_level: i32,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            min_level_offset: -1,
            max_level_offset: 2,
            health_per_level: 2,
        }
    }
}

impl ScalingConfig {
    /// Enemy level for a protagonist level, never below 1
    pub fn enemy_level(&self, protagonist_level: u32, rng: &mut GameRng) -> u32 {
        let offset = rng.range_i32(self.min_level_offset, self.max_level_offset);
        (protagonist_level as i64 + offset as i64).clamp(1, u32::MAX as i64) as u32
    }

    /// Template health raised for levels above the template's floor,
    /// saturating at `i32::MAX`
    pub fn enemy_health(&self, base: i32, levels_above: u32) -> i32 {
        let bonus = levels_above as i64 * self.health_per_level as i64;
        (base as i64 + bonus).clamp(i32::MIN as i64, i32::MAX as i64) as i32
    }
}

/// Ambient state the standard set reads when building content
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContentContext {
    pub protagonist: Option<Protagonist>,
    pub companion_unlocked: bool,
    pub scaling: ScalingConfig,
}

/// Content set backed by a [`ContentPack`]
#[derive(Debug, Clone)]
pub struct StandardContentSet {
    pack: ContentPack,
    context: ContentContext,
    ids: EntityIdAllocator,
    atlas: Option<SpriteAtlas>,
}

impl StandardContentSet {
    /// Create a set over a validated pack
    pub fn new(pack: ContentPack, context: ContentContext) -> GenResult<Self> {
        pack.validate()?;
        Ok(Self {
            pack,
            context,
            ids: EntityIdAllocator::new(),
            atlas: None,
        })
    }

    pub fn with_appearance(mut self, atlas: SpriteAtlas) -> Self {
        self.atlas = Some(atlas);
        self
    }

    pub fn context(&self) -> &ContentContext {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut ContentContext {
        &mut self.context
    }

    pub fn pack(&self) -> &ContentPack {
        &self.pack
    }

    fn protagonist(&self, kind: ContentType) -> GenResult<&Protagonist> {
        self.context.protagonist.as_ref().ok_or_else(|| {
            GenerationError::Precondition(format!("{kind} content requested with no protagonist set"))
        })
    }

    fn actor(&mut self, loadout: &Loadout, level: u32) -> GenResult<Entity> {
        let items = self.pack.resolve(&loadout.equipment)?;
        Ok(Entity::new(self.ids.next_id(), loadout.name.clone(), level)
            .with_items(items)
            .with(StateAspect::new(loadout.health))
            .with(MovementAspect::at(0.0, 0.0)))
    }

    fn make_protagonist(&mut self) -> GenResult<Content> {
        let protagonist = self.protagonist(ContentType::Protagonist)?.clone();
        let loadout = self.pack.protagonist.clone();
        let mut entity = self
            .actor(&loadout, protagonist.level)?
            .with(StateAspect::new(loadout.health).with_regeneration(0.1))
            .with(AttackAspect::new(loadout.damage, 0.5))
            .with(ConditionAspect::new())
            .with(PerceptionAspect::new(8, 0.25));
        entity.name = protagonist.name;
        Ok(Content::new(
            ContentType::Protagonist,
            ContentFlags::DYNAMIC,
            entity,
        ))
    }

    fn make_companion(&mut self) -> GenResult<Option<Content>> {
        let level = self.protagonist(ContentType::Companion)?.level;
        if !self.context.companion_unlocked {
            return Ok(None);
        }
        let loadout = self.pack.companion.clone();
        let entity = self
            .actor(&loadout, level)?
            .with(AttackAspect::new(loadout.damage, 0.8))
            .with(PerceptionAspect::new(6, 0.5));
        Ok(Some(Content::new(
            ContentType::Companion,
            ContentFlags::DYNAMIC,
            entity,
        )))
    }

    fn make_enemy(&mut self, rng: &mut GameRng) -> GenResult<Content> {
        let base = self.protagonist(ContentType::Enemy)?.level;
        let level = self.context.scaling.enemy_level(base, rng);
        let roll = rng.rn2(u32::MAX) as usize;
        let template = self
            .pack
            .enemy_for_level(level, roll)
            .cloned()
            .ok_or_else(|| GenerationError::Precondition("no enemy templates".to_string()))?;

        let health = self
            .context
            .scaling
            .enemy_health(template.health, level.saturating_sub(template.min_level));
        let items = self.pack.resolve(&template.equipment)?;
        let entity = Entity::new(self.ids.next_id(), template.name.clone(), level)
            .with_items(items)
            .with(StateAspect::new(health))
            .with(MovementAspect::at(0.0, 0.0))
            .with(ConditionAspect::new())
            .with(AttackAspect::new(template.damage, template.cooldown))
            .with(PerceptionAspect::new(5, 0.5));
        debug!(name = %template.name, level, health, "enemy built");
        Ok(Content::new(
            ContentType::Enemy,
            ContentFlags::DYNAMIC | ContentFlags::OBSTACLE,
            entity,
        ))
    }

    fn make_merchant(&mut self) -> GenResult<Content> {
        let loadout = self.pack.merchant.clone();
        let items = self.pack.resolve(&loadout.equipment)?;
        let entity = Entity::new(self.ids.next_id(), loadout.name.clone(), 1)
            .with_items(items)
            .with(StateAspect::new(loadout.health))
            .with(PerceptionAspect::new(4, 1.0));
        Ok(Content::new(
            ContentType::Merchant,
            ContentFlags::OBSTACLE,
            entity,
        ))
    }

    fn make_destructible(&mut self) -> Content {
        let durability = self.pack.destructible_durability;
        let entity = Entity::new(self.ids.next_id(), "barrel", 0)
            .with(StateAspect::new(durability as i32))
            .with(BarrierAspect::new(durability));
        Content::new(ContentType::Destructible, ContentFlags::OBSTACLE, entity)
    }

    fn make_treasure(&mut self, rng: &mut GameRng) -> GenResult<Content> {
        let mut items = Vec::new();
        if let Some(&index) = rng.choose(&self.pack.treasure) {
            items = self.pack.resolve(&[index])?;
        }
        let entity = Entity::new(self.ids.next_id(), "cache", 0).with_items(items);
        Ok(Content::new(
            ContentType::Treasure,
            ContentFlags::empty(),
            entity,
        ))
    }

    fn make_marker(&mut self, kind: ContentType) -> Content {
        let name = match kind {
            ContentType::Entrance => "staircase up",
            _ => "staircase down",
        };
        Content::new(kind, ContentFlags::empty(), Entity::new(self.ids.next_id(), name, 0))
    }
}

impl ContentSet for StandardContentSet {
    fn make_content(
        &mut self,
        kind: ContentType,
        rng: &mut GameRng,
    ) -> GenResult<Option<Content>> {
        let content = match kind {
            ContentType::Protagonist => self.make_protagonist()?,
            ContentType::Companion => return self.make_companion(),
            ContentType::Enemy => self.make_enemy(rng)?,
            ContentType::Merchant => self.make_merchant()?,
            ContentType::Destructible => self.make_destructible(),
            ContentType::Treasure => self.make_treasure(rng)?,
            ContentType::Entrance | ContentType::Exit => self.make_marker(kind),
        };
        Ok(Some(content))
    }

    fn appearance(&self) -> Option<&dyn AppearanceSource> {
        self.atlas.as_ref().map(|atlas| atlas as &dyn AppearanceSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::AspectKind;

    fn set_with(protagonist: Option<Protagonist>, companion: bool) -> StandardContentSet {
        let context = ContentContext {
            protagonist,
            companion_unlocked: companion,
            scaling: ScalingConfig::default(),
        };
        StandardContentSet::new(ContentPack::default(), context).unwrap()
    }

    #[test]
    fn test_protagonist_required() {
        let mut set = set_with(None, true);
        let mut rng = GameRng::new(1);
        for kind in [ContentType::Protagonist, ContentType::Companion, ContentType::Enemy] {
            assert!(matches!(
                set.make_content(kind, &mut rng),
                Err(GenerationError::Precondition(_))
            ));
        }
        // Context-free content needs no protagonist
        assert!(set.make_content(ContentType::Destructible, &mut rng).unwrap().is_some());
    }

    #[test]
    fn test_locked_companion_is_none() {
        let mut rng = GameRng::new(2);
        let mut locked = set_with(Some(Protagonist::new("Ayla", 3)), false);
        assert!(locked.make_content(ContentType::Companion, &mut rng).unwrap().is_none());

        let mut unlocked = set_with(Some(Protagonist::new("Ayla", 3)), true);
        let companion = unlocked
            .make_content(ContentType::Companion, &mut rng)
            .unwrap()
            .unwrap();
        assert!(companion.is_dynamic());
        assert_eq!(companion.entity.level, 3);
    }

    #[test]
    fn test_protagonist_content() {
        let mut set = set_with(Some(Protagonist::new("Ayla", 4)), false);
        let mut rng = GameRng::new(3);
        let content = set
            .make_content(ContentType::Protagonist, &mut rng)
            .unwrap()
            .unwrap();
        assert_eq!(content.entity.name, "Ayla");
        assert_eq!(content.entity.level, 4);
        assert_eq!(content.entity.items.len(), 3);
        assert!(content.entity.has_aspect(AspectKind::Attack));
        assert!(content.is_dynamic() && !content.is_obstacle());
        assert!(content.attachment.is_none());
    }

    #[test]
    fn test_enemy_level_scaling() {
        let mut set = set_with(Some(Protagonist::new("Ayla", 1)), false);
        let mut rng = GameRng::new(4);
        for _ in 0..100 {
            let enemy = set
                .make_content(ContentType::Enemy, &mut rng)
                .unwrap()
                .unwrap();
            // -1..=2 around level 1, clamped to at least 1
            assert!((1..=3).contains(&enemy.entity.level));
            assert!(enemy.is_obstacle());
        }
    }

    #[test]
    fn test_scaling_clamps_to_one() {
        let scaling = ScalingConfig {
            min_level_offset: -10,
            max_level_offset: -5,
            health_per_level: 0,
        };
        let mut rng = GameRng::new(5);
        assert_eq!(scaling.enemy_level(3, &mut rng), 1);
    }

    #[test]
    fn test_extreme_protagonist_level() {
        let mut set = set_with(Some(Protagonist::new("Ayla", u32::MAX)), false);
        let mut rng = GameRng::new(7);
        for _ in 0..20 {
            let enemy = set
                .make_content(ContentType::Enemy, &mut rng)
                .unwrap()
                .unwrap();
            assert!(enemy.entity.level >= u32::MAX - 1);
            let state = enemy.entity.get::<StateAspect>().unwrap();
            assert_eq!(state.health, i32::MAX);
        }

        let scaling = ScalingConfig::default();
        assert_eq!(scaling.enemy_health(30, 3_000_000_000), i32::MAX);
        assert_eq!(scaling.enemy_health(30, 5), 40);
    }

    #[test]
    fn test_entity_ids_are_unique() {
        let mut set = set_with(Some(Protagonist::new("Ayla", 2)), true);
        let mut rng = GameRng::new(6);
        let mut ids = Vec::new();
        for kind in [
            ContentType::Protagonist,
            ContentType::Companion,
            ContentType::Entrance,
            ContentType::Exit,
            ContentType::Enemy,
            ContentType::Treasure,
            ContentType::Merchant,
        ] {
            ids.push(set.make_content(kind, &mut rng).unwrap().unwrap().entity.id);
        }
        let mut deduped = ids.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), ids.len());
    }

    #[test]
    fn test_appearance_capability() {
        let plain = set_with(None, false);
        assert!(plain.appearance().is_none());

        let atlas = SpriteAtlas::new()
            .with_kind(ContentType::Enemy, AttachmentPoint::new("enemy/generic"))
            .with_name("goblin", AttachmentPoint::new("enemy/goblin"));
        let dressed = set_with(None, false).with_appearance(atlas);
        let source = dressed.appearance().unwrap();
        assert_eq!(
            source.attachment_for(ContentType::Enemy, "goblin").map(|p| p.sprite),
            Some("enemy/goblin".to_string())
        );
        assert_eq!(
            source.attachment_for(ContentType::Enemy, "orc").map(|p| p.sprite),
            Some("enemy/generic".to_string())
        );
        assert!(source.attachment_for(ContentType::Exit, "stairs").is_none());
    }

    #[test]
    fn test_invalid_pack_rejected() {
        let mut pack = ContentPack::default();
        pack.treasure.push(500);
        assert!(StandardContentSet::new(pack, ContentContext::default()).is_err());
    }
}
