//! Content packs: the item list and the templates entities are built from
//!
//! Equipment and stock lists refer to items by index into `items`, so a pack
//! is self-contained and checked with a single bounds pass.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::entity::Item;
use crate::error::{GenResult, GenerationError};

/// Fixed-stat actor such as the protagonist or a merchant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Loadout {
    pub name: String,
    pub health: i32,
    #[serde(default)]
    pub damage: i32,
    /// Indices into the pack's items
    #[serde(default)]
    pub equipment: Vec<usize>,
}

/// Enemy archetype valid for a band of levels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    pub min_level: u32,
    pub max_level: u32,
    pub health: i32,
    pub damage: i32,
    /// Seconds between attacks
    #[serde(default = "default_cooldown")]
    pub cooldown: f64,
    #[serde(default)]
    pub equipment: Vec<usize>,
}

fn default_cooldown() -> f64 {
    1.0
}

impl EnemyTemplate {
    pub fn admits(&self, level: u32) -> bool {
        (self.min_level..=self.max_level).contains(&level)
    }

    /// Levels between `level` and the template's band, 0 when admitted
    pub fn distance(&self, level: u32) -> u32 {
        if level < self.min_level {
            self.min_level - level
        } else {
            level.saturating_sub(self.max_level)
        }
    }
}

/// Everything a content set needs to build entities
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentPack {
    pub items: Vec<Item>,
    pub protagonist: Loadout,
    pub companion: Loadout,
    pub merchant: Loadout,
    pub enemies: Vec<EnemyTemplate>,
    /// Hits a destructible takes before breaking
    #[serde(default = "default_durability")]
    pub destructible_durability: u32,
    /// Items a treasure cache may hold
    #[serde(default)]
    pub treasure: Vec<usize>,
}

fn default_durability() -> u32 {
    3
}

impl Default for ContentPack {
    fn default() -> Self {
        let items = vec![
            Item::new("short sword", 10),
            Item::new("leather armor", 5),
            Item::new("healing potion", 20),
            Item::new("torch", 2),
            Item::new("gold coins", 1),
            Item::new("gem", 50),
            Item::new("club", 3),
        ];
        Self {
            items,
            protagonist: Loadout {
                name: "adventurer".to_string(),
                health: 20,
                damage: 4,
                equipment: vec![0, 1, 3],
            },
            companion: Loadout {
                name: "little dog".to_string(),
                health: 12,
                damage: 2,
                equipment: Vec::new(),
            },
            merchant: Loadout {
                name: "shopkeeper".to_string(),
                health: 40,
                damage: 6,
                equipment: vec![2, 3, 1],
            },
            enemies: vec![
                EnemyTemplate {
                    name: "sewer rat".to_string(),
                    min_level: 1,
                    max_level: 3,
                    health: 4,
                    damage: 1,
                    cooldown: 0.8,
                    equipment: Vec::new(),
                },
                EnemyTemplate {
                    name: "goblin".to_string(),
                    min_level: 2,
                    max_level: 5,
                    health: 8,
                    damage: 2,
                    cooldown: 1.0,
                    equipment: vec![6],
                },
                EnemyTemplate {
                    name: "orc".to_string(),
                    min_level: 4,
                    max_level: 8,
                    health: 14,
                    damage: 4,
                    cooldown: 1.2,
                    equipment: vec![0],
                },
                EnemyTemplate {
                    name: "troll".to_string(),
                    min_level: 7,
                    max_level: 12,
                    health: 30,
                    damage: 7,
                    cooldown: 1.5,
                    equipment: Vec::new(),
                },
            ],
            destructible_durability: default_durability(),
            treasure: vec![2, 4, 5],
        }
    }
}

impl ContentPack {
    pub fn from_toml_str(text: &str) -> GenResult<Self> {
        let pack: ContentPack =
            toml::from_str(text).map_err(|e| GenerationError::Config(e.to_string()))?;
        pack.validate()?;
        Ok(pack)
    }

    pub fn load(path: impl AsRef<Path>) -> GenResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| GenerationError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Check every item reference and template band
    pub fn validate(&self) -> GenResult<()> {
        for loadout in [&self.protagonist, &self.companion, &self.merchant] {
            self.check_indices(&loadout.name, &loadout.equipment)?;
        }
        for enemy in &self.enemies {
            self.check_indices(&enemy.name, &enemy.equipment)?;
            if enemy.min_level > enemy.max_level {
                return Err(GenerationError::Precondition(format!(
                    "enemy {} has level band {}..{}",
                    enemy.name, enemy.min_level, enemy.max_level
                )));
            }
        }
        self.check_indices("treasure", &self.treasure)?;
        if self.enemies.is_empty() {
            return Err(GenerationError::Precondition(
                "content pack has no enemy templates".to_string(),
            ));
        }
        Ok(())
    }

    fn check_indices(&self, owner: &str, indices: &[usize]) -> GenResult<()> {
        match indices.iter().find(|&&i| i >= self.items.len()) {
            Some(bad) => Err(GenerationError::Precondition(format!(
                "{owner} references item {bad} but the pack has {} items",
                self.items.len()
            ))),
            None => Ok(()),
        }
    }

    /// Copies of the referenced items
    pub fn resolve(&self, indices: &[usize]) -> GenResult<Vec<Item>> {
        indices
            .iter()
            .map(|&i| {
                self.items.get(i).cloned().ok_or_else(|| {
                    GenerationError::Precondition(format!("no item at index {i}"))
                })
            })
            .collect()
    }

    /// Template for a scaled level: a random admitting template, or the
    /// closest one when none admits it
    pub fn enemy_for_level(&self, level: u32, roll: usize) -> Option<&EnemyTemplate> {
        let admitting: Vec<&EnemyTemplate> =
            self.enemies.iter().filter(|t| t.admits(level)).collect();
        if admitting.is_empty() {
            return self.enemies.iter().min_by_key(|t| t.distance(level));
        }
        Some(admitting[roll % admitting.len()])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pack_is_valid() {
        ContentPack::default().validate().unwrap();
    }

    #[test]
    fn test_dangling_equipment_is_precondition() {
        let mut pack = ContentPack::default();
        pack.protagonist.equipment.push(99);
        let err = pack.validate().unwrap_err();
        assert!(matches!(err, GenerationError::Precondition(ref msg) if msg.contains("item 99")));
    }

    #[test]
    fn test_inverted_band_rejected() {
        let mut pack = ContentPack::default();
        pack.enemies[0].min_level = 9;
        assert!(pack.validate().is_err());
    }

    #[test]
    fn test_resolve() {
        let pack = ContentPack::default();
        let items = pack.resolve(&[2, 0]).unwrap();
        assert_eq!(items[0].name, "healing potion");
        assert_eq!(items[1].name, "short sword");
        assert!(pack.resolve(&[100]).is_err());
    }

    #[test]
    fn test_enemy_for_level() {
        let pack = ContentPack::default();
        assert_eq!(pack.enemy_for_level(1, 0).unwrap().name, "sewer rat");
        // Levels 2..=3 admit both rat and goblin
        let names: Vec<_> = (0..2)
            .map(|roll| pack.enemy_for_level(3, roll).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["sewer rat", "goblin"]);
        // Beyond every band: closest template
        assert_eq!(pack.enemy_for_level(40, 0).unwrap().name, "troll");
    }

    #[test]
    fn test_pack_from_toml() {
        let text = r#"
            destructible_durability = 5
            treasure = [0]

            [[items]]
            name = "rope"

            [protagonist]
            name = "hero"
            health = 10
            equipment = [0]

            [companion]
            name = "cat"
            health = 6

            [merchant]
            name = "trader"
            health = 30

            [[enemies]]
            name = "slime"
            min_level = 1
            max_level = 4
            health = 3
            damage = 1
        "#;
        let pack = ContentPack::from_toml_str(text).unwrap();
        assert_eq!(pack.items[0].value, 0);
        assert_eq!(pack.enemies[0].cooldown, 1.0);
        assert_eq!(pack.destructible_durability, 5);

        let broken = text.replace("equipment = [0]", "equipment = [3]");
        assert!(matches!(
            ContentPack::from_toml_str(&broken),
            Err(GenerationError::Precondition(_))
        ));
        assert!(matches!(
            ContentPack::from_toml_str("items = 4"),
            Err(GenerationError::Config(_))
        ));
    }
}
