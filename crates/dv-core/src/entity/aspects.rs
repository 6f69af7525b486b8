//! Built-in aspects attached by the content factory

use serde::{Deserialize, Serialize};

use crate::content::AttachmentPoint;

use super::EntityId;
use super::aspect::{Aspect, AspectKind};

// ============================================================================
// State
// ============================================================================

/// Health and liveness
#[derive(Debug, Clone, PartialEq)]
pub struct StateAspect {
    pub health: i32,
    pub max_health: i32,
    pub alive: bool,
    /// Health regained per second while alive
    pub regeneration: f64,
    regen_pool: f64,
}

impl StateAspect {
    pub fn new(max_health: i32) -> Self {
        Self {
            health: max_health,
            max_health,
            alive: max_health > 0,
            regeneration: 0.0,
            regen_pool: 0.0,
        }
    }

    pub fn with_regeneration(mut self, per_second: f64) -> Self {
        self.regeneration = per_second;
        self
    }

    /// Apply damage; returns true if this blow was fatal
    pub fn damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.health -= amount;
        if self.health <= 0 {
            self.health = 0;
            self.alive = false;
            return true;
        }
        false
    }
}

impl Aspect for StateAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::State
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        if !self.alive || self.regeneration <= 0.0 || self.health >= self.max_health {
            self.regen_pool = 0.0;
            return;
        }
        self.regen_pool += self.regeneration * delta_time;
        let whole = self.regen_pool.floor();
        if whole >= 1.0 {
            self.regen_pool -= whole;
            self.health = (self.health + whole as i32).min(self.max_health);
        }
    }
}

// ============================================================================
// Movement
// ============================================================================

/// Continuous position and velocity in cell units
#[derive(Debug, Clone, PartialEq)]
pub struct MovementAspect {
    pub position: (f64, f64),
    pub velocity: (f64, f64),
}

impl MovementAspect {
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            position: (x, y),
            velocity: (0.0, 0.0),
        }
    }

    /// Cell the entity currently stands on
    pub fn cell(&self) -> (i64, i64) {
        (self.position.0.floor() as i64, self.position.1.floor() as i64)
    }
}

impl Aspect for MovementAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Movement
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        self.position.0 += self.velocity.0 * delta_time;
        self.position.1 += self.velocity.1 * delta_time;
    }
}

// ============================================================================
// Conditions
// ============================================================================

/// Timed status effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub name: String,
    /// Seconds left
    pub remaining: f64,
}

/// Set of timed conditions that expire on their own
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionAspect {
    pub conditions: Vec<Condition>,
}

impl ConditionAspect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition or extend an active one
    pub fn apply(&mut self, name: &str, duration: f64) {
        match self.conditions.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.remaining = existing.remaining.max(duration),
            None => self.conditions.push(Condition {
                name: name.to_string(),
                remaining: duration,
            }),
        }
    }

    pub fn has(&self, name: &str) -> bool {
        self.conditions.iter().any(|c| c.name == name)
    }
}

impl Aspect for ConditionAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Condition
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        for condition in &mut self.conditions {
            condition.remaining -= delta_time;
        }
        self.conditions.retain(|c| c.remaining > 0.0);
    }
}

// ============================================================================
// Attack
// ============================================================================

/// Melee attack with a cooldown
#[derive(Debug, Clone, PartialEq)]
pub struct AttackAspect {
    pub damage: i32,
    /// Seconds between attacks
    pub cooldown: f64,
    remaining: f64,
}

impl AttackAspect {
    pub fn new(damage: i32, cooldown: f64) -> Self {
        Self {
            damage,
            cooldown,
            remaining: 0.0,
        }
    }

    pub fn is_ready(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Start the cooldown; returns the damage dealt, or `None` while cooling down
    pub fn trigger(&mut self) -> Option<i32> {
        if !self.is_ready() {
            return None;
        }
        self.remaining = self.cooldown;
        Some(self.damage)
    }
}

impl Aspect for AttackAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Attack
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        self.remaining = (self.remaining - delta_time).max(0.0);
    }
}

// ============================================================================
// Perception
// ============================================================================

/// Sight radius, refreshed on a fixed interval rather than every frame
#[derive(Debug, Clone, PartialEq)]
pub struct PerceptionAspect {
    pub sight_radius: u32,
    pub refresh_interval: f64,
    /// Number of refreshes performed so far
    pub refreshes: u32,
    elapsed: f64,
}

impl PerceptionAspect {
    pub fn new(sight_radius: u32, refresh_interval: f64) -> Self {
        Self {
            sight_radius,
            refresh_interval,
            refreshes: 0,
            elapsed: 0.0,
        }
    }
}

impl Aspect for PerceptionAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Perception
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        if self.refresh_interval <= 0.0 {
            self.refreshes += 1;
            return;
        }
        self.elapsed += delta_time;
        while self.elapsed >= self.refresh_interval {
            self.elapsed -= self.refresh_interval;
            self.refreshes += 1;
        }
    }
}

// ============================================================================
// Barrier
// ============================================================================

/// Breakable obstacle
#[derive(Debug, Clone, PartialEq)]
pub struct BarrierAspect {
    pub durability: u32,
    pub max_durability: u32,
}

impl BarrierAspect {
    pub fn new(durability: u32) -> Self {
        Self {
            durability,
            max_durability: durability,
        }
    }

    pub fn is_broken(&self) -> bool {
        self.durability == 0
    }

    /// Returns true if this hit broke the barrier
    pub fn strike(&mut self, amount: u32) -> bool {
        if self.is_broken() {
            return false;
        }
        self.durability = self.durability.saturating_sub(amount);
        self.is_broken()
    }
}

impl Aspect for BarrierAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Barrier
    }

    // Barriers only change when struck
    fn update(&mut self, _entity: EntityId, _delta_time: f64) {}
}

// ============================================================================
// Visual
// ============================================================================

/// Presentation hook: the attachment point plus an animation clock
#[derive(Debug, Clone, PartialEq)]
pub struct VisualAspect {
    pub attachment: AttachmentPoint,
    pub clock: f64,
}

impl VisualAspect {
    pub fn new(attachment: AttachmentPoint) -> Self {
        Self {
            attachment,
            clock: 0.0,
        }
    }

    /// Animation frame at the given playback rate
    pub fn frame(&self, frames_per_second: f64) -> u64 {
        if frames_per_second <= 0.0 {
            return 0;
        }
        (self.clock * frames_per_second).floor() as u64
    }
}

impl Aspect for VisualAspect {
    fn kind(&self) -> AspectKind {
        AspectKind::Visual
    }

    fn update(&mut self, _entity: EntityId, delta_time: f64) {
        self.clock += delta_time;
    }
}
