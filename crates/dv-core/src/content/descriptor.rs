//! Placement descriptors produced by content sets

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::entity::Entity;
use crate::entity::aspects::VisualAspect;

use super::ContentType;

bitflags! {
    /// Dynamics of placed content
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ContentFlags: u8 {
        /// May move after placement
        const DYNAMIC = 0x01;
        /// Blocks traversal
        const OBSTACLE = 0x02;
    }
}

/// Abstract visual and audio hook for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentPoint {
    pub sprite: String,
    #[serde(default)]
    pub sound: Option<String>,
}

impl AttachmentPoint {
    pub fn new(sprite: impl Into<String>) -> Self {
        Self {
            sprite: sprite.into(),
            sound: None,
        }
    }

    pub fn with_sound(mut self, sound: impl Into<String>) -> Self {
        self.sound = Some(sound.into());
        self
    }
}

/// A concrete piece of content ready to be placed
#[derive(Debug)]
pub struct Content {
    pub kind: ContentType,
    pub flags: ContentFlags,
    /// Weight this content counts against a region's density budget.
    ///
    /// Content always stands on a single cell; a larger footprint only makes
    /// it more expensive, so fewer pieces fit in the same budget.
    pub footprint: usize,
    pub entity: Entity,
    pub attachment: Option<AttachmentPoint>,
}

impl Content {
    pub fn new(kind: ContentType, flags: ContentFlags, entity: Entity) -> Self {
        Self {
            kind,
            flags,
            footprint: 1,
            entity,
            attachment: None,
        }
    }

    pub fn with_footprint(mut self, footprint: usize) -> Self {
        self.footprint = footprint.max(1);
        self
    }

    pub fn is_dynamic(&self) -> bool {
        self.flags.contains(ContentFlags::DYNAMIC)
    }

    pub fn is_obstacle(&self) -> bool {
        self.flags.contains(ContentFlags::OBSTACLE)
    }

    /// Give the content its presentation hook and a visual aspect to drive it
    pub fn attach_appearance(&mut self, point: AttachmentPoint) {
        self.entity.attach(Box::new(VisualAspect::new(point.clone())));
        self.attachment = Some(point);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{AspectKind, EntityId};

    #[test]
    fn test_flags() {
        let entity = Entity::new(EntityId(0), "crate", 0);
        let content = Content::new(ContentType::Destructible, ContentFlags::OBSTACLE, entity);
        assert!(content.is_obstacle());
        assert!(!content.is_dynamic());
        assert_eq!(content.footprint, 1);
        assert_eq!(content.with_footprint(0).footprint, 1);
    }

    #[test]
    fn test_attach_appearance_adds_visual() {
        let entity = Entity::new(EntityId(1), "rat", 2);
        let mut content = Content::new(
            ContentType::Enemy,
            ContentFlags::DYNAMIC | ContentFlags::OBSTACLE,
            entity,
        );
        content.attach_appearance(AttachmentPoint::new("enemy/rat").with_sound("squeak"));
        assert!(content.entity.has_aspect(AspectKind::Visual));
        assert_eq!(
            content.attachment.as_ref().and_then(|a| a.sound.as_deref()),
            Some("squeak")
        );
    }
}
