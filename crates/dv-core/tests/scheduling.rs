//! Aspect scheduling through the public API

use std::cell::RefCell;
use std::rc::Rc;

use dv_core::entity::aspects::{AttackAspect, MovementAspect, StateAspect};
use dv_core::entity::{Aspect, AspectKind, ComponentScheduler, Entity, EntityId};

type Trace = Rc<RefCell<Vec<String>>>;

/// Records `kind:entity` for every update
#[derive(Debug)]
struct Recorder {
    kind: AspectKind,
    trace: Trace,
}

impl Aspect for Recorder {
    fn kind(&self) -> AspectKind {
        self.kind
    }

    fn update(&mut self, entity: EntityId, _delta_time: f64) {
        self.trace
            .borrow_mut()
            .push(format!("{}:{}", self.kind, entity.0));
    }
}

fn recorded(id: u32, kinds: &[AspectKind], trace: &Trace) -> Entity {
    let mut entity = Entity::new(EntityId(id), "recorded", 1);
    for &kind in kinds {
        entity.attach(Box::new(Recorder {
            kind,
            trace: Rc::clone(trace),
        }));
    }
    entity
}

#[test]
fn test_register_twice() {
    let trace = Trace::default();
    let mut scheduler = ComponentScheduler::new();
    let first = scheduler.add_entity(recorded(1, &[AspectKind::State], &trace));
    let second = scheduler.add_entity(recorded(1, &[AspectKind::State], &trace));
    assert_eq!((first, second), (true, false));
}

#[test]
fn test_aspect_order_outer_entity_order_inner() {
    let trace = Trace::default();
    let mut scheduler = ComponentScheduler::new();
    scheduler.add_entity(recorded(1, &[AspectKind::Target, AspectKind::Aura], &trace));
    scheduler.add_entity(recorded(2, &[AspectKind::Aura, AspectKind::Target], &trace));
    scheduler.update(0.016);
    assert_eq!(
        *trace.borrow(),
        vec!["aura:1", "aura:2", "target:1", "target:2"]
    );
}

#[test]
fn test_remove_then_update_skips_entity() {
    let trace = Trace::default();
    let mut scheduler = ComponentScheduler::new();
    scheduler.add_entity(recorded(1, &[AspectKind::Speech], &trace));
    scheduler.add_entity(recorded(2, &[AspectKind::Speech], &trace));
    assert!(scheduler.remove_entity(EntityId(1)).is_some());
    assert!(scheduler.remove_entity(EntityId(1)).is_none());
    scheduler.update(0.016);
    assert_eq!(*trace.borrow(), vec!["speech:2"]);
}

#[test]
fn test_movement_resolves_before_attack_each_frame() {
    let mut scheduler = ComponentScheduler::new();
    let mut movement = MovementAspect::at(0.0, 0.0);
    movement.velocity = (3.0, 0.0);
    let hero = Entity::new(EntityId(10), "hero", 1)
        .with(StateAspect::new(10))
        .with(movement)
        .with(AttackAspect::new(2, 0.5));
    assert!(scheduler.add_entity(hero));

    for _ in 0..30 {
        scheduler.update(1.0 / 60.0);
    }
    let hero = scheduler.entity(EntityId(10)).unwrap();
    let position = hero.get::<MovementAspect>().unwrap().position;
    assert!((position.0 - 1.5).abs() < 1e-9);
    assert!(hero.get::<AttackAspect>().unwrap().is_ready());
    assert_eq!(scheduler.scheduled(AspectKind::Movement), &[EntityId(10)]);
}
