//! Systems, world and event queue working together

use super::*;
use crate::config::HexConfig;
use crate::error::BoxError;
use crate::events::{Event, EventQueue};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Position {
    x: f64,
    y: f64,
}

impl Component for Position {
    const KIND: Kind = "Position";
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Velocity {
    dx: f64,
    dy: f64,
}

impl Component for Velocity {
    const KIND: Kind = "Velocity";
}

#[derive(Debug)]
struct Expired;

impl Component for Expired {
    const KIND: Kind = "Expired";
}

struct Despawned(Entity);

impl Event for Despawned {
    const KIND: Kind = "Despawned";
}

/// Integrates velocity into position
struct Movement;

impl System for Movement {
    const KIND: Kind = "Movement";

    fn run(&mut self, ctx: &mut Context<'_>, delta: f64) -> Result<(), BoxError> {
        let moving = ctx.world.with_all(&[Position::KIND, Velocity::KIND]);
        for entity in moving {
            let velocity = *ctx.world.get::<Velocity>(entity)?;
            let position = ctx.world.get_mut::<Position>(entity)?;
            position.x += velocity.dx * delta;
            position.y += velocity.dy * delta;
        }
        Ok(())
    }
}

/// Deletes expired entities and announces them; must see positions after
/// movement
struct Reaper;

impl System for Reaper {
    const KIND: Kind = "Reaper";

    fn run(&mut self, ctx: &mut Context<'_>, _delta: f64) -> Result<(), BoxError> {
        for entity in ctx.world.with(Expired::KIND).to_vec() {
            ctx.world.delete(entity)?;
            ctx.events.emit(Despawned(entity));
        }
        Ok(())
    }

    fn dependencies(&self) -> Vec<Kind> {
        vec![Movement::KIND]
    }
}

struct Harness {
    config: HexConfig,
    world: World,
    events: EventQueue,
    systems: Scheduler,
}

impl Harness {
    fn new() -> Self {
        Self {
            config: HexConfig::new(),
            world: World::new(),
            events: EventQueue::new(),
            systems: Scheduler::new(),
        }
    }

    fn tick(&mut self, tick: u64, delta: f64) {
        let mut ctx = Context::new(&self.config, &mut self.world, &mut self.events, tick);
        self.systems.run(&mut ctx, delta, None).unwrap();
        self.events.process_events().unwrap();
    }
}

#[test]
fn test_systems_move_and_reap() {
    let mut harness = Harness::new();
    harness.systems.add(Movement).unwrap();
    harness.systems.add(Reaper).unwrap();
    assert_eq!(harness.systems.kinds().unwrap(), vec!["Movement", "Reaper"]);

    let despawned = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&despawned);
    harness.events.on(move |event: &Despawned| {
        sink.borrow_mut().push(event.0);
        Ok(())
    });

    let world = &mut harness.world;
    let ship = world.create();
    world.add(ship, Position { x: 0.0, y: 0.0 }).unwrap();
    world.add(ship, Velocity { dx: 2.0, dy: -1.0 }).unwrap();
    let debris = world.create();
    world.add(debris, Position { x: 5.0, y: 5.0 }).unwrap();
    world.add(debris, Expired).unwrap();

    harness.tick(0, 0.5);

    assert_eq!(
        *harness.world.get::<Position>(ship).unwrap(),
        Position { x: 1.0, y: -0.5 }
    );
    assert!(!harness.world.is_alive(debris));
    assert_eq!(*despawned.borrow(), vec![debris]);
    assert_eq!(harness.world.with(Position::KIND), &[ship]);

    // the freed id is handed out again
    assert_eq!(harness.world.create(), debris);
}

#[test]
fn test_registration_order_does_not_override_dependencies() {
    let mut scheduler = Scheduler::new();
    scheduler.add(Movement).unwrap();
    scheduler.add(Reaper).unwrap();
    let order = scheduler.kinds().unwrap();
    let movement = order.iter().position(|&kind| kind == Movement::KIND);
    let reaper = order.iter().position(|&kind| kind == Reaper::KIND);
    assert!(movement < reaper);
}

#[test]
fn test_query_after_churn() {
    let mut world = World::new();
    let entities: Vec<Entity> = (0..6).map(|_| world.create()).collect();
    for (i, &entity) in entities.iter().enumerate() {
        world.add(entity, Position { x: i as f64, y: 0.0 }).unwrap();
        if i % 2 == 0 {
            world.add(entity, Velocity { dx: 1.0, dy: 0.0 }).unwrap();
        }
    }

    world.delete(entities[2]).unwrap();
    world.remove(entities[4], Velocity::KIND).unwrap();

    let moving = world.with_all(&[Velocity::KIND, Position::KIND]);
    assert_eq!(moving, vec![entities[0]]);

    let positions = world.get_with::<Position>().unwrap();
    assert_eq!(positions.len(), 5);
    assert!(positions.iter().all(|(entity, _)| *entity != entities[2]));
}
