//! Systems and the ordered scheduler that drives them

use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::world::World;

/// Per-tick logic over every entity matching a required-component signature
///
/// Systems may keep private state across ticks (timers, scratch buffers) but
/// must not keep component references between calls.
pub trait System {
    fn name(&self) -> &'static str;

    /// Components an entity must hold to be passed to `run`
    fn signature(&self) -> Signature;

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32);

    /// Decide whether the system runs this tick and with which time step
    ///
    /// Plain systems run every tick with the frame's `dt`.
    fn poll(&mut self, dt: f32) -> Option<f32> {
        Some(dt)
    }
}

/// Runs the wrapped system only once the accumulated time reaches `interval`
///
/// The inner system receives the whole accumulated time as its step. An
/// interval of zero runs every tick.
pub struct TimedSystem<S> {
    inner: S,
    interval: f32,
    accumulated: f32,
}

impl<S: System> TimedSystem<S> {
    pub fn new(inner: S, interval: f32) -> Self {
        Self {
            inner,
            interval,
            accumulated: 0.0,
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<S: System> System for TimedSystem<S> {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn signature(&self) -> Signature {
        self.inner.signature()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], dt: f32) {
        self.inner.run(world, entities, dt);
    }

    fn poll(&mut self, dt: f32) -> Option<f32> {
        self.accumulated += dt;
        if self.accumulated >= self.interval {
            Some(std::mem::take(&mut self.accumulated))
        } else {
            None
        }
    }
}

/// Ordered list of systems, invoked once per tick in registration order
#[derive(Default)]
pub struct Scheduler {
    systems: Vec<Box<dyn System>>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<S: System + 'static>(&mut self, system: S) -> &mut Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn add_timed<S: System + 'static>(&mut self, system: S, interval: f32) -> &mut Self {
        self.add(TimedSystem::new(system, interval))
    }

    /// Run every system once
    ///
    /// Each system's entity set is queried right before it runs, so
    /// structural changes made by earlier systems are already reflected.
    pub fn run(&mut self, world: &mut World, dt: f32) {
        for system in &mut self.systems {
            let Some(step) = system.poll(dt) else {
                continue;
            };
            let signature = system.signature();
            let entities = world.query(signature);
            debug_assert!(
                entities
                    .iter()
                    .all(|e| world.signature_of(*e).is_some_and(|s| s.contains_all(signature))),
                "{} received an entity without its signature",
                system.name()
            );
            tracing::trace!(system = system.name(), entities = entities.len(), "running system");
            system.run(world, &entities, step);
        }
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.systems.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.systems.len()
    }

    pub fn is_empty(&self) -> bool {
        self.systems.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::Vec2;
    use crate::entity::body::{Health, Position};
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Records (name, entity count, dt) of every invocation
    struct Recorder {
        name: &'static str,
        signature: Signature,
        log: Rc<RefCell<Vec<(&'static str, usize, f32)>>>,
    }

    impl System for Recorder {
        fn name(&self) -> &'static str {
            self.name
        }

        fn signature(&self) -> Signature {
            self.signature
        }

        fn run(&mut self, _world: &mut World, entities: &[EntityId], dt: f32) {
            self.log.borrow_mut().push((self.name, entities.len(), dt));
        }
    }

    /// Gives every Position holder a Health component
    struct Healer;

    impl System for Healer {
        fn name(&self) -> &'static str {
            "healer"
        }

        fn signature(&self) -> Signature {
            Signature::EMPTY.with::<Position>()
        }

        fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
            for &e in entities {
                world.insert(e, Health::new(5.0)).unwrap();
            }
        }
    }

    #[test]
    fn test_registration_order_and_fresh_membership() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(1);
        let e = world.create_entity();
        world.insert(e, Position(Vec2::ZERO)).unwrap();

        let mut scheduler = Scheduler::new();
        scheduler
            .add(Recorder {
                name: "before",
                signature: Signature::EMPTY.with::<Health>(),
                log: log.clone(),
            })
            .add(Healer)
            .add(Recorder {
                name: "after",
                signature: Signature::EMPTY.with::<Health>(),
                log: log.clone(),
            });

        assert_eq!(scheduler.system_names(), vec!["before", "healer", "after"]);
        scheduler.run(&mut world, 0.1);

        let log = log.borrow();
        assert_eq!(log[0], ("before", 0, 0.1));
        assert_eq!(log[1], ("after", 1, 0.1));
    }

    #[test]
    fn test_timed_system_accumulates() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(1);
        let mut scheduler = Scheduler::new();
        scheduler.add_timed(
            Recorder {
                name: "timed",
                signature: Signature::EMPTY,
                log: log.clone(),
            },
            0.5,
        );

        for _ in 0..4 {
            scheduler.run(&mut world, 0.25);
        }

        let log = log.borrow();
        assert_eq!(log.len(), 2);
        assert!((log[0].2 - 0.5).abs() < 1e-6);
        assert!((log[1].2 - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_timed_system_zero_interval_runs_every_tick() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut world = World::new(1);
        let mut scheduler = Scheduler::new();
        scheduler.add_timed(
            Recorder {
                name: "every",
                signature: Signature::EMPTY,
                log: log.clone(),
            },
            0.0,
        );
        scheduler.run(&mut world, 0.016);
        scheduler.run(&mut world, 0.016);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn test_timed_system_fires_on_reaching_interval() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut timed = TimedSystem::new(
            Recorder {
                name: "boundary",
                signature: Signature::EMPTY,
                log: log.clone(),
            },
            0.5,
        );
        assert_eq!(timed.inner().name, "boundary");

        assert_eq!(timed.poll(0.25), None);
        // Exactly at the interval, not only past it
        assert_eq!(timed.poll(0.25), Some(0.5));
        assert_eq!(timed.poll(0.125), None);
        assert_eq!(timed.poll(0.125), None);
        assert_eq!(timed.poll(0.375), Some(0.625));
        assert!(log.borrow().is_empty());
    }
}
