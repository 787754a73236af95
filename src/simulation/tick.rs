//! Tick orchestration
//!
//! One tick is: physics step -> positions written -> time advanced ->
//! scheduler run -> structural changes forwarded to physics.
//!
//! The scheduler runs, in order:
//! resets -> sensing -> target, attack intent and loot validation ->
//! target reselection/tracking ->
//! planner (facts, planning, execution) -> utility arbitration ->
//! patrol -> locomotion -> weapons -> death -> corpses -> spawners

use std::sync::Arc;

use tracing::{debug, info};

use crate::core::config::{SimulationConfig, SpawnConfig};
use crate::core::error::Result;
use crate::core::types::{EntityId, GroupId, Vec2};
use crate::ecs::component::Signature;
use crate::ecs::system::Scheduler;
use crate::ecs::world::World;
use crate::entity::archetype::{spawn_building, spawn_loot, spawn_mob, spawn_tile};
use crate::entity::body::{Body, EntityKind, Group, Position};
use crate::entity::steering::DesiredMovement;
use crate::physics::PhysicsBridge;
use crate::simulation::combat::{CorpseDecay, DeathSystem, SpawnerSystem, WeaponSystem};
use crate::simulation::decision::{GoapActionExecution, GoapFactUpdate, GoapPlanning, UtilityArbitration};
use crate::simulation::movement::{Locomotion, PatrolSystem};
use crate::simulation::reset::{ImpulseReset, StatusFlagReset, TargetedByReset};
use crate::simulation::sensing::SensingSystem;
use crate::simulation::snapshot::{capture, EntitySnapshot};
use crate::simulation::targeting::{
    AttackIntentValidation, LootTargetValidation, TargetReselection, TargetTracking, TargetValidation,
};

/// The canonical system pipeline
pub fn build_schedule(config: &Arc<SimulationConfig>) -> Scheduler {
    let mut scheduler = Scheduler::new();
    scheduler
        .add(ImpulseReset)
        .add(StatusFlagReset)
        .add(TargetedByReset)
        .add_timed(SensingSystem::new(config.grid_cell_size), config.sensing_interval)
        .add(TargetValidation)
        .add(AttackIntentValidation)
        .add(LootTargetValidation)
        .add_timed(TargetReselection, config.target_reselect_interval)
        .add(TargetTracking)
        .add(GoapFactUpdate)
        .add(GoapPlanning::new(config.planner_max_iterations))
        .add(GoapActionExecution)
        .add(UtilityArbitration)
        .add(PatrolSystem)
        .add(Locomotion)
        .add(WeaponSystem)
        .add(DeathSystem::new(config.corpse_lifetime))
        .add(CorpseDecay)
        .add(SpawnerSystem::new(Arc::clone(config)));
    scheduler
}

/// Counts of live entities by kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Population {
    pub mobs: usize,
    pub buildings: usize,
    pub loot: usize,
    pub corpses: usize,
}

/// Top-level owner of config, world, systems and the physics collaborator
pub struct Simulation<P: PhysicsBridge> {
    config: Arc<SimulationConfig>,
    world: World,
    scheduler: Scheduler,
    physics: P,
}

impl<P: PhysicsBridge> Simulation<P> {
    /// Build the world and populate it from the map config
    pub fn new(config: SimulationConfig, physics: P) -> Result<Self> {
        config.validate()?;
        let config = Arc::new(config);
        let scheduler = build_schedule(&config);
        let mut simulation = Self {
            world: World::new(config.seed),
            config,
            scheduler,
            physics,
        };
        simulation.populate()?;
        info!(
            entities = simulation.world.entity_count(),
            systems = simulation.scheduler.len(),
            "simulation ready"
        );
        Ok(simulation)
    }

    fn populate(&mut self) -> Result<()> {
        let map = self.config.map.clone();
        for row in 0..map.height {
            for column in 0..map.width {
                spawn_tile(&mut self.world, column, row, map.tile_size)?;
            }
        }

        for spawn in &map.spawns {
            match spawn {
                SpawnConfig::Mob {
                    archetype,
                    x,
                    y,
                    group,
                    allies,
                    count,
                } => {
                    for _ in 0..*count {
                        self.spawn_mob(archetype, Vec2::new(*x, *y), GroupId(*group), allies_of(allies))?;
                    }
                }
                SpawnConfig::Building {
                    archetype,
                    x,
                    y,
                    group,
                    allies,
                } => {
                    self.spawn_building(archetype, Vec2::new(*x, *y), GroupId(*group), allies_of(allies))?;
                }
                SpawnConfig::Loot { x, y, value, loot_time } => {
                    self.spawn_loot(Vec2::new(*x, *y), *value, *loot_time)?;
                }
            }
        }
        self.sync_physics();
        Ok(())
    }

    /// Advance the world by `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let movements: Vec<(EntityId, DesiredMovement)> = self
            .world
            .iter::<DesiredMovement>()
            .filter(|(_, movement)| !movement.direction.is_zero())
            .map(|(entity, movement)| (entity, *movement))
            .collect();

        for (entity, position) in self.physics.step(&movements, dt) {
            if let Some(current) = self.world.get_mut::<Position>(entity) {
                current.0 = position;
            }
        }

        self.world.advance_time(dt);
        self.scheduler.run(&mut self.world, dt);
        self.sync_physics();
    }

    /// Forward entity creation and destruction to the physics collaborator
    fn sync_physics(&mut self) {
        for entity in self.world.drain_spawned() {
            let Some(position) = self.world.get::<Position>(entity).map(|p| p.0) else {
                continue;
            };
            // Tiles are static scenery
            if self.world.get::<EntityKind>(entity) == Some(&EntityKind::Tile) {
                continue;
            }
            let radius = self.world.get::<Body>(entity).map_or(0.0, |b| b.radius);
            self.physics.create_body(entity, position, radius);
        }
        for entity in self.world.drain_despawned() {
            self.physics.destroy_body(entity);
        }
    }

    pub fn spawn_mob(&mut self, archetype: &str, position: Vec2, group: GroupId, allies: Vec<GroupId>) -> Result<EntityId> {
        let config = Arc::clone(&self.config);
        let mob = config.mob(archetype)?;
        let entity = spawn_mob(&mut self.world, archetype, mob, position, Group::new(group, allies))?;
        debug!(%entity, archetype, "mob spawned");
        self.sync_physics();
        Ok(entity)
    }

    pub fn spawn_building(
        &mut self,
        archetype: &str,
        position: Vec2,
        group: GroupId,
        allies: Vec<GroupId>,
    ) -> Result<EntityId> {
        let config = Arc::clone(&self.config);
        let building = config.building(archetype)?;
        let entity = spawn_building(&mut self.world, archetype, building, position, Group::new(group, allies))?;
        self.sync_physics();
        Ok(entity)
    }

    pub fn spawn_loot(&mut self, position: Vec2, value: u32, loot_time: f32) -> Result<EntityId> {
        let entity = spawn_loot(&mut self.world, position, value, loot_time)?;
        self.sync_physics();
        Ok(entity)
    }

    pub fn snapshot(&self) -> Vec<EntitySnapshot> {
        capture(&self.world)
    }

    pub fn population(&self) -> Population {
        let mut population = Population::default();
        for (_, kind) in self.world.iter::<EntityKind>() {
            match kind {
                EntityKind::Mob => population.mobs += 1,
                EntityKind::Building => population.buildings += 1,
                EntityKind::Loot => population.loot += 1,
                EntityKind::Corpse => population.corpses += 1,
                EntityKind::Tile => {}
            }
        }
        population
    }

    /// Live entities of one kind, sorted by id
    pub fn entities_of(&self, kind: EntityKind) -> Vec<EntityId> {
        self.world
            .query(Signature::EMPTY.with::<EntityKind>())
            .into_iter()
            .filter(|e| self.world.get::<EntityKind>(*e) == Some(&kind))
            .collect()
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    /// Direct world access for scripted scenarios and tests
    pub fn world_mut(&mut self) -> &mut World {
        &mut self.world
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    pub fn physics_mut(&mut self) -> &mut P {
        &mut self.physics
    }

    pub fn system_names(&self) -> Vec<&'static str> {
        self.scheduler.system_names()
    }
}

fn allies_of(allies: &[u16]) -> Vec<GroupId> {
    allies.iter().copied().map(GroupId).collect()
}
