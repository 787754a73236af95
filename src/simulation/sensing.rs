//! Proximity sensing: who and what each agent can currently perceive

use crate::ai::activities::is_hostile;
use crate::core::types::EntityId;
use crate::ecs::component::Signature;
use crate::ecs::system::System;
use crate::ecs::world::World;
use crate::entity::body::Position;
use crate::entity::combat::{Lootable, Targetable};
use crate::entity::sensing::Senses;
use crate::spatial::sparse_hash::SparseHashGrid;

/// Rebuilds every agent's in-range lists from a fresh spatial hash
pub struct SensingSystem {
    targetables: SparseHashGrid,
    lootables: SparseHashGrid,
}

impl SensingSystem {
    pub fn new(cell_size: f32) -> Self {
        Self {
            targetables: SparseHashGrid::new(cell_size),
            lootables: SparseHashGrid::new(cell_size),
        }
    }

    fn index(world: &World, signature: Signature, grid: &mut SparseHashGrid) {
        let entities = world.query(signature);
        grid.rebuild(
            entities
                .iter()
                .filter_map(|e| world.get::<Position>(*e).map(|p| (*e, p.0))),
        );
    }
}

impl System for SensingSystem {
    fn name(&self) -> &'static str {
        "sensing"
    }

    fn signature(&self) -> Signature {
        Signature::EMPTY.with::<Senses>().with::<Position>()
    }

    fn run(&mut self, world: &mut World, entities: &[EntityId], _dt: f32) {
        Self::index(world, Signature::EMPTY.with::<Targetable>().with::<Position>(), &mut self.targetables);
        Self::index(world, Signature::EMPTY.with::<Lootable>().with::<Position>(), &mut self.lootables);

        for entity in entities {
            let (Some(position), Some(radius)) = (
                world.get::<Position>(*entity).map(|p| p.0),
                world.get::<Senses>(*entity).map(|s| s.radius),
            ) else {
                continue;
            };

            let targets: Vec<EntityId> = self
                .targetables
                .query_radius(position, radius)
                .into_iter()
                .filter(|other| *other != *entity && is_hostile(world, *entity, *other))
                .collect();
            let loot = self.lootables.query_radius(position, radius);

            if let Some(senses) = world.get_mut::<Senses>(*entity) {
                senses.targetables_in_range = targets;
                senses.lootables_in_range = loot;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{GroupId, Vec2};
    use crate::entity::body::Group;

    fn spawn(world: &mut World, at: Vec2, group: u16) -> EntityId {
        let e = world.create_entity();
        world.insert(e, Position(at)).unwrap();
        world.insert(e, Group::new(GroupId(group), [])).unwrap();
        world.insert(e, Targetable).unwrap();
        e
    }

    #[test]
    fn test_senses_hostiles_and_loot_in_radius() {
        let mut world = World::new(1);
        let me = spawn(&mut world, Vec2::ZERO, 1);
        world.insert(me, Senses::new(500.0)).unwrap();
        let friend = spawn(&mut world, Vec2::new(10.0, 0.0), 1);
        let near = spawn(&mut world, Vec2::new(400.0, 0.0), 2);
        let far = spawn(&mut world, Vec2::new(600.0, 0.0), 2);

        let loot = world.create_entity();
        world.insert(loot, Position(Vec2::new(0.0, 100.0))).unwrap();
        world
            .insert(
                loot,
                Lootable {
                    value: 1,
                    loot_time: 1.0,
                },
            )
            .unwrap();

        let mut system = SensingSystem::new(100.0);
        let entities = world.query(system.signature());
        system.run(&mut world, &entities, 0.1);

        let senses = world.get::<Senses>(me).unwrap();
        assert_eq!(senses.targetables_in_range, vec![near]);
        assert!(!senses.targetables_in_range.contains(&friend));
        assert!(!senses.targetables_in_range.contains(&far));
        assert_eq!(senses.lootables_in_range, vec![loot]);
    }
}
