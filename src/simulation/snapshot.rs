//! Read-only per-entity views for rendering and export

use serde::Serialize;

use crate::core::types::{EntityId, Vec2};
use crate::ecs::component::Signature;
use crate::ecs::world::World;
use crate::entity::body::{Archetype, EntityKind, Group, Health, Position, StatusFlags};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySnapshot {
    pub id: EntityId,
    pub kind: EntityKind,
    pub archetype: Option<String>,
    pub position: Vec2,
    /// (current, max)
    pub health: Option<(f32, f32)>,
    pub group: Option<u16>,
    pub moving: bool,
    pub attacking: bool,
    pub damage_taken: bool,
}

/// Snapshot every entity with a kind and a position, sorted by id
pub fn capture(world: &World) -> Vec<EntitySnapshot> {
    world
        .query(Signature::EMPTY.with::<EntityKind>().with::<Position>())
        .into_iter()
        .filter_map(|id| {
            let kind = *world.get::<EntityKind>(id)?;
            let position = world.get::<Position>(id)?.0;
            let flags = world.get::<StatusFlags>(id).copied().unwrap_or_default();
            Some(EntitySnapshot {
                id,
                kind,
                archetype: world.get::<Archetype>(id).map(|a| a.0.clone()),
                position,
                health: world.get::<Health>(id).map(|h| (h.current, h.max)),
                group: world.get::<Group>(id).map(|g| g.primary.0),
                moving: flags.moving,
                attacking: flags.attacking,
                damage_taken: flags.damage_taken,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::archetype::spawn_loot;

    #[test]
    fn test_capture_serializes() {
        let mut world = World::new(1);
        let loot = spawn_loot(&mut world, Vec2::new(1.0, 2.0), 5, 1.0).unwrap();
        world.create_entity();

        let snapshots = capture(&world);
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].id, loot);
        assert_eq!(snapshots[0].kind, EntityKind::Loot);

        let json = serde_json::to_value(&snapshots).unwrap();
        assert_eq!(json[0]["kind"], "loot");
        assert_eq!(json[0]["health"], serde_json::Value::Null);
    }
}
