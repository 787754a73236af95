//! The closed set of component kinds known to the store
//!
//! Adding a component means adding one line to the `component_registry!`
//! invocation below; the kind enum, the typed storage struct and the
//! `Component` impls are all generated from that list.

use crate::ai::facts::Facts;
use crate::ai::goap::agent::GoapAgent;
use crate::ai::utility::arbitrator::UtilityAgent;
use crate::core::types::EntityId;
use crate::ecs::component::Component;
use crate::ecs::storage::ComponentStorage;
use crate::entity::body::{
    Archetype, Body, EntityKind, Group, Health, Home, Movement, Position, StatusFlags, Tile,
};
use crate::entity::building::Spawner;
use crate::entity::combat::{AttackIntent, Corpse, Inventory, LootDrop, Lootable, Targetable, Weapon};
use crate::entity::sensing::{LootTarget, Patrol, Senses, TargetedBy, Targeting, Temperament};
use crate::entity::steering::{DesiredMovement, SteeringImpulses};

macro_rules! component_registry {
    ($($kind:ident => $field:ident : $ty:ty),* $(,)?) => {
        /// Every component kind the store knows about
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum ComponentKind {
            $($kind),*
        }

        impl ComponentKind {
            pub const ALL: &'static [ComponentKind] = &[$(ComponentKind::$kind),*];
        }

        // Signatures are u64 bitsets
        const _: () = assert!(ComponentKind::ALL.len() <= 64);

        /// Typed storage, one sparse map per component kind
        #[derive(Default)]
        pub struct Components {
            $($field: ComponentStorage<$ty>),*
        }

        impl Components {
            pub(crate) fn remove_kind(&mut self, entity: EntityId, kind: ComponentKind) -> bool {
                match kind {
                    $(ComponentKind::$kind => self.$field.remove(entity).is_some()),*
                }
            }

            pub(crate) fn len_of(&self, kind: ComponentKind) -> usize {
                match kind {
                    $(ComponentKind::$kind => self.$field.len()),*
                }
            }

            pub(crate) fn for_each_holder(&self, kind: ComponentKind, mut f: impl FnMut(EntityId)) {
                match kind {
                    $(ComponentKind::$kind => self.$field.ids().for_each(&mut f)),*
                }
            }
        }

        $(
            impl Component for $ty {
                const KIND: ComponentKind = ComponentKind::$kind;

                #[inline]
                fn storage(components: &Components) -> &ComponentStorage<Self> {
                    &components.$field
                }

                #[inline]
                fn storage_mut(components: &mut Components) -> &mut ComponentStorage<Self> {
                    &mut components.$field
                }
            }
        )*
    };
}

component_registry! {
    // body
    Position => positions: Position,
    Body => bodies: Body,
    Movement => movements: Movement,
    Health => healths: Health,
    Group => groups: Group,
    EntityKind => kinds: EntityKind,
    Archetype => archetypes: Archetype,
    Home => homes: Home,
    StatusFlags => status_flags: StatusFlags,
    Tile => tiles: Tile,
    // combat & loot
    Weapon => weapons: Weapon,
    AttackIntent => attack_intents: AttackIntent,
    Targetable => targetables: Targetable,
    Lootable => lootables: Lootable,
    Inventory => inventories: Inventory,
    LootDrop => loot_drops: LootDrop,
    Corpse => corpses: Corpse,
    Spawner => spawners: Spawner,
    // sensing & targeting
    Senses => senses: Senses,
    Targeting => targetings: Targeting,
    TargetedBy => targeted_by: TargetedBy,
    LootTarget => loot_targets: LootTarget,
    Patrol => patrols: Patrol,
    Temperament => temperaments: Temperament,
    // steering
    SteeringImpulses => impulses: SteeringImpulses,
    DesiredMovement => desired_movements: DesiredMovement,
    // decision making
    Facts => facts: Facts,
    GoapAgent => goap_agents: GoapAgent,
    UtilityAgent => utility_agents: UtilityAgent,
}
