//! Component trait and signature bitsets

use std::fmt;

use crate::ecs::registry::{ComponentKind, Components};
use crate::ecs::storage::ComponentStorage;

/// A plain attribute bag that can be attached to an entity
///
/// Implemented for every registered type by the registry macro; the
/// associated storage accessors give the world typed access without any
/// runtime type lookup.
pub trait Component: Sized + 'static {
    const KIND: ComponentKind;

    fn storage(components: &Components) -> &ComponentStorage<Self>;
    fn storage_mut(components: &mut Components) -> &mut ComponentStorage<Self>;
}

impl ComponentKind {
    #[inline]
    pub const fn bit(self) -> u64 {
        1u64 << (self as u32)
    }
}

/// Set of component kinds, used both as an entity's current shape and as a
/// system's required-component filter
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Signature(u64);

impl Signature {
    pub const EMPTY: Signature = Signature(0);

    pub fn of(kinds: &[ComponentKind]) -> Self {
        kinds.iter().fold(Self::EMPTY, |sig, kind| sig.with_kind(*kind))
    }

    #[inline]
    pub const fn with_kind(self, kind: ComponentKind) -> Self {
        Self(self.0 | kind.bit())
    }

    #[inline]
    pub const fn without_kind(self, kind: ComponentKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    /// Builder form: `Signature::EMPTY.with::<Position>().with::<Senses>()`
    #[inline]
    pub const fn with<T: Component>(self) -> Self {
        self.with_kind(T::KIND)
    }

    #[inline]
    pub const fn contains(self, kind: ComponentKind) -> bool {
        self.0 & kind.bit() != 0
    }

    /// True when every kind in `required` is also in `self`
    #[inline]
    pub const fn contains_all(self, required: Signature) -> bool {
        self.0 & required.0 == required.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    pub fn kinds(self) -> impl Iterator<Item = ComponentKind> {
        ComponentKind::ALL
            .iter()
            .copied()
            .filter(move |kind| self.contains(*kind))
    }
}

impl fmt::Debug for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.kinds()).finish()
    }
}
