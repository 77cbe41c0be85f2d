//! # Archetype Bookkeeping
//!
//! Every entity carries an [`Archetype`]: a 64-bit mask of attached
//! component IDs plus the pool handle of each attached component.
//!
//! ```text
//! mask:    0b0000_1011          components 0, 1 and 3 attached
//! handles: [ h0 | h1 | h3 ]     one per set bit, ordered by bit
//! ```
//!
//! A component's handle sits at the popcount of the mask bits below it, so
//! the record stays as small as the number of attached components.

use super::component::{Component, ComponentBit, ComponentId};
use crate::memory::Handle;

/// Set of component IDs, one bit each.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct ArchetypeSignature(u64);

impl ArchetypeSignature {
    /// The signature with no components.
    pub const EMPTY: Self = Self(0);

    /// Wraps a raw bitmask.
    #[inline]
    #[must_use]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Signature holding only `C`.
    #[inline]
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self::EMPTY.with::<C>()
    }

    /// This signature plus `C`.
    #[inline]
    #[must_use]
    pub fn with<C: Component>(self) -> Self {
        self.with_id(ComponentBit::<C>::BIT)
    }

    /// This signature plus the component with ID `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is 64 or more.
    #[inline]
    #[must_use]
    pub const fn with_id(self, id: ComponentId) -> Self {
        assert!(id < 64, "component id out of range");
        Self(self.0 | (1 << id))
    }

    /// This signature without the component with ID `id`.
    #[inline]
    #[must_use]
    pub const fn without_id(self, id: ComponentId) -> Self {
        assert!(id < 64, "component id out of range");
        Self(self.0 & !(1 << id))
    }

    /// Raw bitmask.
    #[inline]
    #[must_use]
    pub const fn bits(self) -> u64 {
        self.0
    }

    /// True if component `id` is in the signature.
    #[inline]
    #[must_use]
    pub const fn has_id(self, id: ComponentId) -> bool {
        id < 64 && (self.0 & (1 << id)) != 0
    }

    /// True if `C` is in the signature.
    #[inline]
    #[must_use]
    pub fn has<C: Component>(self) -> bool {
        self.has_id(ComponentBit::<C>::BIT)
    }

    /// True if every component in `other` is also in `self`.
    #[inline]
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Number of components.
    #[inline]
    #[must_use]
    pub const fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// True if no component is set.
    #[inline]
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Component IDs in ascending order.
    pub fn ids(self) -> impl Iterator<Item = ComponentId> {
        let mut bits = self.0;
        std::iter::from_fn(move || {
            if bits == 0 {
                return None;
            }
            let id = bits.trailing_zeros() as ComponentId;
            bits &= bits - 1;
            Some(id)
        })
    }

    /// Position of `id`'s handle among the set bits.
    #[inline]
    const fn rank(self, id: ComponentId) -> usize {
        let below = (1u64 << id) - 1;
        (self.0 & below).count_ones() as usize
    }
}

/// Components attached to one entity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Archetype {
    signature: ArchetypeSignature,
    handles: Vec<Handle>,
}

impl Archetype {
    /// Which components are attached.
    #[inline]
    #[must_use]
    pub const fn signature(&self) -> ArchetypeSignature {
        self.signature
    }

    /// True if nothing is attached.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.signature.is_empty()
    }

    /// Pool handle of component `id`, if attached.
    #[inline]
    #[must_use]
    pub fn handle_of(&self, id: ComponentId) -> Option<Handle> {
        if !self.signature.has_id(id) {
            return None;
        }
        Some(self.handles[self.signature.rank(id)])
    }

    /// `(component id, pool handle)` pairs in ascending ID order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, Handle)> + '_ {
        self.signature.ids().zip(self.handles.iter().copied())
    }

    /// Records `handle` as component `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` is already attached.
    pub(crate) fn attach(&mut self, id: ComponentId, handle: Handle) {
        assert!(
            !self.signature.has_id(id),
            "component {id} is already attached"
        );
        let rank = self.signature.rank(id);
        self.handles.insert(rank, handle);
        self.signature = self.signature.with_id(id);
    }

    /// Forgets component `id`, returning its pool handle.
    pub(crate) fn detach(&mut self, id: ComponentId) -> Option<Handle> {
        if !self.signature.has_id(id) {
            return None;
        }
        let handle = self.handles.remove(self.signature.rank(id));
        self.signature = self.signature.without_id(id);
        Some(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_bits() {
        let sig = ArchetypeSignature::EMPTY.with_id(0).with_id(5).with_id(63);
        assert_eq!(sig.len(), 3);
        assert!(sig.has_id(5));
        assert!(!sig.has_id(4));
        assert!(!sig.has_id(200));
        assert_eq!(sig.ids().collect::<Vec<_>>(), vec![0, 5, 63]);
        assert_eq!(sig.without_id(5).bits(), (1 << 0) | (1 << 63));
    }

    #[test]
    fn test_signature_contains() {
        let full = ArchetypeSignature::from_bits(0b1011);
        assert!(full.contains(ArchetypeSignature::from_bits(0b0011)));
        assert!(!full.contains(ArchetypeSignature::from_bits(0b0100)));
        assert!(full.contains(ArchetypeSignature::EMPTY));
    }

    #[test]
    fn test_attach_keeps_handles_ordered() {
        let mut archetype = Archetype::default();
        archetype.attach(7, Handle::new(70, 0));
        archetype.attach(2, Handle::new(20, 0));
        archetype.attach(40, Handle::new(400, 1));

        assert_eq!(archetype.handle_of(2), Some(Handle::new(20, 0)));
        assert_eq!(archetype.handle_of(7), Some(Handle::new(70, 0)));
        assert_eq!(archetype.handle_of(40), Some(Handle::new(400, 1)));
        assert_eq!(archetype.handle_of(3), None);
        assert_eq!(
            archetype.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            vec![2, 7, 40]
        );
    }

    #[test]
    fn test_detach() {
        let mut archetype = Archetype::default();
        archetype.attach(1, Handle::new(1, 0));
        archetype.attach(9, Handle::new(9, 0));

        assert_eq!(archetype.detach(1), Some(Handle::new(1, 0)));
        assert_eq!(archetype.detach(1), None);
        assert_eq!(archetype.handle_of(9), Some(Handle::new(9, 0)));
        assert_eq!(archetype.detach(9), Some(Handle::new(9, 0)));
        assert!(archetype.is_empty());
    }

    #[test]
    #[should_panic(expected = "already attached")]
    fn test_double_attach_panics() {
        let mut archetype = Archetype::default();
        archetype.attach(1, Handle::new(1, 0));
        archetype.attach(1, Handle::new(2, 0));
    }
}
