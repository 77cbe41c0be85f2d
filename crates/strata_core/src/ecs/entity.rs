//! # Entity Identity
//!
//! Entities are lightweight identifiers consisting of:
//! - An index into the directory's archetype table
//! - A generation counter for safe reuse

use std::fmt;

use crate::memory::Handle;

/// Unique identifier for an entity.
///
/// Holders keep these across ticks; once the entity is destroyed every
/// lookup through an old ID returns nothing.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(transparent)]
pub struct EntityId(Handle);

impl EntityId {
    /// Null/invalid entity ID.
    pub const NULL: Self = Self(Handle::NULL);

    /// Creates an entity ID from index and generation.
    ///
    /// # Arguments
    ///
    /// * `index` - Slot in the entity directory
    /// * `generation` - Generation of that slot when the entity was created
    #[inline]
    #[must_use]
    pub const fn new(index: u32, generation: u32) -> Self {
        Self(Handle::new(index, generation))
    }

    /// Returns the index portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn index(self) -> u32 {
        self.0.index()
    }

    /// Returns the generation portion of the entity ID.
    #[inline]
    #[must_use]
    pub const fn generation(self) -> u32 {
        self.0.generation()
    }

    /// The underlying directory handle.
    #[inline]
    #[must_use]
    pub const fn handle(self) -> Handle {
        self.0
    }

    /// Checks if this entity ID is null/invalid.
    #[inline]
    #[must_use]
    pub const fn is_null(self) -> bool {
        self.0.is_null()
    }
}

impl From<Handle> for EntityId {
    fn from(handle: Handle) -> Self {
        Self(handle)
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("EntityId(null)")
        } else {
            write!(f, "EntityId({}v{})", self.index(), self.generation())
        }
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "entity {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_roundtrip() {
        let id = EntityId::new(12345, 67890);
        assert_eq!(id.index(), 12345);
        assert_eq!(id.generation(), 67890);
        assert_eq!(id.handle(), Handle::new(12345, 67890));
    }

    #[test]
    fn test_default_is_null() {
        assert!(EntityId::default().is_null());
        assert!(!EntityId::new(0, 0).is_null());
        assert_eq!(format!("{:?}", EntityId::NULL), "EntityId(null)");
    }
}
