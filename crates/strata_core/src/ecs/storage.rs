//! # Component Pool Table
//!
//! One [`Pool`] per component type, indexed by [`Component::ID`]. Pools are
//! type-erased so a single table can hold every component type; each entry
//! carries a release function monomorphized for its type, which is how the
//! directory drops components it only knows by ID.

use std::any::{Any, TypeId};

use super::component::{Component, ComponentBit, ComponentId, MAX_COMPONENT_TYPES};
use crate::memory::{Handle, Pool};

type ErasedPool = Box<dyn Any + Send>;

struct PoolEntry {
    type_id: TypeId,
    type_name: &'static str,
    pool: ErasedPool,
    release: fn(&mut ErasedPool, Handle),
    len: fn(&ErasedPool) -> usize,
}

fn release_component<C: Component>(pool: &mut ErasedPool, handle: Handle) {
    let pool = pool
        .downcast_mut::<Pool<C>>()
        .unwrap_or_else(|| panic!("pool table entry is not a Pool<{}>", std::any::type_name::<C>()));
    drop(pool.remove(handle));
}

fn pool_len<C: Component>(pool: &ErasedPool) -> usize {
    pool.downcast_ref::<Pool<C>>().map_or(0, Pool::len)
}

/// Component pools keyed by component ID.
pub struct ComponentPools {
    entries: Vec<Option<PoolEntry>>,
    bucket_width: usize,
}

impl ComponentPools {
    /// Creates an empty table; pools are created on first use with
    /// `bucket_width` as their first allocation.
    #[must_use]
    pub fn new(bucket_width: usize) -> Self {
        Self {
            entries: (0..MAX_COMPONENT_TYPES).map(|_| None).collect(),
            bucket_width,
        }
    }

    /// The pool for `C`, if one has been created.
    #[must_use]
    pub fn get<C: Component>(&self) -> Option<&Pool<C>> {
        self.entries[ComponentBit::<C>::BIT as usize]
            .as_ref()?
            .pool
            .downcast_ref::<Pool<C>>()
    }

    pub(crate) fn get_mut<C: Component>(&mut self) -> Option<&mut Pool<C>> {
        self.entries[ComponentBit::<C>::BIT as usize]
            .as_mut()?
            .pool
            .downcast_mut::<Pool<C>>()
    }

    /// The pool for `C`, created if missing.
    ///
    /// # Panics
    ///
    /// Panics if another type already claimed `C::ID`.
    pub(crate) fn get_or_create<C: Component>(&mut self) -> &mut Pool<C> {
        let id = ComponentBit::<C>::BIT;
        let bucket_width = self.bucket_width;
        let entry = self.entries[id as usize].get_or_insert_with(|| {
            tracing::debug!(
                "Created pool for component {} ({})",
                id,
                std::any::type_name::<C>()
            );
            PoolEntry {
                type_id: TypeId::of::<C>(),
                type_name: std::any::type_name::<C>(),
                pool: Box::new(Pool::<C>::with_bucket_width(bucket_width)),
                release: release_component::<C>,
                len: pool_len::<C>,
            }
        });

        assert!(
            entry.type_id == TypeId::of::<C>(),
            "component id {id} claimed by both {} and {}",
            entry.type_name,
            std::any::type_name::<C>()
        );

        entry
            .pool
            .downcast_mut::<Pool<C>>()
            .unwrap_or_else(|| panic!("pool table entry {id} has the wrong type"))
    }

    /// Removes one component knowing only its ID.
    ///
    /// # Panics
    ///
    /// Panics if no pool exists for `id` or the handle is invalid.
    pub(crate) fn release(&mut self, id: ComponentId, handle: Handle) {
        let entry = self.entries[id as usize]
            .as_mut()
            .unwrap_or_else(|| panic!("no pool registered for component {id}"));
        (entry.release)(&mut entry.pool, handle);
    }

    /// `(id, type name, live count)` for every created pool.
    pub fn registered(&self) -> impl Iterator<Item = (ComponentId, &'static str, usize)> + '_ {
        self.entries.iter().zip(0..).filter_map(|(entry, id)| {
            entry
                .as_ref()
                .map(|entry| (id, entry.type_name, (entry.len)(&entry.pool)))
        })
    }
}

impl std::fmt::Debug for ComponentPools {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.registered()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Mass(f32);

    impl Component for Mass {
        const ID: ComponentId = 4;
    }

    struct Impostor;

    impl Component for Impostor {
        const ID: ComponentId = 4;
    }

    #[test]
    fn test_pool_created_lazily() {
        let mut pools = ComponentPools::new(8);
        assert!(pools.get::<Mass>().is_none());

        let (handle, _) = pools.get_or_create::<Mass>().insert(Mass(2.0));
        let pool = pools.get::<Mass>().unwrap();
        assert_eq!(pool.capacity(), 8);
        assert!((pool.get(handle).unwrap().0 - 2.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_release_by_id() {
        let mut pools = ComponentPools::new(8);
        let (handle, _) = pools.get_or_create::<Mass>().insert(Mass(1.0));

        pools.release(Mass::ID, handle);
        assert!(pools.get::<Mass>().unwrap().is_empty());
    }

    #[test]
    fn test_registered_reports_counts() {
        let mut pools = ComponentPools::new(8);
        pools.get_or_create::<Mass>().insert(Mass(1.0));
        pools.get_or_create::<Mass>().insert(Mass(2.0));

        let registered: Vec<_> = pools.registered().collect();
        assert_eq!(registered.len(), 1);
        assert_eq!(registered[0].0, 4);
        assert_eq!(registered[0].2, 2);
    }

    #[test]
    #[should_panic(expected = "claimed by both")]
    fn test_id_collision_panics() {
        let mut pools = ComponentPools::new(8);
        pools.get_or_create::<Mass>().insert(Mass(1.0));
        pools.get_or_create::<Impostor>().insert(Impostor);
    }
}
