//! # Entity Directory
//!
//! The central container for entities and the components attached to them.
//! Entities are handles from a [`HandleAllocator`]; each live slot owns an
//! [`Archetype`] that records which component pools hold its data.

use super::archetype::{Archetype, ArchetypeSignature};
use super::component::{Component, ComponentBit};
use super::entity::EntityId;
use super::storage::ComponentPools;
use crate::config::StorageConfig;
use crate::error::HandleResult;
use crate::memory::{Handle, HandleAllocator, Pool};

/// Entities, their archetypes, and one component pool per component type.
///
/// Mutating calls (`destroy`, `insert`, `add`, `remove`) treat a dead or
/// stale [`EntityId`] as a programming error and panic; each has a `try_`
/// variant returning the [`crate::HandleError`] instead. Queries return
/// `None` or `false`.
///
/// # Example
///
/// ```rust
/// use strata_core::{Component, EntityDirectory};
///
/// #[derive(Default)]
/// struct Health(u32);
///
/// impl Component for Health {
///     const ID: u8 = 0;
/// }
///
/// let mut entities = EntityDirectory::new();
/// let player = entities.create();
/// entities.insert(player, Health(100));
///
/// assert_eq!(entities.get::<Health>(player).map(|h| h.0), Some(100));
/// entities.destroy(player);
/// assert!(entities.get::<Health>(player).is_none());
/// ```
#[derive(Debug)]
pub struct EntityDirectory {
    handles: HandleAllocator,
    /// Archetype per directory slot. Empty for vacant slots.
    archetypes: Vec<Archetype>,
    pools: ComponentPools,
}

impl Default for EntityDirectory {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityDirectory {
    /// Creates an empty directory with default sizing.
    #[must_use]
    pub fn new() -> Self {
        Self::from_config(&StorageConfig::default())
    }

    /// Creates an empty directory sized by `config`.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self {
            handles: HandleAllocator::with_capacity(config.entity_reserve),
            archetypes: Vec::with_capacity(config.entity_reserve),
            pools: ComponentPools::new(config.pool_bucket_width),
        }
    }

    /// Number of live entities.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.handles.live_count()
    }

    /// True if no entity is alive.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.handles.live_count() == 0
    }

    /// Creates an entity with no components.
    pub fn create(&mut self) -> EntityId {
        let handle = self.handles.borrow_handle();
        let slot = handle.index() as usize;

        if slot == self.archetypes.len() {
            self.archetypes.push(Archetype::default());
        } else {
            debug_assert!(self.archetypes[slot].is_empty());
        }

        EntityId::from(handle)
    }

    /// Checks if an entity is alive.
    #[inline]
    #[must_use]
    pub fn is_alive(&self, id: EntityId) -> bool {
        self.handles.is_valid(id.handle())
    }

    /// Destroys an entity and every component attached to it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn destroy(&mut self, id: EntityId) {
        if let Err(err) = self.try_destroy(id) {
            panic!("EntityDirectory::destroy called with invalid entity: {err}");
        }
    }

    /// Destroys an entity, reporting why the ID was rejected.
    pub fn try_destroy(&mut self, id: EntityId) -> HandleResult<()> {
        let slot = self.handles.check(id.handle())?;
        let archetype = std::mem::take(&mut self.archetypes[slot]);

        for (component, handle) in archetype.iter() {
            self.pools.release(component, handle);
        }
        self.handles.return_handle(id.handle());

        tracing::debug!(
            "Destroyed {} with {} components",
            id,
            archetype.signature().len()
        );
        Ok(())
    }

    /// Destroys every live entity.
    pub fn clear(&mut self) {
        let live: Vec<EntityId> = self.iter().collect();
        for id in live {
            self.destroy(id);
        }
    }

    /// Attaches `value` as `C`, replacing any existing `C` in place.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn insert<C: Component>(&mut self, id: EntityId, value: C) -> &mut C {
        match self.try_insert(id, value) {
            Ok(stored) => stored,
            Err(err) => panic!("EntityDirectory::insert called with invalid entity: {err}"),
        }
    }

    /// Attaches `value` as `C`, reporting why the ID was rejected.
    pub fn try_insert<C: Component>(&mut self, id: EntityId, value: C) -> HandleResult<&mut C> {
        let bit = ComponentBit::<C>::BIT;
        let slot = self.handles.check(id.handle())?;
        let pool = self.pools.get_or_create::<C>();
        let archetype = &mut self.archetypes[slot];

        if let Some(existing) = archetype.handle_of(bit) {
            let stored = component_at(pool, existing);
            *stored = value;
            return Ok(stored);
        }

        let (handle, stored) = pool.insert(value);
        archetype.attach(bit, handle);
        Ok(stored)
    }

    /// Attaches a default `C` unless one is already attached, then returns it.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn add<C: Component + Default>(&mut self, id: EntityId) -> &mut C {
        match self.try_add(id) {
            Ok(stored) => stored,
            Err(err) => panic!("EntityDirectory::add called with invalid entity: {err}"),
        }
    }

    /// Attaches a default `C` unless present, reporting why the ID was rejected.
    pub fn try_add<C: Component + Default>(&mut self, id: EntityId) -> HandleResult<&mut C> {
        let bit = ComponentBit::<C>::BIT;
        let slot = self.handles.check(id.handle())?;
        let pool = self.pools.get_or_create::<C>();
        let archetype = &mut self.archetypes[slot];

        match archetype.handle_of(bit) {
            Some(existing) => Ok(component_at(pool, existing)),
            None => {
                let (handle, stored) = pool.create();
                archetype.attach(bit, handle);
                Ok(stored)
            }
        }
    }

    /// Detaches `C`, returning it if it was attached.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn remove<C: Component>(&mut self, id: EntityId) -> Option<C> {
        match self.try_remove(id) {
            Ok(removed) => removed,
            Err(err) => panic!("EntityDirectory::remove called with invalid entity: {err}"),
        }
    }

    /// Detaches `C`, reporting why the ID was rejected.
    pub fn try_remove<C: Component>(&mut self, id: EntityId) -> HandleResult<Option<C>> {
        let slot = self.handles.check(id.handle())?;
        let Some(handle) = self.archetypes[slot].detach(ComponentBit::<C>::BIT) else {
            return Ok(None);
        };

        let pool = self
            .pools
            .get_mut::<C>()
            .unwrap_or_else(|| panic!("{id} has {} without a pool", std::any::type_name::<C>()));
        Ok(Some(pool.remove(handle)))
    }

    /// Gets `C` for an entity, or `None` if the entity is gone or lacks it.
    #[must_use]
    pub fn get<C: Component>(&self, id: EntityId) -> Option<&C> {
        let handle = self.archetype(id)?.handle_of(ComponentBit::<C>::BIT)?;
        self.pools.get::<C>()?.get(handle)
    }

    /// Gets `C` mutably, or `None` if the entity is gone or lacks it.
    pub fn get_mut<C: Component>(&mut self, id: EntityId) -> Option<&mut C> {
        let slot = self.handles.check(id.handle()).ok()?;
        let handle = self.archetypes[slot].handle_of(ComponentBit::<C>::BIT)?;
        self.pools.get_mut::<C>()?.get_mut(handle)
    }

    /// True if the entity is alive and has `C`.
    #[must_use]
    pub fn has<C: Component>(&self, id: EntityId) -> bool {
        self.signature(id).is_some_and(ArchetypeSignature::has::<C>)
    }

    /// The entity's archetype, if it is alive.
    #[must_use]
    pub fn archetype(&self, id: EntityId) -> Option<&Archetype> {
        let slot = self.handles.check(id.handle()).ok()?;
        self.archetypes.get(slot)
    }

    /// The entity's component signature, if it is alive.
    #[must_use]
    pub fn signature(&self, id: EntityId) -> Option<ArchetypeSignature> {
        self.archetype(id).map(Archetype::signature)
    }

    /// Iterates over all alive entities in slot order.
    pub fn iter(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.handles.iter_live().map(EntityId::from)
    }

    /// Iterates over alive entities that have every component in `signature`.
    pub fn query(&self, signature: ArchetypeSignature) -> impl Iterator<Item = EntityId> + '_ {
        self.handles
            .iter_live()
            .filter(move |handle| {
                self.archetypes[handle.index() as usize]
                    .signature()
                    .contains(signature)
            })
            .map(EntityId::from)
    }

    /// Read access to the pool holding every `C`.
    #[must_use]
    pub fn pool<C: Component>(&self) -> Option<&Pool<C>> {
        self.pools.get::<C>()
    }

    /// Every `C` as a dense slice, for batch updates.
    ///
    /// Writing through the slice never changes which entity owns which slot.
    pub fn components_mut<C: Component>(&mut self) -> Option<&mut [C]> {
        self.pools.get_mut::<C>().map(Pool::as_mut_slice)
    }

    /// The pool table, for diagnostics.
    #[must_use]
    pub const fn pools(&self) -> &ComponentPools {
        &self.pools
    }
}

fn component_at<C>(pool: &mut Pool<C>, handle: Handle) -> &mut C {
    pool.get_mut(handle)
        .unwrap_or_else(|| panic!("archetype holds stale component handle {handle}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default, PartialEq)]
    struct Position {
        x: f32,
        y: f32,
    }

    impl Component for Position {
        const ID: u8 = 0;
    }

    #[derive(Debug, Default, PartialEq)]
    struct Velocity {
        dx: f32,
        dy: f32,
    }

    impl Component for Velocity {
        const ID: u8 = 1;
    }

    #[derive(Debug, Default, PartialEq)]
    struct Name(String);

    impl Component for Name {
        const ID: u8 = 40;
    }

    #[test]
    fn test_create_destroy() {
        let mut entities = EntityDirectory::new();

        let id1 = entities.create();
        assert!(entities.is_alive(id1));
        assert_eq!(entities.len(), 1);

        let id2 = entities.create();
        assert_eq!(entities.len(), 2);

        entities.destroy(id1);
        assert!(!entities.is_alive(id1));
        assert_eq!(entities.len(), 1);

        // Create again - should reuse the slot
        let id3 = entities.create();
        assert_eq!(id3.index(), id1.index());
        assert_ne!(id3.generation(), id1.generation());
        assert!(entities.is_alive(id2));
    }

    #[test]
    fn test_insert_sets_archetype() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();

        entities.insert(id, Position { x: 1.0, y: 2.0 });
        entities.insert(id, Name("crate".into()));

        let signature = entities.signature(id).unwrap();
        assert!(signature.has::<Position>());
        assert!(signature.has::<Name>());
        assert!(!signature.has::<Velocity>());
        assert_eq!(entities.get::<Name>(id).map(|n| n.0.as_str()), Some("crate"));
        assert_eq!(entities.get::<Position>(id).map(|p| (p.x, p.y)), Some((1.0, 2.0)));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();

        entities.insert(id, Position { x: 1.0, y: 1.0 });
        let first = entities.archetype(id).unwrap().handle_of(Position::ID);
        entities.insert(id, Position { x: 5.0, y: 5.0 });

        assert_eq!(entities.archetype(id).unwrap().handle_of(Position::ID), first);
        assert_eq!(entities.pool::<Position>().unwrap().len(), 1);
        assert_eq!(entities.get::<Position>(id).unwrap().x, 5.0);
    }

    #[test]
    fn test_add_keeps_existing() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();

        entities.add::<Velocity>(id).dx = 3.0;
        entities.add::<Velocity>(id).dy = 4.0;
        assert_eq!(
            entities.get::<Velocity>(id).map(|v| (v.dx, v.dy)),
            Some((3.0, 4.0))
        );
    }

    #[test]
    fn test_remove_component() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();
        entities.insert(id, Velocity { dx: 1.0, dy: 0.0 });

        assert_eq!(
            entities.remove::<Velocity>(id),
            Some(Velocity { dx: 1.0, dy: 0.0 })
        );
        assert_eq!(entities.remove::<Velocity>(id), None);
        assert!(!entities.has::<Velocity>(id));
        assert!(entities.pool::<Velocity>().unwrap().is_empty());
    }

    #[test]
    fn test_destroy_releases_components() {
        let mut entities = EntityDirectory::new();
        let a = entities.create();
        let b = entities.create();
        entities.insert(a, Position::default());
        entities.insert(a, Velocity::default());
        entities.insert(b, Position { x: 9.0, y: 9.0 });

        entities.destroy(a);

        assert_eq!(entities.pool::<Position>().unwrap().len(), 1);
        assert!(entities.pool::<Velocity>().unwrap().is_empty());
        assert_eq!(entities.get::<Position>(b).unwrap().x, 9.0);
        assert!(entities.get::<Position>(a).is_none());
    }

    #[test]
    fn test_swap_removal_keeps_other_entities() {
        let mut entities = EntityDirectory::new();
        let ids: Vec<_> = (0..4).map(|_| entities.create()).collect();
        for (i, id) in ids.iter().enumerate() {
            entities.insert(*id, Position { x: i as f32, y: 0.0 });
        }

        entities.remove::<Position>(ids[0]);

        for (i, id) in ids.iter().enumerate().skip(1) {
            assert_eq!(entities.get::<Position>(*id).unwrap().x, i as f32);
        }
    }

    #[test]
    fn test_query() {
        let mut entities = EntityDirectory::new();
        let moving = entities.create();
        let still = entities.create();
        entities.insert(moving, Position::default());
        entities.insert(moving, Velocity::default());
        entities.insert(still, Position::default());

        let signature = ArchetypeSignature::of::<Position>().with::<Velocity>();
        assert_eq!(entities.query(signature).collect::<Vec<_>>(), vec![moving]);
        assert_eq!(
            entities.query(ArchetypeSignature::of::<Position>()).count(),
            2
        );
    }

    #[test]
    fn test_batch_update_through_slice() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();
        entities.insert(id, Position::default());

        for position in entities.components_mut::<Position>().unwrap() {
            position.x += 1.5;
        }
        assert_eq!(entities.get::<Position>(id).unwrap().x, 1.5);
    }

    #[test]
    fn test_stale_entity_queries_are_empty() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();
        entities.insert(id, Position::default());
        entities.destroy(id);

        assert!(entities.get::<Position>(id).is_none());
        assert!(entities.get_mut::<Position>(id).is_none());
        assert!(entities.archetype(id).is_none());
        assert!(entities.try_remove::<Position>(id).is_err());
        assert!(entities.try_destroy(id).is_err());
    }

    #[test]
    #[should_panic(expected = "invalid entity")]
    fn test_destroy_twice_panics() {
        let mut entities = EntityDirectory::new();
        let id = entities.create();
        entities.destroy(id);
        entities.destroy(id);
    }

    #[test]
    fn test_clear() {
        let mut entities = EntityDirectory::new();
        for _ in 0..5 {
            let id = entities.create();
            entities.insert(id, Name("x".into()));
        }
        entities.clear();

        assert!(entities.is_empty());
        assert!(entities.pool::<Name>().unwrap().is_empty());
    }
}
