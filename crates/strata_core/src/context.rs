//! # Storage Context
//!
//! The single owner of every entity, component and asset in a simulation.
//! Subsystems receive `&StorageContext` or `&mut StorageContext` instead of
//! reaching for global registries.

use crate::asset::{Asset, AssetCatalogs};
use crate::config::StorageConfig;
use crate::ecs::{Component, EntityDirectory, EntityId};
use crate::error::CatalogResult;

/// Entities, components and assets for one simulation.
///
/// Created at subsystem start with [`StorageContext::new`]; torn down
/// explicitly with [`StorageContext::teardown`] (dropping it does the same
/// work without the log line).
///
/// # Example
///
/// ```rust
/// use strata_core::{Asset, StorageConfig, StorageContext};
///
/// #[derive(Default)]
/// struct Mesh {
///     vertices: Vec<[f32; 3]>,
/// }
///
/// impl Asset for Mesh {
///     const ID: u8 = 0;
///     const NAME: &'static str = "mesh";
/// }
///
/// let mut ctx = StorageContext::new(StorageConfig::default());
/// ctx.create_asset::<Mesh>("cube").unwrap().vertices.push([0.0; 3]);
///
/// assert_eq!(ctx.get_asset::<Mesh>("cube").map(|m| m.vertices.len()), Some(1));
/// ctx.teardown();
/// ```
#[derive(Debug)]
pub struct StorageContext {
    config: StorageConfig,
    entities: EntityDirectory,
    assets: AssetCatalogs,
}

impl Default for StorageContext {
    fn default() -> Self {
        Self::new(StorageConfig::default())
    }
}

impl StorageContext {
    /// Builds empty storage sized by `config`.
    #[must_use]
    pub fn new(config: StorageConfig) -> Self {
        tracing::info!(
            "Storage context up: pool bucket width {}, {} entities reserved",
            config.pool_bucket_width,
            config.entity_reserve
        );

        Self {
            entities: EntityDirectory::from_config(&config),
            assets: AssetCatalogs::new(config.catalog_reserve),
            config,
        }
    }

    /// Configuration this context was built with.
    #[must_use]
    pub const fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// The entity directory.
    #[must_use]
    pub const fn entities(&self) -> &EntityDirectory {
        &self.entities
    }

    /// The entity directory, mutably.
    pub fn entities_mut(&mut self) -> &mut EntityDirectory {
        &mut self.entities
    }

    /// The asset catalogs.
    #[must_use]
    pub const fn assets(&self) -> &AssetCatalogs {
        &self.assets
    }

    /// The asset catalogs, mutably.
    pub fn assets_mut(&mut self) -> &mut AssetCatalogs {
        &mut self.assets
    }

    // =========================================================================
    // Entity surface
    // =========================================================================

    /// Creates an entity with no components.
    pub fn create_entity(&mut self) -> EntityId {
        self.entities.create()
    }

    /// Destroys an entity and its components.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn destroy_entity(&mut self, id: EntityId) {
        self.entities.destroy(id);
    }

    /// Attaches `value` to an entity.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn add_component<C: Component>(&mut self, id: EntityId, value: C) -> &mut C {
        self.entities.insert(id, value)
    }

    /// Detaches `C` from an entity.
    ///
    /// # Panics
    ///
    /// Panics if `id` is not alive.
    pub fn remove_component<C: Component>(&mut self, id: EntityId) -> Option<C> {
        self.entities.remove(id)
    }

    /// Gets `C` for an entity, or `None` after the entity is destroyed.
    #[must_use]
    pub fn get_component<C: Component>(&self, id: EntityId) -> Option<&C> {
        self.entities.get(id)
    }

    // =========================================================================
    // Asset surface
    // =========================================================================

    /// Creates a default-constructed asset under `tag`.
    pub fn create_asset<A: Asset + Default>(&mut self, tag: &str) -> CatalogResult<&mut A> {
        self.assets.create(tag)
    }

    /// Gets the asset stored under `tag`.
    #[must_use]
    pub fn get_asset<A: Asset>(&self, tag: &str) -> Option<&A> {
        self.assets.get(tag)
    }

    /// Removes the asset stored under `tag`.
    pub fn remove_asset<A: Asset>(&mut self, tag: &str) -> CatalogResult<A> {
        self.assets.remove(tag)
    }

    /// Removes `tag` from the asset catalog registered as `kind`.
    pub fn remove_asset_by_kind(&mut self, kind: &str, tag: &str) -> CatalogResult<()> {
        self.assets.remove_by_kind(kind, tag)
    }

    /// Destroys every entity, component and asset.
    pub fn teardown(&mut self) {
        let entities = self.entities.len();
        self.entities.clear();
        self.assets.clear();
        tracing::info!("Storage context torn down: released {} entities", entities);
    }
}
