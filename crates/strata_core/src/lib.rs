//! # STRATA Core
//!
//! Handle-indexed storage for every mutable runtime object in a simulation:
//! - Entities and their components, in dense swap-compacting pools
//! - Loaded assets, in address-stable tag-keyed catalogs
//! - Generational handles that never alias a reused slot
//!
//! ## Architecture Rules
//!
//! 1. **O(1) everything** - insert, swap-remove and checked lookup
//! 2. **Stale handles are detected** - lookups return `None`, mutations panic
//! 3. **Single owner per tick** - nothing here is internally synchronized
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Component, StorageContext};
//!
//! #[derive(Default)]
//! struct Velocity([f32; 3]);
//!
//! impl Component for Velocity {
//!     const ID: u8 = 1;
//! }
//!
//! let mut ctx = StorageContext::default();
//! let entity = ctx.create_entity();
//! ctx.add_component(entity, Velocity([0.0, 1.0, 0.0]));
//! ctx.destroy_entity(entity);
//! assert!(ctx.get_component::<Velocity>(entity).is_none());
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod asset;
pub mod config;
pub mod context;
pub mod ecs;
pub mod error;
pub mod memory;

pub use asset::{Asset, AssetCatalogs, MAX_ASSET_KINDS};
pub use config::{StorageConfig, DEFAULT_BUCKET_WIDTH};
pub use context::StorageContext;
pub use ecs::{
    Archetype, ArchetypeSignature, Component, ComponentId, ComponentPools, EntityDirectory,
    EntityId, MAX_COMPONENT_TYPES,
};
pub use error::{
    CatalogError, CatalogResult, ConfigError, ConfigResult, HandleError, HandleResult,
};
pub use memory::{Catalog, CatalogIter, Handle, HandleAllocator, PendingBucket, Pool, Tag};
