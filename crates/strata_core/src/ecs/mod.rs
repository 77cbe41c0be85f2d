//! # Entity Component System
//!
//! Entities are generational handles; components live in one dense pool per
//! component type.
//!
//! ## Design Philosophy
//!
//! - Components are located through generational handles, never raw slots
//! - An archetype bitmask per entity says which pools hold its data
//! - Cross-type work dispatches through a per-ID function table

mod archetype;
mod component;
mod directory;
mod entity;
mod storage;

pub use archetype::{Archetype, ArchetypeSignature};
pub use component::{Component, ComponentId, MAX_COMPONENT_TYPES};
pub use directory::EntityDirectory;
pub use entity::EntityId;
pub use storage::ComponentPools;
