//! # Memory Management
//!
//! The three storage primitives every runtime object lives in.
//!
//! ## Design Philosophy
//!
//! - Handles, not pointers: stale handles are detected, never dereferenced
//! - Dense pools for data that is iterated every tick
//! - Address-stable catalogs for data other systems cache pointers into

mod allocator;
mod catalog;
mod pool;

pub use allocator::{Handle, HandleAllocator};
pub use catalog::{Catalog, Iter as CatalogIter, PendingBucket, Tag};
pub use pool::Pool;
