//! # STRATA Tasks
//!
//! Moves asset loading off the owning thread without sharing storage:
//! - [`WorkerPool`] runs jobs on named threads
//! - Jobs build [`strata_core::PendingBucket`]s and push them through a
//!   [`StagingSender`]
//! - The owner drains an [`AssetStaging`] into its catalogs once per tick
//!
//! ## Example
//!
//! ```rust
//! use strata_core::{Asset, StorageContext};
//! use strata_tasks::{AssetStaging, WorkerPool, WorkerPoolConfig};
//!
//! struct Heightmap(Vec<u16>);
//!
//! impl Asset for Heightmap {
//!     const ID: u8 = 4;
//!     const NAME: &'static str = "heightmap";
//! }
//!
//! let workers = WorkerPool::new(WorkerPoolConfig::default()).unwrap();
//! let staging = AssetStaging::<Heightmap>::new();
//!
//! for i in 0..4 {
//!     let sender = staging.sender();
//!     workers
//!         .spawn(move || {
//!             let _ = sender.submit(&format!("tile_{i}"), Heightmap(vec![0; 64]));
//!         })
//!         .unwrap();
//! }
//! workers.wait_idle();
//!
//! let mut ctx = StorageContext::default();
//! let report = staging.commit_into(ctx.assets_mut());
//! assert_eq!(report.committed, 4);
//! assert_eq!(ctx.get_asset::<Heightmap>("tile_2").map(|h| h.0.len()), Some(64));
//! ```

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod error;
pub mod stack;
pub mod staging;
pub mod worker;

pub use error::{TaskError, TaskResult};
pub use stack::HandoffStack;
pub use staging::{AssetStaging, CommitReport, StagingSender};
pub use worker::{WorkerPool, WorkerPoolConfig};
