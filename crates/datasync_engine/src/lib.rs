//! # Datasync Engine
//!
//! Keyed reconciliation of a source dataset against a destination dataset.
//!
//! This crate provides:
//! - Keyed collections built from provider data (insertion ordered)
//! - A pure diff engine producing additions, removals and modifications
//! - Pluggable comparator and merge functions per configuration
//! - A name-indexed configuration registry
//! - A runner that fetches, diffs and saves, reporting one terminal state per run
//!
//! ## Architecture
//!
//! One reconciliation pass runs in three steps:
//! 1. Fetch the source and destination items and index them by key
//! 2. Diff the two keyed collections
//! 3. Hand a non-empty delta to the configuration's save callback
//!
//! ## Key Invariants
//!
//! - The source is authoritative: modified keys carry the source item unless
//!   a merge function is configured
//! - The diff is deterministic and never fails
//! - A run state holds either a result or an error, never both
//! - At most one run per configuration name executes at a time
//!
//! ## Example
//!
//! ```
//! use datasync_engine::{
//!     ConfigurationRegistry, SynchronizationConfiguration, SynchronizationDataProvider,
//!     SynchronizationRunner,
//! };
//!
//! let source = SynchronizationDataProvider::from_items(vec![1u32, 2, 3], |n| *n);
//! let destination = SynchronizationDataProvider::from_items(vec![1u32, 4], |n| *n);
//!
//! let mut registry = ConfigurationRegistry::new();
//! registry
//!     .register(SynchronizationConfiguration::new(
//!         "numbers",
//!         source,
//!         destination,
//!         |a, b| a == b,
//!         |_result, _context| Ok(()),
//!     ))
//!     .unwrap();
//!
//! let runner = SynchronizationRunner::new(registry);
//! let state = runner.run_synchronization("numbers");
//! let result = state.result().unwrap();
//! assert_eq!(result.to_add().len(), 2);
//! assert_eq!(result.to_remove().len(), 1);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod configuration;
mod context;
mod diff;
mod error;
mod keyed;
mod provider;
mod registry;
mod result;
mod runner;

pub use config::{ConcurrentRunPolicy, RunnerConfig};
pub use configuration::SynchronizationConfiguration;
pub use context::RunContext;
pub use diff::{diff, Comparator, MergeFn};
pub use error::{BoxError, Side, SyncError, SyncResult};
pub use keyed::{DuplicateKeyPolicy, KeyedCollection};
pub use provider::SynchronizationDataProvider;
pub use registry::ConfigurationRegistry;
pub use result::{RunOutcome, SynchronizationResult, SynchronizationResultState};
pub use runner::{RunnerStats, SynchronizationRunner};
