//! One-directional mirror synchronization for dirmirror
//!
//! This crate turns the file-level primitives of `dirmirror-io` into a full
//! synchronization pass:
//!
//! - **Tree enumeration**: point-in-time snapshots of a directory tree keyed
//!   by relative path, with lazily computed content digests
//! - **Tree diffing**: the create/update/delete plan that makes the target
//!   mirror the source
//! - **Sync engine**: executes a plan with retrying copies and plain
//!   deletions, isolating per-file failures so one bad file never blocks the
//!   rest of the pass
//!
//! # Examples
//!
//! ```rust,no_run
//! use dirmirror_sync::SyncEngine;
//! use dirmirror_types::MirrorConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let engine = SyncEngine::new(MirrorConfig::new("/data/source", "/data/mirror"));
//! let result = engine.run_pass().await?;
//! println!(
//!     "copied {}, deleted {}, {} failure(s)",
//!     result.files_copied,
//!     result.files_deleted,
//!     result.failures.len()
//! );
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod diff;
pub mod engine;
pub mod tree;

// Re-export commonly used types
pub use diff::{SyncAction, SyncPlan, TreeDiffer};
pub use engine::{FileFailure, SyncEngine, SyncResult};
pub use tree::{FileEntry, Tree};
