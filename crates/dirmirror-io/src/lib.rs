//! Content hashing and verified file copying for dirmirror
//!
//! This crate provides the file-level building blocks of a synchronization
//! pass:
//!
//! - **Content digests**: streaming BLAKE3 digests over full file content,
//!   used both for change detection and for post-copy verification
//! - **Verified copy**: streaming copy with bounded memory that creates
//!   missing parent directories and re-hashes both sides afterwards
//! - **Bounded retry**: linear-backoff retry around the verified copy, with
//!   explicit per-file outcomes instead of escaping errors
//!
//! # Examples
//!
//! ```rust,no_run
//! use dirmirror_io::{FileCopier, RetryingCopier};
//! use dirmirror_types::RetryConfig;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let copier = RetryingCopier::new(FileCopier::new(), RetryConfig::default());
//! let report = copier.copy_with_retry("src/a.txt", "dst/a.txt").await?;
//! println!("copied {} bytes in {} attempt(s)", report.bytes_copied, report.attempts);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod copy;
pub mod digest;
pub mod retry;

// Re-export commonly used types
pub use copy::{FileCopier, VerifiedCopy};
pub use digest::{digest_file, ContentDigest};
pub use retry::{CopyFailure, CopyReport, RetryingCopier};
