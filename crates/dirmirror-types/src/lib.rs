//! Core type system and error handling for dirmirror
//!
//! This crate provides the foundational types shared by the dirmirror
//! workspace:
//!
//! - **Error handling**: the error taxonomy for hashing, copying, deleting,
//!   and tree enumeration failures, with transience classification that
//!   drives the retry policy
//! - **Configuration**: validated configuration values for the mirror roots
//!   and the copy retry policy
//!
//! # Examples
//!
//! ```rust
//! use dirmirror_types::{MirrorConfig, RetryConfig};
//! use std::time::Duration;
//!
//! let config = MirrorConfig::new("/data/source", "/data/mirror");
//! assert!(config.validate().is_ok());
//!
//! let retry = RetryConfig::new(3, Duration::from_secs(1)).unwrap();
//! assert_eq!(retry.delay_after(2), Duration::from_secs(2));
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod result;

// Re-export commonly used types
pub use config::{MirrorConfig, RetryConfig};
pub use error::{Error, ErrorKind};
pub use result::Result;
