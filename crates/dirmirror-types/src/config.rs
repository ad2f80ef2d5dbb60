//! Configuration types for dirmirror
//!
//! Configuration is an explicit value handed to the sync engine at
//! construction and used read-only across passes. There is no process-wide
//! state.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mirror configuration: the source of truth and the directory kept in sync
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MirrorConfig {
    /// Root of the tree treated as ground truth
    pub source_root: PathBuf,
    /// Root of the tree rewritten to mirror the source
    pub target_root: PathBuf,
}

impl MirrorConfig {
    /// Create a new mirror configuration
    pub fn new(source_root: impl AsRef<Path>, target_root: impl AsRef<Path>) -> Self {
        Self {
            source_root: source_root.as_ref().to_path_buf(),
            target_root: target_root.as_ref().to_path_buf(),
        }
    }

    /// Validate the configuration
    ///
    /// The target is deleted from aggressively, so mirroring a directory
    /// onto itself is rejected outright.
    pub fn validate(&self) -> Result<(), String> {
        if self.source_root.as_os_str().is_empty() {
            return Err("Source root must not be empty".to_string());
        }
        if self.target_root.as_os_str().is_empty() {
            return Err("Target root must not be empty".to_string());
        }
        if self.source_root == self.target_root {
            return Err("Source and target roots must differ".to_string());
        }
        Ok(())
    }
}

/// Retry configuration for the copy operation
///
/// Backoff is linear: the delay before retry `n` is `base_delay * n`.
/// No delay is applied after the final attempt.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RetryConfig {
    /// Maximum number of copy attempts per file per pass
    pub max_attempts: u32,
    /// Base delay between retries, scaled by the attempt number
    pub base_delay: Duration,
}

impl RetryConfig {
    /// Create a new retry configuration
    pub fn new(max_attempts: u32, base_delay: Duration) -> Result<Self, String> {
        if max_attempts == 0 {
            return Err("Max attempts must be at least 1".to_string());
        }
        Ok(Self {
            max_attempts,
            base_delay,
        })
    }

    /// Calculate the backoff delay after the given failed attempt (1-based)
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_config_validation() {
        let config = MirrorConfig::new("/data/source", "/data/mirror");
        assert!(config.validate().is_ok());

        let same = MirrorConfig::new("/data/source", "/data/source");
        assert!(same.validate().is_err());

        let empty = MirrorConfig::new("", "/data/mirror");
        assert!(empty.validate().is_err());
    }

    #[test]
    fn test_retry_config_validation() {
        assert!(RetryConfig::new(0, Duration::from_secs(1)).is_err());
        assert!(RetryConfig::new(1, Duration::ZERO).is_ok());
    }

    #[test]
    fn test_linear_backoff_series() {
        let retry = RetryConfig::new(4, Duration::from_secs(1)).unwrap();
        assert_eq!(retry.delay_after(1), Duration::from_secs(1));
        assert_eq!(retry.delay_after(2), Duration::from_secs(2));
        assert_eq!(retry.delay_after(3), Duration::from_secs(3));
    }

    #[test]
    fn test_default_retry_config() {
        let retry = RetryConfig::default();
        assert_eq!(retry.max_attempts, 3);
        assert_eq!(retry.base_delay, Duration::from_secs(1));
    }
}
