//! Bounded retry around the verified copy
//!
//! The state machine per file: an attempt either succeeds with verified
//! digests, fails transiently and is retried after a linear backoff, or
//! exhausts the attempt budget. Exhaustion is an explicit per-file outcome,
//! never an escaping error: one bad file must not block the rest of a pass.

use crate::copy::{FileCopier, VerifiedCopy};
use crate::digest::ContentDigest;
use dirmirror_types::{Error, RetryConfig};
use std::path::Path;
use tracing::warn;

/// Outcome of a copy that eventually succeeded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CopyReport {
    /// Number of bytes written to the destination
    pub bytes_copied: u64,
    /// Verified content digest
    pub digest: ContentDigest,
    /// Number of attempts consumed, including the successful one
    pub attempts: u32,
}

/// Outcome of a copy whose attempts were exhausted or cut short
#[derive(Debug, Clone)]
pub struct CopyFailure {
    /// Number of attempts consumed
    pub attempts: u32,
    /// The error from the final attempt
    pub error: Error,
}

impl std::fmt::Display for CopyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} after {} attempt(s)", self.error, self.attempts)
    }
}

impl std::error::Error for CopyFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Wraps [`FileCopier`] with bounded retry and linear backoff
#[derive(Debug, Clone)]
pub struct RetryingCopier {
    copier: FileCopier,
    retry: RetryConfig,
}

impl RetryingCopier {
    /// Create a new retrying copier
    pub fn new(copier: FileCopier, retry: RetryConfig) -> Self {
        Self { copier, retry }
    }

    /// Get the retry configuration
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Copy a file, retrying transient failures up to the attempt budget
    ///
    /// After a failed attempt `n` the copier sleeps `base_delay * n` before
    /// trying again; no delay follows the final attempt. Access errors are
    /// retried under the same policy as transient I/O errors. Cancellation
    /// is never retried.
    pub async fn copy_with_retry<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<CopyReport, CopyFailure> {
        let source = source.as_ref();
        let destination = destination.as_ref();
        let max_attempts = self.retry.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match self.copier.copy_verified(source, destination).await {
                Ok(VerifiedCopy {
                    bytes_copied,
                    digest,
                }) => {
                    return Ok(CopyReport {
                        bytes_copied,
                        digest,
                        attempts: attempt,
                    });
                }
                Err(error) if error.is_transient() && attempt < max_attempts => {
                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "Copy attempt {} of {} failed for '{}': {}. Retrying in {:?}",
                        attempt,
                        max_attempts,
                        source.display(),
                        error,
                        delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    return Err(CopyFailure {
                        attempts: attempt,
                        error,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dirmirror_types::ErrorKind;
    use std::fs;
    use std::time::{Duration, Instant};
    use tempfile::TempDir;

    fn fast_retry(max_attempts: u32) -> RetryConfig {
        RetryConfig::new(max_attempts, Duration::from_millis(20)).unwrap()
    }

    #[tokio::test]
    async fn test_first_attempt_success_consumes_one_attempt() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let dest = temp_dir.path().join("dest.txt");
        fs::write(&source, b"hello").unwrap();

        let copier = RetryingCopier::new(FileCopier::new(), fast_retry(3));
        let report = copier.copy_with_retry(&source, &dest).await.unwrap();

        assert_eq!(report.attempts, 1);
        assert_eq!(report.bytes_copied, 5);
    }

    #[tokio::test]
    async fn test_exhaustion_consumes_exact_attempt_budget() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        fs::write(&source, b"content").unwrap();
        // A directory at the destination path makes every attempt fail
        let dest = temp_dir.path().join("blocked");
        fs::create_dir(&dest).unwrap();

        let copier = RetryingCopier::new(FileCopier::new(), fast_retry(3));
        let failure = copier.copy_with_retry(&source, &dest).await.unwrap_err();

        assert_eq!(failure.attempts, 3);
        assert!(failure.error.is_transient());
    }

    #[tokio::test]
    async fn test_backoff_delays_sum_linearly() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        fs::write(&source, b"content").unwrap();
        let dest = temp_dir.path().join("blocked");
        fs::create_dir(&dest).unwrap();

        let base = Duration::from_millis(25);
        let copier = RetryingCopier::new(
            FileCopier::new(),
            RetryConfig::new(3, base).unwrap(),
        );

        let start = Instant::now();
        let _ = copier.copy_with_retry(&source, &dest).await.unwrap_err();
        // Two backoffs before attempts 2 and 3: base + 2 * base
        assert!(start.elapsed() >= base * 3);
    }

    #[tokio::test]
    async fn test_cancellation_is_not_retried() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.txt");
        let dest = temp_dir.path().join("dest.txt");
        fs::write(&source, b"content").unwrap();

        let cancel = tokio_util::sync::CancellationToken::new();
        cancel.cancel();
        let copier = RetryingCopier::new(
            FileCopier::new().with_cancellation(cancel),
            fast_retry(3),
        );

        let failure = copier.copy_with_retry(&source, &dest).await.unwrap_err();
        assert_eq!(failure.attempts, 1);
        assert_eq!(failure.error.kind(), ErrorKind::Cancelled);
    }
}
