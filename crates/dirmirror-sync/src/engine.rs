//! Main synchronization engine
//!
//! One pass: snapshot both trees, diff them, copy creates and updates with
//! bounded retry, delete target-only files, and report per-file outcomes.
//! Per-file failures are recorded in the result and never escape as errors;
//! only an enumeration failure on either root (or cancellation) aborts a
//! pass. Passes share no in-memory state: the mirror on disk is the only
//! thing that persists between them.

use crate::diff::{SyncAction, SyncPlan, TreeDiffer};
use crate::tree::Tree;
use dirmirror_io::{FileCopier, RetryingCopier};
use dirmirror_types::{Error, MirrorConfig, Result, RetryConfig};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::fs;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// A single file's failure within an otherwise completed pass
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct FileFailure {
    /// Path relative to the tree roots
    pub relative_path: PathBuf,
    /// The action that failed
    pub action: SyncAction,
    /// Attempts consumed before giving up
    pub attempts: u32,
    /// Reason for the failure
    pub message: String,
}

/// Outcome of one synchronization pass
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct SyncResult {
    /// Identifier for correlating this pass in logs
    pub pass_id: uuid::Uuid,
    /// Number of files copied (creates and updates)
    pub files_copied: u64,
    /// Number of bytes written by copies
    pub bytes_copied: u64,
    /// Number of target-only files removed
    pub files_deleted: u64,
    /// Per-file failures recorded during the pass
    pub failures: Vec<FileFailure>,
    /// Wall-clock duration of the pass
    pub duration: Duration,
}

impl SyncResult {
    fn new(pass_id: uuid::Uuid) -> Self {
        Self {
            pass_id,
            files_copied: 0,
            bytes_copied: 0,
            files_deleted: 0,
            failures: Vec::new(),
            duration: Duration::default(),
        }
    }

    /// Check whether the pass completed without any per-file failure
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Orchestrates one synchronization pass at a time
#[derive(Debug)]
pub struct SyncEngine {
    config: MirrorConfig,
    differ: TreeDiffer,
    copier: RetryingCopier,
    cancel: CancellationToken,
}

impl SyncEngine {
    /// Create a new sync engine with the default retry policy
    pub fn new(config: MirrorConfig) -> Self {
        Self::with_retry(config, RetryConfig::default())
    }

    /// Create a sync engine with a custom retry policy
    pub fn with_retry(config: MirrorConfig, retry: RetryConfig) -> Self {
        let cancel = CancellationToken::new();
        let copier = RetryingCopier::new(
            FileCopier::new().with_cancellation(cancel.clone()),
            retry,
        );
        Self {
            config,
            differ: TreeDiffer::new(),
            copier,
            cancel,
        }
    }

    /// Attach a cancellation token honored between files and mid-copy
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.copier = RetryingCopier::new(
            FileCopier::new().with_cancellation(cancel.clone()),
            self.copier.retry_config().clone(),
        );
        self.cancel = cancel;
        self
    }

    /// The configuration this engine was built with
    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    /// Run one synchronization pass
    ///
    /// Fails only on enumeration of either root or on cancellation; per-file
    /// copy and delete failures are recorded in the returned result and the
    /// pass continues with the remaining files.
    pub async fn run_pass(&self) -> Result<SyncResult> {
        let pass_id = uuid::Uuid::new_v4();
        let start = Instant::now();
        let mut result = SyncResult::new(pass_id);

        info!(
            "Pass {} starting: '{}' -> '{}'",
            pass_id,
            self.config.source_root.display(),
            self.config.target_root.display()
        );

        // A fresh target directory is created, not treated as an error
        fs::create_dir_all(&self.config.target_root)
            .await
            .map_err(|e| Error::tree_enumeration(&self.config.target_root, e.to_string()))?;

        let source_tree = Tree::scan(&self.config.source_root).await?;
        let target_tree = Tree::scan(&self.config.target_root).await?;

        let plan = self.differ.diff(&source_tree, &target_tree).await;
        info!(
            "Pass {}: {} create(s), {} update(s), {} delete(s)",
            pass_id,
            plan.count(SyncAction::Create),
            plan.count(SyncAction::Update),
            plan.count(SyncAction::Delete)
        );

        self.execute_plan(&plan, &mut result).await?;

        result.duration = start.elapsed();
        info!(
            "Pass {} completed in {:?}: {} copied, {} deleted, {} failure(s)",
            pass_id,
            result.duration,
            result.files_copied,
            result.files_deleted,
            result.failures.len()
        );

        Ok(result)
    }

    /// Execute every planned action, isolating per-file failures
    async fn execute_plan(&self, plan: &SyncPlan, result: &mut SyncResult) -> Result<()> {
        for (relative_path, action) in plan.iter() {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            match action {
                SyncAction::Create | SyncAction::Update => {
                    self.copy_one(relative_path.clone(), action, result).await?;
                }
                SyncAction::Delete => {
                    self.delete_one(relative_path.clone(), result).await;
                }
            }
        }
        Ok(())
    }

    /// Copy one file with retry, recording the outcome
    async fn copy_one(
        &self,
        relative_path: PathBuf,
        action: SyncAction,
        result: &mut SyncResult,
    ) -> Result<()> {
        let source = self.config.source_root.join(&relative_path);
        let destination = self.config.target_root.join(&relative_path);

        match self.copier.copy_with_retry(&source, &destination).await {
            Ok(report) => {
                info!(
                    "Copied file successfully: {} ({} bytes, {} attempt(s))",
                    relative_path.display(),
                    report.bytes_copied,
                    report.attempts
                );
                result.files_copied += 1;
                result.bytes_copied += report.bytes_copied;
            }
            Err(failure) if matches!(failure.error, Error::Cancelled) => {
                return Err(Error::Cancelled);
            }
            Err(failure) => {
                error!(
                    "The file cannot be copied after {} attempt(s): {}: {}",
                    failure.attempts,
                    relative_path.display(),
                    failure.error
                );
                result.failures.push(FileFailure {
                    relative_path,
                    action,
                    attempts: failure.attempts,
                    message: failure.error.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Delete one target-only file, recording the outcome
    async fn delete_one(&self, relative_path: PathBuf, result: &mut SyncResult) {
        let target = self.config.target_root.join(&relative_path);

        match fs::remove_file(&target).await {
            Ok(()) => {
                info!("Deleted file: {}", relative_path.display());
                result.files_deleted += 1;
            }
            Err(e) => {
                let error = Error::delete(&target, e.to_string());
                warn!("{}", error);
                result.failures.push(FileFailure {
                    relative_path,
                    action: SyncAction::Delete,
                    attempts: 1,
                    message: error.to_string(),
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs as std_fs;
    use tempfile::TempDir;

    fn engine_for(source: &TempDir, target: &TempDir) -> SyncEngine {
        SyncEngine::with_retry(
            MirrorConfig::new(source.path(), target.path()),
            RetryConfig::new(2, Duration::from_millis(5)).unwrap(),
        )
    }

    #[tokio::test]
    async fn test_fresh_target_is_populated() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std_fs::write(source.path().join("a.txt"), b"hello").unwrap();

        let result = engine_for(&source, &target).run_pass().await.unwrap();

        assert_eq!(result.files_copied, 1);
        assert!(result.is_clean());
        assert_eq!(std_fs::read(target.path().join("a.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_missing_source_root_aborts_pass() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let engine = SyncEngine::new(MirrorConfig::new(
            source.path().join("absent"),
            target.path(),
        ));

        let err = engine.run_pass().await.unwrap_err();
        assert!(err.is_pass_fatal());
    }

    #[tokio::test]
    async fn test_missing_target_root_is_created() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        let target_root = target.path().join("fresh/mirror");
        std_fs::write(source.path().join("a.txt"), b"hello").unwrap();

        let engine = SyncEngine::new(MirrorConfig::new(source.path(), &target_root));
        let result = engine.run_pass().await.unwrap();

        assert_eq!(result.files_copied, 1);
        assert_eq!(std_fs::read(target_root.join("a.txt")).unwrap(), b"hello");
    }

    #[tokio::test]
    async fn test_cancelled_engine_aborts_pass() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std_fs::write(source.path().join("a.txt"), b"hello").unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let engine = SyncEngine::new(MirrorConfig::new(source.path(), target.path()))
            .with_cancellation(cancel);

        let err = engine.run_pass().await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn test_target_only_file_is_removed() {
        let source = TempDir::new().unwrap();
        let target = TempDir::new().unwrap();
        std_fs::write(source.path().join("keep.txt"), b"keep").unwrap();
        std_fs::write(target.path().join("stale.txt"), b"stale").unwrap();

        let engine = engine_for(&source, &target);
        let result = engine.run_pass().await.unwrap();

        assert_eq!(result.files_deleted, 1);
        assert!(!target.path().join("stale.txt").exists());
        assert_eq!(result.files_copied, 1);
    }
}
