//! Tree diffing
//!
//! The differ compares two tree snapshots and produces the plan that makes
//! the target mirror the source: files missing from the target are created,
//! files whose content digests differ are updated, and target-only files are
//! deleted. An empty source tree therefore yields a plan that deletes every
//! target file.

use crate::tree::Tree;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Action planned for a single relative path
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SyncAction {
    /// File exists only in the source; copy it to the target
    Create,
    /// File exists in both trees with differing content; overwrite the target
    Update,
    /// File exists only in the target; remove it
    Delete,
}

/// The per-pass mapping of relative path to planned action
///
/// A path appears in at most one action by construction. Iteration order is
/// deterministic so passes log and execute in a stable order.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct SyncPlan {
    actions: BTreeMap<PathBuf, SyncAction>,
}

impl SyncPlan {
    /// Number of planned actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Check whether the plan holds no actions
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Look up the planned action for a relative path
    pub fn get<P: AsRef<Path>>(&self, relative_path: P) -> Option<SyncAction> {
        self.actions.get(relative_path.as_ref()).copied()
    }

    /// Iterate over planned actions in path order
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, SyncAction)> {
        self.actions.iter().map(|(path, action)| (path, *action))
    }

    /// Count the actions of a given kind
    pub fn count(&self, action: SyncAction) -> usize {
        self.actions.values().filter(|a| **a == action).count()
    }

    fn insert(&mut self, relative_path: PathBuf, action: SyncAction) {
        self.actions.insert(relative_path, action);
    }
}

/// Computes the sync plan between a source and a target tree
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeDiffer;

impl TreeDiffer {
    /// Create a new tree differ
    pub fn new() -> Self {
        Self
    }

    /// Diff two tree snapshots into a sync plan
    ///
    /// Content comparison is by digest, computed lazily and at most once per
    /// file per pass. Differing byte lengths decide "changed" without
    /// hashing. A file whose digest cannot be read is planned as an update
    /// so the failure is owned by the copy retry loop instead of being
    /// retried here.
    pub async fn diff(&self, source: &Tree, target: &Tree) -> SyncPlan {
        let mut plan = SyncPlan::default();

        for (relative_path, source_entry) in source.iter() {
            match target.get(relative_path) {
                None => {
                    plan.insert(relative_path.clone(), SyncAction::Create);
                }
                Some(target_entry) => {
                    if source_entry.size() != target_entry.size() {
                        plan.insert(relative_path.clone(), SyncAction::Update);
                        continue;
                    }

                    match (source_entry.digest().await, target_entry.digest().await) {
                        (Ok(source_digest), Ok(target_digest)) => {
                            if source_digest != target_digest {
                                plan.insert(relative_path.clone(), SyncAction::Update);
                            } else {
                                debug!("In sync: {}", relative_path.display());
                            }
                        }
                        (Err(error), _) | (_, Err(error)) => {
                            warn!(
                                "Digest comparison failed for '{}', planning update: {}",
                                relative_path.display(),
                                error
                            );
                            plan.insert(relative_path.clone(), SyncAction::Update);
                        }
                    }
                }
            }
        }

        for (relative_path, _) in target.iter() {
            if !source.contains(relative_path) {
                plan.insert(relative_path.clone(), SyncAction::Delete);
            }
        }

        plan
    }
}
