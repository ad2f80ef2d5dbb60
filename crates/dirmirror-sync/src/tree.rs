//! Point-in-time tree snapshots
//!
//! A [`Tree`] is an enumeration of the regular files under a root, keyed by
//! their path relative to that root. It is a snapshot, not a live view:
//! files added or removed on disk after enumeration are invisible to the
//! current pass. A missing or unreadable root is an enumeration error, never
//! an empty tree, because an empty source tree means "delete everything in
//! the target".

use dirmirror_io::{digest_file, ContentDigest};
use dirmirror_types::{Error, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// A single file within a tree snapshot
#[derive(Debug)]
pub struct FileEntry {
    relative_path: PathBuf,
    absolute_path: PathBuf,
    size: u64,
    digest: OnceCell<ContentDigest>,
}

impl FileEntry {
    /// Create a new file entry
    pub fn new(relative_path: PathBuf, absolute_path: PathBuf, size: u64) -> Self {
        Self {
            relative_path,
            absolute_path,
            size,
            digest: OnceCell::new(),
        }
    }

    /// Path relative to the tree root, the identity key across trees
    pub fn relative_path(&self) -> &Path {
        &self.relative_path
    }

    /// Absolute path on disk
    pub fn absolute_path(&self) -> &Path {
        &self.absolute_path
    }

    /// Byte length recorded at enumeration time
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Content digest, computed lazily and at most once per pass
    pub async fn digest(&self) -> Result<&ContentDigest> {
        self.digest
            .get_or_try_init(|| digest_file(&self.absolute_path))
            .await
    }
}

/// A snapshot of the regular files under a root directory
#[derive(Debug)]
pub struct Tree {
    root: PathBuf,
    files: HashMap<PathBuf, FileEntry>,
}

impl Tree {
    /// Enumerate the tree rooted at `root`
    ///
    /// Fails with a tree enumeration error if the root does not exist, is
    /// not a directory, or cannot be read. Symbolic links are skipped.
    pub async fn scan<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        let metadata = fs::metadata(&root)
            .await
            .map_err(|e| Error::tree_enumeration(&root, e.to_string()))?;
        if !metadata.is_dir() {
            return Err(Error::tree_enumeration(&root, "not a directory"));
        }

        let mut files = HashMap::new();
        scan_recursive(&root, &root, &mut files).await?;

        info!("Scanned {} files in '{}'", files.len(), root.display());
        Ok(Self { root, files })
    }

    /// The root this tree was enumerated from
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Number of files in the snapshot
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Check whether the snapshot holds no files
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Look up an entry by relative path
    pub fn get<P: AsRef<Path>>(&self, relative_path: P) -> Option<&FileEntry> {
        self.files.get(relative_path.as_ref())
    }

    /// Check whether a relative path exists in the snapshot
    pub fn contains<P: AsRef<Path>>(&self, relative_path: P) -> bool {
        self.files.contains_key(relative_path.as_ref())
    }

    /// Iterate over entries keyed by relative path
    pub fn iter(&self) -> impl Iterator<Item = (&PathBuf, &FileEntry)> {
        self.files.iter()
    }
}

/// Recursively enumerate regular files below `current`
fn scan_recursive<'a>(
    root: &'a Path,
    current: &'a Path,
    files: &'a mut HashMap<PathBuf, FileEntry>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        let mut entries = fs::read_dir(current)
            .await
            .map_err(|e| Error::tree_enumeration(current, e.to_string()))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| Error::tree_enumeration(current, e.to_string()))?
        {
            let absolute_path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| Error::tree_enumeration(&absolute_path, e.to_string()))?;

            if file_type.is_symlink() {
                debug!("Skipping symlink: {}", absolute_path.display());
                continue;
            }

            if file_type.is_dir() {
                scan_recursive(root, &absolute_path, files).await?;
                continue;
            }

            let metadata = entry
                .metadata()
                .await
                .map_err(|e| Error::tree_enumeration(&absolute_path, e.to_string()))?;
            let relative_path = absolute_path
                .strip_prefix(root)
                .unwrap_or(&absolute_path)
                .to_path_buf();

            files.insert(
                relative_path.clone(),
                FileEntry::new(relative_path, absolute_path, metadata.len()),
            );
        }

        Ok(())
    })
}
