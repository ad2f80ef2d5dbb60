//! Streaming verified file copy
//!
//! A copy streams bytes through a fixed-size buffer, so memory stays bounded
//! regardless of file size. Every copy is followed by a mandatory
//! verification step that re-hashes source and destination; a mismatch is a
//! failure, not a success. The filesystem is an external unsynchronized
//! resource, so a file modified mid-copy by another process legitimately
//! shows up as a verification failure.

use crate::digest::{digest_file, ContentDigest};
use dirmirror_types::{Error, Result};
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt, BufReader, BufWriter};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Default buffer size for copy streaming (64KB)
pub const DEFAULT_BUFFER_SIZE: usize = 64 * 1024;

/// Outcome of a successfully verified copy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedCopy {
    /// Number of bytes written to the destination
    pub bytes_copied: u64,
    /// Digest shared by source and destination after verification
    pub digest: ContentDigest,
}

/// Copies a single file and verifies the result by re-hashing
#[derive(Debug, Clone)]
pub struct FileCopier {
    buffer_size: usize,
    cancel: CancellationToken,
}

impl FileCopier {
    /// Create a new file copier with the default buffer size
    pub fn new() -> Self {
        Self {
            buffer_size: DEFAULT_BUFFER_SIZE,
            cancel: CancellationToken::new(),
        }
    }

    /// Set the streaming buffer size
    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size.max(1);
        self
    }

    /// Attach a cancellation token checked between chunks
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Copy a single file and verify the destination content
    ///
    /// Creates all missing intermediate directories for the destination and
    /// overwrites it if it exists. After the byte stream completes, both
    /// files are re-hashed; a digest mismatch fails the copy.
    pub async fn copy_verified<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        source: P,
        destination: Q,
    ) -> Result<VerifiedCopy> {
        let source = source.as_ref();
        let destination = destination.as_ref();

        if let Some(parent) = destination.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| Error::from_copy_io(parent, &e))?;
        }

        let bytes_copied = self.stream_bytes(source, destination).await?;

        // Post-copy verification is mandatory
        let source_digest = digest_file(source).await?;
        let dest_digest = digest_file(destination).await?;
        if source_digest != dest_digest {
            return Err(Error::Verification {
                path: destination.to_path_buf(),
            });
        }

        debug!(
            "Copied {} bytes: '{}' -> '{}' ({})",
            bytes_copied,
            source.display(),
            destination.display(),
            dest_digest
        );

        Ok(VerifiedCopy {
            bytes_copied,
            digest: dest_digest,
        })
    }

    /// Stream bytes from source to destination through a bounded buffer
    async fn stream_bytes(&self, source: &Path, destination: &Path) -> Result<u64> {
        let source_file = File::open(source)
            .await
            .map_err(|e| Error::from_copy_io(source, &e))?;
        let dest_file = File::create(destination)
            .await
            .map_err(|e| Error::from_copy_io(destination, &e))?;

        let mut reader = BufReader::new(source_file);
        let mut writer = BufWriter::new(dest_file);
        let mut chunk = vec![0u8; self.buffer_size];
        let mut bytes_copied = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }

            let bytes_read = reader
                .read(&mut chunk)
                .await
                .map_err(|e| Error::from_copy_io(source, &e))?;
            if bytes_read == 0 {
                break; // EOF
            }

            writer
                .write_all(&chunk[..bytes_read])
                .await
                .map_err(|e| Error::from_copy_io(destination, &e))?;
            bytes_copied += bytes_read as u64;
        }

        writer
            .flush()
            .await
            .map_err(|e| Error::from_copy_io(destination, &e))?;

        Ok(bytes_copied)
    }
}

impl Default for FileCopier {
    fn default() -> Self {
        Self::new()
    }
}
