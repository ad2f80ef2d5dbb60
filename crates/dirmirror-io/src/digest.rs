//! Streaming content digests
//!
//! Digests cover the full file content and are stable across repeated calls
//! on unchanged bytes. Two files are considered identical iff their digests
//! match. Digests are recomputed on every pass; trading hashing cost for the
//! simplicity of having no cross-pass cache to invalidate.

use dirmirror_types::{Error, Result};
use std::fmt;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, BufReader};
use tracing::trace;

/// Chunk size for streaming reads (64KB)
const READ_CHUNK_SIZE: usize = 64 * 1024;

/// A BLAKE3 digest of a file's full byte content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct ContentDigest([u8; blake3::OUT_LEN]);

impl ContentDigest {
    /// Get the raw digest bytes
    pub fn as_bytes(&self) -> &[u8; blake3::OUT_LEN] {
        &self.0
    }

    /// Render the digest as lowercase hex
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

impl From<blake3::Hash> for ContentDigest {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// Compute the content digest of a file by streaming its full byte content
///
/// Reads in bounded chunks, so arbitrarily large files hash with constant
/// memory. Fails with a read error if the file cannot be opened or read to
/// completion.
pub async fn digest_file<P: AsRef<Path>>(path: P) -> Result<ContentDigest> {
    let path = path.as_ref();
    let file = File::open(path)
        .await
        .map_err(|e| Error::read(path, e.to_string()))?;

    let mut reader = BufReader::new(file);
    let mut hasher = blake3::Hasher::new();
    let mut chunk = vec![0u8; READ_CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        let bytes_read = reader
            .read(&mut chunk)
            .await
            .map_err(|e| Error::read(path, e.to_string()))?;
        if bytes_read == 0 {
            break; // EOF
        }
        hasher.update(&chunk[..bytes_read]);
        total += bytes_read as u64;
    }

    let digest = ContentDigest::from(hasher.finalize());
    trace!("Hashed {} bytes of '{}': {}", total, path.display(), digest);
    Ok(digest)
}
