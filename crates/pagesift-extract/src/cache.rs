// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result cache — memoises comprehensive results keyed by a SHA-256
// fingerprint of the page pixels and the document type.
//
// The cache is advisory: no size bound, no expiry, and concurrent misses may
// both compute and both write. Values are stored as JSON only.

use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::DynamicImage;
use pagesift_core::error::{PagesiftError, Result};
use pagesift_core::types::{ComprehensiveResult, ContentType};
use sha2::{Digest, Sha256};
use tracing::{debug, instrument, warn};

/// Lowercase hex SHA-256 over the raw pixel bytes, the dimensions, and the
/// document type keyword.
pub fn fingerprint(
    pixels: &[u8],
    width: u32,
    height: u32,
    document_type: ContentType,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(pixels);
    hasher.update(width.to_le_bytes());
    hasher.update(height.to_le_bytes());
    hasher.update(document_type.as_str().as_bytes());
    hex::encode(hasher.finalize())
}

/// [`fingerprint`] of a decoded image.
pub fn fingerprint_image(image: &DynamicImage, document_type: ContentType) -> String {
    fingerprint(image.as_bytes(), image.width(), image.height(), document_type)
}

/// Key/value store for comprehensive results.
///
/// Implementations swallow their own IO and decode failures: a failed read is
/// a miss and a failed write is dropped.
pub trait ResultCache: Send + Sync {
    fn get(&self, key: &str) -> Option<ComprehensiveResult>;
    fn put(&self, key: &str, value: &ComprehensiveResult);
}

// -- In-memory --------------------------------------------------------------

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<String, ComprehensiveResult>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ResultCache for MemoryCache {
    fn get(&self, key: &str) -> Option<ComprehensiveResult> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, value: &ComprehensiveResult) {
        match self.entries.lock() {
            Ok(mut entries) => {
                entries.insert(key.to_owned(), value.clone());
            }
            Err(err) => warn!(error = %err, "Memory cache lock poisoned; entry dropped"),
        }
    }
}

// -- On disk ----------------------------------------------------------------

/// One JSON file per key under a directory.
pub struct DiskCache {
    dir: PathBuf,
}

impl DiskCache {
    /// Use `dir`, creating it if needed.
    #[instrument(skip_all, fields(dir = %dir.as_ref().display()))]
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|err| {
            PagesiftError::CacheError(format!(
                "failed to create cache directory {}: {}",
                dir.display(),
                err
            ))
        })?;
        debug!("Disk cache ready");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn read(&self, key: &str) -> Result<Option<ComprehensiveResult>> {
        let path = self.entry_path(key);
        let raw = match std::fs::read(&path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Stage into a uniquely named file in the cache directory, then rename
    /// over the entry so readers never see a partial write.
    fn write(&self, key: &str, value: &ComprehensiveResult) -> Result<()> {
        let mut staging = tempfile::NamedTempFile::new_in(&self.dir)?;
        staging.write_all(&serde_json::to_vec(value)?)?;
        staging
            .persist(self.entry_path(key))
            .map_err(|err| PagesiftError::Io(err.error))?;
        Ok(())
    }
}

impl ResultCache for DiskCache {
    fn get(&self, key: &str) -> Option<ComprehensiveResult> {
        match self.read(key) {
            Ok(hit) => hit,
            Err(err) => {
                warn!(key, error = %err, "Cache read failed; treating as miss");
                None
            }
        }
    }

    fn put(&self, key: &str, value: &ComprehensiveResult) {
        if let Err(err) = self.write(key, value) {
            warn!(key, error = %err, "Cache write failed; entry dropped");
        }
    }
}
