//! Cache storage trait and filesystem implementation.

use color_eyre::{eyre::eyre, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const FILE_PREFIX: &str = "allPages.";
const FILE_SUFFIX: &str = ".json";

/// Trait for cache storage backends.
///
/// Entries are write-once: there is no way to update or delete a blob.
pub trait CacheStorage: Send + Sync {
  /// Read a stored blob. Any failure to read counts as absent.
  fn read(&self, identifier: &str) -> Option<Vec<u8>>;

  /// Persist a blob under an identifier that has no entry yet.
  fn write_once(&self, identifier: &str, bytes: &[u8]) -> Result<()>;

  /// Identifiers that currently have an entry.
  fn cached_identifiers(&self) -> Result<Vec<String>>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn read(&self, _identifier: &str) -> Option<Vec<u8>> {
    None // Always miss
  }

  fn write_once(&self, _identifier: &str, _bytes: &[u8]) -> Result<()> {
    Ok(()) // Discard
  }

  fn cached_identifiers(&self) -> Result<Vec<String>> {
    Ok(Vec::new())
  }
}

/// Stores each entry as `allPages.<identifier>.json` inside one directory.
pub struct FileStorage {
  root: PathBuf,
}

impl FileStorage {
  /// Open the cache directory, creating it if needed.
  pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
    let root = root.into();

    std::fs::create_dir_all(&root)
      .map_err(|e| eyre!("Failed to create cache directory {}: {}", root.display(), e))?;

    Ok(Self { root })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Path of the file backing an identifier.
  pub fn path_for(&self, identifier: &str) -> PathBuf {
    self
      .root
      .join(format!("{FILE_PREFIX}{identifier}{FILE_SUFFIX}"))
  }
}

impl CacheStorage for FileStorage {
  fn read(&self, identifier: &str) -> Option<Vec<u8>> {
    std::fs::read(self.path_for(identifier)).ok()
  }

  fn write_once(&self, identifier: &str, bytes: &[u8]) -> Result<()> {
    let path = self.path_for(identifier);

    // Write next to the target, then link into place without clobbering.
    let mut tmp = NamedTempFile::new_in(&self.root)
      .map_err(|e| eyre!("Failed to create temp file in {}: {}", self.root.display(), e))?;
    tmp
      .write_all(bytes)
      .and_then(|()| tmp.as_file().sync_all())
      .map_err(|e| eyre!("Failed to write cache entry {}: {}", path.display(), e))?;
    tmp
      .persist_noclobber(&path)
      .map_err(|e| eyre!("Failed to persist cache entry {}: {}", path.display(), e.error))?;

    Ok(())
  }

  fn cached_identifiers(&self) -> Result<Vec<String>> {
    let entries = std::fs::read_dir(&self.root)
      .map_err(|e| eyre!("Failed to list cache directory {}: {}", self.root.display(), e))?;

    let mut identifiers: Vec<String> = entries
      .filter_map(|entry| entry.ok())
      .filter_map(|entry| entry.file_name().into_string().ok())
      .filter_map(|name| {
        name
          .strip_prefix(FILE_PREFIX)
          .and_then(|rest| rest.strip_suffix(FILE_SUFFIX))
          .map(String::from)
      })
      .collect();
    identifiers.sort();

    Ok(identifiers)
  }
}
