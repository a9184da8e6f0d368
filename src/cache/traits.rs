//! Core types for the caching system.

use std::fmt;

/// Indicates where a batch came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fetched over the network during this run
  Network,
  /// Served from a cache entry written by an earlier fetch
  Cache,
}

impl fmt::Display for CacheSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Network => f.write_str("network"),
      Self::Cache => f.write_str("cache"),
    }
  }
}

/// Outcome of looking up and decoding a cache entry.
///
/// `Corrupt` is currently handled like `Miss`, but kept separate so the
/// fallback stays visible in logs and tests.
#[derive(Debug)]
pub enum CacheLookup<T> {
  Hit(T),
  Miss,
  Corrupt(String),
}

impl<T> CacheLookup<T> {
  /// Decode a stored blob, if there was one.
  pub fn decode<E: fmt::Display>(
    blob: Option<Vec<u8>>,
    decoder: impl FnOnce(&[u8]) -> Result<T, E>,
  ) -> Self {
    match blob {
      None => Self::Miss,
      Some(bytes) => match decoder(&bytes) {
        Ok(value) => Self::Hit(value),
        Err(e) => Self::Corrupt(e.to_string()),
      },
    }
  }
}
