//! Write-once response cache.
//!
//! This module provides the persistence side of the crawler:
//! - Derives a stable identifier from each continuation token
//! - Stores raw API responses as individual files, never overwriting them
//! - Classifies lookups as hit, miss or corrupt entry

mod key;
mod storage;
mod traits;

pub use key::{identifier_for, token_for};
pub use storage::{CacheStorage, FileStorage, NoopStorage};
pub use traits::{CacheLookup, CacheSource};
