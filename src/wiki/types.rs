use serde::Deserialize;
use std::fmt;

use crate::cache::CacheSource;

/// Opaque cursor returned by the API pointing at the next page of results.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContinuationToken(String);

impl ContinuationToken {
  pub fn new(value: impl Into<String>) -> Self {
    Self(value.into())
  }

  pub fn as_str(&self) -> &str {
    &self.0
  }
}

impl fmt::Display for ContinuationToken {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// One entry of an `allpages` listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PageDescriptor {
  pub title: String,
  #[serde(default)]
  pub pageid: Option<u64>,
  #[serde(default)]
  pub ns: Option<i64>,
  /// Provider-defined fields we don't model, kept verbatim
  #[serde(flatten)]
  pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Pages returned by a single API call or cache read, in API order.
pub type PageBatch = Vec<PageDescriptor>;

/// A resolved batch together with the cursor for the following one.
#[derive(Debug, Clone)]
pub struct BatchResult {
  pub items: PageBatch,
  /// `None` on the final page
  pub next: Option<ContinuationToken>,
  pub source: CacheSource,
}

/// A batch handed out by the pagination driver.
#[derive(Debug, Clone)]
pub struct FetchedBatch {
  /// 1-based position of this batch in the run
  pub index: usize,
  /// Cursor the batch was fetched with (`None` for the first page)
  pub cursor: Option<ContinuationToken>,
  pub items: PageBatch,
  pub source: CacheSource,
}

impl FetchedBatch {
  pub fn first_title(&self) -> Option<&str> {
    self.items.first().map(|p| p.title.as_str())
  }

  pub fn last_title(&self) -> Option<&str> {
    self.items.last().map(|p| p.title.as_str())
  }
}
