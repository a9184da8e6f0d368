//! Resolves one `allpages` batch, cache first, network second.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::cache::{identifier_for, CacheLookup, CacheSource, CacheStorage};

use super::api_types::ApiAllPagesResponse;
use super::error::FetchError;
use super::types::{BatchResult, ContinuationToken};

/// Source of raw `allpages` responses.
pub trait BatchFetcher {
  /// Fetch the raw response body for the batch starting at `token`.
  async fn fetch_batch(&self, token: Option<&ContinuationToken>) -> Result<Vec<u8>, FetchError>;
}

/// Turns a continuation token into a batch of pages.
///
/// Cached responses are authoritative when they parse; otherwise the batch is
/// fetched and the raw body is written back so later runs can skip it.
pub struct BatchResolver<S: ?Sized, F> {
  storage: Arc<S>,
  fetcher: F,
}

impl<S, F> BatchResolver<S, F>
where
  S: CacheStorage + ?Sized,
  F: BatchFetcher,
{
  pub fn new(storage: Arc<S>, fetcher: F) -> Self {
    Self { storage, fetcher }
  }

  #[cfg(test)]
  pub fn fetcher(&self) -> &F {
    &self.fetcher
  }

  fn lookup(&self, identifier: &str) -> CacheLookup<ApiAllPagesResponse> {
    CacheLookup::decode(self.storage.read(identifier), ApiAllPagesResponse::parse)
  }

  /// Resolve the batch starting at `token` (the first batch if none).
  ///
  /// Fails only when the cache has no usable entry and the network
  /// can't produce a valid response either.
  pub async fn resolve(&self, token: Option<&ContinuationToken>) -> Result<BatchResult, FetchError> {
    let identifier = identifier_for(token);

    match self.lookup(&identifier) {
      CacheLookup::Hit(response) => {
        debug!(identifier = %identifier, "Serving batch from cache");
        return Ok(into_batch_result(response, CacheSource::Cache));
      }
      CacheLookup::Miss => {
        debug!(identifier = %identifier, "Cache miss");
      }
      CacheLookup::Corrupt(reason) => {
        warn!(identifier = %identifier, "Ignoring unreadable cache entry: {}", reason);
      }
    }

    let body = self.fetcher.fetch_batch(token).await?;
    let response = ApiAllPagesResponse::parse(&body)?;

    // A failed write only costs a re-fetch on a later run
    if let Err(e) = self.storage.write_once(&identifier, &body) {
      warn!(identifier = %identifier, "Failed to cache batch: {}", e);
    }

    Ok(into_batch_result(response, CacheSource::Network))
  }
}

fn into_batch_result(response: ApiAllPagesResponse, source: CacheSource) -> BatchResult {
  let (items, next) = response.into_parts();
  BatchResult {
    items,
    next,
    source,
  }
}
