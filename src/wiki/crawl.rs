use futures::{pin_mut, StreamExt};
use tracing::info;

use crate::cache::{CacheSource, CacheStorage};

use super::driver::PaginationDriver;
use super::error::FetchError;
use super::resolver::BatchFetcher;
use super::types::FetchedBatch;

/// Totals for one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
  pub batches: usize,
  pub pages: usize,
  pub from_cache: usize,
  pub from_network: usize,
}

impl CrawlSummary {
  fn record(&mut self, batch: &FetchedBatch) {
    self.batches += 1;
    self.pages += batch.items.len();
    match batch.source {
      CacheSource::Cache => self.from_cache += 1,
      CacheSource::Network => self.from_network += 1,
    }
  }
}

/// One progress line per batch, naming its first and last page.
pub fn progress_line(batch: &FetchedBatch) -> String {
  match (batch.first_title(), batch.last_title()) {
    (Some(first), Some(last)) => format!(
      "Fetched batch {}: Starting page: {} / Ending page: {}",
      batch.index, first, last
    ),
    _ => format!("Fetched batch {}: no pages", batch.index),
  }
}

/// Drain the driver until the listing is exhausted, logging progress.
///
/// Every batch is handed to `on_batch` as it arrives.
pub async fn fetch_all_pages<S, F>(
  driver: PaginationDriver<S, F>,
  mut on_batch: impl FnMut(&FetchedBatch),
) -> Result<CrawlSummary, FetchError>
where
  S: CacheStorage + ?Sized,
  F: BatchFetcher,
{
  let mut summary = CrawlSummary::default();

  let stream = driver.into_stream();
  pin_mut!(stream);

  while let Some(batch) = stream.next().await {
    let batch = batch?;
    info!(source = %batch.source, "{}", progress_line(&batch));
    summary.record(&batch);
    on_batch(&batch);
  }

  info!(
    "Finished: {} batches, {} pages ({} from cache, {} from network)",
    summary.batches, summary.pages, summary.from_cache, summary.from_network
  );

  Ok(summary)
}
