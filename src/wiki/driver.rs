//! Pull-based pagination over the `allpages` listing.

use futures::Stream;
use std::time::Duration;
use tracing::{debug, error};

use crate::cache::{CacheSource, CacheStorage};
use crate::config::FetchConfig;

use super::error::FetchError;
use super::resolver::{BatchFetcher, BatchResolver};
use super::types::{ContinuationToken, FetchedBatch};

/// Pacing and retry behaviour of the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
  /// Pause between network round-trips and before the first retry
  pub delay: Duration,
  /// Growth of the retry pause per consecutive failure (1 = fixed)
  pub backoff_factor: u32,
  pub max_delay: Duration,
  /// Consecutive failures of one cursor before giving up (unbounded if unset)
  pub max_attempts: Option<u32>,
}

impl RetryPolicy {
  /// Fixed delay, unbounded retries.
  pub fn fixed(delay: Duration) -> Self {
    Self {
      delay,
      backoff_factor: 1,
      max_delay: delay,
      max_attempts: None,
    }
  }

  pub fn from_config(config: &FetchConfig) -> Self {
    Self {
      delay: config.delay(),
      backoff_factor: config.retry.backoff_factor.max(1),
      max_delay: Duration::from_millis(config.retry.max_delay_ms),
      max_attempts: config.retry.max_attempts,
    }
  }

  /// Pause before retrying after `failures` consecutive failures (at least 1).
  pub fn retry_delay(&self, failures: u32) -> Duration {
    if self.backoff_factor <= 1 {
      return self.delay;
    }

    let exponent = failures.saturating_sub(1);
    let scale = self.backoff_factor.saturating_pow(exponent);
    self.delay.saturating_mul(scale).min(self.max_delay.max(self.delay))
  }

  fn exhausted(&self, failures: u32) -> bool {
    self.max_attempts.is_some_and(|max| failures >= max)
  }
}

/// Result of pulling the driver once.
#[derive(Debug)]
pub enum DriverStep {
  Batch(FetchedBatch),
  Done,
}

#[derive(Debug)]
enum DriverState {
  Start,
  Fetching {
    cursor: Option<ContinuationToken>,
    /// Pause to take before the next resolve
    pause: Option<Duration>,
  },
  Done,
}

/// Walks the continuation chain one batch per pull until the API reports
/// no further pages.
///
/// A failed batch is logged and retried with the same cursor; the cursor
/// only advances on success. Single pass: once `Done`, it stays `Done`.
pub struct PaginationDriver<S: ?Sized, F> {
  resolver: BatchResolver<S, F>,
  policy: RetryPolicy,
  state: DriverState,
  /// Batches yielded so far
  batches: usize,
  /// Consecutive failures of the current cursor
  failures: u32,
}

impl<S, F> PaginationDriver<S, F>
where
  S: CacheStorage + ?Sized,
  F: BatchFetcher,
{
  pub fn new(resolver: BatchResolver<S, F>, policy: RetryPolicy) -> Self {
    Self {
      resolver,
      policy,
      state: DriverState::Start,
      batches: 0,
      failures: 0,
    }
  }

  #[cfg(test)]
  pub fn resolver(&self) -> &BatchResolver<S, F> {
    &self.resolver
  }

  #[cfg(test)]
  pub fn is_done(&self) -> bool {
    matches!(self.state, DriverState::Done)
  }

  /// Produce the next batch, or `Done` once the last page has been yielded.
  ///
  /// Under an unbounded retry policy this never returns an error. With
  /// `max_attempts` set, it returns `RetriesExhausted` once and is `Done`
  /// afterwards.
  pub async fn next_step(&mut self) -> Result<DriverStep, FetchError> {
    loop {
      let (cursor, pause) = match &self.state {
        DriverState::Done => return Ok(DriverStep::Done),
        DriverState::Start => (None, None),
        DriverState::Fetching { cursor, pause } => (cursor.clone(), *pause),
      };

      if let Some(pause) = pause {
        tokio::time::sleep(pause).await;
      }

      let index = self.batches + 1;

      match self.resolver.resolve(cursor.as_ref()).await {
        Ok(result) => {
          self.batches = index;
          self.failures = 0;

          self.state = match result.next {
            None => {
              debug!(batches = index, "Reached the last page");
              DriverState::Done
            }
            Some(next) => DriverState::Fetching {
              cursor: Some(next),
              // No round-trip happened for cached batches, so no need to wait
              pause: (result.source == CacheSource::Network).then_some(self.policy.delay),
            },
          };

          return Ok(DriverStep::Batch(FetchedBatch {
            index,
            cursor,
            items: result.items,
            source: result.source,
          }));
        }
        Err(e) => {
          self.failures += 1;
          let label = cursor_label(cursor.as_ref());

          error!(
            batch = index,
            cursor = %label,
            attempt = self.failures,
            "Failed to fetch batch {} at cursor {}: {}",
            index,
            label,
            e
          );

          if self.policy.exhausted(self.failures) {
            self.state = DriverState::Done;
            return Err(FetchError::RetriesExhausted {
              cursor: label,
              attempts: self.failures,
              source: Box::new(e),
            });
          }

          self.state = DriverState::Fetching {
            cursor,
            pause: Some(self.policy.retry_delay(self.failures)),
          };
        }
      }
    }
  }

  /// Adapt the driver into a stream of batches that ends after the last page.
  pub fn into_stream(self) -> impl Stream<Item = Result<FetchedBatch, FetchError>> {
    futures::stream::unfold(self, |mut driver| async move {
      match driver.next_step().await {
        Ok(DriverStep::Batch(batch)) => Some((Ok(batch), driver)),
        Ok(DriverStep::Done) => None,
        Err(e) => Some((Err(e), driver)),
      }
    })
  }
}

/// Human-readable cursor for logs; the first page has no token.
fn cursor_label(cursor: Option<&ContinuationToken>) -> String {
  cursor.map_or_else(|| "<start>".to_string(), ToString::to_string)
}
