use thiserror::Error;

/// Failure to produce a batch from the network.
///
/// Cache problems never show up here: unreadable or corrupt entries are
/// treated as misses and failed writes are only logged.
#[derive(Debug, Error)]
pub enum FetchError {
  #[error("request failed: {0}")]
  Network(#[from] reqwest::Error),

  #[error("unexpected HTTP status {status} from {url}")]
  Status { status: u16, url: String },

  #[error("malformed allpages response: {0}")]
  Malformed(#[from] serde_json::Error),

  #[error("API error [{code}]: {info}")]
  Api { code: String, info: String },

  #[error("giving up on cursor {cursor} after {attempts} failed attempts")]
  RetriesExhausted {
    cursor: String,
    attempts: u32,
    #[source]
    source: Box<FetchError>,
  },
}
