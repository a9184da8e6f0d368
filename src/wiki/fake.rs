//! Scripted in-memory wiki used by resolver and driver tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::error::FetchError;
use super::resolver::BatchFetcher;
use super::types::ContinuationToken;

#[derive(Clone)]
enum Scripted {
  Body(String),
  Fail,
}

/// Serves scripted responses per continuation token and records every call.
///
/// Each token has a queue of responses; the last one repeats once the queue
/// is down to a single entry. Unscripted tokens fail.
#[derive(Default)]
pub struct FakeWiki {
  responses: Mutex<HashMap<Option<String>, VecDeque<Scripted>>>,
  calls: Mutex<Vec<Option<String>>>,
}

impl FakeWiki {
  pub fn new() -> Self {
    Self::default()
  }

  fn push(self, token: Option<&str>, response: Scripted) -> Self {
    self
      .responses
      .lock()
      .unwrap()
      .entry(token.map(String::from))
      .or_default()
      .push_back(response);
    self
  }

  pub fn page(self, token: Option<&str>, body: &str) -> Self {
    self.push(token, Scripted::Body(body.to_string()))
  }

  pub fn failure(self, token: Option<&str>) -> Self {
    self.push(token, Scripted::Fail)
  }

  /// Tokens requested so far, in order
  pub fn calls(&self) -> Vec<Option<String>> {
    self.calls.lock().unwrap().clone()
  }
}

impl BatchFetcher for FakeWiki {
  async fn fetch_batch(&self, token: Option<&ContinuationToken>) -> Result<Vec<u8>, FetchError> {
    let key = token.map(|t| t.as_str().to_string());
    self.calls.lock().unwrap().push(key.clone());

    let scripted = {
      let mut responses = self.responses.lock().unwrap();
      match responses.get_mut(&key) {
        Some(queue) if queue.len() > 1 => queue.pop_front(),
        Some(queue) => queue.front().cloned(),
        None => None,
      }
    };

    match scripted {
      Some(Scripted::Body(body)) => Ok(body.into_bytes()),
      Some(Scripted::Fail) => Err(FetchError::Status {
        status: 503,
        url: format!("fake://allpages/{}", key.unwrap_or_default()),
      }),
      None => Err(FetchError::Status {
        status: 404,
        url: format!("fake://allpages/{}", key.unwrap_or_default()),
      }),
    }
  }
}

/// Build an `allpages` response body.
pub fn page_body(titles: &[&str], next: Option<&str>) -> String {
  let pages: Vec<serde_json::Value> = titles
    .iter()
    .map(|title| serde_json::json!({ "ns": 0, "title": title }))
    .collect();

  let mut body = serde_json::json!({
    "batchcomplete": "",
    "query": { "allpages": pages },
  });
  if let Some(next) = next {
    body["continue"] = serde_json::json!({ "apcontinue": next, "continue": "-||" });
  }

  body.to_string()
}
