//! Serde-deserializable types matching MediaWiki `list=allpages` responses.
//!
//! These types are separate from domain types so that missing or partial
//! sections deserialize cleanly into empty defaults.

use serde::Deserialize;

use super::error::FetchError;
use super::types::{ContinuationToken, PageDescriptor};

#[derive(Debug, Deserialize, Default)]
pub struct ApiAllPagesResponse {
  #[serde(default, rename = "continue")]
  pub continuation: Option<ApiContinuation>,
  #[serde(default)]
  pub query: Option<ApiAllPagesQuery>,
  /// Present when MediaWiki rejects the request
  #[serde(default)]
  pub error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiContinuation {
  pub apcontinue: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiAllPagesQuery {
  #[serde(default)]
  pub allpages: Vec<PageDescriptor>,
}

#[derive(Debug, Deserialize, Default)]
pub struct ApiErrorBody {
  #[serde(default)]
  pub code: Option<String>,
  #[serde(default)]
  pub info: Option<String>,
}

impl ApiAllPagesResponse {
  /// Parse a raw response body.
  ///
  /// Bodies that are not JSON objects of the expected shape, or that carry a
  /// MediaWiki `error` object, are rejected.
  pub fn parse(bytes: &[u8]) -> Result<Self, FetchError> {
    let mut response: Self = serde_json::from_slice(bytes)?;

    if let Some(error) = response.error.take() {
      return Err(FetchError::Api {
        code: error.code.unwrap_or_else(|| "unknown_error".to_string()),
        info: error.info.unwrap_or_else(|| "unknown info".to_string()),
      });
    }

    Ok(response)
  }

  /// Split into the page list and the cursor for the next page.
  ///
  /// An empty `apcontinue` marks the final page, same as a missing one.
  pub fn into_parts(self) -> (Vec<PageDescriptor>, Option<ContinuationToken>) {
    let pages = self.query.map(|q| q.allpages).unwrap_or_default();
    let next = self
      .continuation
      .and_then(|c| c.apcontinue)
      .filter(|token| !token.is_empty())
      .map(ContinuationToken::new);
    (pages, next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_parse_page_with_continuation() {
    let body = br#"{"batchcomplete":"","continue":{"apcontinue":"B","continue":"-||"},"query":{"allpages":[{"pageid":1,"ns":0,"title":"A1"},{"pageid":2,"ns":0,"title":"A2"}]}}"#;

    let (pages, next) = ApiAllPagesResponse::parse(body).unwrap().into_parts();

    assert_eq!(pages.len(), 2);
    assert_eq!(pages[0].title, "A1");
    assert_eq!(pages[0].pageid, Some(1));
    assert_eq!(pages[1].title, "A2");
    assert_eq!(next, Some(ContinuationToken::new("B")));
  }

  #[test]
  fn test_parse_final_page() {
    let body = br#"{"query":{"allpages":[{"title":"B1"}]}}"#;

    let (pages, next) = ApiAllPagesResponse::parse(body).unwrap().into_parts();

    assert_eq!(pages.len(), 1);
    assert_eq!(next, None);
  }

  #[test]
  fn test_parse_empty_continuation_is_final_page() {
    let body = br#"{"continue":{"apcontinue":""},"query":{"allpages":[{"title":"A1"}]}}"#;

    let (pages, next) = ApiAllPagesResponse::parse(body).unwrap().into_parts();

    assert_eq!(pages.len(), 1);
    assert_eq!(next, None);
  }

  #[test]
  fn test_parse_missing_query_is_empty_batch() {
    let (pages, next) = ApiAllPagesResponse::parse(b"{}").unwrap().into_parts();
    assert!(pages.is_empty());
    assert!(next.is_none());
  }

  #[test]
  fn test_parse_keeps_unknown_fields() {
    let body = br#"{"query":{"allpages":[{"title":"A","redirect":""}]}}"#;

    let (pages, _) = ApiAllPagesResponse::parse(body).unwrap().into_parts();

    assert!(pages[0].extra.contains_key("redirect"));
  }

  #[test]
  fn test_parse_rejects_non_json() {
    let err = ApiAllPagesResponse::parse(b"<html>busy</html>").unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
  }

  #[test]
  fn test_parse_rejects_wrong_shape() {
    let err = ApiAllPagesResponse::parse(br#"{"query":{"allpages":"nope"}}"#).unwrap_err();
    assert!(matches!(err, FetchError::Malformed(_)));
  }

  #[test]
  fn test_parse_surfaces_api_error() {
    let body = br#"{"error":{"code":"ratelimited","info":"Slow down"}}"#;

    let err = ApiAllPagesResponse::parse(body).unwrap_err();

    match err {
      FetchError::Api { code, info } => {
        assert_eq!(code, "ratelimited");
        assert_eq!(info, "Slow down");
      }
      other => panic!("unexpected error: {other:?}"),
    }
  }
}
