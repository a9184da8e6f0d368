use color_eyre::{eyre::eyre, Result};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::config::WikiConfig;

use super::error::FetchError;
use super::resolver::BatchFetcher;
use super::types::ContinuationToken;

/// HTTP client for the MediaWiki `list=allpages` query
#[derive(Clone)]
pub struct WikiClient {
  client: Client,
  api_url: Url,
}

impl WikiClient {
  pub fn new(config: &WikiConfig, timeout: Duration) -> Result<Self> {
    let api_url = Url::parse(&config.api_url)
      .map_err(|e| eyre!("Invalid wiki API URL {}: {}", config.api_url, e))?;

    let client = Client::builder()
      .timeout(timeout)
      .user_agent(config.user_agent.clone())
      .gzip(true)
      .deflate(true)
      .build()
      .map_err(|e| eyre!("Failed to create HTTP client: {}", e))?;

    Ok(Self { client, api_url })
  }

  /// URL of the `allpages` batch starting at `token` (the first batch if none)
  pub fn all_pages_url(&self, token: Option<&ContinuationToken>) -> Url {
    let mut url = self.api_url.clone();
    {
      let mut query = url.query_pairs_mut();
      query
        .append_pair("action", "query")
        .append_pair("list", "allpages")
        .append_pair("aplimit", "max")
        .append_pair("format", "json");
      if let Some(token) = token {
        query.append_pair("apcontinue", token.as_str());
      }
    }
    url
  }
}

impl BatchFetcher for WikiClient {
  async fn fetch_batch(&self, token: Option<&ContinuationToken>) -> Result<Vec<u8>, FetchError> {
    let url = self.all_pages_url(token);

    info!("Fetching batch of pages from: {}", url);

    let response = self.client.get(url.clone()).send().await?;
    let status = response.status();

    if !status.is_success() {
      return Err(FetchError::Status {
        status: status.as_u16(),
        url: url.to_string(),
      });
    }

    let body = response.bytes().await?;
    debug!("Fetched {} bytes from {}", body.len(), url);

    Ok(body.to_vec())
  }
}
