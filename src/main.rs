mod cache;
mod config;
mod logging;
mod wiki;

use clap::Parser;
use color_eyre::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

use cache::{CacheStorage, FileStorage, NoopStorage};
use config::{CacheConfig, Config};
use wiki::{BatchResolver, CrawlSummary, PaginationDriver, RetryPolicy, WikiClient};

#[derive(Parser, Debug)]
#[command(name = "wikipages")]
#[command(about = "Fetch the full allpages listing of a MediaWiki site, caching every batch")]
#[command(version)]
struct Args {
  /// Path to config file (default: ./wikipages.yaml or $XDG_CONFIG_HOME/wikipages/config.yaml)
  #[arg(short, long)]
  config: Option<PathBuf>,

  /// MediaWiki api.php endpoint
  #[arg(long)]
  api_url: Option<String>,

  /// Directory for cached batches
  #[arg(long)]
  cache_dir: Option<PathBuf>,

  /// Fetch everything from the network and store nothing
  #[arg(long)]
  no_cache: bool,

  /// Pause between network requests, in milliseconds
  #[arg(long)]
  delay_ms: Option<u64>,
}

impl Args {
  /// Command-line flags take precedence over the config file.
  fn apply(&self, mut config: Config) -> Config {
    if let Some(url) = &self.api_url {
      config.wiki.api_url = url.clone();
    }
    if let Some(dir) = &self.cache_dir {
      config.cache.dir = dir.clone();
    }
    if self.no_cache {
      config.cache.enabled = false;
    }
    if let Some(delay_ms) = self.delay_ms {
      config.fetch.delay_ms = delay_ms;
    }
    config
  }
}

#[tokio::main]
async fn main() -> Result<()> {
  color_eyre::install()?;

  let args = Args::parse();

  // Load configuration
  let config = args.apply(Config::load(args.config.as_deref())?);
  config.validate()?;

  let _log_guard = logging::init(&config.log)?;

  run(&config).await?;

  Ok(())
}

/// Crawl the whole listing described by `config`.
async fn run(config: &Config) -> Result<CrawlSummary> {
  let client = WikiClient::new(&config.wiki, config.fetch.timeout())?;
  let storage = open_storage(&config.cache)?;

  let resolver = BatchResolver::new(storage, client);
  let driver = PaginationDriver::new(resolver, RetryPolicy::from_config(&config.fetch));

  let summary = wiki::fetch_all_pages(driver, |_| {}).await?;
  Ok(summary)
}

fn open_storage(config: &CacheConfig) -> Result<Arc<dyn CacheStorage>> {
  if !config.enabled {
    warn!("Caching disabled, every batch will be fetched from the network");
    return Ok(Arc::new(NoopStorage));
  }

  let storage = FileStorage::open(&config.dir)?;

  let identifiers = storage.cached_identifiers()?;
  let known = identifiers
    .iter()
    .filter(|id| cache::token_for(id).is_some())
    .count();
  info!(dir = %storage.root().display(), "{} batches already cached", known);
  if known < identifiers.len() {
    warn!(
      "{} cache files have names that don't map to a continuation token",
      identifiers.len() - known
    );
  }

  Ok(Arc::new(storage))
}
