use color_eyre::{eyre::eyre, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://runescape.wiki/api.php";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
  #[serde(default)]
  pub wiki: WikiConfig,
  #[serde(default)]
  pub cache: CacheConfig,
  #[serde(default)]
  pub fetch: FetchConfig,
  #[serde(default)]
  pub log: LogConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WikiConfig {
  /// MediaWiki `api.php` endpoint
  #[serde(default = "default_api_url")]
  pub api_url: String,
  #[serde(default = "default_user_agent")]
  pub user_agent: String,
}

impl Default for WikiConfig {
  fn default() -> Self {
    Self {
      api_url: default_api_url(),
      user_agent: default_user_agent(),
    }
  }
}

fn default_api_url() -> String {
  DEFAULT_API_URL.to_string()
}

fn default_user_agent() -> String {
  concat!("wikipages/", env!("CARGO_PKG_VERSION")).to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
  /// Directory holding `allPages.<identifier>.json` entries
  #[serde(default = "default_cache_dir")]
  pub dir: PathBuf,
  /// When false, every batch is fetched from the network and nothing is stored
  #[serde(default = "default_true")]
  pub enabled: bool,
}

impl Default for CacheConfig {
  fn default() -> Self {
    Self {
      dir: default_cache_dir(),
      enabled: true,
    }
  }
}

fn default_cache_dir() -> PathBuf {
  PathBuf::from("__disk__")
}

fn default_true() -> bool {
  true
}

#[derive(Debug, Clone, Deserialize)]
pub struct FetchConfig {
  /// Pause between network round-trips, and before retrying a failed cursor
  #[serde(default = "default_delay_ms")]
  pub delay_ms: u64,
  #[serde(default = "default_timeout_secs")]
  pub timeout_secs: u64,
  #[serde(default)]
  pub retry: RetryConfig,
}

impl Default for FetchConfig {
  fn default() -> Self {
    Self {
      delay_ms: default_delay_ms(),
      timeout_secs: default_timeout_secs(),
      retry: RetryConfig::default(),
    }
  }
}

fn default_delay_ms() -> u64 {
  1000
}

fn default_timeout_secs() -> u64 {
  30
}

impl FetchConfig {
  pub fn delay(&self) -> Duration {
    Duration::from_millis(self.delay_ms)
  }

  pub fn timeout(&self) -> Duration {
    Duration::from_secs(self.timeout_secs)
  }
}

/// How the driver retries a cursor whose batch failed to resolve.
///
/// The defaults retry forever with a fixed delay.
#[derive(Debug, Clone, Deserialize)]
pub struct RetryConfig {
  /// Consecutive failures of one cursor before giving up (unbounded if unset)
  #[serde(default)]
  pub max_attempts: Option<u32>,
  /// Growth of the retry delay per consecutive failure (1 = fixed delay)
  #[serde(default = "default_backoff_factor")]
  pub backoff_factor: u32,
  /// Upper bound on the grown retry delay
  #[serde(default = "default_max_delay_ms")]
  pub max_delay_ms: u64,
}

impl Default for RetryConfig {
  fn default() -> Self {
    Self {
      max_attempts: None,
      backoff_factor: default_backoff_factor(),
      max_delay_ms: default_max_delay_ms(),
    }
  }
}

fn default_backoff_factor() -> u32 {
  1
}

fn default_max_delay_ms() -> u64 {
  60_000
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogConfig {
  /// Also write logs to this file
  pub file: Option<PathBuf>,
}

impl Config {
  /// Load configuration from file.
  ///
  /// Search order:
  /// 1. Explicit path if provided
  /// 2. ./wikipages.yaml (current directory)
  /// 3. $XDG_CONFIG_HOME/wikipages/config.yaml
  ///
  /// Falls back to built-in defaults when no file exists. The
  /// WIKIPAGES_API_URL environment variable overrides the API URL.
  pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
    let path = if let Some(p) = explicit_path {
      if p.exists() {
        Some(p.to_path_buf())
      } else {
        return Err(eyre!("Config file not found: {}", p.display()));
      }
    } else {
      Self::find_config_file()
    };

    let mut config = match path {
      Some(p) => Self::load_from_path(&p)?,
      None => Self::default(),
    };

    if let Some(url) = Self::api_url_from_env() {
      config.wiki.api_url = url;
    }

    config.validate()?;
    Ok(config)
  }

  fn find_config_file() -> Option<PathBuf> {
    // Check current directory
    let local = PathBuf::from("wikipages.yaml");
    if local.exists() {
      return Some(local);
    }

    // Check XDG config directory
    if let Some(config_dir) = dirs::config_dir() {
      let xdg_path = config_dir.join("wikipages").join("config.yaml");
      if xdg_path.exists() {
        return Some(xdg_path);
      }
    }

    None
  }

  fn load_from_path(path: &Path) -> Result<Self> {
    let contents = std::fs::read_to_string(path)
      .map_err(|e| eyre!("Failed to read config file {}: {}", path.display(), e))?;

    Self::from_yaml(&contents)
      .map_err(|e| eyre!("Failed to parse config file {}: {}", path.display(), e))
  }

  fn from_yaml(contents: &str) -> Result<Self> {
    // An empty file means "all defaults"
    if contents.trim().is_empty() {
      return Ok(Self::default());
    }

    Ok(serde_yaml::from_str(contents)?)
  }

  fn api_url_from_env() -> Option<String> {
    std::env::var("WIKIPAGES_API_URL")
      .ok()
      .filter(|url| !url.trim().is_empty())
  }

  /// Reject settings the crawler cannot work with.
  pub fn validate(&self) -> Result<()> {
    url::Url::parse(&self.wiki.api_url)
      .map_err(|e| eyre!("Invalid wiki.api_url '{}': {}", self.wiki.api_url, e))?;

    if self.fetch.retry.backoff_factor == 0 {
      return Err(eyre!("fetch.retry.backoff_factor must be at least 1"));
    }
    if self.fetch.retry.max_attempts == Some(0) {
      return Err(eyre!("fetch.retry.max_attempts must be at least 1"));
    }

    Ok(())
  }
}
