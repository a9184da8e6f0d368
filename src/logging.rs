//! Tracing subscriber setup.

use color_eyre::{eyre::eyre, Result};
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::LogConfig;

/// Install the global subscriber: stderr always, plus a log file if configured.
///
/// `RUST_LOG` overrides the default `info` filter. The returned guard flushes
/// the file writer on drop, so keep it alive until exit.
pub fn init(config: &LogConfig) -> Result<Option<WorkerGuard>> {
  let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

  let stderr_layer = fmt::layer().with_target(false).with_writer(std::io::stderr);

  let (file_layer, guard) = match &config.file {
    Some(path) => {
      let (dir, file_name) = split_log_path(path)?;
      let appender = tracing_appender::rolling::never(dir, file_name);
      let (writer, guard) = tracing_appender::non_blocking(appender);
      let layer = fmt::layer()
        .with_ansi(false)
        .with_target(false)
        .with_writer(writer);
      (Some(layer), Some(guard))
    }
    None => (None, None),
  };

  tracing_subscriber::registry()
    .with(filter)
    .with(stderr_layer)
    .with(file_layer)
    .try_init()
    .map_err(|e| eyre!("Failed to initialize logging: {}", e))?;

  Ok(guard)
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr)> {
  let file_name = path
    .file_name()
    .ok_or_else(|| eyre!("Log file path has no file name: {}", path.display()))?;

  let dir = match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => parent,
    _ => Path::new("."),
  };

  Ok((dir, file_name))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_split_bare_file_name() {
    let (dir, name) = split_log_path(Path::new("wikipages.log")).unwrap();
    assert_eq!(dir, Path::new("."));
    assert_eq!(name, "wikipages.log");
  }

  #[test]
  fn test_split_nested_path() {
    let (dir, name) = split_log_path(Path::new("/var/log/wikipages/run.log")).unwrap();
    assert_eq!(dir, Path::new("/var/log/wikipages"));
    assert_eq!(name, "run.log");
  }

  #[test]
  fn test_split_rejects_directory_only() {
    assert!(split_log_path(Path::new("/")).is_err());
  }
}
