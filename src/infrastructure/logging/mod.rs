// Logging module - Logging infrastructure
use crate::domain::config::LoggingConfig;
use crate::domain::error::{GwError, GwResult};
use chrono::Local;
use std::fmt::Write;
use std::fs;
use std::io;
use tracing::Subscriber;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Initialize logging system.
///
/// The console layer logs at `level` unless `RUST_LOG` is set. When
/// `logging.directory` is set a second layer writes to a per-run file there
/// at `logging.file_level`, independent of the console. The returned guard
/// must be kept alive for that file to be flushed.
pub fn init_logging(level: &str, logging: &LoggingConfig) -> GwResult<Option<WorkerGuard>> {
    let (subscriber, guard) = build_subscriber(level, logging)?;
    subscriber.try_init().map_err(|e| GwError::Config {
        message: format!("Failed to install log subscriber: {}", e),
    })?;

    match &logging.directory {
        Some(directory) => tracing::info!(
            "Logging initialized at {} level, {} level to {}",
            level,
            logging.file_level,
            directory.display()
        ),
        None => tracing::info!("Logging initialized at {} level", level),
    }
    Ok(guard)
}

fn build_subscriber(
    level: &str,
    logging: &LoggingConfig,
) -> GwResult<(impl Subscriber + Send + Sync + 'static, Option<WorkerGuard>)> {
    let console_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => crate_filter(level)?,
    };

    let (file_layer, guard) = match &logging.directory {
        Some(directory) => {
            fs::create_dir_all(directory).map_err(|e| GwError::Config {
                message: format!("Failed to create log directory {}: {}", directory.display(), e),
            })?;
            let file_name = log_file_name(&logging.file_pattern)?;
            let appender = tracing_appender::rolling::never(directory, &file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(crate_filter(&logging.file_level)?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let subscriber = tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_level(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(console_filter),
        )
        .with(file_layer);
    Ok((subscriber, guard))
}

/// `level` for this crate, warnings for everything else
fn crate_filter(level: &str) -> GwResult<EnvFilter> {
    EnvFilter::try_new(format!("gwconsole={},warn", level)).map_err(|e| GwError::Config {
        message: format!("Invalid log level '{}': {}", level, e),
    })
}

/// Expand the strftime `pattern` with the current local time
pub fn log_file_name(pattern: &str) -> GwResult<String> {
    let mut name = String::new();
    write!(name, "{}", Local::now().format(pattern)).map_err(|_| GwError::Config {
        message: format!("Invalid log file pattern '{}'", pattern),
    })?;
    Ok(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_file_name_expands_pattern() {
        let name = log_file_name("gateway_ops_%Y%m%d.log").unwrap();
        assert!(name.starts_with("gateway_ops_20"));
        assert!(name.ends_with(".log"));
        assert_eq!(name.len(), "gateway_ops_YYYYMMDD.log".len());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(log_file_name("gateway_%Q.log").is_err());
    }

    fn file_logging(dir: &std::path::Path, file_level: &str) -> LoggingConfig {
        LoggingConfig {
            directory: Some(dir.to_path_buf()),
            file_pattern: "session.log".to_string(),
            file_level: file_level.to_string(),
        }
    }

    #[test]
    fn test_file_records_debug_while_console_is_info() {
        let dir = tempfile::TempDir::new().unwrap();
        let (subscriber, guard) = build_subscriber("info", &file_logging(dir.path(), "debug")).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::debug!("Sent 8 bytes");
            tracing::info!("Connected to 192.168.1.1:23");
        });
        drop(guard);

        let content = fs::read_to_string(dir.path().join("session.log")).unwrap();
        assert!(content.contains("Sent 8 bytes"));
        assert!(content.contains("Connected to 192.168.1.1:23"));
    }

    #[test]
    fn test_file_level_limits_file_records() {
        let dir = tempfile::TempDir::new().unwrap();
        let (subscriber, guard) = build_subscriber("debug", &file_logging(dir.path(), "warn")).unwrap();

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!("Executing: uptime");
            tracing::warn!("Continuing without transcript");
        });
        drop(guard);

        let content = fs::read_to_string(dir.path().join("session.log")).unwrap();
        assert!(!content.contains("Executing: uptime"));
        assert!(content.contains("Continuing without transcript"));
    }

    #[test]
    fn test_invalid_file_level_is_rejected() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(build_subscriber("info", &file_logging(dir.path(), "loud")).is_err());
    }

    #[test]
    fn test_logging_init() {
        // Only the first subscriber in a process can be installed
        let first = init_logging("debug", &LoggingConfig::default());
        assert!(first.is_ok());
        assert!(init_logging("debug", &LoggingConfig::default()).is_err());
    }
}
