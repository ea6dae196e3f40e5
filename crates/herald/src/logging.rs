//! Global `tracing` subscriber driven by [`LoggingConfig`].

use crate::config::LoggingConfig;
use crate::error::{HeraldError, HeraldErrorExt};
use std::fs;
use std::str::FromStr;
use tracing::level_filters::LevelFilter;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::RollingFileAppender;
use tracing_subscriber::fmt::layer;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

const LOG_FILE_SUFFIX: &str = "log";

/// Keeps the non-blocking file writer alive.
///
/// Hold it for the lifetime of the program: dropping it flushes and stops the
/// background worker, after which file output is lost.
#[must_use = "Dropping this guard stops the background log writer."]
#[derive(Debug)]
pub struct LoggingGuard {
    guard: Option<WorkerGuard>,
}

impl LoggingGuard {
    /// `true` when a rolling file output is attached.
    #[must_use]
    pub const fn has_file_output(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for LoggingGuard {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!("Logging system shutting down, flushing buffers...");
        }
    }
}

/// Installs the global subscriber described by `config`.
///
/// The filter starts from `config.level`, adds `config.filter` directives when
/// present, and otherwise honours `RUST_LOG`. A compact console layer and a
/// non-blocking rolling file layer (plain or JSON) are attached as configured.
///
/// # Errors
/// * [`HeraldError::InvalidConfiguration`] for an unknown level, a malformed
///   filter, `max_files == 0`, an empty file name or no enabled output.
/// * [`HeraldError::Io`] / [`HeraldError::Appender`] when the log directory
///   cannot be prepared.
/// * [`HeraldError::Subscriber`] when a global subscriber is already set.
pub fn init(config: &LoggingConfig) -> Result<LoggingGuard, HeraldError> {
    let level = validate_config(config)?;
    let env_filter = build_env_filter(level, config.filter.as_deref())?;

    let mut layers = Vec::new();
    if config.console {
        layers.push(layer().compact().with_ansi(true).boxed());
    }

    let guard = if let Some(directory) = &config.directory {
        fs::create_dir_all(directory)
            .context(format!("Failed to create log directory {}", directory.display()))?;

        let appender = RollingFileAppender::builder()
            .rotation(config.rotation.into())
            .filename_prefix(&config.name)
            .filename_suffix(LOG_FILE_SUFFIX)
            .max_log_files(config.max_files)
            .build(directory)?;
        let (writer, guard) = tracing_appender::non_blocking(appender);

        let file_layer = layer().with_writer(writer).with_ansi(false);
        layers.push(if config.json { file_layer.json().boxed() } else { file_layer.boxed() });
        Some(guard)
    } else {
        None
    };

    if layers.is_empty() {
        return Err(HeraldError::InvalidConfiguration {
            message: "No logging output enabled. Enable the console or set a directory.".into(),
            context: None,
        });
    }

    tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init()
        .context("Installing the global subscriber")?;

    Ok(LoggingGuard { guard })
}

fn validate_config(config: &LoggingConfig) -> Result<LevelFilter, HeraldError> {
    let level = LevelFilter::from_str(&config.level).map_err(|e| {
        HeraldError::InvalidConfiguration {
            message: format!("Unknown log level '{}': {e}", config.level).into(),
            context: None,
        }
    })?;

    if config.directory.is_some() {
        if config.name.trim().is_empty() {
            return Err(HeraldError::InvalidConfiguration {
                message: "Log file name cannot be empty".into(),
                context: None,
            });
        }
        if config.max_files == 0 {
            return Err(HeraldError::InvalidConfiguration {
                message: "max_files must be greater than zero".into(),
                context: None,
            });
        }
    }

    Ok(level)
}

fn build_env_filter(level: LevelFilter, directives: Option<&str>) -> Result<EnvFilter, HeraldError> {
    let builder = EnvFilter::builder().with_default_directive(level.into());
    directives.map_or_else(
        || Ok(builder.from_env_lossy()),
        |filter| {
            builder.parse(filter).map_err(|e| HeraldError::InvalidConfiguration {
                message: format!("Invalid env filter '{filter}': {e}").into(),
                context: None,
            })
        },
    )
}
