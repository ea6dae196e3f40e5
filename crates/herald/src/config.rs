use crate::error::{HeraldError, HeraldErrorExt};
use config::{Config, Environment, File, Map};
use herald_event_bus::BusConfig;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::rolling::Rotation;

/// Prefix of environment overrides (`HERALD__BUS__DUPLICATE_REGISTRATION=reject`).
pub const ENV_PREFIX: &str = "HERALD";
/// Separates nesting levels in environment override names.
pub const ENV_SEPARATOR: &str = "__";

const DEFAULT_LOG_NAME: &str = "herald";
const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_MAX_FILES: usize = 10;

/// Top-level settings of a program built on the event bus.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct HeraldConfig {
    pub bus: BusConfig,
    pub logging: LoggingConfig,
}

impl HeraldConfig {
    /// Loads the config from `path` (if any) with `HERALD__*` environment overrides on top.
    ///
    /// # Errors
    /// See [`load_config`].
    pub fn load(path: Option<impl AsRef<Path>>) -> Result<Self, HeraldError> {
        load_config(path)
    }
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogRotation {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<LogRotation> for Rotation {
    fn from(rotation: LogRotation) -> Self {
        match rotation {
            LogRotation::Minutely => Self::MINUTELY,
            LogRotation::Hourly => Self::HOURLY,
            LogRotation::Daily => Self::DAILY,
            LogRotation::Never => Self::NEVER,
        }
    }
}

/// Settings consumed by [`logging::init`](crate::logging::init).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file prefix (`<name>.<date>.log`).
    pub name: String,
    /// Default level when no directive matches (`trace`..`error`, `off`).
    pub level: String,
    /// Extra `EnvFilter` directives, e.g. `herald_event_bus=trace`.
    pub filter: Option<String>,
    pub console: bool,
    /// Writes the file output as JSON lines.
    pub json: bool,
    /// Enables the rolling file output when set.
    pub directory: Option<PathBuf>,
    pub rotation: LogRotation,
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            name: DEFAULT_LOG_NAME.to_owned(),
            level: DEFAULT_LOG_LEVEL.to_owned(),
            filter: None,
            console: true,
            json: false,
            directory: None,
            rotation: LogRotation::default(),
            max_files: DEFAULT_MAX_FILES,
        }
    }
}

/// Layered configuration loader.
///
/// 1. **File** (optional): `path` is read with the format implied by its
///    extension (`.toml`, `.json`, `.yaml`, ...). A given path must exist.
/// 2. **Environment**: variables prefixed with `HERALD__` override the file;
///    nested keys are separated by `__` (`HERALD__LOGGING__LEVEL=debug` maps to
///    `logging.level`).
///
/// Fields absent from every layer take their serde defaults.
///
/// # Errors
/// Returns [`HeraldError::Config`] when the file is missing or malformed, or
/// when the merged values do not deserialize into `T`.
///
/// # Example
/// ```rust
/// use herald::config::{HeraldConfig, load_config};
/// use std::path::Path;
///
/// let cfg: HeraldConfig = load_config(None::<&Path>).unwrap_or_default();
/// assert!(cfg.logging.console);
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, HeraldError>
where
    T: DeserializeOwned,
{
    load_layered(path.as_ref().map(|p| p.as_ref()), None)
}

/// `env` replaces the process environment when given.
fn load_layered<T>(path: Option<&Path>, env: Option<Map<String, String>>) -> Result<T, HeraldError>
where
    T: DeserializeOwned,
{
    let mut builder = Config::builder();
    if let Some(path) = path {
        info!("Loading config from {}", path.display());
        builder = builder.add_source(File::from(path).required(true));
    }

    builder
        .add_source(Environment::with_prefix(ENV_PREFIX).separator(ENV_SEPARATOR).source(env))
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")
}
