//! Store: builds the engine and the facade from configuration.
//!
//! Loads configuration from files and environment variables.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

use crate::engine::{Core, Encoder, Engine, IoCore, TracingCore};
use crate::error::{LogError, LogResult};
use crate::factory::Factory;
use crate::level::Level;
use crate::logger::Logger;

/// Where records go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Output {
    /// Console encoder on stdout.
    #[default]
    Console,
    /// JSON encoder on a rotating file.
    File,
    /// Events on the installed `tracing` subscriber.
    Tracing,
}

/// How often the log file rolls over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RotationPeriod {
    Minutely,
    Hourly,
    #[default]
    Daily,
    Never,
}

impl From<RotationPeriod> for Rotation {
    fn from(period: RotationPeriod) -> Self {
        match period {
            RotationPeriod::Minutely => Rotation::MINUTELY,
            RotationPeriod::Hourly => Rotation::HOURLY,
            RotationPeriod::Daily => Rotation::DAILY,
            RotationPeriod::Never => Rotation::NEVER,
        }
    }
}

/// Rotating file settings.
#[derive(Debug, Clone, Deserialize)]
pub struct RotationConfig {
    /// Directory the log files live in.
    pub directory: PathBuf,
    /// File name prefix.
    #[serde(default = "default_file_name", alias = "fileName")]
    pub file_name: String,
    /// File name suffix.
    #[serde(default = "default_file_suffix", alias = "fileSuffix")]
    pub file_suffix: String,
    #[serde(default)]
    pub period: RotationPeriod,
    /// Rotated files to keep; unlimited when unset.
    #[serde(default, alias = "maxFiles")]
    pub max_files: Option<usize>,
}

fn default_file_name() -> String {
    "app".to_string()
}

fn default_file_suffix() -> String {
    "log".to_string()
}

fn default_level() -> String {
    "info".to_string()
}

fn default_stack_level() -> String {
    "error".to_string()
}

impl RotationConfig {
    fn appender(&self) -> LogResult<RollingFileAppender> {
        let mut builder = RollingFileAppender::builder()
            .rotation(self.period.into())
            .filename_prefix(self.file_name.as_str())
            .filename_suffix(self.file_suffix.as_str());
        if let Some(max_files) = self.max_files {
            builder = builder.max_log_files(max_files);
        }

        builder
            .build(&self.directory)
            .map_err(|e| LogError::Rotation(e.to_string()))
    }
}

/// Rotating file section in the lumberjack layout.
///
/// `filename` is split into directory, prefix and suffix, and `maxbackups`
/// becomes the retained file count. Files roll daily: `maxsize` (megabytes)
/// and `maxage` (days) are read but not enforced.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LumberjackConfig {
    /// Log file path. Empty means `<process>-lumberjack.log` in the temp directory.
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub maxsize: u64,
    #[serde(default)]
    pub maxage: u64,
    /// Old files to keep; 0 keeps all of them.
    #[serde(default)]
    pub maxbackups: usize,
}

impl LumberjackConfig {
    /// The equivalent daily rotation settings.
    pub fn to_rotation(&self) -> LogResult<RotationConfig> {
        let path = if self.filename.is_empty() {
            std::env::temp_dir().join(format!("{}-lumberjack.log", process_name()))
        } else {
            PathBuf::from(&self.filename)
        };

        let prefix = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .ok_or_else(|| LogError::Rotation(format!("no file name in `{}`", path.display())))?;
        let suffix = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        let directory = path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

        Ok(RotationConfig {
            directory,
            file_name: prefix.to_string(),
            file_suffix: suffix.to_string(),
            period: RotationPeriod::Daily,
            max_files: (self.maxbackups > 0).then_some(self.maxbackups),
        })
    }
}

fn process_name() -> String {
    let arg0 = std::env::args().next().unwrap_or_default();
    Path::new(&arg0)
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("ctxlog")
        .to_string()
}

/// Logger configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Minimum level written. Unrecognized text means `info`.
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default)]
    pub output: Output,
    /// Minimum level that carries a stacktrace. Unrecognized text means `info`.
    #[serde(default = "default_stack_level", alias = "stackLevel")]
    pub stack_level: String,
    /// Structured stacktraces instead of text blobs.
    #[serde(default, alias = "jsonStacktrace")]
    pub json_stacktrace: bool,
    /// Rotating file settings for `output: file`.
    #[serde(default)]
    pub rotation: Option<RotationConfig>,
    /// Legacy rotating file section, used when `rotation` is absent.
    #[serde(default)]
    pub lumberjack: Option<LumberjackConfig>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            output: Output::Console,
            stack_level: default_stack_level(),
            json_stacktrace: false,
            rotation: None,
            lumberjack: None,
        }
    }
}

impl StoreConfig {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (CTXLOG__*)
    /// 2. config/logging.{yaml,toml,json} (if exists)
    pub fn load() -> LogResult<Self> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/logging").required(false))
            .add_source(
                Environment::with_prefix("CTXLOG")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Rotation settings for file output. `rotation` wins over `lumberjack`.
    pub fn file_rotation(&self) -> LogResult<RotationConfig> {
        match (&self.rotation, &self.lumberjack) {
            (Some(rotation), _) => Ok(rotation.clone()),
            (None, Some(lumberjack)) => {
                if lumberjack.maxsize > 0 || lumberjack.maxage > 0 {
                    tracing::warn!(
                        maxsize = lumberjack.maxsize,
                        maxage = lumberjack.maxage,
                        "Size and age limits are not enforced, rotating daily"
                    );
                }
                lumberjack.to_rotation()
            }
            (None, None) => Err(LogError::MissingRotation),
        }
    }
}

/// Opened sink plus the settings needed to build loggers on it.
pub struct Store {
    cfg: StoreConfig,
    level: Level,
    core: Arc<dyn Core>,
}

impl Store {
    /// Open the configured output.
    pub fn new(cfg: StoreConfig) -> LogResult<Self> {
        let level = Level::from_text(&cfg.level);

        let core: Arc<dyn Core> = match cfg.output {
            Output::Console => Arc::new(IoCore::new(Encoder::console(), io::stdout(), level)),
            Output::File => {
                let rotation = cfg.file_rotation()?;
                Arc::new(IoCore::new(Encoder::json(), rotation.appender()?, level))
            }
            Output::Tracing => Arc::new(TracingCore::new(level)),
        };

        tracing::debug!(
            output = ?cfg.output,
            level = %level,
            stack_level = %cfg.stack_level,
            "Log store initialized"
        );

        Ok(Self { cfg, level, core })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.cfg
    }

    /// Effective minimum level.
    pub fn level(&self) -> Level {
        self.level
    }

    /// An engine on this store's output, reporting call sites.
    pub fn engine(&self) -> Engine {
        Engine::new(self.core.clone()).with_caller(true)
    }

    /// The facade, with the configured stack threshold and format.
    pub fn logger(&self) -> Logger {
        Logger::new(self.engine())
            .with_stack_level(Level::from_text(&self.cfg.stack_level))
            .with_json_stacktrace(self.cfg.json_stacktrace)
    }

    pub fn factory(&self) -> Factory {
        Factory::from_logger(self.logger())
    }
}
