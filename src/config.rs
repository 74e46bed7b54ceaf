//! Application configuration loaded from an optional TOML file.
//!
//! Every section has defaults, so running without a config file behaves like
//! the original desktop app: `hospital.db` in the working directory and a
//! best-effort theme under `resources/`.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use directories::BaseDirs;
use serde::Deserialize;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{fmt, EnvFilter};

use crate::db::DEFAULT_DB_FILE;
use crate::error::ConfigError;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "hospital.toml";
/// Folder name used beneath the user's home directory for the log file.
const DATA_DIR_NAME: &str = ".hospital-manager";
const LOG_FILE_NAME: &str = "hospital.log";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from(DEFAULT_DB_FILE)
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UiConfig {
    /// Colour theme file. Missing or malformed files are ignored.
    #[serde(default = "default_theme_path")]
    pub theme: PathBuf,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: default_theme_path(),
        }
    }
}

fn default_theme_path() -> PathBuf {
    PathBuf::from("resources").join("theme.toml")
}

/// Logging configuration. The TUI owns the terminal, so output always goes to
/// a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    #[serde(default = "default_format")]
    pub format: String,
    /// Defaults to `~/.hospital-manager/hospital.log`.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

fn default_level() -> String {
    "info".into()
}

fn default_format() -> String {
    "pretty".into()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: default_format(),
            file: None,
        }
    }
}

impl LoggingConfig {
    /// Resolved log file location, if one can be determined.
    pub fn file_path(&self) -> Option<PathBuf> {
        self.file.clone().or_else(|| {
            BaseDirs::new().map(|dirs| dirs.home_dir().join(DATA_DIR_NAME).join(LOG_FILE_NAME))
        })
    }

    /// Initialize the tracing subscriber with this logging configuration.
    /// `RUST_LOG` takes precedence over the configured level.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));
        let writer = self.make_writer();

        match self.format.as_str() {
            "json" => {
                fmt()
                    .json()
                    .with_env_filter(filter)
                    .with_writer(writer)
                    .init();
            }
            _ => {
                fmt()
                    .with_env_filter(filter)
                    .with_ansi(false)
                    .with_writer(writer)
                    .init();
            }
        }
    }

    /// Append to the log file, or discard output when it cannot be opened.
    /// The subscriber does not exist yet, so the failure goes to stderr.
    fn make_writer(&self) -> BoxMakeWriter {
        let Some(path) = self.file_path() else {
            eprintln!("warning: no home directory found, logging disabled");
            return BoxMakeWriter::new(io::sink);
        };
        match open_log_file(&path) {
            Ok(file) => BoxMakeWriter::new(Mutex::new(file)),
            Err(err) => {
                eprintln!(
                    "warning: cannot open log file {}: {err}; logging disabled",
                    path.display()
                );
                BoxMakeWriter::new(io::sink)
            }
        }
    }
}

/// Create the log file's directory if needed and open the file for appending.
fn open_log_file(path: &Path) -> io::Result<File> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `explicit` when given. Otherwise use [`DEFAULT_CONFIG_FILE`] if
    /// it exists, falling back to built-in defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.exists() {
                    Self::load(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Reject values that would only fail later at startup.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.path.as_os_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database.path",
                reason: "must not be empty".into(),
            });
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "logging.format",
                reason: format!("expected \"pretty\" or \"json\", got {:?}", self.logging.format),
            });
        }
        Ok(())
    }

    /// Initialize logging with the configured settings.
    pub fn init_logging(&self) {
        self.logging.init();
    }
}
