//! Command-line flags. Everything here is optional; flags override the
//! matching config file values.

use std::path::PathBuf;

use clap::Parser;

use crate::config::AppConfig;

#[derive(Debug, Parser)]
#[command(name = "hospital-manager", version, about = "Terminal hospital records manager")]
pub struct Cli {
    /// Path to a TOML config file (defaults to ./hospital.toml when present).
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file, overriding `database.path`.
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Log filter directive, overriding `logging.level` (e.g. "debug").
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Fold flag overrides into a loaded config.
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(db) = &self.db {
            config.database.path = db.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
