//! Optional colour theme, the terminal counterpart of an external stylesheet.
//! Loading never fails the app: a missing or malformed file falls back to the
//! built-in palette.

use std::fs;
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};
use ratatui::style::Color;
use serde::Deserialize;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    /// Selected tab, selected row and key hints.
    pub accent: Color,
    /// Table header text.
    pub header: Color,
    /// Focused form field.
    pub focus: Color,
    pub info: Color,
    pub error: Color,
    /// Placeholders and hints.
    pub muted: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            accent: Color::Cyan,
            header: Color::Yellow,
            focus: Color::Yellow,
            info: Color::Green,
            error: Color::Red,
            muted: Color::DarkGray,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ThemeFile {
    accent: Option<String>,
    header: Option<String>,
    focus: Option<String>,
    info: Option<String>,
    error: Option<String>,
    muted: Option<String>,
}

impl Theme {
    /// Load `path`, or use the defaults when that is not possible.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(theme) => {
                info!(path = %path.display(), "theme loaded");
                theme
            }
            Err(err) => {
                debug!(path = %path.display(), error = %err, "using default theme");
                Self::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("failed to read theme file")?;
        Self::parse(&content)
    }

    /// Colours accept ratatui names ("light-blue") or hex ("#1e90ff"). Keys
    /// left out keep their default.
    pub fn parse(content: &str) -> Result<Self> {
        let file: ThemeFile = toml::from_str(content).context("failed to parse theme file")?;
        let mut theme = Self::default();
        let slots = [
            ("accent", file.accent, &mut theme.accent),
            ("header", file.header, &mut theme.header),
            ("focus", file.focus, &mut theme.focus),
            ("info", file.info, &mut theme.info),
            ("error", file.error, &mut theme.error),
            ("muted", file.muted, &mut theme.muted),
        ];
        for (key, value, slot) in slots {
            if let Some(value) = value {
                *slot = Color::from_str(value.trim())
                    .map_err(|_| anyhow!("invalid colour {value:?} for {key}"))?;
            }
        }
        Ok(theme)
    }
}
