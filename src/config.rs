use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::session::practice::RunConfig;

pub const PLACEHOLDER_SHEET_URL: &str =
    "https://docs.google.com/spreadsheets/d/YOUR_SHEET_ID/export?format=csv";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_word_count")]
    pub default_word_count: usize,
    #[serde(default = "default_sheet_url", alias = "google_sheet_url")]
    pub sheet_url: String,
    #[serde(default = "default_theme")]
    pub theme: String,
}

fn default_word_count() -> usize {
    5
}
fn default_sheet_url() -> String {
    PLACEHOLDER_SHEET_URL.to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_word_count: default_word_count(),
            sheet_url: default_sheet_url(),
            theme: default_theme(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordpick")
            .join("config.toml")
    }

    /// Build a run from the text of the two form fields.
    ///
    /// An empty or unreadable word count falls back to the configured
    /// default; the URL is passed through as typed and checked by the run.
    pub fn run_config(&self, word_count: &str, sheet_url: &str) -> RunConfig {
        let count = word_count
            .trim()
            .parse::<usize>()
            .unwrap_or(self.default_word_count);
        RunConfig::new(count, sheet_url.trim())
    }

    /// Run using only the configured values.
    pub fn default_run(&self) -> RunConfig {
        RunConfig::new(self.default_word_count, &self.sheet_url)
    }
}
