//! Configuration management for roster.
//!
//! Settings come from three layers, later layers winning:
//!
//! 1. Built-in defaults
//! 2. `config.json` in the platform data directory
//! 3. Environment variables (a `.env` file in the working directory is loaded first)
//!
//! | Setting        | JSON key       | Environment variable   | Default                     |
//! |----------------|----------------|------------------------|-----------------------------|
//! | Database file  | `database`     | `ROSTER_DATABASE`      | `<data dir>/roster.db`      |
//! | Page size      | `page_size`    | `ROSTER_PAGE_SIZE`     | 20                          |
//! | Logging        | `logging`      | `ROSTER_LOGGING`       | false                       |
//! | Timeout        | `timeout_secs` | `ROSTER_TIMEOUT_SECS`  | none                        |
//!
//! The data directory itself can be moved with `ROSTER_HOME`
//! (see [`DataStorage`]).
//!
//! ## Usage
//!
//! ```rust,no_run
//! use roster::libs::config::Config;
//!
//! let config = Config::load()?;
//! let students = config.repository()?;
//! let page = students.list(false, 1, config.page_size)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use super::data_storage::DataStorage;
use crate::db::students::Students;
use crate::libs::messages::Message;
use crate::msg_warning;
use anyhow::Result;
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::path::PathBuf;
use std::time::Duration;

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const DB_FILE_NAME: &str = "roster.db";
pub const DEFAULT_PAGE_SIZE: i64 = 20;

const ENV_DATABASE: &str = "ROSTER_DATABASE";
const ENV_PAGE_SIZE: &str = "ROSTER_PAGE_SIZE";
const ENV_LOGGING: &str = "ROSTER_LOGGING";
const ENV_TIMEOUT_SECS: &str = "ROSTER_TIMEOUT_SECS";

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Config {
    /// Path of the SQLite database file. Falls back to the data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<PathBuf>,

    /// Rows per page when a command does not ask for a specific size.
    #[serde(default = "default_page_size")]
    pub page_size: i64,

    /// Routes messages through `tracing` and installs a subscriber.
    #[serde(default)]
    pub logging: bool,

    /// Deadline applied to every repository operation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

fn default_page_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

impl Default for Config {
    fn default() -> Self {
        Config {
            database: None,
            page_size: DEFAULT_PAGE_SIZE,
            logging: false,
            timeout_secs: None,
        }
    }
}

impl Config {
    /// Reads `config.json`, or returns the defaults when the file is missing.
    pub fn read() -> Result<Config> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        if !config_file_path.exists() {
            return Ok(Config::default());
        }

        let config_str = fs::read_to_string(config_file_path)?;
        Self::from_json(&config_str)
    }

    /// Parses `config.json` content. Out-of-range values fall back to their
    /// defaults with a warning, the same way bad environment values do.
    pub fn from_json(content: &str) -> Result<Config> {
        let mut config: Config = serde_json::from_str(content)?;
        if config.page_size < 1 {
            msg_warning!(Message::ConfigInvalidValue("page_size".to_string(), config.page_size.to_string()));
            config.page_size = DEFAULT_PAGE_SIZE;
        }
        Ok(config)
    }

    /// Full resolution: `.env`, then the config file, then process environment.
    pub fn load() -> Result<Config> {
        dotenv::dotenv().ok();
        let config = Self::read()?;
        Ok(config.apply_env(|name| std::env::var(name).ok()))
    }

    /// Overlays environment values on top of `self`.
    ///
    /// Values that do not parse are reported and skipped rather than failing
    /// the whole load.
    pub fn apply_env<F>(mut self, lookup: F) -> Config
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(database) = lookup(ENV_DATABASE).filter(|v| !v.trim().is_empty()) {
            self.database = Some(PathBuf::from(database));
        }

        if let Some(raw) = lookup(ENV_PAGE_SIZE) {
            match raw.trim().parse::<i64>() {
                Ok(size) if size > 0 => self.page_size = size,
                _ => msg_warning!(Message::ConfigInvalidEnv(ENV_PAGE_SIZE.to_string(), raw)),
            }
        }

        if let Some(raw) = lookup(ENV_LOGGING) {
            match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => self.logging = true,
                "0" | "false" | "no" | "off" => self.logging = false,
                _ => msg_warning!(Message::ConfigInvalidEnv(ENV_LOGGING.to_string(), raw)),
            }
        }

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(0) => self.timeout_secs = None,
                Ok(secs) => self.timeout_secs = Some(secs),
                Err(_) => msg_warning!(Message::ConfigInvalidEnv(ENV_TIMEOUT_SECS.to_string(), raw)),
            }
        }

        self
    }

    pub fn save(&self) -> Result<()> {
        let config_file_path = DataStorage::new().get_path(CONFIG_FILE_NAME)?;
        let config_file = File::create(config_file_path)?;
        serde_json::to_writer_pretty(&config_file, &self)?;
        Ok(())
    }

    /// Interactive setup, seeded with the current values.
    pub fn init() -> Result<Config> {
        let current = Self::read()?;
        let theme = ColorfulTheme::default();

        let database: String = Input::with_theme(&theme)
            .with_prompt(Message::PromptDatabasePath.to_string())
            .default(current.database_path()?.display().to_string())
            .interact_text()?;

        let page_size: i64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptPageSize.to_string())
            .default(current.page_size)
            .validate_with(|size: &i64| if *size > 0 { Ok(()) } else { Err("page size must be positive") })
            .interact_text()?;

        let logging = Confirm::with_theme(&theme)
            .with_prompt(Message::PromptEnableLogging.to_string())
            .default(current.logging)
            .interact()?;

        let timeout_secs: u64 = Input::with_theme(&theme)
            .with_prompt(Message::PromptTimeoutSecs.to_string())
            .default(current.timeout_secs.unwrap_or(0))
            .interact_text()?;

        Ok(Config {
            database: Some(PathBuf::from(database)),
            page_size,
            logging,
            timeout_secs: (timeout_secs > 0).then_some(timeout_secs),
        })
    }

    pub fn database_path(&self) -> Result<PathBuf> {
        match &self.database {
            Some(path) => Ok(path.clone()),
            None => Ok(DataStorage::new().get_path(DB_FILE_NAME)?),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Repository handle configured from these settings.
    pub fn repository(&self) -> Result<Students> {
        let students = Students::new(self.database_path()?);
        Ok(match self.timeout() {
            Some(timeout) => students.with_timeout(timeout),
            None => students,
        })
    }
}
