use std::env::consts::OS;
use std::env::var;
use std::io;
use std::path::{Path, PathBuf};
use std::fs;

pub const VENDOR_NAME: &str = "roster";
pub const APP_NAME: &str = "roster";

/// Overrides the data directory as a whole, e.g. for a school-wide share.
pub const ENV_HOME: &str = "ROSTER_HOME";

/// Directory holding the config file and the default database.
///
/// `ROSTER_HOME` wins when set. Otherwise the directory lives under the
/// platform's per-user application data location.
#[derive(Debug, Clone)]
pub struct DataStorage {
    base_path: PathBuf,
}

impl DataStorage {
    pub fn new() -> Self {
        Self::resolve(|name| var(name).ok())
    }

    /// Data directory rooted at `base_path`, with no platform lookup.
    pub fn at(base_path: impl Into<PathBuf>) -> Self {
        Self { base_path: base_path.into() }
    }

    /// Resolves the directory from `lookup`, which stands in for the process environment.
    pub fn resolve<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(home) = lookup(ENV_HOME).filter(|v| !v.trim().is_empty()) {
            return Self::at(home.trim());
        }

        let base_path = match OS {
            "windows" => lookup("LOCALAPPDATA").unwrap_or_else(|| ".".into()),
            "macos" => lookup("HOME").unwrap_or_else(|| ".".into()) + "/Library/Application Support",
            _ => lookup("HOME").unwrap_or_else(|| ".".into()) + "/.local/share",
        };
        Self::at(Path::new(&base_path).join(VENDOR_NAME).join(APP_NAME))
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Joins `file_name` onto the data directory, creating the directory first.
    pub fn get_path(&self, file_name: &str) -> io::Result<PathBuf> {
        if !self.base_path.exists() {
            fs::create_dir_all(&self.base_path)?;
        }
        Ok(self.base_path.join(file_name))
    }
}

impl Default for DataStorage {
    fn default() -> Self {
        Self::new()
    }
}
