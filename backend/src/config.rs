//! Configuration for sheet syncing and pocket schedules.
//!
//! ```json
//! {
//!   "sheets": [
//!     { "key": "1Qe_AiFv...", "gid": 0, "name": "program", "path": "../data" },
//!     { "key": "1Qe_AiFv...", "gid": 958660582, "name": "people", "path": "../data" }
//!   ],
//!   "appcache": "../konopas.appcache",
//!   "schedule": { "locations": ["Main Stage", "Salon 8"], "exclude": ["Green Room"] }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::env;
use std::path::{Path, PathBuf};

use crate::error::{ConfigError, ConfigResult};
use crate::schedule::GridOptions;

/// Environment variable naming the default config file.
pub const CONFIG_ENV: &str = "KONOPAS_CONFIG";

/// Config file used when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "konopas.json";

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// One spreadsheet tab to publish as a data file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSource {
    /// Spreadsheet key from the sharing URL. Sheets with an empty key are skipped.
    #[serde(default)]
    pub key: String,
    /// Tab id (`gid=` in the sheet URL)
    #[serde(default)]
    pub gid: u64,
    /// Data file name and JavaScript variable name, e.g. `program`
    pub name: String,
    /// Directory the data file is written to
    #[serde(default = "default_data_dir")]
    pub path: PathBuf,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Sheet sync settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncConfig {
    #[serde(default)]
    pub sheets: Vec<SheetSource>,
    /// AppCache manifest to stamp after writing data files
    #[serde(default)]
    pub appcache: Option<PathBuf>,
    /// HTTP timeout per sheet download
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Pocket schedule column options
    #[serde(default)]
    pub schedule: GridOptions,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            sheets: Vec::new(),
            appcache: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            schedule: GridOptions::default(),
        }
    }
}

impl SyncConfig {
    /// Parse and validate a JSON config.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: SyncConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Config path from `$KONOPAS_CONFIG`, falling back to `konopas.json`.
    pub fn default_path() -> PathBuf {
        env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE))
    }

    /// Sheets that will actually be fetched.
    pub fn active_sheets(&self) -> impl Iterator<Item = &SheetSource> {
        self.sheets.iter().filter(|s| !s.key.trim().is_empty())
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let mut names = HashSet::new();

        for (i, sheet) in self.sheets.iter().enumerate() {
            if !is_identifier(&sheet.name) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sheets[{}].name", i),
                    message: format!("'{}' is not a valid variable name", sheet.name),
                });
            }
            if !names.insert(sheet.name.as_str()) {
                return Err(ConfigError::InvalidValue {
                    field: format!("sheets[{}].name", i),
                    message: format!("duplicate sheet name '{}'", sheet.name),
                });
            }
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "timeout_secs".into(),
                message: "must be greater than zero".into(),
            });
        }

        Ok(())
    }
}

/// The name doubles as a JavaScript variable.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
