/*
 * Manages the persisted search settings: which parts of the project tree are
 * enumerated, the largest file that is read, and the log level. Settings live in
 * a JSON file inside the platform's local configuration directory. Search
 * history is deliberately not part of it.
 *
 * It uses a trait-based approach (`ConfigManagerOperations`) so the presenter can
 * be tested with an in-memory implementation. `CoreConfigManager` resolves the
 * directory through `path_utils`, or uses an explicit directory when given one.
 */
use crate::core::file_system::EnumerationOptions;
use crate::core::path_utils;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;

const SETTINGS_FILENAME: &str = "settings.json";

pub const DEFAULT_MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Json(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Json(e) => write!(f, "Configuration file is not valid JSON: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine project directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Json(e) => Some(e),
            ConfigError::NoProjectDirectory => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

// Missing fields in a stored file fall back to their defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub respect_ignore_files: bool,
    pub include_hidden: bool,
    pub follow_links: bool,
    pub exclude_patterns: Vec<String>,
    pub file_masks: Vec<String>,
    pub max_file_size_bytes: Option<u64>,
    pub log_level: String,
}

impl Default for SearchSettings {
    fn default() -> Self {
        SearchSettings {
            respect_ignore_files: false,
            include_hidden: true,
            follow_links: false,
            exclude_patterns: Vec::new(),
            file_masks: Vec::new(),
            max_file_size_bytes: Some(DEFAULT_MAX_FILE_SIZE_BYTES),
            log_level: "info".to_string(),
        }
    }
}

impl SearchSettings {
    pub fn enumeration_options(&self) -> EnumerationOptions {
        EnumerationOptions {
            respect_ignore_files: self.respect_ignore_files,
            include_hidden: self.include_hidden,
            follow_links: self.follow_links,
            exclude_patterns: self.exclude_patterns.clone(),
            file_masks: self.file_masks.clone(),
        }
    }

    /*
     * Parses `log_level`. This runs before any logger is installed, so an
     * unrecognized name is returned to the caller rather than logged here.
     */
    pub fn log_level_filter(&self) -> std::result::Result<log::LevelFilter, log::ParseLevelError> {
        self.log_level.parse()
    }
}

pub trait ConfigManagerOperations: Send + Sync {
    fn load_settings(&self, app_name: &str) -> Result<SearchSettings>;
    fn save_settings(&self, app_name: &str, settings: &SearchSettings) -> Result<()>;
}

pub struct CoreConfigManager {
    config_dir_override: Option<PathBuf>,
}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {
            config_dir_override: None,
        }
    }

    // Stores settings under `config_dir` instead of the platform location.
    pub fn with_config_dir(config_dir: PathBuf) -> Self {
        CoreConfigManager {
            config_dir_override: Some(config_dir),
        }
    }

    fn settings_file_path(&self, app_name: &str) -> Result<PathBuf> {
        let config_dir = match &self.config_dir_override {
            Some(dir) => {
                fs::create_dir_all(dir)?;
                dir.clone()
            }
            None => path_utils::get_base_app_config_local_dir(app_name)
                .ok_or(ConfigError::NoProjectDirectory)?,
        };
        Ok(config_dir.join(SETTINGS_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    /*
     * Loads the settings for `app_name`. A missing or empty settings file is not
     * an error and yields `SearchSettings::default()`.
     */
    fn load_settings(&self, app_name: &str) -> Result<SearchSettings> {
        log::trace!("CoreConfigManager: Loading settings for app '{app_name}'");
        let file_path = self.settings_file_path(app_name)?;

        if !file_path.exists() {
            log::debug!("CoreConfigManager: Settings file {file_path:?} does not exist.");
            return Ok(SearchSettings::default());
        }

        let contents = fs::read_to_string(&file_path)?;
        if contents.trim().is_empty() {
            log::debug!("CoreConfigManager: Settings file {file_path:?} is empty.");
            return Ok(SearchSettings::default());
        }

        let settings: SearchSettings = serde_json::from_str(&contents)?;
        log::debug!("CoreConfigManager: Loaded settings from {file_path:?}.");
        Ok(settings)
    }

    fn save_settings(&self, app_name: &str, settings: &SearchSettings) -> Result<()> {
        let file_path = self.settings_file_path(app_name)?;
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(&file_path, json)?;
        log::debug!("CoreConfigManager: Saved settings to {file_path:?}.");
        Ok(())
    }
}
