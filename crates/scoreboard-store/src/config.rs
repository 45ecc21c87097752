use std::path::{Path, PathBuf};

pub const DEFAULT_DATABASE_NAME: &str = "GameData.db";
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

pub const ENV_DATA_DIR: &str = "SCOREBOARD_DATA_DIR";
pub const ENV_DB_NAME: &str = "SCOREBOARD_DB_NAME";

/// Where the score database lives and how connections are tuned.
///
/// The base directory belongs to the host; only the file name has a
/// default here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreConfig {
    pub base_dir: PathBuf,
    pub database_name: String,
    /// SQLite `busy_timeout` applied when the connection opens.
    pub busy_timeout_ms: u32,
}

impl StoreConfig {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            database_name: DEFAULT_DATABASE_NAME.to_string(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }

    pub fn with_database_name(mut self, name: impl Into<String>) -> Self {
        self.database_name = name.into();
        self
    }

    pub fn with_busy_timeout_ms(mut self, ms: u32) -> Self {
        self.busy_timeout_ms = ms;
        self
    }

    /// Build a config from `SCOREBOARD_DATA_DIR` / `SCOREBOARD_DB_NAME`,
    /// falling back to `$HOME/.scoreboard` and the default file name.
    pub fn from_env() -> Self {
        let base_dir = std::env::var_os(ENV_DATA_DIR)
            .map(PathBuf::from)
            .unwrap_or_else(default_base_dir);
        let config = Self::new(base_dir);
        match std::env::var(ENV_DB_NAME) {
            Ok(name) if !name.trim().is_empty() => config.with_database_name(name),
            _ => config,
        }
    }

    /// Full path of the backing file.
    pub fn database_path(&self) -> PathBuf {
        self.base_dir.join(&self.database_name)
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

/// Fallback home dir for the default data directory.
pub fn default_base_dir() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/tmp"))
        .join(".scoreboard")
}
