use std::path::{Path, PathBuf};
use std::{env, fs};

use crate::config::{CONFIG_FILE, Config};
use crate::error::{Result, StoreError};
use crate::store::Store;

pub const DATA_DIR_ENV: &str = "PDS_DATA_DIR";
pub const DB_FILE: &str = "pds.db";

/// `~/.pds-energy`, or `./.pds-energy` when no home directory is set.
pub fn default_base_dir() -> PathBuf {
    dirs_home().join(".pds-energy")
}

fn dirs_home() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("."))
}

/// Explicit override, then `PDS_DATA_DIR`, then the default.
pub fn resolve_base_dir(base_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = base_dir {
        return dir.to_path_buf();
    }
    match env::var(DATA_DIR_ENV) {
        Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
        _ => default_base_dir(),
    }
}

/// The on-disk home of one installation: the roster database plus
/// `config.toml`.
pub struct DataDir {
    path: PathBuf,
    store: Store,
    config: Config,
}

impl DataDir {
    /// Open the data directory, creating it if needed.
    pub fn open(base_dir: Option<&Path>) -> Result<Self> {
        let path = resolve_base_dir(base_dir);
        fs::create_dir_all(&path).map_err(|e| {
            StoreError::InvalidData(format!("failed to create {}: {e}", path.display()))
        })?;

        let config = Config::load(&path.join(CONFIG_FILE))?;
        let store = Store::open(&path.join(DB_FILE))?;

        Ok(Self {
            path,
            store,
            config,
        })
    }

    /// In-memory store with default config (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            path: PathBuf::from(":memory:"),
            store: Store::open_in_memory()?,
            config: Config::default(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Persist `config` to `config.toml` and make it current.
    pub fn save_config(&mut self, config: Config) -> Result<()> {
        let target = self.path.join(CONFIG_FILE);
        fs::write(&target, config.to_toml()?).map_err(|e| {
            StoreError::Config(format!("failed to write {}: {e}", target.display()))
        })?;
        self.config = config;
        Ok(())
    }
}
