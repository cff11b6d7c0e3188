use std::path::PathBuf;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Base directory all stored relative paths resolve against.
    pub root: PathBuf,
    /// Directory for the index and blob-location snapshots.
    pub data_dir: PathBuf,
    /// Maximum accepted upload size in bytes.
    pub max_upload_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub storage: StorageConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .set_default("storage.root", "./data/files")?
            .set_default("storage.data_dir", "./data/index")?
            .set_default("storage.max_upload_size", 64 * 1024 * 1024_i64)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., DANJI__STORAGE__ROOT)
            .add_source(Environment::with_prefix("DANJI").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
