pub mod attachment;
pub mod config;
pub mod entity;
pub mod error;
pub mod repository;
pub mod state;

pub use config::{AppConfig, StorageConfig};
pub use error::AppError;
pub use state::AppState;
