use std::sync::Arc;

use common::storage::{
    BlobLocationStore, FileStore, FilesystemBlobLocationStore, FilesystemKeyIndexStore,
    KeyIndexStore,
};
use tokio::fs;

use crate::attachment::{AttachmentPromoter, CascadeDeleter, StagingManager};
use crate::config::AppConfig;
use crate::error::AppError;
use crate::repository::Repositories;

/// Shared application state: configuration plus the wired lifecycle
/// managers.
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub staging: StagingManager,
    pub promoter: AttachmentPromoter,
    pub cascade: CascadeDeleter,
}

impl AppState {
    /// Build the stores from configuration and wire the managers.
    pub async fn initialize(config: AppConfig, repos: Repositories) -> Result<Self, AppError> {
        let files = Arc::new(FileStore::new(config.storage.root.clone()).await?);

        fs::create_dir_all(&config.storage.data_dir).await?;
        let index: Arc<dyn KeyIndexStore> = Arc::new(
            FilesystemKeyIndexStore::open(config.storage.data_dir.join("key_index.json")).await?,
        );
        let locations: Arc<dyn BlobLocationStore> = Arc::new(
            FilesystemBlobLocationStore::open(config.storage.data_dir.join("blob_locations.json"))
                .await?,
        );

        let staging = StagingManager::new(
            files.clone(),
            index.clone(),
            locations.clone(),
            config.storage.max_upload_size,
        );
        let promoter = AttachmentPromoter::new(
            files.clone(),
            index.clone(),
            locations.clone(),
            repos.articles.clone(),
            repos.lessons.clone(),
        );
        let cascade = CascadeDeleter::new(files, index, locations, staging.clone(), repos);

        Ok(Self {
            config,
            staging,
            promoter,
            cascade,
        })
    }
}
