use std::path::PathBuf;
use std::sync::Arc;

use platform::AppState;
use platform::attachment::Upload;
use platform::config::{AppConfig, StorageConfig};
use platform::repository::{MemoryStore, Repositories};

/// A fully wired state over a temp storage root and in-memory repositories.
pub async fn state() -> (AppState, Arc<MemoryStore>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let config = AppConfig {
        storage: StorageConfig {
            root: dir.path().join("files"),
            data_dir: dir.path().join("index"),
            max_upload_size: 8 * 1024 * 1024,
        },
    };
    let store = Arc::new(MemoryStore::new());
    let state = AppState::initialize(config, Repositories::in_memory(store.clone()))
        .await
        .unwrap();
    (state, store, dir)
}

pub fn png(data: &[u8]) -> Upload {
    Upload {
        content_type: "image/png".into(),
        data: data.to_vec(),
    }
}

/// Where a stored relative path lands under the fixture's storage root.
pub fn on_disk(dir: &tempfile::TempDir, relative: &str) -> PathBuf {
    dir.path().join("files").join(relative.trim_start_matches('/'))
}
