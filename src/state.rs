// Application state management
use std::path::PathBuf;
use std::sync::Arc;

use crate::db::connection::DatabaseConnection;
use crate::metadata::ProviderRegistry;

/// Shared state handed to every request handler
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub registry: Arc<ProviderRegistry>,
    pub library_root: Arc<PathBuf>,
    /// PNG served when a track has no cover art
    pub placeholder_cover: Arc<Vec<u8>>,
}

impl AppState {
    pub fn new(
        db: DatabaseConnection,
        registry: ProviderRegistry,
        library_root: PathBuf,
        placeholder_cover: Vec<u8>,
    ) -> Self {
        Self {
            db,
            registry: Arc::new(registry),
            library_root: Arc::new(library_root),
            placeholder_cover: Arc::new(placeholder_cover),
        }
    }
}
