// Trackdeck - Self-hosted music dashboard
// Module declarations
pub mod db;
pub mod library;
pub mod metadata;
pub mod player;
pub mod settings;
pub mod state;
pub mod web;

use anyhow::Context;
use std::path::Path;
use tracing::{debug, info};

use db::connection::DatabaseConnection;
use db::operations::DbOperations;
use library::{LibraryIndexer, SyncReport};
use metadata::ProviderRegistry;
use settings::AppSettings;
use state::AppState;

/// Install the global subscriber; `RUST_LOG` overrides the `info` default
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Open the track cache and build the provider registry described by `settings`
pub fn open_library(
    settings: &AppSettings,
    settings_path: &Path,
) -> Result<(DatabaseConnection, ProviderRegistry), anyhow::Error> {
    let db_path = settings.database_path(settings_path);
    let db = DatabaseConnection::new(&db_path)
        .with_context(|| format!("Failed to open database {}", db_path.display()))?;

    let registry = ProviderRegistry::with_builtin(&settings.library.extensions)?;
    debug!(suffixes = ?registry.suffixes(), "metadata providers installed");

    Ok((db, registry))
}

/// One sync pass over the library root
pub fn run_sync(settings: &AppSettings, settings_path: &Path) -> Result<SyncReport, anyhow::Error> {
    let (db, registry) = open_library(settings, settings_path)?;
    LibraryIndexer::sync(&settings.library.root, &registry, &db)
}

/// Serve the dashboard, optionally syncing the library first
pub async fn run_server(
    settings: AppSettings,
    settings_path: &Path,
    sync_first: bool,
) -> Result<(), anyhow::Error> {
    let (db, registry) = open_library(&settings, settings_path)?;

    let (db, registry) = if sync_first {
        let root = settings.library.root.clone();
        tokio::task::spawn_blocking(move || {
            LibraryIndexer::sync(&root, &registry, &db).map(|_| (db, registry))
        })
        .await??
    } else {
        (db, registry)
    };

    let tracks = DbOperations::count_tracks(&db.lock())?;
    info!(tracks, root = %settings.library.root.display(), "library ready");

    let placeholder = web::assets::render_placeholder_cover()?;
    let state = AppState::new(db, registry, settings.library.root.clone(), placeholder);

    web::serve(state, &settings.server.bind_address()).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn run_sync_indexes_configured_root() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("music");
        fs::create_dir_all(&root).unwrap();
        fs::write(root.join("cover.txt"), "not audio").unwrap();
        fs::write(root.join("broken.mp3"), "not really mp3").unwrap();

        let mut settings = AppSettings::default();
        settings.library.root = root;
        settings.database.path = "cache/library.sqlite".into();
        let settings_path = dir.path().join("trackdeck.json");

        let report = run_sync(&settings, &settings_path).unwrap();
        assert_eq!(report.total_files, 1);
        assert_eq!(report.new_tracks, 0);
        assert_eq!(report.skipped_files, vec!["broken.mp3".to_string()]);
        assert!(dir.path().join("cache").join("library.sqlite").is_file());
    }
}
