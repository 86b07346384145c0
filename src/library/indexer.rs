use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::UNIX_EPOCH;
use tracing::{debug, info, warn};

use crate::db::connection::DatabaseConnection;
use crate::db::operations::DbOperations;
use crate::library::paths::relative_db_path;
use crate::library::scanner::DirectoryScanner;
use crate::metadata::{ProviderRegistry, TrackMetadata};

/// Result of a sync pass
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SyncReport {
    pub total_files: usize,
    pub new_tracks: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Files with a provider that yielded no metadata
    pub skipped: usize,
    pub removed: usize,
    pub skipped_files: Vec<String>,
}

/// Progress update for a sync pass
#[derive(Debug, Clone, serde::Serialize)]
pub struct SyncProgress {
    pub current: usize,
    pub total: usize,
    pub current_file: String,
}

/// What the sync pass decided to do with one scanned file
enum Plan {
    /// Cached and not modified since the last pass
    Unchanged(i64),
    /// New or modified; metadata has to be read
    Read,
}

enum Outcome {
    Unchanged(i64),
    Metadata(TrackMetadata),
    Unreadable,
}

/// Reconciles the track cache with the files under the library root
pub struct LibraryIndexer;

impl LibraryIndexer {
    /// Sync the library using the current time as the pass timestamp,
    /// logging progress at debug level
    pub fn sync(
        root: &Path,
        registry: &ProviderRegistry,
        db: &DatabaseConnection,
    ) -> Result<SyncReport, anyhow::Error> {
        let scan_time = chrono::Utc::now().timestamp();
        Self::sync_with_progress(root, registry, db, scan_time, |p| {
            debug!(current = p.current, total = p.total, file = %p.current_file, "sync progress");
        })
    }

    /// Sync the library, stamping every seen track with `scan_time` and
    /// removing tracks whose files were not seen.
    ///
    /// Metadata is read in parallel; all writes happen in one transaction.
    pub fn sync_with_progress<F>(
        root: &Path,
        registry: &ProviderRegistry,
        db: &DatabaseConnection,
        scan_time: i64,
        mut progress_callback: F,
    ) -> Result<SyncReport, anyhow::Error>
    where
        F: FnMut(SyncProgress),
    {
        info!(root = %root.display(), "syncing library");

        let files = DirectoryScanner::scan(root, registry)?;
        let total_files = files.len();

        // Decide per file whether the cached row is still current
        let planned: Vec<(PathBuf, String, Plan)> = {
            let conn = db.lock();
            let mut planned = Vec::with_capacity(total_files);
            for path in files {
                let Some(db_path) = relative_db_path(root, &path) else {
                    warn!(path = %path.display(), "file outside library root");
                    continue;
                };

                let plan = match DbOperations::get_track_by_path(&conn, &db_path)? {
                    Some(track) if !Self::modified_since(&path, track.last_update_time) => {
                        Plan::Unchanged(track.id)
                    }
                    _ => Plan::Read,
                };
                planned.push((path, db_path, plan));
            }
            planned
        };

        let outcomes: Vec<Outcome> = planned
            .par_iter()
            .map(|(path, _, plan)| match plan {
                Plan::Unchanged(id) => Outcome::Unchanged(*id),
                Plan::Read => match registry.read_metadata(path) {
                    Some(metadata) => Outcome::Metadata(metadata),
                    None => Outcome::Unreadable,
                },
            })
            .collect();

        let mut report = SyncReport {
            total_files,
            ..SyncReport::default()
        };

        let mut conn = db.lock();
        let tx = conn.transaction()?;

        for (index, ((path, db_path, _), outcome)) in planned.iter().zip(outcomes).enumerate() {
            progress_callback(SyncProgress {
                current: index + 1,
                total: planned.len(),
                current_file: path
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("unknown")
                    .to_string(),
            });

            match outcome {
                Outcome::Unchanged(id) => {
                    // Still stamp it so the removal step knows the file exists
                    DbOperations::touch_track(&tx, id, scan_time)?;
                    report.unchanged += 1;
                    debug!(path = %db_path, "unchanged");
                }
                Outcome::Metadata(metadata) => {
                    let (_, inserted) =
                        DbOperations::upsert_track(&tx, db_path, &metadata, scan_time)?;
                    if inserted {
                        report.new_tracks += 1;
                        debug!(path = %db_path, "new track");
                    } else {
                        report.updated += 1;
                        debug!(path = %db_path, "updated track");
                    }
                }
                Outcome::Unreadable => {
                    report.skipped += 1;
                    report.skipped_files.push(db_path.clone());
                    debug!(path = %db_path, "no metadata, skipped");
                }
            }
        }

        report.removed = DbOperations::remove_stale_tracks(&tx, scan_time)?;
        tx.commit()?;

        info!(
            "{} new tracks, {} updated, {} removed",
            report.new_tracks, report.updated, report.removed
        );

        Ok(report)
    }

    /// True when the file changed after `last_update_time`, or its
    /// modification time cannot be read
    fn modified_since(path: &Path, last_update_time: i64) -> bool {
        let modified = std::fs::metadata(path)
            .and_then(|m| m.modified())
            .ok()
            .and_then(|t| t.duration_since(UNIX_EPOCH).ok());

        match modified {
            Some(duration) => duration.as_secs() as i64 > last_update_time,
            None => true,
        }
    }
}
