// Database migrations
use rusqlite::Connection;
use anyhow::Result;

pub fn run_migrations(conn: &Connection) -> Result<()> {
    // Create tracks table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS tracks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            mime TEXT NOT NULL,
            path TEXT UNIQUE NOT NULL,
            last_update_time INTEGER NOT NULL,
            title TEXT,
            artist TEXT,
            album TEXT,
            modified_by TEXT,
            grouping TEXT,
            copyright TEXT,
            publisher TEXT,
            composer TEXT,
            track INTEGER,
            \"set\" INTEGER,
            bpm INTEGER,
            year INTEGER,
            genre TEXT,
            codec TEXT,
            encoded_by TEXT,
            has_cover BOOLEAN NOT NULL DEFAULT 0
        )",
        [],
    )?;

    // Dashboard ordering
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tracks_listing
            ON tracks(grouping, artist, album, title)",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_tracks_last_update ON tracks(last_update_time)",
        [],
    )?;

    Ok(())
}
