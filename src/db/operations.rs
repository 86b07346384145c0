use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::db::models::Track;
use crate::metadata::TrackMetadata;

const TRACK_COLUMNS: &str = "id, mime, path, last_update_time, title, artist, album,
    modified_by, grouping, copyright, publisher, composer, track, \"set\", bpm,
    year, genre, codec, encoded_by, has_cover";

fn track_from_row(row: &Row<'_>) -> rusqlite::Result<Track> {
    Ok(Track {
        id: row.get(0)?,
        mime: row.get(1)?,
        path: row.get(2)?,
        last_update_time: row.get(3)?,
        title: row.get(4)?,
        artist: row.get(5)?,
        album: row.get(6)?,
        modified_by: row.get(7)?,
        grouping: row.get(8)?,
        copyright: row.get(9)?,
        publisher: row.get(10)?,
        composer: row.get(11)?,
        track: row.get(12)?,
        set: row.get(13)?,
        bpm: row.get(14)?,
        year: row.get(15)?,
        genre: row.get(16)?,
        codec: row.get(17)?,
        encoded_by: row.get(18)?,
        has_cover: row.get(19)?,
    })
}

/// Database operations for library management.
///
/// Every operation borrows a plain connection so the sync pass can run a
/// batch of them inside one transaction.
pub struct DbOperations;

impl DbOperations {
    /// Get all tracks in dashboard order
    pub fn get_all_tracks(conn: &Connection) -> Result<Vec<Track>, anyhow::Error> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {TRACK_COLUMNS} FROM tracks
             ORDER BY grouping, artist, album, title"
        ))?;

        let tracks = stmt
            .query_map([], track_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(tracks)
    }

    /// Get a track by id
    pub fn get_track(conn: &Connection, id: i64) -> Result<Option<Track>, anyhow::Error> {
        let track = conn
            .query_row(
                &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE id = ?1"),
                params![id],
                track_from_row,
            )
            .optional()?;

        Ok(track)
    }

    /// Get a track by its library-relative path
    pub fn get_track_by_path(
        conn: &Connection,
        path: &str,
    ) -> Result<Option<Track>, anyhow::Error> {
        let track = conn
            .query_row(
                &format!("SELECT {TRACK_COLUMNS} FROM tracks WHERE path = ?1"),
                params![path],
                track_from_row,
            )
            .optional()?;

        Ok(track)
    }

    /// Write extracted metadata for `path`, inserting the track if needed.
    /// Returns the track id and whether a new row was created.
    pub fn upsert_track(
        conn: &Connection,
        path: &str,
        metadata: &TrackMetadata,
        scan_time: i64,
    ) -> Result<(i64, bool), anyhow::Error> {
        let existing: Option<i64> = conn
            .query_row(
                "SELECT id FROM tracks WHERE path = ?1",
                params![path],
                |row| row.get(0),
            )
            .optional()?;

        let m = metadata;
        let has_cover = m.cover.is_some();

        if let Some(track_id) = existing {
            conn.execute(
                "UPDATE tracks SET
                    mime = ?1, last_update_time = ?2, title = ?3, artist = ?4,
                    album = ?5, modified_by = ?6, grouping = ?7, copyright = ?8,
                    publisher = ?9, composer = ?10, track = ?11, \"set\" = ?12,
                    bpm = ?13, year = ?14, genre = ?15, codec = ?16,
                    encoded_by = ?17, has_cover = ?18
                WHERE id = ?19",
                params![
                    m.mime, scan_time, m.title, m.artist,
                    m.album, m.modified_by, m.grouping, m.copyright,
                    m.publisher, m.composer, m.track, m.set,
                    m.bpm, m.year, m.genre, m.codec,
                    m.encoded_by, has_cover, track_id
                ],
            )?;

            Ok((track_id, false))
        } else {
            conn.execute(
                "INSERT INTO tracks (
                    mime, path, last_update_time, title, artist, album,
                    modified_by, grouping, copyright, publisher, composer,
                    track, \"set\", bpm, year, genre, codec, encoded_by, has_cover
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19)",
                params![
                    m.mime, path, scan_time, m.title, m.artist, m.album,
                    m.modified_by, m.grouping, m.copyright, m.publisher, m.composer,
                    m.track, m.set, m.bpm, m.year, m.genre, m.codec, m.encoded_by, has_cover
                ],
            )?;

            Ok((conn.last_insert_rowid(), true))
        }
    }

    /// Mark an unchanged track as seen by the current sync pass
    pub fn touch_track(conn: &Connection, id: i64, scan_time: i64) -> Result<(), anyhow::Error> {
        conn.execute(
            "UPDATE tracks SET last_update_time = ?1 WHERE id = ?2",
            params![scan_time, id],
        )?;
        Ok(())
    }

    /// Delete every track the sync pass at `scan_time` did not see
    pub fn remove_stale_tracks(conn: &Connection, scan_time: i64) -> Result<usize, anyhow::Error> {
        let removed = conn.execute(
            "DELETE FROM tracks WHERE last_update_time != ?1",
            params![scan_time],
        )?;
        Ok(removed)
    }

    /// Number of cached tracks
    pub fn count_tracks(conn: &Connection) -> Result<i64, anyhow::Error> {
        let count = conn.query_row("SELECT COUNT(*) FROM tracks", [], |row| row.get(0))?;
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::connection::DatabaseConnection;
    use crate::metadata::MimeData;

    fn metadata(title: &str, artist: &str) -> TrackMetadata {
        TrackMetadata {
            mime: "audio/mpeg".to_string(),
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            ..TrackMetadata::default()
        }
    }

    #[test]
    fn upsert_inserts_then_updates() {
        let db = DatabaseConnection::in_memory().unwrap();
        let conn = db.lock();

        let (id, inserted) =
            DbOperations::upsert_track(&conn, "a/b.mp3", &metadata("Old", "X"), 10).unwrap();
        assert!(inserted);

        let mut changed = metadata("New", "X");
        changed.track = Some(3);
        changed.cover = Some(MimeData::new("image/png", vec![1, 2, 3]));
        let (same_id, inserted) = DbOperations::upsert_track(&conn, "a/b.mp3", &changed, 20).unwrap();
        assert_eq!(same_id, id);
        assert!(!inserted);

        let track = DbOperations::get_track(&conn, id).unwrap().unwrap();
        assert_eq!(track.title.as_deref(), Some("New"));
        assert_eq!(track.track, Some(3));
        assert_eq!(track.last_update_time, 20);
        assert!(track.has_cover);
        assert_eq!(track.path, "a/b.mp3");
        assert_eq!(DbOperations::count_tracks(&conn).unwrap(), 1);
    }

    #[test]
    fn lookups_by_id_and_path() {
        let db = DatabaseConnection::in_memory().unwrap();
        let conn = db.lock();
        let (id, _) = DbOperations::upsert_track(&conn, "song.mp3", &metadata("T", "A"), 1).unwrap();

        assert_eq!(DbOperations::get_track_by_path(&conn, "song.mp3").unwrap().unwrap().id, id);
        assert!(DbOperations::get_track_by_path(&conn, "other.mp3").unwrap().is_none());
        assert!(DbOperations::get_track(&conn, id + 100).unwrap().is_none());
    }

    #[test]
    fn listing_orders_by_grouping_artist_album_title() {
        let db = DatabaseConnection::in_memory().unwrap();
        let conn = db.lock();

        let mut b = metadata("Zeta", "Beta");
        b.grouping = Some("G".to_string());
        let mut a2 = metadata("Two", "Alpha");
        a2.grouping = Some("G".to_string());
        let mut a1 = metadata("One", "Alpha");
        a1.grouping = Some("G".to_string());
        let mut first = metadata("Last", "Zulu");
        first.grouping = Some("A".to_string());

        DbOperations::upsert_track(&conn, "1.mp3", &b, 1).unwrap();
        DbOperations::upsert_track(&conn, "2.mp3", &a2, 1).unwrap();
        DbOperations::upsert_track(&conn, "3.mp3", &a1, 1).unwrap();
        DbOperations::upsert_track(&conn, "4.mp3", &first, 1).unwrap();

        let titles: Vec<String> = DbOperations::get_all_tracks(&conn)
            .unwrap()
            .into_iter()
            .filter_map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["Last", "One", "Two", "Zeta"]);
    }

    #[test]
    fn stale_tracks_are_removed() {
        let db = DatabaseConnection::in_memory().unwrap();
        let conn = db.lock();

        let (kept, _) = DbOperations::upsert_track(&conn, "kept.mp3", &metadata("K", "A"), 1).unwrap();
        DbOperations::upsert_track(&conn, "gone.mp3", &metadata("G", "A"), 1).unwrap();

        DbOperations::touch_track(&conn, kept, 2).unwrap();
        assert_eq!(DbOperations::remove_stale_tracks(&conn, 2).unwrap(), 1);

        let remaining = DbOperations::get_all_tracks(&conn).unwrap();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].id, kept);
        assert_eq!(remaining[0].last_update_time, 2);
    }
}
