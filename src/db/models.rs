// Data models
use serde::{Deserialize, Serialize};

/// A cached library track
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub id: i64,
    pub mime: String,
    /// Path relative to the library root, `/`-separated on every platform
    pub path: String,
    /// Unix seconds of the sync pass that last saw the file
    pub last_update_time: i64,

    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub modified_by: Option<String>,
    pub grouping: Option<String>,
    pub copyright: Option<String>,
    pub publisher: Option<String>,
    pub composer: Option<String>,
    pub track: Option<i64>,
    pub set: Option<i64>,
    pub bpm: Option<i64>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub codec: Option<String>,
    pub encoded_by: Option<String>,

    pub has_cover: bool,
}

impl Track {
    /// Title shown in listings, falling back to the file name
    pub fn display_title(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => self.path.rsplit('/').next().unwrap_or(&self.path),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_title_falls_back_to_file_name() {
        let mut track = Track {
            path: "Artist/Album/01 Song.mp3".to_string(),
            ..Track::default()
        };
        assert_eq!(track.display_title(), "01 Song.mp3");

        track.title = Some(String::new());
        assert_eq!(track.display_title(), "01 Song.mp3");

        track.title = Some("Song".to_string());
        assert_eq!(track.display_title(), "Song");
    }
}
