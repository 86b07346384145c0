use std::fmt::Display;

use super::document::Document;
use super::PlayerError;

pub const AUDIO_ID: &str = "audio";
pub const AUDIO_SOURCE_ID: &str = "audio-source";
pub const CURRENT_TRACK_ID: &str = "current-track";
pub const CURRENT_ARTIST_ID: &str = "current-artist";
pub const CURRENT_ALBUM_ID: &str = "current-album";
pub const CURRENT_ALBUM_PIC_ID: &str = "current-album-pic";

pub const ATTR_TITLE: &str = "data-track-title";
pub const ATTR_ARTIST: &str = "data-track-artist";
pub const ATTR_ALBUM: &str = "data-track-album";
pub const ATTR_MIME: &str = "data-track-mime";

/// Element id of the listing row for a track
pub fn track_row_id(track_id: impl Display) -> String {
    format!("track-{}", track_id)
}

pub fn stream_url(track_id: impl Display) -> String {
    format!("/stream/{}", track_id)
}

pub fn cover_url(track_id: impl Display) -> String {
    format!("/pic/{}", track_id)
}

/// Which element receives the stream URL and media type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackTarget {
    /// `src`/`type` on the `<audio>` element itself
    AudioElement,
    /// `src`/`type` on the nested `<source>` element
    SourceElement,
}

/// Text shown in the now-playing panel
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NowPlaying {
    pub title: String,
    pub artist: String,
    pub album: String,
}

/// Points the page's audio element at a track's stream and starts playback.
///
/// Every call overwrites the previous one; repeating a call with the same
/// arguments leaves the page as a single call would.
#[derive(Debug, Clone, Copy)]
pub struct TrackPlayer {
    target: PlaybackTarget,
}

impl Default for TrackPlayer {
    fn default() -> Self {
        Self::new(PlaybackTarget::SourceElement)
    }
}

impl TrackPlayer {
    pub fn new(target: PlaybackTarget) -> Self {
        Self { target }
    }

    /// Play `track_id` with a caller-supplied media type. The now-playing
    /// panel is left alone.
    pub fn play<D>(&self, doc: &mut D, track_id: impl Display, mime: &str) -> Result<(), PlayerError>
    where
        D: Document + ?Sized,
    {
        let target_id = match self.target {
            PlaybackTarget::AudioElement => AUDIO_ID,
            PlaybackTarget::SourceElement => AUDIO_SOURCE_ID,
        };
        load_stream(doc, target_id, &track_id, mime)
    }

    /// Play `track_id` taking the media type and the now-playing text from
    /// the track's listing row, and point the cover image at its art.
    /// The stream always goes on the `<audio>` element itself, whatever the
    /// player's target. Missing row attributes show as empty text.
    pub fn play_from_row<D>(&self, doc: &mut D, track_id: impl Display) -> Result<(), PlayerError>
    where
        D: Document + ?Sized,
    {
        let row_id = track_row_id(&track_id);
        require(
            doc,
            &[
                row_id.as_str(),
                AUDIO_ID,
                CURRENT_TRACK_ID,
                CURRENT_ARTIST_ID,
                CURRENT_ALBUM_ID,
                CURRENT_ALBUM_PIC_ID,
            ],
        )?;

        let row = doc
            .element(&row_id)
            .ok_or_else(|| PlayerError::MissingElement(row_id.clone()))?;
        let attr = |name: &str| row.attribute(name).unwrap_or_default().to_string();
        let mime = attr(ATTR_MIME);
        let now_playing = NowPlaying {
            title: attr(ATTR_TITLE),
            artist: attr(ATTR_ARTIST),
            album: attr(ATTR_ALBUM),
        };

        load_stream(doc, AUDIO_ID, &track_id, &mime)?;
        self.show_now_playing(doc, &track_id, &now_playing)
    }

    /// Fill the now-playing panel from explicit values
    pub fn show_now_playing<D>(
        &self,
        doc: &mut D,
        track_id: impl Display,
        now_playing: &NowPlaying,
    ) -> Result<(), PlayerError>
    where
        D: Document + ?Sized,
    {
        require(
            doc,
            &[CURRENT_TRACK_ID, CURRENT_ARTIST_ID, CURRENT_ALBUM_ID, CURRENT_ALBUM_PIC_ID],
        )?;

        element_mut(doc, CURRENT_TRACK_ID)?.set_inner_text(now_playing.title.as_str());
        element_mut(doc, CURRENT_ARTIST_ID)?.set_inner_text(now_playing.artist.as_str());
        element_mut(doc, CURRENT_ALBUM_ID)?.set_inner_text(now_playing.album.as_str());
        element_mut(doc, CURRENT_ALBUM_PIC_ID)?.set_attribute("src", cover_url(&track_id));
        Ok(())
    }

    /// Sorting the listing has no defined order yet; leaves the page as is.
    pub fn sort_tracks<D>(&self, _doc: &mut D, _attr: &str) -> Result<(), PlayerError>
    where
        D: Document + ?Sized,
    {
        Ok(())
    }
}

/// Point `target_id` at the track's stream, then reload and play the audio element
fn load_stream<D>(
    doc: &mut D,
    target_id: &str,
    track_id: impl Display,
    mime: &str,
) -> Result<(), PlayerError>
where
    D: Document + ?Sized,
{
    require(doc, &[target_id, AUDIO_ID])?;

    let target = element_mut(doc, target_id)?;
    target.set_attribute("src", stream_url(&track_id));
    target.set_attribute("type", mime);

    doc.load(AUDIO_ID)?;
    doc.play(AUDIO_ID)
}

/// Fail before touching anything when an element the operation needs is absent
fn require<D: Document + ?Sized>(doc: &D, ids: &[&str]) -> Result<(), PlayerError> {
    match ids.iter().find(|id| doc.element(id).is_none()) {
        Some(id) => Err(PlayerError::MissingElement(id.to_string())),
        None => Ok(()),
    }
}

fn element_mut<'a, D: Document + ?Sized>(
    doc: &'a mut D,
    id: &str,
) -> Result<&'a mut super::document::Element, PlayerError> {
    doc.element_mut(id)
        .ok_or_else(|| PlayerError::MissingElement(id.to_string()))
}
