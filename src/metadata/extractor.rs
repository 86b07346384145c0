// Metadata extractor using lofty with id3 fallback for problematic MP3 files
use id3::TagLike;
use lofty::picture::{Picture, PictureType};
use lofty::prelude::{Accessor, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag};
use std::path::Path;
use tracing::{debug, warn};

use super::parser::{non_empty, parse_leading_number};
use super::provider::MetadataProvider;
use super::{MimeData, TrackMetadata};

/// Fallback for pictures that carry no MIME type of their own
const DEFAULT_PICTURE_MIME: &str = "image/jpeg";

/// Playback MIME type for an audio file, guessed from its extension
pub fn guess_mime(path: &Path) -> String {
    mime_guess::from_path(path)
        .first()
        .map(|m| m.essence_str().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Provider backed by lofty, covering every container lofty can probe
pub struct LoftyProvider;

impl MetadataProvider for LoftyProvider {
    fn read_metadata(&self, path: &Path) -> Option<TrackMetadata> {
        match MetadataExtractor::extract_from_file(path) {
            Ok(metadata) => Some(metadata),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to read metadata");
                None
            }
        }
    }
}

pub struct MetadataExtractor;

impl MetadataExtractor {
    pub fn extract_from_file(file_path: &Path) -> Result<TrackMetadata, anyhow::Error> {
        // Try to read the file with lofty first
        let tagged_file = match Probe::open(file_path)?.guess_file_type()?.read() {
            Ok(f) => f,
            Err(e) => {
                debug!(path = %file_path.display(), error = %e, "lofty rejected file");
                return Self::extract_with_fallback(file_path);
            }
        };

        let mut metadata = TrackMetadata {
            mime: guess_mime(file_path),
            codec: Some(format!("{:?}", tagged_file.file_type())),
            ..TrackMetadata::default()
        };

        if let Some(tag) = tagged_file.primary_tag().or(tagged_file.first_tag()) {
            Self::apply_tag(&mut metadata, tag);
        }

        // Cover art may live in a secondary tag
        metadata.cover = tagged_file
            .primary_tag()
            .and_then(Self::pick_cover)
            .or_else(|| tagged_file.tags().iter().find_map(Self::pick_cover));

        Ok(metadata)
    }

    fn apply_tag(metadata: &mut TrackMetadata, tag: &Tag) {
        let text = |key: ItemKey| non_empty(tag.get_string(&key));
        let number = |key: ItemKey| tag.get_string(&key).and_then(parse_leading_number);

        metadata.title = non_empty(tag.title());
        metadata.artist = non_empty(tag.artist());
        metadata.album = non_empty(tag.album());
        metadata.genre = non_empty(tag.genre());
        metadata.modified_by = text(ItemKey::Remixer);
        metadata.grouping = text(ItemKey::AlbumArtist);
        metadata.copyright = text(ItemKey::CopyrightMessage);
        metadata.publisher = text(ItemKey::Publisher).or_else(|| text(ItemKey::Label));
        metadata.composer = text(ItemKey::Composer);
        metadata.encoded_by = text(ItemKey::EncodedBy);

        metadata.track = tag
            .track()
            .map(i64::from)
            .or_else(|| number(ItemKey::TrackNumber));
        metadata.set = tag
            .disk()
            .map(i64::from)
            .or_else(|| number(ItemKey::DiscNumber));
        metadata.bpm = number(ItemKey::Bpm);

        // Malformed year tags are common, fall back to the raw date text
        metadata.year = tag
            .year()
            .map(i64::from)
            .or_else(|| number(ItemKey::Year))
            .or_else(|| number(ItemKey::RecordingDate));
    }

    /// Front cover first, then whatever picture comes first
    fn pick_cover(tag: &Tag) -> Option<MimeData> {
        let pictures = tag.pictures();
        pictures
            .iter()
            .find(|p| p.pic_type() == PictureType::CoverFront)
            .or_else(|| pictures.first())
            .map(Self::picture_to_mime_data)
    }

    fn picture_to_mime_data(picture: &Picture) -> MimeData {
        let mime = picture
            .mime_type()
            .map(|m| m.as_str().to_string())
            .unwrap_or_else(|| DEFAULT_PICTURE_MIME.to_string());
        MimeData::new(mime, picture.data().to_vec())
    }

    /// Fallback extraction method - uses id3 crate for MP3 files
    fn extract_with_fallback(file_path: &Path) -> Result<TrackMetadata, anyhow::Error> {
        let extension = file_path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_lowercase());

        if extension.as_deref() != Some("mp3") {
            anyhow::bail!("unsupported or unreadable audio file");
        }

        let metadata = Self::extract_with_id3(file_path)?;
        debug!(path = %file_path.display(), "extracted metadata using id3 fallback");
        Ok(metadata)
    }

    /// Extract metadata using the id3 crate (more lenient with malformed tags)
    fn extract_with_id3(file_path: &Path) -> Result<TrackMetadata, anyhow::Error> {
        let tag = id3::Tag::read_from_path(file_path)?;

        let frame_text = |id: &str| non_empty(tag.get(id).and_then(|f| f.content().text()));
        let frame_number = |id: &str| {
            tag.get(id)
                .and_then(|f| f.content().text())
                .and_then(parse_leading_number)
        };

        let cover = tag
            .pictures()
            .find(|p| p.picture_type == id3::frame::PictureType::CoverFront)
            .or_else(|| tag.pictures().next())
            .map(|p| {
                let mime = if p.mime_type.is_empty() {
                    DEFAULT_PICTURE_MIME.to_string()
                } else {
                    p.mime_type.clone()
                };
                MimeData::new(mime, p.data.clone())
            });

        Ok(TrackMetadata {
            mime: guess_mime(file_path),
            title: non_empty(tag.title()),
            artist: non_empty(tag.artist()),
            album: non_empty(tag.album()),
            modified_by: frame_text("TPE4"),
            grouping: non_empty(tag.album_artist()),
            copyright: frame_text("TCOP"),
            publisher: frame_text("TPUB"),
            composer: frame_text("TCOM"),
            track: tag.track().map(i64::from),
            set: tag.disc().map(i64::from),
            bpm: frame_number("TBPM"),
            year: tag
                .year()
                .map(i64::from)
                .or_else(|| frame_number("TDRC")),
            genre: non_empty(tag.genre_parsed()),
            codec: frame_text("TFLT"),
            encoded_by: frame_text("TENC"),
            cover,
        })
    }
}
