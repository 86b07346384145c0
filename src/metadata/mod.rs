// Metadata module
// Tag extraction through suffix-keyed providers

pub mod extractor;
pub mod parser;
pub mod provider;

use std::fmt;

pub use extractor::LoftyProvider;
pub use provider::{MetadataProvider, ProviderRegistry, RegistryError};

/// Binary data accompanied by a MIME type, e.g. embedded cover art
#[derive(Clone, PartialEq, Eq)]
pub struct MimeData {
    pub mime: String,
    pub data: Vec<u8>,
}

impl MimeData {
    pub fn new(mime: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            mime: mime.into(),
            data,
        }
    }
}

// Cover art can be megabytes; show its size instead of the bytes.
impl fmt::Debug for MimeData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MimeData")
            .field("mime", &self.mime)
            .field("len", &self.data.len())
            .finish()
    }
}

/// Metadata a provider extracts from one audio file.
///
/// Empty tag values are never stored; a field is either `None` or non-empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackMetadata {
    /// The file's playback MIME type
    pub mime: String,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Reinterpreting artist, e.g. a remixer
    pub modified_by: Option<String>,
    /// Preferred identifier over `artist` for grouping
    pub grouping: Option<String>,
    pub copyright: Option<String>,
    pub publisher: Option<String>,
    pub composer: Option<String>,
    /// Track number, the `X` of `X` or `X/Y`
    pub track: Option<i64>,
    /// CD/set number, the `X` of `X` or `X/Y`
    pub set: Option<i64>,
    pub bpm: Option<i64>,
    pub year: Option<i64>,
    pub genre: Option<String>,
    pub codec: Option<String>,
    pub encoded_by: Option<String>,
    pub cover: Option<MimeData>,
}
