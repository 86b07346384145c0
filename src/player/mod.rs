// Track player module
// Drives the dashboard's audio element and now-playing panel

pub mod controller;
pub mod document;

use thiserror::Error;

pub use controller::{NowPlaying, PlaybackTarget, TrackPlayer};
pub use document::{Document, Element, MediaState, Page};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayerError {
    #[error("no element with id \"{0}\" in the document")]
    MissingElement(String),
}
