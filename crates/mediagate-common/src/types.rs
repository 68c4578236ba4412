//! Core type definitions shared by the provider integrations.
//!
//! Collection types are serialized exactly as Jellyfin and Emby spell them
//! (lowercase, no separators) so they can be deserialized straight from
//! media-server payloads.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of library exposed to the rest of the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LibraryKind {
    /// Library holding movies.
    Movie,
    /// Library holding series (and anything else that is not a movie).
    Show,
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Show => write!(f, "show"),
        }
    }
}

/// Collection type of a media-server folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    /// Movie library.
    Movies,
    /// TV series library.
    TvShows,
    /// Music library.
    Music,
    /// Book / audiobook library.
    Books,
    /// Music video library.
    MusicVideos,
    /// Home video and photo library.
    HomeVideos,
    /// Box set collection.
    BoxSets,
    /// Mixed content library.
    Mixed,
    /// Any collection type this crate does not know about.
    #[serde(other)]
    Other,
}

impl CollectionType {
    /// Collection types that never hold requestable movies or shows.
    pub const EXCLUDED: [CollectionType; 5] = [
        CollectionType::Music,
        CollectionType::Books,
        CollectionType::MusicVideos,
        CollectionType::HomeVideos,
        CollectionType::BoxSets,
    ];

    /// Whether folders of this type are dropped from library listings.
    pub fn is_excluded(&self) -> bool {
        Self::EXCLUDED.contains(self)
    }
}

impl fmt::Display for CollectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movies => write!(f, "movies"),
            Self::TvShows => write!(f, "tvshows"),
            Self::Music => write!(f, "music"),
            Self::Books => write!(f, "books"),
            Self::MusicVideos => write!(f, "musicvideos"),
            Self::HomeVideos => write!(f, "homevideos"),
            Self::BoxSets => write!(f, "boxsets"),
            Self::Mixed => write!(f, "mixed"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Flavour of media server behind a Jellyfin-compatible API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaServerKind {
    /// Jellyfin server.
    #[default]
    Jellyfin,
    /// Emby server.
    Emby,
}

impl fmt::Display for MediaServerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Jellyfin => write!(f, "jellyfin"),
            Self::Emby => write!(f, "emby"),
        }
    }
}
