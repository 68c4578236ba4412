//! Mapping of media-server folders to library descriptors.

use mediagate_common::{CollectionType, LibraryKind};
use serde::{Deserialize, Serialize};

use super::models::MediaFolder;

/// Agent name attached to every library coming from a media server.
pub const LIBRARY_AGENT: &str = "jellyfin";

const COLLECTION_FOLDER: &str = "CollectionFolder";

/// A movie or show library exposed by the media server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    pub id: String,
    pub title: String,
    pub kind: LibraryKind,
    pub agent: String,
}

impl From<&MediaFolder> for LibraryDescriptor {
    fn from(folder: &MediaFolder) -> Self {
        let kind = match folder.collection_type {
            Some(CollectionType::Movies) => LibraryKind::Movie,
            _ => LibraryKind::Show,
        };
        Self {
            id: folder.id.clone(),
            title: folder.name.clone(),
            kind,
            agent: LIBRARY_AGENT.to_string(),
        }
    }
}

/// Keep collection folders that can hold movies or shows and describe them.
///
/// Folders without a collection type (mixed content) are kept as shows.
pub fn map_libraries(folders: &[MediaFolder]) -> Vec<LibraryDescriptor> {
    folders
        .iter()
        .filter(|folder| folder.folder_type == COLLECTION_FOLDER)
        .filter(|folder| !folder.collection_type.is_some_and(|t| t.is_excluded()))
        .map(LibraryDescriptor::from)
        .collect()
}
