//! Jellyfin/Emby response payloads (PascalCase on the wire).

use mediagate_common::CollectionType;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserConfiguration {
    pub grouped_folders: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserPolicy {
    pub is_administrator: bool,
    pub is_disabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    pub id: String,
    pub name: String,
    pub server_id: Option<String>,
    pub server_name: Option<String>,
    pub primary_image_tag: Option<String>,
    pub configuration: UserConfiguration,
    pub policy: UserPolicy,
}

/// `POST /Users/AuthenticateByName` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LoginResponse {
    pub user: User,
    pub access_token: String,
}

/// Request body of `POST /Users/AuthenticateByName`.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LoginRequest<'a> {
    #[serde(rename = "Username")]
    pub username: &'a str,
    #[serde(rename = "Pw")]
    pub password: &'a str,
}

/// Entry of `/Library/MediaFolders` or `/Users/{id}/Views`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MediaFolder {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub folder_type: String,
    pub collection_type: Option<CollectionType>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum LocationType {
    #[default]
    FileSystem,
    Offline,
    Remote,
    Virtual,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ProviderIds {
    pub tmdb: Option<String>,
    pub imdb: Option<String>,
    pub tvdb: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MediaStream {
    pub codec: Option<String>,
    #[serde(rename = "Type")]
    pub stream_type: String,
    pub height: Option<u32>,
    pub width: Option<u32>,
    pub average_frame_rate: Option<f64>,
    pub real_frame_rate: Option<f64>,
    pub language: Option<String>,
    pub display_title: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct MediaSource {
    pub id: String,
    pub protocol: Option<String>,
    pub path: Option<String>,
    #[serde(rename = "Type")]
    pub source_type: Option<String>,
    pub video_type: Option<String>,
    pub media_streams: Vec<MediaStream>,
}

/// Library item. The detail fields are only populated when requested via
/// `fields=` (see [`JellyfinClient::item_data`](super::JellyfinClient::item_data)).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct LibraryItem {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub item_type: String,
    pub location_type: LocationType,
    pub has_subtitles: bool,
    pub media_type: Option<String>,
    pub series_name: Option<String>,
    pub series_id: Option<String>,
    pub season_id: Option<String>,
    pub season_name: Option<String>,
    pub index_number: Option<u32>,
    pub index_number_end: Option<u32>,
    pub parent_index_number: Option<u32>,

    pub provider_ids: ProviderIds,
    pub media_sources: Vec<MediaSource>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    #[serde(rename = "IsHD")]
    pub is_hd: Option<bool>,
    pub date_created: Option<String>,
}

impl LibraryItem {
    /// Placeholder entries the server lists for missing media.
    pub fn is_virtual(&self) -> bool {
        self.location_type == LocationType::Virtual
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ItemsResponse<T> {
    pub items: Vec<T>,
    pub total_record_count: u64,
    pub start_index: u64,
}

impl<T> Default for ItemsResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total_record_count: 0,
            start_index: 0,
        }
    }
}

/// `/System/Info` response; only the commonly used fields are typed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct SystemInfo {
    pub id: String,
    pub server_name: String,
    pub version: String,
    pub product_name: Option<String>,
    pub operating_system: Option<String>,
    pub local_address: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PublicSystemInfo {
    pub server_name: String,
    pub version: Option<String>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ApiKey {
    pub access_token: String,
    pub app_name: String,
    pub date_created: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_folder_decodes_collection_type() {
        let json = r#"[
            {"Id": "1", "Name": "Movies", "Type": "CollectionFolder", "CollectionType": "movies"},
            {"Id": "2", "Name": "Shows", "Type": "CollectionFolder", "CollectionType": "tvshows"},
            {"Id": "3", "Name": "Photos", "Type": "CollectionFolder", "CollectionType": "photos"},
            {"Id": "4", "Name": "Mixed", "Type": "CollectionFolder"}
        ]"#;
        let folders: Vec<MediaFolder> = serde_json::from_str(json).unwrap();
        assert_eq!(folders[0].collection_type, Some(CollectionType::Movies));
        assert_eq!(folders[1].collection_type, Some(CollectionType::TvShows));
        assert_eq!(folders[2].collection_type, Some(CollectionType::Other));
        assert_eq!(folders[3].collection_type, None);
    }

    #[test]
    fn item_decodes_location_and_provider_ids() {
        let json = r#"{
            "Id": "abc", "Name": "Dune", "Type": "Movie", "LocationType": "Virtual",
            "ProviderIds": {"Tmdb": "438631", "Imdb": "tt1160419"}, "IsHD": true,
            "MediaSources": [{"Id": "s1", "MediaStreams": [{"Type": "Video", "Width": 3840}]}]
        }"#;
        let item: LibraryItem = serde_json::from_str(json).unwrap();
        assert!(item.is_virtual());
        assert_eq!(item.provider_ids.tmdb.as_deref(), Some("438631"));
        assert_eq!(item.is_hd, Some(true));
        assert_eq!(item.media_sources[0].media_streams[0].width, Some(3840));
    }

    #[test]
    fn unknown_location_type_is_tolerated() {
        let item: LibraryItem = serde_json::from_str(r#"{"Id": "x", "LocationType": "Cloud"}"#).unwrap();
        assert_eq!(item.location_type, LocationType::Other);
        assert!(!item.is_virtual());
    }
}
