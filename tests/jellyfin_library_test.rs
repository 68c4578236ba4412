//! Library listing and item fetches against a mocked Jellyfin/Emby server.

mod common;

use assert_matches::assert_matches;
use mediagate::jellyfin::{FetchContext, JellyfinClient};
use mediagate::GatewayError;
use mediagate_common::{LibraryKind, MediaServerKind};
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{folder, item, items, jellyfin_client, jellyfin_config};

// ---------------------------------------------------------------------------
// Libraries
// ---------------------------------------------------------------------------

#[tokio::test]
async fn media_folders_are_mapped_to_libraries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Library/MediaFolders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            folder("1", "Movies", Some("movies")),
            folder("2", "Shows", Some("tvshows")),
            folder("3", "Music", Some("music")),
            folder("4", "Books", Some("books")),
            folder("5", "Mixed", None),
            json!({"Id": "6", "Name": "Playlists", "Type": "ManualPlaylistsFolder"}),
        ])))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let libraries = client.libraries().await;

    let summary: Vec<(&str, &str, LibraryKind)> = libraries
        .iter()
        .map(|l| (l.id.as_str(), l.title.as_str(), l.kind))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("1", "Movies", LibraryKind::Movie),
            ("2", "Shows", LibraryKind::Show),
            ("5", "Mixed", LibraryKind::Show),
        ]
    );
    assert!(libraries.iter().all(|l| l.agent == "jellyfin"));
}

#[tokio::test]
async fn libraries_fall_back_to_user_views() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Library/MediaFolders"))
        .respond_with(ResponseTemplate::new(403))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/user-1/Views"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(items(vec![folder("9", "Films", Some("movies"))])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = jellyfin_client(&server).with_user_id("user-1");
    let libraries = client.libraries().await;

    assert_eq!(libraries.len(), 1);
    assert_eq!(libraries[0].id, "9");
    assert_eq!(libraries[0].kind, LibraryKind::Movie);
}

#[tokio::test]
async fn both_listings_failing_yields_no_libraries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Library/MediaFolders"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users/Me/Views"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    assert!(client.libraries().await.is_empty());
}

#[tokio::test]
async fn unreachable_server_yields_no_libraries() {
    common::init_tracing();
    let client = JellyfinClient::new(&jellyfin_config("http://127.0.0.1:1")).unwrap();
    assert!(client.libraries().await.is_empty());
}

#[tokio::test]
async fn library_contents_drop_virtual_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(query_param("ParentId", "lib-1"))
        .and(query_param("Recursive", "true"))
        .and(query_param("IncludeItemTypes", "Series,Movie,Others"))
        .and(query_param("SortBy", "SortName"))
        .and(query_param("collapseBoxSetItems", "false"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            item("a", "Alien", "FileSystem"),
            item("b", "Blade Runner", "Virtual"),
            item("c", "Contact", "Remote"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let contents = client.library_contents("lib-1").await.unwrap();
    let ids: Vec<&str> = contents.iter().map(|i| i.id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c"]);
}

// ---------------------------------------------------------------------------
// Recently added
// ---------------------------------------------------------------------------

#[tokio::test]
async fn recently_added_on_jellyfin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items/Latest"))
        .and(query_param("Limit", "12"))
        .and(query_param("ParentId", "lib-1"))
        .and(query_param("userId", "user-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([item("n", "New", "FileSystem")])))
        .expect(1)
        .mount(&server)
        .await;

    let client = jellyfin_client(&server).with_user_id("user-1");
    let latest = client.recently_added("lib-1").await.unwrap();
    assert_eq!(latest[0].name, "New");
}

#[tokio::test]
async fn recently_added_on_emby() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Users/user-1/Items/Latest"))
        .and(query_param("Limit", "12"))
        .and(query_param("ParentId", "lib-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([item("n", "New", "FileSystem")])))
        .expect(1)
        .mount(&server)
        .await;

    common::init_tracing();
    let mut config = jellyfin_config(&server.uri());
    config.server_kind = MediaServerKind::Emby;
    let client = JellyfinClient::new(&config).unwrap().with_user_id("user-1");

    let latest = client.recently_added("lib-1").await.unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(client.server_kind(), MediaServerKind::Emby);
}

// ---------------------------------------------------------------------------
// Item data
// ---------------------------------------------------------------------------

#[tokio::test]
async fn item_data_returns_first_match() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .and(query_param("ids", "abc"))
        .and(query_param("fields", "ProviderIds,MediaSources,Width,Height,IsHD,DateCreated"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![json!({
            "Id": "abc",
            "Name": "Dune",
            "Type": "Movie",
            "ProviderIds": {"Tmdb": "438631"},
            "IsHD": true
        })])))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let item = client.item_data("abc", FetchContext::default()).await.unwrap().unwrap();
    assert_eq!(item.provider_ids.tmdb.as_deref(), Some("438631"));
    assert_eq!(item.is_hd, Some(true));
}

#[tokio::test]
async fn item_data_without_match_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![])))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    assert!(client.item_data("gone", FetchContext::default()).await.unwrap().is_none());
}

#[tokio::test]
async fn item_data_server_error_is_a_miss_during_sync() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);

    let during_sync = client.item_data("abc", FetchContext::sync()).await.unwrap();
    assert!(during_sync.is_none());

    let outside_sync = client.item_data("abc", FetchContext::default()).await.unwrap_err();
    assert_matches!(outside_sync, GatewayError::InvalidAuthToken { status: Some(500) });
}

#[tokio::test]
async fn item_data_other_errors_fail_even_during_sync() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Items"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let err = client.item_data("abc", FetchContext::sync()).await.unwrap_err();
    assert_matches!(err, GatewayError::InvalidAuthToken { status: Some(404) });
}

// ---------------------------------------------------------------------------
// Seasons and episodes
// ---------------------------------------------------------------------------

#[tokio::test]
async fn episodes_drop_virtual_items() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/Shows/series-1/Seasons"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            item("s1", "Season 1", "FileSystem"),
            item("s2", "Season 2", "Virtual"),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Shows/series-1/Episodes"))
        .and(query_param("seasonId", "s1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            item("e1", "Pilot", "FileSystem"),
            item("e2", "Unaired", "Virtual"),
        ])))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);

    let seasons = client.seasons("series-1").await.unwrap();
    assert_eq!(seasons.len(), 2);

    let episodes = client.episodes("series-1", "s1").await.unwrap();
    assert_eq!(episodes.len(), 1);
    assert_eq!(episodes[0].id, "e1");
}

// ---------------------------------------------------------------------------
// Server info, users, API keys
// ---------------------------------------------------------------------------

#[tokio::test]
async fn data_fetch_failures_are_session_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/System/Info"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Users"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);

    let err = client.system_info().await.unwrap_err();
    assert_matches!(err, GatewayError::InvalidAuthToken { status: Some(401) });

    let err = client.users().await.unwrap_err();
    assert_matches!(err, GatewayError::InvalidAuthToken { status: Some(403) });
}

#[tokio::test]
async fn server_name_failures_are_unknown() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/System/Info/Public"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let err = client.server_name().await.unwrap_err();
    assert_matches!(err, GatewayError::Unknown { status: Some(401), .. });
}

#[tokio::test]
async fn server_name_is_read_from_public_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/System/Info/Public"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"ServerName": "Living Room", "Version": "10.9.0"})),
        )
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    assert_eq!(client.server_name().await.unwrap(), "Living Room");
}

#[tokio::test]
async fn api_token_is_the_newest_key_for_the_app() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Auth/Keys"))
        .and(query_param("App", "Mediagate"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Auth/Keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![
            json!({"AppName": "Mediagate", "AccessToken": "old"}),
            json!({"AppName": "Other", "AccessToken": "other"}),
            json!({"AppName": "Mediagate", "AccessToken": "new"}),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = jellyfin_client(&server).with_token("admin-token").unwrap();
    assert_eq!(client.create_api_token("Mediagate").await.unwrap(), "new");
}

#[tokio::test]
async fn missing_api_token_is_a_session_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/Auth/Keys"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/Auth/Keys"))
        .respond_with(ResponseTemplate::new(200).set_body_json(items(vec![])))
        .mount(&server)
        .await;

    let client = jellyfin_client(&server);
    let err = client.create_api_token("Mediagate").await.unwrap_err();
    assert_matches!(err, GatewayError::InvalidAuthToken { status: None });
}
