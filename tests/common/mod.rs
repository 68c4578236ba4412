//! Shared test harness for integration tests.
//!
//! Provides client constructors pointed at a [`MockServer`] and JSON
//! fixtures for the upstream payloads the tests serve.

#![allow(dead_code)]

use std::sync::{Arc, Once};

use mediagate::config::{JellyfinConfig, RateLimitConfig, SettingsStore, TmdbConfig};
use mediagate::jellyfin::JellyfinClient;
use mediagate::tmdb::{CatalogOptions, TmdbClient};
use serde_json::{json, Value};
use wiremock::MockServer;

pub const API_KEY: &str = "test-key";
pub const DEVICE_ID: &str = "test-device";

static TRACING: Once = Once::new();

/// Route `tracing` output to the test writer, honoring `RUST_LOG`.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

// ---------------------------------------------------------------------------
// TMDB
// ---------------------------------------------------------------------------

pub fn tmdb_config(server: &MockServer) -> TmdbConfig {
    TmdbConfig {
        api_key: API_KEY.to_string(),
        base_url: server.uri(),
        timeout_secs: 5,
        ..TmdbConfig::default()
    }
}

/// TMDB client against `server` with the given locale, plus the settings
/// store feeding its keyword blocklist.
pub fn tmdb_client(server: &MockServer, locale: &str) -> (TmdbClient, Arc<SettingsStore>) {
    init_tracing();
    let settings = Arc::new(SettingsStore::default());
    let options = CatalogOptions {
        locale: locale.to_string(),
        ..CatalogOptions::default()
    };
    let client = TmdbClient::new(&tmdb_config(server), options, settings.clone())
        .expect("failed to build TMDB client");
    (client, settings)
}

pub fn movie(id: u64, title: &str, overview: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "overview": overview,
        "release_date": "2021-10-22",
        "genre_ids": [878],
        "popularity": 10.5,
        "vote_average": 7.8,
        "vote_count": 1000
    })
}

pub fn page(results: Vec<Value>) -> Value {
    let total = results.len();
    json!({
        "page": 1,
        "results": results,
        "total_pages": 1,
        "total_results": total
    })
}

// ---------------------------------------------------------------------------
// Jellyfin
// ---------------------------------------------------------------------------

pub fn jellyfin_config(url: &str) -> JellyfinConfig {
    let mut config = JellyfinConfig::new(url);
    config.device_id = Some(DEVICE_ID.to_string());
    config.client_version = "1.0.0".to_string();
    config.timeout_secs = 5;
    config.rate_limit = RateLimitConfig::default();
    config
}

pub fn jellyfin_client(server: &MockServer) -> JellyfinClient {
    init_tracing();
    JellyfinClient::new(&jellyfin_config(&server.uri())).expect("failed to build Jellyfin client")
}

pub fn login_response() -> Value {
    json!({
        "User": {
            "Id": "user-1",
            "Name": "alice",
            "ServerId": "server-1",
            "Policy": {"IsAdministrator": true, "IsDisabled": false}
        },
        "AccessToken": "session-token"
    })
}

pub fn folder(id: &str, name: &str, collection_type: Option<&str>) -> Value {
    let mut folder = json!({"Id": id, "Name": name, "Type": "CollectionFolder"});
    if let Some(collection_type) = collection_type {
        folder["CollectionType"] = json!(collection_type);
    }
    folder
}

pub fn item(id: &str, name: &str, location: &str) -> Value {
    json!({"Id": id, "Name": name, "Type": "Movie", "LocationType": location})
}

pub fn items(items: Vec<Value>) -> Value {
    let total = items.len();
    json!({"Items": items, "TotalRecordCount": total, "StartIndex": 0})
}
