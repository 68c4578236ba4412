use mediagate_common::MediaServerKind;
use serde::{Deserialize, Serialize};

use super::settings::MainSettings;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub tmdb: TmdbConfig,

    #[serde(default)]
    pub jellyfin: Option<JellyfinConfig>,

    #[serde(default)]
    pub settings: MainSettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TmdbConfig {
    /// API key appended to every catalog request
    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_tmdb_base_url")]
    pub base_url: String,

    /// Transport timeout in seconds (default: 30)
    #[serde(default = "default_tmdb_timeout")]
    pub timeout_secs: u64,

    /// TTL applied when a call asks for caching without its own TTL.
    /// Zero disables caching for such calls (default: 0)
    #[serde(default)]
    pub cache_default_ttl_secs: u64,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_tmdb_base_url() -> String {
    "https://api.themoviedb.org/3".to_string()
}

fn default_tmdb_timeout() -> u64 {
    30
}

impl Default for TmdbConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_tmdb_base_url(),
            timeout_secs: default_tmdb_timeout(),
            cache_default_ttl_secs: 0,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JellyfinConfig {
    pub url: String,

    #[serde(default)]
    pub server_kind: MediaServerKind,

    #[serde(default = "default_client_name")]
    pub client_name: String,

    #[serde(default = "default_client_name")]
    pub device_name: String,

    /// Stable device identifier; a per-process fallback is generated when unset
    #[serde(default)]
    pub device_id: Option<String>,

    /// Version reported in the authorization header (default: crate version)
    #[serde(default = "default_client_version")]
    pub client_version: String,

    /// Transport timeout in seconds (default: 10)
    #[serde(default = "default_jellyfin_timeout")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

fn default_client_name() -> String {
    "Mediagate".to_string()
}

fn default_client_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_jellyfin_timeout() -> u64 {
    10
}

impl JellyfinConfig {
    /// Config for `url` with every other field at its default.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            server_kind: MediaServerKind::default(),
            client_name: default_client_name(),
            device_name: default_client_name(),
            device_id: None,
            client_version: default_client_version(),
            timeout_secs: default_jellyfin_timeout(),
            rate_limit: RateLimitConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct RateLimitConfig {
    /// Admissions allowed per rolling window (default: 20)
    #[serde(default = "default_max_requests")]
    pub max_requests: u32,

    /// Rolling window length in milliseconds (default: 1000)
    #[serde(default = "default_window_ms")]
    pub window_ms: u64,

    /// Maximum average admissions per second (default: 50)
    #[serde(default = "default_max_rps")]
    pub max_rps: u32,
}

fn default_max_requests() -> u32 {
    20
}

fn default_window_ms() -> u64 {
    1000
}

fn default_max_rps() -> u32 {
    50
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: default_max_requests(),
            window_ms: default_window_ms(),
            max_rps: default_max_rps(),
        }
    }
}
