//! Jellyfin / Emby media-server client.
//!
//! Every request carries the client identity in `X-Emby-Authorization`. Data
//! fetches that fail for any reason other than an unreachable host are
//! reported as [`GatewayError::InvalidAuthToken`].

pub mod auth;
pub mod credential;
pub mod library;
pub mod models;

use std::time::Duration;

use async_trait::async_trait;
use mediagate_common::{GatewayError, MediaServerKind, Result};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use crate::config::JellyfinConfig;
use crate::gateway::{GatewayClient, GatewayOptions, QueryParams};

pub use auth::{negotiate_login, Authenticator, LoginState};
pub use credential::{ProviderCredential, AUTHORIZATION_HEADER};
pub use library::{map_libraries, LibraryDescriptor, LIBRARY_AGENT};
use models::*;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const PROVIDER: &str = "jellyfin";
const RECENTLY_ADDED_LIMIT: u32 = 12;
const ITEM_DATA_FIELDS: &str = "ProviderIds,MediaSources,Width,Height,IsHD,DateCreated";

/// Caller context for fetches whose failure policy depends on what is running.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchContext {
    /// An availability sync is running: items that vanished from the server
    /// (answered with 500) are reported as missing instead of failing.
    pub tolerate_missing: bool,
}

impl FetchContext {
    /// Context of an availability-sync pass.
    pub fn sync() -> Self {
        Self {
            tolerate_missing: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Client for one Jellyfin or Emby server and one credential.
#[derive(Debug)]
pub struct JellyfinClient {
    config: JellyfinConfig,
    credential: ProviderCredential,
    gateway: GatewayClient,
    user_id: Option<String>,
}

impl JellyfinClient {
    /// Anonymous client, suitable for [`JellyfinClient::login`].
    pub fn new(config: &JellyfinConfig) -> Result<Self> {
        Self::with_credential(config.clone(), ProviderCredential::from_config(config))
    }

    fn with_credential(config: JellyfinConfig, credential: ProviderCredential) -> Result<Self> {
        let mut options = GatewayOptions::new(PROVIDER, config.url.clone());
        options.headers.push((
            HeaderName::from_static(AUTHORIZATION_HEADER),
            credential.header_value(),
        ));
        options.timeout = Duration::from_secs(config.timeout_secs);
        options.rate_limit = config.rate_limit.clone();

        Ok(Self {
            gateway: GatewayClient::new(options)?,
            config,
            credential,
            user_id: None,
        })
    }

    /// New client for the same server, authenticated with `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Result<Self> {
        let mut client = Self::with_credential(self.config.clone(), self.credential.with_token(token))?;
        client.user_id = self.user_id.clone();
        Ok(client)
    }

    /// Scope user-relative endpoints to `user_id` instead of `Me`.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    pub fn credential(&self) -> &ProviderCredential {
        &self.credential
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    pub fn server_kind(&self) -> MediaServerKind {
        self.config.server_kind
    }

    pub fn gateway(&self) -> &GatewayClient {
        &self.gateway
    }

    fn user_path(&self) -> &str {
        self.user_id.as_deref().unwrap_or("Me")
    }

    // -----------------------------------------------------------------------
    // Authentication
    // -----------------------------------------------------------------------

    /// Log in with a username and password. See [`negotiate_login`] for the
    /// retry policy around `client_ip`.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        client_ip: Option<&str>,
    ) -> Result<LoginResponse> {
        negotiate_login(self, username, password, client_ip).await
    }

    /// Issue an API key for `app_name` and return it.
    pub async fn create_api_token(&self, app_name: &str) -> Result<String> {
        self.gateway
            .post_empty("/Auth/Keys", QueryParams::new().set("App", app_name))
            .await
            .map_err(|e| session_error("create API key", e))?;

        let keys: ItemsResponse<ApiKey> = self
            .gateway
            .get("/Auth/Keys", QueryParams::new())
            .await
            .map_err(|e| session_error("list API keys", e))?;

        keys.items
            .into_iter()
            .rev()
            .find(|key| key.app_name == app_name)
            .map(|key| key.access_token)
            .ok_or_else(|| {
                error!(app = %app_name, "Created API key not found in key listing");
                GatewayError::InvalidAuthToken { status: None }
            })
    }

    // -----------------------------------------------------------------------
    // Server and users
    // -----------------------------------------------------------------------

    pub async fn system_info(&self) -> Result<SystemInfo> {
        self.gateway
            .get("/System/Info", QueryParams::new())
            .await
            .map_err(GatewayError::into_session_error)
    }

    pub async fn server_name(&self) -> Result<String> {
        let info: PublicSystemInfo = self
            .gateway
            .get("/System/Info/Public", QueryParams::new())
            .await
            .map_err(|e| {
                error!(
                    status = ?e.status(),
                    error = %e,
                    "Something went wrong while getting the server name from the media server"
                );
                e.into_unknown()
            })?;
        Ok(info.server_name)
    }

    pub async fn users(&self) -> Result<Vec<User>> {
        self.gateway
            .get("/Users", QueryParams::new())
            .await
            .map_err(|e| session_error("list users", e))
    }

    /// The configured user, or the token's own user.
    pub async fn user(&self) -> Result<User> {
        self.gateway
            .get(&format!("/Users/{}", self.user_path()), QueryParams::new())
            .await
            .map_err(|e| session_error("get user", e))
    }

    // -----------------------------------------------------------------------
    // Libraries
    // -----------------------------------------------------------------------

    /// Movie and show libraries.
    ///
    /// Falls back to the user's views when the media-folder listing fails
    /// (some directory-backed users may not list folders). Returns an empty
    /// list when both fail.
    pub async fn libraries(&self) -> Vec<LibraryDescriptor> {
        let folders = match self
            .gateway
            .get::<ItemsResponse<MediaFolder>>("/Library/MediaFolders", QueryParams::new())
            .await
        {
            Ok(response) => response.items,
            Err(e) => {
                debug!(status = ?e.status(), error = %e, "Media folder listing failed, trying user views");
                let path = format!("/Users/{}/Views", self.user_path());
                match self
                    .gateway
                    .get::<ItemsResponse<MediaFolder>>(&path, QueryParams::new())
                    .await
                {
                    Ok(response) => response.items,
                    Err(e) => {
                        error!(
                            status = ?e.status(),
                            error = %e,
                            "Something went wrong while getting libraries from the media server"
                        );
                        return Vec::new();
                    }
                }
            }
        };

        map_libraries(&folders)
    }

    /// Every movie and series in a library, virtual entries removed.
    pub async fn library_contents(&self, library_id: &str) -> Result<Vec<LibraryItem>> {
        let params = QueryParams::new()
            .set("SortBy", "SortName")
            .set("SortOrder", "Ascending")
            .set("IncludeItemTypes", "Series,Movie,Others")
            .set("Recursive", true)
            .set("StartIndex", 0)
            .set("ParentId", library_id)
            .set("collapseBoxSetItems", false);

        let response: ItemsResponse<LibraryItem> = self
            .gateway
            .get("/Items", params)
            .await
            .map_err(|e| session_error("get library contents", e))?;

        Ok(without_virtual(response.items))
    }

    /// Latest additions to a library.
    pub async fn recently_added(&self, library_id: &str) -> Result<Vec<LibraryItem>> {
        let params = QueryParams::new()
            .set("Limit", RECENTLY_ADDED_LIMIT)
            .set("ParentId", library_id);

        let (path, params) = match self.config.server_kind {
            MediaServerKind::Jellyfin => (
                "/Items/Latest".to_string(),
                params.set("userId", self.user_path()),
            ),
            MediaServerKind::Emby => (format!("/Users/{}/Items/Latest", self.user_path()), params),
        };

        self.gateway
            .get(&path, params)
            .await
            .map_err(|e| session_error("get recently added", e))
    }

    /// Full details of one item, or `None` when the server does not know it.
    ///
    /// During an availability sync a 500 answer is treated as a missing item.
    pub async fn item_data(&self, item_id: &str, ctx: FetchContext) -> Result<Option<LibraryItem>> {
        let params = QueryParams::new()
            .set("ids", item_id)
            .set("fields", ITEM_DATA_FIELDS);

        match self.gateway.get::<ItemsResponse<LibraryItem>>("/Items", params).await {
            Ok(response) => Ok(response.items.into_iter().next()),
            Err(e) if ctx.tolerate_missing && e.status() == Some(500) => {
                debug!(item = %item_id, "Item lookup failed during sync, treating as missing");
                Ok(None)
            }
            Err(e) => Err(session_error("get item data", e)),
        }
    }

    pub async fn seasons(&self, series_id: &str) -> Result<Vec<LibraryItem>> {
        let response: ItemsResponse<LibraryItem> = self
            .gateway
            .get(&format!("/Shows/{series_id}/Seasons"), QueryParams::new())
            .await
            .map_err(|e| session_error("list seasons", e))?;
        Ok(response.items)
    }

    /// Episodes of one season, virtual entries removed.
    pub async fn episodes(&self, series_id: &str, season_id: &str) -> Result<Vec<LibraryItem>> {
        let response: ItemsResponse<LibraryItem> = self
            .gateway
            .get(
                &format!("/Shows/{series_id}/Episodes"),
                QueryParams::new().set("seasonId", season_id),
            )
            .await
            .map_err(|e| session_error("list episodes", e))?;
        Ok(without_virtual(response.items))
    }
}

#[async_trait]
impl Authenticator for JellyfinClient {
    async fn authenticate(
        &self,
        username: &str,
        password: &str,
        forwarded_for: Option<&str>,
    ) -> Result<LoginResponse> {
        let mut headers = HeaderMap::new();
        if let Some(ip) = forwarded_for {
            match HeaderValue::from_str(ip) {
                Ok(value) => {
                    headers.insert(HeaderName::from_static("x-forwarded-for"), value);
                }
                Err(e) => warn!(ip = %ip, error = %e, "Ignoring unusable client address"),
            }
        }

        let body = LoginRequest { username, password };
        self.gateway
            .post_json("/Users/AuthenticateByName", &body, headers)
            .await
    }
}

fn without_virtual(items: Vec<LibraryItem>) -> Vec<LibraryItem> {
    items.into_iter().filter(|item| !item.is_virtual()).collect()
}

/// Log a failed data fetch and re-classify it as a session failure.
fn session_error(action: &str, err: GatewayError) -> GatewayError {
    error!(
        action,
        status = ?err.status(),
        error = %err,
        "Something went wrong while talking to the media server"
    );
    err.into_session_error()
}
