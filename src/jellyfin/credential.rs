//! Client identity sent to Jellyfin/Emby in `X-Emby-Authorization`.

use std::sync::OnceLock;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use crate::config::JellyfinConfig;

/// Header carrying the client identity and session token.
pub const AUTHORIZATION_HEADER: &str = "x-emby-authorization";

/// Device id for clients configured without one. The random part is
/// generated once per process, so the id is stable for a given client name.
fn fallback_device_id(client_name: &str) -> String {
    static SUFFIX: OnceLock<String> = OnceLock::new();
    let suffix = SUFFIX.get_or_init(|| uuid::Uuid::new_v4().simple().to_string());
    BASE64.encode(format!("BOT_{client_name}_fallback_{suffix}"))
}

/// Identity of this client towards a media server. Immutable; a new login
/// produces a new credential via [`ProviderCredential::with_token`].
#[derive(Clone, PartialEq, Eq)]
pub struct ProviderCredential {
    client: String,
    device: String,
    device_id: String,
    version: String,
    token: Option<String>,
}

impl ProviderCredential {
    pub fn new(
        client: impl Into<String>,
        device: impl Into<String>,
        device_id: Option<String>,
        version: impl Into<String>,
    ) -> Self {
        let client = client.into();
        let device_id = device_id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| fallback_device_id(&client));

        Self {
            client,
            device: device.into(),
            device_id,
            version: version.into(),
            token: None,
        }
    }

    pub fn from_config(config: &JellyfinConfig) -> Self {
        Self::new(
            config.client_name.clone(),
            config.device_name.clone(),
            config.device_id.clone(),
            config.client_version.clone(),
        )
    }

    /// Copy of this credential carrying `token`.
    pub fn with_token(&self, token: impl Into<String>) -> Self {
        let token = token.into();
        Self {
            token: (!token.is_empty()).then_some(token),
            ..self.clone()
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Value of the authorization header.
    pub fn header_value(&self) -> String {
        let mut value = format!(
            r#"MediaBrowser Client="{}", Device="{}", DeviceId="{}", Version="{}""#,
            self.client, self.device, self.device_id, self.version
        );
        if let Some(token) = &self.token {
            value.push_str(&format!(r#", Token="{token}""#));
        }
        value
    }
}

impl std::fmt::Debug for ProviderCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderCredential")
            .field("client", &self.client)
            .field("device", &self.device)
            .field("device_id", &self.device_id)
            .field("version", &self.version)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
