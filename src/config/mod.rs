pub mod settings;
mod types;

pub use settings::{MainSettings, SettingsSource, SettingsStore};
pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<GatewayConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: GatewayConfig = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<GatewayConfig> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./mediagate.toml",
        "~/.config/mediagate/config.toml",
        "/etc/mediagate/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            return load_config(path);
        }
    }

    Ok(GatewayConfig::default())
}

/// Validate configuration
fn validate_config(config: &GatewayConfig) -> Result<()> {
    check_rate_limit("tmdb", &config.tmdb.rate_limit)?;

    if config.tmdb.api_key.is_empty() {
        tracing::warn!("No TMDB API key configured; catalog calls will be rejected upstream");
    }

    if let Some(jellyfin) = &config.jellyfin {
        if jellyfin.url.trim().is_empty() {
            anyhow::bail!("Jellyfin section is present but has no url");
        }
        check_rate_limit("jellyfin", &jellyfin.rate_limit)?;
    }

    Ok(())
}

fn check_rate_limit(provider: &str, limit: &RateLimitConfig) -> Result<()> {
    if limit.max_requests == 0 {
        anyhow::bail!("{provider} rate limit max_requests cannot be 0");
    }
    if limit.window_ms == 0 {
        anyhow::bail!("{provider} rate limit window_ms cannot be 0");
    }
    if limit.max_rps == 0 {
        anyhow::bail!("{provider} rate limit max_rps cannot be 0");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mediagate_common::MediaServerKind;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn empty_file_uses_defaults() {
        let file = write_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.tmdb.base_url, "https://api.themoviedb.org/3");
        assert_eq!(config.tmdb.rate_limit, RateLimitConfig::default());
        assert_eq!(config.tmdb.cache_default_ttl_secs, 0);
        assert!(config.jellyfin.is_none());
        assert_eq!(config.settings.locale, "en");
    }

    #[test]
    fn full_file_round_trips_fields() {
        let file = write_config(
            r#"
[tmdb]
api_key = "abc"
timeout_secs = 5

[tmdb.rate_limit]
max_requests = 10
window_ms = 500
max_rps = 5

[jellyfin]
url = "http://jf.local:8096"
server_kind = "emby"
device_id = "dev-1"

[settings]
locale = "fr"
discover_region = "FR"
filtered_keywords = "gore,horror"
"#,
        );
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.tmdb.api_key, "abc");
        assert_eq!(config.tmdb.timeout_secs, 5);
        assert_eq!(config.tmdb.rate_limit.max_requests, 10);
        assert_eq!(config.tmdb.rate_limit.window_ms, 500);

        let jellyfin = config.jellyfin.unwrap();
        assert_eq!(jellyfin.server_kind, MediaServerKind::Emby);
        assert_eq!(jellyfin.device_id.as_deref(), Some("dev-1"));
        assert_eq!(jellyfin.client_name, "Mediagate");
        assert_eq!(jellyfin.timeout_secs, 10);

        assert_eq!(config.settings.locale, "fr");
        assert_eq!(config.settings.discover_region.as_deref(), Some("FR"));
        assert_eq!(config.settings.filtered_keywords, "gore,horror");
    }

    #[test]
    fn zero_rate_limit_is_rejected() {
        let file = write_config("[tmdb.rate_limit]\nmax_rps = 0\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("max_rps"));
    }

    #[test]
    fn blank_jellyfin_url_is_rejected() {
        let file = write_config("[jellyfin]\nurl = \"  \"\n");
        assert!(load_config(file.path()).is_err());
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let err = load_config_or_default(Some(Path::new("/nonexistent/mediagate.toml")));
        assert!(err.is_err());
    }
}
