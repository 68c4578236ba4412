//! Live application settings read by the gateway.
//!
//! The gateway never owns these values. Hosts hand a [`SettingsSource`] to the
//! clients that need live reads (the keyword blocklist is re-read on every
//! filtering pass) and keep updating it through their own persistence layer.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// User-facing settings consumed by the catalog client.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct MainSettings {
    /// Locale used for catalog requests that do not name one (default: "en")
    #[serde(default = "default_locale")]
    pub locale: String,

    /// ISO-3166 region applied to discover and trending calls
    #[serde(default)]
    pub discover_region: Option<String>,

    /// ISO-639 original-language preference applied to discover calls
    #[serde(default)]
    pub original_language: Option<String>,

    /// Comma-separated keyword blocklist
    #[serde(default)]
    pub filtered_keywords: String,
}

fn default_locale() -> String {
    "en".to_string()
}

impl Default for MainSettings {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            discover_region: None,
            original_language: None,
            filtered_keywords: String::new(),
        }
    }
}

/// Read access to the current settings.
pub trait SettingsSource: Send + Sync {
    /// A snapshot of the settings as they are right now.
    fn main_settings(&self) -> MainSettings;

    /// The raw keyword blocklist string.
    fn filtered_keywords(&self) -> String {
        self.main_settings().filtered_keywords
    }
}

/// In-memory [`SettingsSource`] that can be updated at runtime.
#[derive(Debug, Default)]
pub struct SettingsStore {
    main: RwLock<MainSettings>,
}

impl SettingsStore {
    /// Build a store holding `settings`.
    pub fn new(settings: MainSettings) -> Self {
        Self {
            main: RwLock::new(settings),
        }
    }

    /// Replace all settings.
    pub fn set(&self, settings: MainSettings) {
        *self.main.write() = settings;
    }

    /// Replace just the keyword blocklist.
    pub fn set_filtered_keywords(&self, keywords: impl Into<String>) {
        self.main.write().filtered_keywords = keywords.into();
    }
}

impl SettingsSource for SettingsStore {
    fn main_settings(&self) -> MainSettings {
        self.main.read().clone()
    }

    fn filtered_keywords(&self) -> String {
        self.main.read().filtered_keywords.clone()
    }
}
