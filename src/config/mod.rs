use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::api::DEFAULT_API_URL;

/// Environment variable that overrides `access_key`
pub const ACCESS_KEY_ENV: &str = "IMGSCOUT_ACCESS_KEY";

/// API access key. Never printed, never passed on a command line.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(***)")
    }
}

/// Optional color overrides, as `#RRGGBB` or `#RGB`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ThemeConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub danger: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_dim: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inactive: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Unsplash access key (client_id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key: Option<Credential>,

    /// Search endpoint
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Command used to open image links (defaults to xdg-open / open)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opener: Option<String>,

    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            api_url: default_api_url(),
            opener: None,
            theme: ThemeConfig::default(),
        }
    }
}

impl AppConfig {
    /// Default config file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("imgscout");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from the given file (or the default location), creating it
    /// with defaults when missing. The environment overrides the access key.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Ok(p) => p,
                Err(e) => {
                    tracing::warn!("{}", e);
                    return Ok(Self::default().with_env_overrides());
                }
            },
        };

        let config = Self::load_file(&path)?;
        Ok(config.with_env_overrides())
    }

    fn load_file(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            match toml::from_str(&content) {
                Ok(config) => return Ok(config),
                Err(e) => tracing::warn!("Failed to parse config {}: {}", path.display(), e),
            }
            // Keep a broken file untouched so the user can fix it
            return Ok(Self::default());
        }

        let config = Self::default();
        if let Err(e) = config.save(path) {
            tracing::warn!("Could not write default config: {}", e);
        }
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    fn with_env_overrides(self) -> Self {
        let key = std::env::var(ACCESS_KEY_ENV).ok();
        self.with_access_key_override(key)
    }

    fn with_access_key_override(mut self, key: Option<String>) -> Self {
        if let Some(key) = key.filter(|k| !k.trim().is_empty()) {
            self.access_key = Some(Credential::new(key.trim()));
        }
        self
    }
}
