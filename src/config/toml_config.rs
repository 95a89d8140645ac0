use crate::adapters::http::SafeBrowsingSettings;
use crate::core::inspector::DEFAULT_TRACKER_PATTERNS;
use crate::core::ConfigProvider;
use crate::domain::platform::{PlatformConfig, PlatformId, PlatformRegistry};
use crate::utils::error::{Result, ViewerError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_STORAGE_PATH: &str = "./.profile-relay";
pub const DEFAULT_THREAT_ENDPOINT: &str = "https://safebrowsing.googleapis.com/v4/threatMatches:find";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub platforms: PlatformsConfig,
    #[serde(default)]
    pub inspector: InspectorConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelayConfig {
    /// Unset means wait for the executor indefinitely.
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformsConfig {
    pub github: Option<PlatformOverride>,
    pub leetcode: Option<PlatformOverride>,
    pub gfg: Option<PlatformOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlatformOverride {
    pub base_url: Option<String>,
    pub api_url: Option<String>,
    pub include_repos: Option<bool>,
    pub streak_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InspectorConfig {
    pub threat_endpoint: Option<String>,
    pub api_key: Option<String>,
    pub client_id: Option<String>,
    pub client_version: Option<String>,
    pub tracker_patterns: Option<Vec<String>>,
}

impl PlatformOverride {
    fn apply(&self, mut config: PlatformConfig) -> PlatformConfig {
        if let Some(base_url) = &self.base_url {
            config.base_url = base_url.clone();
        }
        if let Some(api_url) = &self.api_url {
            config.api_url = api_url.clone();
        }
        if let Some(include_repos) = self.include_repos {
            config.include_repos = include_repos;
        }
        if let Some(streak_url) = &self.streak_url {
            config.streak_url = Some(streak_url.clone()).filter(|s| !s.is_empty());
        }
        config
    }
}

impl PlatformsConfig {
    fn get(&self, id: PlatformId) -> Option<&PlatformOverride> {
        match id {
            PlatformId::Github => self.github.as_ref(),
            PlatformId::Leetcode => self.leetcode.as_ref(),
            PlatformId::Gfg => self.gfg.as_ref(),
        }
    }
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(ViewerError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when it exists, otherwise falls back to defaults.
    pub fn from_optional_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.as_ref().display());
            Ok(Self::default())
        }
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| ViewerError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// Replaces `${VAR}` with the environment value; unknown variables stay as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| ViewerError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn validate_config(&self) -> Result<()> {
        if let Some(path) = &self.storage.path {
            validation::validate_path("storage.path", path)?;
        }

        if let Some(timeout) = self.relay.timeout_seconds {
            validation::validate_positive_number("relay.timeout_seconds", timeout, 1)?;
        }

        for id in PlatformId::ALL {
            if let Some(platform) = self.platforms.get(id) {
                if let Some(url) = &platform.base_url {
                    validation::validate_url(&format!("platforms.{}.base_url", id), url)?;
                }
                if let Some(url) = &platform.api_url {
                    validation::validate_url(&format!("platforms.{}.api_url", id), url)?;
                }
                if let Some(url) = platform.streak_url.as_deref().filter(|s| !s.is_empty()) {
                    validation::validate_url(&format!("platforms.{}.streak_url", id), url)?;
                }
            }
        }

        if let Some(endpoint) = &self.inspector.threat_endpoint {
            validation::validate_url("inspector.threat_endpoint", endpoint)?;
        }

        Ok(())
    }

    pub fn set_storage_path(&mut self, path: String) {
        self.storage.path = Some(path);
    }

    pub fn tracker_patterns(&self) -> Vec<String> {
        self.inspector.tracker_patterns.clone().unwrap_or_else(|| {
            DEFAULT_TRACKER_PATTERNS.iter().map(|p| p.to_string()).collect()
        })
    }

    /// `None` unless an API key is configured; a placeholder left by a
    /// missing environment variable does not count.
    pub fn safe_browsing(&self) -> Option<SafeBrowsingSettings> {
        let api_key = self
            .inspector
            .api_key
            .clone()
            .filter(|key| !key.is_empty() && !key.starts_with("${"))?;

        Some(SafeBrowsingSettings {
            endpoint: self
                .inspector
                .threat_endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_THREAT_ENDPOINT.to_string()),
            api_key,
            client_id: self
                .inspector
                .client_id
                .clone()
                .unwrap_or_else(|| "pageSecurityChecker".to_string()),
            client_version: self
                .inspector
                .client_version
                .clone()
                .unwrap_or_else(|| "2.0".to_string()),
        })
    }
}

impl ConfigProvider for TomlConfig {
    fn storage_path(&self) -> &str {
        self.storage.path.as_deref().unwrap_or(DEFAULT_STORAGE_PATH)
    }

    fn relay_timeout(&self) -> Option<Duration> {
        self.relay.timeout_seconds.map(Duration::from_secs)
    }

    fn registry(&self) -> Result<PlatformRegistry> {
        let mut registry = PlatformRegistry::default();
        for id in PlatformId::ALL {
            if let Some(platform) = self.platforms.get(id) {
                registry = registry.with_platform(platform.apply(PlatformConfig::defaults(id)));
            }
        }
        Ok(registry)
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
