use crate::utils::error::{Result, ViewerError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformId {
    Github,
    Leetcode,
    Gfg,
}

impl PlatformId {
    pub const ALL: [PlatformId; 3] = [PlatformId::Github, PlatformId::Leetcode, PlatformId::Gfg];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformId::Github => "github",
            PlatformId::Leetcode => "leetcode",
            PlatformId::Gfg => "gfg",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PlatformId::Github => "GitHub",
            PlatformId::Leetcode => "LeetCode",
            PlatformId::Gfg => "GeeksforGeeks",
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlatformId {
    type Err = ViewerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "github" => Ok(PlatformId::Github),
            "leetcode" => Ok(PlatformId::Leetcode),
            "gfg" | "geeksforgeeks" => Ok(PlatformId::Gfg),
            _ => Err(ViewerError::UnknownPlatform {
                name: s.to_string(),
            }),
        }
    }
}

/// Static description of one platform. Built once at startup and never
/// mutated; the username lists live in [`crate::core::store::UsernameStore`].
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformConfig {
    pub id: PlatformId,
    /// Prefix for human-facing profile links.
    pub base_url: String,
    pub api_url: String,
    /// GitHub only: also fetch and render the repository list.
    pub include_repos: bool,
    /// GitHub only: streak image service, queried with `?user=<name>`.
    pub streak_url: Option<String>,
}

impl PlatformConfig {
    pub fn defaults(id: PlatformId) -> Self {
        match id {
            PlatformId::Github => Self {
                id,
                base_url: "https://github.com/".to_string(),
                api_url: "https://api.github.com/users/".to_string(),
                include_repos: true,
                streak_url: Some("https://github-readme-streak-stats.herokuapp.com".to_string()),
            },
            PlatformId::Leetcode => Self {
                id,
                base_url: "https://leetcode.com/".to_string(),
                api_url: "https://leetcode.com/graphql".to_string(),
                include_repos: false,
                streak_url: None,
            },
            PlatformId::Gfg => Self {
                id,
                base_url: "https://auth.geeksforgeeks.org/".to_string(),
                api_url: "https://auth.geeksforgeeks.org/user/profile".to_string(),
                include_repos: false,
                streak_url: None,
            },
        }
    }

    pub fn profile_url(&self, username: &str) -> String {
        if self.base_url.ends_with('/') {
            format!("{}{}", self.base_url, username)
        } else {
            format!("{}/{}", self.base_url, username)
        }
    }

    /// Appends percent-encoded path segments to the API URL.
    pub fn api_endpoint(&self, segments: &[&str]) -> Result<String> {
        let invalid = |reason: String| ViewerError::InvalidConfigValueError {
            field: format!("platforms.{}.api_url", self.id),
            value: self.api_url.clone(),
            reason,
        };

        let mut url = Url::parse(&self.api_url).map_err(|e| invalid(e.to_string()))?;
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| invalid("URL cannot be used as a base".to_string()))?;
            path.pop_if_empty();
            path.extend(segments.iter().copied());
        }
        Ok(url.into())
    }

    pub fn streak_image_url(&self, username: &str) -> Option<String> {
        let mut url = Url::parse(self.streak_url.as_deref()?).ok()?;
        url.query_pairs_mut().append_pair("user", username);
        Some(url.into())
    }
}

/// Immutable lookup table of the supported platforms.
#[derive(Debug, Clone, PartialEq)]
pub struct PlatformRegistry {
    platforms: Vec<PlatformConfig>,
}

impl PlatformRegistry {
    pub fn new(platforms: Vec<PlatformConfig>) -> Self {
        Self { platforms }
    }

    /// Replaces the entry with the same id, or appends it.
    pub fn with_platform(mut self, config: PlatformConfig) -> Self {
        match self.platforms.iter_mut().find(|p| p.id == config.id) {
            Some(slot) => *slot = config,
            None => self.platforms.push(config),
        }
        self
    }

    pub fn get(&self, id: PlatformId) -> Result<&PlatformConfig> {
        self.platforms
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| ViewerError::UnknownPlatform {
                name: id.to_string(),
            })
    }

    pub fn ids(&self) -> Vec<PlatformId> {
        self.platforms.iter().map(|p| p.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.platforms.iter()
    }
}

impl Default for PlatformRegistry {
    fn default() -> Self {
        Self::new(PlatformId::ALL.iter().map(|id| PlatformConfig::defaults(*id)).collect())
    }
}
