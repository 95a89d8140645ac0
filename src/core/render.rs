//! Projection of fetched profiles into display records, and a plain-text
//! rendering of those records for the terminal.

use crate::domain::platform::{PlatformConfig, PlatformId};
use crate::domain::profile::ProfileData;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

const NOT_AVAILABLE: &str = "N/A";
const NO_DESCRIPTION: &str = "No description";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UsernameLink {
    pub username: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoLine {
    pub name: String,
    pub url: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileBlock {
    pub username: String,
    pub title: String,
    pub link: String,
    pub fields: Vec<Field>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub streak_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repos: Option<Vec<RepoLine>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DisplayRecord {
    Profile(ProfileBlock),
    Error { username: String, message: String },
}

impl DisplayRecord {
    pub fn is_error(&self) -> bool {
        matches!(self, DisplayRecord::Error { .. })
    }

    pub fn username(&self) -> &str {
        match self {
            DisplayRecord::Profile(block) => &block.username,
            DisplayRecord::Error { username, .. } => username,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PlatformReport {
    pub platform: PlatformId,
    pub usernames: Vec<UsernameLink>,
    pub records: Vec<DisplayRecord>,
    pub generated_at: DateTime<Utc>,
}

pub fn username_links(platform: &PlatformConfig, usernames: &[String]) -> Vec<UsernameLink> {
    usernames
        .iter()
        .map(|username| UsernameLink {
            username: username.clone(),
            url: platform.profile_url(username),
        })
        .collect()
}

fn field(label: &str, value: impl ToString) -> Field {
    Field {
        label: label.to_string(),
        value: value.to_string(),
    }
}

fn or_na(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Shapes one user's data for display. Pure: touches neither the registry
/// nor the store.
pub fn project(platform: &PlatformConfig, username: &str, data: &ProfileData) -> ProfileBlock {
    match data {
        ProfileData::GitHub(profile) => ProfileBlock {
            username: username.to_string(),
            title: profile.user.login.clone(),
            link: profile.user.html_url.clone(),
            fields: vec![
                field(
                    "Name",
                    profile
                        .user
                        .name
                        .as_deref()
                        .filter(|n| !n.is_empty())
                        .unwrap_or(NOT_AVAILABLE),
                ),
                field("Public Repos", profile.user.public_repos),
                field("Followers", profile.user.followers),
                field("Following", profile.user.following),
            ],
            streak_image: profile.streak_image_url.clone(),
            repos: profile.repos.as_ref().map(|repos| {
                repos
                    .iter()
                    .map(|repo| RepoLine {
                        name: repo.name.clone(),
                        url: repo.html_url.clone(),
                        description: repo
                            .description
                            .clone()
                            .filter(|d| !d.is_empty())
                            .unwrap_or_else(|| NO_DESCRIPTION.to_string()),
                    })
                    .collect()
            }),
        },
        ProfileData::LeetCode(stats) => ProfileBlock {
            username: username.to_string(),
            title: stats.username.clone(),
            link: platform.profile_url(&stats.username),
            fields: vec![
                field("Easy Problems Solved", stats.easy),
                field("Medium Problems Solved", stats.medium),
                field("Hard Problems Solved", stats.hard),
            ],
            streak_image: None,
            repos: None,
        },
        ProfileData::Gfg(stats) => ProfileBlock {
            username: username.to_string(),
            title: stats.username.clone(),
            link: platform.profile_url(&stats.username),
            fields: vec![
                field("Streaks", or_na(&stats.streaks)),
                field("Questions Solved", or_na(&stats.questions_solved)),
                field("Contributions", or_na(&stats.contributions)),
            ],
            streak_image: None,
            repos: None,
        },
    }
}

pub fn error_line(username: &str, message: &str) -> String {
    format!("Error fetching data for {}: {}", username, message)
}

impl fmt::Display for DisplayRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayRecord::Profile(block) => {
                writeln!(f, "{} <{}>", block.title, block.link)?;
                for line in &block.fields {
                    writeln!(f, "  {}: {}", line.label, line.value)?;
                }
                if let Some(streak) = &block.streak_image {
                    writeln!(f, "  Streak: {}", streak)?;
                }
                if let Some(repos) = &block.repos {
                    writeln!(f, "  Repositories:")?;
                    for repo in repos {
                        writeln!(f, "    - {} <{}> - {}", repo.name, repo.url, repo.description)?;
                    }
                }
                Ok(())
            }
            DisplayRecord::Error { username, message } => {
                writeln!(f, "{}", error_line(username, message))
            }
        }
    }
}

impl fmt::Display for PlatformReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.platform.display_name())?;

        if self.usernames.is_empty() {
            return writeln!(f, "(no usernames saved)");
        }

        for link in &self.usernames {
            writeln!(f, "* {} <{}>", link.username, link.url)?;
        }
        for record in &self.records {
            writeln!(f)?;
            write!(f, "{}", record)?;
        }
        Ok(())
    }
}

pub fn render_text(report: &PlatformReport) -> String {
    report.to_string()
}
