//! Typed response schemas for the remote profile APIs and the shaped
//! profile data handed to the renderer.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubUser {
    pub html_url: String,
    pub login: String,
    #[serde(default)]
    pub name: Option<String>,
    pub public_repos: u64,
    pub followers: u64,
    pub following: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GitHubRepo {
    pub html_url: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GitHubProfile {
    pub user: GitHubUser,
    /// `None` when repository listing is disabled for the platform.
    pub repos: Option<Vec<GitHubRepo>>,
    pub streak_image_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LeetCodeEnvelope {
    pub data: Option<LeetCodeData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeetCodeData {
    pub matched_user: Option<MatchedUser>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedUser {
    pub username: String,
    pub submit_stats: SubmitStats,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitStats {
    pub ac_submission_num: Vec<DifficultyCount>,
}

#[derive(Debug, Deserialize)]
pub struct DifficultyCount {
    pub difficulty: String,
    pub count: u64,
    #[serde(default)]
    pub submissions: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeetCodeStats {
    pub username: String,
    pub easy: u64,
    pub medium: u64,
    pub hard: u64,
}

impl From<MatchedUser> for LeetCodeStats {
    fn from(user: MatchedUser) -> Self {
        let mut stats = LeetCodeStats {
            username: user.username,
            easy: 0,
            medium: 0,
            hard: 0,
        };
        for entry in user.submit_stats.ac_submission_num {
            match entry.difficulty.to_lowercase().as_str() {
                "easy" => stats.easy = entry.count,
                "medium" => stats.medium = entry.count,
                "hard" => stats.hard = entry.count,
                _ => {}
            }
        }
        stats
    }
}

/// GeeksforGeeks publishes no stable schema, so every field is optional.
#[derive(Debug, Default, Deserialize)]
pub struct GfgResponse {
    #[serde(default)]
    pub streaks: Option<Value>,
    #[serde(default)]
    pub questions_solved: Option<Value>,
    #[serde(default)]
    pub contributions: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GfgStats {
    pub username: String,
    pub streaks: Option<String>,
    pub questions_solved: Option<String>,
    pub contributions: Option<String>,
}

impl GfgStats {
    pub fn from_response(username: &str, response: GfgResponse) -> Self {
        Self {
            username: username.to_string(),
            streaks: display_value(response.streaks.as_ref()),
            questions_solved: display_value(response.questions_solved.as_ref()),
            contributions: display_value(response.contributions.as_ref()),
        }
    }
}

/// Falsy values (missing, null, false, 0, "") have nothing to show.
fn display_value(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::Null | Value::Bool(false) => None,
        Value::String(s) if s.is_empty() => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        other => Some(other.to_string()),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "platform", rename_all = "lowercase")]
pub enum ProfileData {
    GitHub(GitHubProfile),
    LeetCode(LeetCodeStats),
    Gfg(GfgStats),
}
