//! Per-platform fetch strategies. Each one builds its relay request(s) from
//! the platform's static config and validates the reply against a typed
//! schema, so a wrong response shape surfaces as a `ParseError`.

use crate::core::relay::RelayChannel;
use crate::domain::model::{Payload, RelayRequest};
use crate::domain::platform::{PlatformConfig, PlatformId};
use crate::domain::profile::{
    GfgResponse, GfgStats, GitHubProfile, GitHubRepo, GitHubUser, LeetCodeEnvelope, LeetCodeStats,
    ProfileData,
};
use crate::utils::error::{Result, ViewerError};
use serde_json::json;

pub const LEETCODE_PROFILE_QUERY: &str = r#"
    query getUserProfile($username: String!) {
      matchedUser(username: $username) {
        username
        submitStats {
          acSubmissionNum {
            difficulty
            count
            submissions
          }
        }
      }
    }
"#;

pub async fn fetch_profile(
    relay: &RelayChannel,
    platform: &PlatformConfig,
    username: &str,
) -> Result<ProfileData> {
    match platform.id {
        PlatformId::Github => fetch_github(relay, platform, username)
            .await
            .map(ProfileData::GitHub),
        PlatformId::Leetcode => fetch_leetcode(relay, platform, username)
            .await
            .map(ProfileData::LeetCode),
        PlatformId::Gfg => fetch_gfg(relay, platform, username)
            .await
            .map(ProfileData::Gfg),
    }
}

pub async fn fetch_github(
    relay: &RelayChannel,
    platform: &PlatformConfig,
    username: &str,
) -> Result<GitHubProfile> {
    let user: GitHubUser = relay
        .fetch(RelayRequest::fetch(platform.api_endpoint(&[username])?))
        .await?
        .decode("GitHub profile")?;

    let repos = if platform.include_repos {
        let repos: Vec<GitHubRepo> = relay
            .fetch(RelayRequest::fetch(platform.api_endpoint(&[username, "repos"])?))
            .await?
            .decode("GitHub repository list")?;
        Some(repos)
    } else {
        None
    };

    Ok(GitHubProfile {
        user,
        repos,
        streak_image_url: platform.streak_image_url(username),
    })
}

pub async fn fetch_leetcode(
    relay: &RelayChannel,
    platform: &PlatformConfig,
    username: &str,
) -> Result<LeetCodeStats> {
    let body = json!({
        "query": LEETCODE_PROFILE_QUERY,
        "variables": { "username": username }
    });
    let request = RelayRequest::fetch(platform.api_url.clone())
        .with_method("POST")
        .with_header("Content-Type", "application/json")
        .with_body(body.to_string());

    let envelope: LeetCodeEnvelope = relay.fetch(request).await?.decode("LeetCode GraphQL")?;
    let data = envelope
        .data
        .ok_or_else(|| ViewerError::parse("LeetCode response has no `data` field"))?;

    match data.matched_user {
        Some(user) => Ok(LeetCodeStats::from(user)),
        None => Err(ViewerError::NotFound {
            platform: PlatformId::Leetcode.to_string(),
            username: username.to_string(),
        }),
    }
}

pub async fn fetch_gfg(
    relay: &RelayChannel,
    platform: &PlatformConfig,
    username: &str,
) -> Result<GfgStats> {
    let payload = relay
        .fetch(RelayRequest::fetch(platform.api_endpoint(&[username])?))
        .await?;

    if payload.is_empty() {
        return Err(ViewerError::NotFound {
            platform: PlatformId::Gfg.to_string(),
            username: username.to_string(),
        });
    }

    // Non-JSON pages carry none of the optional fields.
    let response = match payload {
        Payload::Json(value) if value.is_object() => {
            serde_json::from_value::<GfgResponse>(value)
                .map_err(|e| ViewerError::parse(format!("unexpected GeeksforGeeks response: {}", e)))?
        }
        _ => GfgResponse::default(),
    };

    Ok(GfgStats::from_response(username, response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::relay::channel;
    use crate::domain::model::RelayResponse;
    use serde_json::Value;

    /// Answers every relay request with `reply(request)`.
    fn scripted<F>(reply: F) -> RelayChannel
    where
        F: Fn(&RelayRequest) -> RelayResponse + Send + 'static,
    {
        let (relay, mut inbox) = channel(None);
        tokio::spawn(async move {
            while let Some(envelope) = inbox.recv().await {
                let response = reply(&envelope.request);
                envelope.reply(response);
            }
        });
        relay
    }

    #[tokio::test]
    async fn test_leetcode_null_user_is_not_found() {
        let relay = scripted(|request| {
            assert_eq!(request.method(), "POST");
            let body: Value = serde_json::from_str(request.body.as_deref().unwrap()).unwrap();
            assert_eq!(body["variables"]["username"], "ghost");
            RelayResponse::Data(Payload::Json(json!({"data": {"matchedUser": null}})))
        });
        let platform = PlatformConfig::defaults(PlatformId::Leetcode);

        let err = fetch_leetcode(&relay, &platform, "ghost").await.unwrap_err();
        assert!(matches!(err, ViewerError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_leetcode_missing_data_is_parse_error() {
        let relay = scripted(|_| RelayResponse::Data(Payload::Json(json!({"errors": []}))));
        let platform = PlatformConfig::defaults(PlatformId::Leetcode);

        let err = fetch_leetcode(&relay, &platform, "x").await.unwrap_err();
        assert!(matches!(err, ViewerError::ParseError { .. }));
    }

    #[tokio::test]
    async fn test_github_without_repos_issues_one_request() {
        let relay = scripted(|request| {
            assert!(!request.url.ends_with("/repos"));
            RelayResponse::Data(Payload::Json(json!({
                "html_url": "https://github.com/octocat",
                "login": "octocat",
                "name": null,
                "public_repos": 8,
                "followers": 100,
                "following": 9
            })))
        });
        let mut platform = PlatformConfig::defaults(PlatformId::Github);
        platform.include_repos = false;

        let profile = fetch_github(&relay, &platform, "octocat").await.unwrap();
        assert!(profile.repos.is_none());
        assert_eq!(profile.user.public_repos, 8);
    }

    #[tokio::test]
    async fn test_gfg_text_page_has_no_stats() {
        let relay = scripted(|_| RelayResponse::Data(Payload::Text("<html>profile</html>".to_string())));
        let platform = PlatformConfig::defaults(PlatformId::Gfg);

        let stats = fetch_gfg(&relay, &platform, "geek").await.unwrap();
        assert_eq!(stats.streaks, None);
        assert_eq!(stats.questions_solved, None);
        assert_eq!(stats.contributions, None);
    }

    #[tokio::test]
    async fn test_gfg_empty_body_is_not_found() {
        let relay = scripted(|_| RelayResponse::Data(Payload::Text(String::new())));
        let platform = PlatformConfig::defaults(PlatformId::Gfg);

        let err = fetch_gfg(&relay, &platform, "geek").await.unwrap_err();
        assert!(matches!(err, ViewerError::NotFound { .. }));
    }
}
