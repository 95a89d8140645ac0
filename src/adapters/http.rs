use crate::domain::ports::ThreatLookup;
use crate::utils::error::{Result, ViewerError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

pub const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Shared HTTP client. GitHub rejects requests without a User-Agent.
pub fn build_client() -> Result<Client> {
    Ok(Client::builder().user_agent(USER_AGENT).build()?)
}

#[derive(Debug, Clone)]
pub struct SafeBrowsingSettings {
    pub endpoint: String,
    pub api_key: String,
    pub client_id: String,
    pub client_version: String,
}

#[derive(Debug, Deserialize)]
struct ThreatMatchResponse {
    #[serde(default)]
    matches: Option<serde_json::Value>,
}

/// Threat-list lookup against a Safe Browsing `threatMatches:find` endpoint.
#[derive(Debug, Clone)]
pub struct SafeBrowsingClient {
    client: Client,
    settings: SafeBrowsingSettings,
}

impl SafeBrowsingClient {
    pub fn new(client: Client, settings: SafeBrowsingSettings) -> Self {
        Self { client, settings }
    }

    fn request_body(&self, url: &str) -> serde_json::Value {
        json!({
            "client": {
                "clientId": self.settings.client_id,
                "clientVersion": self.settings.client_version
            },
            "threatInfo": {
                "threatTypes": ["MALWARE", "SOCIAL_ENGINEERING"],
                "platformTypes": ["ANY_PLATFORM"],
                "threatEntryTypes": ["URL"],
                "threatEntries": [{ "url": url }]
            }
        })
    }
}

#[async_trait]
impl ThreatLookup for SafeBrowsingClient {
    async fn is_flagged(&self, url: &str) -> Result<bool> {
        tracing::debug!("Threat lookup for {}", url);
        let response = self
            .client
            .post(&self.settings.endpoint)
            .query(&[("key", self.settings.api_key.as_str())])
            .json(&self.request_body(url))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ViewerError::transport(format!(
                "Threat lookup failed with status {}",
                status.as_u16()
            )));
        }

        let body: ThreatMatchResponse = response.json().await?;
        Ok(body.matches.map(|m| !m.is_null()).unwrap_or(false))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn lookup(server: &MockServer) -> SafeBrowsingClient {
        SafeBrowsingClient::new(
            build_client().unwrap(),
            SafeBrowsingSettings {
                endpoint: server.url("/v4/threatMatches:find"),
                api_key: "test-key".to_string(),
                client_id: "pageSecurityChecker".to_string(),
                client_version: "2.0".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn test_matches_means_flagged() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(POST)
                .path("/v4/threatMatches:find")
                .query_param("key", "test-key")
                .json_body_partial(r#"{"client": {"clientId": "pageSecurityChecker"}}"#);
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({"matches": [{"threatType": "MALWARE"}]}));
        });

        let flagged = lookup(&server).is_flagged("http://malware.test/").await.unwrap();

        api_mock.assert();
        assert!(flagged);
    }

    #[tokio::test]
    async fn test_empty_response_is_clean() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v4/threatMatches:find");
            then.status(200)
                .header("Content-Type", "application/json")
                .json_body(json!({}));
        });

        assert!(!lookup(&server).is_flagged("https://example.com/").await.unwrap());
    }

    #[tokio::test]
    async fn test_error_status_is_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/v4/threatMatches:find");
            then.status(403);
        });

        assert!(lookup(&server).is_flagged("https://example.com/").await.is_err());
    }
}
