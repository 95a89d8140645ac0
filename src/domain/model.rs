use crate::domain::platform::PlatformId;
use crate::utils::error::{Result, ViewerError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

pub const FETCH_DATA: &str = "fetchData";

/// Storage key holding the whole [`PersistedState`].
pub const PLATFORMS_KEY: &str = "platforms";

/// One outbound call handed to the fetch executor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelayRequest {
    pub action: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub headers: HashMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RelayRequest {
    pub fn fetch(url: impl Into<String>) -> Self {
        Self {
            action: FETCH_DATA.to_string(),
            url: url.into(),
            method: None,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn method(&self) -> &str {
        self.method.as_deref().unwrap_or("GET")
    }

    pub fn is_fetch(&self) -> bool {
        self.action == FETCH_DATA
    }
}

/// Response body, classified by the declared content type.
///
/// Untagged on the wire; a bare JSON string decodes as `Text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Json(serde_json::Value),
}

impl Payload {
    /// Mirrors JavaScript truthiness of the body: empty text and `null`
    /// count as no data.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Text(text) => text.is_empty(),
            Payload::Json(value) => value.is_null(),
        }
    }

    pub fn decode<T: DeserializeOwned>(self, what: &str) -> Result<T> {
        match self {
            Payload::Json(value) => serde_json::from_value(value)
                .map_err(|e| ViewerError::parse(format!("unexpected {} response: {}", what, e))),
            Payload::Text(_) => Err(ViewerError::parse(format!(
                "expected a JSON body for {}, got text",
                what
            ))),
        }
    }
}

/// Exactly one of `{ "data": ... }` or `{ "error": "..." }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayResponse {
    Data(Payload),
    Error(String),
}

impl RelayResponse {
    pub fn is_data(&self) -> bool {
        matches!(self, RelayResponse::Data(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, RelayResponse::Error(_))
    }

    /// Turns the `{ error }` arm into a `TransportError`.
    pub fn into_result(self) -> Result<Payload> {
        match self {
            RelayResponse::Data(payload) => Ok(payload),
            RelayResponse::Error(message) => Err(ViewerError::transport(message)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredUsernames {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub usernames: Vec<String>,
}

/// A `null` list reads the same as a missing one.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Everything written under [`PLATFORMS_KEY`], rewritten whole on each save.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PersistedState {
    pub platforms: BTreeMap<PlatformId, StoredUsernames>,
}

impl PersistedState {
    pub fn with_platforms(ids: &[PlatformId]) -> Self {
        Self {
            platforms: ids.iter().map(|id| (*id, StoredUsernames::default())).collect(),
        }
    }

    pub fn usernames(&self, id: PlatformId) -> &[String] {
        self.platforms
            .get(&id)
            .map(|stored| stored.usernames.as_slice())
            .unwrap_or(&[])
    }

    pub fn usernames_mut(&mut self, id: PlatformId) -> &mut Vec<String> {
        &mut self.platforms.entry(id).or_default().usernames
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Unknown platform keys are skipped whatever their shape, so older or
    /// newer files still load. Only known platforms are decoded.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw: BTreeMap<String, Value> = serde_json::from_slice(bytes)?;
        let mut platforms = BTreeMap::new();
        for (key, value) in raw {
            let Ok(id) = key.parse::<PlatformId>() else {
                tracing::warn!("Ignoring stored usernames for unknown platform '{}'", key);
                continue;
            };
            let stored = match value {
                Value::Null => StoredUsernames::default(),
                value => serde_json::from_value(value).map_err(|e| {
                    ViewerError::parse(format!("stored usernames for {}: {}", id, e))
                })?,
            };
            platforms.insert(id, stored);
        }
        Ok(Self { platforms })
    }
}
