use crate::core::relay::{RelayEnvelope, RelayInbox};
use crate::domain::model::{Payload, RelayRequest, RelayResponse};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method};
use tokio::task::JoinHandle;

/// Lifecycle of a single relayed fetch, used for tracing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchState {
    Pending,
    Fetching,
    Succeeded,
    Failed,
}

/// Privileged side of the relay: performs the HTTP call for each request and
/// normalises the outcome into a [`RelayResponse`]. One attempt per request.
#[derive(Debug, Clone)]
pub struct FetchExecutor {
    client: Client,
}

impl FetchExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Serves `inbox` on a background task until every `RelayChannel` is dropped.
    pub fn spawn(self, inbox: RelayInbox) -> JoinHandle<()> {
        tokio::spawn(self.serve(inbox))
    }

    pub async fn serve(self, mut inbox: RelayInbox) {
        while let Some(envelope) = inbox.recv().await {
            let executor = self.clone();
            tokio::spawn(async move { executor.handle(envelope).await });
        }
        tracing::debug!("Relay inbox closed, fetch executor stopping");
    }

    async fn handle(&self, envelope: RelayEnvelope) {
        let RelayEnvelope { request, mut reply } = envelope;

        if reply.is_closed() {
            tracing::debug!("Dropping relay request for {}: caller went away", request.url);
            return;
        }

        let response = tokio::select! {
            response = self.execute(&request) => response,
            _ = reply.closed() => {
                tracing::debug!("Relay request for {} cancelled during fetch", request.url);
                return;
            }
        };

        if reply.send(response).is_err() {
            tracing::debug!("Caller stopped waiting for {}", request.url);
        }
    }

    /// Performs the fetch described by `request` and classifies the result.
    pub async fn execute(&self, request: &RelayRequest) -> RelayResponse {
        if !request.is_fetch() {
            tracing::warn!("Rejecting relay request with action '{}'", request.action);
            return RelayResponse::Error(format!("Unsupported action: {}", request.action));
        }

        tracing::debug!(state = ?FetchState::Pending, url = %request.url, "relay request received");
        let outcome = self.fetch(request).await;
        match &outcome {
            Ok(_) => tracing::debug!(state = ?FetchState::Succeeded, url = %request.url, "fetch finished"),
            Err(message) => tracing::warn!(
                state = ?FetchState::Failed,
                url = %request.url,
                "fetch failed: {}",
                message
            ),
        }

        match outcome {
            Ok(payload) => RelayResponse::Data(payload),
            Err(message) => RelayResponse::Error(message),
        }
    }

    async fn fetch(&self, request: &RelayRequest) -> Result<Payload, String> {
        let method = Method::from_bytes(request.method().to_ascii_uppercase().as_bytes())
            .map_err(|_| format!("Invalid HTTP method: {}", request.method()))?;
        let headers = build_headers(request)?;

        let mut builder = self.client.request(method, &request.url).headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        tracing::debug!(state = ?FetchState::Fetching, "{} {}", request.method(), request.url);
        let response = builder.send().await.map_err(|e| e.to_string())?;

        let status = response.status();
        if !status.is_success() {
            return Err(format!("HTTP error! Status: {}", status.as_u16()));
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(|value| value.contains("application/json"))
            .unwrap_or(false);

        if is_json {
            response
                .json::<serde_json::Value>()
                .await
                .map(Payload::Json)
                .map_err(|e| format!("Invalid JSON body: {}", e))
        } else {
            response
                .text()
                .await
                .map(Payload::Text)
                .map_err(|e| e.to_string())
        }
    }
}

fn build_headers(request: &RelayRequest) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::new();
    for (name, value) in &request.headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| format!("Invalid header name: {}", name))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| format!("Invalid value for header {}", name))?;
        headers.insert(name, value);
    }
    Ok(headers)
}
