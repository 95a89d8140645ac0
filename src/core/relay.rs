//! One-shot request relay between a restricted caller and the fetch executor.
//!
//! Callers hold a cloneable [`RelayChannel`]; the executor owns the matching
//! [`RelayInbox`]. Every request travels with its own `oneshot` reply slot,
//! so exactly one [`RelayResponse`] is delivered per request and concurrent
//! requests complete independently of each other.

use crate::domain::model::{Payload, RelayRequest, RelayResponse};
use crate::utils::error::{Result, ViewerError};
use crate::utils::validation::validate_url;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};

const RECEIVER_GONE: &str = "Could not establish connection. Receiving end does not exist.";
const PORT_CLOSED: &str = "The message port closed before a response was received.";

/// A request in flight together with the slot its answer goes into.
#[derive(Debug)]
pub struct RelayEnvelope {
    pub request: RelayRequest,
    pub(crate) reply: oneshot::Sender<RelayResponse>,
}

impl RelayEnvelope {
    /// Returns `false` when the caller stopped waiting.
    pub fn reply(self, response: RelayResponse) -> bool {
        self.reply.send(response).is_ok()
    }
}

#[derive(Debug)]
pub struct RelayInbox {
    rx: mpsc::UnboundedReceiver<RelayEnvelope>,
}

impl RelayInbox {
    pub async fn recv(&mut self) -> Option<RelayEnvelope> {
        self.rx.recv().await
    }
}

#[derive(Debug, Clone)]
pub struct RelayChannel {
    tx: mpsc::UnboundedSender<RelayEnvelope>,
    timeout: Option<Duration>,
}

/// Creates a connected channel/inbox pair. `timeout = None` waits forever.
pub fn channel(timeout: Option<Duration>) -> (RelayChannel, RelayInbox) {
    let (tx, rx) = mpsc::unbounded_channel();
    (RelayChannel { tx, timeout }, RelayInbox { rx })
}

impl RelayChannel {
    /// Sends `request` and waits for its single response.
    ///
    /// The response is returned as produced by the executor; an `{ error }`
    /// reply is still `Ok` here. `Err` means the request was never answered.
    /// Dropping the returned future cancels the request.
    pub async fn send(&self, request: RelayRequest) -> Result<RelayResponse> {
        validate_url("url", &request.url).map_err(|e| ViewerError::ValidationError {
            message: e.to_string(),
        })?;

        let (reply, response) = oneshot::channel();
        tracing::debug!("Relaying {} {}", request.method(), request.url);
        self.tx
            .send(RelayEnvelope { request, reply })
            .map_err(|_| ViewerError::channel(RECEIVER_GONE))?;

        let outcome = match self.timeout {
            Some(limit) => tokio::time::timeout(limit, response)
                .await
                .map_err(|_| ViewerError::channel(format!("No response within {:?}", limit)))?,
            None => response.await,
        };

        outcome.map_err(|_| ViewerError::channel(PORT_CLOSED))
    }

    /// `send` followed by [`RelayResponse::into_result`].
    pub async fn fetch(&self, request: RelayRequest) -> Result<Payload> {
        self.send(request).await?.into_result()
    }
}
