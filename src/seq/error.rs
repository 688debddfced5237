use std::io;

use thiserror::Error;

/// Errors returned by a single delivery attempt.
///
/// Each variant marks a distinct failure point, from encoding the entry to
/// reading the endpoint's rejection body.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// The entry could not be serialised; no request was sent.
    #[error("failed to encode log entry: {0}")]
    EncodingFailed(#[source] serde_json::Error),
    /// The destination URL or a request header is invalid.
    #[error("invalid request to {url}: {reason}")]
    RequestConstructionFailed { url: String, reason: String },
    /// The endpoint could not be reached.
    #[error("failed to reach {url}: {source}")]
    TransportFailed {
        url: String,
        #[source]
        source: Box<ureq::Transport>,
    },
    /// The endpoint answered with something other than 201 Created.
    #[error("error creating seq event (status {status}): {body}")]
    ServerRejected { status: u16, body: String },
    /// The endpoint rejected the event and its response body was unreadable.
    #[error("failed to read response body (status {status}): {source}")]
    ResponseReadFailed {
        status: u16,
        #[source]
        source: io::Error,
    },
}

impl DeliveryError {
    /// HTTP status reported by the endpoint, when one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ServerRejected { status, .. } | Self::ResponseReadFailed { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
