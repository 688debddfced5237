//! Synchronous delivery of CLEF events to a Seq endpoint.
//!
//! The forwarder is immutable after construction. Each call to
//! [`FemtoSeqForwarder::deliver`] serialises one entry and performs one
//! blocking POST on the calling thread through a shared `ureq::Agent`.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::{fmt, io};

use native_tls::TlsConnector;
use ureq::{Agent, AgentBuilder, ErrorKind, Response, Transport};

use super::config::{
    API_KEY_HEADER, CLEF_CONTENT_TYPE, ForwarderOption, ForwarderOptions, endpoint_for,
    resolve_options,
};
use super::error::DeliveryError;
use super::serialise::serialise_clef;
use crate::hook::FemtoHook;
use crate::level::FemtoLevel;
use crate::log_entry::LogEntry;

/// The only status Seq uses to acknowledge an ingested event.
const SEQ_CREATED: u16 = 201;

/// Agent with no timeouts beyond ureq's defaults, using the platform TLS
/// stack for `https` hosts.
pub(crate) fn default_agent() -> Agent {
    let builder = AgentBuilder::new();
    match TlsConnector::new() {
        Ok(connector) => builder.tls_connector(Arc::new(connector)).build(),
        // No usable platform TLS; ureq's bundled rustls backend takes over.
        Err(_) => builder.build(),
    }
}

/// Hook that forwards log entries to Seq's raw event ingestion API.
#[derive(Clone)]
pub struct FemtoSeqForwarder {
    endpoint: String,
    api_key: Option<String>,
    levels: BTreeSet<FemtoLevel>,
    agent: Agent,
}

impl FemtoSeqForwarder {
    /// Create a forwarder for `host` (for example `http://localhost:5341`)
    /// that accepts every level and sends no API key.
    pub fn new(host: &str) -> Self {
        Self::with_options(host, ForwarderOptions::default())
    }

    pub fn with_options(host: &str, options: ForwarderOptions) -> Self {
        Self::from_parts(host, options, default_agent())
    }

    /// Apply `options` over the defaults in order, then freeze the result.
    pub fn configure(host: &str, options: impl IntoIterator<Item = ForwarderOption>) -> Self {
        Self::with_options(host, resolve_options(options))
    }

    pub(crate) fn from_parts(host: &str, options: ForwarderOptions, agent: Agent) -> Self {
        Self {
            endpoint: endpoint_for(host),
            api_key: options.api_key,
            levels: options.levels,
            agent,
        }
    }

    /// Full ingestion URL requests are posted to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    fn effective_api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|key| !key.is_empty())
    }

    fn build_request(&self) -> Result<ureq::Request, DeliveryError> {
        let mut request = self
            .agent
            .post(&self.endpoint)
            .set("Content-Type", CLEF_CONTENT_TYPE);
        if let Some(key) = self.effective_api_key() {
            if !is_valid_header_value(key) {
                return Err(DeliveryError::RequestConstructionFailed {
                    url: self.endpoint.clone(),
                    reason: format!("{API_KEY_HEADER} contains control characters"),
                });
            }
            request = request.set(API_KEY_HEADER, key);
        }
        Ok(request)
    }

    fn send(&self, payload: &[u8]) -> Result<(), DeliveryError> {
        let request = self.build_request()?;
        match request.send_bytes(payload) {
            Ok(response) => interpret_response(response),
            Err(ureq::Error::Status(_, response)) => interpret_response(response),
            Err(ureq::Error::Transport(transport)) => Err(self.classify_transport(transport)),
        }
    }

    fn classify_transport(&self, transport: Transport) -> DeliveryError {
        match transport.kind() {
            ErrorKind::InvalidUrl | ErrorKind::UnknownScheme => {
                DeliveryError::RequestConstructionFailed {
                    url: self.endpoint.clone(),
                    reason: transport.to_string(),
                }
            }
            _ => DeliveryError::TransportFailed {
                url: self.endpoint.clone(),
                source: Box::new(transport),
            },
        }
    }
}

fn interpret_response(response: Response) -> Result<(), DeliveryError> {
    let status = response.status();
    if status == SEQ_CREATED {
        // Draining returns the connection to the agent's pool; the outcome
        // is already known, so a failed drain only costs the connection.
        let _ = io::copy(&mut response.into_reader(), &mut io::sink());
        return Ok(());
    }
    match response.into_string() {
        Ok(body) => Err(DeliveryError::ServerRejected { status, body }),
        Err(source) => Err(DeliveryError::ResponseReadFailed { status, source }),
    }
}

/// Header values may not carry control characters other than tab.
fn is_valid_header_value(value: &str) -> bool {
    value.bytes().all(|b| b == b'\t' || !b.is_ascii_control())
}

impl FemtoHook for FemtoSeqForwarder {
    fn accepted_levels(&self) -> &BTreeSet<FemtoLevel> {
        &self.levels
    }

    fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError> {
        let payload = serialise_clef(entry).map_err(DeliveryError::EncodingFailed)?;
        self.send(&payload)
    }
}

impl fmt::Debug for FemtoSeqForwarder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FemtoSeqForwarder")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("levels", &self.levels)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seq::config::{api_key, levels};
    use rstest::rstest;

    #[test]
    fn builds_destination_from_host() {
        let forwarder = FemtoSeqForwarder::new("http://localhost:5341");
        assert_eq!(forwarder.endpoint(), "http://localhost:5341/api/events/raw");
        assert_eq!(forwarder.accepted_levels().len(), 7);
        assert_eq!(forwarder.api_key(), None);
    }

    #[test]
    fn configure_applies_options_in_order() {
        let forwarder = FemtoSeqForwarder::configure(
            "http://seq",
            [levels([FemtoLevel::Warn, FemtoLevel::Error]), api_key("k1")],
        );
        assert_eq!(
            forwarder.accepted_levels(),
            &BTreeSet::from([FemtoLevel::Warn, FemtoLevel::Error])
        );
        assert_eq!(forwarder.api_key(), Some("k1"));
        assert!(forwarder.is_enabled_for(FemtoLevel::Error));
        assert!(!forwarder.is_enabled_for(FemtoLevel::Info));
    }

    #[rstest]
    #[case(None, None)]
    #[case(Some(""), None)]
    #[case(Some("abc"), Some("abc"))]
    fn empty_api_key_is_not_sent(#[case] key: Option<&str>, #[case] expected: Option<&str>) {
        let options = ForwarderOptions {
            api_key: key.map(str::to_owned),
            ..ForwarderOptions::default()
        };
        let forwarder = FemtoSeqForwarder::with_options("http://seq", options);
        assert_eq!(forwarder.effective_api_key(), expected);
    }

    #[rstest]
    #[case("N1ncujiT5pYGD6m4CF0", true)]
    #[case("with\ttab", true)]
    #[case("line\nbreak", false)]
    #[case("nul\0byte", false)]
    fn header_value_validation(#[case] value: &str, #[case] valid: bool) {
        assert_eq!(is_valid_header_value(value), valid);
    }

    #[test]
    fn control_characters_in_key_fail_before_sending() {
        let forwarder = FemtoSeqForwarder::configure("http://127.0.0.1:9", [api_key("bad\r\nkey")]);
        let err = forwarder
            .deliver(&LogEntry::new(FemtoLevel::Info, "x"))
            .expect_err("invalid header");
        assert!(matches!(
            err,
            DeliveryError::RequestConstructionFailed { .. }
        ));
    }

    #[test]
    fn debug_output_hides_api_key() {
        let forwarder = FemtoSeqForwarder::configure("http://seq", [api_key("s3cret")]);
        let rendered = format!("{forwarder:?}");
        assert!(rendered.contains("http://seq/api/events/raw"));
        assert!(!rendered.contains("s3cret"));
    }
}
