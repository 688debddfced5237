//! Seq forwarder implementation.
//!
//! This module defines [`FemtoSeqForwarder`], a hook that serialises
//! [`LogEntry`](crate::log_entry::LogEntry) values as Compact Log Event
//! Format (CLEF) events and posts them to Seq's raw ingestion endpoint.
//!
//! # Wire format
//!
//! Each delivery is one `POST <host>/api/events/raw` with
//! `Content-Type: application/vnd.serilog.clef`, plus `X-Seq-ApiKey` when an
//! API key is configured. The body is a single JSON object:
//!
//! - `@t`: RFC 3339 timestamp with nanosecond precision.
//! - `@l`: level name.
//! - `@mt`: message template.
//! - every structured field under its own name.
//!
//! # Delivery semantics
//!
//! - **201**: success; the response body is discarded.
//! - **Anything else**: [`DeliveryError::ServerRejected`] carrying the status
//!   and the response body text.
//! - **Network errors**: [`DeliveryError::TransportFailed`].
//!
//! Nothing is retried, buffered or queued.

mod config;
mod error;
mod forwarder;
mod record;
mod serialise;

pub use config::{
    API_KEY_HEADER, CLEF_CONTENT_TYPE, ForwarderOption, ForwarderOptions, INGESTION_PATH, api_key,
    endpoint_for, levels, resolve_options,
};
pub use error::DeliveryError;
pub use forwarder::FemtoSeqForwarder;
pub(crate) use forwarder::default_agent;
pub use serialise::serialise_clef;
