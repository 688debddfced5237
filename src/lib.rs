//! Seq forwarding for structured log entries.
//!
//! [`FemtoSeqForwarder`] formats each [`LogEntry`] as a Compact Log Event
//! Format (CLEF) event and posts it synchronously to a Seq server's raw
//! ingestion endpoint. Logging frameworks talk to it through the
//! [`FemtoHook`] trait; bridges for `log` and `tracing` are provided behind
//! the `log-compat` and `tracing-compat` features.
//!
//! ```no_run
//! use femtoseq::{FemtoHook, FemtoLevel, LogEntry, SeqForwarderBuilder};
//!
//! let forwarder = SeqForwarderBuilder::new("http://localhost:5341")
//!     .with_api_key("N1ncujiT5pYGD6m4CF0")
//!     .with_levels([FemtoLevel::Warn, FemtoLevel::Error, FemtoLevel::Fatal, FemtoLevel::Panic])
//!     .build();
//!
//! let entry = LogEntry::new(FemtoLevel::Error, "Payment {OrderId} failed")
//!     .with_field("OrderId", 1234);
//! if let Err(err) = forwarder.dispatch(&entry) {
//!     eprintln!("seq delivery failed: {err}");
//! }
//! ```

pub mod hook;
mod json_value;
pub mod level;
pub mod log_entry;
pub mod rate_limited_warner;
pub mod seq;
mod seq_builder;

#[cfg(feature = "log-compat")]
pub mod log_compat;
#[cfg(feature = "tracing-compat")]
pub mod tracing_compat;

#[cfg(test)]
mod test_utils;

pub use hook::FemtoHook;
pub use level::{FemtoLevel, LevelParseError};
pub use log_entry::{FieldValue, LogEntry};
pub use rate_limited_warner::RateLimitedWarner;
pub use seq::{DeliveryError, FemtoSeqForwarder, ForwarderOption, ForwarderOptions};
pub use seq_builder::SeqForwarderBuilder;

#[cfg(feature = "log-compat")]
pub use log_compat::{SeqLogAdapter, install_log_adapter};
#[cfg(feature = "tracing-compat")]
pub use tracing_compat::SeqLayer;
