//! Configuration values consumed when constructing a
//! [`FemtoSeqForwarder`](super::FemtoSeqForwarder).
//!
//! [`ForwarderOptions`] is the draft that options are applied to; it is
//! frozen into the forwarder and discarded once construction completes.

use std::collections::BTreeSet;
use std::fmt;

use serde::Deserialize;

use crate::level::FemtoLevel;

/// Path appended to the host base to reach the raw event ingestion API.
pub const INGESTION_PATH: &str = "/api/events/raw";
/// Media type of a CLEF request body.
pub const CLEF_CONTENT_TYPE: &str = "application/vnd.serilog.clef";
/// Header carrying the Seq API key.
pub const API_KEY_HEADER: &str = "X-Seq-ApiKey";

/// Options collected before a forwarder is built.
///
/// Deserialisable so hosts can embed it in their own configuration files;
/// missing fields fall back to [`Default`].
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForwarderOptions {
    /// API key sent with every request.
    pub api_key: Option<String>,
    /// Levels for which delivery is requested.
    pub levels: BTreeSet<FemtoLevel>,
}

impl Default for ForwarderOptions {
    fn default() -> Self {
        Self {
            api_key: None,
            levels: FemtoLevel::ALL.into_iter().collect(),
        }
    }
}

impl fmt::Debug for ForwarderOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwarderOptions")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("levels", &self.levels)
            .finish()
    }
}

/// A single field-setting operation applied over [`ForwarderOptions`].
///
/// Each option overwrites the field it names; applying two options for the
/// same field keeps the later one.
#[derive(Clone, PartialEq, Eq)]
pub enum ForwarderOption {
    ApiKey(String),
    Levels(BTreeSet<FemtoLevel>),
}

impl fmt::Debug for ForwarderOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ApiKey(_) => f.debug_tuple("ApiKey").field(&"<redacted>").finish(),
            Self::Levels(levels) => f.debug_tuple("Levels").field(levels).finish(),
        }
    }
}

impl ForwarderOption {
    pub fn apply(self, options: &mut ForwarderOptions) {
        match self {
            Self::ApiKey(key) => options.api_key = Some(key),
            Self::Levels(levels) => options.levels = levels,
        }
    }
}

/// Set the API key used for all future deliveries.
pub fn api_key(key: impl Into<String>) -> ForwarderOption {
    ForwarderOption::ApiKey(key.into())
}

/// Replace the accepted level set with exactly `levels`.
pub fn levels(levels: impl IntoIterator<Item = FemtoLevel>) -> ForwarderOption {
    ForwarderOption::Levels(levels.into_iter().collect())
}

/// Fold `options` over the defaults in order.
pub fn resolve_options(options: impl IntoIterator<Item = ForwarderOption>) -> ForwarderOptions {
    let mut draft = ForwarderOptions::default();
    for option in options {
        option.apply(&mut draft);
    }
    draft
}

/// Build the ingestion URL for `host`. No validation is performed.
pub fn endpoint_for(host: &str) -> String {
    format!("{host}{INGESTION_PATH}")
}
