//! Builder for [`FemtoSeqForwarder`](crate::seq::FemtoSeqForwarder).
//!
//! Every setter overwrites the value it names, so the last call for a field
//! wins. Building never fails and performs no I/O: a malformed host surfaces
//! as a delivery error.

use std::collections::BTreeSet;
use std::fmt;

use ureq::Agent;

use crate::level::FemtoLevel;
use crate::seq::{FemtoSeqForwarder, ForwarderOption, ForwarderOptions, default_agent};

/// Builder for constructing [`FemtoSeqForwarder`] instances.
#[derive(Clone)]
pub struct SeqForwarderBuilder {
    host: String,
    options: ForwarderOptions,
    agent: Option<Agent>,
}

impl SeqForwarderBuilder {
    /// Start from the defaults for `host`, for example `http://localhost:5341`.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            options: ForwarderOptions::default(),
            agent: None,
        }
    }

    /// Set the API key sent in the `X-Seq-ApiKey` header.
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.options.api_key = Some(key.into());
        self
    }

    /// Replace the accepted levels with exactly `levels`.
    pub fn with_levels(mut self, levels: impl IntoIterator<Item = FemtoLevel>) -> Self {
        self.options.levels = levels.into_iter().collect::<BTreeSet<_>>();
        self
    }

    /// Replace every option at once, e.g. with values loaded from a file.
    pub fn with_options(mut self, options: ForwarderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_option(mut self, option: ForwarderOption) -> Self {
        option.apply(&mut self.options);
        self
    }

    /// Use a caller-configured agent, e.g. to set timeouts or a proxy.
    pub fn with_agent(mut self, agent: Agent) -> Self {
        self.agent = Some(agent);
        self
    }

    pub fn build(self) -> FemtoSeqForwarder {
        let agent = self.agent.unwrap_or_else(default_agent);
        FemtoSeqForwarder::from_parts(&self.host, self.options, agent)
    }
}

impl fmt::Debug for SeqForwarderBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SeqForwarderBuilder")
            .field("host", &self.host)
            .field("options", &self.options)
            .field("custom_agent", &self.agent.is_some())
            .finish()
    }
}
