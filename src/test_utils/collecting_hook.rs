//! A hook that accumulates entries in memory for test assertions.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::hook::FemtoHook;
use crate::level::FemtoLevel;
use crate::log_entry::LogEntry;
use crate::seq::DeliveryError;

/// Hook that stores every entry it receives for later inspection.
///
/// Clones share the same storage, so a clone can be handed to an adapter
/// while the test keeps the original.
#[derive(Clone)]
pub struct CollectingHook {
    levels: BTreeSet<FemtoLevel>,
    entries: Arc<Mutex<Vec<LogEntry>>>,
    fail: bool,
}

impl CollectingHook {
    pub fn new(levels: impl IntoIterator<Item = FemtoLevel>) -> Self {
        Self {
            levels: levels.into_iter().collect(),
            entries: Arc::default(),
            fail: false,
        }
    }

    /// A hook that records entries but reports every delivery as rejected.
    pub fn failing(levels: impl IntoIterator<Item = FemtoLevel>) -> Self {
        Self {
            fail: true,
            ..Self::new(levels)
        }
    }

    /// Return a snapshot of all entries received so far.
    pub fn collected(&self) -> Vec<LogEntry> {
        self.entries.lock().clone()
    }
}

impl FemtoHook for CollectingHook {
    fn accepted_levels(&self) -> &BTreeSet<FemtoLevel> {
        &self.levels
    }

    fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError> {
        self.entries.lock().push(entry.clone());
        if self.fail {
            return Err(DeliveryError::ServerRejected {
                status: 503,
                body: "unavailable".into(),
            });
        }
        Ok(())
    }
}
