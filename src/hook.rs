use std::cell::Cell;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::level::FemtoLevel;
use crate::log_entry::LogEntry;
use crate::seq::DeliveryError;

/// Capability pair a logging framework depends on.
///
/// `FemtoHook` is `Send + Sync` so a single instance can be shared by every
/// thread that emits log entries. Delivery runs on the calling thread.
pub trait FemtoHook: Send + Sync {
    /// Levels for which [`deliver`](Self::deliver) should be invoked.
    fn accepted_levels(&self) -> &BTreeSet<FemtoLevel>;

    /// Deliver a single entry, returning any failure to the caller.
    fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError>;

    fn is_enabled_for(&self, level: FemtoLevel) -> bool {
        self.accepted_levels().contains(&level)
    }

    /// Deliver `entry` only when its level is accepted.
    ///
    /// Returns `Ok(false)` when the entry was skipped.
    fn dispatch(&self, entry: &LogEntry) -> Result<bool, DeliveryError> {
        if !self.is_enabled_for(entry.level()) {
            return Ok(false);
        }
        self.deliver(entry).map(|()| true)
    }
}

impl<H: FemtoHook + ?Sized> FemtoHook for Arc<H> {
    fn accepted_levels(&self) -> &BTreeSet<FemtoLevel> {
        (**self).accepted_levels()
    }

    fn deliver(&self, entry: &LogEntry) -> Result<(), DeliveryError> {
        (**self).deliver(entry)
    }
}

thread_local! {
    static DELIVERING: Cell<bool> = const { Cell::new(false) };
}

/// Run `f` unless the current thread is already inside a guarded delivery.
///
/// Framework bridges wrap delivery in this guard so records emitted by the
/// transport while sending (for example `ureq`'s own `log` output) are
/// dropped instead of being fed back into the hook.
#[cfg_attr(
    not(any(feature = "log-compat", feature = "tracing-compat")),
    allow(dead_code)
)]
pub(crate) fn guard_reentry<R>(f: impl FnOnce() -> R) -> Option<R> {
    if DELIVERING.with(Cell::get) {
        return None;
    }
    DELIVERING.with(|flag| flag.set(true));
    let _reset = ResetOnDrop;
    Some(f())
}

struct ResetOnDrop;

impl Drop for ResetOnDrop {
    fn drop(&mut self) {
        DELIVERING.with(|flag| flag.set(false));
    }
}
