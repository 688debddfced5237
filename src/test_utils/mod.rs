//! Test-only helpers shared across crate unit tests.

mod collecting_hook;

pub use collecting_hook::CollectingHook;
