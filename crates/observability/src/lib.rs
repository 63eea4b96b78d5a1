//! `stockroom-observability` — logging setup and user-facing notifications.

/// Initialize process-wide observability (tracing/logging).
///
/// This is safe to call multiple times; subsequent calls become no-ops.
pub fn init() {
    tracing::init();
}

/// Tracing configuration (filters, layers).
pub mod tracing;

/// Toast-style notification collaborator.
pub mod notify;

pub use notify::{Notifier, TracingNotifier};
