//! User-facing notification collaborator.
//!
//! The UI layer presents these as toasts; the backend treats them as
//! fire-and-forget and never consumes a return value. Keeping the trait here
//! lets every crate surface feedback without knowing how it is rendered.

/// Fire-and-forget success/error feedback.
pub trait Notifier: Send + Sync {
    fn success(&self, message: &str);
    fn error(&self, message: &str);
}

/// Default notifier: routes feedback into the tracing pipeline.
///
/// Used by headless processes (scripts, tests) where no toast surface exists.
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

impl Notifier for TracingNotifier {
    fn success(&self, message: &str) {
        tracing::info!(notification = "success", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::warn!(notification = "error", "{message}");
    }
}
