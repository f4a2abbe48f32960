//! Test helpers for asserting on log output.

use std::sync::{Arc, Mutex, PoisonError};
use tracing::field::{Field, Visit};
use tracing::subscriber::DefaultGuard;
use tracing::{Event, Subscriber};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::{Context, Layer};
use tracing_subscriber::prelude::*;
use tracing_subscriber::registry::LookupSpan;

#[derive(Default)]
struct MessageVisitor {
    message: Option<String>,
}

impl Visit for MessageVisitor {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_string());
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            self.message = Some(format!("{value:?}"));
        }
    }
}

/// Collects the `message` of every event at INFO and above.
#[derive(Clone, Default)]
pub(crate) struct LogCapture {
    messages: Arc<Mutex<Vec<String>>>,
}

impl<S> Layer<S> for LogCapture
where
    S: Subscriber + for<'lookup> LookupSpan<'lookup>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let mut visitor = MessageVisitor::default();
        event.record(&mut visitor);
        if let Some(message) = visitor.message {
            self.messages
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(message);
        }
    }
}

impl LogCapture {
    /// Install a capturing subscriber as the thread default.
    pub(crate) fn install() -> (Self, DefaultGuard) {
        let capture = LogCapture::default();
        let subscriber = tracing_subscriber::registry()
            .with(LevelFilter::INFO)
            .with(capture.clone());
        let guard = tracing::subscriber::set_default(subscriber);
        // A callsite first hit by a parallel test under the no-op dispatcher
        // may have cached Interest::never.
        tracing::callsite::rebuild_interest_cache();
        (capture, guard)
    }

    pub(crate) fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Run `f` with a capturing subscriber and return its result and messages.
pub(crate) fn capture_logs<T>(f: impl FnOnce() -> T) -> (T, Vec<String>) {
    let (capture, guard) = LogCapture::install();
    let result = f();
    drop(guard);
    (result, capture.messages())
}
