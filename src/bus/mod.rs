//! Per-instance event bus
//!
//! A typed publish/subscribe channel scoping every event to one editor
//! instance: the bus lives inside its session, so teardown drops every
//! subscription structurally instead of relying on a manual clear call.
//!
//! Emission is synchronous and fan-out, in registration order. A
//! subscriber that fails is isolated: its error goes to the diagnostic
//! hook (if any) and the remaining subscribers still run. Emitting a kind
//! nobody subscribed to is a no-op.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::errors::EngineError;
use crate::models::Heading;

/// Event kinds carried by the bus
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The buffer changed through the mutation entry point
    BufferChanged,
    /// The host should persist the carried text
    SaveRequested,
    /// A render pass (or enhancement completion) produced new HTML
    HtmlChanged,
    /// The heading catalog changed
    CatalogChanged,
    /// The host should start uploading the announced number of files
    UploadRequested,
    /// Host-defined passthrough channel
    Custom(String),
}

/// Payload accompanying an event
#[derive(Clone, Debug, PartialEq)]
pub enum EventPayload {
    None,
    Text(String),
    Headings(Vec<Heading>),
    FileCount(usize),
    /// Arbitrary host data for Custom channels
    Json(serde_json::Value),
}

/// Host-facing event record, drained through the api layer
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum OutboundEvent {
    #[serde(rename_all = "camelCase")]
    SaveRequested { text: String },
    #[serde(rename_all = "camelCase")]
    HtmlChanged { html: String },
    #[serde(rename_all = "camelCase")]
    CatalogChanged { headings: Vec<Heading> },
    #[serde(rename_all = "camelCase")]
    UploadRequested { file_count: usize },
}

/// A registered callback. Failures are isolated per subscriber.
pub type Subscriber = Box<dyn FnMut(&EventPayload) -> Result<(), EngineError> + Send>;

/// Receives errors from failing subscribers; never sees successful emits.
pub type DiagnosticHook = Box<dyn FnMut(&EventKind, &EngineError) + Send>;

/// Keyed publish/subscribe registry for one editor instance
#[derive(Default)]
pub struct EventBus {
    channels: HashMap<EventKind, Vec<Subscriber>>,
    diagnostic: Option<DiagnosticHook>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a callback under an event kind. Multiple registrations
    /// under the same kind all run on emit, in registration order.
    pub fn on(&mut self, kind: EventKind, subscriber: Subscriber) {
        self.channels.entry(kind).or_default().push(subscriber);
    }

    /// Install the diagnostic hook receiving isolated subscriber errors.
    pub fn set_diagnostic_hook(&mut self, hook: DiagnosticHook) {
        self.diagnostic = Some(hook);
    }

    /// Synchronously invoke every subscriber of `kind` with `payload`.
    ///
    /// No return value is aggregated; a failing subscriber never stops
    /// its siblings and never surfaces to the emitter.
    pub fn emit(&mut self, kind: &EventKind, payload: &EventPayload) {
        let Some(subscribers) = self.channels.get_mut(kind) else {
            return;
        };

        for subscriber in subscribers.iter_mut() {
            if let Err(err) = subscriber(payload) {
                log::warn!("bus subscriber failed for {:?}: {}", kind, err);
                if let Some(hook) = self.diagnostic.as_mut() {
                    hook(kind, &err);
                }
            }
        }
    }

    /// Remove every subscription. Dropping the owning session does this
    /// implicitly; the explicit form exists for hosts that reuse an id.
    pub fn clear(&mut self) {
        self.channels.clear();
    }

    pub fn subscriber_count(&self, kind: &EventKind) -> usize {
        self.channels.get(kind).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn recording_subscriber(log: Arc<Mutex<Vec<String>>>, tag: &str) -> Subscriber {
        let tag = tag.to_string();
        Box::new(move |payload| {
            let note = match payload {
                EventPayload::Text(text) => format!("{}:{}", tag, text),
                _ => tag.clone(),
            };
            log.lock().unwrap().push(note);
            Ok(())
        })
    }

    #[test]
    fn test_emit_fans_out_in_registration_order() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(EventKind::BufferChanged, recording_subscriber(log.clone(), "first"));
        bus.on(EventKind::BufferChanged, recording_subscriber(log.clone(), "second"));

        bus.emit(&EventKind::BufferChanged, &EventPayload::None);

        assert_eq!(*log.lock().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_emit_without_subscribers_is_noop() {
        let mut bus = EventBus::new();
        bus.emit(&EventKind::SaveRequested, &EventPayload::Text("x".into()));
    }

    #[test]
    fn test_failing_subscriber_does_not_starve_siblings() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let errors = Arc::new(Mutex::new(Vec::new()));

        bus.on(
            EventKind::BufferChanged,
            Box::new(|_| Err(EngineError::Subscriber("boom".into()))),
        );
        bus.on(EventKind::BufferChanged, recording_subscriber(log.clone(), "survivor"));

        let errors_hook = errors.clone();
        bus.set_diagnostic_hook(Box::new(move |kind, err| {
            errors_hook
                .lock()
                .unwrap()
                .push(format!("{:?}: {}", kind, err));
        }));

        bus.emit(&EventKind::BufferChanged, &EventPayload::None);

        assert_eq!(*log.lock().unwrap(), vec!["survivor"]);
        assert_eq!(errors.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_kinds_are_isolated() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(EventKind::SaveRequested, recording_subscriber(log.clone(), "save"));
        bus.on(
            EventKind::Custom("ping".into()),
            recording_subscriber(log.clone(), "ping"),
        );

        bus.emit(&EventKind::Custom("ping".into()), &EventPayload::None);

        assert_eq!(*log.lock().unwrap(), vec!["ping"]);
    }

    #[test]
    fn test_clear_removes_all_subscriptions() {
        let mut bus = EventBus::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        bus.on(EventKind::BufferChanged, recording_subscriber(log.clone(), "gone"));
        bus.clear();
        bus.emit(&EventKind::BufferChanged, &EventPayload::None);

        assert!(log.lock().unwrap().is_empty());
        assert_eq!(bus.subscriber_count(&EventKind::BufferChanged), 0);
    }
}
