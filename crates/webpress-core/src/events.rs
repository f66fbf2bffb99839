//! Observability sink for conversion events.
//!
//! The session reports pipeline start/end, decode/encode failures and
//! persistence outcomes through an injected [`EventSink`]. Emitting is
//! best-effort and returns nothing, so a sink can never change a result.

use std::fmt::Display;
use std::sync::Mutex;

/// Severity of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventLevel {
    Debug,
    Info,
    Warn,
    Error,
}

/// A structured event: level, message, key/value context.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub level: EventLevel,
    pub message: String,
    pub fields: Vec<(&'static str, String)>,
}

impl Event {
    pub fn new(level: EventLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            fields: Vec::new(),
        }
    }

    pub fn debug(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Debug, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Info, message)
    }

    pub fn warn(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Warn, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(EventLevel::Error, message)
    }

    /// Attach a context field.
    pub fn with(mut self, key: &'static str, value: impl Display) -> Self {
        self.fields.push((key, value.to_string()));
        self
    }

    /// Look up a context field by key.
    pub fn field(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Render fields as `key=value` pairs.
    fn context(&self) -> String {
        self.fields
            .iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Receives conversion events.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: Event) {
        let context = event.context();
        match event.level {
            EventLevel::Debug => tracing::debug!(context = %context, "{}", event.message),
            EventLevel::Info => tracing::info!(context = %context, "{}", event.message),
            EventLevel::Warn => tracing::warn!(context = %context, "{}", event.message),
            EventLevel::Error => tracing::error!(context = %context, "{}", event.message),
        }
    }
}

/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

/// Keeps events in memory. Handy for embedding applications and tests.
#[derive(Debug, Default)]
pub struct RecordingSink {
    events: Mutex<Vec<Event>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of everything emitted so far.
    pub fn events(&self) -> Vec<Event> {
        match self.events.lock() {
            Ok(events) => events.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.message).collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: Event) {
        // A poisoned lock only means another emitter panicked; keep recording.
        let mut events = match self.events.lock() {
            Ok(events) => events,
            Err(poisoned) => poisoned.into_inner(),
        };
        events.push(event);
    }
}
