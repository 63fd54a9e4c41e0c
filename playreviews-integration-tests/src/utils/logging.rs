//! Capturing log events as JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_with::{serde_as, DisplayFromStr};
use std::{
    collections::HashMap,
    io::{self, Write},
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

/// Collects events written by a JSON `fmt` layer.
///
/// Tracing's default subscriber is per thread, so only events from the thread
/// that installed the watcher's subscriber are seen. That leaves out the
/// server's worker threads.
#[derive(Clone, Default)]
pub struct LogWatcher {
    /// Shared with every writer made from this watcher.
    captured: Arc<Mutex<Captured>>,
}

/// What writers have handed over so far.
#[derive(Default)]
struct Captured {
    /// The start of a line still being written.
    partial: Vec<u8>,
    /// Complete lines, one JSON event each.
    lines: Vec<String>,
}

impl LogWatcher {
    /// A watcher that already holds `events`.
    #[must_use]
    pub fn with_events(events: Vec<TracingJsonEvent>) -> Self {
        let lines = events
            .iter()
            .map(|event| serde_json::to_string(event).expect("events serialize"))
            .collect();
        Self {
            captured: Arc::new(Mutex::new(Captured {
                partial: Vec::new(),
                lines,
            })),
        }
    }

    /// Lock the captured output.
    fn captured(&self) -> MutexGuard<'_, Captured> {
        self.captured.lock().expect("log watcher lock poisoned")
    }

    /// Every complete event written so far, oldest first.
    pub fn events(&self) -> Vec<TracingJsonEvent> {
        self.captured()
            .lines
            .iter()
            .map(|line| {
                serde_json::from_str(line)
                    .unwrap_or_else(|error| panic!("bad log line {:?}: {}", line, error))
            })
            .collect()
    }

    /// Whether any event matches `predicate`.
    #[must_use = "wrap this in assert!()"]
    pub fn has<F>(&self, predicate: F) -> bool
    where
        F: FnMut(&TracingJsonEvent) -> bool,
    {
        self.events().iter().any(predicate)
    }

    /// Whether any event has `event_type` in its `type` field.
    #[must_use = "wrap this in assert!()"]
    pub fn has_type(&self, event_type: &str) -> bool {
        self.has(|event| event.field_contains("type", event_type))
    }
}

impl<'a> MakeWriter<'a> for LogWatcher {
    type Writer = LogWatcher;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

impl Write for LogWatcher {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        let mut captured = self
            .captured
            .lock()
            .map_err(|error| io::Error::new(io::ErrorKind::Other, error.to_string()))?;
        captured.partial.extend_from_slice(bytes);
        while let Some(end) = captured.partial.iter().position(|byte| *byte == b'\n') {
            let line: Vec<u8> = captured.partial.drain(..=end).collect();
            let line = String::from_utf8_lossy(&line).trim().to_string();
            if !line.is_empty() {
                captured.lines.push(line);
            }
        }
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// One line of [`tracing_subscriber::fmt::format::Json`] output.
#[serde_as]
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct TracingJsonEvent {
    /// The event's fields, including `message`.
    pub fields: HashMap<String, Value>,
    /// The event's level.
    #[serde_as(as = "DisplayFromStr")]
    pub level: Level,
    /// The module the event came from.
    pub target: String,
    /// When the event happened.
    pub timestamp: String,
}

impl TracingJsonEvent {
    /// Whether the field `name` is a string containing `pattern`.
    pub fn field_contains(&self, name: &str, pattern: &str) -> bool {
        matches!(self.fields.get(name), Some(Value::String(value)) if value.contains(pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::{LogWatcher, TracingJsonEvent};
    use serde_json::json;
    use std::{collections::HashMap, io::Write};
    use tracing::Level;
    use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

    #[test]
    fn partial_lines_wait_for_the_rest() {
        let log_watcher = LogWatcher::default();
        let mut writer = log_watcher.make_writer();

        let line = r#"{"timestamp":"t","level":"WARN","fields":{"message":"hi","type":"a.b"},"target":"x"}"#;
        let (start, end) = line.split_at(20);
        writer.write_all(start.as_bytes()).unwrap();
        assert!(log_watcher.events().is_empty());

        writer.write_all(end.as_bytes()).unwrap();
        writer.write_all(b"\n").unwrap();
        let events = log_watcher.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].level, Level::WARN);
        assert!(log_watcher.has_type("a.b"));
    }

    #[test]
    fn events_from_a_subscriber_are_collected() {
        let log_watcher = LogWatcher::default();
        let subscriber = tracing_subscriber::registry()
            .with(tracing_subscriber::fmt::layer().json().with_writer(log_watcher.clone()));

        tracing::subscriber::with_default(subscriber, || {
            tracing::info!(r#type = "reviews.fetch", language = "en", count = 3, "Fetched reviews");
        });

        assert!(log_watcher.has(|event| {
            event.level == Level::INFO
                && event.field_contains("message", "Fetched")
                && event.fields.get("count") == Some(&json!(3))
        }));
        assert!(log_watcher.has_type("reviews.fetch"));
    }

    #[test]
    fn prepopulated_events_are_searchable() {
        let mut fields = HashMap::new();
        fields.insert("message".to_string(), json!("Request success"));
        fields.insert("status_code".to_string(), json!(200));
        let log_watcher = LogWatcher::with_events(vec![TracingJsonEvent {
            fields,
            level: Level::INFO,
            target: "playreviews_web".to_string(),
            timestamp: String::new(),
        }]);

        let events = log_watcher.events();
        assert_eq!(events.len(), 1);
        assert!(events[0].field_contains("message", "success"));
        assert!(!events[0].field_contains("status_code", "200"));
        assert!(!events[0].field_contains("missing", ""));
    }
}
