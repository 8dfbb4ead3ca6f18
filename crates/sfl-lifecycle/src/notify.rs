//! Notification sink: where action outcomes are surfaced to the user.

use parking_lot::Mutex;

/// How an outcome is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    Success,
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// Fire-and-forget outcome reporting. Implementations must not block.
pub trait NotificationSink: Send + Sync {
    fn notify(&self, message: &str, severity: Severity);
}

/// Keeps every notification in memory, in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    entries: Mutex<Vec<(String, Severity)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> Vec<(String, Severity)> {
        self.entries.lock().clone()
    }

    pub fn last(&self) -> Option<(String, Severity)> {
        self.entries.lock().last().cloned()
    }

    pub fn count(&self, severity: Severity) -> usize {
        self.entries.lock().iter().filter(|(_, s)| *s == severity).count()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, message: &str, severity: Severity) {
        self.entries.lock().push((message.to_string(), severity));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recording_sink_keeps_order() {
        let sink = RecordingSink::new();
        sink.notify("first", Severity::Info);
        sink.notify("second", Severity::Error);
        assert_eq!(sink.entries().len(), 2);
        assert_eq!(sink.last(), Some(("second".to_string(), Severity::Error)));
        assert_eq!(sink.count(Severity::Info), 1);
    }
}
