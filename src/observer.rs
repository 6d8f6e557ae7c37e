//! In-memory sink that records everything it receives
//!
//! Intended for tests of code that installs a query hook: construct an
//! [`ObservedSink`], hand a clone of its `Arc` to the hook, then assert on
//! the recorded entries.

use crate::record::{Field, Severity};
use crate::sink::LogSink;
use std::sync::{Mutex, MutexGuard};

/// One record received by an [`ObservedSink`]
#[derive(Clone, Debug, PartialEq)]
pub struct ObservedRecord {
    pub severity: Severity,
    pub message: String,
    pub fields: Vec<Field>,
}

/// Recording sink with a minimum severity
///
/// Records below `min_severity` are dropped, the same way a leveled logger
/// configured at that level would drop them.
#[derive(Debug)]
pub struct ObservedSink {
    min_severity: Severity,
    records: Mutex<Vec<ObservedRecord>>,
}

impl ObservedSink {
    pub fn new(min_severity: Severity) -> Self {
        Self {
            min_severity,
            records: Mutex::new(Vec::new()),
        }
    }

    fn records(&self) -> MutexGuard<'_, Vec<ObservedRecord>> {
        // Records are append-only, a poisoned lock still holds valid data
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn push(&self, severity: Severity, message: &str, fields: &[Field]) {
        if severity < self.min_severity {
            return;
        }
        self.records().push(ObservedRecord {
            severity,
            message: message.to_string(),
            fields: fields.to_vec(),
        });
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// Copy of every recorded entry, oldest first
    pub fn all(&self) -> Vec<ObservedRecord> {
        self.records().clone()
    }

    /// Drain every recorded entry
    pub fn take_all(&self) -> Vec<ObservedRecord> {
        std::mem::take(&mut *self.records())
    }

    /// Entries whose message equals `message`
    pub fn filter_message(&self, message: &str) -> Vec<ObservedRecord> {
        self.records()
            .iter()
            .filter(|r| r.message == message)
            .cloned()
            .collect()
    }
}

impl Default for ObservedSink {
    fn default() -> Self {
        Self::new(Severity::Debug)
    }
}

impl LogSink for ObservedSink {
    fn debug(&self, message: &str, fields: &[Field]) {
        self.push(Severity::Debug, message, fields);
    }

    fn error(&self, message: &str, fields: &[Field]) {
        self.push(Severity::Error, message, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StructuredRecord;

    #[test]
    fn test_min_severity_filters_debug() {
        let sink = ObservedSink::new(Severity::Error);
        let record = StructuredRecord::new("SELECT", 0);

        sink.debug("dropped", record.fields());
        sink.error("kept", record.fields());

        assert_eq!(sink.len(), 1);
        assert_eq!(sink.all()[0].message, "kept");
    }

    #[test]
    fn test_take_all_drains() {
        let sink = ObservedSink::default();
        sink.debug("a", StructuredRecord::new("SELECT", 0).fields());
        sink.debug("b", StructuredRecord::new("SELECT", 0).fields());

        assert_eq!(sink.take_all().len(), 2);
        assert!(sink.is_empty());
    }

    #[test]
    fn test_filter_message() {
        let sink = ObservedSink::default();
        sink.debug("SELECT 1", StructuredRecord::new("SELECT", 0).fields());
        sink.debug("SELECT 2", StructuredRecord::new("SELECT", 0).fields());
        sink.error("SELECT 1", StructuredRecord::new("SELECT", 0).fields());

        let matching = sink.filter_message("SELECT 1");
        assert_eq!(matching.len(), 2);
        assert_eq!(matching[1].severity, Severity::Error);
    }
}
