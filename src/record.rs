//! Structured records emitted for classified query events

use crate::event::QueryError;
use std::fmt;

/// Field name for the operation label
pub const OPERATION_FIELD: &str = "operation";

/// Field name for the elapsed time in whole milliseconds
pub const OPERATION_TIME_FIELD: &str = "operation_time_ms";

/// Field name for the query error
pub const ERROR_FIELD: &str = "error";

/// Severity a record is emitted at
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Debug,
    Error,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed field value
#[derive(Clone, Debug)]
pub enum FieldValue {
    String(String),
    Int64(i64),
    Error(QueryError),
}

impl PartialEq for FieldValue {
    /// Errors compare by rendered message; they have no structural equality.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Int64(a), Self::Int64(b)) => a == b,
            (Self::Error(a), Self::Error(b)) => a.to_string() == b.to_string(),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Int64(n) => write!(f, "{}", n),
            Self::Error(err) => write!(f, "{}", err),
        }
    }
}

/// A single (key, typed value) pair
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub key: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn string(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: FieldValue::String(value.into()),
        }
    }

    pub fn int64(key: &'static str, value: i64) -> Self {
        Self {
            key,
            value: FieldValue::Int64(value),
        }
    }

    pub fn error(error: QueryError) -> Self {
        Self {
            key: ERROR_FIELD,
            value: FieldValue::Error(error),
        }
    }
}

/// Ordered field set for one emitted record
///
/// Always `operation` then `operation_time_ms`, followed by `error` for
/// failed queries. Never more than three fields.
#[derive(Clone, Debug, PartialEq)]
pub struct StructuredRecord {
    fields: Vec<Field>,
}

impl StructuredRecord {
    pub fn new(operation: impl Into<String>, operation_time_ms: i64) -> Self {
        let mut fields = Vec::with_capacity(3);
        fields.push(Field::string(OPERATION_FIELD, operation));
        fields.push(Field::int64(OPERATION_TIME_FIELD, operation_time_ms));
        Self { fields }
    }

    /// Append the error field
    ///
    /// Replaces an error already present so the record keeps at most three fields.
    pub fn with_error(mut self, error: QueryError) -> Self {
        self.fields.truncate(2);
        self.fields.push(Field::error(error));
        self
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn operation(&self) -> &str {
        match &self.fields[0].value {
            FieldValue::String(s) => s,
            _ => "",
        }
    }

    pub fn operation_time_ms(&self) -> i64 {
        match self.fields[1].value {
            FieldValue::Int64(ms) => ms,
            _ => 0,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self.fields.get(2).map(|f| &f.value) {
            Some(FieldValue::Error(err)) => Some(err),
            _ => None,
        }
    }
}

/// Outcome of classifying one query event
#[derive(Clone, Debug, PartialEq)]
pub enum LogAction {
    /// Fast successful query, nothing is emitted
    Suppress,
    /// Slow successful query
    Debug(StructuredRecord),
    /// Failed query, emitted regardless of elapsed time
    Error(StructuredRecord),
}

impl LogAction {
    pub fn severity(&self) -> Option<Severity> {
        match self {
            Self::Suppress => None,
            Self::Debug(_) => Some(Severity::Debug),
            Self::Error(_) => Some(Severity::Error),
        }
    }

    pub fn record(&self) -> Option<&StructuredRecord> {
        match self {
            Self::Suppress => None,
            Self::Debug(record) | Self::Error(record) => Some(record),
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppress)
    }
}

/// Find a field by key
pub fn find_field<'a>(fields: &'a [Field], key: &str) -> Option<&'a FieldValue> {
    fields.iter().find(|f| f.key == key).map(|f| &f.value)
}
