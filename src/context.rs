//! Per-query context threaded through the two-phase hook contract
//!
//! The host creates a context before executing a query, passes it to
//! `before_query`, and hands the returned context back to `after_query`
//! once the query completes.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Context for one query attempt
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueryContext {
    /// Unique query identifier
    pub query_id: String,

    /// Enclosing query or transaction (None for top-level queries)
    pub parent_id: Option<String>,

    /// Creation time (Unix milliseconds)
    pub created_at_ms: i64,

    /// Host-defined attributes (JSON object)
    #[serde(default)]
    pub attributes: serde_json::Value,
}

impl QueryContext {
    /// Create a top-level context
    pub fn new() -> Self {
        Self {
            query_id: Uuid::new_v4().to_string(),
            parent_id: None,
            created_at_ms: chrono::Utc::now().timestamp_millis(),
            attributes: serde_json::Value::Object(serde_json::Map::new()),
        }
    }

    /// Create a context nested under this one (e.g. a statement inside a transaction)
    ///
    /// # Example
    ///
    /// ```
    /// use query_hook_log::QueryContext;
    ///
    /// let tx = QueryContext::new();
    /// let stmt = tx.child();
    /// assert_eq!(stmt.parent_id.as_deref(), Some(tx.query_id.as_str()));
    /// ```
    pub fn child(&self) -> Self {
        Self {
            parent_id: Some(self.query_id.clone()),
            ..Self::new()
        }
    }

    /// Add an attribute to the context
    pub fn set_attribute(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        if let serde_json::Value::Object(ref mut map) = self.attributes {
            map.insert(key.into(), value.into());
        }
    }

    pub fn attribute(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }
}

impl Default for QueryContext {
    fn default() -> Self {
        Self::new()
    }
}
