use std::fmt::Display;
use std::sync::Arc;

use regex::Regex;

use crate::error::{Error, Result};
use crate::rows::RowList;
use crate::statement::params::Parameter;

/// Non-fatal diagnostic attached to a result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning(pub String);

impl Warning {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }

    pub fn message(&self) -> &str {
        &self.0
    }
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Rows produced by a query handler
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QueryResult {
    pub rows: RowList,
    pub warning: Option<Warning>,
}

impl QueryResult {
    pub fn new(rows: RowList) -> Self {
        Self { rows, warning: None }
    }

    /// An empty, zero-column result
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(Warning::new(warning));
        self
    }
}

impl From<RowList> for QueryResult {
    fn from(rows: RowList) -> Self {
        Self::new(rows)
    }
}

/// Affected-row count produced by an update handler, with optional
/// generated keys
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateResult {
    pub count: i64,
    pub generated_keys: Option<RowList>,
    pub warning: Option<Warning>,
}

impl UpdateResult {
    pub fn new(count: i64) -> Self {
        Self { count, generated_keys: None, warning: None }
    }

    /// A zero-row update
    pub fn nothing() -> Self {
        Self::new(0)
    }

    pub fn with_generated_keys(mut self, keys: RowList) -> Self {
        self.generated_keys = Some(keys);
        self
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warning = Some(Warning::new(warning));
        self
    }
}

impl From<i64> for UpdateResult {
    fn from(count: i64) -> Self {
        Self::new(count)
    }
}

/// Decides how statements execute: classification plus the two
/// execution callbacks
pub trait StatementHandler: Send + Sync {
    /// Whether the SQL should be treated as a query
    fn is_query(&self, sql: &str) -> bool;

    /// Produces the rows for a query
    fn on_query(&self, sql: &str, params: &[Parameter]) -> Result<QueryResult>;

    /// Produces the affected-row count for an update
    fn on_update(&self, sql: &str, params: &[Parameter]) -> Result<UpdateResult>;
}

type QueryFn = dyn Fn(&str, &[Parameter]) -> Result<QueryResult> + Send + Sync;
type UpdateFn = dyn Fn(&str, &[Parameter]) -> Result<UpdateResult> + Send + Sync;

/// A handler assembled from detection patterns and closures
///
/// SQL is classified as a query when any pattern matches at the start
/// of the text. Unconfigured callbacks fail at dispatch time, not at
/// construction.
#[derive(Clone, Default)]
pub struct CompositeHandler {
    patterns: Vec<Regex>,
    query: Option<Arc<QueryFn>>,
    update: Option<Arc<UpdateFn>>,
}

impl CompositeHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends query-detection patterns, matched anchored at the start
    pub fn with_query_detection(mut self, patterns: &[&str]) -> Result<Self> {
        for pattern in patterns {
            let anchored = format!("^(?:{})", pattern);
            let compiled = Regex::new(&anchored)
                .map_err(|e| Error::Usage(format!("Invalid query detection pattern: {}", e)))?;
            self.patterns.push(compiled);
        }
        Ok(self)
    }

    /// Replaces the query callback
    pub fn with_query_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &[Parameter]) -> Result<QueryResult> + Send + Sync + 'static,
    {
        self.query = Some(Arc::new(handler));
        self
    }

    /// Replaces the update callback
    pub fn with_update_handler<F>(mut self, handler: F) -> Self
    where
        F: Fn(&str, &[Parameter]) -> Result<UpdateResult> + Send + Sync + 'static,
    {
        self.update = Some(Arc::new(handler));
        self
    }
}

impl std::fmt::Debug for CompositeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeHandler")
            .field("patterns", &self.patterns.len())
            .field("query", &self.query.is_some())
            .field("update", &self.update.is_some())
            .finish()
    }
}

impl StatementHandler for CompositeHandler {
    fn is_query(&self, sql: &str) -> bool {
        self.patterns.iter().any(|p| p.is_match(sql))
    }

    fn on_query(&self, sql: &str, params: &[Parameter]) -> Result<QueryResult> {
        match &self.query {
            Some(handler) => handler(sql, params),
            None => Err(Error::Execution("No query handler".into())),
        }
    }

    fn on_update(&self, sql: &str, params: &[Parameter]) -> Result<UpdateResult> {
        match &self.update {
            Some(handler) => handler(sql, params),
            None => Err(Error::Execution(format!("No update handler: {}", sql))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SqlType;

    #[test]
    fn detection_is_anchored_and_ordered() -> Result<()> {
        let handler = CompositeHandler::new()
            .with_query_detection(&["SELECT ", r"EXEC\s+that_proc"])?;
        assert!(handler.is_query("SELECT * FROM t"));
        assert!(handler.is_query("EXEC that_proc('test')"));
        assert!(!handler.is_query("UPDATE t SET x = 1"));
        assert!(!handler.is_query("DELETE FROM t WHERE x IN (SELECT y FROM u)"));
        Ok(())
    }

    #[test]
    fn invalid_pattern_is_a_usage_error() {
        let err = CompositeHandler::new()
            .with_query_detection(&["("])
            .unwrap_err();
        assert!(err.to_string().starts_with("Invalid query detection pattern"));
    }

    #[test]
    fn missing_callbacks_fail_at_dispatch() {
        let handler = CompositeHandler::new();
        assert_eq!(
            handler.on_query("SELECT 1", &[]).unwrap_err().to_string(),
            "No query handler"
        );
        assert_eq!(
            handler.on_update("DELETE FROM t", &[]).unwrap_err().to_string(),
            "No update handler: DELETE FROM t"
        );
    }

    #[test]
    fn results_carry_warnings_and_keys() -> Result<()> {
        let query = QueryResult::empty().with_warning("deprecated view");
        assert_eq!(query.warning.as_ref().map(|w| w.message()), Some("deprecated view"));

        let keys = RowList::with_columns(&[("id", SqlType::Integer)]);
        let update = UpdateResult::new(1).with_generated_keys(keys.clone());
        assert_eq!(update.count, 1);
        assert_eq!(update.generated_keys, Some(keys));
        Ok(())
    }
}
