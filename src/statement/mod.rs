pub mod params;

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cursor::Cursor;
use crate::error::{Error, Result};
use crate::handler::{StatementHandler, Warning};
use crate::rows::RowList;
use crate::types::{SqlType, Value};
use params::{Parameter, ParameterBinder, ParameterDef};

/// Identifies the statement a cursor was produced by
pub type StatementId = u64;

/// Batch slot outcome for an item that did not complete
pub const EXECUTE_FAILED: i64 = -3;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Connection property: fresh query cursors start on row 1
pub const PROP_INIT_ON_FIRST_ROW: &str = "cursor.init_on_first_row";
/// Connection property: batch execution keeps going past failures
pub const PROP_CONTINUE_ON_ERROR: &str = "batch.continue_on_error";
/// Connection property: bare null binds as a string-typed null
pub const PROP_UNTYPED_NULL: &str = "parameter.untyped_null";

/// Which generated-key columns the caller asked for
#[derive(Debug, Clone, Default)]
pub enum KeySelection {
    #[default]
    All,
    Names(Vec<String>),
    Indexes(Vec<usize>),
}

impl KeySelection {
    fn apply(&self, keys: &RowList) -> Result<RowList> {
        match self {
            KeySelection::All => Ok(keys.clone()),
            KeySelection::Names(names) => {
                let labels: Vec<&str> = names.iter().map(String::as_str).collect();
                keys.projection(&labels)
            }
            KeySelection::Indexes(indexes) => keys.projection_by_index(indexes),
        }
    }
}

#[derive(Debug, Clone)]
enum BatchItem {
    Parameters(ParameterBinder),
    Sql(String),
}

/// Routes SQL to the connection's handler and holds the last result
///
/// A prepared statement fixes its SQL (classified once at prepare time)
/// and binds positional parameters; a plain statement takes SQL per
/// call. Neither parses anything.
pub struct Statement {
    id: StatementId,
    handler: Arc<dyn StatementHandler>,
    properties: HashMap<String, String>,
    sql: Option<String>,
    sql_is_query: bool,
    binder: ParameterBinder,
    batch: Vec<BatchItem>,
    key_selection: KeySelection,
    scrollable: bool,
    max_rows: i64,
    closed: bool,
    cursor: Option<Cursor>,
    update_count: i64,
    generated_keys: RowList,
    warning: Option<Warning>,
}

impl Statement {
    /// A plain statement over the given handler
    pub fn new(handler: Arc<dyn StatementHandler>, properties: HashMap<String, String>) -> Self {
        let untyped_null = prop_enabled(&properties, PROP_UNTYPED_NULL);
        Self {
            id: NEXT_ID.fetch_add(1, Ordering::Relaxed),
            handler,
            properties,
            sql: None,
            sql_is_query: false,
            binder: ParameterBinder::new().with_untyped_null(untyped_null),
            batch: Vec::new(),
            key_selection: KeySelection::All,
            scrollable: false,
            max_rows: 0,
            closed: false,
            cursor: None,
            update_count: -1,
            generated_keys: RowList::default(),
            warning: None,
        }
    }

    /// A prepared statement; the SQL is classified once, here
    pub fn prepared(
        handler: Arc<dyn StatementHandler>,
        properties: HashMap<String, String>,
        sql: impl Into<String>,
    ) -> Self {
        let sql = sql.into();
        let sql_is_query = handler.is_query(&sql);
        Self {
            sql: Some(sql),
            sql_is_query,
            ..Self::new(handler, properties)
        }
    }

    /// Makes query cursors scrollable instead of forward-only
    pub fn with_scrollable(mut self, scrollable: bool) -> Self {
        self.scrollable = scrollable;
        self
    }

    /// Selects which generated-key columns updates should expose
    pub fn with_key_selection(mut self, selection: KeySelection) -> Self {
        self.key_selection = selection;
        self
    }

    pub fn id(&self) -> StatementId {
        self.id
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Closing an already closed statement is an error
    ///
    /// Closes the stored result cursor. Cursors previously handed out
    /// by `get_result_set` are independent copies and stay usable.
    pub fn close(&mut self) -> Result<()> {
        self.check_open()?;
        self.closed = true;
        if let Some(cursor) = self.cursor.as_mut() {
            cursor.close();
        }
        Ok(())
    }

    pub fn get_max_rows(&self) -> i64 {
        self.max_rows
    }

    /// Caps query results; non-positive means unlimited
    pub fn set_max_rows(&mut self, max_rows: i64) -> Result<()> {
        self.check_open()?;
        self.max_rows = max_rows;
        Ok(())
    }

    pub fn get_warning(&self) -> Option<&Warning> {
        self.warning.as_ref()
    }

    pub fn clear_warning(&mut self) {
        self.warning = None;
    }

    // ---- parameter binding (prepared mode) ----

    /// Binds `value` at 1-based `pos`, inferring its declared type
    pub fn bind(&mut self, pos: usize, value: Value) -> Result<()> {
        self.check_open()?;
        self.binder.bind(pos, value)
    }

    /// Binds a null declared as `sql_type`
    pub fn bind_null(&mut self, pos: usize, sql_type: SqlType) -> Result<()> {
        self.check_open()?;
        self.binder.bind_null(pos, sql_type)
    }

    /// Binds with an explicit parameter def
    pub fn set_parameter(&mut self, pos: usize, def: ParameterDef, value: Value) -> Result<()> {
        self.check_open()?;
        self.binder.set(pos, def, value)
    }

    pub fn clear_parameters(&mut self) -> Result<()> {
        self.check_open()?;
        self.binder.clear();
        Ok(())
    }

    /// Number of bound parameter slots (high-water mark)
    pub fn parameter_count(&self) -> usize {
        self.binder.count()
    }

    /// Declared shape of the parameter at 1-based `pos`
    pub fn parameter_def(&self, pos: usize) -> Result<ParameterDef> {
        self.binder.def(pos)
    }

    /// Stream, ref and row-id style parameters are not simulated
    pub fn bind_stream(&mut self, _pos: usize) -> Result<()> {
        Err(Error::Unsupported("stream parameter"))
    }

    /// Structured (ref, row-id, XML) parameters are not simulated
    pub fn bind_structured(&mut self, _pos: usize) -> Result<()> {
        Err(Error::Unsupported("structured parameter"))
    }

    // ---- execution ----

    /// Runs the prepared SQL as a query
    pub fn execute_query(&mut self) -> Result<()> {
        self.check_open()?;
        let sql = self.prepared_sql()?;
        if !self.sql_is_query {
            return Err(Error::State("Not a query".into()));
        }
        let params = self.binder.ordered()?;
        self.run_query(&sql, &params)
    }

    /// Runs one-off SQL as a query
    pub fn execute_query_sql(&mut self, sql: &str) -> Result<()> {
        self.check_open()?;
        if !self.handler.is_query(sql) {
            return Err(Error::State("Not a query".into()));
        }
        self.run_query(sql, &[])
    }

    /// Runs the prepared SQL as an update, returning the affected count
    pub fn execute_update(&mut self) -> Result<i64> {
        self.check_open()?;
        let sql = self.prepared_sql()?;
        if self.sql_is_query {
            return Err(Error::State("Cannot update with query".into()));
        }
        let params = self.binder.ordered()?;
        self.run_update(&sql, &params)
    }

    /// Runs one-off SQL as an update, returning the affected count
    pub fn execute_update_sql(&mut self, sql: &str) -> Result<i64> {
        self.check_open()?;
        if self.handler.is_query(sql) {
            return Err(Error::State("Cannot update with query".into()));
        }
        self.run_update(sql, &[])
    }

    /// Routes the prepared SQL on its classification; true when a
    /// result set was produced
    pub fn execute(&mut self) -> Result<bool> {
        self.check_open()?;
        if self.sql_is_query {
            self.execute_query()?;
            Ok(true)
        } else {
            self.execute_update()?;
            Ok(false)
        }
    }

    /// Routes one-off SQL on the handler's classification
    pub fn execute_sql(&mut self, sql: &str) -> Result<bool> {
        self.check_open()?;
        if self.handler.is_query(sql) {
            self.execute_query_sql(sql)?;
            Ok(true)
        } else {
            self.execute_update_sql(sql)?;
            Ok(false)
        }
    }

    /// Cursor from the last query, if the last execution was a query
    ///
    /// Each call returns an independent copy of the result
    pub fn get_result_set(&mut self) -> Result<Option<Cursor>> {
        self.check_open()?;
        Ok(self.cursor.clone())
    }

    /// Count from the last update, -1 after a query
    pub fn get_update_count(&self) -> i64 {
        self.update_count
    }

    /// Keys from the last update as a forward-only cursor; empty when
    /// the handler supplied none
    pub fn get_generated_keys(&mut self) -> Result<Cursor> {
        self.check_open()?;
        Ok(Cursor::forward_only(self.generated_keys.clone()).with_statement(self.id))
    }

    // ---- batch ----

    /// Snapshots the current parameters as one batch item
    pub fn add_batch(&mut self) -> Result<()> {
        self.check_open()?;
        self.prepared_sql()?;
        self.batch.push(BatchItem::Parameters(self.binder.clone()));
        Ok(())
    }

    /// Queues one-off SQL; prepared statements refuse distinct SQL
    pub fn add_batch_sql(&mut self, sql: &str) -> Result<()> {
        self.check_open()?;
        if self.sql.is_some() {
            return Err(Error::Usage(
                "Cannot add distinct SQL to prepared statement".into(),
            ));
        }
        self.batch.push(BatchItem::Sql(sql.into()));
        Ok(())
    }

    pub fn clear_batch(&mut self) -> Result<()> {
        self.check_open()?;
        self.batch.clear();
        Ok(())
    }

    /// Runs the queued items as updates, in submission order
    ///
    /// Every slot starts as `EXECUTE_FAILED` and is overwritten by the
    /// item's count on success. The first failure aborts the remainder
    /// unless `batch.continue_on_error` is set, in which case it is
    /// reported after the run with the mixed counts.
    pub fn execute_batch(&mut self) -> Result<Vec<i64>> {
        self.check_open()?;
        let continue_on_error = prop_enabled(&self.properties, PROP_CONTINUE_ON_ERROR);
        let items = std::mem::take(&mut self.batch);
        let mut counts = vec![EXECUTE_FAILED; items.len()];
        let mut first_failure = None;
        for (slot, item) in items.iter().enumerate() {
            match self.run_batch_item(item) {
                Ok(count) => counts[slot] = count,
                Err(cause) => {
                    if first_failure.is_none() {
                        first_failure = Some(cause);
                    }
                    if !continue_on_error {
                        break;
                    }
                }
            }
        }
        match first_failure {
            Some(cause) => Err(Error::Batch { counts, cause: Box::new(cause) }),
            None => Ok(counts),
        }
    }

    // ---- internals ----

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::State("Statement is closed".into()));
        }
        Ok(())
    }

    fn prepared_sql(&self) -> Result<String> {
        self.sql
            .clone()
            .ok_or_else(|| Error::Usage("Statement has no prepared SQL".into()))
    }

    fn run_query(&mut self, sql: &str, params: &[Parameter]) -> Result<()> {
        let result = self
            .handler
            .on_query(sql, params)
            .map_err(|e| Error::Execution(e.to_string()))?;
        let rows = result.rows.sub_list(self.max_rows);
        let mut cursor = if self.scrollable {
            Cursor::new(rows)
        } else {
            Cursor::forward_only(rows)
        };
        if prop_enabled(&self.properties, PROP_INIT_ON_FIRST_ROW) {
            cursor = cursor.on_first_row();
        }
        if let Some(warning) = &result.warning {
            cursor = cursor.with_warning(warning.clone());
        }
        self.cursor = Some(cursor.with_statement(self.id));
        self.update_count = -1;
        self.generated_keys = RowList::default();
        self.warning = result.warning;
        Ok(())
    }

    fn run_update(&mut self, sql: &str, params: &[Parameter]) -> Result<i64> {
        let result = self
            .handler
            .on_update(sql, params)
            .map_err(|e| Error::Execution(e.to_string()))?;
        self.cursor = None;
        self.update_count = result.count;
        self.generated_keys = match &result.generated_keys {
            Some(keys) => self.key_selection.apply(keys)?,
            None => RowList::default(),
        };
        self.warning = result.warning;
        Ok(result.count)
    }

    fn run_batch_item(&mut self, item: &BatchItem) -> Result<i64> {
        match item {
            BatchItem::Parameters(binder) => {
                let sql = self.prepared_sql()?;
                if self.sql_is_query {
                    return Err(Error::State("Cannot update with query".into()));
                }
                let params = binder.ordered()?;
                self.run_update(&sql, &params)
            }
            BatchItem::Sql(sql) => {
                if self.handler.is_query(sql) {
                    return Err(Error::State("Cannot update with query".into()));
                }
                let sql = sql.clone();
                self.run_update(&sql, &[])
            }
        }
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement")
            .field("id", &self.id)
            .field("sql", &self.sql)
            .field("closed", &self.closed)
            .field("batch", &self.batch.len())
            .finish()
    }
}

fn prop_enabled(properties: &HashMap<String, String>, key: &str) -> bool {
    properties.get(key).is_some_and(|v| v == "true")
}
