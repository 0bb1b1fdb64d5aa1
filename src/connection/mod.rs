use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{Error, Result};
use crate::handler::StatementHandler;
use crate::statement::{KeySelection, Statement};

static NEXT_SAVEPOINT_ID: AtomicU64 = AtomicU64::new(1);

/// A transaction savepoint with a process-unique id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Savepoint {
    id: u64,
    name: Option<String>,
}

impl Savepoint {
    fn anonymous() -> Self {
        Self { id: NEXT_SAVEPOINT_ID.fetch_add(1, Ordering::Relaxed), name: None }
    }

    fn named(name: &str) -> Result<Self> {
        if name.trim().is_empty() {
            return Err(Error::Usage("Invalid savepoint name".into()));
        }
        Ok(Self { name: Some(name.into()), ..Self::anonymous() })
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// Receives transaction boundary events from a connection
///
/// Implementations decide what commit, rollback and savepoint
/// operations mean; errors propagate to the caller verbatim.
pub trait ResourceHandler: Send + Sync {
    fn on_commit(&self) -> Result<()>;
    fn on_rollback(&self) -> Result<()>;
    fn on_release_savepoint(&self, savepoint: &Savepoint) -> Result<()>;
    fn on_rollback_to(&self, savepoint: &Savepoint) -> Result<()>;
}

/// Commits and rolls back as no-ops; savepoints are not supported
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultResourceHandler;

impl ResourceHandler for DefaultResourceHandler {
    fn on_commit(&self) -> Result<()> {
        Ok(())
    }

    fn on_rollback(&self) -> Result<()> {
        Ok(())
    }

    fn on_release_savepoint(&self, _savepoint: &Savepoint) -> Result<()> {
        Err(Error::Unsupported("savepoint"))
    }

    fn on_rollback_to(&self, _savepoint: &Savepoint) -> Result<()> {
        Err(Error::Unsupported("savepoint"))
    }
}

/// A simulated connection: statement factory plus transaction state
///
/// Auto-commit starts enabled; transaction boundary operations require
/// it to be off. Close is terminal and closing twice is an error.
pub struct Connection {
    handler: Arc<dyn StatementHandler>,
    resource: Arc<dyn ResourceHandler>,
    properties: HashMap<String, String>,
    auto_commit: bool,
    closed: bool,
    savepoints: u32,
}

impl Connection {
    pub fn new(
        handler: Arc<dyn StatementHandler>,
        resource: Arc<dyn ResourceHandler>,
        properties: HashMap<String, String>,
    ) -> Self {
        Self { handler, resource, properties, auto_commit: true, closed: false, savepoints: 0 }
    }

    /// Number of savepoints set and not yet released
    pub fn open_savepoint_count(&self) -> u32 {
        self.savepoints
    }

    pub fn properties(&self) -> &HashMap<String, String> {
        &self.properties
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// A plain statement producing forward-only cursors
    pub fn create_statement(&self) -> Result<Statement> {
        self.check_open()?;
        Ok(Statement::new(self.handler.clone(), self.properties.clone()))
    }

    /// A plain statement producing scrollable cursors
    pub fn create_statement_scrollable(&self) -> Result<Statement> {
        Ok(self.create_statement()?.with_scrollable(true))
    }

    /// Prepares fixed SQL; classification happens here, once
    pub fn prepare(&self, sql: &str) -> Result<Statement> {
        self.check_open()?;
        Ok(Statement::prepared(self.handler.clone(), self.properties.clone(), sql))
    }

    /// Prepares fixed SQL with scrollable cursors
    pub fn prepare_scrollable(&self, sql: &str) -> Result<Statement> {
        Ok(self.prepare(sql)?.with_scrollable(true))
    }

    /// Prepares fixed SQL and selects generated-key columns
    pub fn prepare_with_keys(&self, sql: &str, keys: KeySelection) -> Result<Statement> {
        Ok(self.prepare(sql)?.with_key_selection(keys))
    }

    pub fn get_auto_commit(&self) -> Result<bool> {
        self.check_open()?;
        Ok(self.auto_commit)
    }

    pub fn set_auto_commit(&mut self, auto_commit: bool) -> Result<()> {
        self.check_open()?;
        self.auto_commit = auto_commit;
        Ok(())
    }

    /// Delegates to the resource handler; needs auto-commit off
    pub fn commit(&self) -> Result<()> {
        self.check_transaction()?;
        self.resource.on_commit()
    }

    /// Delegates to the resource handler; needs auto-commit off
    pub fn rollback(&self) -> Result<()> {
        self.check_transaction()?;
        self.resource.on_rollback()
    }

    /// An anonymous savepoint with a process-unique id
    pub fn set_savepoint(&mut self) -> Result<Savepoint> {
        self.check_transaction()?;
        self.savepoints += 1;
        Ok(Savepoint::anonymous())
    }

    /// A named savepoint; the name must be non-blank
    pub fn set_savepoint_named(&mut self, name: &str) -> Result<Savepoint> {
        self.check_transaction()?;
        let savepoint = Savepoint::named(name)?;
        self.savepoints += 1;
        Ok(savepoint)
    }

    pub fn release_savepoint(&mut self, savepoint: &Savepoint) -> Result<()> {
        self.check_transaction()?;
        self.resource.on_release_savepoint(savepoint)?;
        self.savepoints = self.savepoints.saturating_sub(1);
        Ok(())
    }

    pub fn rollback_to(&self, savepoint: &Savepoint) -> Result<()> {
        self.check_transaction()?;
        self.resource.on_rollback_to(savepoint)
    }

    /// Terminal; closing twice is an error
    pub fn close(&mut self) -> Result<()> {
        if self.closed {
            return Err(Error::State("Connection is already closed".into()));
        }
        self.closed = true;
        Ok(())
    }

    fn check_open(&self) -> Result<()> {
        if self.closed {
            return Err(Error::State("Connection is closed".into()));
        }
        Ok(())
    }

    fn check_transaction(&self) -> Result<()> {
        self.check_open()?;
        if self.auto_commit {
            return Err(Error::State("Auto-commit is enabled".into()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("auto_commit", &self.auto_commit)
            .field("closed", &self.closed)
            .field("properties", &self.properties)
            .finish()
    }
}
