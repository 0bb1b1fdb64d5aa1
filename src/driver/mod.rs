use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::connection::{Connection, DefaultResourceHandler, ResourceHandler};
use crate::error::{Error, Result};
use crate::handler::StatementHandler;

/// Everything a connection needs: statement routing plus transaction
/// boundaries
#[derive(Clone)]
pub struct ConnectionHandler {
    pub statement: Arc<dyn StatementHandler>,
    pub resource: Arc<dyn ResourceHandler>,
}

impl ConnectionHandler {
    /// Bundles a statement handler with the default resource handler
    pub fn new(statement: Arc<dyn StatementHandler>) -> Self {
        Self { statement, resource: Arc::new(DefaultResourceHandler) }
    }

    pub fn with_resource(mut self, resource: Arc<dyn ResourceHandler>) -> Self {
        self.resource = resource;
        self
    }
}

impl std::fmt::Debug for ConnectionHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandler").finish_non_exhaustive()
    }
}

/// Process-wide handler registry keyed by caller-chosen ids
#[derive(Default)]
pub struct Registry {
    handlers: RwLock<HashMap<String, Arc<ConnectionHandler>>>,
}

impl Registry {
    /// Stores or replaces the handler under `id`
    pub fn register(&self, id: &str, handler: ConnectionHandler) -> Result<()> {
        check_id(id)?;
        let mut handlers = self.handlers.write()?;
        handlers.insert(id.into(), Arc::new(handler));
        Ok(())
    }

    /// Removes the handler under `id`, returning it when present
    pub fn unregister(&self, id: &str) -> Result<Option<Arc<ConnectionHandler>>> {
        check_id(id)?;
        let mut handlers = self.handlers.write()?;
        Ok(handlers.remove(id))
    }

    /// Looks up the handler under `id`
    pub fn resolve(&self, id: &str) -> Result<Arc<ConnectionHandler>> {
        check_id(id)?;
        let handlers = self.handlers.read()?;
        handlers
            .get(id)
            .cloned()
            .ok_or_else(|| Error::Usage(format!("No matching handler: {}", id)))
    }

    /// Number of registered handlers
    pub fn len(&self) -> Result<usize> {
        Ok(self.handlers.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }
}

fn check_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::Usage(format!("Invalid handler id: {}", id)));
    }
    Ok(())
}

/// The process-wide registry instance
pub fn registry() -> &'static Registry {
    static REGISTRY: OnceLock<Registry> = OnceLock::new();
    REGISTRY.get_or_init(Registry::default)
}

/// Opens a connection against the registered handler with no
/// properties
pub fn connect(id: &str) -> Result<Connection> {
    connect_with(id, HashMap::new())
}

/// Opens a connection against the registered handler
pub fn connect_with(id: &str, properties: HashMap<String, String>) -> Result<Connection> {
    let handler = registry().resolve(id)?;
    Ok(Connection::new(
        handler.statement.clone(),
        handler.resource.clone(),
        properties,
    ))
}

/// Opens a connection directly from a handler, bypassing the registry
pub fn connection(handler: ConnectionHandler) -> Connection {
    connection_with(handler, HashMap::new())
}

/// Opens a connection directly from a handler with properties
pub fn connection_with(
    handler: ConnectionHandler,
    properties: HashMap<String, String>,
) -> Connection {
    Connection::new(handler.statement, handler.resource, properties)
}
