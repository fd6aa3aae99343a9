//! Distributed engine context.
//!
//! Wraps a DataFusion [`SessionContext`]. Reading a distributed variable needs
//! one; the storage's object store is registered on it so engine URLs resolve
//! against the same backend the rest of the variable uses.

use crate::error::Result;
use datafusion::execution::object_store::ObjectStoreUrl;
use datafusion::prelude::SessionContext;
use std::fmt;
use varstore_filestore::Storage;

#[derive(Clone)]
pub struct DistributedContext {
    session: SessionContext,
}

impl DistributedContext {
    pub fn new() -> Self {
        Self::from_session(SessionContext::new())
    }

    pub fn from_session(session: SessionContext) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    /// Make `storage` reachable through its engine URLs.
    ///
    /// Local storage needs nothing: `file://` is always registered.
    pub fn register_storage(&self, storage: &dyn Storage) -> Result<()> {
        if let Some((url, store)) = storage.engine_store() {
            let url = ObjectStoreUrl::parse(&url)?;
            self.session.register_object_store(url.as_ref(), store);
        }
        Ok(())
    }
}

impl Default for DistributedContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DistributedContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistributedContext")
            .field("session_id", &self.session.session_id())
            .finish()
    }
}
