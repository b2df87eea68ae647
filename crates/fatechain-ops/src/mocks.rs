use std::sync::Mutex;

use fatechain_core::ResourceId;

use crate::providers::InMemoryCatalog;
use crate::traits::{CatalogError, EventError, EventSink, NamespaceCatalog};

pub struct FailingEventSink;

impl EventSink for FailingEventSink {
    fn publish(&self, _message: &str) -> Result<(), EventError> {
        Err(EventError("sink offline".to_string()))
    }
}

/// Catalog calls a [`FailingCatalog`] can be told to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogCall {
    Exists,
    RemoveTable,
    RevokeAll,
    RemoveNamespace,
}

/// An [`InMemoryCatalog`] that fails a chosen call.
pub struct FailingCatalog {
    inner: InMemoryCatalog,
    fail_on: Mutex<Option<CatalogCall>>,
}

impl FailingCatalog {
    #[must_use]
    pub fn new(inner: InMemoryCatalog, fail_on: CatalogCall) -> Self {
        Self {
            inner,
            fail_on: Mutex::new(Some(fail_on)),
        }
    }

    pub fn heal(&self) {
        *self.fail_on.lock().expect("lock poisoned") = None;
    }

    fn check(&self, call: CatalogCall) -> Result<(), CatalogError> {
        if *self.fail_on.lock().expect("lock poisoned") == Some(call) {
            return Err(CatalogError::Unavailable(format!("{call:?} injected failure")));
        }
        Ok(())
    }
}

impl NamespaceCatalog for FailingCatalog {
    fn namespace_exists(&self, namespace: &ResourceId) -> Result<bool, CatalogError> {
        self.check(CatalogCall::Exists)?;
        self.inner.namespace_exists(namespace)
    }

    fn namespaces(&self) -> Result<Vec<ResourceId>, CatalogError> {
        self.inner.namespaces()
    }

    fn create_namespace(&self, namespace: &ResourceId) -> Result<(), CatalogError> {
        self.inner.create_namespace(namespace)
    }

    fn remove_namespace(&self, namespace: &ResourceId) -> Result<bool, CatalogError> {
        self.check(CatalogCall::RemoveNamespace)?;
        self.inner.remove_namespace(namespace)
    }

    fn tables(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError> {
        self.inner.tables(namespace)
    }

    fn create_table(&self, namespace: &ResourceId, table: &str) -> Result<(), CatalogError> {
        self.inner.create_table(namespace, table)
    }

    fn remove_table(&self, namespace: &ResourceId, table: &str) -> Result<bool, CatalogError> {
        self.check(CatalogCall::RemoveTable)?;
        self.inner.remove_table(namespace, table)
    }

    fn grants(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError> {
        self.inner.grants(namespace)
    }

    fn grant(&self, namespace: &ResourceId, user: &str) -> Result<(), CatalogError> {
        self.inner.grant(namespace, user)
    }

    fn revoke_all(&self, namespace: &ResourceId) -> Result<usize, CatalogError> {
        self.check(CatalogCall::RevokeAll)?;
        self.inner.revoke_all(namespace)
    }
}
