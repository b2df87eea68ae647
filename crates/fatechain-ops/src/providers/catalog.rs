use std::collections::{BTreeMap, BTreeSet};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use fatechain_core::ResourceId;
use tracing::warn;

use super::cluster_state::{ClusterState, PermissionEntry, TableEntry};
use crate::traits::{CatalogError, NamespaceCatalog};

#[derive(Debug, Default)]
struct NamespaceEntry {
    tables: BTreeSet<String>,
    grants: BTreeSet<String>,
}

/// A [`NamespaceCatalog`] kept in memory and persisted through [`ClusterState`].
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    namespaces: RwLock<BTreeMap<ResourceId, NamespaceEntry>>,
}

impl InMemoryCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a catalog from a saved state. Tables and grants that name an
    /// unknown namespace are dropped.
    #[must_use]
    pub fn from_state(state: &ClusterState) -> Self {
        let mut namespaces: BTreeMap<ResourceId, NamespaceEntry> = state
            .namespaces
            .iter()
            .map(|ns| (ns.clone(), NamespaceEntry::default()))
            .collect();

        for table in &state.tables {
            match namespaces.get_mut(&table.namespace) {
                Some(entry) => {
                    entry.tables.insert(table.name.clone());
                }
                None => warn!(
                    namespace = %table.namespace,
                    table = %table.name,
                    "dropping table of unknown namespace"
                ),
            }
        }
        for permission in &state.permissions {
            match namespaces.get_mut(&permission.namespace) {
                Some(entry) => {
                    entry.grants.insert(permission.user.clone());
                }
                None => warn!(
                    namespace = %permission.namespace,
                    user = %permission.user,
                    "dropping grant on unknown namespace"
                ),
            }
        }

        Self {
            namespaces: RwLock::new(namespaces),
        }
    }

    /// Export namespaces, tables and grants. Reservations are left empty.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Poisoned`] if the catalog lock is poisoned.
    pub fn to_state(&self) -> Result<ClusterState, CatalogError> {
        let namespaces = self.read()?;
        let mut state = ClusterState::default();

        for (namespace, entry) in namespaces.iter() {
            state.namespaces.push(namespace.clone());
            state
                .tables
                .extend(entry.tables.iter().map(|name| TableEntry {
                    namespace: namespace.clone(),
                    name: name.clone(),
                }));
            state
                .permissions
                .extend(entry.grants.iter().map(|user| PermissionEntry {
                    namespace: namespace.clone(),
                    user: user.clone(),
                }));
        }

        Ok(state)
    }

    fn read(
        &self,
    ) -> Result<RwLockReadGuard<'_, BTreeMap<ResourceId, NamespaceEntry>>, CatalogError> {
        self.namespaces.read().map_err(|_| CatalogError::Poisoned)
    }

    fn write(
        &self,
    ) -> Result<RwLockWriteGuard<'_, BTreeMap<ResourceId, NamespaceEntry>>, CatalogError> {
        self.namespaces.write().map_err(|_| CatalogError::Poisoned)
    }
}

impl NamespaceCatalog for InMemoryCatalog {
    fn namespace_exists(&self, namespace: &ResourceId) -> Result<bool, CatalogError> {
        Ok(self.read()?.contains_key(namespace))
    }

    fn namespaces(&self) -> Result<Vec<ResourceId>, CatalogError> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn create_namespace(&self, namespace: &ResourceId) -> Result<(), CatalogError> {
        let mut namespaces = self.write()?;
        if namespaces.contains_key(namespace) {
            return Err(CatalogError::NamespaceExists(namespace.clone()));
        }
        namespaces.insert(namespace.clone(), NamespaceEntry::default());
        Ok(())
    }

    fn remove_namespace(&self, namespace: &ResourceId) -> Result<bool, CatalogError> {
        Ok(self.write()?.remove(namespace).is_some())
    }

    fn tables(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .read()?
            .get(namespace)
            .map(|entry| entry.tables.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn create_table(&self, namespace: &ResourceId, table: &str) -> Result<(), CatalogError> {
        let mut namespaces = self.write()?;
        let entry = namespaces
            .get_mut(namespace)
            .ok_or_else(|| CatalogError::NamespaceNotFound(namespace.clone()))?;
        if !entry.tables.insert(table.to_string()) {
            return Err(CatalogError::TableExists {
                namespace: namespace.clone(),
                table: table.to_string(),
            });
        }
        Ok(())
    }

    fn remove_table(&self, namespace: &ResourceId, table: &str) -> Result<bool, CatalogError> {
        Ok(self
            .write()?
            .get_mut(namespace)
            .is_some_and(|entry| entry.tables.remove(table)))
    }

    fn grants(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError> {
        Ok(self
            .read()?
            .get(namespace)
            .map(|entry| entry.grants.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn grant(&self, namespace: &ResourceId, user: &str) -> Result<(), CatalogError> {
        let mut namespaces = self.write()?;
        let entry = namespaces
            .get_mut(namespace)
            .ok_or_else(|| CatalogError::NamespaceNotFound(namespace.clone()))?;
        entry.grants.insert(user.to_string());
        Ok(())
    }

    fn revoke_all(&self, namespace: &ResourceId) -> Result<usize, CatalogError> {
        Ok(self
            .write()?
            .get_mut(namespace)
            .map(|entry| std::mem::take(&mut entry.grants).len())
            .unwrap_or_default())
    }
}
