use fatechain_core::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("namespace '{0}' does not exist")]
    NamespaceNotFound(ResourceId),

    #[error("namespace '{0}' already exists")]
    NamespaceExists(ResourceId),

    #[error("table '{namespace}.{table}' already exists")]
    TableExists { namespace: ResourceId, table: String },

    #[error("catalog lock poisoned")]
    Poisoned,

    #[error("catalog unavailable: {0}")]
    Unavailable(String),
}

/// Namespaces, their tables and their permission grants.
///
/// Removal methods are idempotent and report whether anything was removed,
/// so a step that is re-executed after a crash can skip work already done.
pub trait NamespaceCatalog: Send + Sync {
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn namespace_exists(&self, namespace: &ResourceId) -> Result<bool, CatalogError>;

    /// All namespaces, in name order.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn namespaces(&self) -> Result<Vec<ResourceId>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NamespaceExists`] if the namespace is already present.
    fn create_namespace(&self, namespace: &ResourceId) -> Result<(), CatalogError>;

    /// Removes the namespace entry only. Returns `false` if it was already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be written.
    fn remove_namespace(&self, namespace: &ResourceId) -> Result<bool, CatalogError>;

    /// Tables in `namespace`. Unknown namespaces have no tables.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn tables(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError>;

    /// # Errors
    ///
    /// Returns [`CatalogError::NamespaceNotFound`] if the namespace is missing,
    /// or [`CatalogError::TableExists`] if the table is already present.
    fn create_table(&self, namespace: &ResourceId, table: &str) -> Result<(), CatalogError>;

    /// Returns `false` if the table was already gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be written.
    fn remove_table(&self, namespace: &ResourceId, table: &str) -> Result<bool, CatalogError>;

    /// Users granted access to `namespace`.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be read.
    fn grants(&self, namespace: &ResourceId) -> Result<Vec<String>, CatalogError>;

    /// Granting twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NamespaceNotFound`] if the namespace is missing.
    fn grant(&self, namespace: &ResourceId, user: &str) -> Result<(), CatalogError>;

    /// Removes every grant on `namespace` and returns how many there were.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog cannot be written.
    fn revoke_all(&self, namespace: &ResourceId) -> Result<usize, CatalogError>;
}
