use std::fs;
use std::path::Path;

use fatechain_core::ResourceId;
use fatechain_reserve::{Reservation, ReservationTable};
use serde::{Deserialize, Serialize};

use super::InMemoryCatalog;
use crate::Result;
use crate::error::OperationError;
use crate::traits::ClusterStateIO;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableEntry {
    pub namespace: ResourceId,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionEntry {
    pub namespace: ResourceId,
    pub user: String,
}

/// Everything a cluster knows between two CLI invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterState {
    pub namespaces: Vec<ResourceId>,
    pub tables: Vec<TableEntry>,
    pub permissions: Vec<PermissionEntry>,
    pub reservations: Vec<Reservation>,
}

impl ClusterState {
    /// Capture the catalog contents and every reservation currently held.
    ///
    /// # Errors
    ///
    /// Returns an error if either lock is poisoned.
    pub fn capture(catalog: &InMemoryCatalog, reservations: &ReservationTable) -> Result<Self> {
        let mut state = catalog.to_state()?;
        state.reservations = reservations.snapshot()?;
        Ok(state)
    }

    #[must_use]
    pub fn catalog(&self) -> InMemoryCatalog {
        InMemoryCatalog::from_state(self)
    }

    #[must_use]
    pub fn reservation_table(&self) -> ReservationTable {
        ReservationTable::from_reservations(self.reservations.iter().cloned())
    }
}

pub struct FileSystemClusterStateIO;

impl FileSystemClusterStateIO {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for FileSystemClusterStateIO {
    fn default() -> Self {
        Self::new()
    }
}

impl ClusterStateIO for FileSystemClusterStateIO {
    fn load(&self, path: &Path) -> Result<Option<ClusterState>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path).map_err(|source| OperationError::StateRead {
            path: path.to_path_buf(),
            source,
        })?;

        let state = serde_json::from_str(&content).map_err(|source| OperationError::StateParse {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(Some(state))
    }

    fn save(&self, path: &Path, state: &ClusterState) -> Result<()> {
        let content =
            serde_json::to_string_pretty(state).map_err(|source| OperationError::StateSerialize {
                path: path.to_path_buf(),
                source,
            })?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| OperationError::StateWrite {
                path: path.to_path_buf(),
                source,
            })?;
        }

        fs::write(path, content).map_err(|source| OperationError::StateWrite {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(())
    }
}
