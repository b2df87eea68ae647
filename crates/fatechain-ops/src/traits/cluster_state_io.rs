use std::path::Path;

use crate::Result;
use crate::providers::ClusterState;

/// Reads and writes the cluster state file.
pub trait ClusterStateIO: Send + Sync {
    /// Returns `Ok(None)` if the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    fn load(&self, path: &Path) -> Result<Option<ClusterState>>;

    /// # Errors
    ///
    /// Returns an error if the state cannot be serialized or written.
    fn save(&self, path: &Path, state: &ClusterState) -> Result<()>;
}
