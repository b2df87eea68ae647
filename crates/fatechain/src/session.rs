use std::path::{Path, PathBuf};
use std::sync::Arc;

use fatechain_ops::config::OperationConfig;
use fatechain_ops::environment::ClusterEnv;
use fatechain_ops::events::EventNotifier;
use fatechain_ops::operations::NamespaceStep;
use fatechain_ops::providers::{
    ClusterState, FileSystemClusterStateIO, InMemoryCatalog, TracingEventSink,
};
use fatechain_ops::traits::{ClusterStateIO, EventSink};
use fatechain_reserve::ReservationTable;
use fatechain_step::{Executor, FileChainStore};
use tracing::debug;

use crate::config::{EventOutput, FatechainConfig};
use crate::error::Result;
use crate::output::ConsoleEventSink;

pub(crate) type NamespaceExecutor = Executor<NamespaceStep, FileChainStore<NamespaceStep>>;

/// One CLI invocation's view of the cluster: catalog and reservations loaded
/// from the state file, plus an executor over the chain directory.
pub(crate) struct Session {
    state_path: PathBuf,
    state_io: FileSystemClusterStateIO,
    catalog: Arc<InMemoryCatalog>,
    reservations: Arc<ReservationTable>,
    executor: NamespaceExecutor,
    env: ClusterEnv,
}

impl Session {
    pub(crate) fn open(state_path: &Path, store_dir: &Path, config: Option<&Path>) -> Result<Self> {
        let config = FatechainConfig::load(config)?;
        let state_io = FileSystemClusterStateIO::new();
        let state = state_io.load(state_path)?.unwrap_or_default();
        debug!(
            path = %state_path.display(),
            namespaces = state.namespaces.len(),
            reservations = state.reservations.len(),
            "loaded cluster state"
        );

        let catalog = Arc::new(state.catalog());
        let reservations = Arc::new(state.reservation_table());
        let executor = Executor::new(FileChainStore::open(store_dir)?, config.executor);
        let sink: Arc<dyn EventSink> = match config.events {
            EventOutput::Console => Arc::new(ConsoleEventSink),
            EventOutput::Log => Arc::new(TracingEventSink),
        };
        let env = cluster_env(&catalog, &reservations, sink, config.operations);

        Ok(Self {
            state_path: state_path.to_path_buf(),
            state_io,
            catalog,
            reservations,
            executor,
            env,
        })
    }

    /// Write the catalog and held reservations back to the state file.
    pub(crate) fn save(&self) -> Result<()> {
        let state = ClusterState::capture(&self.catalog, &self.reservations)?;
        self.state_io.save(&self.state_path, &state)?;
        debug!(path = %self.state_path.display(), "saved cluster state");
        Ok(())
    }

    pub(crate) fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub(crate) fn reservations(&self) -> &ReservationTable {
        &self.reservations
    }

    pub(crate) fn executor(&self) -> &NamespaceExecutor {
        &self.executor
    }

    pub(crate) fn env(&self) -> &ClusterEnv {
        &self.env
    }
}

fn cluster_env(
    catalog: &Arc<InMemoryCatalog>,
    reservations: &Arc<ReservationTable>,
    sink: Arc<dyn EventSink>,
    config: OperationConfig,
) -> ClusterEnv {
    ClusterEnv::new(
        catalog.clone(),
        reservations.clone(),
        EventNotifier::new(sink),
        config,
    )
}
