#![allow(dead_code)]

use std::sync::Arc;

use fatechain_core::ResourceId;
use fatechain_ops::config::OperationConfig;
use fatechain_ops::environment::ClusterEnv;
use fatechain_ops::events::EventNotifier;
use fatechain_ops::providers::{InMemoryCatalog, RecordingEventSink};
use fatechain_ops::traits::NamespaceCatalog;
use fatechain_reserve::ReservationTable;

pub struct Cluster {
    pub catalog: Arc<InMemoryCatalog>,
    pub reservations: Arc<ReservationTable>,
    pub events: Arc<RecordingEventSink>,
    pub env: ClusterEnv,
}

impl Cluster {
    pub fn new(namespaces: &[&str], config: OperationConfig) -> Self {
        let catalog = Arc::new(InMemoryCatalog::new());
        for namespace in namespaces {
            catalog
                .create_namespace(&ResourceId::new(*namespace))
                .expect("create namespace");
        }
        Self::with_catalog(catalog, Arc::new(ReservationTable::new()), config)
    }

    pub fn with_catalog(
        catalog: Arc<InMemoryCatalog>,
        reservations: Arc<ReservationTable>,
        config: OperationConfig,
    ) -> Self {
        let events = Arc::new(RecordingEventSink::new());
        let env = ClusterEnv::new(
            catalog.clone(),
            reservations.clone(),
            EventNotifier::new(events.clone()),
            config,
        );
        Self {
            catalog,
            reservations,
            events,
            env,
        }
    }

    pub fn has_namespace(&self, name: &str) -> bool {
        self.catalog
            .namespace_exists(&ResourceId::new(name))
            .expect("namespace lookup")
    }
}

pub fn fast_config() -> OperationConfig {
    OperationConfig::default().with_retry_hint_ms(5)
}
