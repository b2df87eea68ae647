use std::sync::Arc;

use fatechain_reserve::ReservationProvider;

use crate::config::OperationConfig;
use crate::events::EventNotifier;
use crate::traits::NamespaceCatalog;

/// Everything a namespace step needs, handed to every step call.
///
/// Steps hold no references of their own so they can be persisted and
/// replayed against a fresh environment after a restart.
pub struct ClusterEnv {
    catalog: Arc<dyn NamespaceCatalog>,
    reservations: Arc<dyn ReservationProvider>,
    notifier: EventNotifier,
    config: OperationConfig,
}

impl Clone for ClusterEnv {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            reservations: Arc::clone(&self.reservations),
            notifier: self.notifier.clone(),
            config: self.config,
        }
    }
}

impl ClusterEnv {
    pub fn new(
        catalog: Arc<dyn NamespaceCatalog>,
        reservations: Arc<dyn ReservationProvider>,
        notifier: EventNotifier,
        config: OperationConfig,
    ) -> Self {
        Self {
            catalog,
            reservations,
            notifier,
            config,
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &dyn NamespaceCatalog {
        self.catalog.as_ref()
    }

    #[must_use]
    pub fn reservations(&self) -> &dyn ReservationProvider {
        self.reservations.as_ref()
    }

    #[must_use]
    pub fn notifier(&self) -> &EventNotifier {
        &self.notifier
    }

    #[must_use]
    pub fn config(&self) -> &OperationConfig {
        &self.config
    }
}
