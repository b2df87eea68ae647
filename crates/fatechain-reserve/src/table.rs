use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Mutex, MutexGuard};

use fatechain_core::{LockMode, OperationId, ResourceId};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::ReservationError;
use crate::provider::ReservationProvider;

/// A single hold on a resource.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Reservation {
    pub resource: ResourceId,
    pub operation: OperationId,
    pub mode: LockMode,
}

#[derive(Debug, Default)]
struct Holds {
    exclusive: Option<OperationId>,
    shared: BTreeSet<OperationId>,
}

impl Holds {
    fn is_empty(&self) -> bool {
        self.exclusive.is_none() && self.shared.is_empty()
    }

    /// Some other operation whose hold is incompatible with `mode` for `operation`.
    fn blocker(&self, operation: OperationId, mode: LockMode) -> Option<OperationId> {
        if let Some(holder) = self.exclusive.filter(|holder| *holder != operation) {
            return Some(holder);
        }
        match mode {
            LockMode::Shared => None,
            LockMode::Exclusive => self.shared.iter().copied().find(|op| *op != operation),
        }
    }

    fn holds(&self, operation: OperationId, mode: LockMode) -> bool {
        match mode {
            LockMode::Exclusive => self.exclusive == Some(operation),
            LockMode::Shared => self.shared.contains(&operation),
        }
    }

    fn grant(&mut self, operation: OperationId, mode: LockMode) {
        match mode {
            LockMode::Exclusive => self.exclusive = Some(operation),
            LockMode::Shared => {
                self.shared.insert(operation);
            }
        }
    }

    fn release(&mut self, operation: OperationId, mode: LockMode) -> bool {
        match mode {
            LockMode::Exclusive if self.exclusive == Some(operation) => {
                self.exclusive = None;
                true
            }
            LockMode::Exclusive => false,
            LockMode::Shared => self.shared.remove(&operation),
        }
    }

    fn reservations<'a>(
        &'a self,
        resource: &'a ResourceId,
    ) -> impl Iterator<Item = Reservation> + 'a {
        let exclusive = self.exclusive.map(|operation| Reservation {
            resource: resource.clone(),
            operation,
            mode: LockMode::Exclusive,
        });
        let shared = self.shared.iter().map(move |operation| Reservation {
            resource: resource.clone(),
            operation: *operation,
            mode: LockMode::Shared,
        });
        exclusive.into_iter().chain(shared)
    }
}

/// In-process reservation table.
///
/// All state sits behind one mutex; every call is short and never blocks on
/// anything else while holding it.
#[derive(Debug, Default)]
pub struct ReservationTable {
    entries: Mutex<BTreeMap<ResourceId, Holds>>,
}

impl ReservationTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a table from a previously taken [`snapshot`](Self::snapshot).
    ///
    /// Holds are restored as recorded, without compatibility checks.
    #[must_use]
    pub fn from_reservations(reservations: impl IntoIterator<Item = Reservation>) -> Self {
        let mut entries: BTreeMap<ResourceId, Holds> = BTreeMap::new();
        for reservation in reservations {
            entries
                .entry(reservation.resource)
                .or_default()
                .grant(reservation.operation, reservation.mode);
        }
        Self {
            entries: Mutex::new(entries),
        }
    }

    /// Every hold in the table, ordered by resource.
    ///
    /// # Errors
    ///
    /// Returns [`ReservationError::Poisoned`] if a holder panicked mid-update.
    pub fn snapshot(&self) -> Result<Vec<Reservation>, ReservationError> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .flat_map(|(resource, holds)| holds.reservations(resource))
            .collect())
    }

    fn lock(&self) -> Result<MutexGuard<'_, BTreeMap<ResourceId, Holds>>, ReservationError> {
        self.entries.lock().map_err(|_| ReservationError::Poisoned)
    }
}

impl ReservationProvider for ReservationTable {
    fn reserve(
        &self,
        resource: &ResourceId,
        operation: OperationId,
        mode: LockMode,
        wait: bool,
    ) -> Result<bool, ReservationError> {
        let mut entries = self.lock()?;
        let holds = entries.entry(resource.clone()).or_default();

        if holds.holds(operation, mode) {
            trace!(%resource, %operation, %mode, "reservation already held");
            return Ok(true);
        }

        if let Some(holder) = holds.blocker(operation, mode) {
            if holds.is_empty() {
                entries.remove(resource);
            }
            debug!(%resource, %operation, %mode, %holder, "reservation busy");
            if wait {
                return Ok(false);
            }
            return Err(ReservationError::Conflict {
                resource: resource.clone(),
                requested: mode,
                holder,
            });
        }

        holds.grant(operation, mode);
        debug!(%resource, %operation, %mode, "reserved");
        Ok(true)
    }

    fn unreserve(
        &self,
        resource: &ResourceId,
        operation: OperationId,
        mode: LockMode,
    ) -> Result<(), ReservationError> {
        let mut entries = self.lock()?;
        let Some(holds) = entries.get_mut(resource) else {
            return Ok(());
        };

        if holds.release(operation, mode) {
            debug!(%resource, %operation, %mode, "unreserved");
        }
        if holds.is_empty() {
            entries.remove(resource);
        }
        Ok(())
    }

    fn holders(&self, resource: &ResourceId) -> Result<Vec<Reservation>, ReservationError> {
        let entries = self.lock()?;
        Ok(entries
            .get(resource)
            .map(|holds| holds.reservations(resource).collect())
            .unwrap_or_default())
    }

    fn held_by(&self, operation: OperationId) -> Result<Vec<Reservation>, ReservationError> {
        let entries = self.lock()?;
        Ok(entries
            .iter()
            .flat_map(|(resource, holds)| holds.reservations(resource))
            .filter(|reservation| reservation.operation == operation)
            .collect())
    }
}
