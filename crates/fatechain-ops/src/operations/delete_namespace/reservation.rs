use fatechain_core::{LockMode, OperationId, ResourceId};
use fatechain_reserve::ReservationError;
use fatechain_step::{StepError, WaitHint};
use tracing::{debug, trace};

use crate::environment::ClusterEnv;

/// Hold `namespace` exclusively and the namespace registry shared, for `op`.
///
/// Either both holds are taken or neither is left behind: when the second
/// hold is busy the first one is released again before returning, so a
/// waiting operation never sits on half of what it needs.
pub(super) fn reserve_namespace(
    env: &ClusterEnv,
    namespace: &ResourceId,
    op: OperationId,
) -> Result<WaitHint, StepError> {
    let reservations = env.reservations();
    let registry = ResourceId::namespace_registry();
    let wait = env.config().wait_on_busy;
    let retry = WaitHint::from_millis(env.config().retry_hint_ms);

    let namespace_held = reservations
        .reserve(namespace, op, LockMode::Exclusive, wait)
        .map_err(reservation_failure)?;
    if !namespace_held {
        trace!(operation = %op, %namespace, "namespace busy");
        return Ok(retry);
    }

    let registry_held = match reservations.reserve(&registry, op, LockMode::Shared, wait) {
        Ok(held) => held,
        Err(err) => {
            unreserve_namespace(env, namespace, op)?;
            return Err(reservation_failure(err));
        }
    };
    if !registry_held {
        trace!(operation = %op, %namespace, "namespace registry busy");
        unreserve_namespace(env, namespace, op)?;
        return Ok(retry);
    }

    let exists = env
        .catalog()
        .namespace_exists(namespace)
        .map_err(|e| StepError::failed(format!("look up namespace '{namespace}'"), e))?;
    if !exists {
        debug!(operation = %op, %namespace, "namespace already gone");
        unreserve_namespace(env, namespace, op)?;
        return Err(StepError::ResourceAbsent(namespace.clone()));
    }

    Ok(WaitHint::READY)
}

/// Release both holds taken by [`reserve_namespace`]. Safe to call when
/// neither is held.
pub(super) fn unreserve_namespace(
    env: &ClusterEnv,
    namespace: &ResourceId,
    op: OperationId,
) -> Result<(), StepError> {
    let reservations = env.reservations();
    let registry = ResourceId::namespace_registry();

    let namespace_released = reservations.unreserve(namespace, op, LockMode::Exclusive);
    let registry_released = reservations.unreserve(&registry, op, LockMode::Shared);

    namespace_released
        .and(registry_released)
        .map_err(|e| StepError::failed(format!("release reservations on '{namespace}'"), e))
}

fn reservation_failure(err: ReservationError) -> StepError {
    match err {
        ReservationError::Conflict {
            resource, holder, ..
        } => StepError::ReservationConflict { resource, holder },
        other => StepError::failed("reservation table unavailable", other),
    }
}
