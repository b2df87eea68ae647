use fatechain_core::{OperationId, ResourceId};
use fatechain_step::{Next, Step, StepError, WaitHint};
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::reservation::{reserve_namespace, unreserve_namespace};
use crate::environment::ClusterEnv;

/// First step of a namespace delete: reserve, announce, hand over to cleanup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteNamespace {
    namespace: ResourceId,
}

impl DeleteNamespace {
    #[must_use]
    pub fn new(namespace: impl Into<ResourceId>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &ResourceId {
        &self.namespace
    }
}

impl Step for DeleteNamespace {
    type Env = ClusterEnv;
    type Chain = NamespaceStep;

    fn name(&self) -> &'static str {
        "delete_namespace"
    }

    fn is_ready(&self, op: OperationId, env: &ClusterEnv) -> Result<WaitHint, StepError> {
        reserve_namespace(env, &self.namespace, op)
    }

    fn execute(
        &self,
        _op: OperationId,
        env: &ClusterEnv,
    ) -> Result<Next<NamespaceStep>, StepError> {
        env.notifier()
            .event(format_args!("deleting namespace {}", self.namespace));
        Ok(Next::Step(NamespaceCleanUp::new(self.namespace.clone()).into()))
    }

    fn undo(&self, op: OperationId, env: &ClusterEnv) -> Result<(), StepError> {
        unreserve_namespace(env, &self.namespace, op)
    }

    fn undo_description(&self) -> String {
        format!("release reservations on namespace '{}'", self.namespace)
    }
}

/// Removes everything under a namespace, then the namespace itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceCleanUp {
    namespace: ResourceId,
}

impl NamespaceCleanUp {
    #[must_use]
    pub fn new(namespace: impl Into<ResourceId>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    #[must_use]
    pub fn namespace(&self) -> &ResourceId {
        &self.namespace
    }
}

impl Step for NamespaceCleanUp {
    type Env = ClusterEnv;
    type Chain = NamespaceStep;

    fn name(&self) -> &'static str {
        "namespace_cleanup"
    }

    // Holds survive from DeleteNamespace; after a restart they are taken again.
    fn is_ready(&self, op: OperationId, env: &ClusterEnv) -> Result<WaitHint, StepError> {
        reserve_namespace(env, &self.namespace, op)
    }

    fn execute(
        &self,
        op: OperationId,
        env: &ClusterEnv,
    ) -> Result<Next<NamespaceStep>, StepError> {
        let catalog = env.catalog();
        let namespace = &self.namespace;

        let tables = catalog
            .tables(namespace)
            .map_err(|e| StepError::failed(format!("list tables in '{namespace}'"), e))?;
        for table in &tables {
            let removed = catalog.remove_table(namespace, table).map_err(|e| {
                StepError::failed(format!("remove table '{namespace}.{table}'"), e)
            })?;
            debug!(operation = %op, %namespace, %table, removed, "removed table");
        }

        let revoked = catalog
            .revoke_all(namespace)
            .map_err(|e| StepError::failed(format!("revoke grants on '{namespace}'"), e))?;

        catalog
            .remove_namespace(namespace)
            .map_err(|e| StepError::failed(format!("remove namespace '{namespace}'"), e))?;

        unreserve_namespace(env, namespace, op)?;

        debug!(
            operation = %op,
            %namespace,
            tables = tables.len(),
            revoked,
            "deleted namespace"
        );
        Ok(Next::Done)
    }
}

/// The steps a namespace delete chain can hold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum NamespaceStep {
    DeleteNamespace(DeleteNamespace),
    CleanUp(NamespaceCleanUp),
}

impl From<DeleteNamespace> for NamespaceStep {
    fn from(step: DeleteNamespace) -> Self {
        Self::DeleteNamespace(step)
    }
}

impl From<NamespaceCleanUp> for NamespaceStep {
    fn from(step: NamespaceCleanUp) -> Self {
        Self::CleanUp(step)
    }
}

impl NamespaceStep {
    fn inner(&self) -> &dyn Step<Env = ClusterEnv, Chain = NamespaceStep> {
        match self {
            Self::DeleteNamespace(step) => step,
            Self::CleanUp(step) => step,
        }
    }
}

impl Step for NamespaceStep {
    type Env = ClusterEnv;
    type Chain = Self;

    fn name(&self) -> &'static str {
        self.inner().name()
    }

    fn is_ready(&self, op: OperationId, env: &ClusterEnv) -> Result<WaitHint, StepError> {
        self.inner().is_ready(op, env)
    }

    fn execute(&self, op: OperationId, env: &ClusterEnv) -> Result<Next<Self>, StepError> {
        self.inner().execute(op, env)
    }

    fn undo(&self, op: OperationId, env: &ClusterEnv) -> Result<(), StepError> {
        self.inner().undo(op, env)
    }

    fn undo_description(&self) -> String {
        self.inner().undo_description()
    }
}
