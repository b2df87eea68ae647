use fatechain_core::{OperationId, ResourceId};
use fatechain_step::{ChainAuditLog, ChainError, ChainStore, Executor, Outcome};
use tracing::info;

use super::steps::{DeleteNamespace, NamespaceStep};
use crate::Result;
use crate::environment::ClusterEnv;
use crate::error::OperationError;

/// Namespaces that always exist: the default namespace and the system one.
pub const PROTECTED_NAMESPACES: [&str; 2] = ["", "accumulo"];

/// How one namespace delete ended.
#[derive(Debug)]
pub struct DeleteNamespaceReport {
    pub operation: OperationId,
    pub namespace: ResourceId,
    pub result: std::result::Result<Outcome, ChainError>,
    pub audit_log: ChainAuditLog,
}

impl DeleteNamespaceReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Seeds and drives namespace delete chains.
pub struct DeleteNamespaceOperation<'a, St> {
    executor: &'a Executor<NamespaceStep, St>,
    env: &'a ClusterEnv,
}

impl<'a, St> DeleteNamespaceOperation<'a, St>
where
    St: ChainStore<NamespaceStep>,
{
    pub fn new(executor: &'a Executor<NamespaceStep, St>, env: &'a ClusterEnv) -> Self {
        Self { executor, env }
    }

    /// Store a new delete chain for `namespace` without running it.
    ///
    /// # Errors
    ///
    /// Returns [`OperationError::ProtectedNamespace`] for the default and
    /// system namespaces, or an error if the chain cannot be stored.
    pub fn seed(&self, namespace: &str) -> Result<OperationId> {
        check_deletable(namespace)?;
        let operation = self
            .executor
            .seed(DeleteNamespace::new(namespace).into())?;
        info!(%operation, namespace, "seeded namespace delete");
        Ok(operation)
    }

    /// Delete one namespace, waiting until the chain finishes.
    ///
    /// A chain that fails is reported in the returned report, not as an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace is protected or the chain cannot be
    /// stored.
    pub fn execute(&self, namespace: &str) -> Result<DeleteNamespaceReport> {
        let operation = self.seed(namespace)?;
        let (result, audit_log) = self.executor.run_with_audit(operation, self.env);
        Ok(DeleteNamespaceReport {
            operation,
            namespace: ResourceId::new(namespace),
            result,
            audit_log,
        })
    }

    /// Delete several namespaces concurrently, one chain each.
    ///
    /// Every name is checked before anything is seeded. Reports come back in
    /// the order of `namespaces`.
    ///
    /// # Errors
    ///
    /// Returns an error if any namespace is protected or a chain cannot be
    /// stored.
    pub fn execute_all<N: AsRef<str>>(
        &self,
        namespaces: &[N],
    ) -> Result<Vec<DeleteNamespaceReport>> {
        for namespace in namespaces {
            check_deletable(namespace.as_ref())?;
        }

        let operations = namespaces
            .iter()
            .map(|namespace| self.seed(namespace.as_ref()))
            .collect::<Result<Vec<_>>>()?;

        let runs = self.executor.run_all(&operations, self.env);

        Ok(namespaces
            .iter()
            .zip(runs)
            .map(|(namespace, run)| DeleteNamespaceReport {
                operation: run.operation,
                namespace: ResourceId::new(namespace.as_ref()),
                result: run.result,
                audit_log: run.audit_log,
            })
            .collect())
    }
}

fn check_deletable(namespace: &str) -> Result<()> {
    if PROTECTED_NAMESPACES.contains(&namespace) {
        return Err(OperationError::ProtectedNamespace(namespace.to_string()));
    }
    Ok(())
}
