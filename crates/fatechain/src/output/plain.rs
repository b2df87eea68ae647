use std::error::Error as StdError;

use fatechain_core::ResourceId;
use fatechain_ops::operations::{DeleteNamespaceReport, NamespaceStep};
use fatechain_ops::providers::ClusterState;
use fatechain_reserve::Reservation;
use fatechain_step::{ChainAuditLog, ChainRecord, ChainRun, ChainStatus, Outcome, Step};

use super::OutputFormatter;

pub(crate) struct PlainTextFormatter;

impl PlainTextFormatter {
    fn namespace_label(namespace: &ResourceId) -> &str {
        if namespace.as_str().is_empty() {
            "(default)"
        } else {
            namespace.as_str()
        }
    }

    fn status_label(status: ChainStatus) -> &'static str {
        match status {
            ChainStatus::New => "new",
            ChainStatus::InProgress => "in_progress",
            ChainStatus::FailedInProgress => "failed_in_progress",
            ChainStatus::Failed => "failed",
            ChainStatus::Successful => "successful",
        }
    }

    fn format_error_chain(output: &mut String, error: &dyn StdError) {
        let mut source = error.source();
        while let Some(cause) = source {
            output.push_str(&format!("  caused by: {cause}\n"));
            source = cause.source();
        }
    }

    fn format_audit(output: &mut String, audit_log: &ChainAuditLog) {
        let summary = audit_log.summary();
        if !summary.is_empty() {
            for line in summary.lines() {
                output.push_str(&format!("  {line}\n"));
            }
        }
    }
}

impl OutputFormatter for PlainTextFormatter {
    fn format_delete(&self, report: &DeleteNamespaceReport) -> String {
        let namespace = Self::namespace_label(&report.namespace);
        let mut output = String::new();
        match &report.result {
            Ok(Outcome::Completed) => {
                output.push_str(&format!(
                    "deleted namespace {namespace} ({})\n",
                    report.operation
                ));
            }
            Ok(Outcome::Absent(_)) => {
                output.push_str(&format!(
                    "namespace {namespace} does not exist, nothing deleted ({})\n",
                    report.operation
                ));
            }
            Err(error) => {
                output.push_str(&format!(
                    "failed to delete namespace {namespace} ({}): {error}\n",
                    report.operation
                ));
                Self::format_error_chain(&mut output, error);
                Self::format_audit(&mut output, &report.audit_log);
            }
        }
        output
    }

    fn format_run(&self, run: &ChainRun) -> String {
        let mut output = String::new();
        match &run.result {
            Ok(Outcome::Completed) => {
                output.push_str(&format!("{}: completed\n", run.operation));
            }
            Ok(Outcome::Absent(resource)) => {
                output.push_str(&format!(
                    "{}: {} was already gone\n",
                    run.operation,
                    Self::namespace_label(resource)
                ));
            }
            Err(error) => {
                output.push_str(&format!("{}: failed: {error}\n", run.operation));
                Self::format_error_chain(&mut output, error);
                Self::format_audit(&mut output, &run.audit_log);
            }
        }
        output
    }

    fn format_catalog(&self, state: &ClusterState) -> String {
        if state.namespaces.is_empty() {
            return "no namespaces\n".to_string();
        }

        let mut output = String::new();
        for namespace in &state.namespaces {
            output.push_str(&format!("{}\n", Self::namespace_label(namespace)));
            for table in state.tables.iter().filter(|t| &t.namespace == namespace) {
                output.push_str(&format!("  table {}\n", table.name));
            }
            for permission in state.permissions.iter().filter(|p| &p.namespace == namespace) {
                output.push_str(&format!("  grant {}\n", permission.user));
            }
        }
        output
    }

    fn format_reservations(&self, reservations: &[Reservation]) -> String {
        if reservations.is_empty() {
            return "no reservations held\n".to_string();
        }

        let mut output = String::new();
        for reservation in reservations {
            output.push_str(&format!(
                "{:<20} {:<9} {}\n",
                reservation.resource.as_str(),
                reservation.mode.to_string(),
                reservation.operation
            ));
        }
        output
    }

    fn format_chains(&self, records: &[ChainRecord<NamespaceStep>]) -> String {
        if records.is_empty() {
            return "no chains stored\n".to_string();
        }

        let mut output = String::new();
        for record in records {
            let detail = match (&record.outcome, record.stack.last()) {
                (Some(Outcome::Completed), _) => "completed".to_string(),
                (Some(Outcome::Absent(resource)), _) => {
                    format!("absent {}", Self::namespace_label(resource))
                }
                (None, Some(head)) => format!("head {}", head.name()),
                (None, None) => match &record.failure {
                    Some(failure) => format!("{} failed: {}", failure.step, failure.message),
                    None => String::new(),
                },
            };
            output.push_str(&format!(
                "{}  {:<18} {detail}\n",
                record.id,
                Self::status_label(record.status)
            ));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use fatechain_core::{LockMode, OperationId};
    use fatechain_ops::operations::DeleteNamespace;
    use fatechain_ops::providers::{PermissionEntry, TableEntry};
    use fatechain_step::{ChainError, StepError};

    use super::*;

    fn report(result: Result<Outcome, ChainError>) -> DeleteNamespaceReport {
        DeleteNamespaceReport {
            operation: OperationId::new(1),
            namespace: ResourceId::new("ns1"),
            result,
            audit_log: ChainAuditLog::new(),
        }
    }

    #[test]
    fn completed_delete_names_operation() {
        let output = PlainTextFormatter.format_delete(&report(Ok(Outcome::Completed)));

        assert_eq!(output, "deleted namespace ns1 (op-0000000000000001)\n");
    }

    #[test]
    fn absent_delete_says_nothing_was_deleted() {
        let output = PlainTextFormatter.format_delete(&report(Ok(Outcome::Absent(
            ResourceId::new("ns1"),
        ))));

        assert!(output.contains("does not exist"));
    }

    #[test]
    fn failed_delete_lists_causes() {
        let error = ChainError::StepFailed {
            operation: OperationId::new(1),
            step: "namespace_cleanup".to_string(),
            source: StepError::message("catalog offline"),
        };

        let output = PlainTextFormatter.format_delete(&report(Err(error)));

        assert!(output.starts_with("failed to delete namespace ns1"));
        assert!(output.contains("caused by: catalog offline"));
    }

    #[test]
    fn catalog_groups_tables_and_grants_by_namespace() {
        let state = ClusterState {
            namespaces: vec![ResourceId::new(""), ResourceId::new("ns1")],
            tables: vec![TableEntry {
                namespace: ResourceId::new("ns1"),
                name: "t1".to_string(),
            }],
            permissions: vec![PermissionEntry {
                namespace: ResourceId::new("ns1"),
                user: "alice".to_string(),
            }],
            reservations: Vec::new(),
        };

        let output = PlainTextFormatter.format_catalog(&state);

        assert_eq!(output, "(default)\nns1\n  table t1\n  grant alice\n");
    }

    #[test]
    fn empty_outputs_say_so() {
        assert_eq!(
            PlainTextFormatter.format_catalog(&ClusterState::default()),
            "no namespaces\n"
        );
        assert_eq!(
            PlainTextFormatter.format_reservations(&[]),
            "no reservations held\n"
        );
        assert_eq!(PlainTextFormatter.format_chains(&[]), "no chains stored\n");
    }

    #[test]
    fn reservations_show_mode_and_holder() {
        let output = PlainTextFormatter.format_reservations(&[Reservation {
            resource: ResourceId::new("ns1"),
            operation: OperationId::new(2),
            mode: LockMode::Exclusive,
        }]);

        assert!(output.contains("ns1"));
        assert!(output.contains("exclusive"));
        assert!(output.contains("op-0000000000000002"));
    }

    #[test]
    fn unfinished_chain_shows_head_step() {
        let record = ChainRecord::new(
            OperationId::new(3),
            NamespaceStep::from(DeleteNamespace::new("ns1")),
        );

        let output = PlainTextFormatter.format_chains(&[record]);

        assert!(output.contains("op-0000000000000003"));
        assert!(output.contains("new"));
        assert!(output.contains("head delete_namespace"));
    }
}
