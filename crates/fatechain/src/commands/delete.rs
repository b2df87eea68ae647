use fatechain_ops::operations::DeleteNamespaceOperation;
use tracing::info;

use crate::error::{CliError, Result};
use crate::output::{OutputFormatter, PlainTextFormatter};
use crate::session::Session;

pub(super) fn run(session: &Session, namespaces: &[String]) -> Result<()> {
    let operation = DeleteNamespaceOperation::new(session.executor(), session.env());
    let reports = operation.execute_all(namespaces)?;
    session.save()?;

    let formatter = PlainTextFormatter;
    let mut failed = 0;
    for report in &reports {
        let text = formatter.format_delete(report);
        if report.is_success() {
            print!("{text}");
        } else {
            failed += 1;
            eprint!("{text}");
        }
    }
    info!(total = reports.len(), failed, "namespace delete finished");

    if failed > 0 {
        return Err(CliError::DeleteFailed {
            failed,
            total: reports.len(),
        });
    }
    Ok(())
}
