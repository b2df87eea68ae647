use tracing::debug;

use crate::error::{CliError, Result};
use crate::output::{OutputFormatter, PlainTextFormatter};
use crate::session::Session;

pub(super) fn list(session: &Session, prune: bool) -> Result<()> {
    let executor = session.executor();
    let records = executor.records()?;
    print!("{}", PlainTextFormatter.format_chains(&records));

    if prune {
        let mut pruned = 0usize;
        for record in records.iter().filter(|r| r.status.is_terminal()) {
            executor.forget(record.id)?;
            pruned += 1;
        }
        debug!(pruned, "pruned finished chains");
        println!("pruned {pruned} finished chain(s)");
    }
    Ok(())
}

pub(super) fn resume(session: &Session) -> Result<()> {
    let runs = session.executor().resume(session.env())?;
    session.save()?;

    if runs.is_empty() {
        println!("nothing to resume");
        return Ok(());
    }

    let formatter = PlainTextFormatter;
    let mut failed = 0;
    for run in &runs {
        let text = formatter.format_run(run);
        if run.result.is_ok() {
            print!("{text}");
        } else {
            failed += 1;
            eprint!("{text}");
        }
    }

    if failed > 0 {
        return Err(CliError::ResumeFailed(failed));
    }
    Ok(())
}
