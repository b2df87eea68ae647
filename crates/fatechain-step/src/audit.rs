use std::time::Instant;

/// Where a step ended up in one executor run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum StepStatus {
    /// Pushed onto the chain stack; also the state while `execute` runs.
    Executed,
    /// `execute` returned an error and the chain started unwinding.
    Failed,
    /// Popped off the stack by a successful `undo`.
    Undone,
    /// `undo` returned an error; the unwind carried on below it.
    UndoFailed,
}

/// Record of one step transition seen by this executor run.
#[derive(Debug)]
pub struct StepRecord {
    pub name: String,
    pub status: StepStatus,
    /// Start of `execute`, or of `undo` for a step executed in another process.
    pub started_at: Instant,
    /// `None` while `execute` is still running.
    pub completed_at: Option<Instant>,
    /// What undoing the step would reverse, taken when it executed.
    pub undo_description: Option<String>,
}

/// Audit log of the step transitions made while running one chain.
///
/// Only covers the current process; a chain resumed after a restart starts
/// with an empty log and may record undos of steps it never executed.
#[derive(Debug, Default)]
pub struct ChainAuditLog {
    records: Vec<StepRecord>,
}

impl ChainAuditLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A step at the head of the stack is about to execute.
    pub(crate) fn record_start(&mut self, name: &str) {
        self.records.push(StepRecord {
            name: name.to_string(),
            status: StepStatus::Executed,
            started_at: Instant::now(),
            completed_at: None,
            undo_description: None,
        });
    }

    /// The executing step failed; the chain is about to unwind.
    pub(crate) fn record_failure(&mut self) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Failed;
            record.completed_at = Some(Instant::now());
        }
    }

    /// The executing step succeeded and stays on the stack.
    pub(crate) fn record_success(&mut self, undo_description: String) {
        if let Some(record) = self.records.last_mut() {
            record.status = StepStatus::Executed;
            record.completed_at = Some(Instant::now());
            record.undo_description = Some(undo_description);
        }
    }

    /// The unwind popped `step_name`.
    pub(crate) fn record_undone(&mut self, step_name: &str) {
        self.record_undo(step_name, StepStatus::Undone);
    }

    /// Undoing `step_name` failed; it is popped anyway.
    pub(crate) fn record_undo_failed(&mut self, step_name: &str) {
        self.record_undo(step_name, StepStatus::UndoFailed);
    }

    // The newest executed record with this name takes the undo status; a
    // step that failed (or ran in an earlier process) gets its own entry.
    fn record_undo(&mut self, step_name: &str, status: StepStatus) {
        let now = Instant::now();
        let executed = self
            .records
            .iter_mut()
            .rev()
            .find(|record| record.name == step_name && record.status == StepStatus::Executed);

        if let Some(record) = executed {
            record.status = status;
            record.completed_at = Some(now);
        } else {
            self.records.push(StepRecord {
                name: step_name.to_string(),
                status,
                started_at: now,
                completed_at: Some(now),
                undo_description: None,
            });
        }
    }

    /// Transitions in the order they happened: executions first, then undos
    /// newest-first when the chain unwound.
    #[must_use]
    pub fn records(&self) -> &[StepRecord] {
        &self.records
    }

    /// One line per step: `✓` executed, `✗` failed, `↩` undone, `⚠` undo failed.
    #[must_use]
    pub fn summary(&self) -> String {
        let mut lines = Vec::new();
        for record in &self.records {
            let status = match record.status {
                StepStatus::Executed => "✓",
                StepStatus::Failed => "✗",
                StepStatus::Undone => "↩",
                StepStatus::UndoFailed => "⚠",
            };
            lines.push(format!("{status} {}", record.name));
        }
        lines.join("\n")
    }
}
