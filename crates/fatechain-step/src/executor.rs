use std::marker::PhantomData;
use std::thread;
use std::time::Duration;

use fatechain_core::{OperationId, ResourceId};
use tracing::{debug, error, info, trace, warn};

use crate::audit::ChainAuditLog;
use crate::config::ExecutorConfig;
use crate::error::{ChainError, StepError, UndoError};
use crate::record::{
    ChainRecord, ChainStatus, FailureRecord, Outcome, UndoFailureRecord, chain_error,
};
use crate::step::{Next, Step, WaitHint};
use crate::store::{ChainStore, StoreError};

/// Result of a single scheduling round for one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Poll {
    /// The head step is not ready; poll again after this delay.
    Waiting(Duration),
    /// The head step executed and its successor was recorded.
    Progressed,
    /// The chain finished successfully.
    Finished(Outcome),
}

/// Result of driving one chain to a terminal state.
#[derive(Debug)]
pub struct ChainRun {
    pub operation: OperationId,
    pub result: Result<Outcome, ChainError>,
    pub audit_log: ChainAuditLog,
}

/// Drives step chains stored in a [`ChainStore`].
///
/// Each call to [`poll`](Self::poll) makes at most one transition and saves
/// the record before returning, so the stored state never runs ahead of what
/// has actually happened. A chain's steps therefore run strictly one after
/// another; separate chains may be driven from separate threads.
pub struct Executor<S, St> {
    store: St,
    config: ExecutorConfig,
    _marker: PhantomData<fn() -> S>,
}

impl<S, St> Executor<S, St>
where
    S: Step<Chain = S>,
    St: ChainStore<S>,
{
    #[must_use]
    pub fn new(store: St, config: ExecutorConfig) -> Self {
        Self {
            store,
            config,
            _marker: PhantomData,
        }
    }

    #[must_use]
    pub fn store(&self) -> &St {
        &self.store
    }

    #[must_use]
    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// Store a new chain whose first step is `first`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Store`] if the chain cannot be stored.
    pub fn seed(&self, first: S) -> Result<OperationId, ChainError> {
        let step = first.name();
        let id = self.store.create(first)?;
        info!(operation = %id, step, "seeded chain");
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`ChainError::Store`] for an unknown id or a storage failure.
    pub fn record(&self, id: OperationId) -> Result<ChainRecord<S>, ChainError> {
        Ok(self.store.load(id)?)
    }

    /// # Errors
    ///
    /// Returns [`ChainError::Store`] for an unknown id or a storage failure.
    pub fn status(&self, id: OperationId) -> Result<ChainStatus, ChainError> {
        Ok(self.store.load(id)?.status)
    }

    /// Every stored chain, ascending by id.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Store`] if the store cannot be read.
    pub fn records(&self) -> Result<Vec<ChainRecord<S>>, ChainError> {
        let mut records = Vec::new();
        for id in self.store.list()? {
            records.push(self.store.load(id)?);
        }
        Ok(records)
    }

    /// Make at most one transition on chain `id`.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::StepFailed`] or [`ChainError::UndoFailed`] once a
    /// failed chain has been unwound (also for chains that failed earlier),
    /// or [`ChainError::Store`] if the record cannot be read or saved.
    pub fn poll(&self, id: OperationId, env: &S::Env) -> Result<Poll, ChainError> {
        self.poll_with(id, env, &mut ChainAuditLog::new())
    }

    /// Drive chain `id` to a terminal state, sleeping between not-ready polls.
    ///
    /// # Errors
    ///
    /// See [`poll`](Self::poll).
    pub fn run(&self, id: OperationId, env: &S::Env) -> Result<Outcome, ChainError> {
        let (result, _audit_log) = self.run_with_audit(id, env);
        result
    }

    /// Drive chain `id` to a terminal state and return the audit log too.
    pub fn run_with_audit(
        &self,
        id: OperationId,
        env: &S::Env,
    ) -> (Result<Outcome, ChainError>, ChainAuditLog) {
        let mut audit_log = ChainAuditLog::new();
        let result = loop {
            match self.poll_with(id, env, &mut audit_log) {
                Ok(Poll::Progressed) => {}
                Ok(Poll::Waiting(delay)) => thread::sleep(delay),
                Ok(Poll::Finished(outcome)) => break Ok(outcome),
                Err(err) => break Err(err),
            }
        };
        (result, audit_log)
    }

    /// Drive several chains concurrently, one thread per chain.
    ///
    /// Runs come back in the order of `ids`.
    pub fn run_all(&self, ids: &[OperationId], env: &S::Env) -> Vec<ChainRun>
    where
        S::Env: Sync,
    {
        thread::scope(|scope| {
            let handles: Vec<_> = ids
                .iter()
                .map(|&id| (id, scope.spawn(move || self.run_with_audit(id, env))))
                .collect();

            handles
                .into_iter()
                .map(|(operation, handle)| {
                    let (result, audit_log) = handle.join().unwrap_or_else(|_| {
                        error!(%operation, "executor thread panicked");
                        (Err(ChainError::Panicked(operation)), ChainAuditLog::new())
                    });
                    ChainRun {
                        operation,
                        result,
                        audit_log,
                    }
                })
                .collect()
        })
    }

    /// Drive every stored chain that has not reached a terminal state.
    ///
    /// Used after a restart: chains stopped mid-way continue from their
    /// stored head, and interrupted unwinds finish undoing.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Store`] if the store cannot be enumerated.
    pub fn resume(&self, env: &S::Env) -> Result<Vec<ChainRun>, ChainError>
    where
        S::Env: Sync,
    {
        let mut pending = Vec::new();
        for id in self.store.list()? {
            if !self.store.load(id)?.status.is_terminal() {
                pending.push(id);
            }
        }

        if pending.is_empty() {
            debug!("no chains to resume");
        } else {
            info!(count = pending.len(), "resuming chains");
        }
        Ok(self.run_all(&pending, env))
    }

    /// Remove a finished chain from the store.
    ///
    /// # Errors
    ///
    /// Returns [`ChainError::Active`] if the chain has not finished, or
    /// [`ChainError::Store`] on a storage failure.
    pub fn forget(&self, id: OperationId) -> Result<(), ChainError> {
        let record = self.store.load(id)?;
        if !record.status.is_terminal() {
            return Err(ChainError::Active(id));
        }
        self.store.remove(id)?;
        debug!(operation = %id, "forgot chain");
        Ok(())
    }

    fn poll_with(
        &self,
        id: OperationId,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
    ) -> Result<Poll, ChainError> {
        let mut record = self.store.load(id)?;
        match record.status {
            ChainStatus::Successful => {
                let outcome = record.outcome.clone().unwrap_or(Outcome::Completed);
                return Ok(Poll::Finished(outcome));
            }
            ChainStatus::Failed => return Err(record.recorded_error()),
            ChainStatus::FailedInProgress => {
                warn!(operation = %id, depth = record.stack.len(), "resuming interrupted unwind");
                return Err(self.unwind(&mut record, env, audit_log, None));
            }
            ChainStatus::New | ChainStatus::InProgress => {}
        }

        let Some(head) = record.stack.last() else {
            return self.complete(&mut record, Outcome::Completed);
        };
        let step = head.name();

        let hint = match head.is_ready(id, env) {
            Ok(hint) => hint,
            Err(StepError::ResourceAbsent(resource)) => {
                return self.absent(&mut record, resource, env, audit_log);
            }
            Err(err @ StepError::ReservationConflict { .. }) => {
                match self.config.on_conflict.retry_hint() {
                    Some(hint) => {
                        debug!(operation = %id, step, error = %err, "reservation conflict, will retry");
                        hint
                    }
                    None => return Err(self.fail(&mut record, err, env, audit_log)),
                }
            }
            Err(err) => return Err(self.fail(&mut record, err, env, audit_log)),
        };

        if !hint.is_ready() {
            return self.wait(&mut record, hint, env, audit_log);
        }

        audit_log.record_start(step);
        match head.execute(id, env) {
            Ok(Next::Step(next)) => {
                audit_log.record_success(head.undo_description());
                debug!(operation = %id, step, next = next.name(), "step executed");
                record.stack.push(next);
                record.status = ChainStatus::InProgress;
                record.polls = 0;
                record.touch();
                self.store.save(&record)?;
                Ok(Poll::Progressed)
            }
            Ok(Next::Done) => {
                audit_log.record_success(head.undo_description());
                debug!(operation = %id, step, "final step executed");
                self.complete(&mut record, Outcome::Completed)
            }
            Err(StepError::ResourceAbsent(resource)) => {
                audit_log.record_success(head.undo_description());
                self.absent(&mut record, resource, env, audit_log)
            }
            Err(err) => {
                audit_log.record_failure();
                Err(self.fail(&mut record, err, env, audit_log))
            }
        }
    }

    fn wait(
        &self,
        record: &mut ChainRecord<S>,
        hint: WaitHint,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
    ) -> Result<Poll, ChainError> {
        record.polls = record.polls.saturating_add(1);
        if let Some(max_polls) = self.config.max_polls {
            if record.polls > max_polls {
                let err = StepError::message(format!("not ready after {max_polls} polls"));
                return Err(self.fail(record, err, env, audit_log));
            }
        }

        let delay = self.config.backoff.delay(record.polls, hint);
        record.touch();
        self.store.save(record)?;
        trace!(
            operation = %record.id,
            polls = record.polls,
            delay_ms = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX),
            "head step not ready"
        );
        Ok(Poll::Waiting(delay))
    }

    fn complete(
        &self,
        record: &mut ChainRecord<S>,
        outcome: Outcome,
    ) -> Result<Poll, ChainError> {
        record.stack.clear();
        record.status = ChainStatus::Successful;
        record.outcome = Some(outcome.clone());
        record.polls = 0;
        record.touch();
        self.store.save(record)?;
        info!(operation = %record.id, ?outcome, "chain completed");
        Ok(Poll::Finished(outcome))
    }

    fn absent(
        &self,
        record: &mut ChainRecord<S>,
        resource: ResourceId,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
    ) -> Result<Poll, ChainError> {
        info!(operation = %record.id, %resource, "resource absent, nothing to do");
        let step = head_name(record);

        let undo_errors = self.undo_stack(record, env, audit_log)?;
        if undo_errors.is_empty() {
            return self.complete(record, Outcome::Absent(resource));
        }

        let step_error = StepError::ResourceAbsent(resource);
        record.failure = Some(FailureRecord {
            step: step.clone(),
            message: step_error.to_string(),
            undo_failures: undo_errors.iter().map(undo_failure_record).collect(),
        });
        record.status = ChainStatus::Failed;
        record.touch();
        self.store.save(record)?;
        Err(ChainError::UndoFailed {
            operation: record.id,
            failed_step: step,
            step_error,
            undo_errors,
        })
    }

    fn fail(
        &self,
        record: &mut ChainRecord<S>,
        err: StepError,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
    ) -> ChainError {
        let step = head_name(record);
        error!(operation = %record.id, step = %step, error = %err, "step failed, unwinding chain");

        record.status = ChainStatus::FailedInProgress;
        record.failure = Some(FailureRecord {
            step,
            message: err.to_string(),
            undo_failures: Vec::new(),
        });
        record.touch();
        if let Err(store_err) = self.store.save(record) {
            return store_err.into();
        }

        self.unwind(record, env, audit_log, Some(err))
    }

    fn unwind(
        &self,
        record: &mut ChainRecord<S>,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
        step_error: Option<StepError>,
    ) -> ChainError {
        let undo_errors = match self.undo_stack(record, env, audit_log) {
            Ok(undo_errors) => undo_errors,
            Err(store_err) => return store_err.into(),
        };

        record.status = ChainStatus::Failed;
        record.touch();
        if let Err(store_err) = self.store.save(record) {
            return store_err.into();
        }
        info!(operation = %record.id, "chain unwound");

        let failure = record.failure.clone().unwrap_or_else(FailureRecord::unknown);
        chain_error(record.id, failure, step_error, undo_errors)
    }

    // Undo and pop from the top until the stack is empty, saving after each
    // pop so a crash mid-unwind resumes with the steps still to undo.
    fn undo_stack(
        &self,
        record: &mut ChainRecord<S>,
        env: &S::Env,
        audit_log: &mut ChainAuditLog,
    ) -> Result<Vec<UndoError>, StoreError> {
        let mut undo_errors = Vec::new();

        while let Some(top) = record.stack.last() {
            let step = top.name();
            let description = top.undo_description();

            match top.undo(record.id, env) {
                Ok(()) => {
                    debug!(operation = %record.id, step, "step undone");
                    audit_log.record_undone(step);
                }
                Err(error) => {
                    error!(
                        operation = %record.id,
                        step,
                        %error,
                        "undo failed, reservations may be stuck"
                    );
                    audit_log.record_undo_failed(step);
                    let undo_error = UndoError {
                        step: step.to_string(),
                        description,
                        error,
                    };
                    if let Some(failure) = record.failure.as_mut() {
                        failure.undo_failures.push(undo_failure_record(&undo_error));
                    }
                    undo_errors.push(undo_error);
                }
            }

            record.stack.pop();
            record.touch();
            self.store.save(record)?;
        }

        Ok(undo_errors)
    }
}

fn head_name<S: Step>(record: &ChainRecord<S>) -> String {
    record
        .stack
        .last()
        .map_or("<empty>", |step| step.name())
        .to_string()
}

fn undo_failure_record(undo_error: &UndoError) -> UndoFailureRecord {
    UndoFailureRecord {
        step: undo_error.step.clone(),
        description: undo_error.description.clone(),
        message: undo_error.error.to_string(),
    }
}
