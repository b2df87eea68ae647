//! Durable step chains.
//!
//! An operation is a chain of [`Step`]s. The [`Executor`] keeps the chain in a
//! [`ChainStore`], asks the head step whether it is ready, executes it and
//! pushes the step it returns. If a step fails, every step on the stored
//! stack is undone in reverse order, the failing step first. Because the
//! stack is persisted after every transition, a new executor over the same
//! store picks up where a crashed one stopped.

mod audit;
mod config;
mod error;
mod executor;
mod record;
mod step;
pub mod store;

pub use audit::{ChainAuditLog, StepRecord, StepStatus};
pub use config::{BackoffPolicy, ConflictPolicy, ExecutorConfig};
pub use error::{ChainError, StepError, UndoError};
pub use executor::{ChainRun, Executor, Poll};
pub use record::{ChainRecord, ChainStatus, FailureRecord, Outcome, UndoFailureRecord};
pub use step::{Next, Step, WaitHint};
pub use store::{ChainStore, FileChainStore, MemoryChainStore, StoreError};
