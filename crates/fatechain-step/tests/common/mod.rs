#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use fatechain_core::{OperationId, ResourceId};
use fatechain_step::{Next, Step, StepError, WaitHint};
use serde::{Deserialize, Serialize};

const NAMES: [&str; 6] = ["step_1", "step_2", "step_3", "step_4", "step_5", "step_6"];

pub const CONFLICTING_OP: OperationId = OperationId::new(0x99);

/// What the next `is_ready` call should report.
#[derive(Debug, Clone, Copy)]
pub enum Readiness {
    Ready,
    Wait(u64),
    Conflict,
    Absent,
}

/// Step `index` of a `len`-step chain that fails executing at `fail_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Numbered {
    pub index: usize,
    pub len: usize,
    pub fail_at: Option<usize>,
}

impl Numbered {
    pub fn chain(len: usize) -> Self {
        Self {
            index: 0,
            len,
            fail_at: None,
        }
    }

    pub fn failing_at(len: usize, fail_at: usize) -> Self {
        Self {
            index: 0,
            len,
            fail_at: Some(fail_at),
        }
    }
}

#[derive(Default)]
pub struct ScriptedEnv {
    log: Mutex<Vec<String>>,
    readiness: Mutex<VecDeque<Readiness>>,
    failing_undo: Option<usize>,
}

impl ScriptedEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_failing_undo(index: usize) -> Self {
        Self {
            failing_undo: Some(index),
            ..Self::default()
        }
    }

    /// Queue readiness answers; once drained every step is ready.
    pub fn script(&self, answers: impl IntoIterator<Item = Readiness>) {
        self.readiness
            .lock()
            .expect("readiness lock")
            .extend(answers);
    }

    pub fn log(&self) -> Vec<String> {
        self.log.lock().expect("log lock").clone()
    }

    pub fn entries(&self, prefix: &str) -> Vec<String> {
        self.log()
            .into_iter()
            .filter(|entry| entry.starts_with(prefix))
            .collect()
    }

    fn push(&self, entry: String) {
        self.log.lock().expect("log lock").push(entry);
    }

    fn next_readiness(&self) -> Readiness {
        self.readiness
            .lock()
            .expect("readiness lock")
            .pop_front()
            .unwrap_or(Readiness::Ready)
    }
}

impl Step for Numbered {
    type Env = ScriptedEnv;
    type Chain = Numbered;

    fn name(&self) -> &'static str {
        NAMES[self.index]
    }

    fn is_ready(&self, _op: OperationId, env: &ScriptedEnv) -> Result<WaitHint, StepError> {
        env.push(format!("ready {}", self.name()));
        match env.next_readiness() {
            Readiness::Ready => Ok(WaitHint::READY),
            Readiness::Wait(millis) => Ok(WaitHint::from_millis(millis)),
            Readiness::Conflict => Err(StepError::ReservationConflict {
                resource: ResourceId::new("ns1"),
                holder: CONFLICTING_OP,
            }),
            Readiness::Absent => Err(StepError::ResourceAbsent(ResourceId::new("ns1"))),
        }
    }

    fn execute(&self, _op: OperationId, env: &ScriptedEnv) -> Result<Next<Numbered>, StepError> {
        env.push(format!("execute {}", self.name()));
        if self.fail_at == Some(self.index) {
            return Err(StepError::message(format!("{} exploded", self.name())));
        }
        if self.index + 1 >= self.len {
            return Ok(Next::Done);
        }
        Ok(Next::Step(Self {
            index: self.index + 1,
            ..*self
        }))
    }

    fn undo(&self, _op: OperationId, env: &ScriptedEnv) -> Result<(), StepError> {
        env.push(format!("undo {}", self.name()));
        if env.failing_undo == Some(self.index) {
            return Err(StepError::message(format!("{} undo exploded", self.name())));
        }
        Ok(())
    }
}
