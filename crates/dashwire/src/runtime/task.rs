// Copyright 2026 Dropbox (created by Andrew Yates <ayates@dropbox.com>)

//! Task and chain run records
//!
//! One [`ChainRun`] is produced per dispatched trigger event. It records
//! the per-action task state transitions (`Pending → Running → Finished`,
//! or `Failed`/`Skipped` on error) and the merged output map, so tests and
//! metrics can observe exactly what a chain did without reaching into the
//! dispatcher.

use crate::actions::{ActionOutputs, Trigger};
use crate::error::Error;
use crate::models::ModelId;

/// Execution state of one action task within a chain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Queued, not yet started.
    Pending,
    /// Currently executing.
    Running,
    /// Completed successfully.
    Finished,
    /// Raised an error.
    Failed,
    /// Never ran because an earlier task in the chain failed.
    Skipped,
}

/// One action's slot in a chain run.
#[derive(Debug, Clone)]
pub struct ActionTask {
    /// The action's id.
    pub action: ModelId,
    /// The action's kind name, for logs.
    pub name: String,
    /// Current state.
    pub state: TaskState,
}

/// Overall state of a chain run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// The trigger event arrived.
    Triggered,
    /// The gateway resolved the chain and queued its tasks.
    Dispatching,
    /// Every task finished.
    Finished,
    /// A task failed; the rest were skipped.
    Failed,
}

/// The record of one dispatched chain.
#[derive(Debug)]
pub struct ChainRun {
    /// The chain that ran.
    pub chain: ModelId,
    /// The trigger that fired it.
    pub trigger: Trigger,
    /// Final state.
    pub state: ChainState,
    /// Per-action task records, in execution order.
    pub tasks: Vec<ActionTask>,
    /// Merged outputs of every finished action.
    pub outputs: ActionOutputs,
    /// The error that stopped the chain, if any.
    pub error: Option<Error>,
}

impl ChainRun {
    /// Number of tasks that have not finished (pending, running or
    /// skipped).
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.tasks
            .iter()
            .filter(|task| !matches!(task.state, TaskState::Finished | TaskState::Failed))
            .count()
    }

    /// True when every task finished cleanly.
    #[must_use]
    pub fn succeeded(&self) -> bool {
        self.state == ChainState::Finished
    }
}
