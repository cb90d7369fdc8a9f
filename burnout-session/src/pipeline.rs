//! Follow-up work queued by a transition
//!
//! A transition that chains remote calls enqueues them as tasks. The machine
//! drains the queue in order and drops the remainder on the first failure of
//! a task that is not best-effort.

use std::collections::VecDeque;

use burnout_core::Channel;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    IssueCode(Channel),
    ConfirmPayment,
    GenerateReport,
    DeliverReport,
}

impl Task {
    /// The chain run on return from the payment page
    pub const RESUME: [Task; 3] = [Task::ConfirmPayment, Task::GenerateReport, Task::DeliverReport];

    /// Failure is recorded but does not stop the chain or undo earlier steps
    pub fn is_best_effort(&self) -> bool {
        matches!(self, Task::DeliverReport)
    }
}

/// Ordered task queue
#[derive(Debug, Default)]
pub struct Pipeline {
    tasks: VecDeque<Task>,
}

impl Pipeline {
    pub fn push(&mut self, task: Task) {
        self.tasks.push_back(task);
    }

    pub fn extend(&mut self, tasks: impl IntoIterator<Item = Task>) {
        self.tasks.extend(tasks);
    }

    pub fn next(&mut self) -> Option<Task> {
        self.tasks.pop_front()
    }

    /// Drop everything still queued
    pub fn abort(&mut self) -> usize {
        let dropped = self.tasks.len();
        self.tasks.clear();
        dropped
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }
}
