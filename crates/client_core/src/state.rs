//! In-memory task collection and the rules for folding request outcomes
//! back into it.
//!
//! Results are applied in the order they arrive. Two overlapping updates of
//! the same task therefore resolve to whichever response lands last, not to
//! whichever request was issued last.

use std::fmt::Display;

use shared::{
    domain::{Task, TaskFilter, TaskId},
    protocol::TaskFields,
};
use tracing::warn;

use crate::filter::visible_tasks;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The request succeeded and local state now reflects it.
    Applied,
    /// Nothing was sent.
    Skipped,
    /// The request failed; local state is untouched and the error is set.
    Failed,
}

impl SyncOutcome {
    pub fn is_failed(self) -> bool {
        self == SyncOutcome::Failed
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOperation {
    Load,
    Create,
    Update,
    Delete,
}

impl SyncOperation {
    fn failure_prefix(self) -> &'static str {
        match self {
            SyncOperation::Load => "Failed to load tasks",
            SyncOperation::Create => "Failed to add task",
            SyncOperation::Update => "Failed to update task",
            SyncOperation::Delete => "Failed to delete task",
        }
    }
}

/// Returns the trimmed title, or `None` when nothing is left to send.
pub fn normalize_title(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then_some(trimmed)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
    error: Option<String>,
    loading: bool,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn visible(&self, filter: TaskFilter) -> Vec<&Task> {
        visible_tasks(&self.tasks, filter)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Raises the initial-load indicator. Later reloads leave it alone.
    pub fn begin_initial_load(&mut self) {
        self.loading = true;
    }

    /// Records a failure that happened before any request could be sent,
    /// e.g. a full command queue.
    pub fn report_failure(&mut self, operation: SyncOperation, err: impl Display) {
        let message = format!("{}: {err}", operation.failure_prefix());
        warn!("{message}");
        self.error = Some(message);
    }

    pub fn apply_loaded<E: Display>(&mut self, result: Result<Vec<Task>, E>) -> SyncOutcome {
        self.loading = false;
        match result {
            Ok(tasks) => {
                self.tasks = tasks;
                self.error = None;
                SyncOutcome::Applied
            }
            Err(err) => {
                self.report_failure(SyncOperation::Load, err);
                SyncOutcome::Failed
            }
        }
    }

    pub fn apply_created<E: Display>(&mut self, result: Result<Task, E>) -> SyncOutcome {
        match result {
            Ok(task) => {
                if self.get(task.id).is_some() {
                    warn!(task_id = task.id.0, "service returned an id already held locally");
                    self.tasks.retain(|existing| existing.id != task.id);
                }
                self.tasks.push(task);
                self.error = None;
                SyncOutcome::Applied
            }
            Err(err) => {
                self.report_failure(SyncOperation::Create, err);
                SyncOutcome::Failed
            }
        }
    }

    /// Mirrors the requested fields into the local record. The response body
    /// is not consulted.
    pub fn apply_updated<T, E: Display>(
        &mut self,
        id: TaskId,
        fields: &TaskFields,
        result: Result<T, E>,
    ) -> SyncOutcome {
        match result {
            Ok(_) => {
                match self.tasks.iter_mut().find(|task| task.id == id) {
                    Some(task) => {
                        task.title.clone_from(&fields.title);
                        task.completed = fields.completed;
                    }
                    None => warn!(task_id = id.0, "updated task is no longer held locally"),
                }
                self.error = None;
                SyncOutcome::Applied
            }
            Err(err) => {
                self.report_failure(SyncOperation::Update, err);
                SyncOutcome::Failed
            }
        }
    }

    pub fn apply_removed<E: Display>(&mut self, id: TaskId, result: Result<(), E>) -> SyncOutcome {
        match result {
            Ok(()) => {
                self.tasks.retain(|task| task.id != id);
                self.error = None;
                SyncOutcome::Applied
            }
            Err(err) => {
                self.report_failure(SyncOperation::Delete, err);
                SyncOutcome::Failed
            }
        }
    }
}
