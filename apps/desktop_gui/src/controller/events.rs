//! Results and notices sent from the backend worker to the UI thread.

use shared::{
    domain::{Task, TaskId},
    protocol::TaskFields,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Info(String),
    /// The worker could not start; no command will ever be answered.
    BackendUnavailable(String),
    TasksLoaded(Result<Vec<Task>, String>),
    TaskCreated(Result<Task, String>),
    TaskUpdated {
        id: TaskId,
        fields: TaskFields,
        result: Result<(), String>,
    },
    TaskDeleted {
        id: TaskId,
        result: Result<(), String>,
    },
}
