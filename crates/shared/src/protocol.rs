use serde::{Deserialize, Serialize};

use crate::domain::{Task, TaskId};

/// Request body for `POST /todos` and `PUT /todos/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskFields {
    pub title: String,
    pub completed: bool,
}

impl TaskFields {
    pub fn new(title: impl Into<String>, completed: bool) -> Self {
        Self {
            title: title.into(),
            completed,
        }
    }

    pub fn into_task(self, id: TaskId) -> Task {
        Task {
            id,
            title: self.title,
            completed: self.completed,
        }
    }
}

impl From<&Task> for TaskFields {
    fn from(task: &Task) -> Self {
        Self {
            title: task.title.clone(),
            completed: task.completed,
        }
    }
}

/// Banner returned by `GET /`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub message: String,
}

/// Optional body returned by `DELETE /todos/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteAck {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
