//! Backend commands queued from UI to backend worker.

use client_core::{state::SyncOperation, TaskIntent};
use shared::{domain::TaskId, protocol::TaskFields};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    LoadTasks,
    CreateTask { fields: TaskFields },
    UpdateTask { id: TaskId, fields: TaskFields },
    DeleteTask { id: TaskId },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            BackendCommand::LoadTasks => "load_tasks",
            BackendCommand::CreateTask { .. } => "create_task",
            BackendCommand::UpdateTask { .. } => "update_task",
            BackendCommand::DeleteTask { .. } => "delete_task",
        }
    }

    pub fn operation(&self) -> SyncOperation {
        match self {
            BackendCommand::LoadTasks => SyncOperation::Load,
            BackendCommand::CreateTask { .. } => SyncOperation::Create,
            BackendCommand::UpdateTask { .. } => SyncOperation::Update,
            BackendCommand::DeleteTask { .. } => SyncOperation::Delete,
        }
    }
}

impl From<TaskIntent> for BackendCommand {
    fn from(intent: TaskIntent) -> Self {
        match intent {
            TaskIntent::Update {
                id,
                completed,
                title,
            } => BackendCommand::UpdateTask {
                id,
                fields: TaskFields::new(title, completed),
            },
            TaskIntent::Delete { id } => BackendCommand::DeleteTask { id },
        }
    }
}
