//! Per-task view logic: the intents an item row can emit and its inline
//! rename state.

use shared::{
    domain::{Task, TaskId},
    protocol::TaskFields,
};

/// What a task row asks the list controller to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskIntent {
    /// Replace the task's fields. Toggling and renaming both end up here.
    Update {
        id: TaskId,
        completed: bool,
        title: String,
    },
    Delete {
        id: TaskId,
    },
}

impl TaskIntent {
    pub fn toggle(task: &Task) -> Self {
        TaskIntent::Update {
            id: task.id,
            completed: !task.completed,
            title: task.title.clone(),
        }
    }

    pub fn rename(task: &Task, title: impl Into<String>) -> Self {
        TaskIntent::Update {
            id: task.id,
            completed: task.completed,
            title: title.into(),
        }
    }

    pub fn delete(task: &Task) -> Self {
        TaskIntent::Delete { id: task.id }
    }

    pub fn task_id(&self) -> TaskId {
        match self {
            TaskIntent::Update { id, .. } | TaskIntent::Delete { id } => *id,
        }
    }

    pub fn fields(&self) -> Option<TaskFields> {
        match self {
            TaskIntent::Update {
                completed, title, ..
            } => Some(TaskFields::new(title.clone(), *completed)),
            TaskIntent::Delete { .. } => None,
        }
    }
}

/// Inline rename state for at most one task at a time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InlineEdit {
    editing: Option<(TaskId, String)>,
}

impl InlineEdit {
    pub fn begin(&mut self, task: &Task) {
        self.editing = Some((task.id, task.title.clone()));
    }

    pub fn is_editing(&self, id: TaskId) -> bool {
        matches!(&self.editing, Some((editing, _)) if *editing == id)
    }

    pub fn editing_id(&self) -> Option<TaskId> {
        self.editing.as_ref().map(|(id, _)| *id)
    }

    pub fn draft_mut(&mut self, id: TaskId) -> Option<&mut String> {
        match &mut self.editing {
            Some((editing, draft)) if *editing == id => Some(draft),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.editing = None;
    }

    /// Leaves edit mode. Yields a rename only when the trimmed draft is
    /// non-empty and differs from the current title.
    pub fn commit(&mut self, task: &Task) -> Option<TaskIntent> {
        let (id, draft) = self.editing.take()?;
        if id != task.id {
            self.editing = Some((id, draft));
            return None;
        }

        let title = draft.trim();
        if title.is_empty() || title == task.title {
            return None;
        }
        Some(TaskIntent::rename(task, title))
    }
}
