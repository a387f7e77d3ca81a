use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

macro_rules! id_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse().map(Self)
            }
        }
    };
}

id_newtype!(TaskId);

/// A single to-do item as stored by the remote service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskFilter {
    #[default]
    All,
    Active,
    Completed,
}

impl TaskFilter {
    pub const ALL: [TaskFilter; 3] = [TaskFilter::All, TaskFilter::Active, TaskFilter::Completed];

    pub fn matches(self, task: &Task) -> bool {
        match self {
            TaskFilter::All => true,
            TaskFilter::Active => !task.completed,
            TaskFilter::Completed => task.completed,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TaskFilter::All => "all",
            TaskFilter::Active => "active",
            TaskFilter::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownFilter(pub String);

impl fmt::Display for UnknownFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unknown filter '{}' (expected all, active or completed)",
            self.0
        )
    }
}

impl std::error::Error for UnknownFilter {}

impl FromStr for TaskFilter {
    type Err = UnknownFilter;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(TaskFilter::All),
            "active" => Ok(TaskFilter::Active),
            "completed" | "done" => Ok(TaskFilter::Completed),
            _ => Err(UnknownFilter(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_uses_flat_wire_shape() {
        let task: Task = serde_json::from_str(r#"{"id":4,"title":"Buy milk","completed":false}"#)
            .expect("task");
        assert_eq!(task.id, TaskId(4));
        assert_eq!(task.title, "Buy milk");
        assert!(!task.completed);

        let encoded = serde_json::to_value(&task).expect("encode");
        assert_eq!(encoded["id"], 4);
    }

    #[test]
    fn filter_parses_case_insensitively() {
        assert_eq!("Active".parse::<TaskFilter>(), Ok(TaskFilter::Active));
        assert_eq!(" completed ".parse::<TaskFilter>(), Ok(TaskFilter::Completed));
        assert_eq!("all".parse::<TaskFilter>(), Ok(TaskFilter::All));
        assert!("pending".parse::<TaskFilter>().is_err());
    }

    #[test]
    fn filter_predicates() {
        let open = Task {
            id: TaskId(1),
            title: "open".to_string(),
            completed: false,
        };
        let done = Task {
            id: TaskId(2),
            title: "done".to_string(),
            completed: true,
        };

        assert!(TaskFilter::All.matches(&open) && TaskFilter::All.matches(&done));
        assert!(TaskFilter::Active.matches(&open) && !TaskFilter::Active.matches(&done));
        assert!(!TaskFilter::Completed.matches(&open) && TaskFilter::Completed.matches(&done));
    }
}
