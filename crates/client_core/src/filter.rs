use shared::domain::{Task, TaskFilter};

/// Tasks matching `filter`, in collection order. Display only; the
/// collection itself is never touched.
pub fn visible_tasks(tasks: &[Task], filter: TaskFilter) -> Vec<&Task> {
    tasks.iter().filter(|task| filter.matches(task)).collect()
}

/// `(active, completed)` counts for the footer.
pub fn task_counts(tasks: &[Task]) -> (usize, usize) {
    let completed = tasks.iter().filter(|task| task.completed).count();
    (tasks.len() - completed, completed)
}
