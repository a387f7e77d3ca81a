use shared::{domain::TaskId, protocol::TaskFields};
use tracing::{debug, info, warn};

use crate::{
    config::ReconcileMode,
    item::TaskIntent,
    state::{normalize_title, SyncOutcome, TaskList},
    TodoApi,
};

/// Owns the task collection and keeps it in step with the remote service.
///
/// Each call issues at most one mutating request and folds its outcome into
/// the [`TaskList`]. Nothing is queued, retried or coalesced.
pub struct TaskListController<A: TodoApi> {
    api: A,
    list: TaskList,
    reconcile: ReconcileMode,
}

impl<A: TodoApi> TaskListController<A> {
    pub fn new(api: A) -> Self {
        Self::with_reconcile(api, ReconcileMode::default())
    }

    pub fn with_reconcile(api: A, reconcile: ReconcileMode) -> Self {
        Self {
            api,
            list: TaskList::new(),
            reconcile,
        }
    }

    pub fn list(&self) -> &TaskList {
        &self.list
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn into_list(self) -> TaskList {
        self.list
    }

    pub async fn load(&mut self) -> SyncOutcome {
        let result = self.api.list_tasks().await;
        let outcome = self.list.apply_loaded(result);
        debug!(tasks = self.list.tasks().len(), ?outcome, "load finished");
        outcome
    }

    pub async fn create(&mut self, title: &str) -> SyncOutcome {
        let Some(title) = normalize_title(title) else {
            debug!("ignoring create with blank title");
            return SyncOutcome::Skipped;
        };

        let fields = TaskFields::new(title, false);
        let result = self.api.create_task(&fields).await;
        let outcome = self.list.apply_created(result);
        self.after_mutation(outcome).await
    }

    pub async fn toggle_or_update(
        &mut self,
        id: TaskId,
        completed: bool,
        title: &str,
    ) -> SyncOutcome {
        let fields = TaskFields::new(title, completed);
        let result = self.api.update_task(id, &fields).await;
        let outcome = self.list.apply_updated(id, &fields, result);
        self.after_mutation(outcome).await
    }

    pub async fn remove(&mut self, id: TaskId) -> SyncOutcome {
        let result = self.api.delete_task(id).await;
        let outcome = self.list.apply_removed(id, result);
        self.after_mutation(outcome).await
    }

    pub async fn dispatch(&mut self, intent: TaskIntent) -> SyncOutcome {
        match intent {
            TaskIntent::Update {
                id,
                completed,
                title,
            } => self.toggle_or_update(id, completed, &title).await,
            TaskIntent::Delete { id } => self.remove(id).await,
        }
    }

    async fn after_mutation(&mut self, outcome: SyncOutcome) -> SyncOutcome {
        if outcome != SyncOutcome::Applied || self.reconcile != ReconcileMode::Refetch {
            return outcome;
        }

        // The mutation is committed either way; a failed reload only leaves
        // its message in the error slot.
        info!("refetching todos after mutation");
        if self.load().await.is_failed() {
            warn!("refetch after mutation failed; keeping mirrored state");
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    use async_trait::async_trait;
    use shared::{domain::Task, protocol::ServiceStatus};

    use super::*;
    use crate::error::{Result, TodoClientError};

    /// In-memory service that can be told to fail every call.
    #[derive(Default)]
    struct FakeApi {
        tasks: Mutex<Vec<Task>>,
        next_id: AtomicUsize,
        calls: AtomicUsize,
        failing: bool,
    }

    impl FakeApi {
        fn seeded(tasks: Vec<Task>) -> Self {
            let next_id = tasks.iter().map(|task| task.id.0).max().unwrap_or(0) as usize + 1;
            Self {
                tasks: Mutex::new(tasks),
                next_id: AtomicUsize::new(next_id),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn check(&self, endpoint: &str) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing {
                return Err(TodoClientError::Status {
                    endpoint: endpoint.to_string(),
                    status: 503,
                    detail: None,
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TodoApi for FakeApi {
        async fn list_tasks(&self) -> Result<Vec<Task>> {
            self.check("GET /todos")?;
            Ok(self.tasks.lock().expect("lock").clone())
        }

        async fn create_task(&self, fields: &TaskFields) -> Result<Task> {
            self.check("POST /todos")?;
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) as i64;
            let task = fields.clone().into_task(TaskId(id));
            self.tasks.lock().expect("lock").push(task.clone());
            Ok(task)
        }

        async fn update_task(&self, id: TaskId, fields: &TaskFields) -> Result<Option<Task>> {
            self.check("PUT /todos")?;
            let mut tasks = self.tasks.lock().expect("lock");
            let task = tasks
                .iter_mut()
                .find(|task| task.id == id)
                .ok_or_else(|| TodoClientError::Status {
                    endpoint: format!("PUT /todos/{id}"),
                    status: 404,
                    detail: Some("Todo not found".to_string()),
                })?;
            task.title.clone_from(&fields.title);
            task.completed = fields.completed;
            Ok(Some(task.clone()))
        }

        async fn delete_task(&self, id: TaskId) -> Result<()> {
            self.check("DELETE /todos")?;
            self.tasks.lock().expect("lock").retain(|task| task.id != id);
            Ok(())
        }

        async fn service_status(&self) -> Result<ServiceStatus> {
            self.check("GET /")?;
            Ok(ServiceStatus {
                message: "ok".to_string(),
            })
        }
    }

    fn task(id: i64, title: &str, completed: bool) -> Task {
        Task {
            id: TaskId(id),
            title: title.to_string(),
            completed,
        }
    }

    #[tokio::test]
    async fn blank_create_sends_nothing() {
        let mut controller = TaskListController::new(FakeApi::seeded(vec![task(1, "a", false)]));
        controller.load().await;
        let calls_before = controller.api().calls.load(Ordering::SeqCst);

        assert_eq!(controller.create("").await, SyncOutcome::Skipped);
        assert_eq!(controller.create("   ").await, SyncOutcome::Skipped);
        assert_eq!(controller.api().calls.load(Ordering::SeqCst), calls_before);
        assert_eq!(controller.list().tasks(), &[task(1, "a", false)]);
    }

    #[tokio::test]
    async fn dispatch_routes_toggle_and_delete() {
        let mut controller = TaskListController::new(FakeApi::seeded(vec![
            task(1, "a", false),
            task(2, "b", false),
        ]));
        controller.load().await;

        let toggle = TaskIntent::toggle(&task(1, "a", false));
        assert_eq!(controller.dispatch(toggle).await, SyncOutcome::Applied);
        assert_eq!(controller.list().get(TaskId(1)), Some(&task(1, "a", true)));

        let delete = TaskIntent::Delete { id: TaskId(2) };
        assert_eq!(controller.dispatch(delete).await, SyncOutcome::Applied);
        assert_eq!(controller.list().tasks(), &[task(1, "a", true)]);
    }

    #[tokio::test]
    async fn failures_leave_collection_unchanged() {
        let api = FakeApi::seeded(vec![task(1, "a", false)]);
        let mut controller = TaskListController::new(api);
        controller.load().await;
        let before = controller.list().tasks().to_vec();

        // Rebuild around a failing api with the same local state.
        let mut failing = TaskListController::new(FakeApi::failing());
        failing.list = controller.into_list();

        assert_eq!(failing.create("new").await, SyncOutcome::Failed);
        assert_eq!(failing.list().tasks(), before.as_slice());
        assert_eq!(
            failing.toggle_or_update(TaskId(1), true, "a").await,
            SyncOutcome::Failed
        );
        assert_eq!(failing.list().tasks(), before.as_slice());
        assert_eq!(failing.remove(TaskId(1)).await, SyncOutcome::Failed);
        assert_eq!(failing.list().tasks(), before.as_slice());
        assert_eq!(failing.load().await, SyncOutcome::Failed);
        assert_eq!(failing.list().tasks(), before.as_slice());

        let message = failing.list().error().expect("error message");
        assert!(message.starts_with("Failed to load tasks"), "unexpected: {message}");
    }

    #[tokio::test]
    async fn refetch_mode_reloads_after_successful_mutation() {
        let api = std::sync::Arc::new(FakeApi::seeded(vec![task(1, "a", false)]));
        let mut controller = TaskListController::with_reconcile(api.clone(), ReconcileMode::Refetch);
        controller.load().await;

        // Another client adds a task behind our back.
        api.tasks.lock().expect("lock").push(task(50, "remote", false));

        assert_eq!(controller.create("local").await, SyncOutcome::Applied);
        let titles: Vec<&str> = controller
            .list()
            .tasks()
            .iter()
            .map(|task| task.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "remote", "local"]);
    }

    #[tokio::test]
    async fn mirror_mode_does_not_reload() {
        let api = std::sync::Arc::new(FakeApi::seeded(vec![task(1, "a", false)]));
        let mut controller = TaskListController::new(api.clone());
        controller.load().await;
        api.tasks.lock().expect("lock").push(task(50, "remote", false));

        controller.create("local").await;
        assert!(controller.list().get(TaskId(50)).is_none());
        assert_eq!(controller.list().tasks().len(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_task_surfaces_server_detail() {
        let mut controller = TaskListController::new(FakeApi::seeded(vec![task(1, "a", false)]));
        controller.load().await;

        assert_eq!(
            controller.toggle_or_update(TaskId(99), true, "ghost").await,
            SyncOutcome::Failed
        );
        let message = controller.list().error().expect("error");
        assert!(message.contains("Todo not found"), "unexpected: {message}");
    }
}
