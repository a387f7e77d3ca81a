use client_core::{
    filter::task_counts, normalize_title, ClientSettings, InlineEdit, ReconcileMode, SyncOutcome,
    TaskIntent, TaskList,
};
use crossbeam_channel::{Receiver, Sender};
use eframe::egui;
use serde::{Deserialize, Serialize};
use shared::{domain::TaskFilter, protocol::TaskFields};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;
use crate::controller::orchestration::dispatch_backend_command;
use crate::ui::item_view::show_task_row;

pub const SETTINGS_STORAGE_KEY: &str = "todo_desktop.settings";

#[derive(Debug, Clone)]
pub struct StartupConfig {
    pub api_base_url: String,
    pub reconcile: ReconcileMode,
}

impl From<&ClientSettings> for StartupConfig {
    fn from(settings: &ClientSettings) -> Self {
        Self {
            api_base_url: settings.api_base_url.clone(),
            reconcile: settings.reconcile,
        }
    }
}

/// UI preferences that survive restarts. Tasks are never persisted locally.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedUiSettings {
    #[serde(default)]
    pub filter: TaskFilter,
}

pub struct TodoApp {
    cmd_tx: Sender<BackendCommand>,
    ui_rx: Receiver<UiEvent>,
    tasks: TaskList,
    filter: TaskFilter,
    new_title: String,
    inline_edit: InlineEdit,
    status: String,
    reconcile: ReconcileMode,
    api_base_url: String,
}

impl TodoApp {
    pub fn new(
        cmd_tx: Sender<BackendCommand>,
        ui_rx: Receiver<UiEvent>,
        startup: StartupConfig,
        persisted: Option<PersistedUiSettings>,
    ) -> Self {
        let persisted = persisted.unwrap_or_default();
        let mut app = Self {
            cmd_tx,
            ui_rx,
            tasks: TaskList::new(),
            filter: persisted.filter,
            new_title: String::new(),
            inline_edit: InlineEdit::default(),
            status: format!("Connecting to {}", startup.api_base_url),
            reconcile: startup.reconcile,
            api_base_url: startup.api_base_url,
        };
        app.tasks.begin_initial_load();
        app.dispatch(BackendCommand::LoadTasks);
        app
    }

    fn dispatch(&mut self, cmd: BackendCommand) -> bool {
        dispatch_backend_command(&self.cmd_tx, cmd, &mut self.tasks)
    }

    fn process_ui_events(&mut self) {
        while let Ok(event) = self.ui_rx.try_recv() {
            self.apply_event(event);
        }
    }

    fn apply_event(&mut self, event: UiEvent) {
        let outcome = match event {
            UiEvent::Info(message) => {
                self.status = message;
                return;
            }
            UiEvent::BackendUnavailable(reason) => {
                self.status = "Backend unavailable".to_string();
                self.tasks.apply_loaded(Err::<Vec<_>, _>(reason));
                return;
            }
            UiEvent::TasksLoaded(result) => {
                let outcome = self.tasks.apply_loaded(result);
                if outcome == SyncOutcome::Applied {
                    self.drop_stale_edit();
                }
                return;
            }
            UiEvent::TaskCreated(result) => self.tasks.apply_created(result),
            UiEvent::TaskUpdated { id, fields, result } => {
                self.tasks.apply_updated(id, &fields, result)
            }
            UiEvent::TaskDeleted { id, result } => {
                let outcome = self.tasks.apply_removed(id, result);
                self.drop_stale_edit();
                outcome
            }
        };

        if outcome == SyncOutcome::Applied && self.reconcile == ReconcileMode::Refetch {
            tracing::debug!("refetching todos after mutation");
            self.dispatch(BackendCommand::LoadTasks);
        }
    }

    /// Closes the rename field when its task has disappeared from the list.
    fn drop_stale_edit(&mut self) {
        if let Some(id) = self.inline_edit.editing_id() {
            if self.tasks.get(id).is_none() {
                self.inline_edit.cancel();
            }
        }
    }

    /// Switches the filter. A rename whose row the new filter hides is
    /// dropped, so it cannot reappear later with a stale draft.
    fn set_filter(&mut self, filter: TaskFilter) {
        self.filter = filter;
        if let Some(id) = self.inline_edit.editing_id() {
            if !self.tasks.get(id).is_some_and(|task| filter.matches(task)) {
                self.inline_edit.cancel();
            }
        }
    }

    fn submit_new_task(&mut self) {
        let Some(title) = normalize_title(&self.new_title) else {
            return;
        };
        let fields = TaskFields::new(title, false);
        if self.dispatch(BackendCommand::CreateTask { fields }) {
            self.new_title.clear();
        }
    }

    fn handle_intent(&mut self, intent: TaskIntent) {
        tracing::debug!(task_id = intent.task_id().0, "task row intent");
        self.dispatch(BackendCommand::from(intent));
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("todo_header").show(ctx, |ui| {
            ui.add_space(6.0);
            ui.heading("Todos");
            ui.horizontal(|ui| {
                let input = ui.add(
                    egui::TextEdit::singleline(&mut self.new_title)
                        .hint_text("What needs to be done?")
                        .desired_width(ui.available_width() - 64.0),
                );
                let enter_pressed =
                    input.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter));
                let add_clicked = ui
                    .add_enabled(
                        normalize_title(&self.new_title).is_some(),
                        egui::Button::new("Add"),
                    )
                    .clicked();
                if enter_pressed || add_clicked {
                    self.submit_new_task();
                    if enter_pressed {
                        input.request_focus();
                    }
                }
            });
            ui.horizontal(|ui| {
                let mut filter = self.filter;
                for option in TaskFilter::ALL {
                    ui.selectable_value(&mut filter, option, option.as_str());
                }
                if filter != self.filter {
                    self.set_filter(filter);
                }
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("Refresh").clicked() {
                        self.dispatch(BackendCommand::LoadTasks);
                    }
                });
            });
            ui.add_space(4.0);
        });
    }

    fn show_footer(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("todo_footer").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let (active, completed) = task_counts(self.tasks.tasks());
                ui.label(format!("{active} active, {completed} completed"));
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    ui.weak(&self.status)
                        .on_hover_text(format!("{} ({} mode)", self.api_base_url, self.reconcile));
                });
            });
        });
    }

    fn show_task_list(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(message) = self.tasks.error() {
                ui.colored_label(ui.visuals().error_fg_color, message);
                ui.separator();
            }

            if self.tasks.is_loading() {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading tasks...");
                });
                return;
            }

            let mut intents = Vec::new();
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    let visible = self.tasks.visible(self.filter);
                    if visible.is_empty() {
                        ui.weak("Nothing to show.");
                    }
                    for task in visible {
                        ui.push_id(task.id.0, |ui| {
                            if let Some(intent) = show_task_row(ui, task, &mut self.inline_edit) {
                                intents.push(intent);
                            }
                        });
                    }
                });

            for intent in intents {
                self.handle_intent(intent);
            }
        });
    }
}

impl eframe::App for TodoApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.process_ui_events();

        self.show_header(ctx);
        self.show_footer(ctx);
        self.show_task_list(ctx);

        ctx.request_repaint_after(std::time::Duration::from_millis(100));
    }

    fn save(&mut self, storage: &mut dyn eframe::Storage) {
        let settings = PersistedUiSettings {
            filter: self.filter,
        };
        if let Ok(serialized) = serde_json::to_string(&settings) {
            storage.set_string(SETTINGS_STORAGE_KEY, serialized);
        }
    }
}
