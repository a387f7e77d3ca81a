//! A single task row: completion checkbox, title or rename field, delete button.

use client_core::{InlineEdit, TaskIntent};
use eframe::egui;
use shared::domain::Task;

/// Draws `task` and returns what the user asked for this frame, if anything.
pub fn show_task_row(ui: &mut egui::Ui, task: &Task, edit: &mut InlineEdit) -> Option<TaskIntent> {
    let mut toggled = false;
    let mut renamed = None;
    let mut deleted = false;

    ui.horizontal(|ui| {
        let mut completed = task.completed;
        toggled = ui.checkbox(&mut completed, "").changed();

        if let Some(draft) = edit.draft_mut(task.id) {
            let response = ui.add(
                egui::TextEdit::singleline(draft)
                    .desired_width(ui.available_width() - 32.0)
                    .hint_text("Task title"),
            );
            if response.lost_focus() {
                if ui.input(|i| i.key_pressed(egui::Key::Escape)) {
                    edit.cancel();
                } else {
                    renamed = edit.commit(task);
                }
            } else if !response.has_focus() {
                response.request_focus();
            }
        } else {
            let mut text = egui::RichText::new(&task.title);
            if task.completed {
                text = text.strikethrough().weak();
            }
            let label = ui
                .add(egui::Label::new(text).sense(egui::Sense::click()))
                .on_hover_text("Double-click to rename");
            if label.double_clicked() {
                edit.begin(task);
            }
        }

        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
            deleted = ui.small_button("✖").on_hover_text("Delete task").clicked();
        });
    });

    row_intent(task, toggled, renamed, deleted)
}

/// Combines what one row reported in a single frame. A toggle that lands in
/// the same frame as a rename commit carries the new title.
///
/// A toggle clicked a frame after the commit still carries the confirmed
/// title; whichever of the two responses arrives last wins.
fn row_intent(
    task: &Task,
    toggled: bool,
    renamed: Option<TaskIntent>,
    deleted: bool,
) -> Option<TaskIntent> {
    if deleted {
        return Some(TaskIntent::delete(task));
    }
    match (toggled, renamed) {
        (true, Some(TaskIntent::Update { id, title, .. })) => Some(TaskIntent::Update {
            id,
            completed: !task.completed,
            title,
        }),
        (true, _) => Some(TaskIntent::toggle(task)),
        (false, renamed) => renamed,
    }
}

#[cfg(test)]
mod tests {
    use shared::domain::TaskId;

    use super::*;

    fn task() -> Task {
        Task {
            id: TaskId(3),
            title: "Buy milk".to_string(),
            completed: false,
        }
    }

    #[test]
    fn toggle_and_rename_in_one_frame_become_one_update() {
        let current = task();
        let renamed = Some(TaskIntent::rename(&current, "Buy oat milk"));
        assert_eq!(
            row_intent(&current, true, renamed, false),
            Some(TaskIntent::Update {
                id: TaskId(3),
                completed: true,
                title: "Buy oat milk".to_string(),
            })
        );
    }

    #[test]
    fn lone_toggle_keeps_title() {
        let current = task();
        assert_eq!(
            row_intent(&current, true, None, false),
            Some(TaskIntent::toggle(&current))
        );
    }

    #[test]
    fn lone_rename_passes_through() {
        let current = task();
        let renamed = TaskIntent::rename(&current, "Walk dog");
        assert_eq!(
            row_intent(&current, false, Some(renamed.clone()), false),
            Some(renamed)
        );
    }

    #[test]
    fn delete_wins_over_everything_else() {
        let current = task();
        let renamed = Some(TaskIntent::rename(&current, "Walk dog"));
        assert_eq!(
            row_intent(&current, true, renamed, true),
            Some(TaskIntent::Delete { id: TaskId(3) })
        );
        assert_eq!(row_intent(&current, false, None, false), None);
    }
}
