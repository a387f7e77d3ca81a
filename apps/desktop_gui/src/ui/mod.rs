//! UI layer for the desktop client: app shell and the task row widget.

pub mod app;
pub mod item_view;

pub use app::{PersistedUiSettings, StartupConfig, TodoApp, SETTINGS_STORAGE_KEY};
