mod backend_bridge;
mod controller;
mod ui;

use anyhow::{anyhow, Context};
use clap::Parser;
use client_core::{load_settings, ReconcileMode};
use crossbeam_channel::bounded;
use eframe::egui;
use tracing_subscriber::EnvFilter;

use crate::backend_bridge::{commands::BackendCommand, runtime};
use crate::controller::events::UiEvent;
use crate::ui::{PersistedUiSettings, StartupConfig, TodoApp, SETTINGS_STORAGE_KEY};

#[derive(Parser, Debug)]
#[command(name = "todo-desktop", about = "Desktop client for a todos service")]
struct Args {
    /// Base url of the service. Overrides todo.toml and APP__API_URL.
    #[arg(long)]
    api_url: Option<String>,
    /// Re-fetch the whole list after each change instead of mirroring it.
    #[arg(long)]
    refetch: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Args::parse();

    let mut settings = load_settings().context("failed to load settings")?;
    if let Some(api_url) = args.api_url {
        settings = settings.with_api_base_url(api_url);
    }
    if args.refetch {
        settings.reconcile = ReconcileMode::Refetch;
    }
    let startup = StartupConfig::from(&settings);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(256);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(2048);
    runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Todos")
            .with_inner_size([520.0, 640.0])
            .with_min_inner_size([360.0, 320.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Todos",
        options,
        Box::new(|cc| {
            let persisted = cc.storage.and_then(|storage| {
                storage
                    .get_string(SETTINGS_STORAGE_KEY)
                    .and_then(|text| serde_json::from_str::<PersistedUiSettings>(&text).ok())
            });
            Ok(Box::new(TodoApp::new(cmd_tx, ui_rx, startup, persisted)))
        }),
    )
    .map_err(|err| anyhow!("desktop ui exited with error: {err}"))
}
