//! Runtime bridge between UI command queue and backend event intake.
//!
//! Every command runs as its own tokio task, so results reach the UI in
//! completion order rather than issue order.

use std::{sync::Arc, thread};

use client_core::{ClientSettings, HttpTodoClient, TodoApi};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

pub fn launch(
    settings: ClientSettings,
    cmd_rx: Receiver<BackendCommand>,
    ui_tx: Sender<UiEvent>,
) -> thread::JoinHandle<()> {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(format!(
                    "failed to build backend runtime: {err}"
                )));
                return;
            }
        };

        let client = match HttpTodoClient::new(&settings) {
            Ok(client) => Arc::new(client),
            Err(err) => {
                tracing::error!("failed to create todo client: {err}");
                let _ = ui_tx.try_send(UiEvent::BackendUnavailable(err.to_string()));
                return;
            }
        };

        runtime.block_on(async move {
            tracing::info!(base_url = %client.base_url(), "backend worker ready");
            let _ = ui_tx.try_send(UiEvent::Info(format!("Service: {}", client.base_url())));

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::info!(command = cmd.name(), "backend: dispatch");
                tokio::spawn(execute(client.clone(), cmd, ui_tx.clone()));
            }
            tracing::info!("command queue closed; backend worker stopping");
        });
    })
}

async fn execute<A: TodoApi>(api: Arc<A>, cmd: BackendCommand, ui_tx: Sender<UiEvent>) {
    let name = cmd.name();
    let event = run_command(api.as_ref(), cmd).await;
    if let Err(err) = ui_tx.try_send(event) {
        tracing::warn!(command = name, "dropping backend result: {err}");
    }
}

async fn run_command<A: TodoApi + ?Sized>(api: &A, cmd: BackendCommand) -> UiEvent {
    match cmd {
        BackendCommand::LoadTasks => UiEvent::TasksLoaded(api.list_tasks().await.map_err(report)),
        BackendCommand::CreateTask { fields } => {
            UiEvent::TaskCreated(api.create_task(&fields).await.map_err(report))
        }
        BackendCommand::UpdateTask { id, fields } => {
            let result = api.update_task(id, &fields).await.map(|_| ()).map_err(report);
            UiEvent::TaskUpdated { id, fields, result }
        }
        BackendCommand::DeleteTask { id } => {
            let result = api.delete_task(id).await.map_err(report);
            UiEvent::TaskDeleted { id, result }
        }
    }
}

fn report(err: client_core::TodoClientError) -> String {
    tracing::error!("backend: request failed: {err}");
    err.to_string()
}
