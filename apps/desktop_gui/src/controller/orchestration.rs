//! Command orchestration helpers from UI actions to backend command queue.

use client_core::TaskList;
use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;

/// Queues `cmd` for the worker. A command that cannot be queued is reported
/// through the task list's error message like any other failed request.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    tasks: &mut TaskList,
) -> bool {
    let cmd_name = cmd.name();
    let operation = cmd.operation();

    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tasks.report_failure(operation, "command queue is full; please retry");
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tasks.report_failure(
                operation,
                "backend worker is not running (possible startup failure)",
            );
            false
        }
    }
}
