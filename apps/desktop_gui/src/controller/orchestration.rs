//! Command orchestration helpers from UI actions to backend command queue.

use crossbeam_channel::{Sender, TrySendError};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::{events::UiEvent, reducer::BoardView};

pub const QUEUE_FULL: &str = "Muitas ações pendentes. Tente novamente.";
pub const BACKEND_DISCONNECTED: &str =
    "A conexão com o processamento em segundo plano foi perdida. Reinicie o aplicativo.";

/// Queues `cmd` and marks the view busy. Nothing is queued while an action is in flight.
pub fn dispatch_backend_command(
    cmd_tx: &Sender<BackendCommand>,
    cmd: BackendCommand,
    view: &mut BoardView,
) -> bool {
    let cmd_name = cmd.name();
    if view.in_flight() {
        tracing::debug!(command = cmd_name, "ignoring command while an action is in flight");
        return false;
    }

    view.mark_queued(&cmd);
    match cmd_tx.try_send(cmd) {
        Ok(()) => {
            tracing::debug!(command = cmd_name, "queued ui->backend command");
            true
        }
        Err(TrySendError::Full(_)) => {
            tracing::warn!(command = cmd_name, "ui->backend command queue is full");
            view.apply(UiEvent::BackendFailed(QUEUE_FULL.to_string()));
            false
        }
        Err(TrySendError::Disconnected(_)) => {
            tracing::error!(command = cmd_name, "ui->backend command queue disconnected");
            view.apply(UiEvent::BackendFailed(BACKEND_DISCONNECTED.to_string()));
            false
        }
    }
}
