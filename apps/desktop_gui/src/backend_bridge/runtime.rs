//! Runtime bridge between UI command queue and backend event intake.

use std::thread;

use client_core::{connect_board, BoardSettings, StationBoard};
use crossbeam_channel::{Receiver, Sender};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

const STARTUP_FAILED: &str = "Falha ao iniciar o processamento em segundo plano";

pub fn launch(settings: BoardSettings, cmd_rx: Receiver<BackendCommand>, ui_tx: Sender<UiEvent>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                tracing::error!("failed to build backend runtime: {err}");
                let _ = ui_tx.send(UiEvent::BackendFailed(format!("{STARTUP_FAILED}: {err}")));
                return;
            }
        };

        runtime.block_on(async move {
            let mut board = match connect_board(&settings) {
                Ok(board) => board,
                Err(err) => {
                    tracing::error!("failed to create station api client: {err}");
                    let _ = ui_tx.send(UiEvent::BackendFailed(format!("{STARTUP_FAILED}: {err}")));
                    return;
                }
            };
            tracing::info!(api_base_url = %settings.api_base_url, "backend worker ready");

            let _ = board.fetch_all().await;
            if ui_tx.send(UiEvent::Loaded(board.snapshot())).is_err() {
                return;
            }

            while let Ok(cmd) = cmd_rx.recv() {
                tracing::debug!(command = cmd.name(), "executing ui command");
                execute(&mut board, cmd).await;
                if ui_tx
                    .send(UiEvent::CommandCompleted(board.snapshot()))
                    .is_err()
                {
                    break;
                }
            }
            tracing::info!("ui disconnected; backend worker stopping");
        });
    });
}

async fn execute(board: &mut StationBoard, cmd: BackendCommand) {
    match cmd {
        BackendCommand::SubmitVolume { station_id, draft } => {
            board.set_draft(station_id, draft);
            board.submit_volume(station_id).await;
        }
        BackendCommand::SubmitCollectionStatus {
            collection_request_id,
            status,
        } => {
            board
                .submit_collection_status(collection_request_id, status)
                .await;
        }
    }
}
