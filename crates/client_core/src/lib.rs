//! Client side of the station board: the REST collaborator, the optimistic
//! update state machine, and operator notifications.

pub mod board;
pub mod config;
pub mod error;
pub mod messages;
pub mod notification;
pub mod transport;

pub use board::{
    ActionOutcome, BoardSnapshot, BoardStatus, DraftInputs, StationBoard, StationStore, SyncPhase,
};
pub use config::{load_settings, BoardSettings};
pub use error::{BoardError, TransportError};
pub use notification::{Notification, NotificationChannel, Severity};
pub use transport::{HttpStationApi, StationApi};

use std::sync::Arc;

/// Board wired to the HTTP collaborator described by `settings`.
pub fn connect_board(settings: &BoardSettings) -> Result<StationBoard, TransportError> {
    let api = HttpStationApi::with_timeout(&settings.api_base_url, settings.request_timeout())
        .map_err(|source| TransportError::Client {
            base_url: settings.api_base_url.clone(),
            source,
        })?;
    Ok(StationBoard::with_notification_timeout(
        Arc::new(api),
        settings.notification_timeout(),
    ))
}
