//! UI-side copy of the board, updated from backend snapshots and local edits.

use std::{collections::HashMap, time::Instant};

use client_core::{BoardSnapshot, BoardStatus, Notification};
use shared::{domain::StationId, protocol::Station};

use crate::backend_bridge::commands::BackendCommand;
use crate::controller::events::UiEvent;

#[derive(Debug, Default)]
pub struct BoardView {
    pub stations: Vec<Station>,
    pub drafts: HashMap<StationId, String>,
    awaiting_first_load: bool,
    awaiting_backend: bool,
    status: Option<BoardStatus>,
    notification: Option<Notification>,
    dismissed_sequence: Option<u64>,
    fetch_generation: u64,
    last_submitted_station: Option<StationId>,
    pub backend_error: Option<String>,
}

impl BoardView {
    pub fn new() -> Self {
        Self {
            awaiting_first_load: true,
            ..Self::default()
        }
    }

    /// True while any mutating action is queued or running; gates every submit control.
    pub fn in_flight(&self) -> bool {
        self.awaiting_backend || self.status.as_ref().is_some_and(BoardStatus::in_flight)
    }

    /// True before the first snapshot and while the backend is fetching stations.
    pub fn is_loading(&self) -> bool {
        self.awaiting_first_load || self.status.as_ref().is_some_and(BoardStatus::is_loading)
    }

    pub fn draft_mut(&mut self, station_id: StationId) -> &mut String {
        self.drafts.entry(station_id).or_default()
    }

    pub fn apply(&mut self, event: UiEvent) {
        match event {
            UiEvent::Loaded(snapshot) => self.apply_snapshot(snapshot),
            UiEvent::CommandCompleted(snapshot) => {
                self.awaiting_backend = false;
                self.apply_snapshot(snapshot);
            }
            UiEvent::BackendFailed(message) => {
                self.awaiting_first_load = false;
                self.awaiting_backend = false;
                self.backend_error = Some(message);
            }
        }
    }

    fn apply_snapshot(&mut self, snapshot: BoardSnapshot) {
        if snapshot.fetch_generation != self.fetch_generation {
            // A fresh server read resets every draft, as on the board itself.
            self.drafts = snapshot.drafts;
            self.fetch_generation = snapshot.fetch_generation;
        } else if let Some(station_id) = self.last_submitted_station {
            if let Some(draft) = snapshot.drafts.get(&station_id) {
                self.drafts.insert(station_id, draft.clone());
            }
        }
        self.last_submitted_station = None;
        self.stations = snapshot.stations;
        self.awaiting_first_load = false;
        self.status = Some(snapshot.status);
        if snapshot.notification.as_ref().map(|n| n.sequence)
            != self.notification.as_ref().map(|n| n.sequence)
        {
            self.notification = snapshot.notification;
        }
    }

    /// Records that `cmd` was queued so controls disable before the backend answers.
    pub fn mark_queued(&mut self, cmd: &BackendCommand) {
        if let BackendCommand::SubmitVolume { station_id, .. } = cmd {
            self.last_submitted_station = Some(*station_id);
        }
        self.awaiting_backend = true;
    }

    pub fn visible_notification(&self, now: Instant) -> Option<&Notification> {
        self.notification.as_ref().filter(|notification| {
            !notification.is_expired(now) && self.dismissed_sequence != Some(notification.sequence)
        })
    }

    pub fn dismiss_notification(&mut self) {
        self.dismissed_sequence = self.notification.as_ref().map(|n| n.sequence);
    }
}
