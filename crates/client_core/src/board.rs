use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, AtomicU8, Ordering},
        Arc,
    },
    time::Duration,
};

use shared::{
    domain::{CollectionRequestId, CollectionStatus, StationId},
    error::{validate_volume, ValidationError},
    protocol::{CollectionRequest, Station},
};
use tracing::{debug, info, warn};

use crate::{
    error::{BoardError, TransportError},
    messages,
    notification::{Notification, NotificationChannel, DEFAULT_AUTO_HIDE},
    transport::StationApi,
};

/// Where the board is in a fetch or a mutating action. The refetch that closes
/// an action keeps `OptimisticPatch` or `NotifyError`; `Refreshing` is a
/// standalone fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum SyncPhase {
    Idle,
    Validating,
    InFlight,
    OptimisticPatch,
    NotifyError,
    Refreshing,
}

impl SyncPhase {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Validating,
            2 => Self::InFlight,
            3 => Self::OptimisticPatch,
            4 => Self::NotifyError,
            5 => Self::Refreshing,
            _ => Self::Idle,
        }
    }
}

#[derive(Debug, Default)]
struct StatusCells {
    in_flight: AtomicBool,
    loading: AtomicBool,
    phase: AtomicU8,
}

/// Live view of the board's in-flight gate, loading flag and phase.
///
/// Handlers hold `&mut StationBoard` across their awaits, so renderers and
/// observers read these through a cloned handle instead.
#[derive(Debug, Clone, Default)]
pub struct BoardStatus(Arc<StatusCells>);

impl BoardStatus {
    /// Board-wide gate for mutating actions.
    pub fn in_flight(&self) -> bool {
        self.0.in_flight.load(Ordering::SeqCst)
    }

    /// True for the whole of every station fetch.
    pub fn is_loading(&self) -> bool {
        self.0.loading.load(Ordering::SeqCst)
    }

    pub fn phase(&self) -> SyncPhase {
        SyncPhase::from_raw(self.0.phase.load(Ordering::SeqCst))
    }

    fn set_in_flight(&self, value: bool) {
        self.0.in_flight.store(value, Ordering::SeqCst);
    }

    fn set_loading(&self, value: bool) {
        self.0.loading.store(value, Ordering::SeqCst);
    }

    fn set_phase(&self, phase: SyncPhase) {
        self.0.phase.store(phase as u8, Ordering::SeqCst);
    }
}

#[derive(Debug)]
pub enum ActionOutcome {
    /// Input never left the client.
    Rejected(ValidationError),
    Applied,
    Failed(TransportError),
}

impl ActionOutcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }

    pub fn into_result(self) -> Result<(), BoardError> {
        match self {
            Self::Applied => Ok(()),
            Self::Rejected(err) => Err(err.into()),
            Self::Failed(err) => Err(err.into()),
        }
    }
}

/// Station records as last reported by the server, in server order.
#[derive(Debug, Clone, Default)]
pub struct StationStore {
    stations: Vec<Station>,
}

impl StationStore {
    pub fn replace(&mut self, stations: Vec<Station>) {
        self.stations = stations;
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn get(&self, station_id: StationId) -> Option<&Station> {
        self.stations.iter().find(|station| station.id == station_id)
    }

    fn patch_volume(&mut self, station_id: StationId, volume: f64) -> bool {
        match self
            .stations
            .iter_mut()
            .find(|station| station.id == station_id)
        {
            Some(station) => {
                station.volume = volume;
                true
            }
            None => false,
        }
    }

    /// Confirmed requests disappear from the station; any other status is kept in place.
    fn patch_collection_request(
        &mut self,
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    ) -> bool {
        let Some(station) = self.stations.iter_mut().find(|station| {
            station
                .collection_request
                .as_ref()
                .is_some_and(|request| request.id == collection_request_id)
        }) else {
            return false;
        };

        station.collection_request = match status {
            CollectionStatus::Confirmed => None,
            status => Some(CollectionRequest {
                id: collection_request_id,
                status,
            }),
        };
        true
    }
}

#[derive(Debug, Clone, Default)]
pub struct DraftInputs {
    drafts: HashMap<StationId, String>,
}

impl DraftInputs {
    fn reset_for(&mut self, stations: &[Station]) {
        self.drafts = stations
            .iter()
            .map(|station| (station.id, String::new()))
            .collect();
    }

    pub fn set(&mut self, station_id: StationId, text: impl Into<String>) {
        self.drafts.insert(station_id, text.into());
    }

    pub fn get(&self, station_id: StationId) -> &str {
        self.drafts
            .get(&station_id)
            .map(String::as_str)
            .unwrap_or_default()
    }

    fn clear(&mut self, station_id: StationId) {
        self.drafts.insert(station_id, String::new());
    }

    pub fn as_map(&self) -> &HashMap<StationId, String> {
        &self.drafts
    }
}

/// Owned copy of the board for a renderer on another thread.
#[derive(Debug, Clone)]
pub struct BoardSnapshot {
    pub stations: Vec<Station>,
    pub drafts: HashMap<StationId, String>,
    pub notification: Option<Notification>,
    /// Shared with the board, so it keeps tracking later actions.
    pub status: BoardStatus,
    /// Bumped by every successful fetch.
    pub fetch_generation: u64,
}

/// Client-side view of the stations plus the optimistic-update state machine.
///
/// Every mutating action ends with a full refetch, so the server always wins.
pub struct StationBoard {
    api: Arc<dyn StationApi>,
    store: StationStore,
    drafts: DraftInputs,
    notifications: NotificationChannel,
    status: BoardStatus,
    fetch_generation: u64,
}

impl StationBoard {
    pub fn new(api: Arc<dyn StationApi>) -> Self {
        Self::with_notification_timeout(api, DEFAULT_AUTO_HIDE)
    }

    pub fn with_notification_timeout(api: Arc<dyn StationApi>, auto_hide: Duration) -> Self {
        Self {
            api,
            store: StationStore::default(),
            drafts: DraftInputs::default(),
            notifications: NotificationChannel::new(auto_hide),
            status: BoardStatus::default(),
            fetch_generation: 0,
        }
    }

    pub fn stations(&self) -> &[Station] {
        self.store.stations()
    }

    pub fn station(&self, station_id: StationId) -> Option<&Station> {
        self.store.get(station_id)
    }

    pub fn draft(&self, station_id: StationId) -> &str {
        self.drafts.get(station_id)
    }

    pub fn set_draft(&mut self, station_id: StationId, text: impl Into<String>) {
        self.drafts.set(station_id, text);
    }

    pub fn in_flight(&self) -> bool {
        self.status.in_flight()
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading()
    }

    pub fn phase(&self) -> SyncPhase {
        self.status.phase()
    }

    pub fn status(&self) -> BoardStatus {
        self.status.clone()
    }

    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }

    pub fn notifications(&self) -> &NotificationChannel {
        &self.notifications
    }

    pub fn notifications_mut(&mut self) -> &mut NotificationChannel {
        &mut self.notifications
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot {
            stations: self.store.stations().to_vec(),
            drafts: self.drafts.as_map().clone(),
            notification: self.notifications.latest().cloned(),
            status: self.status.clone(),
            fetch_generation: self.fetch_generation,
        }
    }

    fn enter(&self, phase: SyncPhase) {
        debug!(from = ?self.status.phase(), to = ?phase, "board phase transition");
        self.status.set_phase(phase);
    }

    /// Replaces the store wholesale and resets every draft. On failure the
    /// previous stations stay untouched.
    pub async fn fetch_all(&mut self) -> Result<(), TransportError> {
        if !self.status.in_flight() {
            self.enter(SyncPhase::Refreshing);
        }
        self.status.set_loading(true);

        let result = self.api.list_stations().await;
        let result = match result {
            Ok(stations) => {
                info!(count = stations.len(), "station list refreshed");
                self.drafts.reset_for(&stations);
                self.store.replace(stations);
                self.fetch_generation += 1;
                Ok(())
            }
            Err(err) => {
                warn!(error = %err, "failed to fetch stations");
                self.notifications.error(messages::FETCH_FAILED);
                Err(err)
            }
        };

        self.status.set_loading(false);
        if !self.status.in_flight() {
            self.enter(SyncPhase::Idle);
        }
        result
    }

    pub async fn submit_volume(&mut self, station_id: StationId) -> ActionOutcome {
        self.enter(SyncPhase::Validating);

        let Some(capacity) = self.store.get(station_id).map(|station| station.capacity) else {
            return self.reject(ValidationError::UnknownStation(station_id));
        };
        let draft = self.drafts.get(station_id).trim().to_string();
        let volume = match validate_volume(&draft, capacity) {
            Ok(volume) => volume,
            Err(err) => return self.reject(err),
        };

        self.begin_in_flight();
        let outcome = match self.api.update_volume(station_id, &draft).await {
            Ok(()) => {
                self.enter(SyncPhase::OptimisticPatch);
                self.store.patch_volume(station_id, volume);
                self.drafts.clear(station_id);
                self.notifications.success(messages::VOLUME_UPDATED);
                info!(station_id = station_id.0, volume, "station volume updated");
                ActionOutcome::Applied
            }
            Err(err) => {
                self.enter(SyncPhase::NotifyError);
                warn!(station_id = station_id.0, error = %err, "failed to update station volume");
                self.notifications.error(messages::VOLUME_UPDATE_FAILED);
                ActionOutcome::Failed(err)
            }
        };
        self.finish_in_flight().await;
        outcome
    }

    pub async fn submit_collection_status(
        &mut self,
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    ) -> ActionOutcome {
        self.enter(SyncPhase::Validating);
        self.begin_in_flight();

        let outcome = match self
            .api
            .update_collection_status(collection_request_id, status)
            .await
        {
            Ok(()) => {
                self.enter(SyncPhase::OptimisticPatch);
                if !self
                    .store
                    .patch_collection_request(collection_request_id, status)
                {
                    debug!(
                        collection_request_id = collection_request_id.0,
                        "no local station carries this collection request"
                    );
                }
                self.notifications
                    .success(messages::collection_status_updated(status));
                info!(
                    collection_request_id = collection_request_id.0,
                    status = status.wire_value(),
                    "collection request status updated"
                );
                ActionOutcome::Applied
            }
            Err(err) => {
                self.enter(SyncPhase::NotifyError);
                warn!(
                    collection_request_id = collection_request_id.0,
                    error = %err,
                    "failed to update collection request status"
                );
                self.notifications.error(messages::COLLECTION_UPDATE_FAILED);
                ActionOutcome::Failed(err)
            }
        };
        self.finish_in_flight().await;
        outcome
    }

    fn reject(&mut self, err: ValidationError) -> ActionOutcome {
        debug!(error = %err, "rejected operator input");
        self.notifications.error(err.to_string());
        self.enter(SyncPhase::Idle);
        ActionOutcome::Rejected(err)
    }

    fn begin_in_flight(&self) {
        self.status.set_in_flight(true);
        self.enter(SyncPhase::InFlight);
    }

    async fn finish_in_flight(&mut self) {
        // Refetch errors were already surfaced as a notification.
        let _ = self.fetch_all().await;
        self.status.set_in_flight(false);
        self.enter(SyncPhase::Idle);
    }
}

#[cfg(test)]
#[path = "tests/board_tests.rs"]
mod tests;
