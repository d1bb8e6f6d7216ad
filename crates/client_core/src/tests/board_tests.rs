use super::*;
use async_trait::async_trait;
use shared::protocol::CollectionRequest;
use std::sync::{atomic::AtomicBool, Mutex};

use crate::{messages, notification::Severity, transport::StationApi};

/// Board status as sampled when a call reaches the fake server.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Seen {
    in_flight: bool,
    loading: bool,
    phase: SyncPhase,
}

const fn seen(in_flight: bool, loading: bool, phase: SyncPhase) -> Seen {
    Seen {
        in_flight,
        loading,
        phase,
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Call {
    ListStations {
        seen: Seen,
    },
    UpdateVolume {
        station_id: StationId,
        volume: String,
        seen: Seen,
    },
    UpdateCollectionStatus {
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
        seen: Seen,
    },
}

struct FakeStationApi {
    server_stations: Mutex<Vec<Station>>,
    calls: Mutex<Vec<Call>>,
    status: Mutex<Option<BoardStatus>>,
    fail_lists: AtomicBool,
    fail_mutations: AtomicBool,
    apply_mutations: AtomicBool,
}

impl FakeStationApi {
    fn new(stations: Vec<Station>) -> Arc<Self> {
        Arc::new(Self {
            server_stations: Mutex::new(stations),
            calls: Mutex::new(Vec::new()),
            status: Mutex::new(None),
            fail_lists: AtomicBool::new(false),
            fail_mutations: AtomicBool::new(false),
            apply_mutations: AtomicBool::new(true),
        })
    }

    fn observe(&self, status: BoardStatus) {
        *self.status.lock().unwrap() = Some(status);
    }

    fn seen_now(&self) -> Seen {
        match self.status.lock().unwrap().as_ref() {
            Some(status) => seen(status.in_flight(), status.is_loading(), status.phase()),
            None => seen(false, false, SyncPhase::Idle),
        }
    }

    fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn unavailable(method: &'static str, path: String) -> TransportError {
        TransportError::Status {
            method,
            path,
            status: 503,
        }
    }
}

#[async_trait]
impl StationApi for FakeStationApi {
    async fn list_stations(&self) -> Result<Vec<Station>, TransportError> {
        self.record(Call::ListStations {
            seen: self.seen_now(),
        });
        if self.fail_lists.load(Ordering::SeqCst) {
            return Err(Self::unavailable("GET", "/station/".to_string()));
        }
        Ok(self.server_stations.lock().unwrap().clone())
    }

    async fn update_volume(
        &self,
        station_id: StationId,
        volume: &str,
    ) -> Result<(), TransportError> {
        self.record(Call::UpdateVolume {
            station_id,
            volume: volume.to_string(),
            seen: self.seen_now(),
        });
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::unavailable("PATCH", format!("/station/{station_id}/")));
        }
        if self.apply_mutations.load(Ordering::SeqCst) {
            let parsed: f64 = volume.parse().unwrap();
            for station in self.server_stations.lock().unwrap().iter_mut() {
                if station.id == station_id {
                    station.volume = parsed;
                }
            }
        }
        Ok(())
    }

    async fn update_collection_status(
        &self,
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    ) -> Result<(), TransportError> {
        self.record(Call::UpdateCollectionStatus {
            collection_request_id,
            status,
            seen: self.seen_now(),
        });
        if self.fail_mutations.load(Ordering::SeqCst) {
            return Err(Self::unavailable(
                "PATCH",
                format!("/collection-request/{collection_request_id}/"),
            ));
        }
        if self.apply_mutations.load(Ordering::SeqCst) {
            for station in self.server_stations.lock().unwrap().iter_mut() {
                if station
                    .collection_request
                    .as_ref()
                    .is_some_and(|request| request.id == collection_request_id)
                {
                    station.collection_request = None;
                }
            }
        }
        Ok(())
    }
}

fn station(id: i64, capacity: f64, volume: f64, request: Option<(i64, CollectionStatus)>) -> Station {
    Station {
        id: StationId(id),
        name: format!("Ecoponto {id}"),
        capacity,
        volume,
        collection_request: request.map(|(id, status)| CollectionRequest {
            id: CollectionRequestId(id),
            status,
        }),
    }
}

fn sample_stations() -> Vec<Station> {
    vec![
        station(5, 100.0, 40.0, Some((9, CollectionStatus::Open))),
        station(6, 80.0, 10.0, None),
    ]
}

async fn loaded_board(api: &Arc<FakeStationApi>) -> StationBoard {
    let mut board = StationBoard::new(api.clone());
    api.observe(board.status());
    board.fetch_all().await.expect("initial fetch");
    api.clear_calls();
    board
}

fn latest_message(board: &StationBoard) -> (String, Severity) {
    let notification = board.notifications().latest().expect("notification");
    (notification.message.clone(), notification.severity)
}

#[tokio::test]
async fn fetch_all_replaces_store_and_resets_drafts() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "77");

    *api.server_stations.lock().unwrap() = vec![station(6, 80.0, 55.0, None)];
    board.fetch_all().await.expect("refetch");

    assert_eq!(board.stations().len(), 1);
    assert!(board.station(StationId(5)).is_none());
    assert_eq!(board.station(StationId(6)).expect("station 6").volume, 55.0);
    assert_eq!(board.draft(StationId(6)), "");
    assert_eq!(board.draft(StationId(5)), "");
    assert!(!board.is_loading());
    assert_eq!(board.phase(), SyncPhase::Idle);
    assert!(board.notifications().latest().is_none());
}

#[tokio::test]
async fn failed_fetch_keeps_previous_stations_and_notifies() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "12");
    api.fail_lists.store(true, Ordering::SeqCst);

    let err = board.fetch_all().await.expect_err("fetch must fail");

    assert!(matches!(err, TransportError::Status { status: 503, .. }));
    assert_eq!(board.stations(), sample_stations().as_slice());
    assert_eq!(board.draft(StationId(5)), "12");
    assert_eq!(
        latest_message(&board),
        (messages::FETCH_FAILED.to_string(), Severity::Error)
    );
    assert!(!board.is_loading());
}

#[tokio::test]
async fn out_of_range_volume_never_reaches_the_network() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "150");

    let outcome = board.submit_volume(StationId(5)).await;

    assert!(matches!(
        outcome,
        ActionOutcome::Rejected(ValidationError::OutOfRange { .. })
    ));
    assert!(api.calls().is_empty());
    assert_eq!(
        latest_message(&board),
        (
            "Por favor, insira um valor entre 0 e 100.".to_string(),
            Severity::Error
        )
    );
    assert_eq!(board.station(StationId(5)).expect("station").volume, 40.0);
    assert_eq!(board.draft(StationId(5)), "150");
    assert!(!board.in_flight());
    assert_eq!(board.phase(), SyncPhase::Idle);
}

#[tokio::test]
async fn non_numeric_or_empty_volume_is_rejected() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;

    for draft in ["", "abc", "-3"] {
        board.set_draft(StationId(6), draft);
        let outcome = board.submit_volume(StationId(6)).await;
        assert!(
            matches!(outcome, ActionOutcome::Rejected(_)),
            "draft {draft:?} should be rejected"
        );
        assert_eq!(
            board.notifications().latest().expect("notification").message,
            "Por favor, insira um valor entre 0 e 80."
        );
    }
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn unknown_station_is_rejected_without_request() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;

    let outcome = board.submit_volume(StationId(404)).await;

    assert!(matches!(
        outcome,
        ActionOutcome::Rejected(ValidationError::UnknownStation(StationId(404)))
    ));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn valid_volume_patches_once_then_refetches_once_while_in_flight() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "60");

    let outcome = board.submit_volume(StationId(5)).await;

    assert!(outcome.is_applied());
    assert_eq!(
        api.calls(),
        vec![
            Call::UpdateVolume {
                station_id: StationId(5),
                volume: "60".to_string(),
                seen: seen(true, false, SyncPhase::InFlight),
            },
            Call::ListStations {
                seen: seen(true, true, SyncPhase::OptimisticPatch),
            },
        ]
    );
    assert!(!board.in_flight());
    assert_eq!(board.phase(), SyncPhase::Idle);
    assert_eq!(board.station(StationId(5)).expect("station").volume, 60.0);
    assert_eq!(board.draft(StationId(5)), "");
    assert_eq!(
        latest_message(&board),
        (messages::VOLUME_UPDATED.to_string(), Severity::Success)
    );
}

#[tokio::test]
async fn draft_is_sent_trimmed() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(6), "  25 ");

    board.submit_volume(StationId(6)).await.into_result().expect("applied");

    assert!(matches!(
        api.calls().first(),
        Some(Call::UpdateVolume { volume, .. }) if volume == "25"
    ));
}

#[tokio::test]
async fn refetched_server_state_overrides_optimistic_volume() {
    let api = FakeStationApi::new(sample_stations());
    api.apply_mutations.store(false, Ordering::SeqCst);
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "60");

    board.submit_volume(StationId(5)).await;

    assert_eq!(board.station(StationId(5)).expect("station").volume, 40.0);
}

#[tokio::test]
async fn optimistic_volume_survives_when_refetch_fails() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "60");
    api.fail_lists.store(true, Ordering::SeqCst);

    let outcome = board.submit_volume(StationId(5)).await;

    assert!(outcome.is_applied());
    assert_eq!(board.station(StationId(5)).expect("station").volume, 60.0);
    assert_eq!(board.draft(StationId(5)), "");
    // Refetch failure is the last notification and wins.
    assert_eq!(
        latest_message(&board),
        (messages::FETCH_FAILED.to_string(), Severity::Error)
    );
    assert!(!board.in_flight());
}

#[tokio::test]
async fn failed_volume_update_notifies_and_still_refetches() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(5), "60");
    api.fail_mutations.store(true, Ordering::SeqCst);

    let outcome = board.submit_volume(StationId(5)).await;

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    assert_eq!(api.calls().len(), 2);
    assert_eq!(
        api.calls()[1],
        Call::ListStations {
            seen: seen(true, true, SyncPhase::NotifyError),
        }
    );
    assert_eq!(board.station(StationId(5)).expect("station").volume, 40.0);
    assert_eq!(board.draft(StationId(5)), "");
    assert_eq!(
        latest_message(&board),
        (messages::VOLUME_UPDATE_FAILED.to_string(), Severity::Error)
    );
    assert!(!board.in_flight());
    assert_eq!(board.phase(), SyncPhase::Idle);
}

#[tokio::test]
async fn confirming_clears_collection_request_before_refetch() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    api.fail_lists.store(true, Ordering::SeqCst);

    let outcome = board
        .submit_collection_status(CollectionRequestId(9), CollectionStatus::Confirmed)
        .await;

    assert!(outcome.is_applied());
    assert_eq!(
        api.calls(),
        vec![
            Call::UpdateCollectionStatus {
                collection_request_id: CollectionRequestId(9),
                status: CollectionStatus::Confirmed,
                seen: seen(true, false, SyncPhase::InFlight),
            },
            Call::ListStations {
                seen: seen(true, true, SyncPhase::OptimisticPatch),
            },
        ]
    );
    assert!(board
        .station(StationId(5))
        .expect("station")
        .collection_request
        .is_none());
    assert!(!board.in_flight());
}

#[tokio::test]
async fn canceling_marks_request_canceled_before_refetch() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    api.fail_lists.store(true, Ordering::SeqCst);

    board
        .submit_collection_status(CollectionRequestId(9), CollectionStatus::Canceled)
        .await;

    assert_eq!(
        board.station(StationId(5)).expect("station").collection_request,
        Some(CollectionRequest {
            id: CollectionRequestId(9),
            status: CollectionStatus::Canceled,
        })
    );
}

#[tokio::test]
async fn status_update_notifies_by_status_and_ends_with_server_state() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;

    board
        .submit_collection_status(CollectionRequestId(9), CollectionStatus::Canceled)
        .await;

    assert_eq!(
        latest_message(&board),
        (messages::COLLECTION_CANCELED.to_string(), Severity::Success)
    );
    // The fake server drops the request on any status change; the refetch wins.
    assert!(board
        .station(StationId(5))
        .expect("station")
        .collection_request
        .is_none());

    *api.server_stations.lock().unwrap() = sample_stations();
    board.fetch_all().await.expect("reload");
    board
        .submit_collection_status(CollectionRequestId(9), CollectionStatus::Confirmed)
        .await;
    assert_eq!(
        latest_message(&board),
        (messages::COLLECTION_CONFIRMED.to_string(), Severity::Success)
    );
}

#[tokio::test]
async fn failed_status_update_notifies_error_and_refetches() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    api.fail_mutations.store(true, Ordering::SeqCst);

    let outcome = board
        .submit_collection_status(CollectionRequestId(9), CollectionStatus::Confirmed)
        .await;

    assert!(matches!(outcome, ActionOutcome::Failed(_)));
    assert_eq!(
        api.calls().last(),
        Some(&Call::ListStations {
            seen: seen(true, true, SyncPhase::NotifyError),
        })
    );
    assert_eq!(board.phase(), SyncPhase::Idle);
    assert!(board
        .station(StationId(5))
        .expect("station")
        .has_open_collection_request());
    assert_eq!(
        latest_message(&board),
        (messages::COLLECTION_UPDATE_FAILED.to_string(), Severity::Error)
    );
    assert!(matches!(
        outcome.into_result(),
        Err(BoardError::Transport(TransportError::Status { status: 503, .. }))
    ));
}

#[tokio::test]
async fn snapshot_reflects_board_state() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    board.set_draft(StationId(6), "3");

    let snapshot = board.snapshot();

    assert_eq!(snapshot.stations, sample_stations());
    assert_eq!(snapshot.drafts.get(&StationId(6)).map(String::as_str), Some("3"));
    assert!(!snapshot.status.in_flight());
    assert!(!snapshot.status.is_loading());
    assert!(snapshot.notification.is_none());
    assert_eq!(snapshot.status.phase(), SyncPhase::Idle);
    assert_eq!(snapshot.fetch_generation, 1);
}

#[tokio::test]
async fn standalone_fetch_is_loading_and_refreshing_while_it_runs() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;

    board.fetch_all().await.expect("refetch");

    assert_eq!(
        api.calls(),
        vec![Call::ListStations {
            seen: seen(false, true, SyncPhase::Refreshing),
        }]
    );
    assert!(!board.is_loading());
    assert_eq!(board.phase(), SyncPhase::Idle);
}

#[tokio::test]
async fn failed_standalone_fetch_still_clears_loading() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    api.fail_lists.store(true, Ordering::SeqCst);

    let _ = board.fetch_all().await;

    assert!(matches!(
        api.calls().as_slice(),
        [Call::ListStations { seen }] if seen.loading && seen.phase == SyncPhase::Refreshing
    ));
    assert!(!board.is_loading());
    assert_eq!(board.phase(), SyncPhase::Idle);
}

#[tokio::test]
async fn snapshot_status_tracks_later_actions() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    let snapshot = board.snapshot();
    api.observe(snapshot.status.clone());
    board.set_draft(StationId(6), "20");

    board.submit_volume(StationId(6)).await;

    assert!(matches!(
        api.calls().first(),
        Some(Call::UpdateVolume { seen, .. }) if seen.in_flight && seen.phase == SyncPhase::InFlight
    ));
    assert!(!snapshot.status.in_flight());
}

#[tokio::test]
async fn fetch_generation_counts_successful_fetches_only() {
    let api = FakeStationApi::new(sample_stations());
    let mut board = loaded_board(&api).await;
    assert_eq!(board.fetch_generation(), 1);

    board.set_draft(StationId(5), "500");
    board.submit_volume(StationId(5)).await;
    assert_eq!(board.fetch_generation(), 1);

    board.set_draft(StationId(5), "50");
    board.submit_volume(StationId(5)).await;
    assert_eq!(board.fetch_generation(), 2);

    api.fail_lists.store(true, Ordering::SeqCst);
    let _ = board.fetch_all().await;
    assert_eq!(board.fetch_generation(), 2);
}
