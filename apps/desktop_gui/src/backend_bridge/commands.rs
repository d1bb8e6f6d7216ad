//! Backend commands queued from UI to backend worker.

use shared::domain::{CollectionRequestId, CollectionStatus, StationId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCommand {
    SubmitVolume {
        station_id: StationId,
        draft: String,
    },
    SubmitCollectionStatus {
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    },
}

impl BackendCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubmitVolume { .. } => "submit_volume",
            Self::SubmitCollectionStatus { .. } => "submit_collection_status",
        }
    }
}
