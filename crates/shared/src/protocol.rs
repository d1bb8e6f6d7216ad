use serde::{Deserialize, Deserializer, Serialize};

use crate::domain::{
    CollectionRequestId, CollectionStatus, StationId, NO_COLLECTION_REQUEST_LABEL,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionRequest {
    pub id: CollectionRequestId,
    pub status: CollectionStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub id: StationId,
    pub name: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub capacity: f64,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub volume: f64,
    #[serde(default)]
    pub collection_request: Option<CollectionRequest>,
}

impl Station {
    pub fn has_open_collection_request(&self) -> bool {
        self.collection_request
            .as_ref()
            .is_some_and(|request| request.status == CollectionStatus::Open)
    }
}

/// Body of `PATCH /station/{id}/`. The volume travels as the operator typed it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateVolumeRequest {
    pub volume: String,
}

/// Body of `PATCH /collection-request/{id}/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCollectionStatusRequest {
    pub status: CollectionStatus,
}

/// Label shown next to "Pedido de Coleta".
///
/// Any existing request is labelled as open, whatever its status.
pub fn collection_request_label(request: Option<&CollectionRequest>) -> &'static str {
    match request {
        Some(_) => CollectionStatus::Open.label(),
        None => NO_COLLECTION_REQUEST_LABEL,
    }
}

/// Decimal fields may arrive as JSON numbers or as strings such as `"40.00"`.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(value) => Ok(value),
        Raw::Text(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite())
            .ok_or_else(|| {
                <D::Error as serde::de::Error>::custom(format!("invalid decimal value {text:?}"))
            }),
    }
}
