use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response};
use shared::{
    domain::{CollectionRequestId, CollectionStatus, StationId},
    protocol::{Station, UpdateCollectionStatusRequest, UpdateVolumeRequest},
};
use tracing::debug;

use crate::error::TransportError;

/// REST collaborator the board talks to. Response bodies of the two PATCH calls
/// are ignored because every mutation is followed by a full refetch.
#[async_trait]
pub trait StationApi: Send + Sync {
    async fn list_stations(&self) -> Result<Vec<Station>, TransportError>;
    async fn update_volume(&self, station_id: StationId, volume: &str)
        -> Result<(), TransportError>;
    async fn update_collection_status(
        &self,
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    ) -> Result<(), TransportError>;
}

pub fn station_list_path() -> String {
    "/station/".to_string()
}

pub fn station_path(station_id: StationId) -> String {
    format!("/station/{station_id}/")
}

pub fn collection_request_path(collection_request_id: CollectionRequestId) -> String {
    format!("/collection-request/{collection_request_id}/")
}

pub struct HttpStationApi {
    http: Client,
    base_url: String,
}

impl HttpStationApi {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, reqwest::Error> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self::with_client(builder.build()?, base_url))
    }

    pub fn with_client(http: Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send<B: serde::Serialize + ?Sized>(
        &self,
        method: Method,
        path: String,
        body: Option<&B>,
    ) -> Result<(Response, &'static str, String), TransportError> {
        let method_name = method_label(&method);
        let mut request = self
            .http
            .request(method, format!("{}{path}", self.base_url));
        if let Some(body) = body {
            request = request.json(body);
        }

        debug!(method = method_name, path = %path, "sending station api request");
        let response = request
            .send()
            .await
            .map_err(|source| TransportError::Request {
                method: method_name,
                path: path.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status {
                method: method_name,
                path,
                status: status.as_u16(),
            });
        }

        Ok((response, method_name, path))
    }
}

fn method_label(method: &Method) -> &'static str {
    if *method == Method::GET {
        "GET"
    } else if *method == Method::PATCH {
        "PATCH"
    } else {
        "REQUEST"
    }
}

#[async_trait]
impl StationApi for HttpStationApi {
    async fn list_stations(&self) -> Result<Vec<Station>, TransportError> {
        let (response, method, path) = self
            .send::<()>(Method::GET, station_list_path(), None)
            .await?;
        response
            .json()
            .await
            .map_err(|source| TransportError::Decode {
                method,
                path,
                source,
            })
    }

    async fn update_volume(
        &self,
        station_id: StationId,
        volume: &str,
    ) -> Result<(), TransportError> {
        let body = UpdateVolumeRequest {
            volume: volume.to_string(),
        };
        self.send(Method::PATCH, station_path(station_id), Some(&body))
            .await?;
        Ok(())
    }

    async fn update_collection_status(
        &self,
        collection_request_id: CollectionRequestId,
        status: CollectionStatus,
    ) -> Result<(), TransportError> {
        let body = UpdateCollectionStatusRequest { status };
        self.send(
            Method::PATCH,
            collection_request_path(collection_request_id),
            Some(&body),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod tests;
