use shared::error::ValidationError;
use thiserror::Error;

/// Any failure talking to the station server.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to build http client for {base_url}: {source}")]
    Client {
        base_url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} failed: {source}")]
    Request {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {path} returned status {status}")]
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    #[error("invalid response body from {method} {path}: {source}")]
    Decode {
        method: &'static str,
        path: String,
        #[source]
        source: reqwest::Error,
    },
}

#[derive(Debug, Error)]
pub enum BoardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}
