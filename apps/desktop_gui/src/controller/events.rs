//! Events sent from the backend worker to the UI thread.

use client_core::BoardSnapshot;

#[derive(Debug, Clone)]
pub enum UiEvent {
    /// Initial load finished (successfully or not).
    Loaded(BoardSnapshot),
    /// A queued command ran to completion, including its refetch.
    CommandCompleted(BoardSnapshot),
    BackendFailed(String),
}
