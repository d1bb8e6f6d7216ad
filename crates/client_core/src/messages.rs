//! Operator-facing texts.

use shared::domain::CollectionStatus;

pub const FETCH_FAILED: &str = "Erro ao carregar os dados iniciais.";
pub const VOLUME_UPDATED: &str = "Volume atualizado com sucesso!";
pub const VOLUME_UPDATE_FAILED: &str = "Erro ao atualizar o volume. Tente novamente.";
pub const COLLECTION_CONFIRMED: &str = "Coleta confirmada com sucesso!";
pub const COLLECTION_CANCELED: &str = "Coleta cancelada com sucesso!";
pub const COLLECTION_UPDATE_FAILED: &str =
    "Erro ao atualizar status da coleta. Tente novamente.";

pub fn collection_status_updated(status: CollectionStatus) -> &'static str {
    match status {
        CollectionStatus::Confirmed => COLLECTION_CONFIRMED,
        CollectionStatus::Canceled | CollectionStatus::Open => COLLECTION_CANCELED,
    }
}
