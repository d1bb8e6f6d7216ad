//! Plain-text rendering of the board for the terminal.

use client_core::{Notification, Severity};
use shared::protocol::{collection_request_label, Station};

pub fn render_stations(stations: &[Station]) -> String {
    if stations.is_empty() {
        return "Nenhuma estação cadastrada.\n".to_string();
    }

    let mut out = String::from("Controle de Volumes\n===================\n");
    for station in stations {
        out.push_str(&render_station(station));
    }
    out
}

fn render_station(station: &Station) -> String {
    let mut line = format!(
        "[{}] {}\n    Volume Atual: {}% (capacidade {})\n    Pedido de Coleta: {}",
        station.id,
        station.name,
        station.volume,
        station.capacity,
        collection_request_label(station.collection_request.as_ref()),
    );
    if let Some(request) = station
        .collection_request
        .as_ref()
        .filter(|_| station.has_open_collection_request())
    {
        line.push_str(&format!(" (pedido #{})", request.id));
    }
    line.push('\n');
    line
}

pub fn render_notification(notification: &Notification) -> String {
    let tag = match notification.severity {
        Severity::Success => "ok",
        Severity::Error => "erro",
    };
    format!("[{tag}] {}", notification.message)
}
