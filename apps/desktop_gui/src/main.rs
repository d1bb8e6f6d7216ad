mod backend_bridge;
mod controller;
mod ui;

use clap::Parser;
use client_core::{config::normalize_base_url, load_settings, BoardSettings};
use crossbeam_channel::bounded;
use eframe::egui;

use backend_bridge::commands::BackendCommand;
use controller::events::UiEvent;
use ui::StationBoardApp;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured API base URL.
    #[arg(long)]
    api_url: Option<String>,
}

fn resolve_settings(api_url: Option<String>) -> BoardSettings {
    let mut settings = match load_settings() {
        Ok(settings) => settings,
        Err(err) => {
            tracing::warn!("falling back to default board settings: {err:#}");
            BoardSettings::default()
        }
    };
    if let Some(api_url) = api_url {
        match normalize_base_url(&api_url) {
            Ok(url) => settings.api_base_url = url,
            Err(err) => tracing::warn!("ignoring --api-url: {err:#}"),
        }
    }
    settings
}

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();
    let args = Args::parse();
    let settings = resolve_settings(args.api_url);

    let (cmd_tx, cmd_rx) = bounded::<BackendCommand>(64);
    let (ui_tx, ui_rx) = bounded::<UiEvent>(256);
    backend_bridge::runtime::launch(settings, cmd_rx, ui_tx);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Controle de Volumes")
            .with_inner_size([720.0, 820.0])
            .with_min_inner_size([420.0, 480.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Controle de Volumes",
        options,
        Box::new(|_cc| Ok(Box::new(StationBoardApp::new(cmd_tx, ui_rx)))),
    )
}
