mod output;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use client_core::{config::normalize_base_url, connect_board, load_settings, ActionOutcome};
use shared::domain::{CollectionRequestId, CollectionStatus, StationId};

#[derive(Parser, Debug)]
#[command(about = "Monitor collection stations and act on their pending requests")]
struct Cli {
    /// Overrides the configured API base URL, e.g. http://127.0.0.1:8000/api
    #[arg(long)]
    api_url: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show every station with its volume and collection request.
    List,
    /// Submit a new volume reading for a station.
    SetVolume { station_id: i64, volume: String },
    /// Confirm an open collection request.
    Confirm { collection_request_id: i64 },
    /// Cancel an open collection request.
    Cancel { collection_request_id: i64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter("info")
        .with_writer(std::io::stderr)
        .init();
    let cli = Cli::parse();

    let mut settings = load_settings().context("failed to load board settings")?;
    if let Some(api_url) = cli.api_url {
        settings.api_base_url = normalize_base_url(&api_url)?;
    }

    let mut board = connect_board(&settings)?;
    if let Err(err) = board.fetch_all().await {
        report(&board);
        return Err(err).context("could not load stations");
    }

    let outcome = match cli.command {
        Command::List => None,
        Command::SetVolume { station_id, volume } => {
            board.set_draft(StationId(station_id), volume);
            Some(board.submit_volume(StationId(station_id)).await)
        }
        Command::Confirm {
            collection_request_id,
        } => Some(
            board
                .submit_collection_status(
                    CollectionRequestId(collection_request_id),
                    CollectionStatus::Confirmed,
                )
                .await,
        ),
        Command::Cancel {
            collection_request_id,
        } => Some(
            board
                .submit_collection_status(
                    CollectionRequestId(collection_request_id),
                    CollectionStatus::Canceled,
                )
                .await,
        ),
    };

    report(&board);
    print!("{}", output::render_stations(board.stations()));

    match outcome {
        None | Some(ActionOutcome::Applied) => Ok(()),
        Some(ActionOutcome::Rejected(err)) => bail!("rejected: {err}"),
        Some(ActionOutcome::Failed(err)) => Err(err).context("station server rejected the update"),
    }
}

fn report(board: &client_core::StationBoard) {
    if let Some(notification) = board.notifications().latest() {
        println!("{}", output::render_notification(notification));
    }
}
