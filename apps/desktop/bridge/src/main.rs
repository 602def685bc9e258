use bridge::cli::Args;
use bridge::console::{self, Command, Outcome};
use bridge::error::BridgeError;
use bridge::logger::initialize as LoggerInitialize;

use sync_core::events::BridgeEvent;
use sync_core::settings::Settings;
use sync_core::store::ConfigState;
use sync_core::transport::start_listener;

use common::ErrorLocation;

use std::fs::create_dir_all;

use clap::Parser;
use log::{error, info, warn};
use tokio::io::{AsyncBufReadExt, BufReader, stdin};
use tokio::signal::ctrl_c;
use tokio::spawn as TokioSpawn;
use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::RecvError;

#[tokio::main]
async fn main() -> Result<(), BridgeError> {
    let args = Args::parse();

    let log_dir = args.resolve_log_dir();
    create_dir_all(&log_dir).map_err(|e| BridgeError::Bridge {
        message: format!("Failed to create log directory {}: {e}", log_dir.display()),
        location: ErrorLocation::caller(),
    })?;

    // Logger first so settings problems are recorded
    LoggerInitialize(&log_dir)?;

    info!("Config bridge starting");
    info!("Log directory: {}", log_dir.display());

    Settings::load_dotenv();
    let settings = Settings::load(&args.settings).map_err(BridgeError::core)?;
    info!(
        "Listening on port {}, remote controller at {}",
        settings.listen_port,
        settings.remote_addr()
    );

    let state = ConfigState::from_settings(&settings);
    if let Err(e) = state.load_from_file().await {
        warn!("Starting with an empty store: {}", e);
    }

    let listener = start_listener(&settings, state.clone())
        .await
        .map_err(BridgeError::core)?;
    let event_task = TokioSpawn(log_events(listener.subscribe()));

    println!("{}", console::HELP);

    let mut lines = BufReader::new(stdin()).lines();
    loop {
        let line = tokio::select! {
            _ = ctrl_c() => {
                info!("Ctrl-C received");
                break;
            }
            line = lines.next_line() => line,
        };

        let line = match line {
            Ok(Some(line)) => line,
            Ok(None) => {
                info!("Console input closed");
                break;
            }
            Err(e) => {
                error!("Failed to read console input: {}", e);
                break;
            }
        };

        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        match console::execute(command, &state, &settings).await {
            Ok(Outcome::Continue(output)) => println!("{output}"),
            Ok(Outcome::Quit) => break,
            Err(e) => println!("{e}"),
        }
    }

    listener.shutdown().await;
    event_task.abort();
    info!("Config bridge stopped");
    Ok(())
}

/// Mirror core events into the log until the bus closes.
async fn log_events(mut events: Receiver<BridgeEvent>) {
    loop {
        match events.recv().await {
            Ok(BridgeEvent::StatusChanged(status)) => info!("Status: {}", status),
            Ok(BridgeEvent::ConfigReceived { payload }) => {
                info!("Configuration received ({} bytes)", payload.len())
            }
            Ok(BridgeEvent::ConfigRequested { peer }) => {
                info!("Configuration requested by {}", peer)
            }
            Err(RecvError::Lagged(skipped)) => warn!("Event log skipped {} events", skipped),
            Err(RecvError::Closed) => break,
        }
    }
}
