use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use mcu_bridge::config::ConfigLoader;
use mcu_bridge::port::{available_port_names, TokioSerialOpener};
use mcu_bridge::{logging, transport};
use mcu_bridge::{Bridge, DeviceRegistry, Event, FileGateway, PortInitializer};

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Bridges a websocket control session to a fixed set of serial MCU boards.",
    long_about = "Opens every board listed in the device file, one at a time, then accepts a single websocket control session that addresses boards by their position in that file."
)]
struct Args {
    /// Path to the bridge configuration file (TOML).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the device file named in the configuration.
    #[arg(short, long)]
    devices: Option<PathBuf>,

    /// Print the serial ports visible to the OS and exit.
    #[arg(long)]
    list_ports: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = match args.config {
        Some(path) => ConfigLoader::load_from(path)?.into_config(),
        None => match ConfigLoader::load() {
            Ok(loader) => loader.into_config(),
            Err(e) => {
                eprintln!("Warning: Failed to load config, using defaults: {}", e);
                ConfigLoader::with_defaults().into_config()
            }
        },
    };
    if let Some(devices) = args.devices {
        config.bridge.devices_file = devices;
    }

    logging::init(&config.logging, &config.server.log_level);

    if args.list_ports {
        for name in available_port_names()? {
            println!("{}", name);
        }
        return Ok(());
    }

    info!(version = env!("CARGO_PKG_VERSION"), "MCU bridge starting");

    let registry = match DeviceRegistry::load(&config.bridge.devices_file) {
        Ok(registry) => {
            info!(devices = registry.len(), file = %config.bridge.devices_file.display(), "Device file loaded");
            registry
        }
        Err(e) => {
            error!(error = %e, "Device initialization halted; continuing with no devices");
            DeviceRegistry::empty()
        }
    };
    let targets = registry.open_targets();
    let gateway = FileGateway::new(&config.bridge.asset_root);
    info!(root = %gateway.root().display(), "Serving file commands");

    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let bridge = Bridge::new(registry, gateway, events_tx.clone());
    let bridge_task = tokio::spawn(bridge.run(events_rx));

    let bind_target = config.server.bind_target();
    let transport_events = events_tx.clone();
    let initializer = PortInitializer::new(
        Arc::new(TokioSerialOpener),
        targets,
        config.bridge.open_delay(),
        events_tx.clone(),
    );
    let startup = initializer.run(|summary| async move {
        info!(opened = summary.opened, failed = summary.failed, "Starting session transport");
        let listener = TcpListener::bind(bind_target).await?;
        transport::serve(listener, transport_events).await
    });

    tokio::select! {
        result = startup => result?,
        _ = shutdown_signal() => {}
    }

    let (ack_tx, ack_rx) = oneshot::channel();
    if events_tx.send(Event::Shutdown(ack_tx)).is_ok() {
        let _ = ack_rx.await;
    }
    let _ = bridge_task.await;
    info!("Shutdown complete");

    Ok(())
}

// --- Graceful Shutdown Handler ---
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Signal received, starting graceful shutdown...");
}
