//! `frcvision-cli` – FRCVision Console
//!
//! Terminal front-end for the vision service's configuration.  It:
//!
//! 1. Loads `~/.frcvision/config.toml` (writing defaults on first run); the
//!    first command-line argument overrides the server origin.
//! 2. Starts the reconnecting WebSocket client against the service.
//! 3. Drops the user into an interactive REPL that mirrors the service's
//!    settings and pushes edits back with `/save`.
//! 4. Intercepts Ctrl-C to close the connection cleanly.

mod config;
mod repl;
mod report;
mod telemetry;
mod view;

use colored::Colorize;
use tokio::sync::mpsc;
use tracing::warn;

use frcvision_console::Console;
use frcvision_middleware::{
    CLIENT_SOURCE, ClientConfig, Endpoint, EventBus, VisionClient, WsConnector,
};

#[tokio::main]
async fn main() {
    let guard = telemetry::init_tracing("frcvision");

    print_banner();

    let mut cfg = match config::load() {
        Ok(cfg) => cfg,
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::Config::default()
        }
    };
    if !config::config_path().exists() {
        match config::save(&cfg) {
            Ok(()) => println!(
                "  {} Default config written to {}",
                "✓".green().bold(),
                config::config_path().display().to_string().bold()
            ),
            Err(e) => warn!(error = %e, "could not write default config"),
        }
    }
    if let Some(origin) = std::env::args().nth(1) {
        cfg.server_url = origin;
    }

    let endpoint = match Endpoint::from_origin(&cfg.server_url) {
        Ok(endpoint) => endpoint,
        Err(e) => {
            eprintln!("{}: {}", "Invalid server URL".red(), e);
            std::process::exit(2);
        }
    };
    println!("  Vision service at {}", endpoint.ws_url().bold());

    // ── Ctrl-C handler ────────────────────────────────────────────────────
    let (interrupt_tx, interrupt_rx) = mpsc::unbounded_channel();
    if let Err(e) = ctrlc::set_handler(move || {
        let _ = interrupt_tx.send(());
    }) {
        warn!(error = %e, "Failed to install Ctrl-C handler; graceful shutdown on Ctrl-C will not be available");
    }

    // Subscribe before the client starts so the first transitions are seen.
    let bus = EventBus::default();
    let events = bus.subscribe_topic(CLIENT_SOURCE);

    let client_config = ClientConfig {
        endpoint: endpoint.clone(),
        reconnect_interval: cfg.reconnect_interval(),
        stream_stats_period: cfg.stream_stats_period_secs,
    };
    let (client, task) = VisionClient::spawn(client_config, WsConnector, bus);

    println!(
        "  Type {} for a list of commands.\n",
        "/help".bold().cyan()
    );

    let console = Console::new(view::TerminalView::new(endpoint.clone()));
    repl::run(console, client, endpoint, events, interrupt_rx).await;

    if let Err(e) = task.await {
        warn!(error = %e, "vision client task failed");
    }
    println!("{}", "  ✓ Exiting FRCVision console.".green());

    // The blocking stdin reader would otherwise hold the runtime open until
    // the next line of input.
    drop(guard);
    std::process::exit(0);
}

fn print_banner() {
    println!();
    println!("{}", r#"   __________  _______    ___      _           "#.bold().cyan());
    println!("{}", r#"  / __/ _ \ \/ / ___/ | / (_)__ (_)__  ___    "#.bold().cyan());
    println!("{}", r#" / _// , _/  / /__ | |/ / (_-</ / _ \/ _ \   "#.bold().cyan());
    println!("{}", r#"/_/ /_/|_|  /\___/ |___/_/___/_/\___/_//_/   "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "FRCVision Console".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!();
}
