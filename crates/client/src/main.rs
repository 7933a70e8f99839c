// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! vigil: connect a proctoring telemetry channel and log inbound traffic.
//!
//! A thin driver around [`vigil::ChannelClient`], mainly useful for
//! poking at a backend during development.

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use vigil::{ChannelClient, ChannelConfig};
use vigil_core::Endpoint;

/// vigil: telemetry channel client for the proctoring backend
#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Telemetry channel client for the proctoring backend")]
struct Args {
    /// Backend host (host[:port])
    #[arg(long, default_value = "localhost:8000")]
    host: String,

    /// Use wss instead of ws
    #[arg(long)]
    secure: bool,

    /// Proctored session id
    #[arg(short, long)]
    session_id: String,

    /// User id under observation
    #[arg(short, long)]
    user_id: String,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting vigil channel client");
    info!("  Host: {} (secure: {})", args.host, args.secure);
    info!("  Session: {}", args.session_id);

    let config = ChannelConfig::new(Endpoint::new(args.host, args.secure));
    let mut client = ChannelClient::new(config);

    client.activate(args.session_id, args.user_id, true).await;
    client.run().await;

    if let Some(error) = client.last_error() {
        info!("channel stopped: {error}");
    }

    Ok(())
}
