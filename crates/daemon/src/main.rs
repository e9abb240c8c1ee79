#![forbid(unsafe_code)]
#![warn(missing_docs)]

//! Signal daemon: serves green-phase decisions for one intersection over HTTP.

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use clap::Parser;
use signal_core::{model, GreenTiming, SignalScheduler};
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod http;
mod service;

use crate::service::SignalService;

#[derive(Parser, Debug)]
#[command(name = "signal-daemon", version, about = "Traffic signal green-phase scheduler")]
struct Args {
    /// Listen address, e.g. 127.0.0.1:5000
    #[arg(long, default_value = "127.0.0.1:5000")]
    listen: SocketAddr,

    /// Shortest green phase in seconds.
    #[arg(long, default_value_t = model::MIN_GREEN_TIME)]
    min_green_secs: u32,

    /// Longest green phase in seconds.
    #[arg(long, default_value_t = model::MAX_GREEN_TIME)]
    max_green_secs: u32,

    /// Seconds of green granted per counted vehicle.
    #[arg(long, default_value_t = model::SECS_PER_VEHICLE)]
    secs_per_vehicle: u32,

    /// Log level (env-filter syntax).
    #[arg(long, default_value = "info")]
    log: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&args.log))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let timing = GreenTiming {
        min_green_secs: args.min_green_secs,
        max_green_secs: args.max_green_secs,
        secs_per_vehicle: args.secs_per_vehicle,
    };
    let scheduler = SignalScheduler::with_timing(timing).context("invalid green timing")?;

    let svc = Arc::new(SignalService::new(scheduler));
    let app = http::router(svc);

    tracing::info!(listen = %args.listen, ?timing, "daemon starting");
    axum::serve(tokio::net::TcpListener::bind(args.listen).await?, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = signal::ctrl_c().await;
    tracing::info!("shutdown requested");
}
