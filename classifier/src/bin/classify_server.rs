//! Classification server binary.
//!
use std::{net::SocketAddr, sync::Arc, time::Duration};

use anyhow::Result;
use clap::Parser;
use classifier::{
    config::ModelArgs,
    endpoints::{router, SharedModel, DEFAULT_BODY_LIMIT},
    meter::spawn_meter_logger,
    nn::{CatDogModel, ModelConfig},
};
use env_logger::TimestampPrecision;

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Address to serve the HTTP endpoints on
    #[clap(long, default_value = "127.0.0.1:3000")]
    server_address: String,

    /// Maximum accepted request body size in bytes
    #[clap(long, default_value_t = DEFAULT_BODY_LIMIT)]
    body_limit: usize,

    /// Seconds between two throughput log lines
    #[clap(long, default_value_t = 10, value_parser = clap::value_parser!(u64).range(1..))]
    meter_interval: u64,

    #[clap(flatten)]
    model: ModelArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    // Load the model once, all requests share it
    let model: SharedModel = Arc::new(CatDogModel::new(&ModelConfig::from(args.model))?);

    spawn_meter_logger(Duration::from_secs(args.meter_interval));

    // Build HTTP server with endpoints
    let app = router(model, args.body_limit);

    // Serve HTTP server
    let addr: SocketAddr = args.server_address.parse()?;
    log::info!("Serving on http://{addr}");
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}
