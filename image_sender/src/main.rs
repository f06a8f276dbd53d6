use std::{path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use env_logger::TimestampPrecision;
use image_sender::sender::ImageSender;

#[derive(Parser, Debug)]
#[clap(author, version)]
struct Args {
    /// Address of the classification server to connect to
    #[clap(long, default_value = "127.0.0.1:3000")]
    address: String,

    /// JPEG files to upload
    #[clap(required = true)]
    files: Vec<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    let sender = ImageSender::new(&args.address);
    log::info!("Sending {} file(s) to {}", args.files.len(), sender.url());

    let mut failed = 0;
    for path in &args.files {
        match sender.classify_file(path).await {
            Ok(prediction) => println!("{} {}", prediction.summary(), path.display()),
            Err(err) => {
                failed += 1;
                log::error!("{}: {err:#}", path.display());
            }
        }
    }

    Ok(match failed {
        0 => ExitCode::SUCCESS,
        _ => ExitCode::FAILURE,
    })
}
