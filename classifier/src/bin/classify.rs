//! Classify JPEG files as cat or dog.
//!
use std::{io, path::PathBuf, process::ExitCode};

use anyhow::Result;
use clap::{CommandFactory, Parser};
use classifier::{
    batch::classify_paths,
    config::ModelArgs,
    nn::{CatDogModel, ModelConfig},
};
use env_logger::TimestampPrecision;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Tell cats from dogs on JPEG images")]
struct Args {
    #[clap(flatten)]
    model: ModelArgs,

    /// JPEG files to classify
    files: Vec<PathBuf>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Setup logger
    env_logger::builder()
        .format_timestamp(Some(TimestampPrecision::Millis))
        .init();

    if args.files.is_empty() {
        if let Err(err) = Args::command().print_help() {
            log::error!("Unable to print usage: {err}");
        }
        return ExitCode::SUCCESS;
    }

    match run(args) {
        Ok(0) => ExitCode::SUCCESS,
        Ok(failed) => {
            log::debug!("{failed} file(s) failed");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Classify all files in order, returning the number of failures.
fn run(args: Args) -> Result<usize> {
    let model = CatDogModel::new(&ModelConfig::from(args.model))?;

    let failed = classify_paths(
        &model,
        &args.files,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )?;

    Ok(failed)
}
