//! Classification of a list of files, as done by the `classify` binary.
//!
use std::{
    io::{self, Write},
    path::{Path, PathBuf},
};

use anyhow::Context;

use crate::{nn::InferModel, prediction::Prediction};

/// Classify `paths` in order.
///
/// Every result goes to `out` as `"<label> <confidence>% <path>"`, every failure to `errors` as
/// `"<path>: <error chain>"`. A failing path does not stop the batch. Returns the number of
/// failed paths.
pub fn classify_paths(
    model: &impl InferModel,
    paths: &[PathBuf],
    out: &mut impl Write,
    errors: &mut impl Write,
) -> io::Result<usize> {
    let mut failed = 0;
    for path in paths {
        match classify_file(model, path) {
            Ok(prediction) => writeln!(out, "{prediction} {}", path.display())?,
            Err(err) => {
                failed += 1;
                writeln!(errors, "{err:#}")?;
            }
        }
    }

    Ok(failed)
}

fn classify_file(model: &impl InferModel, path: &Path) -> anyhow::Result<Prediction> {
    model
        .predict_file(path)
        .with_context(|| path.display().to_string())
}
