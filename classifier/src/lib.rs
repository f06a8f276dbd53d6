//! Tell cats from dogs: JPEG preprocessing and ONNX inference behind a CLI and an HTTP server.

pub mod batch;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod meter;
pub mod nn;
pub mod prediction;
pub mod preproc;

pub use error::{Error, Result};
pub use tract_onnx::prelude::Tensor;
