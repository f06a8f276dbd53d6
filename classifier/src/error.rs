//! Errors of the classification pipeline.
//!
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("bad image dimensions: {width}x{height}, expected {expected}x{expected}")]
    BadImageDimensions {
        width: u32,
        height: u32,
        expected: u32,
    },

    #[error("invalid image format")]
    InvalidFormat(#[from] image::ImageError),

    #[error("invalid or missing output: {0}")]
    InvalidOutput(String),

    #[error("could not load model {}", path.display())]
    LoadModel {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("could not run the session")]
    RunSession(#[source] anyhow::Error),

    #[error("wrong operation name: {0}")]
    WrongOperationName(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Render the error with its chain of sources, `": "` separated.
    pub fn report(self) -> String {
        format!("{:#}", anyhow::Error::new(self))
    }

    /// Whether the error was caused by the submitted image rather than the model.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Error::InvalidFormat(_) | Error::BadImageDimensions { .. }
        )
    }
}

#[cfg(test)]
mod test {
    use std::path::PathBuf;

    use super::Error;

    #[test]
    fn test_report_includes_sources() {
        let err = Error::LoadModel {
            path: PathBuf::from("model/model.onnx"),
            source: anyhow::anyhow!("unexpected end of protobuf"),
        };
        assert!(!err.is_bad_input());
        assert_eq!(
            err.report(),
            "could not load model model/model.onnx: unexpected end of protobuf"
        );
    }
}
