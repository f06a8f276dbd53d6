//! Command line options shared by the `classify` and `classify_server` binaries.
//!
use std::path::PathBuf;

use clap::Args;

use crate::{
    nn::{ModelConfig, DEFAULT_INPUT_NAME},
    preproc::{Layout, Normalization, Preprocessing, IMAGE_DIMENSION},
};

#[derive(Args, Debug)]
pub struct ModelArgs {
    /// Model file, or directory containing `model.onnx`
    #[clap(long, default_value = "model")]
    pub model: PathBuf,

    /// Name of the input operation
    #[clap(long, default_value = DEFAULT_INPUT_NAME)]
    pub input_name: String,

    /// Name of the output operation, the model's declared output if omitted
    #[clap(long)]
    pub output_name: Option<String>,

    /// Side length of the square model input
    #[clap(long, default_value_t = IMAGE_DIMENSION, value_parser = clap::value_parser!(u32).range(1..))]
    pub dimension: u32,

    /// Layout of the input tensor
    #[clap(long, value_enum, default_value_t = Layout::Nhwc)]
    pub layout: Layout,

    /// Normalization of the pixel values
    #[clap(long, value_enum, default_value_t = Normalization::Raw)]
    pub normalization: Normalization,
}

impl From<ModelArgs> for ModelConfig {
    fn from(args: ModelArgs) -> Self {
        ModelConfig {
            path: args.model,
            input_name: args.input_name,
            output_name: args.output_name,
            preprocessing: Preprocessing {
                dimension: args.dimension,
                layout: args.layout,
                normalization: args.normalization,
                ..Default::default()
            },
        }
    }
}
