//! Image preprocessing: decode, resize and lay out pixels as the model input tensor.
//!
use clap::ValueEnum;
use image::{imageops::FilterType, DynamicImage, ImageFormat, RgbImage};
use tract_onnx::prelude::*;

use crate::{Error, Result};

/// Side length of the square input of the Keras cat/dog model.
pub const IMAGE_DIMENSION: u32 = 180;

/// Mean/std of the ImageNet training set, as used by MobileNet-style models.
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Memory layout of the batched input tensor.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Layout {
    /// `[1, height, width, 3]`, channels last (TensorFlow/Keras).
    #[default]
    Nhwc,
    /// `[1, 3, height, width]`, channels first (PyTorch exports).
    Nchw,
}

/// Mapping of an 8-bit channel value to the value fed to the model.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ValueEnum)]
pub enum Normalization {
    /// Keep the value range `0..=255`, the model rescales internally.
    #[default]
    Raw,
    /// Scale to `0..=1`.
    Unit,
    /// Scale to `0..=1`, then standardize with ImageNet mean and std.
    #[value(name = "imagenet")]
    ImageNet,
}

impl Normalization {
    pub fn apply(&self, value: u8, channel: usize) -> f32 {
        match self {
            Normalization::Raw => value as f32,
            Normalization::Unit => value as f32 / 255.0,
            Normalization::ImageNet => {
                (value as f32 / 255.0 - IMAGENET_MEAN[channel]) / IMAGENET_STD[channel]
            }
        }
    }
}

/// Everything needed to turn an arbitrary image into a model input.
#[derive(Clone, Copy, Debug)]
pub struct Preprocessing {
    pub dimension: u32,
    pub layout: Layout,
    pub normalization: Normalization,
    pub filter: FilterType,
}

impl Default for Preprocessing {
    fn default() -> Self {
        Self {
            dimension: IMAGE_DIMENSION,
            layout: Layout::default(),
            normalization: Normalization::default(),
            filter: FilterType::Lanczos3,
        }
    }
}

impl Preprocessing {
    /// Shape of the single-image batch the model input is pinned to.
    pub fn input_shape(&self) -> TVec<usize> {
        let dim = self.dimension as usize;
        match self.layout {
            Layout::Nhwc => tvec!(1, dim, dim, 3),
            Layout::Nchw => tvec!(1, 3, dim, dim),
        }
    }

    /// Decode JPEG data. Other formats are rejected.
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
        Ok(image::load_from_memory_with_format(
            bytes,
            ImageFormat::Jpeg,
        )?)
    }

    /// Resize to a `dimension` square, ignoring the aspect ratio.
    pub fn resize(&self, image: &DynamicImage) -> RgbImage {
        image::imageops::resize(
            &image.to_rgb8(),
            self.dimension,
            self.dimension,
            self.filter,
        )
    }

    /// Lay out a resized image as a normalized `f32` tensor of shape `input_shape()`.
    ///
    /// Pixel `(x, y)` lands at row `y`, column `x`, the row-major order Keras feeds training
    /// images in. Filling the array as `[x][y]` would hand the model a transposed image.
    pub fn tensor_from_image(&self, image: &RgbImage) -> Result<Tensor> {
        let (width, height) = image.dimensions();
        if width != self.dimension || height != self.dimension {
            return Err(Error::BadImageDimensions {
                width,
                height,
                expected: self.dimension,
            });
        }

        let dim = self.dimension as usize;
        let normalization = self.normalization;
        let tensor: Tensor = match self.layout {
            Layout::Nhwc => {
                tract_ndarray::Array4::from_shape_fn((1, dim, dim, 3), |(_, y, x, c)| {
                    normalization.apply(image[(x as _, y as _)][c], c)
                })
                .into()
            }
            Layout::Nchw => {
                tract_ndarray::Array4::from_shape_fn((1, 3, dim, dim), |(_, c, y, x)| {
                    normalization.apply(image[(x as _, y as _)][c], c)
                })
                .into()
            }
        };

        Ok(tensor)
    }

    /// Resize and convert a decoded image.
    pub fn run(&self, image: &DynamicImage) -> Result<Tensor> {
        let resized = self.resize(image);
        self.tensor_from_image(&resized)
    }
}
