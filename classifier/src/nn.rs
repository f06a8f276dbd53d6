use std::path::{Path, PathBuf};

use image::DynamicImage;
use tract_onnx::prelude::*;

use crate::{prediction::Prediction, preproc::Preprocessing, Error, Result};

type NnModel = SimplePlan<TypedFact, Box<dyn TypedOp>, Graph<TypedFact, Box<dyn TypedOp>>>;

/// File looked up when the model path is a directory.
pub const MODEL_FILE_NAME: &str = "model.onnx";

/// Input name Keras gives the serving signature of an exported model.
pub const DEFAULT_INPUT_NAME: &str = "serve_keras_tensor";

/// A binary classifier returning the probability that an image shows a dog.
pub trait InferModel: Send + Sync {
    fn preprocessing(&self) -> &Preprocessing;

    /// Run one forward pass on a tensor shaped by `preprocessing()`.
    fn run(&self, input: Tensor) -> Result<f32>;

    fn predict_image(&self, image: &DynamicImage) -> Result<Prediction> {
        let input = self.preprocessing().run(image)?;
        let probability = self.run(input)?;
        log::debug!("Dog probability {probability:.4}");

        Ok(Prediction::from_probability(probability))
    }

    fn predict_bytes(&self, bytes: &[u8]) -> Result<Prediction> {
        let image = Preprocessing::decode(bytes)?;
        self.predict_image(&image)
    }

    fn predict_file(&self, path: &Path) -> Result<Prediction> {
        let bytes = std::fs::read(path)?;
        self.predict_bytes(&bytes)
    }
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    /// Model file, or a directory containing `model.onnx`.
    pub path: PathBuf,
    pub input_name: String,
    /// Output node to read, the graph's declared output if unset.
    pub output_name: Option<String>,
    pub preprocessing: Preprocessing,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("model"),
            input_name: DEFAULT_INPUT_NAME.to_owned(),
            output_name: None,
            preprocessing: Preprocessing::default(),
        }
    }
}

impl ModelConfig {
    pub fn model_file(&self) -> PathBuf {
        match self.path.is_dir() {
            true => self.path.join(MODEL_FILE_NAME),
            false => self.path.clone(),
        }
    }
}

/// Cat/dog classifier exported to ONNX and executed with tract.
pub struct CatDogModel {
    model: NnModel,
    preprocessing: Preprocessing,
}

impl CatDogModel {
    pub fn new(config: &ModelConfig) -> Result<Self> {
        let path = config.model_file();
        log::info!("Loading model from {}", path.display());

        let load_error = |source: anyhow::Error| Error::LoadModel {
            path: path.clone(),
            source,
        };

        let mut model = tract_onnx::onnx()
            .model_for_path(&path)
            .map_err(load_error)?;

        // Names resolve against node names and ONNX tensor labels alike
        model
            .set_input_names([config.input_name.as_str()])
            .map_err(|_| Error::WrongOperationName(format!("input {}", config.input_name)))?;

        if let Some(output_name) = &config.output_name {
            model
                .set_output_names([output_name.as_str()])
                .map_err(|_| Error::WrongOperationName(format!("output {output_name}")))?;
        }

        let input_fact = InferenceFact::dt_shape(
            f32::datum_type(),
            config.preprocessing.input_shape(),
        );
        let model = model
            .with_input_fact(0, input_fact)
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(load_error)?;

        log::info!(
            "Model ready, input {} with shape {:?}",
            config.input_name,
            config.preprocessing.input_shape()
        );

        Ok(Self {
            model,
            preprocessing: config.preprocessing,
        })
    }
}

impl InferModel for CatDogModel {
    fn preprocessing(&self) -> &Preprocessing {
        &self.preprocessing
    }

    fn run(&self, input: Tensor) -> Result<f32> {
        let outputs = self
            .model
            .run(tvec!(input.into()))
            .map_err(Error::RunSession)?;

        let output = outputs
            .first()
            .ok_or_else(|| Error::InvalidOutput("model produced no outputs".into()))?;
        log::debug!("Output shape {:?}", output.shape());

        // The sigmoid head yields a `[1, 1]` tensor
        let probability = output
            .to_array_view::<f32>()
            .map_err(|err| Error::InvalidOutput(err.to_string()))?
            .iter()
            .next()
            .copied()
            .ok_or_else(|| Error::InvalidOutput("empty output tensor".into()))?;

        if !probability.is_finite() {
            return Err(Error::InvalidOutput(format!(
                "non-finite probability {probability}"
            )));
        }

        Ok(probability)
    }
}

#[cfg(test)]
mod test {
    use image::{Rgb, RgbImage};

    use super::*;
    use crate::{prediction::Label, preproc::test::jpeg_bytes};

    struct ConstantModel {
        probability: f32,
        preprocessing: Preprocessing,
    }

    impl InferModel for ConstantModel {
        fn preprocessing(&self) -> &Preprocessing {
            &self.preprocessing
        }

        fn run(&self, input: Tensor) -> Result<f32> {
            assert_eq!(input.shape(), &*self.preprocessing.input_shape());
            Ok(self.probability)
        }
    }

    fn constant_model(probability: f32) -> ConstantModel {
        ConstantModel {
            probability,
            preprocessing: Preprocessing {
                dimension: 16,
                ..Default::default()
            },
        }
    }

    #[test]
    fn test_model_file_in_directory() {
        let config = ModelConfig {
            path: std::env::temp_dir(),
            ..Default::default()
        };
        assert_eq!(config.model_file(), std::env::temp_dir().join(MODEL_FILE_NAME));

        let config = ModelConfig {
            path: PathBuf::from("exported/cats_vs_dogs.onnx"),
            ..Default::default()
        };
        assert_eq!(
            config.model_file(),
            PathBuf::from("exported/cats_vs_dogs.onnx")
        );
    }

    #[test]
    fn test_missing_model_file() {
        let config = ModelConfig {
            path: PathBuf::from("no/such/model.onnx"),
            ..Default::default()
        };
        let result = CatDogModel::new(&config);
        assert!(matches!(result, Err(Error::LoadModel { .. })));
    }

    #[test]
    fn test_predict_bytes() -> anyhow::Result<()> {
        let bytes = jpeg_bytes(&RgbImage::from_pixel(64, 48, Rgb([10, 20, 30])));

        let prediction = constant_model(0.9).predict_bytes(&bytes)?;
        assert_eq!(prediction.label, Label::Dog);

        let prediction = constant_model(0.2).predict_bytes(&bytes)?;
        assert_eq!(prediction.label, Label::Cat);

        Ok(())
    }

    #[test]
    fn test_predict_invalid_payload() {
        let result = constant_model(0.9).predict_bytes(b"GIF89a");
        assert!(matches!(result, Err(Error::InvalidFormat(_))));
    }

    #[test]
    fn test_predict_missing_file() {
        let result = constant_model(0.9).predict_file(Path::new("no/such/image.jpg"));
        assert!(matches!(result, Err(Error::Io(_))));
    }
}
