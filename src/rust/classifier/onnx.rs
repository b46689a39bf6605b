use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::{debug, error, info};
use ort::session::Session;
use ort::tensor::TensorElementType;
use ort::value::{Tensor, ValueType};

use super::error::ClassifierError;
use super::model::{LogoModel, OutputActivation};
use crate::preprocess::{ImageTensor, INPUT_CHANNELS, INPUT_SIZE};
use crate::runtime::{create_session_builder, RuntimeConfig};

/// A logo classifier exported to ONNX and executed with ONNX Runtime.
///
/// The model is expected to:
/// - Accept a single `f32` input of shape `[1, 224, 224, 3]` (NHWC, values in `[0, 1]`)
/// - Produce a first output of shape `[1, num_classes]`
///
/// # Thread Safety
///
/// `Session::run` only needs `&self`, so one `OnnxLogoModel` serves concurrent
/// callers without any locking on our side.
#[derive(Debug)]
pub struct OnnxLogoModel {
    model_path: PathBuf,
    session: Session,
    input_name: String,
    output_width: usize,
    activation: OutputActivation,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<OnnxLogoModel>();
    }
};

impl OnnxLogoModel {
    /// Loads and validates an ONNX model from disk.
    ///
    /// # Errors
    /// - `ModelLoadError` if the file does not exist or cannot be parsed
    /// - `ModelLoadError` if the model does not have exactly one input and at least one output
    /// - `ModelLoadError` if the input is not an `f32` tensor of shape `[1, 224, 224, 3]`
    /// - `ModelLoadError` if the output width cannot be determined
    pub fn load(
        model_path: impl AsRef<Path>,
        config: &RuntimeConfig,
        activation: OutputActivation,
    ) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model file not found: {}",
                model_path.display()
            )));
        }

        let session = create_session_builder(config)?
            .commit_from_file(model_path)
            .map_err(|e| {
                error!("Failed to load model {}: {}", model_path.display(), e);
                ClassifierError::ModelLoadError(format!(
                    "Failed to load model {}: {}",
                    model_path.display(),
                    e
                ))
            })?;

        Self::validate_model(&session)?;
        info!("Model structure validated successfully");

        let input_name = session.inputs[0].name.clone();
        let static_width = Self::static_output_width(&session);

        let mut model = Self {
            model_path: model_path.to_path_buf(),
            session,
            input_name,
            output_width: static_width.unwrap_or(0),
            activation,
        };

        if static_width.is_none() {
            // Dynamic class dimension: infer it from a probe run.
            let probe = model.run(&ImageTensor::blank()).map_err(|e| {
                ClassifierError::ModelLoadError(format!(
                    "Could not determine the output width of {}: {}",
                    model_path.display(),
                    e
                ))
            })?;
            if probe.is_empty() {
                return Err(ClassifierError::ModelLoadError(
                    "Model produced an empty output for the probe input".into(),
                ));
            }
            model.output_width = probe.len();
        }

        info!(
            "Loaded model {} ({} classes)",
            model.model_path.display(),
            model.output_width
        );
        Ok(model)
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    /// Validates that the model has the expected input/output structure
    fn validate_model(session: &Session) -> Result<(), ClassifierError> {
        if session.inputs.len() != 1 {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model must have exactly 1 image input, found {}",
                session.inputs.len()
            )));
        }
        if session.outputs.is_empty() {
            return Err(ClassifierError::ModelLoadError(
                "Model must have at least 1 output for class scores".to_string(),
            ));
        }
        Self::validate_input(&session.inputs[0].input_type)
    }

    /// The input must take one NHWC image; symbolic dimensions are accepted
    /// everywhere except the channel axis.
    fn validate_input(input_type: &ValueType) -> Result<(), ClassifierError> {
        let (ty, dimensions) = match input_type {
            ValueType::Tensor { ty, dimensions, .. } => (ty, dimensions),
            other => {
                return Err(ClassifierError::ModelLoadError(format!(
                    "Model input must be a tensor, found {:?}",
                    other
                )))
            }
        };
        if *ty != TensorElementType::Float32 {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model input must be f32, found {:?}",
                ty
            )));
        }

        let side = i64::from(INPUT_SIZE);
        let channels = INPUT_CHANNELS as i64;
        let accepts = |dim: i64, expected: i64| dim == expected || dim < 0;
        let nhwc = dimensions.len() == 4
            && accepts(dimensions[0], 1)
            && accepts(dimensions[1], side)
            && accepts(dimensions[2], side)
            && dimensions[3] == channels;
        if !nhwc {
            return Err(ClassifierError::ModelLoadError(format!(
                "Model input must have shape [1, {side}, {side}, {channels}], found {:?}",
                dimensions
            )));
        }
        Ok(())
    }

    /// Width of the class dimension when the export declares it statically.
    fn static_output_width(session: &Session) -> Option<usize> {
        match &session.outputs[0].output_type {
            ValueType::Tensor { dimensions, .. } => dimensions
                .last()
                .copied()
                .filter(|&d| d > 0)
                .and_then(|d| usize::try_from(d).ok()),
            _ => None,
        }
    }

    fn run(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        let input_dyn = input.view().into_dyn();
        let input_array = input_dyn.as_standard_layout();

        let mut input_tensors = HashMap::new();
        input_tensors.insert(
            self.input_name.as_str(),
            Tensor::from_array(&input_array).map_err(|e| {
                ClassifierError::PredictionError(format!("Failed to create input tensor: {}", e))
            })?,
        );

        let outputs = self
            .session
            .run(input_tensors)
            .map_err(|e| ClassifierError::PredictionError(format!("Failed to run model: {}", e)))?;
        let output_tensor = outputs[0].try_extract_tensor::<f32>().map_err(|e| {
            ClassifierError::PredictionError(format!("Failed to extract output tensor: {}", e))
        })?;
        debug!("Model output shape: {:?}", output_tensor.shape());

        let scores: Vec<f32> = output_tensor.iter().copied().collect();
        Ok(self.activation.apply(scores))
    }
}

impl LogoModel for OnnxLogoModel {
    fn output_width(&self) -> usize {
        self.output_width
    }

    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError> {
        self.run(input)
    }

    fn describe(&self) -> String {
        format!("{} ({} classes)", self.model_path.display(), self.output_width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::model::softmax;
    use image::{DynamicImage, Rgb, RgbImage};

    // Each fixture averages the three colour channels of the image, see
    // tests/fixtures/make_fixtures.py.
    fn fixture(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name)
    }

    fn load_fixture(name: &str, activation: OutputActivation) -> Result<OnnxLogoModel, ClassifierError> {
        OnnxLogoModel::load(fixture(name), &RuntimeConfig::default(), activation)
    }

    fn solid(r: u8, g: u8, b: u8) -> ImageTensor {
        ImageTensor::from_image(&DynamicImage::ImageRgb8(RgbImage::from_pixel(32, 32, Rgb([r, g, b]))))
    }

    fn assert_close(actual: &[f32], expected: &[f32]) {
        assert_eq!(actual.len(), expected.len());
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-3, "{:?} != {:?}", actual, expected);
        }
    }

    #[test]
    fn test_static_output_width() {
        let model = load_fixture("mean_rgb_static.onnx", OutputActivation::Probabilities).unwrap();
        assert_eq!(model.output_width(), 3);
        assert_eq!(model.input_name, "image");
        assert!(model.describe().ends_with("(3 classes)"));
    }

    #[test]
    fn test_dynamic_output_width_is_probed() {
        let model = load_fixture("mean_rgb_dynamic.onnx", OutputActivation::Probabilities).unwrap();
        assert_eq!(model.output_width(), 3);
    }

    #[test]
    fn test_predict_reads_nhwc_channels() {
        let model = load_fixture("mean_rgb_static.onnx", OutputActivation::Probabilities).unwrap();

        let scores = model.predict(&solid(255, 0, 51)).unwrap();
        assert_close(&scores, &[1.0, 0.0, 0.2]);

        let blank = model.predict(&ImageTensor::blank()).unwrap();
        assert_close(&blank, &[0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_logits_are_softmaxed() {
        let model = load_fixture("mean_rgb_dynamic.onnx", OutputActivation::Logits).unwrap();

        let scores = model.predict(&solid(255, 0, 51)).unwrap();
        assert_close(&scores, &softmax(&[1.0, 0.0, 0.2]));
        assert!((scores.iter().sum::<f32>() - 1.0).abs() < 1e-5);

        let uniform = model.predict(&ImageTensor::blank()).unwrap();
        assert_close(&uniform, &[1.0 / 3.0; 3]);
    }

    #[test]
    fn test_nchw_input_is_rejected_at_load() {
        let result = load_fixture("mean_rgb_nchw.onnx", OutputActivation::Probabilities);
        assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
    }

    #[test]
    fn test_failing_width_probe_is_a_load_error() {
        let result = load_fixture("broken_reshape.onnx", OutputActivation::Probabilities);
        assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
    }

    #[test]
    fn test_input_shape_validation() {
        let tensor = |dimensions: Vec<i64>| ValueType::Tensor {
            ty: TensorElementType::Float32,
            dimensions,
            dimension_symbols: Vec::new(),
        };

        assert!(OnnxLogoModel::validate_input(&tensor(vec![1, 224, 224, 3])).is_ok());
        assert!(OnnxLogoModel::validate_input(&tensor(vec![-1, 224, 224, 3])).is_ok());
        assert!(OnnxLogoModel::validate_input(&tensor(vec![1, 3, 224, 224])).is_err());
        assert!(OnnxLogoModel::validate_input(&tensor(vec![1, 299, 299, 3])).is_err());
        assert!(OnnxLogoModel::validate_input(&tensor(vec![224, 224, 3])).is_err());

        let uint8 = ValueType::Tensor {
            ty: TensorElementType::Uint8,
            dimensions: vec![1, 224, 224, 3],
            dimension_symbols: Vec::new(),
        };
        assert!(OnnxLogoModel::validate_input(&uint8).is_err());
    }

    #[test]
    fn test_missing_model_file() {
        let result = OnnxLogoModel::load(
            "does/not/exist/model.onnx",
            &RuntimeConfig::default(),
            OutputActivation::Probabilities,
        );
        assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
    }

    #[test]
    fn test_malformed_model_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.onnx");
        std::fs::write(&path, b"this is not an onnx graph").unwrap();

        let result = OnnxLogoModel::load(
            &path,
            &RuntimeConfig::default(),
            OutputActivation::Probabilities,
        );
        assert!(matches!(result, Err(ClassifierError::ModelLoadError(_))));
    }
}
