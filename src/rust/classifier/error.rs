use crate::model_manager::ModelError;

/// Represents the different types of errors that can occur while checking a logo.
#[derive(Debug, thiserror::Error)]
pub enum ClassifierError {
    /// The input could not be read or parsed as an image
    #[error("Decode error: {0}")]
    DecodeError(String),
    /// The model or catalog artifact is missing, malformed or inconsistent
    #[error("Model load error: {0}")]
    ModelLoadError(String),
    /// The model failed to run or produced an unusable output
    #[error("Prediction error: {0}")]
    PredictionError(String),
    /// Error occurred due to invalid input parameters
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<ort::Error> for ClassifierError {
    fn from(err: ort::Error) -> Self {
        ClassifierError::ModelLoadError(err.to_string())
    }
}

impl From<ModelError> for ClassifierError {
    fn from(err: ModelError) -> Self {
        ClassifierError::ModelLoadError(err.to_string())
    }
}
