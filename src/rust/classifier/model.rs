use std::fmt;

use super::error::ClassifierError;
use crate::preprocess::ImageTensor;

/// A pretrained image classifier over a closed set of brand labels.
///
/// Implementations must be pure: the same tensor always yields the same
/// distribution, and `predict` never mutates shared state.
pub trait LogoModel: Send + Sync + fmt::Debug {
    /// Number of entries in every distribution returned by [`LogoModel::predict`].
    fn output_width(&self) -> usize;

    /// Runs one forward pass and returns a score per catalog position.
    ///
    /// # Errors
    /// - `PredictionError` if the model fails to run or its output cannot be read
    fn predict(&self, input: &ImageTensor) -> Result<Vec<f32>, ClassifierError>;

    /// Short human-readable description used in logs and [`crate::DetectorInfo`].
    fn describe(&self) -> String {
        format!("{} classes", self.output_width())
    }
}

/// How the raw model output should be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputActivation {
    /// The network ends in a softmax layer; outputs are used as-is.
    #[default]
    Probabilities,
    /// The export dropped the final activation; a softmax is applied here.
    Logits,
}

impl OutputActivation {
    pub fn apply(self, scores: Vec<f32>) -> Vec<f32> {
        match self {
            OutputActivation::Probabilities => scores,
            OutputActivation::Logits => softmax(&scores),
        }
    }
}

pub(crate) fn softmax(logits: &[f32]) -> Vec<f32> {
    let max_logit = logits.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
    let exp_sum: f32 = logits.iter().map(|&x| (x - max_logit).exp()).sum();
    logits
        .iter()
        .map(|&x| (x - max_logit).exp() / exp_sum)
        .collect()
}
