use crate::classifier::ClassifierError;

/// Below this top probability a prediction is treated as unclear, i.e. fake.
pub const CONFIDENCE_THRESHOLD: f32 = 0.5;

/// The classifier's best guess and whether it is confident enough to trust.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GateResult {
    /// Position of the highest score in the distribution
    pub index: usize,
    /// The highest score, in `[0, 1]`
    pub confidence: f32,
    /// `confidence >= threshold`
    pub passed: bool,
}

/// Thresholds the top probability of a class distribution.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConfidenceGate {
    threshold: f32,
}

impl Default for ConfidenceGate {
    fn default() -> Self {
        Self::new(CONFIDENCE_THRESHOLD)
    }
}

impl ConfidenceGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn threshold(&self) -> f32 {
        self.threshold
    }

    /// Finds the top class and checks it against the threshold.
    ///
    /// When several classes share the top score the first one wins.
    ///
    /// # Errors
    /// - `PredictionError` if the distribution is empty or holds a negative or non-finite score
    pub fn evaluate(&self, distribution: &[f32]) -> Result<GateResult, ClassifierError> {
        if distribution.is_empty() {
            return Err(ClassifierError::PredictionError(
                "Model returned an empty distribution".into(),
            ));
        }
        if let Some(pos) = distribution.iter().position(|p| !p.is_finite() || *p < 0.0) {
            return Err(ClassifierError::PredictionError(format!(
                "Model returned an invalid probability {} at position {}",
                distribution[pos], pos
            )));
        }

        let (index, max_prob) = distribution
            .iter()
            .copied()
            .enumerate()
            .fold((0, distribution[0]), |best, (i, p)| if p > best.1 { (i, p) } else { best });

        let confidence = max_prob.min(1.0);
        Ok(GateResult {
            index,
            confidence,
            passed: confidence >= self.threshold,
        })
    }
}
