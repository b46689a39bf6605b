//! Decision composer: runs preprocessing, the classifier, the confidence gate
//! and the name matcher, and turns their results into a [`Verdict`].

mod builder;
mod verdict;

use std::path::Path;
use std::sync::Arc;

use log::debug;
use serde::Serialize;

pub use builder::LogoDetectorBuilder;
pub use verdict::{Outcome, Verdict, VerdictReason};

use crate::catalog::BrandCatalog;
use crate::classifier::{ClassifierError, LogoModel};
use crate::gate::{ConfidenceGate, CONFIDENCE_THRESHOLD};
use crate::matcher::{NameMatcher, SIMILARITY_THRESHOLD};
use crate::preprocess::ImageTensor;

/// Confidence and similarity cut-offs used by the detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DecisionThresholds {
    /// Minimum top probability to trust the prediction
    pub confidence: f32,
    /// Minimum similarity between predicted label and claimed brand
    pub similarity: f64,
}

impl Default for DecisionThresholds {
    fn default() -> Self {
        Self {
            confidence: CONFIDENCE_THRESHOLD,
            similarity: SIMILARITY_THRESHOLD,
        }
    }
}

impl DecisionThresholds {
    fn validate(&self) -> Result<(), ClassifierError> {
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(ClassifierError::ValidationError(format!(
                "Confidence threshold must be within [0, 1], got {}",
                self.confidence
            )));
        }
        if !(0.0..=1.0).contains(&self.similarity) {
            return Err(ClassifierError::ValidationError(format!(
                "Similarity threshold must be within [0, 1], got {}",
                self.similarity
            )));
        }
        Ok(())
    }
}

/// Summary of a built detector.
#[derive(Debug, Clone, Serialize)]
pub struct DetectorInfo {
    pub model: String,
    pub num_brands: usize,
    pub catalog_version: Option<String>,
    pub thresholds: DecisionThresholds,
}

/// Checks logo images against the brand they claim to be.
///
/// The model is loaded once when the detector is built and only read
/// afterwards. Every call is independent of the others.
#[derive(Debug)]
pub struct LogoDetector {
    model: Arc<dyn LogoModel>,
    catalog: Arc<BrandCatalog>,
    gate: ConfidenceGate,
    matcher: NameMatcher,
}

// Compile-time verification of thread-safety
const _: () = {
    fn assert_send_sync<T: Send + Sync>() {}
    fn verify_thread_safety() {
        assert_send_sync::<LogoDetector>();
    }
};

impl LogoDetector {
    /// Creates a new LogoDetectorBuilder for fluent construction
    pub fn builder() -> LogoDetectorBuilder {
        LogoDetectorBuilder::new()
    }

    /// Returns information about the detector's current state
    pub fn info(&self) -> DetectorInfo {
        DetectorInfo {
            model: self.model.describe(),
            num_brands: self.catalog.len(),
            catalog_version: self.catalog.version().map(str::to_string),
            thresholds: DecisionThresholds {
                confidence: self.gate.threshold(),
                similarity: self.matcher.threshold(),
            },
        }
    }

    pub fn catalog(&self) -> &BrandCatalog {
        &self.catalog
    }

    /// Decides whether the image is a real logo of `expected_brand`.
    ///
    /// # Errors
    /// - `ValidationError` if `expected_brand` is blank
    /// - `DecodeError` if the bytes are not a readable image
    /// - `PredictionError` if the model fails or returns an unusable distribution
    pub fn classify_logo(&self, image_bytes: &[u8], expected_brand: &str) -> Result<Verdict, ClassifierError> {
        validate_brand(expected_brand)?;
        let tensor = ImageTensor::from_bytes(image_bytes)?;
        self.decide(&tensor, expected_brand)
    }

    /// Like [`Self::classify_logo`], reading the image from a file.
    pub fn classify_file(&self, path: impl AsRef<Path>, expected_brand: &str) -> Result<Verdict, ClassifierError> {
        validate_brand(expected_brand)?;
        let tensor = ImageTensor::from_path(path)?;
        self.decide(&tensor, expected_brand)
    }

    /// Runs the decision pipeline on an already normalized image.
    pub fn classify_tensor(&self, tensor: &ImageTensor, expected_brand: &str) -> Result<Verdict, ClassifierError> {
        validate_brand(expected_brand)?;
        self.decide(tensor, expected_brand)
    }

    fn decide(&self, tensor: &ImageTensor, expected_brand: &str) -> Result<Verdict, ClassifierError> {
        let distribution = self.model.predict(tensor)?;
        if distribution.len() != self.catalog.len() {
            return Err(ClassifierError::PredictionError(format!(
                "Model returned {} scores for a catalog of {} brands",
                distribution.len(),
                self.catalog.len()
            )));
        }

        let top = self.gate.evaluate(&distribution)?;
        let predicted_label = self
            .catalog
            .label(top.index)
            .ok_or_else(|| ClassifierError::PredictionError(format!("No brand at index {}", top.index)))?
            .to_string();

        if !top.passed {
            debug!(
                "Low confidence {:.4} for '{}', skipping name match",
                top.confidence, predicted_label
            );
            return Ok(Verdict {
                outcome: Outcome::Fake,
                predicted_label,
                confidence: top.confidence,
                expected_brand: expected_brand.to_string(),
                reason: VerdictReason::LowConfidence,
                similarity: None,
            });
        }

        let name_match = self.matcher.compare(&predicted_label, expected_brand);
        debug!(
            "Predicted '{}' ({:.4}), claimed '{}', similarity {:.4}",
            predicted_label, top.confidence, expected_brand, name_match.ratio
        );

        let (outcome, reason) = if name_match.matched {
            (Outcome::Real, VerdictReason::BrandMatch)
        } else {
            (Outcome::Fake, VerdictReason::BrandMismatch)
        };

        Ok(Verdict {
            outcome,
            predicted_label,
            confidence: top.confidence,
            expected_brand: expected_brand.to_string(),
            reason,
            similarity: Some(name_match.ratio),
        })
    }
}

fn validate_brand(expected_brand: &str) -> Result<(), ClassifierError> {
    if expected_brand.trim().is_empty() {
        return Err(ClassifierError::ValidationError(
            "Expected brand name cannot be empty".into(),
        ));
    }
    Ok(())
}
