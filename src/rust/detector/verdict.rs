use std::fmt;

use serde::Serialize;

/// Final decision on a logo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Outcome {
    Real,
    Fake,
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Real => write!(f, "REAL"),
            Self::Fake => write!(f, "FAKE"),
        }
    }
}

/// Which step of the pipeline settled the outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// The model was not confident; the claimed brand was never compared.
    LowConfidence,
    /// The model was confident but the claimed brand does not match its label.
    BrandMismatch,
    /// The model was confident and the claimed brand matches its label.
    BrandMatch,
}

/// The outcome for one image plus the evidence behind it.
///
/// `predicted_label` and `confidence` are always filled in, including for fake
/// verdicts, so callers can show what the model thought the logo was.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub outcome: Outcome,
    pub predicted_label: String,
    pub confidence: f32,
    pub expected_brand: String,
    pub reason: VerdictReason,
    /// Similarity between the label and the claimed brand, when it was computed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
}

impl Verdict {
    pub fn is_real(&self) -> bool {
        self.outcome == Outcome::Real
    }

    /// The model was unsure; callers should present this as a soft warning.
    pub fn is_low_confidence(&self) -> bool {
        self.reason == VerdictReason::LowConfidence
    }

    /// The model was sure, but about a different brand than the one claimed.
    pub fn is_brand_mismatch(&self) -> bool {
        self.reason == VerdictReason::BrandMismatch
    }
}
