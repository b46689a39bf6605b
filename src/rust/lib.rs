//! Fake logo detection on top of an ONNX image classifier.
//!
//! A [`LogoDetector`] classifies a logo image against a fixed [`BrandCatalog`]
//! and checks the prediction against the brand the caller claims the logo
//! belongs to. Low-confidence predictions are reported as fake without looking
//! at the claimed brand; confident ones are compared with a fuzzy
//! similarity ratio.
//!
//! # Basic Usage
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use logoguard::{LogoDetector, Outcome};
//!
//! let detector = LogoDetector::builder()
//!     .with_model_file("models/logos/model.onnx")?
//!     .build()?;
//!
//! let bytes = std::fs::read("nike.png")?;
//! let verdict = detector.classify_logo(&bytes, "Nike")?;
//! if verdict.outcome == Outcome::Real {
//!     println!("Logo is real ({:.2}%)", verdict.confidence * 100.0);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Thread Safety
//!
//! The detector loads its model once and is read-only afterwards, so it can be
//! shared across threads using `Arc`:
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use logoguard::LogoDetector;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let detector = Arc::new(LogoDetector::builder()
//!     .with_model_file("models/logos/model.onnx")?
//!     .build()?);
//!
//! let bytes = Arc::new(std::fs::read("nike.png")?);
//! let mut handles = vec![];
//! for _ in 0..3 {
//!     let detector = Arc::clone(&detector);
//!     let bytes = Arc::clone(&bytes);
//!     handles.push(thread::spawn(move || {
//!         detector.classify_logo(&bytes, "nike").unwrap();
//!     }));
//! }
//!
//! for handle in handles {
//!     handle.join().unwrap();
//! }
//! # Ok(())
//! # }
//! ```

pub mod catalog;
pub mod classifier;
pub mod detector;
pub mod gate;
pub mod matcher;
pub mod model_manager;
pub mod models;
pub mod preprocess;
mod runtime;

pub use catalog::BrandCatalog;
pub use classifier::{ClassifierError, LogoModel, OnnxLogoModel, OutputActivation};
pub use detector::{
    DecisionThresholds, DetectorInfo, LogoDetector, LogoDetectorBuilder, Outcome, Verdict,
    VerdictReason,
};
pub use gate::{ConfidenceGate, GateResult, CONFIDENCE_THRESHOLD};
pub use matcher::{similarity_ratio, MatchResult, NameMatcher, SIMILARITY_THRESHOLD};
pub use model_manager::{ModelError, ModelManager};
pub use models::ModelInfo;
pub use preprocess::{ImageTensor, INPUT_CHANNELS, INPUT_SIZE};
pub use runtime::{create_session_builder, RuntimeConfig};

pub fn init_logger() {
    env_logger::init();
}
