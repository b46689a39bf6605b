//! The classifier seam: a trait for "image tensor in, class scores out" and the
//! ONNX Runtime implementation used in production.

mod error;
mod model;
mod onnx;

pub use error::ClassifierError;
pub use model::{LogoModel, OutputActivation};
pub use onnx::OnnxLogoModel;
