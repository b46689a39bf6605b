use std::path::Path;
use std::sync::Arc;

use log::{info, warn};

use super::{DecisionThresholds, LogoDetector};
use crate::catalog::BrandCatalog;
use crate::classifier::{ClassifierError, LogoModel, OnnxLogoModel, OutputActivation};
use crate::gate::ConfidenceGate;
use crate::matcher::NameMatcher;
use crate::model_manager::ModelManager;
use crate::runtime::RuntimeConfig;

/// A builder for constructing a LogoDetector with a fluent interface.
#[derive(Debug, Default)]
pub struct LogoDetectorBuilder {
    model: Option<Arc<dyn LogoModel>>,
    catalog: Option<BrandCatalog>,
    runtime_config: RuntimeConfig,
    activation: OutputActivation,
    thresholds: DecisionThresholds,
}

impl LogoDetectorBuilder {
    /// Creates a new empty LogoDetectorBuilder instance with default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the runtime configuration for ONNX model execution.
    ///
    /// Only affects models loaded afterwards with [`Self::with_model_file`] or
    /// [`Self::with_managed_model`].
    pub fn with_runtime_config(mut self, config: RuntimeConfig) -> Self {
        self.runtime_config = config;
        self
    }

    /// Declares whether the model outputs probabilities or raw logits.
    ///
    /// Only affects models loaded afterwards.
    pub fn with_output_activation(mut self, activation: OutputActivation) -> Self {
        self.activation = activation;
        self
    }

    /// Loads an ONNX model from disk.
    ///
    /// # Returns
    /// * `Result<Self, ClassifierError>` - The builder instance if successful, or an error if:
    ///   - A model is already set
    ///   - The path is empty or the file doesn't exist
    ///   - The model failed to load or has an unexpected structure
    ///
    /// # Example
    /// ```no_run
    /// use logoguard::LogoDetectorBuilder;
    ///
    /// let builder = LogoDetectorBuilder::new()
    ///     .with_model_file("path/to/model.onnx");
    /// ```
    pub fn with_model_file(mut self, model_path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let model_path = model_path.as_ref();
        if model_path.as_os_str().is_empty() {
            return Err(ClassifierError::ModelLoadError("Model path cannot be empty".to_string()));
        }
        self.ensure_model_unset()?;

        let model = OnnxLogoModel::load(model_path, &self.runtime_config, self.activation)?;
        self.model = Some(Arc::new(model));
        Ok(self)
    }

    /// Loads a model previously fetched by a [`ModelManager`].
    ///
    /// If the manager also holds a catalog for this model and no catalog was
    /// set yet, that catalog is used.
    pub fn with_managed_model(mut self, manager: &ModelManager, name: &str) -> Result<Self, ClassifierError> {
        let model_path = manager.require_model(name)?;
        self = self.with_model_file(model_path)?;

        if self.catalog.is_none() && manager.has_catalog(name) {
            self = self.with_catalog_file(manager.get_catalog_path(name))?;
        }
        Ok(self)
    }

    /// Uses an already constructed model.
    pub fn with_model(mut self, model: Arc<dyn LogoModel>) -> Result<Self, ClassifierError> {
        self.ensure_model_unset()?;
        self.model = Some(model);
        Ok(self)
    }

    /// Sets the label list matching the model's output order.
    pub fn with_catalog(mut self, catalog: BrandCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_catalog_file(self, path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let catalog = BrandCatalog::from_file(path)?;
        Ok(self.with_catalog(catalog))
    }

    /// Overrides the decision thresholds.
    pub fn with_thresholds(mut self, thresholds: DecisionThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    fn ensure_model_unset(&self) -> Result<(), ClassifierError> {
        if self.model.is_some() {
            return Err(ClassifierError::ModelLoadError("Model already set".to_string()));
        }
        Ok(())
    }

    /// Builds and returns the final LogoDetector instance
    ///
    /// # Returns
    /// * `Result<LogoDetector, ClassifierError>` - The constructed detector if successful, or an error if:
    ///   - No model is set
    ///   - The catalog size differs from the model output width
    ///   - A threshold lies outside `[0, 1]`
    pub fn build(self) -> Result<LogoDetector, ClassifierError> {
        let model = self
            .model
            .ok_or_else(|| ClassifierError::ModelLoadError("A model must be set".to_string()))?;

        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => {
                warn!("No catalog set, using the built-in brand catalog");
                BrandCatalog::builtin()
            }
        };

        if catalog.len() != model.output_width() {
            return Err(ClassifierError::ModelLoadError(format!(
                "Catalog has {} brands but the model outputs {} classes",
                catalog.len(),
                model.output_width()
            )));
        }

        self.thresholds.validate()?;

        info!(
            "Logo detector ready: {} with {} brands (catalog {})",
            model.describe(),
            catalog.len(),
            catalog.version().unwrap_or("unversioned")
        );

        Ok(LogoDetector {
            model,
            catalog: Arc::new(catalog),
            gate: ConfidenceGate::new(self.thresholds.confidence),
            matcher: NameMatcher::new(self.thresholds.similarity),
        })
    }
}
