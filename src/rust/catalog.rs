use std::collections::HashSet;
use std::fs;
use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::classifier::ClassifierError;

/// Labels of the bundled logo model, in training order.
const BUILTIN_LABELS: [&str; 63] = [
    "Adidas", "Amazon", "Android", "Apple", "Ariel", "Bic", "BMW", "Burger King", "Cadbury",
    "Chevrolet", "Chrome", "Coca Cola", "Cowbell", "Dominos", "Fila", "Gillette", "Google",
    "Goya oil", "Guinness", "Heinz", "Honda", "Hp", "Huawei", "Instagram", "Kfc",
    "Krisspy Kreme", "Lays", "Levi's", "Lg", "Lipton", "M&m", "Mars", "Marvel", "McDonald",
    "Mercedes Benz", "Microsoft", "Mtn", "Mtn dew", "NASA", "Nescafe", "Nestle", "Nestle milo",
    "Netflix", "Nike", "Nutella", "Oral b", "Oreo", "Pay pal", "Peak milk", "Pepsi",
    "PlayStation", "Pringles", "Puma", "Reebok", "Rolex", "Samsung", "Sprite", "Starbucks",
    "Tesla", "Tiktok", "Twitter", "YouTube", "Zara",
];

const BUILTIN_VERSION: &str = "best_model3";

/// Ordered list of brand labels, indexed by classifier output position.
///
/// The order must match the label order used when the model was trained.
/// Catalog files are JSON:
///
/// ```json
/// { "version": "best_model3", "labels": ["Adidas", "Amazon", "..."] }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CatalogFile")]
pub struct BrandCatalog {
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<String>,
    labels: Vec<String>,
}

/// On-disk shape of a catalog, before its labels are validated.
#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    version: Option<String>,
    labels: Vec<String>,
}

impl TryFrom<CatalogFile> for BrandCatalog {
    type Error = ClassifierError;

    fn try_from(file: CatalogFile) -> Result<Self, Self::Error> {
        let catalog = Self {
            version: file.version,
            labels: file.labels,
        };
        catalog.validate()?;
        Ok(catalog)
    }
}

impl BrandCatalog {
    /// Creates a catalog from labels in model output order.
    ///
    /// # Errors
    /// - `ValidationError` if the list is empty, a label is blank, or a label repeats
    pub fn new(labels: Vec<impl Into<String>>) -> Result<Self, ClassifierError> {
        let catalog = Self {
            version: None,
            labels: labels.into_iter().map(Into::into).collect(),
        };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The 63-brand catalog the bundled model was trained with.
    pub fn builtin() -> Self {
        Self {
            version: Some(BUILTIN_VERSION.to_string()),
            labels: BUILTIN_LABELS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Parses a catalog from its JSON representation.
    ///
    /// # Errors
    /// - `ModelLoadError` if the JSON is malformed
    /// - `ValidationError` if the labels are invalid
    pub fn from_json(json: &str) -> Result<Self, ClassifierError> {
        let file: CatalogFile = serde_json::from_str(json)
            .map_err(|e| ClassifierError::ModelLoadError(format!("Invalid catalog file: {}", e)))?;
        Self::try_from(file)
    }

    /// Loads a catalog file shipped alongside the model.
    ///
    /// # Errors
    /// - `ModelLoadError` if the file is missing or malformed
    /// - `ValidationError` if the labels are invalid
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ClassifierError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|e| {
            ClassifierError::ModelLoadError(format!(
                "Failed to read catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_json(&json)?;
        info!(
            "Loaded catalog {} ({} brands, version {})",
            path.display(),
            catalog.len(),
            catalog.version().unwrap_or("unversioned")
        );
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, ClassifierError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ClassifierError::ValidationError(format!("Failed to serialize catalog: {}", e)))
    }

    fn validate(&self) -> Result<(), ClassifierError> {
        if self.labels.is_empty() {
            return Err(ClassifierError::ValidationError(
                "Catalog must contain at least one brand".into(),
            ));
        }
        if let Some(pos) = self.labels.iter().position(|l| l.trim().is_empty()) {
            return Err(ClassifierError::ValidationError(format!(
                "Brand {} cannot be empty",
                pos + 1
            )));
        }
        let mut seen = HashSet::new();
        for label in &self.labels {
            if !seen.insert(label.as_str()) {
                return Err(ClassifierError::ValidationError(format!(
                    "Brand '{}' appears more than once",
                    label
                )));
            }
        }
        Ok(())
    }

    pub fn label(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(String::as_str)
    }

    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels.iter().position(|l| l == label)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}

impl Default for BrandCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
