use serde::{Deserialize, Serialize};

/// Where to fetch a logo model from and how to verify it.
///
/// The catalog is optional: models trained on the built-in brand list can be
/// published without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    pub model_url: String,
    /// Hex-encoded SHA-256 of the model file
    pub model_hash: String,
    #[serde(default)]
    pub catalog_url: Option<String>,
    /// Hex-encoded SHA-256 of the catalog file
    #[serde(default)]
    pub catalog_hash: Option<String>,
}

impl ModelInfo {
    pub fn new(
        name: impl Into<String>,
        model_url: impl Into<String>,
        model_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            model_url: model_url.into(),
            model_hash: model_hash.into().to_lowercase(),
            catalog_url: None,
            catalog_hash: None,
        }
    }

    pub fn with_catalog(mut self, catalog_url: impl Into<String>, catalog_hash: impl Into<String>) -> Self {
        self.catalog_url = Some(catalog_url.into());
        self.catalog_hash = Some(catalog_hash.into().to_lowercase());
        self
    }

    /// The catalog URL and hash, when both are set.
    pub fn catalog(&self) -> Option<(&str, &str)> {
        match (&self.catalog_url, &self.catalog_hash) {
            (Some(url), Some(hash)) => Some((url, hash)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_info_catalog() {
        let info = ModelInfo::new("logos", "https://example.com/model.onnx", "ABCDEF");
        assert_eq!(info.model_hash, "abcdef");
        assert!(info.catalog().is_none());

        let info = info.with_catalog("https://example.com/catalog.json", "0123");
        assert_eq!(info.catalog(), Some(("https://example.com/catalog.json", "0123")));
    }
}
