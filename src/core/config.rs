use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::error::DianError;

/// DIAN / UBL 2.1 namespace URIs.
pub mod dian_ns {
    pub const CAC: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonAggregateComponents-2";
    pub const CBC: &str = "urn:oasis:names:specification:ubl:schema:xsd:CommonBasicComponents-2";
    pub const EXT: &str =
        "urn:oasis:names:specification:ubl:schema:xsd:CommonExtensionComponents-2";
    pub const STS: &str = "dian:gov:co:facturaelectronica:Structures-2-1";
}

/// Prefix to URI bindings used when compiling path queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Namespaces(BTreeMap<String, String>);

impl Namespaces {
    /// No bindings at all.
    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    /// The four bindings DIAN documents use: `cac`, `cbc`, `ext`, `sts`.
    pub fn dian() -> Self {
        Self::empty()
            .with("cac", dian_ns::CAC)
            .with("cbc", dian_ns::CBC)
            .with("ext", dian_ns::EXT)
            .with("sts", dian_ns::STS)
    }

    pub fn with(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.0.insert(prefix.into(), uri.into());
        self
    }

    pub fn resolve(&self, prefix: &str) -> Option<&str> {
        self.0.get(prefix).map(String::as_str)
    }
}

impl Default for Namespaces {
    fn default() -> Self {
        Self::dian()
    }
}

/// Parser settings. Constructed by the caller and passed into every parse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Bindings for the prefixes used in field paths.
    pub namespaces: Namespaces,

    /// Recover from malformed markup instead of failing the file.
    pub recover: bool,

    /// Batch and folder-scan settings.
    pub batch: BatchConfig,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            namespaces: Namespaces::dian(),
            recover: true,
            batch: BatchConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Worker threads; `0` means one per available core.
    pub workers: usize,

    /// File extensions picked up by folder scans (case-insensitive, no dot).
    pub extensions: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            workers: 0,
            extensions: vec!["xml".to_string()],
        }
    }
}

impl ParserConfig {
    /// Load configuration from a JSON file. Missing keys take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, DianError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, DianError> {
        serde_json::from_str(json).map_err(|e| DianError::Config(e.to_string()))
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), DianError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| DianError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Whether `path` has one of the configured batch extensions.
    pub fn accepts_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.batch
            .extensions
            .iter()
            .any(|e| e.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_dian_prefixes() {
        let cfg = ParserConfig::default();
        assert_eq!(cfg.namespaces.resolve("cbc"), Some(dian_ns::CBC));
        assert_eq!(cfg.namespaces.resolve("sts"), Some(dian_ns::STS));
        assert_eq!(cfg.namespaces.resolve("ds"), None);
        assert!(cfg.recover);
        assert_eq!(cfg.batch.workers, 0);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg = ParserConfig::from_json(r#"{"recover": false, "batch": {"workers": 2}}"#).unwrap();
        assert!(!cfg.recover);
        assert_eq!(cfg.batch.workers, 2);
        assert_eq!(cfg.batch.extensions, vec!["xml"]);
        assert_eq!(cfg.namespaces, Namespaces::dian());
    }

    #[test]
    fn bad_json_is_config_error() {
        let err = ParserConfig::from_json("{recover:").unwrap_err();
        assert!(matches!(err, DianError::Config(_)));
    }

    #[test]
    fn extension_match_ignores_case() {
        let cfg = ParserConfig::default();
        assert!(cfg.accepts_extension(Path::new("a/FV001.XML")));
        assert!(cfg.accepts_extension(Path::new("fv.xml")));
        assert!(!cfg.accepts_extension(Path::new("fv.zip")));
        assert!(!cfg.accepts_extension(Path::new("README")));
    }
}
