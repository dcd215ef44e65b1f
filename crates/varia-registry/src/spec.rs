//! Variant specifications.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use varia_version::{Version, VersionError};

use crate::RegistryError;

/// An opaque variant identifier, unique within a registry (e.g. `"v3_2"`).
pub type VariantKey = String;

/// A single variant specification.
///
/// Every spec carries a `version` string; all other fields (source locator,
/// hash, flags, deprecation metadata) are passed through to the build recipe
/// untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantSpec {
    /// The variant's version string.
    pub version: String,
    /// Arbitrary extra fields, preserved verbatim.
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl VariantSpec {
    /// Create a spec with only a version.
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            extra: BTreeMap::new(),
        }
    }

    /// Add an extra field.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// Look up an extra field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }

    /// Parse the version field.
    pub fn parsed_version(&self) -> Result<Version, VersionError> {
        Version::parse(&self.version)
    }

    /// Validate and convert a loose JSON value into a spec.
    ///
    /// `key` is only used for error reporting.
    pub fn from_value(key: &str, value: &Value) -> Result<Self, RegistryError> {
        let malformed = || RegistryError::MalformedVariant {
            key: key.to_string(),
        };

        let fields = value.as_object().ok_or_else(malformed)?;
        let version = fields
            .get("version")
            .and_then(Value::as_str)
            .ok_or_else(malformed)?
            .to_string();

        let extra = fields
            .iter()
            .filter(|(name, _)| name.as_str() != "version")
            .map(|(name, v)| (name.clone(), v.clone()))
            .collect();

        Ok(Self { version, extra })
    }
}
