//! Variant registries and alias resolution.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use varia_version::VersionError;

use crate::{VariantKey, VariantSpec};

/// Errors that can occur during registry resolution.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("variant '{key}' is malformed: missing or non-string 'version' field")]
    MalformedVariant { key: VariantKey },

    #[error("variant '{key}' has an invalid version: {source}")]
    InvalidVersion {
        key: VariantKey,
        #[source]
        source: VersionError,
    },

    #[error("alias '{key}' failed to resolve: {message}")]
    AliasResolution { key: VariantKey, message: String },

    #[error("alias generator failed: {message}")]
    AliasGenerator { message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure reported by an alias generator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AliasError {
    /// An alias copied fields from a variant that is not in the registry.
    #[error("alias '{alias}' references unknown variant '{referenced}'")]
    UnknownVariant {
        alias: VariantKey,
        referenced: VariantKey,
    },

    /// Any other generator failure.
    #[error("{0}")]
    Failed(String),
}

/// Produces backward-compatibility alias entries from a loaded registry.
///
/// Generators must be pure: the same registry yields the same aliases. They
/// are consulted only when [`Config::allow_aliases`] is set, so a generator
/// may freely reference variants that would be absent with aliasing off.
pub trait AliasGenerator {
    fn aliases(
        &self,
        raw: &VariantRegistry,
    ) -> Result<BTreeMap<VariantKey, VariantSpec>, AliasError>;
}

impl<F> AliasGenerator for F
where
    F: Fn(&VariantRegistry) -> Result<BTreeMap<VariantKey, VariantSpec>, AliasError>,
{
    fn aliases(
        &self,
        raw: &VariantRegistry,
    ) -> Result<BTreeMap<VariantKey, VariantSpec>, AliasError> {
        self(raw)
    }
}

/// Registry resolution options.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether alias entries are generated and merged. Hosts usually leave
    /// this on; turning it off drops every alias before it is ever computed.
    pub allow_aliases: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            allow_aliases: true,
        }
    }
}

/// A deprecation notice attached to a registry entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationNotice {
    /// The deprecated variant key.
    pub key: VariantKey,
    /// Human-readable guidance, from the entry's `deprecated` field.
    pub message: String,
}

/// A deterministic mapping of variant key to spec.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VariantRegistry {
    variants: BTreeMap<VariantKey, VariantSpec>,
}

impl VariantRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a variant, replacing any previous entry for the key.
    pub fn insert(&mut self, key: impl Into<VariantKey>, spec: VariantSpec) {
        self.variants.insert(key.into(), spec);
    }

    /// Look up a variant by key.
    pub fn get(&self, key: &str) -> Option<&VariantSpec> {
        self.variants.get(key)
    }

    /// Whether the registry contains `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.variants.contains_key(key)
    }

    /// Iterate entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&VariantKey, &VariantSpec)> {
        self.variants.iter()
    }

    /// Iterate keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &VariantKey> {
        self.variants.keys()
    }

    /// Number of variants.
    pub fn len(&self) -> usize {
        self.variants.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }

    /// Build a registry from loose JSON (`{"key": {"version": ...}, ...}`),
    /// validating each entry's shape.
    pub fn from_json(json: &str) -> Result<Self, RegistryError> {
        let value: BTreeMap<VariantKey, Value> = serde_json::from_str(json)?;
        let mut registry = Self::new();
        for (key, entry) in &value {
            registry.insert(key.clone(), VariantSpec::from_value(key, entry)?);
        }
        Ok(registry)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, RegistryError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Collect deprecation notices for an external warning collaborator.
    ///
    /// Entries (typically aliases) mark themselves with a `deprecated` extra
    /// field: a string is used verbatim, any other truthy value gets a
    /// generic message.
    pub fn deprecation_notices(&self) -> Vec<DeprecationNotice> {
        self.variants
            .iter()
            .filter_map(|(key, spec)| {
                let message = match spec.get("deprecated")? {
                    Value::String(s) => s.clone(),
                    Value::Bool(false) | Value::Null => return None,
                    _ => format!("variant '{key}' is deprecated"),
                };
                Some(DeprecationNotice {
                    key: key.clone(),
                    message,
                })
            })
            .collect()
    }

    fn validate(&self) -> Result<(), RegistryError> {
        for (key, spec) in &self.variants {
            spec.parsed_version()
                .map_err(|source| RegistryError::InvalidVersion {
                    key: key.clone(),
                    source,
                })?;
        }
        Ok(())
    }
}

impl FromIterator<(VariantKey, VariantSpec)> for VariantRegistry {
    fn from_iter<I: IntoIterator<Item = (VariantKey, VariantSpec)>>(iter: I) -> Self {
        Self {
            variants: iter.into_iter().collect(),
        }
    }
}

/// Resolve a raw registry into its final form.
///
/// Every raw entry is validated (a parseable `version` is required). The
/// alias generator runs only when `config.allow_aliases` is set; its entries
/// are validated the same way and overlaid onto the raw registry, with the
/// alias winning on key collision.
pub fn resolve(
    raw: VariantRegistry,
    alias_generator: Option<&dyn AliasGenerator>,
    config: &Config,
) -> Result<VariantRegistry, RegistryError> {
    raw.validate()?;

    let mut resolved = raw;
    if config.allow_aliases {
        if let Some(generator) = alias_generator {
            let aliases = generator.aliases(&resolved).map_err(|err| match err {
                AliasError::UnknownVariant { ref alias, .. } => RegistryError::AliasResolution {
                    key: alias.clone(),
                    message: err.to_string(),
                },
                AliasError::Failed(message) => RegistryError::AliasGenerator { message },
            })?;
            for (key, spec) in aliases {
                spec.parsed_version()
                    .map_err(|source| RegistryError::InvalidVersion {
                        key: key.clone(),
                        source,
                    })?;
                resolved.insert(key, spec);
            }
        }
    }

    Ok(resolved)
}
