//! Per-variant builder contexts.

use std::rc::Rc;

use varia_registry::{VariantKey, VariantRegistry, VariantSpec};
use varia_version::Version;

use crate::{EngineError, Phase};

/// Read-only, per-variant helper context, bound before user build arguments
/// apply.
///
/// Carries the variant's spec, its parsed version, and range predicates
/// rooted at that version. Contexts are `Rc`-shared between an artifact and
/// its overrides; they are never mutated after binding.
#[derive(Debug)]
pub struct BuilderContext {
    key: VariantKey,
    spec: VariantSpec,
    version: Version,
    registry: Rc<VariantRegistry>,
}

impl BuilderContext {
    /// Bind the context for `key` in a resolved registry.
    ///
    /// The key must exist; `resolve` has already guaranteed the version
    /// parses, so a parse failure here means the registry was constructed
    /// outside `resolve` and is reported against the binding phase.
    pub(crate) fn bind(
        key: &str,
        registry: Rc<VariantRegistry>,
    ) -> Result<Rc<Self>, EngineError> {
        let spec = registry
            .get(key)
            .cloned()
            .ok_or_else(|| EngineError::UnknownVariant {
                key: key.to_string(),
            })?;
        let version =
            spec.parsed_version()
                .map_err(|source| EngineError::InvalidVersion {
                    key: key.to_string(),
                    phase: Phase::Binding,
                    source,
                })?;

        Ok(Rc::new(Self {
            key: key.to_string(),
            spec,
            version,
            registry,
        }))
    }

    /// The variant key this context was bound for.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The variant's spec, extra fields included.
    pub fn spec(&self) -> &VariantSpec {
        &self.spec
    }

    /// The variant's parsed version.
    pub fn version(&self) -> &Version {
        &self.version
    }

    /// The resolved registry this variant belongs to.
    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    /// Whether this variant's version is strictly before `reference`.
    pub fn older_than(&self, reference: &str) -> Result<bool, EngineError> {
        Ok(self.version.older_than(&self.parse_reference(reference)?))
    }

    /// Whether this variant's version is at or after `reference`.
    pub fn at_least(&self, reference: &str) -> Result<bool, EngineError> {
        Ok(self.version.at_least(&self.parse_reference(reference)?))
    }

    /// Whether this variant's version is in the half-open range `[lo, hi)`.
    pub fn between(&self, lo: &str, hi: &str) -> Result<bool, EngineError> {
        Ok(self
            .version
            .between(&self.parse_reference(lo)?, &self.parse_reference(hi)?))
    }

    fn parse_reference(&self, reference: &str) -> Result<Version, EngineError> {
        Version::parse(reference).map_err(|source| EngineError::InvalidVersion {
            key: self.key.clone(),
            phase: Phase::Binding,
            source,
        })
    }
}
