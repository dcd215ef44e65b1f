//! Lazy sibling artifact maps.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use varia_registry::{VariantKey, VariantRegistry};

use crate::{Artifact, BuildArgs, BuildRecipe, EngineError};

/// Lazily-built artifacts for every key in a resolved registry.
///
/// Each entry is constructed on first access only, so reading one sibling
/// never forces construction of any other. Re-reading a key returns the
/// identical `Rc<Artifact>`: within one entry-point invocation a variant's
/// recipe runs at most once.
pub struct Siblings {
    registry: Rc<VariantRegistry>,
    recipe: Rc<dyn BuildRecipe>,
    args: BuildArgs,
    built: RefCell<BTreeMap<VariantKey, Rc<Artifact>>>,
}

impl Siblings {
    /// Create a sibling map over a resolved registry for one argument set.
    ///
    /// The entry point uses this for the default artifact's passthrough;
    /// hosts can also build maps for other argument sets directly.
    pub fn new(
        registry: Rc<VariantRegistry>,
        recipe: Rc<dyn BuildRecipe>,
        args: BuildArgs,
    ) -> Self {
        Self {
            registry,
            recipe,
            args,
            built: RefCell::new(BTreeMap::new()),
        }
    }

    /// Keys available in this map, in deterministic order.
    pub fn keys(&self) -> impl Iterator<Item = &VariantKey> {
        self.registry.keys()
    }

    /// Number of available variants.
    pub fn len(&self) -> usize {
        self.registry.len()
    }

    /// Whether the resolved registry was empty.
    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    /// Whether `key` is available.
    pub fn contains(&self, key: &str) -> bool {
        self.registry.contains(key)
    }

    /// Whether `key` has already been built. Access through [`Siblings::get`]
    /// is what builds it.
    pub fn is_built(&self, key: &str) -> bool {
        self.built.borrow().contains_key(key)
    }

    /// Get the artifact for `key`, building it on first access.
    pub fn get(&self, key: &str) -> Result<Rc<Artifact>, EngineError> {
        if let Some(existing) = self.built.borrow().get(key) {
            return Ok(existing.clone());
        }
        if !self.registry.contains(key) {
            return Err(EngineError::UnknownVariant {
                key: key.to_string(),
            });
        }

        // The recipe runs with the cache un-borrowed; re-entrant access to
        // this map from inside a recipe cannot panic.
        let artifact = Rc::new(Artifact::build(
            key,
            self.registry.clone(),
            self.recipe.as_ref(),
            self.args.clone(),
        )?);

        Ok(self
            .built
            .borrow_mut()
            .entry(key.to_string())
            .or_insert(artifact)
            .clone())
    }

    /// Pre-seed `key` with an already-built artifact. Later `get` calls for
    /// the key return this instance instead of rebuilding.
    pub(crate) fn seed(&self, key: &str, artifact: Rc<Artifact>) {
        self.built
            .borrow_mut()
            .entry(key.to_string())
            .or_insert(artifact);
    }
}

impl fmt::Debug for Siblings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Siblings")
            .field("available", &self.registry.len())
            .field("built", &self.built.borrow().len())
            .finish()
    }
}
