//! Build recipes, arguments, and descriptions.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::BuilderContext;

/// An opaque failure reported by an external build recipe.
///
/// The engine passes it through unmodified, only recording which variant
/// and phase it came from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct BuilderFailure(pub String);

impl BuilderFailure {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// User-supplied build arguments for one artifact.
///
/// Kept separate from [`BuilderContext`]: context is read-only and derived
/// from the variant, arguments are caller-owned and override-able, so the
/// two can never collide on a field name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BuildArgs {
    args: BTreeMap<String, Value>,
}

impl BuildArgs {
    /// Create an empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument, builder-style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.args.insert(name.into(), value.into());
        self
    }

    /// Set an argument in place.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.args.insert(name.into(), value.into());
    }

    /// Remove an argument.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.args.remove(name)
    }

    /// Look up an argument.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.args.get(name)
    }

    /// Iterate arguments in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.args.iter()
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.args.len()
    }

    /// Whether there are no arguments.
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }
}

/// A build description produced by a recipe.
///
/// Opaque to the engine; an external collaborator materializes it into a
/// concrete build. Structural equality makes determinism observable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildDescription {
    /// Package name.
    pub name: String,
    /// The variant version this description was derived from.
    pub version: String,
    /// Recipe-defined fields.
    pub fields: BTreeMap<String, Value>,
}

impl BuildDescription {
    /// Create a description with no fields.
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a field, builder-style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(name.into(), value.into());
        self
    }

    /// Look up a field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Stage two of the curried recipe contract: a recipe with its variant
/// context already bound.
///
/// Cloning shares the underlying closure, so one configuration is reused
/// across any number of argument sets (initial build plus overrides) without
/// re-deriving version predicates.
#[derive(Clone)]
pub struct ConfiguredRecipe {
    build: Rc<dyn Fn(&BuildArgs) -> Result<BuildDescription, BuilderFailure>>,
}

impl ConfiguredRecipe {
    /// Wrap a stage-two closure.
    pub fn new(
        build: impl Fn(&BuildArgs) -> Result<BuildDescription, BuilderFailure> + 'static,
    ) -> Self {
        Self {
            build: Rc::new(build),
        }
    }

    /// Produce a build description for the given arguments.
    pub fn invoke(&self, args: &BuildArgs) -> Result<BuildDescription, BuilderFailure> {
        (self.build)(args)
    }
}

impl fmt::Debug for ConfiguredRecipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ConfiguredRecipe")
    }
}

/// A two-stage build recipe.
///
/// Stage one (`configure`) binds version-derived context; the returned
/// [`ConfiguredRecipe`] is stage two, invoked once per argument set.
pub trait BuildRecipe {
    fn configure(&self, context: &BuilderContext) -> Result<ConfiguredRecipe, BuilderFailure>;
}

impl<F> BuildRecipe for F
where
    F: Fn(&BuilderContext) -> Result<ConfiguredRecipe, BuilderFailure>,
{
    fn configure(&self, context: &BuilderContext) -> Result<ConfiguredRecipe, BuilderFailure> {
        self(context)
    }
}
