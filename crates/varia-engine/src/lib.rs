//! Artifact construction engine for Varia.
//!
//! This crate turns a resolved variant registry into build artifacts:
//! - `BuilderContext`: per-variant derived helpers bound before user
//!   build arguments apply
//! - `BuildRecipe`/`ConfiguredRecipe`: the two-stage curried recipe contract
//! - `Artifact`: an immutable, override-able build result
//! - `Siblings`: a lazy, memoized map of every sibling variant's artifact
//! - `instantiate`: the entry point tying resolution, selection, and
//!   construction together
//!
//! Evaluation is single-threaded and pull-based: nothing is built until it
//! is observed, and within one `instantiate` call each variant is built at
//! most once.

mod artifact;
mod context;
mod entry;
mod recipe;
mod siblings;

use std::fmt;

use thiserror::Error;
use varia_registry::{RegistryError, VariantKey};
use varia_version::VersionError;

pub use artifact::Artifact;
pub use context::BuilderContext;
pub use entry::{instantiate, DefaultSelector, Selection};
pub use recipe::{BuildArgs, BuildDescription, BuildRecipe, BuilderFailure, ConfiguredRecipe};
pub use siblings::Siblings;

/// The phase in which an engine error was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Registry resolution (validation and alias merging).
    Resolution,
    /// Binding a variant's context, including recipe configuration.
    Binding,
    /// Invoking a configured recipe with build arguments.
    Invocation,
    /// Recomputing a build description after an argument override.
    Override,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Resolution => "registry resolution",
            Phase::Binding => "binding",
            Phase::Invocation => "build invocation",
            Phase::Override => "override",
        };
        write!(f, "{name}")
    }
}

/// Errors that can occur during artifact construction.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("registry resolution failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("invalid version for variant '{key}' during {phase}: {source}")]
    InvalidVersion {
        key: VariantKey,
        phase: Phase,
        #[source]
        source: VersionError,
    },

    #[error("default selector chose {selected}, which is absent from the resolved registry")]
    Selector { selected: String },

    #[error("unknown variant '{key}' requested from the sibling map")]
    UnknownVariant { key: VariantKey },

    #[error("build recipe failed for variant '{key}' during {phase}: {source}")]
    Recipe {
        key: VariantKey,
        phase: Phase,
        #[source]
        source: BuilderFailure,
    },
}
