//! Variant registry model and resolution for Varia.
//!
//! This crate provides:
//! - `VariantSpec`: a versioned variant description with arbitrary extra fields
//! - `VariantRegistry`: a deterministic mapping of variant key to spec
//! - `AliasGenerator`: conditional, backward-compatibility alias entries
//! - `resolve`: validation plus alias merging into a resolved registry

mod registry;
mod spec;

pub use registry::{
    resolve, AliasError, AliasGenerator, Config, DeprecationNotice, RegistryError, VariantRegistry,
};
pub use spec::{VariantKey, VariantSpec};
