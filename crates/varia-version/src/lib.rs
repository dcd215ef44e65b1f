//! Version parsing and ordering for Varia.
//!
//! Variant versions are not semver: strings like `1.1.1w` or `3.0.0-rc1`
//! must parse and order sensibly. This crate provides:
//! - `Version`: a parsed version string with a total ordering
//! - `compare`: one-shot comparison of two version strings
//! - Range predicates: `older_than`, `at_least`, `between`

mod version;

pub use version::{compare, Version, VersionError};
