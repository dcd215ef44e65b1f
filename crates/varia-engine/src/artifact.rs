//! Override-able build artifacts.

use std::rc::Rc;

use varia_registry::VariantRegistry;

use crate::{
    BuildArgs, BuildDescription, BuildRecipe, BuilderContext, ConfiguredRecipe, EngineError,
    Phase, Siblings,
};

/// An immutable build result for one variant.
///
/// An artifact closes over the configured recipe that produced it, so
/// [`Artifact::override_args`] can recompute the description for new
/// arguments without re-binding the variant context. Overrides never mutate:
/// they return a new artifact, itself override-able.
#[derive(Debug, Clone)]
pub struct Artifact {
    context: Rc<BuilderContext>,
    recipe: ConfiguredRecipe,
    args: BuildArgs,
    description: BuildDescription,
    siblings: Option<Rc<Siblings>>,
}

impl Artifact {
    /// Bind, configure, and invoke the recipe for one variant.
    pub(crate) fn build(
        key: &str,
        registry: Rc<VariantRegistry>,
        recipe: &dyn BuildRecipe,
        args: BuildArgs,
    ) -> Result<Self, EngineError> {
        let context = BuilderContext::bind(key, registry)?;
        let configured = recipe
            .configure(&context)
            .map_err(|source| EngineError::Recipe {
                key: key.to_string(),
                phase: Phase::Binding,
                source,
            })?;
        let description = configured
            .invoke(&args)
            .map_err(|source| EngineError::Recipe {
                key: key.to_string(),
                phase: Phase::Invocation,
                source,
            })?;

        Ok(Self {
            context,
            recipe: configured,
            args,
            description,
            siblings: None,
        })
    }

    pub(crate) fn with_siblings(mut self, siblings: Rc<Siblings>) -> Self {
        self.siblings = Some(siblings);
        self
    }

    /// The build description produced for the current arguments.
    pub fn description(&self) -> &BuildDescription {
        &self.description
    }

    /// The variant context this artifact was built under.
    pub fn context(&self) -> &BuilderContext {
        &self.context
    }

    /// The arguments the current description was built with.
    pub fn args(&self) -> &BuildArgs {
        &self.args
    }

    /// Sibling variant artifacts, present on the entry point's default
    /// artifact only.
    pub fn siblings(&self) -> Option<&Siblings> {
        self.siblings.as_deref()
    }

    /// Recompute this artifact with transformed build arguments.
    ///
    /// Variant identity (the context) is immutable; only arguments change.
    /// The sibling map, when present, is shared as-is: overriding the
    /// default artifact neither alters nor rebuilds its siblings. Closed
    /// under composition:
    /// `a.override_args(f)?.override_args(g)` equals
    /// `a.override_args(|args| g(f(args)))`.
    pub fn override_args<F>(&self, transform: F) -> Result<Artifact, EngineError>
    where
        F: FnOnce(BuildArgs) -> BuildArgs,
    {
        let args = transform(self.args.clone());
        let description = self
            .recipe
            .invoke(&args)
            .map_err(|source| EngineError::Recipe {
                key: self.context.key().to_string(),
                phase: Phase::Override,
                source,
            })?;

        Ok(Self {
            context: self.context.clone(),
            recipe: self.recipe.clone(),
            args,
            description,
            siblings: self.siblings.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BuilderFailure;
    use serde_json::json;
    use varia_registry::VariantSpec;

    fn registry() -> Rc<VariantRegistry> {
        let mut registry = VariantRegistry::new();
        registry.insert("v3_3", VariantSpec::new("3.3.1"));
        Rc::new(registry)
    }

    fn recipe() -> impl BuildRecipe {
        |ctx: &BuilderContext| -> Result<ConfiguredRecipe, BuilderFailure> {
            let name = ctx.key().to_string();
            let version = ctx.version().as_str().to_string();
            Ok(ConfiguredRecipe::new(move |args: &BuildArgs| {
                Ok(BuildDescription::new(&name, &version)
                    .field("withDocs", args.get("withDocs").cloned().unwrap_or(json!(true))))
            }))
        }
    }

    #[test]
    fn test_build() {
        let artifact =
            Artifact::build("v3_3", registry(), &recipe(), BuildArgs::new()).unwrap();
        assert_eq!(artifact.description().version, "3.3.1");
        assert_eq!(artifact.description().get("withDocs"), Some(&json!(true)));
        assert!(artifact.siblings().is_none());
    }

    #[test]
    fn test_override_does_not_mutate() {
        let artifact =
            Artifact::build("v3_3", registry(), &recipe(), BuildArgs::new()).unwrap();
        let overridden = artifact
            .override_args(|args| args.with("withDocs", false))
            .unwrap();

        assert_eq!(overridden.description().get("withDocs"), Some(&json!(false)));
        // Original is untouched.
        assert_eq!(artifact.description().get("withDocs"), Some(&json!(true)));
        assert!(artifact.args().is_empty());
    }

    #[test]
    fn test_override_composition() {
        let artifact =
            Artifact::build("v3_3", registry(), &recipe(), BuildArgs::new()).unwrap();

        let chained = artifact
            .override_args(|args| args.with("withDocs", false))
            .unwrap()
            .override_args(|args| args.with("static", true))
            .unwrap();
        let composed = artifact
            .override_args(|args| args.with("withDocs", false).with("static", true))
            .unwrap();

        assert_eq!(chained.description(), composed.description());
        assert_eq!(chained.args(), composed.args());
    }

    #[test]
    fn test_override_failure_reports_phase() {
        let failing = |_: &BuilderContext| -> Result<ConfiguredRecipe, BuilderFailure> {
            Ok(ConfiguredRecipe::new(|args: &BuildArgs| {
                if args.get("explode").is_some() {
                    Err(BuilderFailure::new("boom"))
                } else {
                    Ok(BuildDescription::new("pkg", "3.3.1"))
                }
            }))
        };

        let artifact =
            Artifact::build("v3_3", registry(), &failing, BuildArgs::new()).unwrap();
        let err = artifact
            .override_args(|args| args.with("explode", true))
            .unwrap_err();
        assert!(matches!(
            err,
            EngineError::Recipe {
                key,
                phase: Phase::Override,
                ..
            } if key == "v3_3"
        ));
    }
}
