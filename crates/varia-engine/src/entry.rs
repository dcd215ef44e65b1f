//! Default selection and the engine entry point.

use std::rc::Rc;

use varia_registry::{resolve, AliasGenerator, Config, VariantKey, VariantRegistry, VariantSpec};

use crate::{Artifact, BuildArgs, BuildRecipe, EngineError, Siblings};

/// The result of a default selector: either a key into the resolved
/// registry, or a spec that must structurally match one of its entries.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Key(VariantKey),
    Spec(VariantSpec),
}

/// Picks the default variant from a resolved registry.
///
/// Must be a pure projection; any closure over `&VariantRegistry` works.
pub trait DefaultSelector {
    fn select(&self, registry: &VariantRegistry) -> Selection;
}

impl<F> DefaultSelector for F
where
    F: Fn(&VariantRegistry) -> Selection,
{
    fn select(&self, registry: &VariantRegistry) -> Selection {
        self(registry)
    }
}

/// Construct the default artifact for a variant registry.
///
/// Resolves the registry (alias merging per `config`), applies the default
/// selector, then binds, configures, and invokes the recipe for the chosen
/// variant only. The returned artifact carries a lazy [`Siblings`] map over
/// every resolved key; the chosen key is pre-seeded with the already-built
/// result, so its recipe runs exactly once per invocation.
pub fn instantiate(
    raw: VariantRegistry,
    alias_generator: Option<&dyn AliasGenerator>,
    selector: &dyn DefaultSelector,
    recipe: Rc<dyn BuildRecipe>,
    config: &Config,
    args: BuildArgs,
) -> Result<Artifact, EngineError> {
    let registry = Rc::new(resolve(raw, alias_generator, config)?);

    let key = match selector.select(&registry) {
        Selection::Key(key) => {
            if !registry.contains(&key) {
                return Err(EngineError::Selector {
                    selected: format!("key '{key}'"),
                });
            }
            key
        }
        Selection::Spec(spec) => registry
            .iter()
            .find(|(_, candidate)| **candidate == spec)
            .map(|(key, _)| key.clone())
            .ok_or_else(|| EngineError::Selector {
                selected: format!("a spec with version '{}'", spec.version),
            })?,
    };

    let chosen = Rc::new(Artifact::build(
        &key,
        registry.clone(),
        recipe.as_ref(),
        args.clone(),
    )?);

    let siblings = Rc::new(Siblings::new(registry, recipe, args));
    siblings.seed(&key, chosen.clone());

    // The returned artifact and the seeded sibling entry share the chosen
    // build (context, configured recipe, description); keeping them as two
    // handles avoids a reference cycle through the sibling map.
    Ok(chosen.as_ref().clone().with_siblings(siblings))
}
