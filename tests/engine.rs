//! Integration tests for varia-engine crate.

use std::cell::Cell;
use std::rc::Rc;

use serde_json::json;
use varia_engine::{
    instantiate, BuildArgs, BuildDescription, BuildRecipe, BuilderContext, BuilderFailure,
    ConfiguredRecipe, EngineError, Selection,
};
use varia_registry::{Config, VariantRegistry, VariantSpec};

fn raw() -> VariantRegistry {
    let mut registry = VariantRegistry::new();
    registry.insert("v3_0", VariantSpec::new("3.0.0"));
    registry.insert("v3_2", VariantSpec::new("3.2.2"));
    registry.insert("v3_3", VariantSpec::new("3.3.1"));
    registry
}

/// Recipe that counts stage-one invocations, for laziness checks.
fn counting_recipe(calls: Rc<Cell<usize>>) -> Rc<dyn BuildRecipe> {
    Rc::new(
        move |ctx: &BuilderContext| -> Result<ConfiguredRecipe, BuilderFailure> {
            calls.set(calls.get() + 1);
            let name = ctx.key().to_string();
            let version = ctx.version().as_str().to_string();
            Ok(ConfiguredRecipe::new(move |args: &BuildArgs| {
                Ok(BuildDescription::new(&name, &version)
                    .field("withDocs", args.get("withDocs").cloned().unwrap_or(json!(true))))
            }))
        },
    )
}

fn select_v3_3(_: &VariantRegistry) -> Selection {
    Selection::Key("v3_3".to_string())
}

#[test]
fn test_only_default_variant_is_built() {
    let calls = Rc::new(Cell::new(0));
    let artifact = instantiate(
        raw(),
        None,
        &select_v3_3,
        counting_recipe(calls.clone()),
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap();

    assert_eq!(calls.get(), 1);
    let siblings = artifact.siblings().unwrap();
    assert!(!siblings.is_built("v3_0"));
    assert!(!siblings.is_built("v3_2"));
}

#[test]
fn test_sibling_access_is_memoized() {
    let calls = Rc::new(Cell::new(0));
    let artifact = instantiate(
        raw(),
        None,
        &select_v3_3,
        counting_recipe(calls.clone()),
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap();

    let siblings = artifact.siblings().unwrap();
    let first = siblings.get("v3_2").unwrap();
    let second = siblings.get("v3_2").unwrap();
    assert!(Rc::ptr_eq(&first, &second));
    assert_eq!(calls.get(), 2); // chosen + v3_2, nothing else
}

#[test]
fn test_determinism_identical_args_identical_description() {
    let calls = Rc::new(Cell::new(0));
    let recipe = counting_recipe(calls);
    let args = BuildArgs::new().with("withDocs", true);

    let a = instantiate(
        raw(),
        None,
        &select_v3_3,
        recipe.clone(),
        &Config::default(),
        args.clone(),
    )
    .unwrap();
    let b = instantiate(raw(), None, &select_v3_3, recipe, &Config::default(), args).unwrap();
    assert_eq!(a.description(), b.description());
}

#[test]
fn test_override_associativity() {
    let calls = Rc::new(Cell::new(0));
    let artifact = instantiate(
        raw(),
        None,
        &select_v3_3,
        counting_recipe(calls),
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap();

    let f = |args: BuildArgs| args.with("withDocs", false);
    let g = |args: BuildArgs| args.with("withDocs", true).with("static", true);

    let chained = artifact.override_args(f).unwrap().override_args(g).unwrap();
    let composed = artifact.override_args(|args| g(f(args))).unwrap();
    assert_eq!(chained.description(), composed.description());
    assert_eq!(chained.args(), composed.args());
}

#[test]
fn test_overriding_default_keeps_sibling_map() {
    let calls = Rc::new(Cell::new(0));
    let artifact = instantiate(
        raw(),
        None,
        &select_v3_3,
        counting_recipe(calls.clone()),
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap();

    let overridden = artifact.override_args(|args| args.with("withDocs", false)).unwrap();
    let siblings = overridden.siblings().unwrap();

    // The sibling map is shared, not rebuilt: the chosen key is still the
    // original, un-overridden build.
    let chosen = siblings.get("v3_3").unwrap();
    assert_eq!(chosen.description().get("withDocs"), Some(&json!(true)));
    assert_eq!(overridden.description().get("withDocs"), Some(&json!(false)));
    assert_eq!(calls.get(), 1);
}

#[test]
fn test_context_predicates_drive_the_recipe() {
    let recipe: Rc<dyn BuildRecipe> = Rc::new(
        |ctx: &BuilderContext| -> Result<ConfiguredRecipe, BuilderFailure> {
            let name = ctx.key().to_string();
            let version = ctx.version().as_str().to_string();
            let legacy = ctx
                .older_than("3.0.0")
                .map_err(|e| BuilderFailure::new(e.to_string()))?;
            Ok(ConfiguredRecipe::new(move |_: &BuildArgs| {
                Ok(BuildDescription::new(&name, &version).field("legacyLayout", legacy))
            }))
        },
    );

    let artifact = instantiate(
        raw(),
        None,
        &select_v3_3,
        recipe,
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap();
    assert_eq!(artifact.description().get("legacyLayout"), Some(&json!(false)));
}

#[test]
fn test_recipe_failure_carries_key_and_phase() {
    let recipe: Rc<dyn BuildRecipe> = Rc::new(
        |_: &BuilderContext| -> Result<ConfiguredRecipe, BuilderFailure> {
            Err(BuilderFailure::new("no recipe for this platform"))
        },
    );

    let err = instantiate(
        raw(),
        None,
        &select_v3_3,
        recipe,
        &Config::default(),
        BuildArgs::new(),
    )
    .unwrap_err();

    match err {
        EngineError::Recipe { key, source, .. } => {
            assert_eq!(key, "v3_3");
            assert_eq!(source, BuilderFailure::new("no recipe for this platform"));
        }
        other => panic!("unexpected error: {other}"),
    }
}
