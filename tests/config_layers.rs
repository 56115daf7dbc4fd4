mod common;

use std::sync::Arc;

use common::{cleanup, temp_path};
use xsec_splines::algorithm::{AlgorithmKey, AlgorithmRegistry, Capabilities, RegistryError};
use xsec_splines::config::{load_layers, ConfigStore, LoadPolicyKind};

fn write_layer(name: &str, content: &str) -> std::path::PathBuf {
    let path = temp_path(name, "toml");
    std::fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_layers_apply_in_order() {
    let first = write_layer(
        "xsec_layer_first",
        r#"
        [splines]
        knots_per_decade = 20
        load_policy = "requested"

        [algorithms.global]
        DFR-Ma = 1.2
        "#,
    );
    let second = write_layer(
        "xsec_layer_second",
        r#"
        [splines]
        knots_per_decade = 25

        [algorithms."genie::ReinDFRPXSec/Default"]
        Ma = 0.9
        "#,
    );

    let config = load_layers(&[first.clone(), second.clone()]).unwrap();
    assert_eq!(config.splines.knots_per_decade, 25);
    assert_eq!(config.splines.min_knots, 30);
    assert_eq!(config.splines.load_policy, LoadPolicyKind::Requested);

    let store = ConfigStore::from_entries(config.algorithms);
    let scope = "genie::ReinDFRPXSec/Default";
    assert_eq!(store.get_f64_or_global(scope, "Ma", "DFR-Ma").unwrap(), 0.9);
    assert_eq!(store.get_f64_or_global(scope, "beta", "DFR-Beta").unwrap(), 7.0);
    // untouched default scope keys survive the merge
    assert_eq!(store.get_f64(scope, "MaxEnergy").unwrap(), 100.0);
    assert_eq!(store.get_f64("global", "DFR-Ma").unwrap(), 1.2);

    cleanup(&first);
    cleanup(&second);
}

#[test]
fn test_scope_without_entry_falls_back_to_global() {
    let config = load_layers(&[]).unwrap();
    let store = ConfigStore::from_entries(config.algorithms);
    assert!(store.scope("genie::Unconfigured/Default").is_none());
    assert_eq!(
        store.get_i64("genie::Unconfigured/Default", "Integrator-NPoints").unwrap(),
        12
    );
}

#[test]
fn test_cycle_configured_in_a_layer_is_rejected() {
    let layer = write_layer(
        "xsec_layer_cycle",
        r#"
        [algorithms."test::Chain/A"]
        Next = "test::Chain/B"

        [algorithms."test::Chain/B"]
        Next = "test::Chain/A"
        "#,
    );
    let config = load_layers(&[layer.clone()]).unwrap();
    let mut registry = AlgorithmRegistry::new(Arc::new(ConfigStore::from_entries(config.algorithms)));
    registry.register("test::Chain", |ctx| {
        ctx.sub_algorithm("Next")?;
        Ok(Capabilities::new())
    });

    let err = registry.resolve(&"test::Chain/A".parse().unwrap()).unwrap_err();
    match err {
        RegistryError::CyclicDependency { path } => {
            let names: Vec<String> = path.iter().map(AlgorithmKey::to_string).collect();
            assert_eq!(names, vec!["test::Chain/A", "test::Chain/B", "test::Chain/A"]);
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(registry.is_empty());

    cleanup(&layer);
}

#[test]
fn test_builtins_resolve_from_default_layer() {
    let config = load_layers(&[]).unwrap();
    let mut registry =
        AlgorithmRegistry::with_builtins(Arc::new(ConfigStore::from_entries(config.algorithms)));
    let generators = registry.resolve_all(&config.driver.generators).unwrap();
    assert_eq!(generators.len(), 2);
    assert!(generators.iter().all(|g| g.xsec_model().is_some()));

    let again = registry.resolve(&config.driver.generators[0]).unwrap();
    assert!(Arc::ptr_eq(&generators[0], &again));
}
