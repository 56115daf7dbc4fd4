mod common;

use std::sync::Arc;

use common::{cc_dis_on_proton, cleanup, counting_driver, temp_path, CountingModel, IRON};
use xsec_splines::algorithm::AlgorithmRegistry;
use xsec_splines::config::{load_str, ConfigStore, LoadPolicyKind};
use xsec_splines::driver::{
    Driver, DriverError, GeometrySource, InputSet, RunRequest, StaticGeometry,
};
use xsec_splines::spline::{LoadPolicy, SplineCache, MAX_KNOTS};

fn iron_request(output: std::path::PathBuf) -> RunRequest {
    RunRequest {
        probes: vec![14, -14],
        targets: vec![IRON],
        output,
        ..RunRequest::default()
    }
}

#[tokio::test]
async fn test_iron_two_probes_builds_two_splines_at_the_floor() {
    let output = temp_path("xsec_scenario_iron", "json");
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 4);

    let request = RunRequest {
        knots: Some(5),
        ..iron_request(output.clone())
    };
    let report = driver.run(&request).await.unwrap();

    assert_eq!(report.planned, 2);
    assert_eq!(report.built, 2);
    assert_eq!(report.reused, 0);
    assert!(report.is_success());
    assert_eq!(model.distinct_processes(), 2);

    let entries = driver.cache().entries();
    assert_eq!(entries.len(), 2);
    let probes: Vec<i32> = entries.iter().map(|(k, _)| k.probe).collect();
    assert!(probes.contains(&14) && probes.contains(&-14));
    for (_, cached) in &entries {
        assert_eq!(cached.spline.len(), 30);
    }
    assert_eq!(model.calls(), 60);

    cleanup(&output);
}

#[tokio::test]
async fn test_empty_targets_and_empty_geometry_abort_before_building() {
    let output = temp_path("xsec_scenario_empty", "json");
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2);

    let request = RunRequest {
        probes: vec![14],
        targets: Vec::new(),
        geometry: Some(Arc::new(StaticGeometry::default()) as Arc<dyn GeometrySource>),
        output: output.clone(),
        ..RunRequest::default()
    };
    let err = driver.run(&request).await.unwrap_err();

    assert!(matches!(err, DriverError::EmptyInputSet(InputSet::Targets)));
    assert_eq!(err.exit_code(), 3);
    assert_eq!(model.calls(), 0);
    assert!(driver.cache().is_empty());
    assert!(!output.exists());
}

#[tokio::test]
async fn test_empty_probes_abort() {
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2);

    let request = RunRequest {
        probes: Vec::new(),
        targets: vec![IRON],
        output: temp_path("xsec_scenario_no_probes", "json"),
        ..RunRequest::default()
    };
    let err = driver.run(&request).await.unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_target_source_conflicts() {
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2);

    let both = RunRequest {
        geometry: Some(Arc::new(StaticGeometry::new([IRON])) as Arc<dyn GeometrySource>),
        ..iron_request(temp_path("xsec_scenario_conflict", "json"))
    };
    assert!(matches!(
        driver.run(&both).await,
        Err(DriverError::ConflictingTargetSources)
    ));

    let neither = RunRequest {
        probes: vec![14],
        output: temp_path("xsec_scenario_none", "json"),
        ..RunRequest::default()
    };
    assert!(matches!(driver.run(&neither).await, Err(DriverError::NoTargetSource)));
    assert_eq!(model.calls(), 0);
}

#[tokio::test]
async fn test_geometry_supplies_targets() {
    let output = temp_path("xsec_scenario_geometry", "json");
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2);

    let request = RunRequest {
        probes: vec![14],
        geometry: Some(Arc::new(StaticGeometry::new([IRON, 2212])) as Arc<dyn GeometrySource>),
        output: output.clone(),
        ..RunRequest::default()
    };
    let report = driver.run(&request).await.unwrap();
    assert_eq!(report.built, 2);

    cleanup(&output);
}

#[tokio::test]
async fn test_failed_build_is_reported_and_table_still_written() {
    let output = temp_path("xsec_scenario_failure", "json");
    let mut model = CountingModel::new(cc_dis_on_proton());
    model.failing_probes = vec![-14];
    let model = Arc::new(model);
    let mut driver = counting_driver(model.clone(), 2);

    let report = driver.run(&iron_request(output.clone())).await.unwrap();
    assert_eq!(report.built, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].process.probe, -14);
    assert!(!report.is_success());

    let reloaded = SplineCache::default();
    let loaded = reloaded.load_all(&output, &LoadPolicy::All).unwrap();
    assert_eq!(loaded.loaded, 1);
    assert_eq!(report.saved, 1);

    cleanup(&output);
}

#[tokio::test]
async fn test_panicking_model_is_reported_and_table_still_written() {
    let output = temp_path("xsec_scenario_panic", "json");
    let mut model = CountingModel::new(cc_dis_on_proton());
    model.panicking_probes = vec![-14];
    let model = Arc::new(model);
    let mut driver = counting_driver(model.clone(), 1);

    let report = driver.run(&iron_request(output.clone())).await.unwrap();
    assert_eq!(report.built, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].process.probe, -14);
    assert!(report.failures[0].reason.contains("panicked"));
    assert_eq!(report.saved, 1);
    assert!(output.exists());

    // the cache stays usable after the panic
    assert_eq!(driver.cache().save_all(&output).unwrap(), 1);

    cleanup(&output);
}

#[tokio::test]
async fn test_oversized_knot_count_is_rejected_before_building() {
    let output = temp_path("xsec_scenario_huge_knots", "json");
    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2);

    let request = RunRequest {
        knots: Some(MAX_KNOTS + 1),
        ..iron_request(output.clone())
    };
    let err = driver.run(&request).await.unwrap_err();

    assert!(matches!(
        err,
        DriverError::InvalidKnotCount { requested, max } if requested == MAX_KNOTS + 1 && max == MAX_KNOTS
    ));
    assert_eq!(err.exit_code(), 1);
    assert_eq!(model.calls(), 0);
    assert!(!output.exists());
}

#[tokio::test]
async fn test_preloaded_table_is_reused() {
    let first_output = temp_path("xsec_scenario_preload_a", "json");
    let second_output = temp_path("xsec_scenario_preload_b", "json");

    let first = Arc::new(CountingModel::new(cc_dis_on_proton()));
    counting_driver(first.clone(), 2)
        .run(&iron_request(first_output.clone()))
        .await
        .unwrap();
    assert!(first.calls() > 0);

    let second = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(second.clone(), 2);
    let request = RunRequest {
        input: Some(first_output.clone()),
        ..iron_request(second_output.clone())
    };
    let report = driver.run(&request).await.unwrap();

    assert_eq!(report.reused, 2);
    assert_eq!(report.built, 0);
    assert_eq!(second.calls(), 0);
    assert_eq!(report.saved, 2);

    cleanup(&first_output);
    cleanup(&second_output);
}

#[tokio::test]
async fn test_requested_policy_drops_unplanned_entries() {
    let table = temp_path("xsec_scenario_requested_in", "json");
    let output = temp_path("xsec_scenario_requested_out", "json");

    let seed = Arc::new(CountingModel::new(cc_dis_on_proton()));
    counting_driver(seed, 2)
        .run(&iron_request(table.clone()))
        .await
        .unwrap();

    let model = Arc::new(CountingModel::new(cc_dis_on_proton()));
    let mut driver = counting_driver(model.clone(), 2).with_load_policy(LoadPolicyKind::Requested);
    let request = RunRequest {
        probes: vec![14],
        targets: vec![IRON],
        input: Some(table.clone()),
        output: output.clone(),
        ..RunRequest::default()
    };
    let report = driver.run(&request).await.unwrap();

    assert_eq!(report.planned, 1);
    assert_eq!(report.reused, 1);
    assert_eq!(driver.cache().len(), 1);
    assert_eq!(model.calls(), 0);

    cleanup(&table);
    cleanup(&output);
}

#[tokio::test]
async fn test_builtin_generators_build_every_planned_spline() {
    let output = temp_path("xsec_scenario_builtin", "json");
    let config = load_str("[driver]\nworkers = 2\n").unwrap();
    let store = Arc::new(ConfigStore::from_entries(config.algorithms.clone()));
    let registry = AlgorithmRegistry::with_builtins(store);
    let cache = Arc::new(SplineCache::new(config.splines));
    let mut driver = Driver::new(registry, cache, &config.driver);

    let request = RunRequest {
        max_energy: Some(50.0),
        ..iron_request(output.clone())
    };
    let report = driver.run(&request).await.unwrap();

    assert!(report.planned > 0);
    assert!(report.is_success(), "failures: {:?}", report.failures);
    assert_eq!(report.built, report.planned);
    // generators plus their shared integrator
    assert_eq!(driver.registry().len(), 3);
    for (_, cached) in driver.cache().entries() {
        assert!(cached.spline.len() >= 30);
        assert!(cached.spline.max_energy() <= 50.0);
    }

    cleanup(&output);
}
