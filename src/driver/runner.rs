//! Batch spline preparation.
//!
//! # Responsibilities
//! - Check the probe and target inputs before any work starts
//! - Pair every reachable process with the generators that handle it
//! - Build the missing splines on blocking workers and save the table once
//!
//! # Design Decisions
//! - Generators are resolved before any worker starts; workers only read
//!   shared `Arc`s
//! - One failed spline is recorded in the report and does not stop the batch,
//!   even when its worker dies
//! - Each process is planned once; the first generator that applies owns it

use std::collections::{BTreeSet, HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::algorithm::{Algorithm, AlgorithmKey, AlgorithmRegistry};
use crate::config::{DriverConfig, LoadPolicyKind};
use crate::driver::error::{DriverError, DriverResult, InputSet};
use crate::driver::geometry::GeometrySource;
use crate::interaction::pdg::is_probe;
use crate::interaction::{reachable_processes, InitialState, Pdg, ProcessKey, Target};
use crate::observability::metrics;
use crate::spline::{BuildRequest, LoadPolicy, SplineCache, MAX_KNOTS};

/// What one run should prepare.
#[derive(Clone, Default)]
pub struct RunRequest {
    pub probes: Vec<Pdg>,
    /// Target codes. An empty list counts as not given.
    pub targets: Vec<Pdg>,
    pub geometry: Option<Arc<dyn GeometrySource>>,
    pub knots: Option<usize>,
    pub max_energy: Option<f64>,
    pub output: PathBuf,
    /// Spline table to preload before building.
    pub input: Option<PathBuf>,
}

/// One (process, generator) pair the run will ask the cache for.
#[derive(Debug, Clone)]
pub struct PlannedSpline {
    pub process: ProcessKey,
    pub algorithm: Arc<Algorithm>,
}

#[derive(Debug, Clone)]
pub struct BuildFailure {
    pub process: ProcessKey,
    pub algorithm: AlgorithmKey,
    pub reason: String,
}

#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub planned: usize,
    pub built: usize,
    pub reused: usize,
    pub saved: usize,
    pub failures: Vec<BuildFailure>,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

pub struct Driver {
    registry: AlgorithmRegistry,
    cache: Arc<SplineCache>,
    generators: Vec<AlgorithmKey>,
    workers: usize,
    load_policy: LoadPolicyKind,
}

impl Driver {
    pub fn new(registry: AlgorithmRegistry, cache: Arc<SplineCache>, config: &DriverConfig) -> Self {
        let load_policy = cache.settings().load_policy;
        Self {
            registry,
            cache,
            generators: config.generators.clone(),
            workers: config.workers.max(1),
            load_policy,
        }
    }

    pub fn with_load_policy(mut self, policy: LoadPolicyKind) -> Self {
        self.load_policy = policy;
        self
    }

    pub fn registry(&self) -> &AlgorithmRegistry {
        &self.registry
    }

    pub fn cache(&self) -> &Arc<SplineCache> {
        &self.cache
    }

    /// Run a whole batch: validate, plan, preload, build, save.
    pub async fn run(&mut self, request: &RunRequest) -> DriverResult<RunReport> {
        check_knots(request.knots)?;
        let probes = resolve_probes(&request.probes)?;
        let targets = resolve_targets(&request.targets, request.geometry.as_deref())?;
        tracing::info!(probes = probes.len(), targets = targets.len(), "Inputs resolved");

        let plan = self.plan(&probes, &targets)?;

        if let Some(input) = &request.input {
            let policy = match self.load_policy {
                LoadPolicyKind::All => LoadPolicy::All,
                LoadPolicyKind::Requested => {
                    LoadPolicy::Requested(plan.iter().map(|p| p.process).collect())
                }
            };
            self.cache.load_all(input, &policy)?;
        }

        let build = BuildRequest {
            knots: request.knots,
            max_energy: request.max_energy,
        };
        let mut report = self.build(plan, build).await;

        report.saved = self.cache.save_all(&request.output)?;
        tracing::info!(
            planned = report.planned,
            built = report.built,
            reused = report.reused,
            failed = report.failures.len(),
            output = %request.output.display(),
            "Run complete"
        );
        Ok(report)
    }

    /// Resolve the generators and pair them with every reachable process.
    pub fn plan(&mut self, probes: &[Pdg], targets: &[Target]) -> DriverResult<Vec<PlannedSpline>> {
        let generators = self.registry.resolve_all(&self.generators)?;
        let mut models = Vec::with_capacity(generators.len());
        for algorithm in generators {
            let model = algorithm
                .xsec_model()
                .ok_or_else(|| DriverError::NotAModel(algorithm.key().to_string()))?;
            models.push((algorithm, model));
        }

        let mut seen = HashSet::new();
        let mut plan = Vec::new();
        for &probe in probes {
            for &target in targets {
                let init = InitialState::new(probe, target);
                for process in reachable_processes(&init) {
                    for (algorithm, model) in &models {
                        if !model.applies_to(&process) {
                            continue;
                        }
                        if seen.insert(process) {
                            plan.push(PlannedSpline {
                                process,
                                algorithm: algorithm.clone(),
                            });
                        } else {
                            tracing::debug!(
                                process = %process,
                                algorithm = %algorithm.key(),
                                "Process already planned for another generator"
                            );
                        }
                    }
                }
            }
        }

        tracing::info!(
            generators = models.len(),
            splines = plan.len(),
            "Build plan ready"
        );
        Ok(plan)
    }

    async fn build(&self, plan: Vec<PlannedSpline>, request: BuildRequest) -> RunReport {
        let mut report = RunReport {
            planned: plan.len(),
            ..RunReport::default()
        };

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = JoinSet::new();
        // spawned builds without a result yet
        let mut outstanding: HashMap<ProcessKey, AlgorithmKey> = HashMap::new();

        for item in plan {
            if self.cache.contains(&item.process) {
                report.reused += 1;
                metrics::record_spline_reused();
                tracing::debug!(process = %item.process, "Spline already cached");
                continue;
            }
            let permit = match semaphore.clone().acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let cache = self.cache.clone();
            outstanding.insert(item.process, item.algorithm.key().clone());
            tasks.spawn_blocking(move || {
                let _permit = permit;
                let result = cache.get_or_build(&item.process, &item.algorithm, request);
                (item, result)
            });
        }

        let mut worker_error = None;
        while let Some(joined) = tasks.join_next().await {
            let (item, result) = match joined {
                Ok(done) => done,
                Err(e) => {
                    tracing::error!(error = %e, "Build worker failed");
                    worker_error = Some(e.to_string());
                    continue;
                }
            };
            outstanding.remove(&item.process);
            match result {
                Ok(_) => report.built += 1,
                Err(e) => {
                    tracing::error!(
                        process = %item.process,
                        algorithm = %item.algorithm.key(),
                        error = %e,
                        "Spline build failed"
                    );
                    report.failures.push(BuildFailure {
                        process: item.process,
                        algorithm: item.algorithm.key().clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        // builds whose worker died before returning
        for (process, algorithm) in outstanding {
            report.failures.push(BuildFailure {
                process,
                algorithm,
                reason: format!(
                    "build worker failed: {}",
                    worker_error.as_deref().unwrap_or("no result")
                ),
            });
        }

        report.failures.sort_by(|a, b| a.process.cmp(&b.process));
        report
    }
}

/// Reject knot counts no spline can hold.
pub fn check_knots(knots: Option<usize>) -> DriverResult<()> {
    match knots {
        Some(requested) if requested > MAX_KNOTS => Err(DriverError::InvalidKnotCount {
            requested,
            max: MAX_KNOTS,
        }),
        _ => Ok(()),
    }
}

/// Deduplicate and check the probe codes.
pub fn resolve_probes(codes: &[Pdg]) -> DriverResult<Vec<Pdg>> {
    if codes.is_empty() {
        return Err(DriverError::EmptyInputSet(InputSet::Probes));
    }
    let mut probes = BTreeSet::new();
    for &code in codes {
        if !is_probe(code) {
            return Err(DriverError::InvalidCode {
                kind: InputSet::Probes,
                code,
            });
        }
        probes.insert(code);
    }
    Ok(probes.into_iter().collect())
}

/// Pick the target source and decode its codes.
pub fn resolve_targets(
    codes: &[Pdg],
    geometry: Option<&dyn GeometrySource>,
) -> DriverResult<Vec<Target>> {
    let codes: BTreeSet<Pdg> = match (codes.is_empty(), geometry) {
        (false, Some(_)) => return Err(DriverError::ConflictingTargetSources),
        (true, None) => return Err(DriverError::NoTargetSource),
        (false, None) => codes.iter().copied().collect(),
        (true, Some(geometry)) => geometry.list_target_materials()?,
    };
    if codes.is_empty() {
        return Err(DriverError::EmptyInputSet(InputSet::Targets));
    }

    codes
        .into_iter()
        .map(|code| {
            Target::from_pdg(code).ok_or(DriverError::InvalidCode {
                kind: InputSet::Targets,
                code,
            })
        })
        .collect()
}
