//! Spline caching and persistence.
//!
//! # Responsibilities
//! - Map each process key to at most one spline for the cache lifetime
//! - Build missing splines by integrating an algorithm across a knot grid
//! - Save and load the whole cache as a JSON table
//!
//! # Design Decisions
//! - Each key owns a slot with its own mutex: the first caller builds while
//!   concurrent callers for the same key wait and then reuse the result
//! - The map lock is never held while a spline is being built
//! - A failed knot aborts the build; no zero is substituted
//! - A failed build is remembered: waiters and later callers get the same
//!   error instead of building again
//! - A panicking model fails only its own key

use dashmap::DashMap;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::algorithm::{Algorithm, AlgorithmKey, EvaluationError, XSecModel};
use crate::config::SplineSettings;
use crate::interaction::ProcessKey;
use crate::observability::metrics;
use crate::spline::curve::{Knot, Spline};
use crate::spline::error::{SplineError, SplineResult};
use crate::spline::table::{LoadPolicy, LoadReport, SplineRecord, SplineTable, TABLE_VERSION};

/// Upper bound on knots per spline.
pub const MAX_KNOTS: usize = 100_000;

/// Per-call overrides for a build.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BuildRequest {
    /// Knot count; the configured floor and [`MAX_KNOTS`] still apply.
    pub knots: Option<usize>,
    /// Upper energy; capped at the algorithm's validity ceiling.
    pub max_energy: Option<f64>,
}

/// A cached spline and the algorithm that produced it.
#[derive(Debug, Clone)]
pub struct CachedSpline {
    pub algorithm: AlgorithmKey,
    pub spline: Arc<Spline>,
}

/// Outcome stored for one key. `None` until the first build or insert.
type SlotState = Option<Result<CachedSpline, SplineError>>;

#[derive(Debug, Default)]
struct SplineSlot {
    cell: Mutex<SlotState>,
}

impl SplineSlot {
    /// Builds run under `catch_unwind`, so a poisoned slot never holds a
    /// half-written value.
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.cell.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn get(&self) -> Option<CachedSpline> {
        match &*self.lock() {
            Some(Ok(cached)) => Some(cached.clone()),
            _ => None,
        }
    }
}

/// A thread-safe, build-once cache of splines keyed by process.
#[derive(Debug, Default)]
pub struct SplineCache {
    entries: DashMap<ProcessKey, Arc<SplineSlot>>,
    /// Slots holding a spline; slots are never emptied.
    filled: AtomicUsize,
    settings: SplineSettings,
}

impl SplineCache {
    pub fn new(settings: SplineSettings) -> Self {
        Self {
            entries: DashMap::new(),
            filled: AtomicUsize::new(0),
            settings,
        }
    }

    pub fn settings(&self) -> &SplineSettings {
        &self.settings
    }

    /// Return the spline for `process`, building it with `algorithm` if the
    /// cache has none yet. A key whose build failed keeps returning that
    /// failure.
    pub fn get_or_build(
        &self,
        process: &ProcessKey,
        algorithm: &Algorithm,
        request: BuildRequest,
    ) -> SplineResult<Arc<Spline>> {
        let model = algorithm
            .xsec_model()
            .ok_or_else(|| SplineError::NotAModel(algorithm.key().clone()))?;

        let slot = self.entries.entry(*process).or_default().clone();
        let mut cell = slot.lock();

        match cell.as_ref() {
            Some(Ok(cached)) => {
                if &cached.algorithm != algorithm.key() {
                    tracing::warn!(
                        process = %process,
                        cached = %cached.algorithm,
                        requested = %algorithm.key(),
                        "Reusing spline built by a different algorithm"
                    );
                }
                metrics::record_spline_reused();
                return Ok(cached.spline.clone());
            }
            Some(Err(e)) => return Err(e.clone()),
            None => {}
        }

        let started = Instant::now();
        let built = panic::catch_unwind(AssertUnwindSafe(|| {
            build_spline(process, algorithm.key(), model.as_ref(), &self.settings, request)
        }))
        .unwrap_or_else(|payload| {
            Err(SplineError::Panicked {
                process: *process,
                algorithm: algorithm.key().clone(),
                message: panic_message(payload.as_ref()),
            })
        });
        let spline = match built {
            Ok(spline) => Arc::new(spline),
            Err(e) => {
                metrics::record_build_failure(&algorithm.key().name);
                *cell = Some(Err(e.clone()));
                return Err(e);
            }
        };

        tracing::info!(
            process = %process,
            algorithm = %algorithm.key(),
            knots = spline.len(),
            e_min = spline.min_energy(),
            e_max = spline.max_energy(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Spline built"
        );
        metrics::record_spline_built(&algorithm.key().name, spline.len(), started);

        *cell = Some(Ok(CachedSpline {
            algorithm: algorithm.key().clone(),
            spline: spline.clone(),
        }));
        drop(cell);
        let size = self.filled.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::record_cache_size(size);
        Ok(spline)
    }

    /// Insert an already-built spline. Returns false if the key already
    /// holds one. A recorded failure is replaced.
    pub fn insert(&self, process: ProcessKey, cached: CachedSpline) -> bool {
        let slot = self.entries.entry(process).or_default().clone();
        let mut cell = slot.lock();
        if matches!(*cell, Some(Ok(_))) {
            return false;
        }
        *cell = Some(Ok(cached));
        self.filled.fetch_add(1, Ordering::SeqCst);
        true
    }

    pub fn contains(&self, process: &ProcessKey) -> bool {
        self.get_entry(process).is_some()
    }

    pub fn get(&self, process: &ProcessKey) -> Option<Arc<Spline>> {
        self.get_entry(process).map(|c| c.spline)
    }

    pub fn get_entry(&self, process: &ProcessKey) -> Option<CachedSpline> {
        let slot = self.entries.get(process)?.value().clone();
        slot.get()
    }

    /// Number of built splines.
    pub fn len(&self) -> usize {
        self.filled.load(Ordering::SeqCst)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every built spline, ordered by process key.
    pub fn entries(&self) -> Vec<(ProcessKey, CachedSpline)> {
        let slots: Vec<(ProcessKey, Arc<SplineSlot>)> = self
            .entries
            .iter()
            .map(|r| (*r.key(), r.value().clone()))
            .collect();
        let mut entries: Vec<_> = slots
            .into_iter()
            .filter_map(|(key, slot)| slot.get().map(|c| (key, c)))
            .collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }

    /// Write every cached spline to `path`. Returns the number written.
    pub fn save_all(&self, path: &Path) -> SplineResult<usize> {
        let table = SplineTable {
            format_version: TABLE_VERSION,
            entries: self
                .entries()
                .into_iter()
                .map(|(process, cached)| SplineRecord {
                    process,
                    algorithm: cached.algorithm,
                    spline: (*cached.spline).clone(),
                })
                .collect(),
        };

        let io_err = |source| SplineError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        };
        let file = File::create(path).map_err(io_err)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, &table).map_err(|source| SplineError::Format {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        writer.flush().map_err(io_err)?;

        tracing::info!(path = %path.display(), splines = table.entries.len(), "Saved spline table");
        Ok(table.entries.len())
    }

    /// Populate the cache from a table written by [`save_all`](Self::save_all).
    ///
    /// Entries already in the cache are kept; entries the policy rejects are
    /// skipped.
    pub fn load_all(&self, path: &Path, policy: &LoadPolicy) -> SplineResult<LoadReport> {
        let file = File::open(path).map_err(|source| SplineError::Io {
            path: path.to_path_buf(),
            source: Arc::new(source),
        })?;
        let table: SplineTable =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| SplineError::Format {
                path: path.to_path_buf(),
                source: Arc::new(source),
            })?;
        if table.format_version != TABLE_VERSION {
            return Err(SplineError::Version {
                found: table.format_version,
                expected: TABLE_VERSION,
            });
        }

        let mut report = LoadReport::default();
        for record in table.entries {
            if !policy.accepts(&record.process) {
                report.skipped += 1;
                continue;
            }
            let cached = CachedSpline {
                algorithm: record.algorithm,
                spline: Arc::new(record.spline),
            };
            if self.insert(record.process, cached) {
                report.loaded += 1;
            } else {
                report.skipped += 1;
            }
        }

        metrics::record_splines_loaded(report.loaded);
        metrics::record_cache_size(self.len());
        tracing::info!(
            path = %path.display(),
            loaded = report.loaded,
            skipped = report.skipped,
            "Loaded spline table"
        );
        Ok(report)
    }
}

/// Number of knots for `[e_min, e_max]`: the explicit count or the
/// per-decade density, never below the configured floor nor above
/// [`MAX_KNOTS`].
pub fn knot_count(settings: &SplineSettings, e_min: f64, e_max: f64, requested: Option<usize>) -> usize {
    let decades = (e_max / e_min).log10().max(0.0);
    let by_density = (settings.knots_per_decade as f64 * decades).round() as usize;
    requested
        .unwrap_or(by_density)
        .max(settings.min_knots as usize)
        .max(2)
        .min(MAX_KNOTS)
}

/// Log-spaced knot energies from `e_min` to `e_max` inclusive. On very
/// narrow ranges neighbouring energies can round to the same float; see
/// [`strictly_increasing`].
pub fn knot_energies(e_min: f64, e_max: f64, n: usize) -> Vec<f64> {
    let (ln_min, ln_max) = (e_min.ln(), e_max.ln());
    let step = (ln_max - ln_min) / (n - 1) as f64;
    (0..n)
        .map(|i| match i {
            0 => e_min,
            i if i == n - 1 => e_max,
            i => (ln_min + step * i as f64).exp(),
        })
        .collect()
}

pub fn strictly_increasing(energies: &[f64]) -> bool {
    energies.windows(2).all(|w| w[0] < w[1])
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

fn build_spline(
    process: &ProcessKey,
    algorithm: &AlgorithmKey,
    model: &dyn XSecModel,
    settings: &SplineSettings,
    request: BuildRequest,
) -> SplineResult<Spline> {
    let validity = model.validity();
    let e_min = settings.min_energy.max(validity.min);
    let e_max = request
        .max_energy
        .map_or(validity.max, |max| max.min(validity.max));
    if !(e_max > e_min) {
        return Err(SplineError::EmptyDomain {
            process: *process,
            min: e_min,
            max: e_max,
        });
    }

    let n = knot_count(settings, e_min, e_max, request.knots);
    tracing::debug!(process = %process, algorithm = %algorithm, knots = n, e_min, e_max, "Building spline");

    let failure = |energy, source| SplineError::EvaluationFailure {
        process: *process,
        algorithm: algorithm.clone(),
        energy,
        source,
    };

    let energies = knot_energies(e_min, e_max, n);
    if !strictly_increasing(&energies) {
        return Err(SplineError::NarrowDomain {
            process: *process,
            min: e_min,
            max: e_max,
            knots: n,
        });
    }

    let mut knots = Vec::with_capacity(n);
    for energy in energies {
        let value = model
            .total_xsec(process, energy)
            .map_err(|e| failure(energy, e))?;
        if !value.is_finite() {
            return Err(failure(energy, EvaluationError::NonFinite { energy, value }));
        }
        if value < 0.0 {
            return Err(failure(energy, EvaluationError::Negative { energy, value }));
        }
        knots.push(Knot::new(energy, value));
    }

    Ok(Spline::from_knots(knots)?)
}
