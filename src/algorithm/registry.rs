//! Algorithm registration table and resolver.
//!
//! # Responsibilities
//! - Map algorithm names to factories (populated at startup)
//! - Resolve `(name, config)` keys to shared, configured instances
//! - Let factories resolve their own named sub-algorithms
//! - Reject dependency cycles
//!
//! # Design Decisions
//! - One instance per key for the registry lifetime (`Arc` identity)
//! - Resolution takes `&mut self`: it completes before instances are handed
//!   to worker threads, and needs no locking
//! - An in-progress stack detects cycles before recursion can run away

use std::collections::HashMap;
use std::sync::Arc;

use crate::algorithm::capability::{Algorithm, Capabilities, CapabilityKind, XSecIntegrator, XSecModel};
use crate::algorithm::error::{RegistryError, RegistryResult};
use crate::algorithm::key::AlgorithmKey;
use crate::config::{ConfigStore, ConfigValue};
use crate::observability::metrics;

/// Builds an algorithm's capabilities from its configuration context.
pub type AlgorithmFactory =
    Arc<dyn Fn(&mut AlgorithmContext<'_>) -> RegistryResult<Capabilities> + Send + Sync>;

/// Resolves algorithm keys to configured instances.
pub struct AlgorithmRegistry {
    config: Arc<ConfigStore>,
    factories: HashMap<String, AlgorithmFactory>,
    instances: HashMap<AlgorithmKey, Arc<Algorithm>>,
    /// Resolution order, for deterministic listing.
    order: Vec<AlgorithmKey>,
    in_progress: Vec<AlgorithmKey>,
}

impl AlgorithmRegistry {
    /// Create an empty registry reading parameters from `config`.
    pub fn new(config: Arc<ConfigStore>) -> Self {
        Self {
            config,
            factories: HashMap::new(),
            instances: HashMap::new(),
            order: Vec::new(),
            in_progress: Vec::new(),
        }
    }

    /// Create a registry with the built-in algorithms registered.
    pub fn with_builtins(config: Arc<ConfigStore>) -> Self {
        let mut registry = Self::new(config);
        crate::algorithm::builtin::register_all(&mut registry);
        registry
    }

    /// Register a factory under `name`, replacing any previous one.
    pub fn register<F>(&mut self, name: impl Into<String>, factory: F)
    where
        F: Fn(&mut AlgorithmContext<'_>) -> RegistryResult<Capabilities> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.factories.insert(name.clone(), Arc::new(factory)).is_some() {
            tracing::warn!(algorithm = %name, "Algorithm factory replaced");
        }
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    pub fn config(&self) -> &Arc<ConfigStore> {
        &self.config
    }

    /// Return the shared instance for `key`, building it on first use.
    pub fn resolve(&mut self, key: &AlgorithmKey) -> RegistryResult<Arc<Algorithm>> {
        if let Some(existing) = self.instances.get(key) {
            return Ok(existing.clone());
        }

        if let Some(pos) = self.in_progress.iter().position(|k| k == key) {
            let mut path = self.in_progress[pos..].to_vec();
            path.push(key.clone());
            return Err(RegistryError::CyclicDependency { path });
        }

        let factory = self
            .factories
            .get(&key.name)
            .cloned()
            .ok_or_else(|| RegistryError::UnknownAlgorithm {
                name: key.name.clone(),
                key: key.clone(),
            })?;

        self.in_progress.push(key.clone());
        let (result, dependencies) = {
            let mut ctx = AlgorithmContext::new(self, key.clone());
            let result = factory(&mut ctx);
            (result, ctx.dependencies)
        };
        self.in_progress.pop();

        let algorithm = Arc::new(Algorithm::new(key.clone(), result?, dependencies));
        tracing::debug!(
            algorithm = %key,
            dependencies = algorithm.dependencies().len(),
            "Algorithm configured"
        );
        metrics::record_algorithm_resolved(&key.name);

        self.instances.insert(key.clone(), algorithm.clone());
        self.order.push(key.clone());
        Ok(algorithm)
    }

    /// Resolve every key, stopping at the first failure.
    pub fn resolve_all(&mut self, keys: &[AlgorithmKey]) -> RegistryResult<Vec<Arc<Algorithm>>> {
        keys.iter().map(|key| self.resolve(key)).collect()
    }

    /// Cached instance for `key`, without building it.
    pub fn get(&self, key: &AlgorithmKey) -> Option<Arc<Algorithm>> {
        self.instances.get(key).cloned()
    }

    /// All resolved instances, in the order they finished building.
    pub fn loaded(&self) -> impl Iterator<Item = &Arc<Algorithm>> {
        self.order.iter().filter_map(|k| self.instances.get(k))
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

/// What a factory sees while building one algorithm.
///
/// Parameter lookups read the algorithm's own scope with `global` fallback.
pub struct AlgorithmContext<'a> {
    registry: &'a mut AlgorithmRegistry,
    key: AlgorithmKey,
    scope: String,
    dependencies: Vec<AlgorithmKey>,
}

impl<'a> AlgorithmContext<'a> {
    fn new(registry: &'a mut AlgorithmRegistry, key: AlgorithmKey) -> Self {
        let scope = key.scope();
        Self {
            registry,
            key,
            scope,
            dependencies: Vec::new(),
        }
    }

    pub fn key(&self) -> &AlgorithmKey {
        &self.key
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn config(&self) -> &ConfigStore {
        &self.registry.config
    }

    pub fn f64(&self, param: &str) -> RegistryResult<f64> {
        Ok(self.registry.config.get_f64(&self.scope, param)?)
    }

    /// Like [`f64`](Self::f64) but a missing parameter yields `default`.
    /// A present but mistyped value is still an error.
    pub fn f64_or(&self, param: &str, default: f64) -> RegistryResult<f64> {
        match self.registry.config.lookup(&self.scope, param) {
            None => Ok(default),
            Some(_) => self.f64(param),
        }
    }

    pub fn f64_or_global(&self, param: &str, global_param: &str) -> RegistryResult<f64> {
        Ok(self
            .registry
            .config
            .get_f64_or_global(&self.scope, param, global_param)?)
    }

    pub fn i64(&self, param: &str) -> RegistryResult<i64> {
        Ok(self.registry.config.get_i64(&self.scope, param)?)
    }

    pub fn i64_or_global(&self, param: &str, global_param: &str) -> RegistryResult<i64> {
        Ok(self
            .registry
            .config
            .get_i64_or_global(&self.scope, param, global_param)?)
    }

    pub fn bool(&self, param: &str) -> RegistryResult<bool> {
        Ok(self.registry.config.get_bool(&self.scope, param)?)
    }

    pub fn string(&self, param: &str) -> RegistryResult<String> {
        Ok(self.registry.config.get_str(&self.scope, param)?.to_string())
    }

    pub fn value(&self, param: &str) -> RegistryResult<ConfigValue> {
        Ok(self.registry.config.get(&self.scope, param)?.clone())
    }

    /// Error for a parameter that is present but unusable.
    pub fn invalid(&self, param: &str, reason: impl Into<String>) -> RegistryError {
        RegistryError::InvalidParameter {
            scope: self.scope.clone(),
            param: param.to_string(),
            reason: reason.into(),
        }
    }

    /// Resolve the sub-algorithm named by parameter `param` (`name/config`).
    pub fn sub_algorithm(&mut self, param: &str) -> RegistryResult<Arc<Algorithm>> {
        let text = self.string(param)?;
        let key: AlgorithmKey = text.parse().map_err(|source| RegistryError::InvalidKey {
            scope: self.scope.clone(),
            param: param.to_string(),
            source,
        })?;
        let algorithm = self.registry.resolve(&key)?;
        self.dependencies.push(key);
        Ok(algorithm)
    }

    /// Resolve a sub-algorithm and require it to integrate.
    pub fn sub_integrator(&mut self, param: &str) -> RegistryResult<Arc<dyn XSecIntegrator>> {
        let algorithm = self.sub_algorithm(param)?;
        algorithm
            .integrator()
            .ok_or_else(|| self.missing(&algorithm, CapabilityKind::Integrator))
    }

    /// Resolve a sub-algorithm and require it to be a cross-section model.
    pub fn sub_xsec_model(&mut self, param: &str) -> RegistryResult<Arc<dyn XSecModel>> {
        let algorithm = self.sub_algorithm(param)?;
        algorithm
            .xsec_model()
            .ok_or_else(|| self.missing(&algorithm, CapabilityKind::XSecModel))
    }

    fn missing(&self, algorithm: &Algorithm, capability: CapabilityKind) -> RegistryError {
        RegistryError::MissingCapability {
            key: algorithm.key().clone(),
            capability,
            requested_by: self.key.clone(),
        }
    }
}
