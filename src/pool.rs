//! Concurrent request handling on top of single-threaded models.
//!
//! A [`Model`] must not be shared between requests while one of them is
//! between `setup` and `extract`. [`ModelPool`] keeps several pre-built
//! models and hands each request exclusive use of one; [`ResultCache`]
//! memoizes results by the request's canonical serialization.

use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use log::{debug, info, warn};
use lru::LruCache;
use parking_lot::{Condvar, Mutex, MutexGuard};

use crate::catalog::Catalog;
use crate::config::OptimizerConfig;
use crate::domain::solver_factory::create_configured_solver;
use crate::domain::validate::validate_request;
use crate::error::Result;
use crate::model::request::BuildRequest;
use crate::model::result::BuildResult;
use crate::model::{Model, ModelError};
use crate::weights::{suggested_options, weights, Aspect};

/// Fixed set of pre-built models.
pub struct ModelPool {
    models: Vec<Mutex<Model>>,
    free: Mutex<Vec<usize>>,
    available: Condvar,
}

impl ModelPool {
    pub fn new(models: Vec<Model>) -> Result<Self> {
        if models.is_empty() {
            return Err(ModelError::EmptyPool.into());
        }
        let free = (0..models.len()).rev().collect();
        Ok(ModelPool {
            models: models.into_iter().map(Mutex::new).collect(),
            free: Mutex::new(free),
            available: Condvar::new(),
        })
    }

    /// Build `config.pool_size` models over the same catalog.
    pub fn build(catalog: Arc<Catalog>, config: &OptimizerConfig) -> Result<Self> {
        let models = (0..config.pool_size.max(1))
            .map(|_| {
                Model::new(Arc::clone(&catalog), create_configured_solver(config))
                    .map(|model| model.with_time_limit(config.time_limit))
            })
            .collect::<Result<Vec<_>>>()?;
        info!("Built a pool of {} models", models.len());
        ModelPool::new(models)
    }

    pub fn size(&self) -> usize {
        self.models.len()
    }

    /// Models not currently checked out.
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    /// Block until a model is free and take it. It is returned on drop.
    pub fn checkout(&self) -> PooledModel<'_> {
        let mut free = self.free.lock();
        let index = loop {
            if let Some(index) = free.pop() {
                break index;
            }
            self.available.wait(&mut free);
        };
        drop(free);
        PooledModel {
            pool: self,
            index,
            model: self.models[index].lock(),
        }
    }
}

/// Exclusive use of one pooled model.
pub struct PooledModel<'a> {
    pool: &'a ModelPool,
    index: usize,
    model: MutexGuard<'a, Model>,
}

impl Deref for PooledModel<'_> {
    type Target = Model;

    fn deref(&self) -> &Model {
        &self.model
    }
}

impl DerefMut for PooledModel<'_> {
    fn deref_mut(&mut self) -> &mut Model {
        &mut self.model
    }
}

impl Drop for PooledModel<'_> {
    fn drop(&mut self) {
        self.pool.free.lock().push(self.index);
        self.pool.available.notify_one();
    }
}

/// Bounded LRU of finished results. A capacity of zero disables caching.
pub struct ResultCache {
    entries: Option<Mutex<LruCache<String, BuildResult>>>,
}

impl ResultCache {
    pub fn new(capacity: usize) -> Self {
        ResultCache {
            entries: NonZeroUsize::new(capacity).map(|cap| Mutex::new(LruCache::new(cap))),
        }
    }

    pub fn get(&self, key: &str) -> Option<BuildResult> {
        self.entries.as_ref()?.lock().get(key).cloned()
    }

    pub fn put(&self, key: String, result: BuildResult) {
        if let Some(entries) = &self.entries {
            entries.lock().put(key, result);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, |entries| entries.lock().len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Validate, look up the cache, run on a pooled model, cache.
pub struct Optimizer {
    catalog: Arc<Catalog>,
    pool: ModelPool,
    cache: ResultCache,
    retries: u32,
}

impl Optimizer {
    pub fn new(catalog: Arc<Catalog>, config: &OptimizerConfig) -> Result<Self> {
        let pool = ModelPool::build(Arc::clone(&catalog), config)?;
        Ok(Optimizer::with_pool(catalog, pool, config.cache_size, config.retries))
    }

    pub fn with_pool(catalog: Arc<Catalog>, pool: ModelPool, cache_size: usize, retries: u32) -> Self {
        Optimizer {
            catalog,
            pool,
            cache: ResultCache::new(cache_size),
            retries,
        }
    }

    pub fn catalog(&self) -> &Arc<Catalog> {
        &self.catalog
    }

    pub fn pool(&self) -> &ModelPool {
        &self.pool
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    pub fn optimize(&self, request: &BuildRequest) -> Result<BuildResult> {
        validate_request(request, &self.catalog)?;

        let key = match request.cache_key() {
            Ok(key) => Some(key),
            Err(err) => {
                warn!("Could not serialize request, skipping cache: {}", err);
                None
            }
        };
        if let Some(result) = key.as_deref().and_then(|key| self.cache.get(key)) {
            debug!("Cache hit for {} level {}", request.char_class, request.char_level);
            return Ok(result);
        }

        let result = self.pool.checkout().optimize(request, self.retries)?;

        if let Some(key) = key {
            self.cache.put(key, result.clone());
        }
        Ok(result)
    }

    /// Derive weights, floors and options from `aspects`, then optimize.
    ///
    /// Derived floors are merged over the request's own minimums.
    pub fn optimize_with_aspects(
        &self,
        mut request: BuildRequest,
        aspects: &BTreeSet<Aspect>,
    ) -> Result<BuildResult> {
        weights(request.char_class, request.char_level, aspects)?.apply(&mut request);
        request.options = suggested_options(aspects, &request.options);
        self.optimize(&request)
    }
}
