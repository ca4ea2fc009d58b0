//! Config use-case service with a read-through cache.
//!
//! # Invariants
//! - A cache entry is dropped only after its write succeeded; a failed write
//!   leaves the cache untouched.
//! - Lookups of unknown keys are not cached.

use crate::model::config::{Config, ConfigQuery};
use crate::query::{PageParam, PageResult};
use crate::repo::config_repo::ConfigRepository;
use crate::store::{RepoError, RepoResult};
use log::{debug, warn};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

pub struct ConfigService<R: ConfigRepository> {
    repo: R,
    cache: Mutex<HashMap<String, Config>>,
}

impl<R: ConfigRepository> ConfigService<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn page_list(&self, query: &ConfigQuery, page: &PageParam) -> RepoResult<PageResult<Config>> {
        self.repo.page_list(query, page)
    }

    /// Returns the entry for `key`, or `None` when no visible entry exists.
    pub fn get_config(&self, key: &str) -> RepoResult<Option<Config>> {
        if let Some(cached) = self.cache().get(key) {
            return Ok(Some(cached.clone()));
        }

        match self.repo.get_by_key(key) {
            Ok(config) => {
                self.cache().insert(key.to_string(), config.clone());
                Ok(Some(config))
            }
            Err(RepoError::NotFound { .. }) => {
                warn!("event=config_get module=service status=missing key_len={}", key.len());
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Inserts when `config.id == 0`, otherwise updates its non-default fields.
    pub fn save(&self, config: &mut Config) -> RepoResult<()> {
        if config.id == 0 {
            self.repo.insert(config)?;
        } else {
            self.repo.update(config)?;
        }
        self.invalidate(config);
        Ok(())
    }

    pub fn is_cached(&self, key: &str) -> bool {
        self.cache().contains_key(key)
    }

    /// Drops the entry by key and, for partial updates without a key, by id.
    fn invalidate(&self, saved: &Config) {
        let mut cache = self.cache();
        let before = cache.len();
        cache.retain(|key, cached| *key != saved.key && cached.id != saved.id);
        debug!(
            "event=config_cache_invalidate module=service status=ok dropped={}",
            before - cache.len()
        );
    }

    fn cache(&self) -> MutexGuard<'_, HashMap<String, Config>> {
        self.cache
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
