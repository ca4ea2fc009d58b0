//! Config repository contracts and SQLite implementation.

use crate::model::config::{Config, ConfigQuery};
use crate::query::{Condition, PageParam, PageResult};
use crate::store::{EntityId, EntityRepo, RepoResult};
use rusqlite::Connection;

/// Repository interface for system configuration entries.
pub trait ConfigRepository {
    fn page_list(&self, query: &ConfigQuery, page: &PageParam) -> RepoResult<PageResult<Config>>;
    /// Fails with `NotFound` when no visible entry has `key`.
    fn get_by_key(&self, key: &str) -> RepoResult<Config>;
    fn insert(&self, config: &mut Config) -> RepoResult<EntityId>;
    /// Writes the non-default fields of `config` to row `config.id`.
    fn update(&self, config: &Config) -> RepoResult<()>;
}

/// SQLite-backed config repository.
pub struct SqliteConfigRepository<'conn> {
    configs: EntityRepo<'conn, Config>,
}

impl<'conn> SqliteConfigRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            configs: EntityRepo::try_new(conn)?,
        })
    }
}

impl ConfigRepository for SqliteConfigRepository<'_> {
    fn page_list(&self, query: &ConfigQuery, page: &PageParam) -> RepoResult<PageResult<Config>> {
        let cond = Condition::new().with_cond_model(query);
        self.configs.page_query(&cond, page)
    }

    fn get_by_key(&self, key: &str) -> RepoResult<Config> {
        self.configs.get_by(&ConfigQuery {
            key: Some(key.to_string()),
            ..ConfigQuery::default()
        })
    }

    fn insert(&self, config: &mut Config) -> RepoResult<EntityId> {
        self.configs.insert(config)
    }

    fn update(&self, config: &Config) -> RepoResult<()> {
        self.configs.update_by_id(config).map(|_| ())
    }
}
