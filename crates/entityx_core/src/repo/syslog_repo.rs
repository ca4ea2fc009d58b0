//! Operation log repository.

use crate::model::syslog::{SysLog, SysLogQuery};
use crate::query::{Condition, PageParam, PageResult};
use crate::store::{EntityId, EntityRepo, RepoResult};
use rusqlite::Connection;

pub trait SyslogRepository {
    /// Newest entries first.
    fn page_list(&self, query: &SysLogQuery, page: &PageParam) -> RepoResult<PageResult<SysLog>>;
    fn insert(&self, log: &mut SysLog) -> RepoResult<EntityId>;
}

pub struct SqliteSyslogRepository<'conn> {
    logs: EntityRepo<'conn, SysLog>,
}

impl<'conn> SqliteSyslogRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            logs: EntityRepo::try_new(conn)?,
        })
    }
}

impl SyslogRepository for SqliteSyslogRepository<'_> {
    fn page_list(&self, query: &SysLogQuery, page: &PageParam) -> RepoResult<PageResult<SysLog>> {
        let cond = Condition::new().with_cond_model(query).order_by("id desc");
        self.logs.page_query(&cond, page)
    }

    fn insert(&self, log: &mut SysLog) -> RepoResult<EntityId> {
        self.logs.insert(log)
    }
}
