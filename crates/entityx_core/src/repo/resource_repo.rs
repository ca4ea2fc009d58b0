//! Resource (menu/permission) repository.

use crate::model::resource::Resource;
use crate::query::Condition;
use crate::store::{EntityId, EntityRepo, RepoResult};
use rusqlite::Connection;

pub trait ResourceRepository {
    /// Direct children of `pid` (`0` for roots), lightest weight first.
    fn children(&self, pid: EntityId) -> RepoResult<Vec<Resource>>;
    fn list_by_ids(&self, ids: &[EntityId]) -> RepoResult<Vec<Resource>>;
    fn insert(&self, resource: &mut Resource) -> RepoResult<EntityId>;
    /// Writes the non-default fields of `resource` to row `resource.id`.
    fn update(&self, resource: &Resource) -> RepoResult<()>;
    fn delete(&self, id: EntityId) -> RepoResult<()>;
}

pub struct SqliteResourceRepository<'conn> {
    resources: EntityRepo<'conn, Resource>,
}

impl<'conn> SqliteResourceRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            resources: EntityRepo::try_new(conn)?,
        })
    }
}

impl ResourceRepository for SqliteResourceRepository<'_> {
    fn children(&self, pid: EntityId) -> RepoResult<Vec<Resource>> {
        // `pid = 0` is a real filter here, so it can't go through a model.
        let cond = Condition::new()
            .eq("pid", pid)
            .order_by("weight asc")
            .order_by("id asc");
        self.resources.list(&cond)
    }

    fn list_by_ids(&self, ids: &[EntityId]) -> RepoResult<Vec<Resource>> {
        self.resources.list_by_ids(ids)
    }

    fn insert(&self, resource: &mut Resource) -> RepoResult<EntityId> {
        self.resources.insert(resource)
    }

    fn update(&self, resource: &Resource) -> RepoResult<()> {
        self.resources.update_by_id(resource).map(|_| ())
    }

    fn delete(&self, id: EntityId) -> RepoResult<()> {
        self.resources.delete_by_id(id)
    }
}
