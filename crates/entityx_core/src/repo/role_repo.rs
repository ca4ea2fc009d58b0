//! Role repository contracts and SQLite implementation.

use crate::model::role::{Role, RolePatch, RoleQuery, RoleResource};
use crate::query::{Condition, PageParam, PageResult};
use crate::store::{EntityId, EntityRepo, RepoResult};
use rusqlite::Connection;

/// Repository interface for roles and their resource links.
pub trait RoleRepository {
    fn page_list(&self, query: &RoleQuery, page: &PageParam) -> RepoResult<PageResult<Role>>;
    fn get_role(&self, id: EntityId) -> RepoResult<Role>;
    fn insert_role(&self, role: &mut Role) -> RepoResult<EntityId>;
    fn update_role(&self, patch: &RolePatch) -> RepoResult<()>;
    fn resource_ids(&self, role_id: EntityId) -> RepoResult<Vec<EntityId>>;
}

/// SQLite-backed role repository.
pub struct SqliteRoleRepository<'conn> {
    roles: EntityRepo<'conn, Role>,
    links: EntityRepo<'conn, RoleResource>,
}

impl<'conn> SqliteRoleRepository<'conn> {
    /// Accepts a plain connection or, through deref, an open transaction.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        Ok(Self {
            roles: EntityRepo::try_new(conn)?,
            links: EntityRepo::try_new(conn)?,
        })
    }
}

impl RoleRepository for SqliteRoleRepository<'_> {
    fn page_list(&self, query: &RoleQuery, page: &PageParam) -> RepoResult<PageResult<Role>> {
        let cond = Condition::new().with_cond_model(query).order_by("id desc");
        self.roles.page_query(&cond, page)
    }

    fn get_role(&self, id: EntityId) -> RepoResult<Role> {
        self.roles.get_by_id(id)
    }

    fn insert_role(&self, role: &mut Role) -> RepoResult<EntityId> {
        self.roles.insert(role)
    }

    fn update_role(&self, patch: &RolePatch) -> RepoResult<()> {
        self.roles.update_by_id(patch).map(|_| ())
    }

    fn resource_ids(&self, role_id: EntityId) -> RepoResult<Vec<EntityId>> {
        let cond = Condition::new().eq("role_id", role_id).order_by("resource_id");
        Ok(self
            .links
            .list(&cond)?
            .into_iter()
            .map(|link| link.resource_id)
            .collect())
    }
}
