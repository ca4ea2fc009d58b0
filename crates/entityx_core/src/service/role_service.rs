//! Role use-case service.
//!
//! # Invariants
//! - Deleting a role and unlinking its resources commit or roll back together.
//! - Resource assignment only touches links that actually change.

use crate::model::resource::Resource;
use crate::model::role::{Role, RolePatch, RoleQuery, RoleResource};
use crate::query::{Condition, PageParam, PageResult};
use crate::repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
use crate::repo::role_repo::{RoleRepository, SqliteRoleRepository};
use crate::store::{step, tx, EntityId, EntityRepo, RepoResult};
use log::info;
use rusqlite::{Connection, Transaction};
use std::collections::BTreeSet;

pub struct RoleService<'conn> {
    conn: &'conn Connection,
}

impl<'conn> RoleService<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn repo(&self) -> RepoResult<SqliteRoleRepository<'conn>> {
        SqliteRoleRepository::try_new(self.conn)
    }

    pub fn page_roles(&self, query: &RoleQuery, page: &PageParam) -> RepoResult<PageResult<Role>> {
        self.repo()?.page_list(query, page)
    }

    /// Inserts when `role.id == 0`, otherwise applies `patch`-style update.
    pub fn save_role(&self, role: &mut Role) -> RepoResult<EntityId> {
        let repo = self.repo()?;
        if role.id == 0 {
            return repo.insert_role(role);
        }
        repo.update_role(&RolePatch {
            id: role.id,
            name: Some(role.name.clone()),
            code: Some(role.code.clone()),
            status: Some(role.status),
            remark: Some(role.remark.clone()),
        })?;
        Ok(role.id)
    }

    /// Soft-deletes a role and every link to its resources.
    pub fn delete_role(&self, role_id: EntityId) -> RepoResult<()> {
        tx(
            self.conn,
            vec![
                step(move |txn| EntityRepo::<Role>::new(txn).delete_by_id(role_id)),
                step(move |txn| {
                    EntityRepo::<RoleResource>::new(txn)
                        .delete_by_condition(&Condition::new().eq("role_id", role_id))
                        .map(|_| ())
                }),
            ],
        )?;
        info!("event=role_delete module=service status=ok role_id={role_id}");
        Ok(())
    }

    pub fn role_resource_ids(&self, role_id: EntityId) -> RepoResult<Vec<EntityId>> {
        self.repo()?.resource_ids(role_id)
    }

    /// Visible resources granted to the role; deleted resources drop out.
    pub fn role_resources(&self, role_id: EntityId) -> RepoResult<Vec<Resource>> {
        let ids = self.role_resource_ids(role_id)?;
        SqliteResourceRepository::try_new(self.conn)?.list_by_ids(&ids)
    }

    /// Makes `resource_ids` the role's exact resource set.
    ///
    /// The current links are read inside the write transaction, so the diff
    /// can't be computed from a snapshot another writer already changed.
    pub fn save_role_resources(
        &self,
        role_id: EntityId,
        resource_ids: &[EntityId],
        creator: &str,
    ) -> RepoResult<()> {
        let wanted: BTreeSet<EntityId> = resource_ids.iter().copied().collect();
        let mut changes = (0, 0);
        tx(
            self.conn,
            vec![step(|txn| {
                changes = sync_role_links(txn, role_id, &wanted, creator)?;
                Ok(())
            })],
        )?;

        info!(
            "event=role_resources_save module=service status=ok role_id={} added={} removed={}",
            role_id, changes.0, changes.1
        );
        Ok(())
    }
}

/// Applies the link diff for `role_id`; returns `(added, removed)`.
fn sync_role_links(
    txn: &Transaction<'_>,
    role_id: EntityId,
    wanted: &BTreeSet<EntityId>,
    creator: &str,
) -> RepoResult<(usize, usize)> {
    let links = EntityRepo::<RoleResource, _>::new(txn);
    let current: BTreeSet<EntityId> = links
        .list(&Condition::new().eq("role_id", role_id))?
        .into_iter()
        .map(|link| link.resource_id)
        .collect();

    let added: Vec<RoleResource> = wanted
        .difference(&current)
        .map(|&resource_id| RoleResource::new(role_id, resource_id, creator))
        .collect();
    let removed: Vec<EntityId> = current.difference(wanted).copied().collect();

    links.batch_insert(&added)?;
    if !removed.is_empty() {
        links.delete_by_condition(
            &Condition::new()
                .eq("role_id", role_id)
                .is_in("resource_id", removed.iter().copied()),
        )?;
    }
    Ok((added.len(), removed.len()))
}
