//! Role and role-resource link records.

use super::stamp_or_now;
use crate::query::fields::{FieldModel, FieldValues, Patch};
use crate::store::entity::{Entity, EntityId};
use crate::store::error::RepoResult;
use crate::store::soft_delete::{read_delete_time, read_deleted_flag};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const ROLE_STATUS_ENABLED: i64 = 1;
pub const ROLE_STATUS_DISABLED: i64 = -1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: EntityId,
    pub name: String,
    /// Unique among visible roles.
    pub code: String,
    pub status: i64,
    pub remark: String,
    pub creator: String,
    /// Epoch milliseconds. `0` lets the store stamp the insert time.
    pub create_time: i64,
    pub is_deleted: bool,
    pub delete_time: Option<i64>,
}

impl Role {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
            status: ROLE_STATUS_ENABLED,
            ..Self::default()
        }
    }
}

impl Entity for Role {
    const TABLE: &'static str = "roles";
    const COLUMNS: &'static [&'static str] =
        &["name", "code", "status", "remark", "creator", "create_time"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.code.clone()),
            Value::Integer(self.status),
            Value::Text(self.remark.clone()),
            Value::Text(self.creator.clone()),
            stamp_or_now(self.create_time),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            code: row.get("code")?,
            status: row.get("status")?,
            remark: row.get("remark")?,
            creator: row.get("creator")?,
            create_time: row.get("create_time")?,
            is_deleted: read_deleted_flag(row, Self::TABLE)?,
            delete_time: read_delete_time(row)?,
        })
    }
}

impl FieldModel for Role {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_non_default("name", self.name.clone())
            .set_non_default("code", self.code.clone())
            .set_non_default("status", self.status)
            .set_non_default("remark", self.remark.clone())
            .set_non_default("creator", self.creator.clone());
        values
    }
}

impl Patch for Role {
    fn patch_id(&self) -> EntityId {
        self.id
    }
}

/// Explicit role filter; `None` fields do not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleQuery {
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<i64>,
}

impl FieldModel for RoleQuery {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_opt("name", self.name.clone())
            .set_opt("code", self.code.clone())
            .set_opt("status", self.status);
        values
    }
}

/// Explicit role patch; `Some("")` clears a text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RolePatch {
    pub id: EntityId,
    pub name: Option<String>,
    pub code: Option<String>,
    pub status: Option<i64>,
    pub remark: Option<String>,
}

impl FieldModel for RolePatch {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_opt("name", self.name.clone())
            .set_opt("code", self.code.clone())
            .set_opt("status", self.status)
            .set_opt("remark", self.remark.clone());
        values
    }
}

impl Patch for RolePatch {
    fn patch_id(&self) -> EntityId {
        self.id
    }
}

/// Link between a role and a resource it grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleResource {
    pub id: EntityId,
    pub role_id: EntityId,
    pub resource_id: EntityId,
    pub creator: String,
    pub create_time: i64,
    pub is_deleted: bool,
    pub delete_time: Option<i64>,
}

impl RoleResource {
    pub fn new(role_id: EntityId, resource_id: EntityId, creator: impl Into<String>) -> Self {
        Self {
            role_id,
            resource_id,
            creator: creator.into(),
            ..Self::default()
        }
    }
}

impl Entity for RoleResource {
    const TABLE: &'static str = "role_resources";
    const COLUMNS: &'static [&'static str] = &["role_id", "resource_id", "creator", "create_time"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.role_id),
            Value::Integer(self.resource_id),
            Value::Text(self.creator.clone()),
            stamp_or_now(self.create_time),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            role_id: row.get("role_id")?,
            resource_id: row.get("resource_id")?,
            creator: row.get("creator")?,
            create_time: row.get("create_time")?,
            is_deleted: read_deleted_flag(row, Self::TABLE)?,
            delete_time: read_delete_time(row)?,
        })
    }
}

impl FieldModel for RoleResource {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_non_default("role_id", self.role_id)
            .set_non_default("resource_id", self.resource_id)
            .set_non_default("creator", self.creator.clone());
        values
    }
}
