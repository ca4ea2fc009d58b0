//! Menu/permission resource record.

use crate::query::fields::{FieldModel, FieldValues, Patch};
use crate::store::entity::{Entity, EntityId};
use crate::store::error::RepoResult;
use crate::store::soft_delete::{read_delete_time, read_deleted_flag};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

pub const RESOURCE_KIND_MENU: i64 = 1;
pub const RESOURCE_KIND_PERMISSION: i64 = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub id: EntityId,
    /// Parent resource id, `0` for roots.
    pub pid: EntityId,
    pub name: String,
    pub code: String,
    pub kind: i64,
    pub status: i64,
    pub weight: i64,
    pub is_deleted: bool,
    pub delete_time: Option<i64>,
}

impl Resource {
    pub fn new(pid: EntityId, name: impl Into<String>, code: impl Into<String>, kind: i64) -> Self {
        Self {
            pid,
            name: name.into(),
            code: code.into(),
            kind,
            status: 1,
            ..Self::default()
        }
    }
}

impl Entity for Resource {
    const TABLE: &'static str = "resources";
    const COLUMNS: &'static [&'static str] = &["pid", "name", "code", "kind", "status", "weight"];

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.pid),
            Value::Text(self.name.clone()),
            Value::Text(self.code.clone()),
            Value::Integer(self.kind),
            Value::Integer(self.status),
            Value::Integer(self.weight),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            pid: row.get("pid")?,
            name: row.get("name")?,
            code: row.get("code")?,
            kind: row.get("kind")?,
            status: row.get("status")?,
            weight: row.get("weight")?,
            is_deleted: read_deleted_flag(row, Self::TABLE)?,
            delete_time: read_delete_time(row)?,
        })
    }
}

impl FieldModel for Resource {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_non_default("pid", self.pid)
            .set_non_default("name", self.name.clone())
            .set_non_default("code", self.code.clone())
            .set_non_default("kind", self.kind)
            .set_non_default("status", self.status)
            .set_non_default("weight", self.weight);
        values
    }
}

impl Patch for Resource {
    fn patch_id(&self) -> EntityId {
        self.id
    }
}
