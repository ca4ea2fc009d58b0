//! System configuration entry.

use crate::query::fields::{FieldModel, FieldValues, Patch};
use crate::store::entity::{Entity, EntityId};
use crate::store::error::RepoResult;
use crate::store::soft_delete::{read_delete_time, read_deleted_flag};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

/// Permission value granting every account write access.
pub const CONFIG_PERMISSION_ALL: &str = "all";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub id: EntityId,
    pub name: String,
    /// Unique among visible configs; stored as `config_key`.
    pub key: String,
    pub value: String,
    pub permission: String,
    pub remark: String,
    pub modifier: String,
    pub is_deleted: bool,
    pub delete_time: Option<i64>,
}

impl Config {
    pub fn new(name: impl Into<String>, key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            value: value.into(),
            permission: CONFIG_PERMISSION_ALL.to_string(),
            ..Self::default()
        }
    }
}

impl Entity for Config {
    const TABLE: &'static str = "configs";
    const COLUMNS: &'static [&'static str] = &[
        "name",
        "config_key",
        "value",
        "permission",
        "remark",
        "modifier",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<Value> {
        vec![
            Value::Text(self.name.clone()),
            Value::Text(self.key.clone()),
            Value::Text(self.value.clone()),
            Value::Text(self.permission.clone()),
            Value::Text(self.remark.clone()),
            Value::Text(self.modifier.clone()),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            key: row.get("config_key")?,
            value: row.get("value")?,
            permission: row.get("permission")?,
            remark: row.get("remark")?,
            modifier: row.get("modifier")?,
            is_deleted: read_deleted_flag(row, Self::TABLE)?,
            delete_time: read_delete_time(row)?,
        })
    }
}

impl FieldModel for Config {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_non_default("name", self.name.clone())
            .set_non_default("config_key", self.key.clone())
            .set_non_default("value", self.value.clone())
            .set_non_default("permission", self.permission.clone())
            .set_non_default("remark", self.remark.clone())
            .set_non_default("modifier", self.modifier.clone());
        values
    }
}

impl Patch for Config {
    fn patch_id(&self) -> EntityId {
        self.id
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigQuery {
    pub name: Option<String>,
    pub key: Option<String>,
}

impl FieldModel for ConfigQuery {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_opt("name", self.name.clone())
            .set_opt("config_key", self.key.clone());
        values
    }
}
