//! Operation log record. Append-only in practice.

use super::stamp_or_now;
use crate::query::fields::{FieldModel, FieldValues};
use crate::store::entity::{Entity, EntityId};
use crate::store::error::{RepoError, RepoResult};
use crate::store::soft_delete::{read_delete_time, read_deleted_flag};
use rusqlite::types::Value;
use rusqlite::Row;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogKind {
    Success,
    Error,
}

impl LogKind {
    fn to_db(self) -> i64 {
        match self {
            Self::Success => 1,
            Self::Error => 2,
        }
    }

    fn from_db(value: i64) -> Option<Self> {
        match value {
            1 => Some(Self::Success),
            2 => Some(Self::Error),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysLog {
    pub id: EntityId,
    pub kind: LogKind,
    pub description: String,
    pub req_param: String,
    pub resp: String,
    pub creator_id: EntityId,
    pub creator: String,
    pub create_time: i64,
    pub is_deleted: bool,
    pub delete_time: Option<i64>,
}

impl SysLog {
    pub fn new(kind: LogKind, description: impl Into<String>) -> Self {
        Self {
            id: 0,
            kind,
            description: description.into(),
            req_param: String::new(),
            resp: String::new(),
            creator_id: 0,
            creator: String::new(),
            create_time: 0,
            is_deleted: false,
            delete_time: None,
        }
    }
}

impl Entity for SysLog {
    const TABLE: &'static str = "sys_logs";
    const COLUMNS: &'static [&'static str] = &[
        "kind",
        "description",
        "req_param",
        "resp",
        "creator_id",
        "creator",
        "create_time",
    ];

    fn id(&self) -> EntityId {
        self.id
    }

    fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn insert_values(&self) -> Vec<Value> {
        vec![
            Value::Integer(self.kind.to_db()),
            Value::Text(self.description.clone()),
            Value::Text(self.req_param.clone()),
            Value::Text(self.resp.clone()),
            Value::Integer(self.creator_id),
            Value::Text(self.creator.clone()),
            stamp_or_now(self.create_time),
        ]
    }

    fn from_row(row: &Row<'_>) -> RepoResult<Self> {
        let kind_value: i64 = row.get("kind")?;
        let kind = LogKind::from_db(kind_value).ok_or_else(|| {
            RepoError::InvalidData(format!("invalid log kind `{kind_value}` in sys_logs.kind"))
        })?;
        Ok(Self {
            id: row.get("id")?,
            kind,
            description: row.get("description")?,
            req_param: row.get("req_param")?,
            resp: row.get("resp")?,
            creator_id: row.get("creator_id")?,
            creator: row.get("creator")?,
            create_time: row.get("create_time")?,
            is_deleted: read_deleted_flag(row, Self::TABLE)?,
            delete_time: read_delete_time(row)?,
        })
    }
}

/// Log filter used by paged listing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SysLogQuery {
    pub kind: Option<LogKind>,
    pub creator_id: Option<EntityId>,
}

impl FieldModel for SysLogQuery {
    fn field_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .set_opt("kind", self.kind.map(LogKind::to_db))
            .set_opt("creator_id", self.creator_id);
        values
    }
}
