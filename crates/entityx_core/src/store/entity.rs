//! Entity contract for tables accessed through [`EntityRepo`](crate::store::EntityRepo).

use crate::store::error::RepoResult;
use crate::store::soft_delete::{DELETED_COLUMN, DELETE_TIME_COLUMN, ID_COLUMN};
use rusqlite::types::Value;
use rusqlite::Row;

/// Store-assigned surrogate key.
pub type EntityId = i64;

/// A record stored in a table with `id`, `is_deleted` and `delete_time`.
pub trait Entity: Sized {
    const TABLE: &'static str;
    /// Caller-owned columns, in [`Entity::insert_values`] order.
    const COLUMNS: &'static [&'static str];

    /// `0` until the store assigns an id on insert.
    fn id(&self) -> EntityId;
    fn set_id(&mut self, id: EntityId);
    fn insert_values(&self) -> Vec<Value>;
    fn from_row(row: &Row<'_>) -> RepoResult<Self>;
}

pub(crate) fn select_sql<E: Entity>() -> String {
    format!(
        "SELECT {ID_COLUMN}, {}, {DELETED_COLUMN}, {DELETE_TIME_COLUMN} FROM {}",
        E::COLUMNS.join(", "),
        E::TABLE
    )
}
