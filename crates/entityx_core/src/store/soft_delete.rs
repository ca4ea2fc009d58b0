//! Soft-delete scope.
//!
//! # Invariants
//! - Default read paths append [`UNDELETED_CLAUSE`].
//! - Deletes set `is_deleted = 1` and refresh `delete_time`; rows persist.
//! - `delete_time` is epoch milliseconds, the same unit as `create_time`.

use crate::store::error::{RepoError, RepoResult};
use rusqlite::Row;

pub const ID_COLUMN: &str = "id";
pub const DELETED_COLUMN: &str = "is_deleted";
pub const DELETE_TIME_COLUMN: &str = "delete_time";

pub(crate) const UNDELETED_CLAUSE: &str = "is_deleted = 0";
/// Expects the delete stamp as its only parameter, bound before any filter.
pub(crate) const DELETE_ASSIGNMENTS: &str = "is_deleted = 1, delete_time = ?";

/// Columns managed by this layer rather than by callers.
pub fn is_reserved_column(column: &str) -> bool {
    column == DELETED_COLUMN || column == DELETE_TIME_COLUMN
}

/// Reads the deleted flag, rejecting anything but 0/1.
pub fn read_deleted_flag(row: &Row<'_>, table: &str) -> RepoResult<bool> {
    match row.get::<_, i64>(DELETED_COLUMN)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid is_deleted value `{other}` in {table}.is_deleted"
        ))),
    }
}

/// Epoch milliseconds of the last soft delete, if any.
pub fn read_delete_time(row: &Row<'_>) -> RepoResult<Option<i64>> {
    Ok(row.get(DELETE_TIME_COLUMN)?)
}

pub(crate) fn current_epoch_ms() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|elapsed| i64::try_from(elapsed.as_millis()).unwrap_or(i64::MAX))
        .unwrap_or(0)
}
