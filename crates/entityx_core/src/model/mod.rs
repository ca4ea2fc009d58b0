//! Domain records stored through the generic entity layer.
//!
//! # Responsibility
//! - Map system tables (roles, resources, configs, logs) to typed records.
//! - Provide explicit query/patch shapes next to each record.
//!
//! # Invariants
//! - Every record carries `id`, `is_deleted` and `delete_time`.
//! - Using a record itself as a condition model or patch follows zero-value
//!   semantics: default-valued fields are ignored.

pub mod config;
pub mod resource;
pub mod role;
pub mod syslog;

use crate::store::soft_delete::current_epoch_ms;
use rusqlite::types::Value;

/// Uses `epoch_ms` when set, otherwise the current time.
pub(crate) fn stamp_or_now(epoch_ms: i64) -> Value {
    if epoch_ms > 0 {
        Value::Integer(epoch_ms)
    } else {
        Value::Integer(current_epoch_ms())
    }
}
