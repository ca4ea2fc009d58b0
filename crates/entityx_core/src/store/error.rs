//! Error taxonomy for entity access.

use crate::db::DbError;
use crate::store::entity::EntityId;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Errors returned by [`EntityRepo`](crate::store::EntityRepo) and [`tx`](crate::store::tx).
#[derive(Debug)]
pub enum RepoError {
    /// Store failure on a read path.
    Db(DbError),
    /// No visible row matched. Deleted and absent rows are indistinguishable.
    NotFound {
        table: &'static str,
        id: Option<EntityId>,
    },
    /// Caller supplied structurally invalid parameters.
    Validation(String),
    /// Store rejected an insert, update or delete.
    Write {
        table: &'static str,
        source: DbError,
    },
    /// A transaction step failed; `step` equals the step count when commit failed.
    TransactionAborted { step: usize, cause: Box<RepoError> },
    /// A transaction step panicked; only seen as a `TransactionAborted` cause.
    StepPanicked(String),
    /// Persisted row cannot be mapped to the entity.
    InvalidData(String),
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Re-labels a store failure as a write failure on `table`.
    pub(crate) fn into_write(self, table: &'static str) -> Self {
        match self {
            Self::Db(source) => Self::Write { table, source },
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound {
                table,
                id: Some(id),
            } => write!(f, "{table} record not found: id={id}"),
            Self::NotFound { table, id: None } => {
                write!(f, "{table} record not found for condition")
            }
            Self::Validation(message) => write!(f, "invalid parameter: {message}"),
            Self::Write { table, source } => write!(f, "write to {table} failed: {source}"),
            Self::TransactionAborted { step, cause } => {
                write!(f, "transaction rolled back at step {step}: {cause}")
            }
            Self::StepPanicked(payload) => write!(f, "transaction step panicked: {payload}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::MissingRequiredTable(table) => {
                write!(f, "entity access requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "entity access requires column `{column}` in table `{table}`"
            ),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Write { source, .. } => Some(source),
            Self::TransactionAborted { cause, .. } => Some(cause.as_ref()),
            Self::NotFound { .. }
            | Self::Validation(_)
            | Self::StepPanicked(_)
            | Self::InvalidData(_)
            | Self::MissingRequiredTable(_)
            | Self::MissingRequiredColumn { .. } => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
