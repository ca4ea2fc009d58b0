//! Statement execution seam.
//!
//! Repositories never hold a global handle; they borrow an [`Executor`]. Both
//! `Connection` and `Transaction` implement it, and tests can wrap either.

use crate::store::entity::EntityId;
use crate::store::error::RepoResult;
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Row, Transaction};

pub trait Executor {
    /// Runs a statement and returns the affected row count.
    fn execute(&self, sql: &str, params: &[Value]) -> RepoResult<usize>;

    /// Runs a query whose first row's first column is an integer.
    fn query_scalar(&self, sql: &str, params: &[Value]) -> RepoResult<i64>;

    /// Runs a query and maps every row.
    fn query_rows<T, F>(&self, sql: &str, params: &[Value], map: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>;

    /// Id assigned by the most recent successful insert on this handle.
    fn last_insert_id(&self) -> EntityId;
}

impl Executor for Connection {
    fn execute(&self, sql: &str, params: &[Value]) -> RepoResult<usize> {
        Ok(Connection::execute(self, sql, params_from_iter(params))?)
    }

    fn query_scalar(&self, sql: &str, params: &[Value]) -> RepoResult<i64> {
        Ok(self.query_row(sql, params_from_iter(params), |row| row.get(0))?)
    }

    fn query_rows<T, F>(&self, sql: &str, params: &[Value], mut map: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>,
    {
        let mut stmt = self.prepare_cached(sql)?;
        let mut rows = stmt.query(params_from_iter(params))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(map(row)?);
        }
        Ok(items)
    }

    fn last_insert_id(&self) -> EntityId {
        self.last_insert_rowid()
    }
}

impl Executor for Transaction<'_> {
    fn execute(&self, sql: &str, params: &[Value]) -> RepoResult<usize> {
        <Connection as Executor>::execute(self, sql, params)
    }

    fn query_scalar(&self, sql: &str, params: &[Value]) -> RepoResult<i64> {
        <Connection as Executor>::query_scalar(self, sql, params)
    }

    fn query_rows<T, F>(&self, sql: &str, params: &[Value], map: F) -> RepoResult<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> RepoResult<T>,
    {
        <Connection as Executor>::query_rows(self, sql, params, map)
    }

    fn last_insert_id(&self) -> EntityId {
        self.last_insert_rowid()
    }
}
