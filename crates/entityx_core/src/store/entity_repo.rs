//! Generic read/write operations for any [`Entity`].
//!
//! # Responsibility
//! - Single-row, list, count and paged reads under the soft-delete scope.
//! - Insert, batch insert, partial update, explicit update and soft delete.
//!
//! # Invariants
//! - Reads hide deleted rows unless the condition opts out.
//! - Writes target rows by id or explicit condition and ignore deleted status
//!   unless the condition asks for [`Condition::undeleted`].
//! - `id`, `is_deleted` and `delete_time` are never written by caller patches.
//! - Condition-wide writes and deletes refuse an unconstrained condition.

use crate::query::condition::{check_identifier, placeholders, Access, Condition, Filter};
use crate::query::fields::{FieldModel, FieldValues, Patch};
use crate::query::page::{PageParam, PageResult};
use crate::store::entity::{select_sql, Entity, EntityId};
use crate::store::error::{RepoError, RepoResult};
use crate::store::executor::Executor;
use crate::store::soft_delete::{
    current_epoch_ms, is_reserved_column, DELETED_COLUMN, DELETE_ASSIGNMENTS, DELETE_TIME_COLUMN,
    ID_COLUMN,
};
use log::{debug, error};
use rusqlite::types::Value;
use rusqlite::Connection;
use std::marker::PhantomData;
use std::time::Instant;

const DEFAULT_LIST_ORDER: &str = "id DESC";
const DEFAULT_PAGE_ORDER: &str = "id ASC";
/// SQLite's default `SQLITE_MAX_VARIABLE_NUMBER` for bundled builds.
const MAX_BIND_PARAMS: usize = 32_766;
const BATCH_SAVEPOINT: &str = "entityx_batch_insert";

/// Entity access bound to one executor.
pub struct EntityRepo<'x, E, X: Executor = Connection> {
    exec: &'x X,
    _entity: PhantomData<fn() -> E>,
}

impl<'x, E: Entity, X: Executor> EntityRepo<'x, E, X> {
    /// Binds without checking the table layout.
    pub fn new(exec: &'x X) -> Self {
        Self {
            exec,
            _entity: PhantomData,
        }
    }

    /// Binds after checking that `E::TABLE` has every column this layer uses.
    pub fn try_new(exec: &'x X) -> RepoResult<Self> {
        ensure_entity_layout::<E, X>(exec)?;
        Ok(Self::new(exec))
    }

    pub fn executor(&self) -> &'x X {
        self.exec
    }

    /// Fetches one visible row by id.
    pub fn get_by_id(&self, id: EntityId) -> RepoResult<E> {
        let filter = Condition::new().eq(ID_COLUMN, id).build()?;
        self.fetch(&filter, DEFAULT_PAGE_ORDER, Some((1, 0)))?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound {
                table: E::TABLE,
                id: Some(id),
            })
    }

    /// Fetches every visible row whose id is in `ids`, newest first.
    pub fn list_by_ids(&self, ids: &[EntityId]) -> RepoResult<Vec<E>> {
        let filter = Condition::new()
            .is_in(ID_COLUMN, ids.iter().copied())
            .build()?;
        self.fetch(&filter, DEFAULT_LIST_ORDER, None)
    }

    /// Fetches the first visible row matching `model`'s populated fields.
    pub fn get_by(&self, model: &impl FieldModel) -> RepoResult<E> {
        let filter = Condition::new().with_cond_model(model).build()?;
        self.fetch(&filter, DEFAULT_PAGE_ORDER, Some((1, 0)))?
            .into_iter()
            .next()
            .ok_or(RepoError::NotFound {
                table: E::TABLE,
                id: None,
            })
    }

    /// Lists visible rows matching `model`, newest first.
    pub fn list_by(&self, model: &impl FieldModel) -> RepoResult<Vec<E>> {
        self.list_by_order(model, &[])
    }

    /// Lists visible rows matching `model` ordered by `order` (default `id desc`).
    pub fn list_by_order(&self, model: &impl FieldModel, order: &[&str]) -> RepoResult<Vec<E>> {
        let cond = order
            .iter()
            .fold(Condition::new().with_cond_model(model), |cond, term| {
                cond.order_by(term)
            });
        self.list(&cond)
    }

    /// Lists rows matching `cond` under its scope, newest first unless ordered.
    pub fn list(&self, cond: &Condition) -> RepoResult<Vec<E>> {
        let filter = cond.build()?;
        self.fetch(&filter, DEFAULT_LIST_ORDER, None)
    }

    /// Counts rows matching `cond` under its scope.
    pub fn count(&self, cond: &Condition) -> RepoResult<u64> {
        let filter = cond.build()?;
        self.count_filter(&filter)
    }

    /// Counts visible rows matching the populated fields of `entity` itself.
    pub fn count_by(&self, entity: &E) -> RepoResult<u64>
    where
        E: FieldModel,
    {
        self.count_by_cond(entity)
    }

    /// Counts visible rows matching a separate condition model.
    pub fn count_by_cond(&self, model: &impl FieldModel) -> RepoResult<u64> {
        self.count(&Condition::new().with_cond_model(model))
    }

    /// Counts, then fetches one page. A zero count skips the row fetch.
    pub fn page_query(&self, cond: &Condition, page: &PageParam) -> RepoResult<PageResult<E>> {
        page.validate()?;
        let started_at = Instant::now();
        let filter = cond.build()?;

        let total = self.count_filter(&filter)?;
        if total == 0 {
            debug!(
                "event=page_query module=store status=ok table={} total=0 fetched=0",
                E::TABLE
            );
            return Ok(PageResult::empty());
        }

        let list = self.fetch(
            &filter,
            DEFAULT_PAGE_ORDER,
            Some((page.limit(), page.offset())),
        )?;
        debug!(
            "event=page_query module=store status=ok table={} total={} fetched={} page_num={} duration_ms={}",
            E::TABLE,
            total,
            list.len(),
            page.page_num,
            started_at.elapsed().as_millis()
        );
        Ok(PageResult { total, list })
    }

    /// Inserts one row and writes the assigned id back into `entity`.
    pub fn insert(&self, entity: &mut E) -> RepoResult<EntityId> {
        let values = checked_insert_values::<E>(entity)?;
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            E::TABLE,
            E::COLUMNS.join(", "),
            placeholders(E::COLUMNS.len())
        );
        self.exec
            .execute(&sql, &values)
            .map_err(|err| err.into_write(E::TABLE))?;

        let id = self.exec.last_insert_id();
        entity.set_id(id);
        debug!(
            "event=insert module=store status=ok table={} id={}",
            E::TABLE,
            id
        );
        Ok(id)
    }

    /// Inserts all rows or none.
    ///
    /// Fits in one statement unless the batch exceeds the bind-parameter
    /// limit; larger batches are chunked inside a savepoint.
    pub fn batch_insert(&self, entities: &[E]) -> RepoResult<usize> {
        if entities.is_empty() {
            return Ok(0);
        }

        let rows_per_statement = (MAX_BIND_PARAMS / E::COLUMNS.len().max(1)).max(1);
        if entities.len() <= rows_per_statement {
            return self.insert_rows(entities);
        }

        self.exec
            .execute(&format!("SAVEPOINT {BATCH_SAVEPOINT}"), &[])
            .map_err(|err| err.into_write(E::TABLE))?;
        let mut inserted = 0;
        for chunk in entities.chunks(rows_per_statement) {
            match self.insert_rows(chunk) {
                Ok(count) => inserted += count,
                Err(err) => {
                    self.abandon_batch_savepoint();
                    return Err(err);
                }
            }
        }
        self.exec
            .execute(&format!("RELEASE {BATCH_SAVEPOINT}"), &[])
            .map_err(|err| err.into_write(E::TABLE))?;
        Ok(inserted)
    }

    /// Writes the populated fields of `patch` to the row `patch.patch_id()`.
    ///
    /// Fields the patch leaves unpopulated are untouched. Returns `Ok(0)`
    /// without a statement when nothing is populated.
    pub fn update_by_id(&self, patch: &impl Patch) -> RepoResult<usize> {
        let values = patch.field_values();
        check_assignments(&values)?;
        if values.is_empty() {
            return Ok(0);
        }

        let id = patch.patch_id();
        let (assignments, mut params) = render_assignments(&values);
        params.push(Value::Integer(id));
        let sql = format!(
            "UPDATE {} SET {assignments} WHERE {ID_COLUMN} = ?",
            E::TABLE
        );
        let changed = self
            .exec
            .execute(&sql, &params)
            .map_err(|err| err.into_write(E::TABLE))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: E::TABLE,
                id: Some(id),
            });
        }

        debug!(
            "event=update_by_id module=store status=ok table={} id={} fields={}",
            E::TABLE,
            id,
            values.len()
        );
        Ok(changed)
    }

    /// Writes every entry of `fields` to all rows matching `cond`.
    pub fn updates(&self, cond: &Condition, fields: &FieldValues) -> RepoResult<usize> {
        check_assignments(fields)?;
        if fields.is_empty() {
            return Err(RepoError::Validation(
                "updates requires at least one field".to_string(),
            ));
        }
        let filter = constrained_filter::<E>(cond, "updates")?;

        let (assignments, mut params) = render_assignments(fields);
        params.extend_from_slice(filter.params());
        let sql = format!(
            "UPDATE {} SET {assignments}{}",
            E::TABLE,
            filter.where_sql(Access::Write)
        );
        let changed = self
            .exec
            .execute(&sql, &params)
            .map_err(|err| err.into_write(E::TABLE))?;
        debug!(
            "event=updates module=store status=ok table={} changed={}",
            E::TABLE,
            changed
        );
        Ok(changed)
    }

    /// Soft-deletes one row. Repeating it keeps the row hidden and refreshes
    /// `delete_time`.
    pub fn delete_by_id(&self, id: EntityId) -> RepoResult<()> {
        let sql = format!(
            "UPDATE {} SET {DELETE_ASSIGNMENTS} WHERE {ID_COLUMN} = ?",
            E::TABLE
        );
        let changed = self
            .exec
            .execute(&sql, &[Value::Integer(current_epoch_ms()), Value::Integer(id)])
            .map_err(|err| err.into_write(E::TABLE))?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                table: E::TABLE,
                id: Some(id),
            });
        }

        debug!(
            "event=delete_by_id module=store status=ok table={} id={}",
            E::TABLE,
            id
        );
        Ok(())
    }

    /// Soft-deletes every row matching `cond`.
    pub fn delete_by_condition(&self, cond: &Condition) -> RepoResult<usize> {
        let filter = constrained_filter::<E>(cond, "delete_by_condition")?;
        let sql = format!(
            "UPDATE {} SET {DELETE_ASSIGNMENTS}{}",
            E::TABLE,
            filter.where_sql(Access::Write)
        );
        let mut params = Vec::with_capacity(filter.params().len() + 1);
        params.push(Value::Integer(current_epoch_ms()));
        params.extend_from_slice(filter.params());
        let changed = self
            .exec
            .execute(&sql, &params)
            .map_err(|err| err.into_write(E::TABLE))?;
        debug!(
            "event=delete_by_condition module=store status=ok table={} changed={}",
            E::TABLE,
            changed
        );
        Ok(changed)
    }

    fn abandon_batch_savepoint(&self) {
        let statements = [
            ("ROLLBACK TO", "savepoint_rollback_failed"),
            ("RELEASE", "savepoint_release_failed"),
        ];
        for (statement, error_code) in statements {
            let sql = format!("{statement} {BATCH_SAVEPOINT}");
            if let Err(err) = self.exec.execute(&sql, &[]) {
                error!(
                    "event=batch_insert module=store status=error table={} error_code={} error={}",
                    E::TABLE,
                    error_code,
                    err
                );
            }
        }
    }

    fn count_filter(&self, filter: &Filter) -> RepoResult<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {}{}",
            E::TABLE,
            filter.where_sql(Access::Read)
        );
        let total = self.exec.query_scalar(&sql, filter.params())?;
        Ok(u64::try_from(total).unwrap_or(0))
    }

    fn fetch(
        &self,
        filter: &Filter,
        default_order: &str,
        window: Option<(u64, u64)>,
    ) -> RepoResult<Vec<E>> {
        let mut sql = format!(
            "{}{}{}",
            select_sql::<E>(),
            filter.where_sql(Access::Read),
            filter.order_sql(default_order)
        );
        let mut params = filter.params().to_vec();
        if let Some((limit, offset)) = window {
            sql.push_str(" LIMIT ? OFFSET ?");
            params.push(Value::Integer(to_sql_int(limit)));
            params.push(Value::Integer(to_sql_int(offset)));
        }
        self.exec.query_rows(&sql, &params, E::from_row)
    }

    fn insert_rows(&self, entities: &[E]) -> RepoResult<usize> {
        let row_placeholders = format!("({})", placeholders(E::COLUMNS.len()));
        let mut params = Vec::with_capacity(entities.len() * E::COLUMNS.len());
        for entity in entities {
            params.extend(checked_insert_values::<E>(entity)?);
        }
        let sql = format!(
            "INSERT INTO {} ({}) VALUES {}",
            E::TABLE,
            E::COLUMNS.join(", "),
            vec![row_placeholders.as_str(); entities.len()].join(", ")
        );
        let inserted = self
            .exec
            .execute(&sql, &params)
            .map_err(|err| err.into_write(E::TABLE))?;
        debug!(
            "event=batch_insert module=store status=ok table={} rows={}",
            E::TABLE,
            inserted
        );
        Ok(inserted)
    }
}

fn checked_insert_values<E: Entity>(entity: &E) -> RepoResult<Vec<Value>> {
    let values = entity.insert_values();
    if values.len() != E::COLUMNS.len() {
        return Err(RepoError::InvalidData(format!(
            "{} insert produced {} values for {} columns",
            E::TABLE,
            values.len(),
            E::COLUMNS.len()
        )));
    }
    Ok(values)
}

fn check_assignments(values: &FieldValues) -> RepoResult<()> {
    for (field, _) in values.iter() {
        check_identifier(field)?;
        if field == ID_COLUMN || is_reserved_column(field) {
            return Err(RepoError::Validation(format!(
                "`{field}` cannot be assigned through an update"
            )));
        }
    }
    Ok(())
}

fn render_assignments(values: &FieldValues) -> (String, Vec<Value>) {
    let mut assignments = Vec::with_capacity(values.len());
    let mut params = Vec::with_capacity(values.len());
    for (field, value) in values.iter() {
        assignments.push(format!("{field} = ?"));
        params.push(value.clone());
    }
    (assignments.join(", "), params)
}

fn constrained_filter<E: Entity>(cond: &Condition, operation: &str) -> RepoResult<Filter> {
    let filter = cond.build()?;
    if filter.is_unconstrained() {
        return Err(RepoError::Validation(format!(
            "{operation} on {} requires at least one constraint",
            E::TABLE
        )));
    }
    Ok(filter)
}

fn to_sql_int(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn ensure_entity_layout<E: Entity, X: Executor>(exec: &X) -> RepoResult<()> {
    let exists = exec.query_scalar(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?
        );",
        &[Value::Text(E::TABLE.to_string())],
    )?;
    if exists != 1 {
        return Err(RepoError::MissingRequiredTable(E::TABLE));
    }

    let present = exec.query_rows(
        &format!("PRAGMA table_info({});", E::TABLE),
        &[],
        |row| Ok(row.get::<_, String>(1)?),
    )?;
    let required = [ID_COLUMN, DELETED_COLUMN, DELETE_TIME_COLUMN];
    for &column in required.iter().chain(E::COLUMNS.iter()) {
        if !present.iter().any(|name| name == column) {
            return Err(RepoError::MissingRequiredColumn {
                table: E::TABLE,
                column,
            });
        }
    }
    Ok(())
}
