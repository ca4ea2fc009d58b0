//! Fluent condition builder.
//!
//! # Responsibility
//! - Accumulate `field = value` and `field IN (...)` constraints.
//! - Track the soft-delete scope requested by the caller.
//! - Render a [`Filter`]: a WHERE fragment plus positional parameters.
//!
//! # Invariants
//! - Constraints always combine with AND.
//! - Rendering orders constraints by field name and bound value, so call
//!   order never changes the statement text or its parameters.
//! - Field and order terms must be plain identifiers; reserved soft-delete
//!   columns are rejected.

use crate::query::fields::{FieldModel, IntoValue};
use crate::store::error::{RepoError, RepoResult};
use crate::store::soft_delete::{is_reserved_column, UNDELETED_CLAUSE};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::types::Value;

static IDENTIFIER_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier regex")
});
static ORDER_TERM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)(?:\s+((?i:asc|desc)))?$").expect("valid order term regex")
});

#[derive(Debug, Clone, PartialEq)]
enum Constraint {
    Eq { field: String, value: Value },
    In { field: String, values: Vec<Value> },
}

impl Constraint {
    fn field(&self) -> &str {
        match self {
            Self::Eq { field, .. } | Self::In { field, .. } => field,
        }
    }

    /// Total order over constraints: field, then kind, then bound values.
    fn sort_key(&self) -> (String, u8, String) {
        match self {
            Self::Eq { field, value } => (field.clone(), 0, format!("{value:?}")),
            Self::In { field, values } => (field.clone(), 1, format!("{values:?}")),
        }
    }
}

/// Soft-delete visibility requested for a condition.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum Scope {
    /// Reads hide deleted rows, writes are unfiltered.
    #[default]
    Auto,
    /// Reads and writes hide deleted rows.
    Undeleted,
    /// Nothing is hidden.
    WithDeleted,
}

/// Whether a filter is about to drive a read or a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Read,
    Write,
}

/// Accumulated conjunctive constraints.
///
/// ```
/// use entityx_core::Condition;
///
/// let cond = Condition::new()
///     .eq("status", 1_i64)
///     .is_in("code", ["admin", "ops"])
///     .order_by("name desc");
/// assert_eq!(cond.constraint_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Condition {
    constraints: Vec<Constraint>,
    scope: Scope,
    order: Vec<String>,
}

impl Condition {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `field = value`. A null value renders as `field IS NULL`.
    pub fn eq(mut self, field: &str, value: impl IntoValue) -> Self {
        self.constraints.push(Constraint::Eq {
            field: field.to_string(),
            value: value.into_value(),
        });
        self
    }

    /// Adds `field IN (values...)`. An empty set matches no row.
    pub fn is_in<I, V>(mut self, field: &str, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: IntoValue,
    {
        self.constraints.push(Constraint::In {
            field: field.to_string(),
            values: values.into_iter().map(IntoValue::into_value).collect(),
        });
        self
    }

    /// Adds one equality constraint per populated field of `model`.
    pub fn with_cond_model(mut self, model: &impl FieldModel) -> Self {
        for (field, value) in model.field_values().iter() {
            self.constraints.push(Constraint::Eq {
                field: field.to_string(),
                value: value.clone(),
            });
        }
        self
    }

    /// Hides deleted rows on every path, writes included.
    pub fn undeleted(mut self) -> Self {
        self.scope = Scope::Undeleted;
        self
    }

    /// Opts out of the soft-delete scope entirely.
    pub fn with_deleted(mut self) -> Self {
        self.scope = Scope::WithDeleted;
        self
    }

    /// Appends an order term such as `"name"` or `"id desc"`.
    pub fn order_by(mut self, term: &str) -> Self {
        self.order.push(term.to_string());
        self
    }

    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Validates the accumulated state and renders it.
    pub fn build(&self) -> RepoResult<Filter> {
        let mut constraints = self.constraints.clone();
        constraints.sort_by_cached_key(Constraint::sort_key);

        let mut clauses = Vec::with_capacity(constraints.len());
        let mut params = Vec::new();
        for constraint in constraints {
            check_filter_field(constraint.field())?;
            match constraint {
                Constraint::Eq { field, value } if value == Value::Null => {
                    clauses.push(format!("{field} IS NULL"));
                }
                Constraint::Eq { field, value } => {
                    clauses.push(format!("{field} = ?"));
                    params.push(value);
                }
                Constraint::In { values, .. } if values.is_empty() => {
                    clauses.push("1 = 0".to_string());
                }
                Constraint::In { field, values } => {
                    clauses.push(format!("{field} IN ({})", placeholders(values.len())));
                    params.extend(values);
                }
            }
        }

        let order = self
            .order
            .iter()
            .map(|term| render_order_term(term))
            .collect::<RepoResult<Vec<_>>>()?;

        Ok(Filter {
            clauses,
            params,
            scope: self.scope,
            order,
        })
    }
}

/// Rendered condition, ready to be embedded in a statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    clauses: Vec<String>,
    params: Vec<Value>,
    scope: Scope,
    order: Vec<String>,
}

impl Filter {
    /// Returns ` WHERE ...` (or an empty string) for the given access kind.
    pub fn where_sql(&self, access: Access) -> String {
        let mut clauses: Vec<&str> = Vec::with_capacity(self.clauses.len() + 1);
        let scoped = match self.scope {
            Scope::Auto => access == Access::Read,
            Scope::Undeleted => true,
            Scope::WithDeleted => false,
        };
        if scoped {
            clauses.push(UNDELETED_CLAUSE);
        }
        clauses.extend(self.clauses.iter().map(String::as_str));

        if clauses.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", clauses.join(" AND "))
        }
    }

    /// Returns ` ORDER BY ...`, falling back to `default_order`.
    pub fn order_sql(&self, default_order: &str) -> String {
        if self.order.is_empty() {
            format!(" ORDER BY {default_order}")
        } else {
            format!(" ORDER BY {}", self.order.join(", "))
        }
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// True when no caller constraint was given (scope aside).
    pub fn is_unconstrained(&self) -> bool {
        self.clauses.is_empty()
    }
}

pub(crate) fn check_identifier(field: &str) -> RepoResult<()> {
    if IDENTIFIER_RE.is_match(field) {
        Ok(())
    } else {
        Err(RepoError::Validation(format!(
            "`{field}` is not a valid field name"
        )))
    }
}

fn check_filter_field(field: &str) -> RepoResult<()> {
    check_identifier(field)?;
    if is_reserved_column(field) {
        return Err(RepoError::Validation(format!(
            "`{field}` is managed by the soft-delete scope and cannot be filtered directly"
        )));
    }
    Ok(())
}

fn render_order_term(term: &str) -> RepoResult<String> {
    let captures = ORDER_TERM_RE
        .captures(term.trim())
        .ok_or_else(|| RepoError::Validation(format!("`{term}` is not a valid order term")))?;
    let field = &captures[1];
    Ok(match captures.get(2) {
        Some(direction) => format!("{field} {}", direction.as_str().to_ascii_uppercase()),
        None => field.to_string(),
    })
}

pub(crate) fn placeholders(count: usize) -> String {
    vec!["?"; count].join(", ")
}

#[cfg(test)]
mod tests {
    use super::{placeholders, Access, Condition, IDENTIFIER_RE, ORDER_TERM_RE};
    use once_cell::sync::Lazy;
    use crate::store::error::RepoError;
    use rusqlite::types::Value;

    #[test]
    fn constraints_are_conjunctive_and_order_independent() {
        let left = Condition::new()
            .eq("status", "active")
            .eq("owner", "bob")
            .build()
            .unwrap();
        let right = Condition::new()
            .eq("owner", "bob")
            .eq("status", "active")
            .build()
            .unwrap();

        assert_eq!(left, right);
        assert_eq!(
            left.where_sql(Access::Write),
            " WHERE owner = ? AND status = ?"
        );
    }

    #[test]
    fn repeated_field_renders_the_same_in_any_order() {
        let left = Condition::new()
            .eq("status", 1_i64)
            .is_in("status", [3_i64, 4])
            .eq("status", 2_i64)
            .build()
            .unwrap();
        let right = Condition::new()
            .eq("status", 2_i64)
            .eq("status", 1_i64)
            .is_in("status", [3_i64, 4])
            .build()
            .unwrap();

        assert_eq!(left, right);
        assert_eq!(
            left.params(),
            &[
                Value::Integer(1),
                Value::Integer(2),
                Value::Integer(3),
                Value::Integer(4)
            ]
        );
    }

    #[test]
    fn static_patterns_compile() {
        assert!(Lazy::force(&IDENTIFIER_RE).is_match("create_time"));
        assert!(Lazy::force(&ORDER_TERM_RE).is_match("name desc"));
    }

    #[test]
    fn read_access_adds_undeleted_scope_by_default() {
        let filter = Condition::new().eq("id", 3_i64).build().unwrap();
        assert_eq!(
            filter.where_sql(Access::Read),
            " WHERE is_deleted = 0 AND id = ?"
        );
        assert_eq!(filter.where_sql(Access::Write), " WHERE id = ?");
    }

    #[test]
    fn explicit_scopes_override_access_defaults() {
        let hidden = Condition::new().undeleted().build().unwrap();
        assert_eq!(hidden.where_sql(Access::Write), " WHERE is_deleted = 0");

        let visible = Condition::new().with_deleted().build().unwrap();
        assert_eq!(visible.where_sql(Access::Read), "");
    }

    #[test]
    fn null_and_empty_set_render_without_params() {
        let filter = Condition::new()
            .eq("remark", None::<String>)
            .is_in("id", Vec::<i64>::new())
            .build()
            .unwrap();
        assert_eq!(
            filter.where_sql(Access::Write),
            " WHERE 1 = 0 AND remark IS NULL"
        );
        assert!(filter.params().is_empty());
    }

    #[test]
    fn in_binds_every_value() {
        let filter = Condition::new().is_in("id", [1_i64, 2, 3]).build().unwrap();
        assert_eq!(filter.where_sql(Access::Write), " WHERE id IN (?, ?, ?)");
        assert_eq!(filter.params()[2], Value::Integer(3));
    }

    #[test]
    fn reserved_and_malformed_fields_are_rejected() {
        let err = Condition::new().eq("is_deleted", 1_i64).build().unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));

        let err = Condition::new()
            .eq("name; DROP TABLE roles", 1_i64)
            .build()
            .unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn order_terms_are_normalized() {
        let filter = Condition::new()
            .order_by("name desc")
            .order_by("id")
            .build()
            .unwrap();
        assert_eq!(filter.order_sql("id ASC"), " ORDER BY name DESC, id");

        let err = Condition::new().order_by("name; --").build().unwrap_err();
        assert!(matches!(err, RepoError::Validation(_)));
    }

    #[test]
    fn placeholders_render_comma_separated() {
        assert_eq!(placeholders(3), "?, ?, ?");
    }
}
