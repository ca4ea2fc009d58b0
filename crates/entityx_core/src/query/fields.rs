//! Field/value plumbing shared by condition models and patches.
//!
//! Two population styles exist on purpose:
//! - [`FieldValues::set_opt`] for explicit `Option` fields, where `None` means
//!   "leave alone" and `Some(default)` is a real value.
//! - [`FieldValues::set_non_default`] for whole entity structs, where a field
//!   holding its type default is treated as absent. An empty string can't be
//!   written this way; use an explicit patch or `EntityRepo::updates`.

use crate::store::entity::EntityId;
use rusqlite::types::Value;

/// Conversion into a bound SQL parameter.
pub trait IntoValue {
    fn into_value(self) -> Value;
}

impl IntoValue for Value {
    fn into_value(self) -> Value {
        self
    }
}

impl IntoValue for &str {
    fn into_value(self) -> Value {
        Value::Text(self.to_string())
    }
}

impl IntoValue for String {
    fn into_value(self) -> Value {
        Value::Text(self)
    }
}

impl IntoValue for &String {
    fn into_value(self) -> Value {
        Value::Text(self.clone())
    }
}

impl IntoValue for i64 {
    fn into_value(self) -> Value {
        Value::Integer(self)
    }
}

impl IntoValue for i32 {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for u32 {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for bool {
    fn into_value(self) -> Value {
        Value::Integer(i64::from(self))
    }
}

impl IntoValue for f64 {
    fn into_value(self) -> Value {
        Value::Real(self)
    }
}

impl<T: IntoValue> IntoValue for Option<T> {
    fn into_value(self) -> Value {
        match self {
            Some(value) => value.into_value(),
            None => Value::Null,
        }
    }
}

/// Ordered field -> value map. Setting a field twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldValues {
    entries: Vec<(String, Value)>,
}

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `field` unconditionally, including to a default or null value.
    pub fn set(&mut self, field: &str, value: impl IntoValue) -> &mut Self {
        let value = value.into_value();
        match self.entries.iter_mut().find(|(name, _)| name == field) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((field.to_string(), value)),
        }
        self
    }

    /// Builder form of [`FieldValues::set`].
    pub fn with(mut self, field: &str, value: impl IntoValue) -> Self {
        self.set(field, value);
        self
    }

    /// Sets `field` only when `value` is `Some`.
    pub fn set_opt<T: IntoValue>(&mut self, field: &str, value: Option<T>) -> &mut Self {
        if let Some(value) = value {
            self.set(field, value);
        }
        self
    }

    /// Sets `field` only when `value` differs from `T::default()`.
    pub fn set_non_default<T>(&mut self, field: &str, value: T) -> &mut Self
    where
        T: IntoValue + Default + PartialEq,
    {
        if value != T::default() {
            self.set(field, value);
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(name, _)| name == field)
            .map(|(_, value)| value)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries
            .iter()
            .map(|(name, value)| (name.as_str(), value))
    }
}

/// A value whose populated fields act as equality filters (condition model).
pub trait FieldModel {
    fn field_values(&self) -> FieldValues;
}

/// A field model that also names the row it patches.
pub trait Patch: FieldModel {
    fn patch_id(&self) -> EntityId;
}

#[cfg(test)]
mod tests {
    use super::{FieldValues, IntoValue};
    use rusqlite::types::Value;

    #[test]
    fn set_replaces_existing_field() {
        let mut values = FieldValues::new();
        values.set("name", "a").set("name", "b");
        assert_eq!(values.len(), 1);
        assert_eq!(values.get("name"), Some(&Value::Text("b".to_string())));
    }

    #[test]
    fn set_non_default_skips_zero_values() {
        let mut values = FieldValues::new();
        values
            .set_non_default("name", String::new())
            .set_non_default("status", 0_i64)
            .set_non_default("code", "admin".to_string());
        assert_eq!(values.len(), 1);
        assert!(values.get("code").is_some());
    }

    #[test]
    fn set_opt_keeps_explicit_defaults() {
        let mut values = FieldValues::new();
        values
            .set_opt("name", Some(String::new()))
            .set_opt::<i64>("status", None);
        assert_eq!(values.get("name"), Some(&Value::Text(String::new())));
        assert!(values.get("status").is_none());
    }

    #[test]
    fn option_none_becomes_null() {
        assert_eq!(None::<i64>.into_value(), Value::Null);
        assert_eq!(true.into_value(), Value::Integer(1));
    }
}
