//! Condition building and paging primitives.
//!
//! # Responsibility
//! - Accumulate conjunctive equality/set constraints over named fields.
//! - Derive constraints and patches from explicit field models.
//! - Describe page requests and page results.
//!
//! # Invariants
//! - Building is pure: the same accumulated state renders the same filter.
//! - Reserved soft-delete columns never enter a filter or a patch.

pub mod condition;
pub mod fields;
pub mod page;

pub use condition::{Access, Condition, Filter};
pub use fields::{FieldModel, FieldValues, IntoValue, Patch};
pub use page::{PageParam, PageResult};
