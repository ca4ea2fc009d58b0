//! Domain repositories built on the generic entity layer.
//!
//! # Responsibility
//! - Expose use-case shaped data access for roles, resources, configs and logs.
//! - Keep every SQL detail inside `EntityRepo`.
//!
//! # Invariants
//! - Repositories are constructed from an explicit connection or transaction.
//! - Construction verifies the table layout (`try_new`).

pub mod config_repo;
pub mod resource_repo;
pub mod role_repo;
pub mod syslog_repo;
