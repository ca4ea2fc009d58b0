//! Generic entity access over SQLite.
//!
//! A condition builder, soft-delete scope, paged queries, partial updates,
//! batch inserts and a panic-safe transaction runner, consumed by the domain
//! repositories for roles, resources, configs and operation logs.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod store;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, init_logging_from_config, logging_status};
pub use model::config::{Config, ConfigQuery};
pub use model::resource::Resource;
pub use model::role::{Role, RolePatch, RoleQuery, RoleResource};
pub use model::syslog::{LogKind, SysLog, SysLogQuery};
pub use query::{
    Access, Condition, FieldModel, FieldValues, Filter, IntoValue, PageParam, PageResult, Patch,
};
pub use repo::config_repo::{ConfigRepository, SqliteConfigRepository};
pub use repo::resource_repo::{ResourceRepository, SqliteResourceRepository};
pub use repo::role_repo::{RoleRepository, SqliteRoleRepository};
pub use repo::syslog_repo::{SqliteSyslogRepository, SyslogRepository};
pub use service::config_service::ConfigService;
pub use service::role_service::RoleService;
pub use store::{
    step, tx, Entity, EntityId, EntityRepo, Executor, RepoError, RepoResult, TxStep,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
