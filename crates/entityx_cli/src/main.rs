//! CLI smoke entry point.
//!
//! # Responsibility
//! - Open a store from `ENTITYX_*` settings and run one insert/page/delete
//!   cycle through the entity layer.
//! - Keep output deterministic for quick local sanity checks.

use entityx_core::db::open_db_with_config;
use entityx_core::{
    init_logging_from_config, CoreConfig, PageParam, Role, RoleQuery, RoleRepository,
    RoleService, SqliteRoleRepository,
};
use log::warn;
use std::error::Error;

fn main() -> Result<(), Box<dyn Error>> {
    let config = CoreConfig::from_env()?;
    if let Err(err) = init_logging_from_config(&config) {
        eprintln!("logging disabled: {err}");
    }

    println!("entityx_core version={}", entityx_core::core_version());

    let conn = open_db_with_config(&config)?;
    let repo = SqliteRoleRepository::try_new(&conn)?;
    let service = RoleService::new(&conn);

    let mut admin = Role::new("Administrator", format!("smoke_admin_{}", std::process::id()));
    let admin_id = repo.insert_role(&mut admin)?;
    let page = PageParam::new(1, config.page_size);
    let before = service.page_roles(&RoleQuery::default(), &page)?;
    println!("roles total_before_delete={}", before.total);

    service.delete_role(admin_id)?;
    let after = service.page_roles(&RoleQuery::default(), &page)?;
    println!("roles total_after_delete={}", after.total);

    if after.total >= before.total {
        warn!("event=cli_smoke module=cli status=error reason=delete_not_visible");
        return Err("soft delete did not hide the role".into());
    }
    Ok(())
}
