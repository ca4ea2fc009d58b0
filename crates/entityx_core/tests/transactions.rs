use entityx_core::db::open_db_in_memory;
use entityx_core::{step, tx, Condition, EntityRepo, RepoError, Role, RolePatch, TxStep};
use rusqlite::Connection;
use std::cell::RefCell;

fn role_count(conn: &Connection) -> u64 {
    EntityRepo::<Role>::new(conn)
        .count(&Condition::new().with_deleted())
        .unwrap()
}

fn insert_step<'s>(name: &'s str) -> TxStep<'s> {
    step(move |txn| {
        EntityRepo::<Role, _>::new(txn)
            .insert(&mut Role::new(name, name))
            .map(|_| ())
    })
}

#[test]
fn all_steps_commit_together() {
    let conn = open_db_in_memory().unwrap();

    tx(&conn, vec![insert_step("alpha"), insert_step("beta")]).unwrap();

    assert_eq!(role_count(&conn), 2);
}

#[test]
fn failing_step_rolls_back_earlier_steps() {
    let conn = open_db_in_memory().unwrap();

    let err = tx(
        &conn,
        vec![
            insert_step("alpha"),
            step(|_| Err(RepoError::Validation("rejected".to_string()))),
            insert_step("gamma"),
        ],
    )
    .unwrap_err();

    match err {
        RepoError::TransactionAborted { step, cause } => {
            assert_eq!(step, 1);
            assert!(matches!(*cause, RepoError::Validation(ref msg) if msg == "rejected"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(role_count(&conn), 0);
}

#[test]
fn store_rejection_inside_step_rolls_back() {
    let conn = open_db_in_memory().unwrap();

    let err = tx(&conn, vec![insert_step("same"), insert_step("same")]).unwrap_err();

    match err {
        RepoError::TransactionAborted { step, cause } => {
            assert_eq!(step, 1);
            assert!(matches!(*cause, RepoError::Write { table: "roles", .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(role_count(&conn), 0);
}

#[test]
fn panicking_step_is_contained_and_rolled_back() {
    let conn = open_db_in_memory().unwrap();

    let err = tx(
        &conn,
        vec![
            insert_step("alpha"),
            step(|_| panic!("step exploded")),
        ],
    )
    .unwrap_err();

    match err {
        RepoError::TransactionAborted { step, cause } => {
            assert_eq!(step, 1);
            assert!(
                matches!(*cause, RepoError::StepPanicked(ref msg) if msg.contains("step exploded"))
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(role_count(&conn), 0);

    // The connection stays usable after a contained panic.
    tx(&conn, vec![insert_step("after")]).unwrap();
    assert_eq!(role_count(&conn), 1);
}

#[test]
fn later_steps_observe_earlier_writes() {
    let conn = open_db_in_memory().unwrap();
    let inserted = RefCell::new(0_i64);

    tx(
        &conn,
        vec![
            step(|txn| {
                let id = EntityRepo::<Role, _>::new(txn).insert(&mut Role::new("draft", "draft"))?;
                *inserted.borrow_mut() = id;
                Ok(())
            }),
            step(|txn| {
                EntityRepo::<Role, _>::new(txn)
                    .update_by_id(&RolePatch {
                        id: *inserted.borrow(),
                        name: Some("final".to_string()),
                        ..RolePatch::default()
                    })
                    .map(|_| ())
            }),
        ],
    )
    .unwrap();

    let role = EntityRepo::<Role>::new(&conn)
        .get_by_id(*inserted.borrow())
        .unwrap();
    assert_eq!(role.name, "final");
}

#[test]
fn empty_step_list_commits_nothing() {
    let conn = open_db_in_memory().unwrap();

    tx(&conn, Vec::new()).unwrap();

    assert_eq!(role_count(&conn), 0);
}

#[test]
fn nested_transaction_is_refused_without_touching_outer_one() {
    let conn = open_db_in_memory().unwrap();
    conn.execute_batch("BEGIN;").unwrap();
    EntityRepo::<Role>::new(&conn)
        .insert(&mut Role::new("outer", "outer"))
        .unwrap();

    let err = tx(&conn, vec![insert_step("inner")]).unwrap_err();
    assert!(matches!(err, RepoError::Db(_)));

    conn.execute_batch("COMMIT;").unwrap();
    assert_eq!(role_count(&conn), 1);
}
