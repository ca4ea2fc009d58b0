//! Transaction runner.
//!
//! # Responsibility
//! - Run ordered write steps against one exclusive transaction.
//! - Roll back on the first step error or step panic; commit otherwise.
//!
//! # Invariants
//! - Steps run strictly in order, never concurrently.
//! - A step panic is contained and reported as `TransactionAborted`.
//! - Callers must defer cache invalidation until `tx` returns `Ok(())`.

use crate::logging::panic_payload_summary;
use crate::store::error::{RepoError, RepoResult};
use log::{debug, error, warn};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// One unit of work inside [`tx`].
pub type TxStep<'s> = Box<dyn FnOnce(&Transaction<'_>) -> RepoResult<()> + 's>;

/// Boxes a closure as a [`TxStep`].
pub fn step<'s, F>(f: F) -> TxStep<'s>
where
    F: FnOnce(&Transaction<'_>) -> RepoResult<()> + 's,
{
    Box::new(f)
}

/// Runs `steps` in order inside one immediate transaction.
///
/// # Errors
/// - `TransactionAborted { step, cause }` when step `step` returned an error
///   or panicked; every earlier step's writes are rolled back.
/// - `TransactionAborted { step: steps.len(), .. }` when commit failed.
/// - `Db` when the transaction cannot be opened (e.g. one is already open).
pub fn tx(conn: &Connection, steps: Vec<TxStep<'_>>) -> RepoResult<()> {
    let started_at = Instant::now();
    let step_count = steps.len();
    let transaction = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;
    debug!("event=tx module=tx status=start steps={step_count}");

    for (index, run_step) in steps.into_iter().enumerate() {
        let cause = match panic::catch_unwind(AssertUnwindSafe(|| run_step(&transaction))) {
            Ok(Ok(())) => continue,
            Ok(Err(err)) => err,
            Err(payload) => RepoError::StepPanicked(panic_payload_summary(payload.as_ref())),
        };

        if let Err(rollback_err) = transaction.rollback() {
            error!(
                "event=tx module=tx status=error step={} error_code=rollback_failed error={}",
                index, rollback_err
            );
        }
        warn!(
            "event=tx module=tx status=rollback step={} steps={} duration_ms={} error={}",
            index,
            step_count,
            started_at.elapsed().as_millis(),
            cause
        );
        return Err(RepoError::TransactionAborted {
            step: index,
            cause: Box::new(cause),
        });
    }

    if let Err(err) = transaction.commit() {
        error!(
            "event=tx module=tx status=error steps={} error_code=commit_failed error={}",
            step_count, err
        );
        return Err(RepoError::TransactionAborted {
            step: step_count,
            cause: Box::new(err.into()),
        });
    }

    debug!(
        "event=tx module=tx status=ok steps={} duration_ms={}",
        step_count,
        started_at.elapsed().as_millis()
    );
    Ok(())
}
