//! Generic entity access over the SQLite store.
//!
//! # Responsibility
//! - Run reads, paged reads and writes for any [`Entity`] through one
//!   [`EntityRepo`].
//! - Apply the soft-delete scope to reads and redirect deletes into flag
//!   updates.
//! - Run multi-step writes in one transaction via [`tx`].
//!
//! # Invariants
//! - Every statement goes through an explicit [`Executor`] handle.
//! - No path here issues a physical `DELETE`.

pub mod entity;
pub mod entity_repo;
pub mod error;
pub mod executor;
pub mod soft_delete;
pub mod tx;

pub use entity::{Entity, EntityId};
pub use entity_repo::EntityRepo;
pub use error::{RepoError, RepoResult};
pub use executor::Executor;
pub use tx::{step, tx, TxStep};
