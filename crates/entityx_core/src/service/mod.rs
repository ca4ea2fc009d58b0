//! Use-case services over domain repositories.
//!
//! # Responsibility
//! - Compose multi-step writes into one transaction.
//! - Own application-level caches and keep them consistent with commits.

pub mod config_service;
pub mod role_service;
