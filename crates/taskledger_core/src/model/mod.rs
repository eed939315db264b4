//! Task ledger domain model.
//!
//! # Responsibility
//! - Define canonical task records and account identities used by core logic.
//! - Keep field validation next to the data it protects.
//!
//! # Invariants
//! - Every task is identified by a positive, never-reused `TaskId`.
//! - Every task has exactly one immutable owning `AccountId`.

pub mod account;
pub mod task;
