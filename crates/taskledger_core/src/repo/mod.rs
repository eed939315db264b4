//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the ledger data access contract (`TaskRepository`).
//! - Isolate SQLite query details from service orchestration.
//! - Provide an owned in-memory backing with identical semantics.
//!
//! # Invariants
//! - Every guarded mutation resolves through `resolve_mutation`, which runs
//!   the shared ownership guard before any write.
//! - Repository APIs return semantic errors (`NotFound`, `Unauthorized`) in
//!   addition to storage transport errors.

pub mod memory_repo;
mod schema;
pub mod task_repo;
