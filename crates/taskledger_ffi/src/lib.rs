//! UI-facing bindings for the task ledger.

pub mod api;
