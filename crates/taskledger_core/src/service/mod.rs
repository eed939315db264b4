//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into ledger-level operations.
//! - Keep UI/FFI/CLI layers decoupled from storage details.

pub mod ledger_service;
