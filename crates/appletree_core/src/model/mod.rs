//! Domain model for school records.
//!
//! # Responsibility
//! - Define the canonical school record and its caller-facing inputs.
//!
//! # Invariants
//! - `id`, `created_at` and `version` are owned by the store.
//! - Deletion is a hard delete; there is no tombstone state.

pub mod school;
