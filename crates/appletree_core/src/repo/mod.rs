//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the school data-access contract.
//! - Isolate SQLite query details from service orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `EditConflict`,
//!   `Timeout`) in addition to store transport errors.
//! - Every store interaction runs under a deadline.
//! - The repository neither logs nor retries.

mod deadline;
pub mod school_repo;
