//! List-query building blocks.
//!
//! # Responsibility
//! - Describe paging/sorting requests and validate them before any query.
//! - Derive pagination metadata from a total match count.
//! - Turn free-text filter input into safe FTS5 match expressions.
//!
//! # Invariants
//! - Sort keys reach SQL only through the static column allow-list.
//! - User text reaches FTS5 only as quoted phrases.

pub mod filters;
pub mod fts;
pub mod metadata;
