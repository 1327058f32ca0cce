//! Core domain logic for the AppleTree school directory.
//! This crate is the single source of truth for school record invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod query;
pub mod repo;
pub mod service;
pub mod validator;

pub use db::{open_db, open_db_in_memory, open_db_with, DbConfig, DbError};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::school::{NewSchool, School, SchoolId, SchoolPatch};
pub use query::filters::{Filters, SortColumn, SortDirection, SCHOOL_SORT_SAFELIST};
pub use query::metadata::Metadata;
pub use repo::school_repo::{
    RepoError, RepoResult, SchoolListQuery, SchoolRepository, SqliteSchoolRepository,
    DEFAULT_QUERY_TIMEOUT,
};
pub use service::school_service::{SchoolService, SchoolsPage, ServiceError, ServiceResult};
pub use validator::{ValidationError, Validator};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
