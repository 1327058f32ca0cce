//! School use-case service.
//!
//! # Responsibility
//! - Provide create/get/update/delete/list entry points for boundary callers.
//! - Validate records and list filters before they reach the repository.
//! - Apply partial updates on top of the latest stored record.
//!
//! # Invariants
//! - Invalid input never reaches the store.
//! - No automatic retry on `EditConflict`; the caller re-reads and retries.

use crate::model::school::{validate_school, NewSchool, School, SchoolId, SchoolPatch};
use crate::query::filters::validate_filters;
use crate::query::metadata::Metadata;
use crate::repo::school_repo::{RepoError, SchoolListQuery, SchoolRepository};
use crate::validator::{ValidationError, Validator};
use log::{debug, info, warn};
use thiserror::Error;

/// Error surface callers branch on.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("school not found: {0}")]
    NotFound(SchoolId),
    #[error("unable to update school {0} due to an edit conflict, please try again")]
    EditConflict(SchoolId),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::EditConflict(id) => Self::EditConflict(id),
            other => Self::Repo(other),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;

/// List result envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchoolsPage {
    pub schools: Vec<School>,
    pub metadata: Metadata,
}

/// School service facade over repository implementations.
pub struct SchoolService<R: SchoolRepository> {
    repo: R,
}

impl<R: SchoolRepository> SchoolService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates and persists a new school.
    pub fn create_school(&self, input: NewSchool) -> ServiceResult<School> {
        let mut school = School::from(input);
        check_school(&school)?;

        self.repo.insert(&mut school).inspect_err(|err| {
            warn!("event=school_create module=service status=error error={err}");
        })?;
        info!(
            "event=school_create module=service status=ok school_id={}",
            school.id
        );
        Ok(school)
    }

    pub fn get_school(&self, id: SchoolId) -> ServiceResult<School> {
        Ok(self.repo.get(id)?)
    }

    /// Applies `patch` to the current record and saves it. An empty patch
    /// returns the stored record without writing.
    ///
    /// When `expected_version` is given and differs from the stored version,
    /// fails with `EditConflict` before touching the record.
    pub fn update_school(
        &self,
        id: SchoolId,
        patch: SchoolPatch,
        expected_version: Option<i32>,
    ) -> ServiceResult<School> {
        let mut school = self.repo.get(id)?;

        if let Some(expected) = expected_version {
            if expected != school.version {
                info!(
                    "event=school_update module=service status=conflict school_id={id} expected_version={expected} stored_version={}",
                    school.version
                );
                return Err(ServiceError::EditConflict(id));
            }
        }

        if patch.is_empty() {
            return Ok(school);
        }

        school.apply(patch);
        check_school(&school)?;

        match self.repo.update(&mut school) {
            Ok(()) => {
                info!(
                    "event=school_update module=service status=ok school_id={id} version={}",
                    school.version
                );
                Ok(school)
            }
            Err(RepoError::EditConflict(_)) => {
                info!("event=school_update module=service status=conflict school_id={id}");
                Err(ServiceError::EditConflict(id))
            }
            Err(err) => {
                warn!("event=school_update module=service status=error school_id={id} error={err}");
                Err(err.into())
            }
        }
    }

    pub fn delete_school(&self, id: SchoolId) -> ServiceResult<()> {
        self.repo.delete(id)?;
        info!("event=school_delete module=service status=ok school_id={id}");
        Ok(())
    }

    /// Validates paging/sort parameters, then runs the filtered list query.
    pub fn list_schools(&self, query: &SchoolListQuery) -> ServiceResult<SchoolsPage> {
        let mut v = Validator::new();
        validate_filters(&mut v, &query.filters);
        v.into_result()?;

        let (schools, metadata) = self.repo.get_all(query)?;
        debug!(
            "event=school_list module=service status=ok returned={} total_records={}",
            schools.len(),
            metadata.total_records
        );
        Ok(SchoolsPage { schools, metadata })
    }
}

fn check_school(school: &School) -> Result<(), ValidationError> {
    let mut v = Validator::new();
    validate_school(&mut v, school);
    v.into_result().inspect_err(|err| {
        debug!(
            "event=school_validate module=service status=rejected fields={}",
            err.errors.keys().cloned().collect::<Vec<_>>().join(",")
        );
    })
}

#[cfg(test)]
mod tests {
    use super::ServiceError;
    use crate::repo::school_repo::RepoError;
    use std::time::Duration;

    #[test]
    fn repo_not_found_and_conflict_map_to_service_variants() {
        assert!(matches!(
            ServiceError::from(RepoError::NotFound(7)),
            ServiceError::NotFound(7)
        ));
        assert!(matches!(
            ServiceError::from(RepoError::EditConflict(3)),
            ServiceError::EditConflict(3)
        ));
    }

    #[test]
    fn other_repo_errors_pass_through() {
        let err = ServiceError::from(RepoError::Timeout(Duration::from_secs(3)));
        assert!(matches!(err, ServiceError::Repo(RepoError::Timeout(_))));
        assert!(err.to_string().contains("deadline"));
    }
}
