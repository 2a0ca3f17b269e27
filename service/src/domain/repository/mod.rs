use std::future::Future;

use bibrec_common::{
    AuthorshipId, DepartmentId, PersonId, PublicationId, VersionId,
    authorship::{Authorship, DepartmentLink, NewAuthorship},
    people::{Department, Person},
    publication::{NewPublication, NewVersion, Publication, PublicationVersion},
};
use chrono::{DateTime, Utc};

use crate::domain::publications::PublicationRecord;

/// Persistence port of the bibliographic records.
///
/// Every publication read ignores tombstoned (soft-deleted) publications.
pub trait Repository: Clone + Send + Sync + 'static {
    /// Find a publication that is not deleted
    fn find_publication(
        &self,
        id: PublicationId,
    ) -> impl Future<Output = Result<Option<Publication>, RepositoryError>> + Send;

    /// Find a version of the given publication, with its identifiers
    fn find_version(
        &self,
        publication_id: PublicationId,
        version_id: VersionId,
    ) -> impl Future<Output = Result<Option<PublicationVersion>, RepositoryError>> + Send;

    /// Create publications with their initial versions and identifiers.
    /// Either every publication is created or none is.
    fn create_publications(
        &self,
        publications: Vec<NewPublication>,
    ) -> impl Future<Output = Result<Vec<PublicationRecord>, RepositoryError>> + Send;

    /// Create a version that becomes the current version of the publication
    fn create_version(
        &self,
        publication_id: PublicationId,
        version: NewVersion,
    ) -> impl Future<Output = Result<PublicationVersion, RepositoryError>> + Send;

    fn set_published(
        &self,
        id: PublicationId,
        published_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<Publication, RepositoryError>> + Send;

    /// Set the tombstone, returns false when nothing was updated
    fn mark_deleted(
        &self,
        id: PublicationId,
        deleted_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<bool, RepositoryError>> + Send;

    fn find_person(
        &self,
        id: PersonId,
    ) -> impl Future<Output = Result<Option<Person>, RepositoryError>> + Send;

    fn mark_affiliated(
        &self,
        id: PersonId,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// Departments with the given ids, ordered by id
    fn find_departments(
        &self,
        ids: &[DepartmentId],
    ) -> impl Future<Output = Result<Vec<Department>, RepositoryError>> + Send;

    /// Fails with `UniqueViolation` when the person already has a row for the version
    fn create_authorship(
        &self,
        authorship: NewAuthorship,
    ) -> impl Future<Output = Result<Authorship, RepositoryError>> + Send;

    fn create_department_link(
        &self,
        authorship_id: AuthorshipId,
        department_id: DepartmentId,
        position: i32,
    ) -> impl Future<Output = Result<DepartmentLink, RepositoryError>> + Send;

    fn find_authorship(
        &self,
        person_id: PersonId,
        version_id: VersionId,
    ) -> impl Future<Output = Result<Option<Authorship>, RepositoryError>> + Send;

    /// Authorships of a version ordered by position
    fn find_authorships(
        &self,
        version_id: VersionId,
    ) -> impl Future<Output = Result<Vec<Authorship>, RepositoryError>> + Send;

    /// Department links of an authorship, most recently updated first
    fn find_department_links(
        &self,
        authorship_id: AuthorshipId,
    ) -> impl Future<Output = Result<Vec<DepartmentLink>, RepositoryError>> + Send;

    fn mark_reviewed(
        &self,
        authorship_id: AuthorshipId,
        reviewed_at: DateTime<Utc>,
        reviewed_version_id: VersionId,
    ) -> impl Future<Output = Result<Authorship, RepositoryError>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("not found")]
    NotFound,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("unique violation: {0}")]
    UniqueViolation(String),
    #[error("database error: {0}")]
    DatabaseError(String),
}
