use bibrec_common::{
    DepartmentId, PersonId, VersionId,
    authorship::{Authorship, NewAuthorship},
};
use chrono::{DateTime, Utc};

use crate::domain::{error::ServiceError, messages::Message, repository::Repository};

/// A person to link as author, with the departments to affiliate them with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInput {
    pub id: PersonId,
    pub departments: Vec<DepartmentId>,
}

/// Review state carried over to a new authorship row
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ReviewState {
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_publication_version_id: Option<VersionId>,
}

impl From<&Authorship> for ReviewState {
    fn from(value: &Authorship) -> Self {
        Self {
            reviewed_at: value.reviewed_at,
            reviewed_publication_version_id: value.reviewed_publication_version_id,
        }
    }
}

/// Links a person to a publication version at `position`, with one department
/// link per department in the given order (positions 1, 2, ...).
///
/// The person is flagged as affiliated as soon as one department is linked.
pub async fn attach_author<R: Repository>(
    repository: &R,
    version_id: VersionId,
    author: &AuthorInput,
    position: i32,
    review: ReviewState,
) -> Result<Authorship, ServiceError> {
    if repository.find_person(author.id).await?.is_none() {
        return Err(ServiceError::not_found(Message::PersonNotFound, author.id));
    }

    let authorship = repository
        .create_authorship(NewAuthorship {
            person_id: author.id,
            publication_version_id: version_id,
            position,
            reviewed_at: review.reviewed_at,
            reviewed_publication_version_id: review.reviewed_publication_version_id,
        })
        .await?;

    for (index, department_id) in author.departments.iter().enumerate() {
        repository
            .create_department_link(authorship.id, *department_id, index as i32 + 1)
            .await?;
    }

    if !author.departments.is_empty() {
        repository.mark_affiliated(author.id).await?;
    }

    tracing::debug!(
        "Person {} linked to version {} at position {} with {} departments",
        author.id,
        version_id,
        position,
        author.departments.len()
    );

    Ok(authorship)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RepositoryError;
    use crate::infrastructure::persistence::memory::InMemoryRepository;

    #[tokio::test]
    async fn departments_get_positions_and_person_becomes_affiliated() {
        let repository = InMemoryRepository::new();
        let person = repository.add_person("Anna", "Svensson");
        let d1 = repository.add_department("Fysik", "Physics");
        let d2 = repository.add_department("Kemi", "Chemistry");
        let record = repository.add_publication("Ocean acidification", "editor", true);

        let author = AuthorInput {
            id: person,
            departments: vec![d1, d2],
        };
        let authorship = attach_author(&repository, record.version.id, &author, 1, ReviewState::default())
            .await
            .unwrap();

        let links = repository.department_links_in_creation_order(authorship.id);
        assert_eq!(
            links.iter().map(|l| (l.department_id, l.position)).collect::<Vec<_>>(),
            vec![(d1, 1), (d2, 2)]
        );
        let person = repository.find_person(person).await.unwrap().unwrap();
        assert!(person.affiliated);
        assert_eq!(authorship.position, 1);
    }

    #[tokio::test]
    async fn unknown_department_is_rejected_by_the_store() {
        let repository = InMemoryRepository::new();
        let person = repository.add_person("Anna", "Svensson");
        let record = repository.add_publication("Ocean acidification", "editor", true);

        let author = AuthorInput {
            id: person,
            departments: vec![DepartmentId(999)],
        };
        let err = attach_author(&repository, record.version.id, &author, 1, ReviewState::default())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::ValidationFailed(_))
        ));
    }

    #[tokio::test]
    async fn no_departments_no_affiliation() {
        let repository = InMemoryRepository::new();
        let person = repository.add_person("Per", "Berg");
        let record = repository.add_publication("Title", "editor", true);

        let author = AuthorInput {
            id: person,
            departments: Vec::new(),
        };
        attach_author(&repository, record.version.id, &author, 2, ReviewState::default())
            .await
            .unwrap();

        let person = repository.find_person(person).await.unwrap().unwrap();
        assert!(!person.affiliated);
    }

    #[tokio::test]
    async fn unknown_person_and_duplicate_authorship() {
        let repository = InMemoryRepository::new();
        let record = repository.add_publication("Title", "editor", true);

        let missing = AuthorInput {
            id: PersonId(404),
            departments: Vec::new(),
        };
        let err = attach_author(&repository, record.version.id, &missing, 1, ReviewState::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Object { message: Message::PersonNotFound, .. }));

        let person = repository.add_person("Per", "Berg");
        let author = AuthorInput {
            id: person,
            departments: Vec::new(),
        };
        attach_author(&repository, record.version.id, &author, 1, ReviewState::default())
            .await
            .unwrap();
        let err = attach_author(&repository, record.version.id, &author, 2, ReviewState::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Repository(RepositoryError::UniqueViolation(_))
        ));
    }
}
