//! Repository kept in memory, used by the unit tests.

use std::sync::{Arc, Mutex, MutexGuard};

use bibrec_common::{
    AuthorshipId, DepartmentId, DepartmentLinkId, IdentifierId, PersonId, PublicationId,
    VersionId,
    authorship::{Authorship, DepartmentLink, NewAuthorship},
    identifiers::{NewIdentifier, PublicationIdentifier},
    people::{Department, Person},
    publication::{NewPublication, NewVersion, Publication, PublicationVersion, VersionContent},
};
use chrono::{DateTime, Utc};

use crate::domain::{
    publications::PublicationRecord,
    repository::{Repository, RepositoryError},
};

#[derive(Default)]
struct Tables {
    publications: Vec<Publication>,
    versions: Vec<PublicationVersion>,
    people: Vec<Person>,
    departments: Vec<Department>,
    authorships: Vec<Authorship>,
    department_links: Vec<DepartmentLink>,
    next_id: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn insert_version(
        &mut self,
        publication_id: PublicationId,
        content: VersionContent,
        identifiers: Vec<NewIdentifier>,
        username: String,
    ) -> PublicationVersion {
        let id = VersionId(self.next_id());
        let identifiers = identifiers
            .into_iter()
            .map(|identifier| PublicationIdentifier {
                id: IdentifierId(self.next_id()),
                publication_version_id: id,
                identifier_code: identifier.identifier_code,
                identifier_value: identifier.identifier_value,
            })
            .collect();
        let now = Utc::now();
        let version = PublicationVersion {
            id,
            publication_id,
            content,
            identifiers,
            created_at: now,
            created_by: Some(username.clone()),
            updated_at: now,
            updated_by: Some(username),
        };
        self.versions.push(version.clone());
        version
    }

    fn live_publication(&mut self, id: PublicationId) -> Option<&mut Publication> {
        self.publications
            .iter_mut()
            .find(|p| p.id == id && p.deleted_at.is_none())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryRepository {
    tables: Arc<Mutex<Tables>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap()
    }

    /// Publications that are not deleted
    pub fn publication_count(&self) -> usize {
        self.tables()
            .publications
            .iter()
            .filter(|p| p.deleted_at.is_none())
            .count()
    }

    pub fn add_person(&self, first_name: &str, last_name: &str) -> PersonId {
        let mut tables = self.tables();
        let id = PersonId(tables.next_id());
        tables.people.push(Person {
            id,
            first_name: Some(first_name.to_string()),
            last_name: last_name.to_string(),
            year_of_birth: None,
            affiliated: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        });
        id
    }

    pub fn add_department(&self, name_sv: &str, name_en: &str) -> DepartmentId {
        let mut tables = self.tables();
        let id = DepartmentId(tables.next_id());
        tables.departments.push(Department {
            id,
            name_sv: name_sv.to_string(),
            name_en: name_en.to_string(),
            start_year: None,
            end_year: None,
        });
        id
    }

    /// A publication with a single version holding only a title
    pub fn add_publication(&self, title: &str, username: &str, published: bool) -> PublicationRecord {
        let mut tables = self.tables();
        create(
            &mut tables,
            NewPublication {
                content: VersionContent {
                    title: title.to_string(),
                    ..Default::default()
                },
                identifiers: Vec::new(),
                published_at: published.then(Utc::now),
                created_by: username.to_string(),
            },
        )
    }

    pub fn department_links_in_creation_order(&self, authorship_id: AuthorshipId) -> Vec<DepartmentLink> {
        self.tables()
            .department_links
            .iter()
            .filter(|link| link.authorship_id == authorship_id)
            .cloned()
            .collect()
    }
}

fn create(tables: &mut Tables, new_publication: NewPublication) -> PublicationRecord {
    let id = PublicationId(tables.next_id());
    let version = tables.insert_version(
        id,
        new_publication.content,
        new_publication.identifiers,
        new_publication.created_by,
    );
    let now = Utc::now();
    let publication = Publication {
        id,
        published_at: new_publication.published_at,
        deleted_at: None,
        current_version_id: version.id,
        created_at: now,
        updated_at: now,
    };
    tables.publications.push(publication.clone());
    PublicationRecord {
        publication,
        version,
    }
}

impl Repository for InMemoryRepository {
    async fn find_publication(
        &self,
        id: PublicationId,
    ) -> Result<Option<Publication>, RepositoryError> {
        Ok(self.tables().live_publication(id).cloned())
    }

    async fn find_version(
        &self,
        publication_id: PublicationId,
        version_id: VersionId,
    ) -> Result<Option<PublicationVersion>, RepositoryError> {
        Ok(self
            .tables()
            .versions
            .iter()
            .find(|v| v.id == version_id && v.publication_id == publication_id)
            .cloned())
    }

    async fn create_publications(
        &self,
        publications: Vec<NewPublication>,
    ) -> Result<Vec<PublicationRecord>, RepositoryError> {
        let mut tables = self.tables();
        Ok(publications
            .into_iter()
            .map(|new_publication| create(&mut tables, new_publication))
            .collect())
    }

    async fn create_version(
        &self,
        publication_id: PublicationId,
        version: NewVersion,
    ) -> Result<PublicationVersion, RepositoryError> {
        let mut tables = self.tables();
        if tables.live_publication(publication_id).is_none() {
            return Err(RepositoryError::NotFound);
        }
        let version = tables.insert_version(
            publication_id,
            version.content,
            version.identifiers,
            version.updated_by,
        );
        let publication = tables
            .live_publication(publication_id)
            .ok_or(RepositoryError::NotFound)?;
        publication.current_version_id = version.id;
        publication.updated_at = Utc::now();
        Ok(version)
    }

    async fn set_published(
        &self,
        id: PublicationId,
        published_at: DateTime<Utc>,
    ) -> Result<Publication, RepositoryError> {
        let mut tables = self.tables();
        let publication = tables.live_publication(id).ok_or(RepositoryError::NotFound)?;
        publication.published_at = Some(published_at);
        Ok(publication.clone())
    }

    async fn mark_deleted(
        &self,
        id: PublicationId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let mut tables = self.tables();
        match tables.live_publication(id) {
            Some(publication) => {
                publication.deleted_at = Some(deleted_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn find_person(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        Ok(self.tables().people.iter().find(|p| p.id == id).cloned())
    }

    async fn mark_affiliated(&self, id: PersonId) -> Result<(), RepositoryError> {
        let mut tables = self.tables();
        let person = tables
            .people
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepositoryError::NotFound)?;
        person.affiliated = true;
        Ok(())
    }

    async fn find_departments(
        &self,
        ids: &[DepartmentId],
    ) -> Result<Vec<Department>, RepositoryError> {
        let mut departments = self
            .tables()
            .departments
            .iter()
            .filter(|d| ids.contains(&d.id))
            .cloned()
            .collect::<Vec<_>>();
        departments.sort_by_key(|d| d.id);
        Ok(departments)
    }

    async fn create_authorship(
        &self,
        authorship: NewAuthorship,
    ) -> Result<Authorship, RepositoryError> {
        let mut tables = self.tables();
        let exists = tables.authorships.iter().any(|a| {
            a.person_id == authorship.person_id
                && a.publication_version_id == authorship.publication_version_id
        });
        if exists {
            return Err(RepositoryError::UniqueViolation(format!(
                "person {} already linked to version {}",
                authorship.person_id, authorship.publication_version_id
            )));
        }
        let authorship = Authorship {
            id: AuthorshipId(tables.next_id()),
            person_id: authorship.person_id,
            publication_version_id: authorship.publication_version_id,
            position: authorship.position,
            reviewed_at: authorship.reviewed_at,
            reviewed_publication_version_id: authorship.reviewed_publication_version_id,
        };
        tables.authorships.push(authorship.clone());
        Ok(authorship)
    }

    async fn create_department_link(
        &self,
        authorship_id: AuthorshipId,
        department_id: DepartmentId,
        position: i32,
    ) -> Result<DepartmentLink, RepositoryError> {
        let mut tables = self.tables();
        if !tables.departments.iter().any(|d| d.id == department_id) {
            return Err(RepositoryError::ValidationFailed(format!(
                "department {} does not exist",
                department_id
            )));
        }
        let link = DepartmentLink {
            id: DepartmentLinkId(tables.next_id()),
            authorship_id,
            department_id,
            position,
            updated_at: Utc::now(),
        };
        tables.department_links.push(link.clone());
        Ok(link)
    }

    async fn find_authorship(
        &self,
        person_id: PersonId,
        version_id: VersionId,
    ) -> Result<Option<Authorship>, RepositoryError> {
        Ok(self
            .tables()
            .authorships
            .iter()
            .find(|a| a.person_id == person_id && a.publication_version_id == version_id)
            .cloned())
    }

    async fn find_authorships(
        &self,
        version_id: VersionId,
    ) -> Result<Vec<Authorship>, RepositoryError> {
        let mut authorships = self
            .tables()
            .authorships
            .iter()
            .filter(|a| a.publication_version_id == version_id)
            .cloned()
            .collect::<Vec<_>>();
        authorships.sort_by_key(|a| a.position);
        Ok(authorships)
    }

    async fn find_department_links(
        &self,
        authorship_id: AuthorshipId,
    ) -> Result<Vec<DepartmentLink>, RepositoryError> {
        let mut links = self.department_links_in_creation_order(authorship_id);
        links.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then(b.id.cmp(&a.id)));
        Ok(links)
    }

    async fn mark_reviewed(
        &self,
        authorship_id: AuthorshipId,
        reviewed_at: DateTime<Utc>,
        reviewed_version_id: VersionId,
    ) -> Result<Authorship, RepositoryError> {
        let mut tables = self.tables();
        let authorship = tables
            .authorships
            .iter_mut()
            .find(|a| a.id == authorship_id)
            .ok_or(RepositoryError::NotFound)?;
        authorship.reviewed_at = Some(reviewed_at);
        authorship.reviewed_publication_version_id = Some(reviewed_version_id);
        Ok(authorship.clone())
    }
}
