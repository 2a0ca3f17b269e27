use std::collections::HashSet;

use bibrec_common::{
    Catalog, Locale, PublicationId, VersionId,
    authorship::Authorship,
    identifiers::NewIdentifier,
    people::{Department, Person},
    publication::{NewPublication, NewVersion, Publication, PublicationVersion, VersionContent},
};
use chrono::Utc;
use futures::future::try_join_all;
use itertools::Itertools;
use serde::Serialize;

use crate::domain::{
    affiliation::{AuthorInput, ReviewState, attach_author},
    error::ServiceError,
    messages::Message,
    repository::{Repository, RepositoryError},
    sources::{ImportedAuthor, SourceRegistry},
    user::{CurrentUser, DELETE_PUBLISHED_RIGHT},
};

/// Department names shown in an author's presentation string
const PRESENTED_DEPARTMENTS: usize = 2;

/// A publication together with one of its versions
#[derive(Debug, Clone, PartialEq)]
pub struct PublicationRecord {
    pub publication: Publication,
    pub version: PublicationVersion,
}

/// Content, identifiers and authors submitted for a create or an update
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublicationInput {
    pub content: VersionContent,
    pub identifiers: Vec<NewIdentifier>,
    pub authors: Vec<AuthorInput>,
    /// publish the publication if it is still a draft
    pub publish: bool,
}

/// A linked author as presented with a publication
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthorView {
    #[serde(flatten)]
    pub person: Person,
    pub position: i32,
    /// most recently linked first
    pub departments: Vec<Department>,
    pub presentation_string: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PublicationDetail {
    pub publication: Publication,
    pub version: PublicationVersion,
    pub authors: Vec<AuthorView>,
    /// only computed when the version has source XML and no linked author
    pub authors_from_import: Option<Vec<ImportedAuthor>>,
    pub publication_type_suggestion: Option<String>,
}

/// Loads a publication with its current version.
///
/// Drafts are only visible to the user who last edited them, anybody else
/// gets the same error as for a missing publication.
pub async fn visible_publication<R: Repository>(
    repository: &R,
    id: PublicationId,
    user: &CurrentUser,
) -> Result<PublicationRecord, ServiceError> {
    let publication = repository
        .find_publication(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?;

    let version = repository
        .find_version(id, publication.current_version_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?;

    if publication.is_draft() && version.updated_by.as_deref() != Some(user.username.as_str()) {
        tracing::debug!(
            "Draft {} is not visible to {} (last edited by {:?})",
            id,
            user.username,
            version.updated_by
        );
        return Err(ServiceError::not_found(Message::PublicationNotFound, id));
    }

    Ok(PublicationRecord {
        publication,
        version,
    })
}

pub async fn fetch_publication<R: Repository>(
    repository: &R,
    sources: &SourceRegistry,
    catalog: &dyn Catalog,
    id: PublicationId,
    version_id: Option<VersionId>,
    user: &CurrentUser,
    locale: Locale,
) -> Result<PublicationDetail, ServiceError> {
    let PublicationRecord {
        publication,
        version,
    } = visible_publication(repository, id, user).await?;

    let version = match version_id {
        Some(version_id) if version_id != version.id => repository
            .find_version(id, version_id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?,
        _ => version,
    };

    let authors = people_for_version(repository, version.id, locale).await?;

    let has_xml = version
        .content
        .xml
        .as_deref()
        .is_some_and(|xml| !xml.trim().is_empty());

    let authors_from_import =
        (has_xml && authors.is_empty()).then(|| sources.authors_from_import(&version));

    let publication_type_suggestion = if has_xml && version.content.publication_type.is_none() {
        sources.publication_type_suggestion(&version, catalog)
    } else {
        None
    };

    Ok(PublicationDetail {
        publication,
        version,
        authors,
        authors_from_import,
        publication_type_suggestion,
    })
}

/// Authors of a version in position order, with their departments resolved
pub async fn people_for_version<R: Repository>(
    repository: &R,
    version_id: VersionId,
    locale: Locale,
) -> Result<Vec<AuthorView>, ServiceError> {
    let authorships = repository.find_authorships(version_id).await?;

    let authors = try_join_all(
        authorships
            .into_iter()
            .map(|authorship| author_view(repository, authorship, locale)),
    )
    .await?;

    Ok(authors.into_iter().flatten().collect())
}

async fn author_view<R: Repository>(
    repository: &R,
    authorship: Authorship,
    locale: Locale,
) -> Result<Option<AuthorView>, ServiceError> {
    let Some(person) = repository.find_person(authorship.person_id).await? else {
        tracing::warn!(
            "Authorship {} refers to missing person {}",
            authorship.id,
            authorship.person_id
        );
        return Ok(None);
    };

    let links = repository.find_department_links(authorship.id).await?;
    let ids = links.iter().map(|link| link.department_id).collect::<Vec<_>>();
    let found = repository.find_departments(&ids).await?;
    let departments = ids
        .iter()
        .filter_map(|id| found.iter().find(|department| department.id == *id))
        .cloned()
        .collect::<Vec<_>>();

    let names = departments
        .iter()
        .map(|department| department.name(locale))
        .unique()
        .take(PRESENTED_DEPARTMENTS)
        .collect::<Vec<_>>();
    let presentation_string = person.presentation_string(&names);

    Ok(Some(AuthorView {
        person,
        position: authorship.position,
        departments,
        presentation_string,
    }))
}

/// Sets the tombstone of a publication. Published publications need the
/// `delete_published` right.
pub async fn delete_publication<R: Repository>(
    repository: &R,
    id: PublicationId,
    user: &CurrentUser,
) -> Result<(), ServiceError> {
    let publication = repository
        .find_publication(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?;

    if !publication.is_draft() && !user.has_right(DELETE_PUBLISHED_RIGHT) {
        tracing::info!("{} may not delete published publication {}", user.username, id);
        return Err(ServiceError::Permission {
            message: Message::CannotDeletePublished,
        });
    }

    if !repository.mark_deleted(id, Utc::now()).await? {
        return Err(ServiceError::Validation {
            message: Message::DeleteError,
            subject: Some(id.to_string()),
            errors: Vec::new(),
        });
    }

    tracing::info!("Publication {} deleted by {}", id, user.username);
    Ok(())
}

pub async fn create_publication<R: Repository>(
    repository: &R,
    catalog: &dyn Catalog,
    input: PublicationInput,
    user: &CurrentUser,
) -> Result<PublicationRecord, ServiceError> {
    validate_input(repository, catalog, &input, input.publish).await?;

    let new_publication = NewPublication {
        content: input.content,
        identifiers: input.identifiers,
        published_at: input.publish.then(Utc::now),
        created_by: user.username.clone(),
    };
    let record = repository
        .create_publications(vec![new_publication])
        .await?
        .into_iter()
        .next()
        .ok_or(RepositoryError::NotFound)?;

    for (index, author) in input.authors.iter().enumerate() {
        attach_author(
            repository,
            record.version.id,
            author,
            index as i32 + 1,
            ReviewState::default(),
        )
        .await?;
    }

    tracing::info!(
        "Publication {} created by {} with {} authors",
        record.publication.id,
        user.username,
        input.authors.len()
    );

    Ok(record)
}

/// Stores `input` as a new current version. Authors keep the review state
/// they had on the previous current version.
pub async fn update_publication<R: Repository>(
    repository: &R,
    catalog: &dyn Catalog,
    id: PublicationId,
    input: PublicationInput,
    user: &CurrentUser,
) -> Result<PublicationRecord, ServiceError> {
    let previous = visible_publication(repository, id, user).await?;
    let published = !previous.publication.is_draft() || input.publish;

    validate_input(repository, catalog, &input, published).await?;

    let version = repository
        .create_version(
            id,
            NewVersion {
                content: input.content,
                identifiers: input.identifiers,
                updated_by: user.username.clone(),
            },
        )
        .await?;

    for (index, author) in input.authors.iter().enumerate() {
        let review = repository
            .find_authorship(author.id, previous.version.id)
            .await?
            .map(|authorship| ReviewState::from(&authorship))
            .unwrap_or_default();
        attach_author(repository, version.id, author, index as i32 + 1, review).await?;
    }

    let publication = if input.publish && previous.publication.is_draft() {
        repository.set_published(id, Utc::now()).await?
    } else {
        repository
            .find_publication(id)
            .await?
            .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?
    };

    tracing::info!(
        "Publication {} updated by {}, version {} supersedes {}",
        id,
        user.username,
        version.id,
        previous.version.id
    );

    Ok(PublicationRecord {
        publication,
        version,
    })
}

/// Checks content, identifiers and author list before anything is written
async fn validate_input<R: Repository>(
    repository: &R,
    catalog: &dyn Catalog,
    input: &PublicationInput,
    published: bool,
) -> Result<(), ServiceError> {
    let errors = input.content.validate(catalog, published);
    if !errors.is_empty() {
        return Err(ServiceError::validation(Message::UpdateError, errors));
    }

    let errors = input
        .identifiers
        .iter()
        .filter_map(|identifier| {
            let errors = identifier.validate(catalog);
            (!errors.is_empty()).then(|| {
                format!(
                    "{} {}: {}",
                    identifier.identifier_code,
                    identifier.identifier_value,
                    errors.join(", ")
                )
            })
        })
        .collect::<Vec<_>>();
    if !errors.is_empty() {
        return Err(ServiceError::validation(Message::IdentifierError, errors));
    }

    let mut seen = HashSet::new();
    let duplicates = input
        .authors
        .iter()
        .filter(|author| !seen.insert(author.id))
        .map(|author| format!("authors: person {} is listed more than once", author.id))
        .collect::<Vec<_>>();
    if !duplicates.is_empty() {
        return Err(ServiceError::validation(Message::UpdateError, duplicates));
    }

    for author in input.authors.iter() {
        if repository.find_person(author.id).await?.is_none() {
            return Err(ServiceError::not_found(Message::PersonNotFound, author.id));
        }
    }

    let department_ids = input
        .authors
        .iter()
        .flat_map(|author| author.departments.iter().copied())
        .unique()
        .collect::<Vec<_>>();
    if !department_ids.is_empty() {
        let found = repository.find_departments(&department_ids).await?;
        if let Some(missing) = department_ids
            .iter()
            .find(|id| !found.iter().any(|department| department.id == **id))
        {
            return Err(ServiceError::not_found(Message::DepartmentNotFound, missing));
        }
    }

    Ok(())
}
