//! What changed for an author since they last reviewed a publication.

use std::collections::{BTreeMap, BTreeSet};

use bibrec_common::{
    AuthorshipId, DepartmentId, PersonId, PublicationId,
    authorship::Authorship,
    people::Department,
    publication::{FieldChange, Publication},
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{error::ServiceError, messages::Message, repository::Repository};

/// Change of the departments an author is affiliated with
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AffiliationChange {
    pub from: Vec<Department>,
    pub to: Vec<Department>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDiff {
    #[serde(flatten)]
    pub fields: BTreeMap<String, FieldChange>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub affiliation: Option<AffiliationChange>,
    pub reviewed_at: Option<DateTime<Utc>>,
}

/// Differences between the version `person_id` last reviewed and the current
/// version of `publication`.
///
/// `None` when the person is not an author of the current version, has never
/// reviewed it, or nothing changed.
pub async fn diff_since_review<R: Repository>(
    repository: &R,
    publication: &Publication,
    person_id: PersonId,
) -> Result<Option<ReviewDiff>, ServiceError> {
    let current_version_id = publication.current_version_id;

    let Some(current_authorship) = repository
        .find_authorship(person_id, current_version_id)
        .await?
    else {
        return Ok(None);
    };
    let Some(reviewed_version_id) = current_authorship.reviewed_publication_version_id else {
        return Ok(None);
    };

    let current = repository
        .find_version(publication.id, current_version_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, publication.id))?;
    let Some(reviewed) = repository
        .find_version(publication.id, reviewed_version_id)
        .await?
    else {
        tracing::warn!(
            "Person {} reviewed version {} which is not a version of publication {}",
            person_id,
            reviewed_version_id,
            publication.id
        );
        return Ok(None);
    };

    let fields = current.review_diff(&reviewed);

    let reviewed_authorship = if reviewed_version_id == current_version_id {
        Some(current_authorship.clone())
    } else {
        repository
            .find_authorship(person_id, reviewed_version_id)
            .await?
    };

    let affiliation = match &reviewed_authorship {
        Some(reviewed_authorship) => {
            let to = department_ids(repository, current_authorship.id).await?;
            let from = department_ids(repository, reviewed_authorship.id).await?;
            if affiliation_changed(&from, &to) {
                Some(AffiliationChange {
                    from: departments(repository, &from).await?,
                    to: departments(repository, &to).await?,
                })
            } else {
                None
            }
        }
        None => None,
    };

    if fields.is_empty() && affiliation.is_none() {
        return Ok(None);
    }

    let reviewed_at = reviewed_authorship
        .and_then(|authorship| authorship.reviewed_at)
        .or(current_authorship.reviewed_at);

    tracing::debug!(
        "Publication {} changed for person {}: {} fields, affiliation {}",
        publication.id,
        person_id,
        fields.len(),
        affiliation.is_some()
    );

    Ok(Some(ReviewDiff {
        fields,
        affiliation,
        reviewed_at,
    }))
}

/// Loads the publication and computes [`diff_since_review`]
pub async fn publication_review_diff<R: Repository>(
    repository: &R,
    id: PublicationId,
    person_id: PersonId,
) -> Result<Option<ReviewDiff>, ServiceError> {
    let publication = repository
        .find_publication(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?;
    diff_since_review(repository, &publication, person_id).await
}

/// Marks the current version of a publication as reviewed by `person_id`
pub async fn review_publication<R: Repository>(
    repository: &R,
    id: PublicationId,
    person_id: PersonId,
) -> Result<Authorship, ServiceError> {
    let publication = repository
        .find_publication(id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::PublicationNotFound, id))?;

    let authorship = repository
        .find_authorship(person_id, publication.current_version_id)
        .await?
        .ok_or_else(|| ServiceError::not_found(Message::AuthorshipNotFound, person_id))?;

    let authorship = repository
        .mark_reviewed(authorship.id, Utc::now(), publication.current_version_id)
        .await?;

    tracing::info!(
        "Person {} reviewed version {} of publication {}",
        person_id,
        publication.current_version_id,
        id
    );

    Ok(authorship)
}

/// Membership comparison only, order and duplicates do not matter
fn affiliation_changed(from: &BTreeSet<DepartmentId>, to: &BTreeSet<DepartmentId>) -> bool {
    from.symmetric_difference(to).next().is_some()
}

async fn department_ids<R: Repository>(
    repository: &R,
    authorship_id: AuthorshipId,
) -> Result<BTreeSet<DepartmentId>, ServiceError> {
    Ok(repository
        .find_department_links(authorship_id)
        .await?
        .into_iter()
        .map(|link| link.department_id)
        .collect())
}

async fn departments<R: Repository>(
    repository: &R,
    ids: &BTreeSet<DepartmentId>,
) -> Result<Vec<Department>, ServiceError> {
    let ids = ids.iter().copied().collect::<Vec<_>>();
    Ok(repository.find_departments(&ids).await?)
}
