use bibrec_common::{
    Catalog, DepartmentId, Locale, PersonId, PublicationId, VersionId,
    authorship::Authorship,
    identifiers::{NewIdentifier, PublicationIdentifier},
    publication::{Publication, PublicationVersion, VersionContent},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    affiliation::AuthorInput,
    import::ImportSummary,
    publications::{AuthorView, PublicationDetail, PublicationInput, PublicationRecord},
    sources::ImportedAuthor,
};

// Query parameters

#[derive(Debug, Default, Deserialize)]
pub struct LocaleParams {
    pub locale: Option<String>,
}

impl LocaleParams {
    pub fn locale(&self) -> Locale {
        parse_locale(self.locale.as_deref())
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DetailParams {
    pub version_id: Option<i64>,
    pub locale: Option<String>,
}

impl DetailParams {
    pub fn locale(&self) -> Locale {
        parse_locale(self.locale.as_deref())
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewDiffParams {
    pub person_id: i64,
    pub locale: Option<String>,
}

impl ReviewDiffParams {
    pub fn locale(&self) -> Locale {
        parse_locale(self.locale.as_deref())
    }
}

fn parse_locale(locale: Option<&str>) -> Locale {
    locale.map(Locale::parse).unwrap_or_default()
}

// Request bodies

#[derive(Debug, Deserialize)]
pub struct PublicationRequest {
    pub publication: PublicationParams,
}

/// Content fields are given at the same level as the identifiers and authors
#[derive(Debug, Deserialize)]
pub struct PublicationParams {
    #[serde(flatten)]
    pub content: VersionContent,
    #[serde(default)]
    pub publication_identifiers: Vec<NewIdentifier>,
    #[serde(default)]
    pub authors: Vec<AuthorParams>,
    #[serde(default)]
    pub publish: bool,
}

#[derive(Debug, Deserialize)]
pub struct AuthorParams {
    pub id: PersonId,
    #[serde(default)]
    pub departments: Vec<DepartmentParams>,
}

#[derive(Debug, Deserialize)]
pub struct DepartmentParams {
    pub id: DepartmentId,
}

impl From<PublicationParams> for PublicationInput {
    fn from(value: PublicationParams) -> Self {
        Self {
            content: value.content,
            identifiers: value.publication_identifiers,
            authors: value
                .authors
                .into_iter()
                .map(|author| AuthorInput {
                    id: author.id,
                    departments: author.departments.into_iter().map(|d| d.id).collect(),
                })
                .collect(),
            publish: value.publish,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewRequest {
    pub person_id: PersonId,
}

// Responses

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IdentifierResponse {
    pub id: i64,
    pub identifier_code: String,
    pub identifier_value: String,
    pub identifier_label: Option<String>,
}

impl IdentifierResponse {
    fn new(identifier: PublicationIdentifier, catalog: &dyn Catalog) -> Self {
        let identifier_label = identifier.label(catalog).map(str::to_string);
        Self {
            id: identifier.id.0,
            identifier_code: identifier.identifier_code,
            identifier_value: identifier.identifier_value,
            identifier_label,
        }
    }
}

/// A publication merged with one of its versions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationData {
    pub id: PublicationId,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub current_version_id: VersionId,
    pub version_id: VersionId,
    #[serde(flatten)]
    pub content: VersionContent,
    pub version_created_at: DateTime<Utc>,
    pub version_created_by: Option<String>,
    pub version_updated_at: DateTime<Utc>,
    pub version_updated_by: Option<String>,
    pub publication_identifiers: Vec<IdentifierResponse>,
    pub authors: Vec<AuthorView>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub authors_from_import: Option<Vec<ImportedAuthor>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publication_type_suggestion: Option<String>,
}

impl PublicationData {
    fn new(publication: Publication, version: PublicationVersion, catalog: &dyn Catalog) -> Self {
        Self {
            id: publication.id,
            published_at: publication.published_at,
            created_at: publication.created_at,
            updated_at: publication.updated_at,
            current_version_id: publication.current_version_id,
            version_id: version.id,
            content: version.content,
            version_created_at: version.created_at,
            version_created_by: version.created_by,
            version_updated_at: version.updated_at,
            version_updated_by: version.updated_by,
            publication_identifiers: version
                .identifiers
                .into_iter()
                .map(|identifier| IdentifierResponse::new(identifier, catalog))
                .collect(),
            authors: Vec::new(),
            authors_from_import: None,
            publication_type_suggestion: None,
        }
    }

    pub fn from_record(record: PublicationRecord, catalog: &dyn Catalog) -> Self {
        Self::new(record.publication, record.version, catalog)
    }

    pub fn from_detail(detail: PublicationDetail, catalog: &dyn Catalog) -> Self {
        Self {
            authors: detail.authors,
            authors_from_import: detail.authors_from_import,
            publication_type_suggestion: detail.publication_type_suggestion,
            ..Self::new(detail.publication, detail.version, catalog)
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicationResponse {
    pub publication: PublicationData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportResult {
    pub count: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ImportMeta {
    pub result: ImportResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImportResponse {
    pub publication: Option<PublicationData>,
    pub meta: ImportMeta,
}

impl ImportResponse {
    pub fn new(summary: ImportSummary, catalog: &dyn Catalog) -> Self {
        Self {
            publication: summary
                .publication
                .map(|record| PublicationData::from_record(record, catalog)),
            meta: ImportMeta {
                result: ImportResult {
                    count: summary.count,
                    total: summary.total,
                },
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewDiffResponse {
    /// empty object when nothing changed
    pub diff: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewResponse {
    pub people2publication: Authorship,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EmptyResponse {}
