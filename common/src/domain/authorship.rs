use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthorshipId, DepartmentId, DepartmentLinkId, PersonId, VersionId};

/// One person's authorship of one specific publication version (a "P2P" row).
///
/// At most one row exists per `(person_id, publication_version_id)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Authorship {
    pub id: AuthorshipId,
    pub person_id: PersonId,
    pub publication_version_id: VersionId,
    /// 1-based author ordering
    pub position: i32,
    pub reviewed_at: Option<DateTime<Utc>>,
    /// The version this person last reviewed
    pub reviewed_publication_version_id: Option<VersionId>,
}

/// Data for a new authorship row
#[derive(Debug, Clone, PartialEq)]
pub struct NewAuthorship {
    pub person_id: PersonId,
    pub publication_version_id: VersionId,
    pub position: i32,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub reviewed_publication_version_id: Option<VersionId>,
}

/// One affiliation claim within an authorship
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentLink {
    pub id: DepartmentLinkId,
    #[serde(rename = "people2publication_id")]
    pub authorship_id: AuthorshipId,
    pub department_id: DepartmentId,
    /// ordering among the departments of one authorship
    pub position: i32,
    pub updated_at: DateTime<Utc>,
}
