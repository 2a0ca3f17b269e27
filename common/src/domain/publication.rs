use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::identifiers::{NewIdentifier, PublicationIdentifier};
use crate::domain::{Catalog, PublicationId, VersionId};

/// Earliest and latest accepted publication year
pub const PUBYEAR_RANGE: std::ops::RangeInclusive<i32> = 1500..=2100;

/// Content fields that describe where a version came from rather than what it says.
/// They are not part of a review.
const IMPORT_METADATA_FIELDS: [&str; 3] = ["xml", "datasource", "sourceid"];

/// A logical bibliographic work.
///
/// Nothing is ever physically removed: `deleted_at` is a tombstone and every
/// read path ignores tombstoned publications.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Publication {
    pub id: PublicationId,
    /// `None` means draft
    pub published_at: Option<DateTime<Utc>>,
    pub deleted_at: Option<DateTime<Utc>>,
    pub current_version_id: VersionId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Publication {
    pub fn is_draft(&self) -> bool {
        self.published_at.is_none()
    }
}

/// Snapshot of the bibliographic fields of a publication.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VersionContent {
    pub title: String,
    pub alt_title: Option<String>,
    #[serde(rename = "abstract")]
    pub abstract_text: Option<String>,
    pub pubyear: Option<i32>,
    pub publication_type: Option<String>,
    pub publanguage: Option<String>,
    pub sourcetitle: Option<String>,
    pub sourcevolume: Option<String>,
    pub sourceissue: Option<String>,
    pub sourcepages: Option<String>,
    pub publisher: Option<String>,
    pub place: Option<String>,
    pub isbn: Option<String>,
    pub issn: Option<String>,
    pub keywords: Option<String>,
    pub url: Option<String>,
    /// Raw source XML this version was imported from
    pub xml: Option<String>,
    /// Tag of the external system that supplied `xml`
    pub datasource: Option<String>,
    /// Record id within the datasource
    pub sourceid: Option<String>,
}

impl VersionContent {
    /// All content fields keyed by their serialized name.
    pub fn fields(&self) -> Map<String, Value> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// Returns the validation errors of this content, empty when valid.
    ///
    /// Drafts only need a title; published content must also carry a known
    /// publication type and every field that type requires.
    pub fn validate(&self, catalog: &dyn Catalog, published: bool) -> Vec<String> {
        let mut errors = Vec::new();

        if self.title.trim().is_empty() {
            errors.push("title: can't be blank".to_string());
        }

        if let Some(pubyear) = self.pubyear {
            if !PUBYEAR_RANGE.contains(&pubyear) {
                errors.push(format!(
                    "pubyear: must be between {} and {}",
                    PUBYEAR_RANGE.start(),
                    PUBYEAR_RANGE.end()
                ));
            }
        }

        let publication_type = match self.publication_type.as_deref() {
            Some(code) => match catalog.publication_type(code) {
                Some(publication_type) => Some(publication_type),
                None => {
                    errors.push(format!("publication_type: {} is not a known type", code));
                    None
                }
            },
            None => {
                if published {
                    errors.push("publication_type: can't be blank".to_string());
                }
                None
            }
        };

        if let (true, Some(publication_type)) = (published, publication_type) {
            let fields = self.fields();
            for required in &publication_type.required_fields {
                if is_blank(fields.get(required)) {
                    errors.push(format!("{}: can't be blank", required));
                }
            }
        }

        errors
    }
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(text)) => text.trim().is_empty(),
        Some(_) => false,
    }
}

/// One snapshot of a publication's content. Immutable once superseded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationVersion {
    pub id: VersionId,
    pub publication_id: PublicationId,
    #[serde(flatten)]
    pub content: VersionContent,
    pub identifiers: Vec<PublicationIdentifier>,
    pub created_at: DateTime<Utc>,
    pub created_by: Option<String>,
    pub updated_at: DateTime<Utc>,
    pub updated_by: Option<String>,
}

/// Change of a single field between a reviewed and a current version
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldChange {
    pub from: Value,
    pub to: Value,
}

impl PublicationVersion {
    /// Field-level changes from `reviewed` to `self`.
    ///
    /// Import metadata is ignored. Diffing a version against itself is always empty.
    pub fn review_diff(&self, reviewed: &PublicationVersion) -> BTreeMap<String, FieldChange> {
        let current = self.content.fields();
        let previous = reviewed.content.fields();

        let mut diff = BTreeMap::new();
        for key in current.keys().chain(previous.keys()) {
            if IMPORT_METADATA_FIELDS.contains(&key.as_str()) || diff.contains_key(key) {
                continue;
            }
            let to = current.get(key).cloned().unwrap_or(Value::Null);
            let from = previous.get(key).cloned().unwrap_or(Value::Null);
            if from != to {
                diff.insert(key.clone(), FieldChange { from, to });
            }
        }
        diff
    }
}

/// Data for a new publication with its initial version
#[derive(Debug, Clone, PartialEq)]
pub struct NewPublication {
    pub content: VersionContent,
    pub identifiers: Vec<NewIdentifier>,
    pub published_at: Option<DateTime<Utc>>,
    pub created_by: String,
}

/// Data for a version superseding the current one
#[derive(Debug, Clone, PartialEq)]
pub struct NewVersion {
    pub content: VersionContent,
    pub identifiers: Vec<NewIdentifier>,
    pub updated_by: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_catalog;

    fn version(id: i64, content: VersionContent) -> PublicationVersion {
        PublicationVersion {
            id: VersionId(id),
            publication_id: PublicationId(1),
            content,
            identifiers: Vec::new(),
            created_at: Utc::now(),
            created_by: Some("editor".to_string()),
            updated_at: Utc::now(),
            updated_by: Some("editor".to_string()),
        }
    }

    fn content(title: &str) -> VersionContent {
        VersionContent {
            title: title.to_string(),
            pubyear: Some(2015),
            ..Default::default()
        }
    }

    #[test]
    fn diff_against_itself_is_empty() {
        let version = version(1, content("Ocean acidification"));
        assert!(version.review_diff(&version).is_empty());
    }

    #[test]
    fn diff_reports_from_and_to() {
        let reviewed = version(1, content("Ocean acidification"));
        let current = version(2, content("Ocean acidification revisited"));

        let diff = current.review_diff(&reviewed);

        assert_eq!(diff.len(), 1);
        assert_eq!(diff["title"].from, Value::from("Ocean acidification"));
        assert_eq!(diff["title"].to, Value::from("Ocean acidification revisited"));
    }

    #[test]
    fn diff_has_same_fields_in_both_directions() {
        let mut other = content("B");
        other.sourcetitle = Some("Nature".to_string());
        let a = version(1, content("A"));
        let b = version(2, other);

        let forward = a.review_diff(&b);
        let backward = b.review_diff(&a);

        assert_eq!(
            forward.keys().collect::<Vec<_>>(),
            backward.keys().collect::<Vec<_>>()
        );
    }

    #[test]
    fn diff_ignores_import_metadata() {
        let reviewed = version(1, content("A"));
        let mut imported = content("A");
        imported.xml = Some("<record/>".to_string());
        imported.datasource = Some("pubmed".to_string());
        let current = version(2, imported);

        assert!(current.review_diff(&reviewed).is_empty());
    }

    #[test]
    fn draft_needs_only_a_title() {
        let catalog = make_catalog();
        assert!(content("A").validate(catalog, false).is_empty());
        assert_eq!(content(" ").validate(catalog, false), vec!["title: can't be blank"]);
    }

    #[test]
    fn pubyear_out_of_range_is_rejected() {
        let catalog = make_catalog();
        let mut content = content("A");
        content.pubyear = Some(1200);
        assert_eq!(content.validate(catalog, false).len(), 1);
    }

    #[test]
    fn published_content_needs_required_fields_of_its_type() {
        let catalog = make_catalog();
        let mut content = content("A");
        content.publication_type = Some("publication_journal-article".to_string());

        let errors = content.validate(catalog, true);

        assert_eq!(errors, vec!["sourcetitle: can't be blank"]);
    }

    #[test]
    fn unknown_type_is_rejected() {
        let catalog = make_catalog();
        let mut content = content("A");
        content.publication_type = Some("poem".to_string());
        assert_eq!(content.validate(catalog, false).len(), 1);
    }
}
