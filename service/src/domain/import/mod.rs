//! Batch import of EndNote XML exports.

use std::borrow::Cow;
use std::sync::LazyLock;

use bibrec_common::{Catalog, publication::NewPublication};
use regex::Regex;

use crate::domain::{
    error::ServiceError,
    messages::Message,
    publications::PublicationRecord,
    repository::Repository,
    user::CurrentUser,
    xml::XmlDocument,
};

pub mod endnote;

/// Oldest EndNote version whose export format is understood
pub const MINIMUM_SOURCE_APP_VERSION: f64 = 8.0;

pub const DEFAULT_LANGUAGE: &str = "en";

const RECORD_PATH: &str = "//xml/records/record";
const SOURCE_APP_PATH: &str = "//source-app";

static ENCODING_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\x{FEFF}?\s*<\?xml[^>]*\bencoding\s*=\s*["']([A-Za-z0-9._-]+)["']"#)
        .expect("encoding regex must be valid")
});

static LEADING_NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)").expect("leading number regex must be valid")
});

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    /// first publication created by the batch
    pub publication: Option<PublicationRecord>,
    /// records created
    pub count: usize,
    /// records seen
    pub total: usize,
}

/// Imports every record of an EndNote XML document as a draft publication.
///
/// The document is rejected as a whole when it is empty, not well-formed, or
/// declares any EndNote version older than [`MINIMUM_SOURCE_APP_VERSION`].
/// All records are parsed and validated before anything is written, and the
/// drafts are then created all-or-nothing, so a failing record leaves no
/// publication behind.
pub async fn import_endnote<R: Repository>(
    repository: &R,
    catalog: &dyn Catalog,
    raw: &[u8],
    user: &CurrentUser,
) -> Result<ImportSummary, ServiceError> {
    if raw.trim_ascii().is_empty() {
        return Err(ServiceError::validation(Message::NoDataInFile, Vec::new()));
    }

    let raw_xml = decode(raw).map_err(|diagnostic| {
        tracing::info!("Rejected import from {}: {}", user.username, diagnostic);
        ServiceError::validation(Message::InvalidFile, vec![diagnostic])
    })?;

    let document = XmlDocument::parse(&raw_xml).map_err(|e| {
        tracing::info!("Rejected import from {}: {}", user.username, e);
        ServiceError::validation(Message::InvalidFile, vec![e.to_string()])
    })?;

    let unsupported = document
        .select(SOURCE_APP_PATH)
        .iter()
        .map(|app| source_app_version(app.attr("version")))
        .any(|version| version < MINIMUM_SOURCE_APP_VERSION);
    if unsupported {
        return Err(ServiceError::validation(Message::UnsupportedVersion, Vec::new()));
    }

    let records = document.select(RECORD_PATH);
    let total = records.len();

    let mut drafts = Vec::with_capacity(total);
    for (index, record) in records.into_iter().enumerate() {
        let imported = endnote::parse_record(record, catalog);

        let mut content = imported.content;
        content.publication_type = None;
        if content.publanguage.is_none() {
            content.publanguage = Some(DEFAULT_LANGUAGE.to_string());
        }

        let mut errors = content.validate(catalog, false);
        for identifier in imported.identifiers.iter() {
            errors.extend(identifier.validate(catalog));
        }
        if !errors.is_empty() {
            tracing::info!("Import record {} of {} is invalid: {:?}", index + 1, total, errors);
            return Err(ServiceError::Validation {
                message: Message::UpdateError,
                subject: Some(format!("record {}", index + 1)),
                errors,
            });
        }

        drafts.push(NewPublication {
            content,
            identifiers: imported.identifiers,
            published_at: None,
            created_by: user.username.clone(),
        });
    }

    let created = if drafts.is_empty() {
        Vec::new()
    } else {
        repository.create_publications(drafts).await?
    };
    let count = created.len();

    tracing::info!(
        "Imported {} of {} EndNote records for {}",
        count,
        total,
        user.username
    );

    Ok(ImportSummary {
        publication: created.into_iter().next(),
        count,
        total,
    })
}

/// Text of the uploaded file. UTF-8 unless the XML declaration names
/// ISO-8859-1, which maps every byte to the code point of the same value.
fn decode(raw: &[u8]) -> Result<Cow<'_, str>, String> {
    let head = String::from_utf8_lossy(&raw[..raw.len().min(200)]);
    let encoding = ENCODING_REGEX
        .captures(&head)
        .map(|captures| captures[1].to_ascii_lowercase());

    match encoding.as_deref() {
        None | Some("utf-8") | Some("utf8") => std::str::from_utf8(raw)
            .map(Cow::Borrowed)
            .map_err(|e| format!("file is not valid UTF-8: {}", e)),
        Some("iso-8859-1") | Some("latin1") | Some("latin-1") => {
            Ok(Cow::Owned(raw.iter().map(|&b| char::from(b)).collect()))
        }
        Some(other) => Err(format!("unsupported encoding '{}'", other)),
    }
}

/// Numeric prefix of a version marker, `0.0` when there is none
fn source_app_version(version: Option<&str>) -> f64 {
    version
        .and_then(|v| LEADING_NUMBER_REGEX.find(v.trim()))
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::error::ErrorCode;
    use crate::infrastructure::persistence::memory::InMemoryRepository;
    use bibrec_common::test_utils::make_catalog;

    fn record(version: &str, title: Option<&str>) -> String {
        let title = title
            .map(|t| format!("<titles><title>{}</title></titles>", t))
            .unwrap_or_default();
        format!(
            r#"<record><source-app name="EndNote" version="{}">EndNote</source-app><rec-number>1</rec-number>{}</record>"#,
            version, title
        )
    }

    fn export(records: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?><xml><records>{}</records></xml>",
            records.concat()
        )
    }

    fn user() -> CurrentUser {
        CurrentUser::new("editor", Vec::<String>::new())
    }

    #[test]
    fn version_markers_parse_like_numbers() {
        assert_eq!(source_app_version(Some("17.0")), 17.0);
        assert_eq!(source_app_version(Some("7.5.1")), 7.5);
        assert_eq!(source_app_version(Some(" 9")), 9.0);
        assert_eq!(source_app_version(Some("X7")), 0.0);
        assert_eq!(source_app_version(None), 0.0);
    }

    #[tokio::test]
    async fn three_records_are_imported() {
        let repository = InMemoryRepository::new();
        let xml = export(&[
            record("17.0", Some("First")),
            record("17.0", Some("Second")),
            record("17.0", Some("Third")),
        ]);

        let summary = import_endnote(&repository, make_catalog(), xml.as_bytes(), &user())
            .await
            .unwrap();

        assert_eq!(summary.count, 3);
        assert_eq!(summary.total, 3);
        let first = summary.publication.unwrap();
        assert_eq!(first.version.content.title, "First");
        assert!(first.publication.is_draft());
        assert_eq!(first.version.content.publanguage.as_deref(), Some("en"));
        assert_eq!(first.version.content.publication_type, None);
        assert_eq!(first.version.created_by.as_deref(), Some("editor"));
    }

    #[tokio::test]
    async fn one_old_version_marker_rejects_the_batch() {
        let repository = InMemoryRepository::new();
        let xml = export(&[record("7.5", Some("Old")), record("9.0", Some("New"))]);

        let err = import_endnote(&repository, make_catalog(), xml.as_bytes(), &user())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(matches!(
            err,
            ServiceError::Validation {
                message: Message::UnsupportedVersion,
                ..
            }
        ));
        assert_eq!(repository.publication_count(), 0);
    }

    #[tokio::test]
    async fn record_without_title_gets_placeholder() {
        let repository = InMemoryRepository::new();
        let xml = export(&[record("17.0", None)]);

        let summary = import_endnote(&repository, make_catalog(), xml.as_bytes(), &user())
            .await
            .unwrap();

        let created = summary.publication.unwrap();
        assert_eq!(created.version.content.title, "[Title not found]");
    }

    #[tokio::test]
    async fn empty_and_malformed_input() {
        let repository = InMemoryRepository::new();

        let err = import_endnote(&repository, make_catalog(), b"  \n", &user())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation {
                message: Message::NoDataInFile,
                ..
            }
        ));

        let err = import_endnote(&repository, make_catalog(), b"<xml><records>", &user())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Validation {
                message: Message::InvalidFile,
                ..
            }
        ));
        assert_eq!(err.errors().len(), 1);
    }

    #[tokio::test]
    async fn bytes_that_are_not_utf8_are_an_invalid_file() {
        let repository = InMemoryRepository::new();
        let mut raw = export(&[record("17.0", Some("Sm"))]).into_bytes();
        let at = raw.len() - "</title></titles></record></records></xml>".len();
        raw.insert(at, 0xF6);

        let err = import_endnote(&repository, make_catalog(), &raw, &user())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ServiceError::Validation {
                message: Message::InvalidFile,
                ..
            }
        ));
        assert!(err.errors()[0].contains("UTF-8"));
        assert_eq!(repository.publication_count(), 0);
    }

    #[tokio::test]
    async fn latin1_declaration_is_honoured() {
        let repository = InMemoryRepository::new();
        let mut raw = b"<?xml version=\"1.0\" encoding=\"ISO-8859-1\"?><xml><records>".to_vec();
        raw.extend_from_slice(br#"<record><source-app version="17.0"/><titles><title>Sm"#);
        raw.push(0xF6);
        raw.extend_from_slice(b"rg\xE5s</title></titles></record></records></xml>");

        let summary = import_endnote(&repository, make_catalog(), &raw, &user())
            .await
            .unwrap();

        assert_eq!(summary.publication.unwrap().version.content.title, "Smörgås");
    }

    #[tokio::test]
    async fn invalid_record_leaves_nothing_behind() {
        let repository = InMemoryRepository::new();
        let bad_year = r#"<record><source-app version="17.0"/><titles><title>Medieval</title></titles><dates><year>1200</year></dates></record>"#;
        let xml = export(&[record("17.0", Some("Fine")), bad_year.to_string()]);

        let err = import_endnote(&repository, make_catalog(), xml.as_bytes(), &user())
            .await
            .unwrap_err();

        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert!(err.to_string().contains("record 2"));
        assert_eq!(repository.publication_count(), 0);
    }

    #[tokio::test]
    async fn document_without_records() {
        let repository = InMemoryRepository::new();
        let summary = import_endnote(&repository, make_catalog(), b"<xml><records/></xml>", &user())
            .await
            .unwrap();
        assert_eq!((summary.count, summary.total), (0, 0));
        assert!(summary.publication.is_none());
    }
}
