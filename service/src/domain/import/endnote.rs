use std::sync::LazyLock;

use bibrec_common::{Catalog, identifiers::NewIdentifier, publication::VersionContent};
use regex::Regex;

use crate::domain::xml::XmlElement;

/// Title given to records without a readable title
pub const PLACEHOLDER_TITLE: &str = "[Title not found]";

/// Datasource tag of records imported from EndNote XML
pub const ENDNOTE_DATASOURCE: &str = "endnote";

const DOI_CODE: &str = "doi";

static ISSN_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{4}-?\d{3}[\dXx]$").expect("ISSN regex must be valid"));

static YEAR_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("year regex must be valid"));

/// Draft data extracted from one EndNote record
#[derive(Debug, Clone, PartialEq)]
pub struct ImportedRecord {
    pub content: VersionContent,
    pub identifiers: Vec<NewIdentifier>,
}

/// Maps one `record` element to publication content.
///
/// Never fails: whatever can be read is kept, and a missing title is
/// replaced by [`PLACEHOLDER_TITLE`].
pub fn parse_record(record: XmlElement<'_>, catalog: &dyn Catalog) -> ImportedRecord {
    let mut content = VersionContent {
        title: record
            .value("titles/title")
            .unwrap_or_else(|| PLACEHOLDER_TITLE.to_string()),
        alt_title: record.value("titles/alt-title"),
        abstract_text: record.value("abstract"),
        pubyear: record.value("dates/year").and_then(|year| parse_year(&year)),
        sourcetitle: record
            .value("titles/secondary-title")
            .or_else(|| record.value("periodical/full-title")),
        sourcevolume: record.value("volume"),
        sourceissue: record.value("number"),
        sourcepages: record.value("pages"),
        publisher: record.value("publisher"),
        place: record.value("pub-location"),
        keywords: keywords(record),
        url: record.value("urls//url"),
        publanguage: record.value("language").map(|l| language_code(&l)),
        xml: Some(record.raw().to_string()),
        datasource: Some(ENDNOTE_DATASOURCE.to_string()),
        sourceid: record.value("rec-number"),
        ..Default::default()
    };

    // the isbn field holds ISSNs for periodicals
    if let Some(number) = record.value("isbn") {
        let first = number.split_whitespace().next().unwrap_or_default();
        if ISSN_REGEX.is_match(first) {
            content.issn = Some(number);
        } else {
            content.isbn = Some(number);
        }
    }

    let mut identifiers = Vec::new();
    if let Some(doi) = record.value("electronic-resource-num") {
        if catalog.identifier_code(DOI_CODE).is_some() {
            identifiers.push(NewIdentifier::new(DOI_CODE, doi));
        }
    }

    ImportedRecord {
        content,
        identifiers,
    }
}

fn parse_year(text: &str) -> Option<i32> {
    YEAR_REGEX
        .find(text)
        .and_then(|year| year.as_str().parse().ok())
}

fn keywords(record: XmlElement<'_>) -> Option<String> {
    let keywords = record
        .select("keywords/keyword")
        .iter()
        .map(|k| k.text().trim().to_string())
        .filter(|k| !k.is_empty())
        .collect::<Vec<_>>();
    if keywords.is_empty() {
        None
    } else {
        Some(keywords.join(", "))
    }
}

fn language_code(language: &str) -> String {
    match language.trim().to_lowercase().as_str() {
        "english" | "eng" | "en" => "en".to_string(),
        "swedish" | "svenska" | "swe" | "sv" => "sv".to_string(),
        other => other.to_string(),
    }
}
