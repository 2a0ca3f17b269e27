use std::collections::HashMap;

use bibrec_common::{Catalog, publication::PublicationVersion};
use serde::Serialize;

use crate::domain::xml::XmlDocument;

mod endnote;
mod gupea;
mod libris;
mod pubmed;
mod scigloo;
mod scopus;

pub use endnote::EndnoteSource;
pub use gupea::GupeaSource;
pub use libris::LibrisSource;
pub use pubmed::PubmedSource;
pub use scigloo::SciglooSource;
pub use scopus::ScopusSource;

/// Author as found in the source XML of an imported record, not linked to any person
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportedAuthor {
    pub first_name: Option<String>,
    pub last_name: String,
    /// full name as it should be displayed
    pub name: String,
    /// affiliation as written in the source, not resolved to a department
    pub affiliation: Option<String>,
}

impl ImportedAuthor {
    pub fn new(first_name: Option<String>, last_name: impl Into<String>) -> Self {
        let last_name = last_name.into().trim().to_string();
        let first_name = first_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty());
        let name = match &first_name {
            Some(first_name) => format!("{} {}", first_name, last_name),
            None => last_name.clone(),
        };
        Self {
            first_name,
            last_name,
            name,
            affiliation: None,
        }
    }

    /// Parses `Last, First` or `First Last`. Blank input yields `None`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        if name.is_empty() {
            return None;
        }
        let author = match name.split_once(',') {
            Some((last, first)) => Self::new(Some(first.to_string()), last),
            None => match name.rsplit_once(' ') {
                Some((first, last)) => Self::new(Some(first.to_string()), last),
                None => Self::new(None, name),
            },
        };
        Some(author)
    }

    pub fn with_affiliation(mut self, affiliation: Option<String>) -> Self {
        self.affiliation = affiliation.filter(|a| !a.trim().is_empty());
        self
    }
}

/// Reads authors and a publication type out of the XML of one external datasource.
///
/// Adapters must tolerate missing or unexpected subtrees and return partial
/// or empty results instead of failing.
pub trait SourceAdapter: Send + Sync + 'static {
    /// datasource tag this adapter handles, e.g. `pubmed`
    fn tag(&self) -> &'static str;

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor>;

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str>;
}

/// Adapters by datasource tag, built once at startup
pub struct SourceRegistry {
    adapters: HashMap<&'static str, Box<dyn SourceAdapter>>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with every supported datasource
    pub fn with_known_sources() -> Self {
        Self::new()
            .register(GupeaSource)
            .register(PubmedSource)
            .register(ScopusSource)
            .register(SciglooSource)
            .register(LibrisSource)
            .register(EndnoteSource)
    }

    pub fn register(mut self, adapter: impl SourceAdapter) -> Self {
        self.adapters.insert(adapter.tag(), Box::new(adapter));
        self
    }

    pub fn adapter(&self, datasource: &str) -> Option<&dyn SourceAdapter> {
        self.adapters.get(datasource).map(|adapter| adapter.as_ref())
    }

    /// Author suggestions computed from the source XML of a version
    pub fn authors_from_import(&self, version: &PublicationVersion) -> Vec<ImportedAuthor> {
        match self.parse_source(version) {
            Some((adapter, xml)) => adapter.extract_authors(&xml),
            None => Vec::new(),
        }
    }

    /// Publication type suggestion; only codes known to the catalog are suggested
    pub fn publication_type_suggestion(
        &self,
        version: &PublicationVersion,
        catalog: &dyn Catalog,
    ) -> Option<String> {
        let (adapter, xml) = self.parse_source(version)?;
        let code = adapter.suggest_publication_type(&xml)?;
        match catalog.publication_type(code) {
            Some(publication_type) => Some(publication_type.code.to_string()),
            None => {
                tracing::debug!("Suggested type {} is not configured", code);
                None
            }
        }
    }

    fn parse_source(
        &self,
        version: &PublicationVersion,
    ) -> Option<(&dyn SourceAdapter, XmlDocument)> {
        let xml = version.content.xml.as_deref().filter(|x| !x.trim().is_empty())?;
        let datasource = version.content.datasource.as_deref()?;
        let Some(adapter) = self.adapter(datasource) else {
            tracing::debug!("No source adapter for datasource {}", datasource);
            return None;
        };
        match XmlDocument::parse(xml) {
            Ok(document) => Some((adapter, document)),
            Err(e) => {
                tracing::warn!(
                    "Source XML of version {} ({}) is not readable: {}",
                    version.id,
                    datasource,
                    e
                );
                None
            }
        }
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::with_known_sources()
    }
}

/// First value of `candidates` that appears in `values`, compared case-insensitively
fn first_match<'a>(
    values: &[String],
    candidates: &[(&str, &'a str)],
) -> Option<&'a str> {
    candidates.iter().find_map(|(value, code)| {
        values
            .iter()
            .any(|v| v.trim().eq_ignore_ascii_case(value))
            .then_some(*code)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bibrec_common::{
        PublicationId, VersionId, publication::VersionContent,
        test_utils::{SimpleCatalog, make_catalog, make_type},
    };
    use chrono::Utc;

    fn version_with_source(datasource: &str, xml: &str) -> PublicationVersion {
        PublicationVersion {
            id: VersionId(1),
            publication_id: PublicationId(1),
            content: VersionContent {
                title: "Imported".to_string(),
                xml: Some(xml.to_string()),
                datasource: Some(datasource.to_string()),
                ..Default::default()
            },
            identifiers: Vec::new(),
            created_at: Utc::now(),
            created_by: None,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    #[test]
    fn names_are_split() {
        let author = ImportedAuthor::from_name("Svensson, Anna K.").unwrap();
        assert_eq!(author.last_name, "Svensson");
        assert_eq!(author.first_name.as_deref(), Some("Anna K."));
        assert_eq!(author.name, "Anna K. Svensson");

        let author = ImportedAuthor::from_name("Anna Svensson").unwrap();
        assert_eq!(author.last_name, "Svensson");

        let author = ImportedAuthor::from_name("Plato").unwrap();
        assert_eq!(author.first_name, None);
        assert!(ImportedAuthor::from_name("  ").is_none());
    }

    #[test]
    fn unknown_or_absent_datasource_yields_nothing() {
        let registry = SourceRegistry::with_known_sources();
        let catalog = make_catalog();

        let version = version_with_source("crossref", "<record/>");
        assert!(registry.authors_from_import(&version).is_empty());
        assert_eq!(registry.publication_type_suggestion(&version, catalog), None);

        let mut version = version_with_source("pubmed", "<record/>");
        version.content.datasource = None;
        assert!(registry.authors_from_import(&version).is_empty());
    }

    #[test]
    fn unreadable_xml_yields_nothing() {
        let registry = SourceRegistry::with_known_sources();
        let version = version_with_source("pubmed", "<PubmedArticle><Author>");
        assert!(registry.authors_from_import(&version).is_empty());
    }

    #[test]
    fn suggestion_must_be_a_configured_type() {
        let registry = SourceRegistry::new().register(ScopusSource);
        let catalog = make_catalog();
        let xml = "<abstracts-retrieval-response><coredata><subtype>ar</subtype></coredata></abstracts-retrieval-response>";

        let version = version_with_source("scopus", xml);
        assert_eq!(
            registry.publication_type_suggestion(&version, catalog).as_deref(),
            Some("publication_journal-article")
        );

        let books_only = SimpleCatalog {
            types: vec![make_type("publication_book", "Book", &[])],
            identifier_codes: Vec::new(),
        };
        assert_eq!(registry.publication_type_suggestion(&version, &books_only), None);
    }
}
