use std::collections::HashMap;

use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter, first_match},
    xml::XmlDocument,
};

/// Citation index, records in the abstract retrieval format
pub struct ScopusSource;

const SUBTYPES: [(&str, &str); 9] = [
    ("ar", "publication_journal-article"),
    ("re", "publication_review-article"),
    ("ed", "publication_editorial-letter"),
    ("le", "publication_editorial-letter"),
    ("no", "publication_editorial-letter"),
    ("bk", "publication_book"),
    ("ch", "publication_book-chapter"),
    ("cp", "conference_paper"),
    ("rp", "publication_report"),
];

impl SourceAdapter for ScopusSource {
    fn tag(&self) -> &'static str {
        "scopus"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        let affiliations = xml
            .select("//affiliation")
            .into_iter()
            .filter_map(|affiliation| Some((affiliation.attr("id")?, affiliation.value("affilname")?)))
            .collect::<HashMap<_, _>>();

        xml.select("//authors/author")
            .into_iter()
            .filter_map(|author| {
                let last_name = author
                    .value("surname")
                    .or_else(|| author.value("preferred-name/surname"))?;
                let first_name = author
                    .value("given-name")
                    .or_else(|| author.value("preferred-name/given-name"))
                    .or_else(|| author.value("initials"));
                let affiliation = author
                    .first("affiliation")
                    .and_then(|a| a.attr("id"))
                    .and_then(|id| affiliations.get(id).cloned());
                Some(ImportedAuthor::new(first_name, last_name).with_affiliation(affiliation))
            })
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let subtype = xml.value("//coredata/subtype")?;
        first_match(&[subtype], &SUBTYPES)
    }
}
