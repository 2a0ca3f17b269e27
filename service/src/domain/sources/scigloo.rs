use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter, first_match},
    xml::XmlDocument,
};

/// Alternate index export: flat records with an `authors` list and a `pubtype`
pub struct SciglooSource;

const TYPES: [(&str, &str); 8] = [
    ("Article", "publication_journal-article"),
    ("Journal article", "publication_journal-article"),
    ("Review", "publication_review-article"),
    ("Book", "publication_book"),
    ("Chapter", "publication_book-chapter"),
    ("Conference", "conference_paper"),
    ("Conference paper", "conference_paper"),
    ("Report", "publication_report"),
];

impl SourceAdapter for SciglooSource {
    fn tag(&self) -> &'static str {
        "scigloo"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        xml.select("//authors/author")
            .into_iter()
            .filter_map(|author| {
                let imported = match author.value("surname") {
                    Some(surname) => ImportedAuthor::new(author.value("firstname"), surname),
                    // older exports only carry "Surname, Firstname" as text
                    None => ImportedAuthor::from_name(&author.text())?,
                };
                Some(imported.with_affiliation(author.value("affiliation")))
            })
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let pubtype = xml.value("//pubtype")?;
        first_match(&[pubtype], &TYPES)
    }
}
