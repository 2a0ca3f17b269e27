use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter, first_match},
    xml::XmlDocument,
};

/// Reference manager export; every imported EndNote record keeps its own XML
pub struct EndnoteSource;

const REF_TYPES: [(&str, &str); 10] = [
    ("Journal Article", "publication_journal-article"),
    ("Book", "publication_book"),
    ("Edited Book", "publication_edited-book"),
    ("Book Section", "publication_book-chapter"),
    ("Conference Paper", "conference_paper"),
    ("Conference Proceedings", "conference_paper"),
    ("Thesis", "publication_doctoral-thesis"),
    ("Report", "publication_report"),
    ("Government Document", "publication_report"),
    ("Letter", "publication_editorial-letter"),
];

impl SourceAdapter for EndnoteSource {
    fn tag(&self) -> &'static str {
        "endnote"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        xml.select("//contributors/authors/author")
            .into_iter()
            .filter_map(|author| ImportedAuthor::from_name(&author.text()))
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let ref_type = xml.first("//ref-type")?.attr("name")?.to_string();
        first_match(&[ref_type], &REF_TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn authors_and_ref_type() {
        let xml = XmlDocument::parse(
            r#"<record><rec-number>4</rec-number><ref-type name="Book Section">5</ref-type>
               <contributors><authors>
                 <author><style face="normal" font="default" size="100%">Svensson, Anna</style></author>
                 <author><style face="normal" font="default" size="100%">Berg, P.</style></author>
               </authors><secondary-authors><author>Ek, Lars</author></secondary-authors></contributors>
            </record>"#,
        )
        .unwrap();

        let authors = EndnoteSource.extract_authors(&xml);
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[1].first_name.as_deref(), Some("P."));
        assert_eq!(
            EndnoteSource.suggest_publication_type(&xml),
            Some("publication_book-chapter")
        );
    }
}
