use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter, first_match},
    xml::{XmlDocument, XmlElement},
};

/// Institutional repository (DSpace), records in the `dim` metadata format
pub struct GupeaSource;

const TYPES: [(&str, &str); 9] = [
    ("Doctoral thesis", "publication_doctoral-thesis"),
    ("Licentiate thesis", "publication_licentiate-thesis"),
    ("Journal article", "publication_journal-article"),
    ("Article", "publication_journal-article"),
    ("Book", "publication_book"),
    ("Book chapter", "publication_book-chapter"),
    ("Report", "publication_report"),
    ("Conference paper", "conference_paper"),
    ("Text", "publication_report"),
];

fn dim_fields<'d>(
    xml: &'d XmlDocument,
    element: &str,
    qualifier: Option<&str>,
) -> impl Iterator<Item = XmlElement<'d>> {
    xml.select("//dim/field")
        .into_iter()
        .filter(move |field| field.attr("element") == Some(element) && field.attr("qualifier") == qualifier)
}

impl SourceAdapter for GupeaSource {
    fn tag(&self) -> &'static str {
        "gupea"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        dim_fields(xml, "contributor", Some("author"))
            .filter_map(|field| ImportedAuthor::from_name(&field.text()))
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let values = dim_fields(xml, "type", None)
            .map(|field| field.text())
            .collect::<Vec<_>>();
        first_match(&values, &TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECORD: &str = r#"<dim:dim xmlns:dim="http://www.dspace.org/xmlns/dspace/dim">
        <dim:field mdschema="dc" element="contributor" qualifier="author">Svensson, Anna</dim:field>
        <dim:field mdschema="dc" element="contributor" qualifier="author">Berg, Per</dim:field>
        <dim:field mdschema="dc" element="contributor" qualifier="advisor">Ek, Lars</dim:field>
        <dim:field mdschema="dc" element="type">Doctoral thesis</dim:field>
    </dim:dim>"#;

    #[test]
    fn authors_and_type() {
        let xml = XmlDocument::parse(RECORD).unwrap();

        let authors = GupeaSource.extract_authors(&xml);
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, "Anna Svensson");
        assert_eq!(authors[1].last_name, "Berg");

        assert_eq!(
            GupeaSource.suggest_publication_type(&xml),
            Some("publication_doctoral-thesis")
        );
    }

    #[test]
    fn foreign_xml_gives_empty_results() {
        let xml = XmlDocument::parse("<record><title>x</title></record>").unwrap();
        assert!(GupeaSource.extract_authors(&xml).is_empty());
        assert_eq!(GupeaSource.suggest_publication_type(&xml), None);
    }
}
