use crate::domain::{Catalog, IdentifierCode, IdentifierCodeId, PublicationType, TypeCode};

/// Simple catalog storing a few static publication types and identifier codes.
///
/// Public so that other crates can reuse it for their own tests.
#[derive(Debug)]
pub struct SimpleCatalog {
    pub types: Vec<PublicationType>,
    pub identifier_codes: Vec<IdentifierCode>,
}

impl Catalog for SimpleCatalog {
    fn publication_types(&self) -> Box<dyn Iterator<Item = &PublicationType> + '_> {
        Box::new(self.types.iter())
    }

    fn publication_type(&self, code: &str) -> Option<&PublicationType> {
        self.types.iter().find(|t| t.code.as_ref() == code)
    }

    fn identifier_code(&self, code: &str) -> Option<&IdentifierCode> {
        self.identifier_codes
            .iter()
            .find(|c| c.code.as_ref() == code)
    }
}

/// Helper for building a publication type value.
pub fn make_type(code: &str, label: &str, required_fields: &[&str]) -> PublicationType {
    PublicationType {
        code: TypeCode::try_new(code).unwrap(),
        label_en: label.to_string(),
        label_sv: label.to_string(),
        required_fields: required_fields.iter().map(|f| f.to_string()).collect(),
    }
}

/// Helper for building a whitelisted identifier code.
pub fn make_identifier_code(code: &str, label: &str) -> IdentifierCode {
    IdentifierCode {
        code: IdentifierCodeId::try_new(code).unwrap(),
        label: label.to_string(),
    }
}

/// A leaked catalog with the usual publication types and identifier codes.
pub fn make_catalog() -> &'static SimpleCatalog {
    let catalog = SimpleCatalog {
        types: vec![
            make_type(
                "publication_journal-article",
                "Journal article",
                &["pubyear", "sourcetitle"],
            ),
            make_type(
                "publication_review-article",
                "Review article",
                &["pubyear", "sourcetitle"],
            ),
            make_type(
                "publication_editorial-letter",
                "Editorial letter",
                &["pubyear"],
            ),
            make_type("publication_book", "Book", &["pubyear", "publisher"]),
            make_type("publication_edited-book", "Edited book", &["pubyear"]),
            make_type("publication_book-chapter", "Book chapter", &["pubyear"]),
            make_type("publication_report", "Report", &["pubyear"]),
            make_type("publication_doctoral-thesis", "Doctoral thesis", &["pubyear"]),
            make_type(
                "publication_licentiate-thesis",
                "Licentiate thesis",
                &["pubyear"],
            ),
            make_type("conference_paper", "Conference paper", &["pubyear"]),
        ],
        identifier_codes: vec![
            make_identifier_code("doi", "DOI"),
            make_identifier_code("isbn", "ISBN"),
            make_identifier_code("pubmed", "PubMed-ID"),
            make_identifier_code("scopus-id", "Scopus-ID"),
            make_identifier_code("libris-id", "Libris-ID"),
            make_identifier_code("handle", "Handle"),
        ],
    };
    Box::leak(Box::new(catalog))
}
