use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter, first_match},
    xml::XmlDocument,
};

/// Biomedical index, records in the `PubmedArticle` efetch format
pub struct PubmedSource;

// checked in order, the first publication type present wins
const TYPES: [(&str, &str); 6] = [
    ("Review", "publication_review-article"),
    ("Systematic Review", "publication_review-article"),
    ("Editorial", "publication_editorial-letter"),
    ("Letter", "publication_editorial-letter"),
    ("Comment", "publication_editorial-letter"),
    ("Journal Article", "publication_journal-article"),
];

impl SourceAdapter for PubmedSource {
    fn tag(&self) -> &'static str {
        "pubmed"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        xml.select("//AuthorList/Author")
            .into_iter()
            .filter_map(|author| {
                let imported = match author.value("LastName") {
                    Some(last_name) => ImportedAuthor::new(
                        author.value("ForeName").or_else(|| author.value("Initials")),
                        last_name,
                    ),
                    None => ImportedAuthor::new(None, author.value("CollectiveName")?),
                };
                let affiliation = author
                    .value("AffiliationInfo/Affiliation")
                    .or_else(|| author.value("Affiliation"));
                Some(imported.with_affiliation(affiliation))
            })
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let values = xml
            .select("//PublicationTypeList/PublicationType")
            .iter()
            .map(|t| t.text())
            .collect::<Vec<_>>();
        first_match(&values, &TYPES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARTICLE: &str = r#"<PubmedArticle><MedlineCitation><Article>
        <AuthorList CompleteYN="Y">
          <Author ValidYN="Y"><LastName>Svensson</LastName><ForeName>Anna</ForeName>
            <AffiliationInfo><Affiliation>University of Gothenburg, Sweden.</Affiliation></AffiliationInfo>
          </Author>
          <Author ValidYN="Y"><LastName>Berg</LastName><Initials>P</Initials></Author>
          <Author ValidYN="Y"><CollectiveName>SWEDEHEART study group</CollectiveName></Author>
          <Author ValidYN="Y"></Author>
        </AuthorList>
        <PublicationTypeList>
          <PublicationType UI="D016428">Journal Article</PublicationType>
          <PublicationType UI="D016454">Review</PublicationType>
        </PublicationTypeList>
    </Article></MedlineCitation></PubmedArticle>"#;

    #[test]
    fn authors_with_affiliation() {
        let xml = XmlDocument::parse(ARTICLE).unwrap();
        let authors = PubmedSource.extract_authors(&xml);

        assert_eq!(authors.len(), 3);
        assert_eq!(authors[0].name, "Anna Svensson");
        assert_eq!(
            authors[0].affiliation.as_deref(),
            Some("University of Gothenburg, Sweden.")
        );
        assert_eq!(authors[1].first_name.as_deref(), Some("P"));
        assert_eq!(authors[2].name, "SWEDEHEART study group");
    }

    #[test]
    fn review_wins_over_journal_article() {
        let xml = XmlDocument::parse(ARTICLE).unwrap();
        assert_eq!(
            PubmedSource.suggest_publication_type(&xml),
            Some("publication_review-article")
        );
    }
}
