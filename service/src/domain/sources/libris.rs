use crate::domain::{
    sources::{ImportedAuthor, SourceAdapter},
    xml::{XmlDocument, XmlElement},
};

/// National library catalog, records in MODS
pub struct LibrisSource;

impl SourceAdapter for LibrisSource {
    fn tag(&self) -> &'static str {
        "libris"
    }

    fn extract_authors(&self, xml: &XmlDocument) -> Vec<ImportedAuthor> {
        xml.select("//mods/name")
            .into_iter()
            .filter(|name| name.attr("type").is_none_or(|t| t == "personal") && is_author(name))
            .filter_map(|name| {
                let parts = name.select("namePart");
                let part = |kind: &str| {
                    parts
                        .iter()
                        .find(|p| p.attr("type") == Some(kind))
                        .map(|p| p.text())
                };
                let imported = match part("family") {
                    Some(family) => ImportedAuthor::new(part("given"), family),
                    None => {
                        let plain = parts.iter().find(|p| p.attr("type").is_none())?;
                        ImportedAuthor::from_name(&plain.text())?
                    }
                };
                Some(imported.with_affiliation(name.value("affiliation")))
            })
            .collect()
    }

    fn suggest_publication_type(&self, xml: &XmlDocument) -> Option<&'static str> {
        let genres = xml
            .select("//mods/genre")
            .iter()
            .map(|g| g.text().trim().to_lowercase())
            .collect::<Vec<_>>();

        if genres.iter().any(|g| g.contains("thesis")) {
            return Some("publication_doctoral-thesis");
        }
        if genres.iter().any(|g| g.contains("conference")) {
            return Some("conference_paper");
        }
        let issuance = xml.value("//mods/originInfo/issuance");
        if genres.iter().any(|g| g == "book")
            || issuance.is_some_and(|i| i.eq_ignore_ascii_case("monographic"))
        {
            return Some("publication_book");
        }
        None
    }
}

/// Names without role are authors; otherwise the role must be `aut` or `author`
fn is_author(name: &XmlElement<'_>) -> bool {
    let roles = name.select("role/roleTerm");
    roles.is_empty()
        || roles.iter().any(|role| {
            let role = role.text();
            let role = role.trim();
            role.eq_ignore_ascii_case("aut") || role.eq_ignore_ascii_case("author")
        })
}
