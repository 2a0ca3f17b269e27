use serde::{Deserialize, Serialize};

use crate::domain::{Catalog, IdentifierId, VersionId};

/// An external identifier (DOI, ISBN, ...) attached to a publication version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicationIdentifier {
    pub id: IdentifierId,
    pub publication_version_id: VersionId,
    pub identifier_code: String,
    pub identifier_value: String,
}

impl PublicationIdentifier {
    /// Display label of the code, taken from configuration
    pub fn label<'c>(&self, catalog: &'c dyn Catalog) -> Option<&'c str> {
        catalog
            .identifier_code(&self.identifier_code)
            .map(|code| code.label.as_str())
    }
}

/// Identifier data before it is attached to a version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIdentifier {
    pub identifier_code: String,
    pub identifier_value: String,
}

impl NewIdentifier {
    pub fn new(code: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            identifier_code: code.into(),
            identifier_value: value.into(),
        }
    }

    /// Returns the validation errors of this identifier, empty when valid.
    pub fn validate(&self, catalog: &dyn Catalog) -> Vec<String> {
        let mut errors = Vec::new();
        let code = self.identifier_code.trim();
        if code.is_empty() {
            errors.push("identifier_code: can't be blank".to_string());
        } else if catalog.identifier_code(code).is_none() {
            errors.push(format!("identifier_code: {} is not included in the list", code));
        }
        if self.identifier_value.trim().is_empty() {
            errors.push("identifier_value: can't be blank".to_string());
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::make_catalog;

    #[test]
    fn whitelisted_identifier_is_valid() {
        let catalog = make_catalog();
        let identifier = NewIdentifier::new("doi", "10.1000/182");
        assert!(identifier.validate(catalog).is_empty());
    }

    #[test]
    fn unknown_code_and_blank_value_are_reported() {
        let catalog = make_catalog();
        let identifier = NewIdentifier::new("orcid", " ");
        let errors = identifier.validate(catalog);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("orcid"));
    }

    #[test]
    fn label_comes_from_configuration() {
        let catalog = make_catalog();
        let identifier = PublicationIdentifier {
            id: IdentifierId(1),
            publication_version_id: VersionId(1),
            identifier_code: "isbn".to_string(),
            identifier_value: "978-91-7346-000-0".to_string(),
        };
        assert_eq!(identifier.label(catalog), Some("ISBN"));
    }
}
