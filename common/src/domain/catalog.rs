use std::fmt::Debug;

use serde::Serialize;

use crate::domain::{IdentifierCodeId, Locale, TypeCode};

/// Static application configuration: known publication types and the
/// whitelist of identifier codes.
pub trait Catalog: Send + Sync + Debug + 'static {
    /// iterate all publication types
    fn publication_types(&self) -> Box<dyn Iterator<Item = &PublicationType> + '_>;
    /// find publication type by its code
    fn publication_type(&self, code: &str) -> Option<&PublicationType>;
    /// find whitelisted identifier code
    fn identifier_code(&self, code: &str) -> Option<&IdentifierCode>;
}

/// A publication type and the content fields a published record of that type must carry.
#[derive(Clone, Debug, Serialize)]
pub struct PublicationType {
    pub code: TypeCode,
    pub label_en: String,
    pub label_sv: String,
    pub required_fields: Vec<String>,
}

impl PublicationType {
    pub fn label(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.label_en,
            Locale::Sv => &self.label_sv,
        }
    }
}

/// One entry of the identifier code whitelist
#[derive(Clone, Debug, Serialize)]
pub struct IdentifierCode {
    pub code: IdentifierCodeId,
    pub label: String,
}
