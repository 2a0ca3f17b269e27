use std::fmt::{Debug, Display, Formatter};
use std::sync::LazyLock;

use nutype::nutype;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub mod authorship;
pub mod catalog;
pub mod identifiers;
pub mod people;
pub mod publication;

pub use catalog::{Catalog, IdentifierCode, PublicationType};

/// Database row ids, wrapped to prevent id confusion between tables.
macro_rules! row_id {
    ($($(#[$meta:meta])* $name:ident),+ $(,)?) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
            #[serde(transparent)]
            pub struct $name(pub i64);

            impl From<i64> for $name {
                fn from(value: i64) -> Self {
                    Self(value)
                }
            }

            impl Display for $name {
                fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        )+
    };
}

row_id!(
    /// Identity of a logical publication
    PublicationId,
    /// Identity of one snapshot of a publication
    VersionId,
    PersonId,
    DepartmentId,
    /// Identity of a person-to-publication-version link
    AuthorshipId,
    DepartmentLinkId,
    IdentifierId,
);

// A regex for codes that may contain only lowercase ASCII letters, digits, dash and underscore.
// Example: "publication_journal-article" or "doi" is valid; "Journal Article" is not.
pub const ELIGIBLE_CODE_REGEX: &str = r"^[a-z0-9_-]+$";

static ELIGIBLE_CODE_REGEX_COMPILED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(ELIGIBLE_CODE_REGEX).expect("ELIGIBLE_CODE_REGEX must be a valid regex")
});

pub fn is_eligible_code(code: &str) -> bool {
    ELIGIBLE_CODE_REGEX_COMPILED.is_match(code)
}

/// Code of a publication type, e.g. `publication_journal-article`
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 64, predicate = is_eligible_code),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct TypeCode(String);

/// Code of an external identifier kind, e.g. `doi` or `isbn`
#[nutype(
    sanitize(trim, lowercase),
    validate(not_empty, len_char_max = 20, predicate = is_eligible_code),
    derive(
        Clone,
        Debug,
        Display,
        FromStr,
        AsRef,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Serialize,
        Deserialize
    )
)]
pub struct IdentifierCodeId(String);

/// Locale used for department names and messages.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Sv,
}

impl Locale {
    /// Anything that is not explicitly Swedish falls back to English.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "sv" | "sv-se" | "swe" => Locale::Sv,
            _ => Locale::En,
        }
    }
}
