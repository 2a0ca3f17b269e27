mod domain;
mod infrastructure;

pub mod test_utils;

// Persisted field names

pub const ID_FIELD_NAME: &str = "id";
pub const PUBLICATION_ID_FIELD_NAME: &str = "publication_id";
pub const PUBLICATION_VERSION_ID_FIELD_NAME: &str = "publication_version_id";
pub const PERSON_ID_FIELD_NAME: &str = "person_id";
pub const DEPARTMENT_ID_FIELD_NAME: &str = "department_id";
pub const PEOPLE2PUBLICATION_ID_FIELD_NAME: &str = "people2publication_id";

pub const CREATED_FIELD_NAME: &str = "created_at";
pub const UPDATED_FIELD_NAME: &str = "updated_at";
pub const PUBLISHED_FIELD_NAME: &str = "published_at";
pub const DELETED_FIELD_NAME: &str = "deleted_at";

pub const CREATED_BY_FIELD_NAME: &str = "created_by";
pub const UPDATED_BY_FIELD_NAME: &str = "updated_by";

// Table names

pub const PUBLICATIONS_TABLE: &str = "publications";
pub const PUBLICATION_VERSIONS_TABLE: &str = "publication_versions";
pub const PUBLICATION_IDENTIFIERS_TABLE: &str = "publication_identifiers";
pub const PEOPLE_TABLE: &str = "people";
pub const DEPARTMENTS_TABLE: &str = "departments";
pub const PEOPLE2PUBLICATIONS_TABLE: &str = "people2publications";
pub const DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE: &str = "departments2people2publications";

// expose domain module

pub use domain::*;
pub use infrastructure::catalog::{IdentifierCodeSettings, load as load_catalog};

// expose database module

pub use infrastructure::database;
