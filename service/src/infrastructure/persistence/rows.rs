use bibrec_common::{
    authorship::{Authorship, DepartmentLink},
    identifiers::PublicationIdentifier,
    people::{Department, Person},
    publication::{Publication, PublicationVersion, VersionContent},
};
use sqlx::{Row, postgres::PgRow};

/// Builds a domain value out of one result row
pub trait FromPgRow: Sized {
    /// Columns to select, in the same order `from_row` reads them
    const COLUMNS: &'static [&'static str];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error>;
}

impl FromPgRow for Publication {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "published_at",
        "deleted_at",
        "current_version_id",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            published_at: row.try_get("published_at")?,
            deleted_at: row.try_get("deleted_at")?,
            current_version_id: row.try_get::<i64, _>("current_version_id")?.into(),
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Identifiers are loaded separately and start out empty
impl FromPgRow for PublicationVersion {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "publication_id",
        "title",
        "alt_title",
        "abstract",
        "pubyear",
        "publication_type",
        "publanguage",
        "sourcetitle",
        "sourcevolume",
        "sourceissue",
        "sourcepages",
        "publisher",
        "place",
        "isbn",
        "issn",
        "keywords",
        "url",
        "xml",
        "datasource",
        "sourceid",
        "created_at",
        "created_by",
        "updated_at",
        "updated_by",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        let content = VersionContent {
            title: row.try_get("title")?,
            alt_title: row.try_get("alt_title")?,
            abstract_text: row.try_get("abstract")?,
            pubyear: row.try_get("pubyear")?,
            publication_type: row.try_get("publication_type")?,
            publanguage: row.try_get("publanguage")?,
            sourcetitle: row.try_get("sourcetitle")?,
            sourcevolume: row.try_get("sourcevolume")?,
            sourceissue: row.try_get("sourceissue")?,
            sourcepages: row.try_get("sourcepages")?,
            publisher: row.try_get("publisher")?,
            place: row.try_get("place")?,
            isbn: row.try_get("isbn")?,
            issn: row.try_get("issn")?,
            keywords: row.try_get("keywords")?,
            url: row.try_get("url")?,
            xml: row.try_get("xml")?,
            datasource: row.try_get("datasource")?,
            sourceid: row.try_get("sourceid")?,
        };
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            publication_id: row.try_get::<i64, _>("publication_id")?.into(),
            content,
            identifiers: Vec::new(),
            created_at: row.try_get("created_at")?,
            created_by: row.try_get("created_by")?,
            updated_at: row.try_get("updated_at")?,
            updated_by: row.try_get("updated_by")?,
        })
    }
}

impl FromPgRow for PublicationIdentifier {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "publication_version_id",
        "identifier_code",
        "identifier_value",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            publication_version_id: row.try_get::<i64, _>("publication_version_id")?.into(),
            identifier_code: row.try_get("identifier_code")?,
            identifier_value: row.try_get("identifier_value")?,
        })
    }
}

impl FromPgRow for Person {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "first_name",
        "last_name",
        "year_of_birth",
        "affiliated",
        "created_at",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            first_name: row.try_get("first_name")?,
            last_name: row.try_get("last_name")?,
            year_of_birth: row.try_get("year_of_birth")?,
            affiliated: row.try_get("affiliated")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

impl FromPgRow for Department {
    const COLUMNS: &'static [&'static str] = &["id", "name_sv", "name_en", "start_year", "end_year"];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            name_sv: row.try_get("name_sv")?,
            name_en: row.try_get("name_en")?,
            start_year: row.try_get("start_year")?,
            end_year: row.try_get("end_year")?,
        })
    }
}

impl FromPgRow for Authorship {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "person_id",
        "publication_version_id",
        "position",
        "reviewed_at",
        "reviewed_publication_version_id",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            person_id: row.try_get::<i64, _>("person_id")?.into(),
            publication_version_id: row.try_get::<i64, _>("publication_version_id")?.into(),
            position: row.try_get("position")?,
            reviewed_at: row.try_get("reviewed_at")?,
            reviewed_publication_version_id: row
                .try_get::<Option<i64>, _>("reviewed_publication_version_id")?
                .map(Into::into),
        })
    }
}

impl FromPgRow for DepartmentLink {
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "people2publication_id",
        "department_id",
        "position",
        "updated_at",
    ];

    fn from_row(row: &PgRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get::<i64, _>("id")?.into(),
            authorship_id: row.try_get::<i64, _>("people2publication_id")?.into(),
            department_id: row.try_get::<i64, _>("department_id")?.into(),
            position: row.try_get("position")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}
