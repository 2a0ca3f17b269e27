use bibrec_common::{
    DEPARTMENT_ID_FIELD_NAME, DEPARTMENTS_TABLE, DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE,
    PEOPLE_TABLE, PEOPLE2PUBLICATION_ID_FIELD_NAME, PEOPLE2PUBLICATIONS_TABLE,
    PERSON_ID_FIELD_NAME, PUBLICATION_ID_FIELD_NAME, PUBLICATION_IDENTIFIERS_TABLE,
    PUBLICATION_VERSION_ID_FIELD_NAME, PUBLICATION_VERSIONS_TABLE, PUBLICATIONS_TABLE,
    CREATED_BY_FIELD_NAME, DELETED_FIELD_NAME, PUBLISHED_FIELD_NAME, UPDATED_BY_FIELD_NAME,
};

use crate::domain::tables::{Column, ColumnType, Table};

pub mod migration;
pub mod persistence;
pub mod tables;

/// Content columns of a publication version, all nullable text
const VERSION_TEXT_COLUMNS: [&str; 17] = [
    "alt_title",
    "abstract",
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
];

/// Returns the tables of the bibliographic schema, sorted conform dependency order
pub fn schema_tables() -> Vec<Table> {
    vec![
        publications_table(),
        publication_versions_table(),
        publication_identifiers_table(),
        people_table(),
        departments_table(),
        people2publications_table(),
        departments2people2publications_table(),
    ]
}

fn publications_table() -> Table {
    // current_version_id has no foreign key: versions reference their publication
    Table::new(PUBLICATIONS_TABLE)
        .column(Column::new("current_version_id", ColumnType::BigInt))
        .column(Column::new(PUBLISHED_FIELD_NAME, ColumnType::TimestampTZ))
        .column(Column::new(DELETED_FIELD_NAME, ColumnType::TimestampTZ))
        .timestamps()
}

fn publication_versions_table() -> Table {
    let mut table = Table::new(PUBLICATION_VERSIONS_TABLE)
        .reference(PUBLICATION_ID_FIELD_NAME, PUBLICATIONS_TABLE)
        .column(Column::new("title", ColumnType::Text).not_null())
        .column(Column::new("pubyear", ColumnType::Integer));
    for name in VERSION_TEXT_COLUMNS {
        table = table.column(Column::new(name, ColumnType::Text));
    }
    table
        .timestamps()
        .column(Column::new(CREATED_BY_FIELD_NAME, ColumnType::Text))
        .column(Column::new(UPDATED_BY_FIELD_NAME, ColumnType::Text))
}

fn publication_identifiers_table() -> Table {
    Table::new(PUBLICATION_IDENTIFIERS_TABLE)
        .reference(PUBLICATION_VERSION_ID_FIELD_NAME, PUBLICATION_VERSIONS_TABLE)
        .column(Column::new("identifier_code", ColumnType::Varchar(20)).not_null())
        .column(Column::new("identifier_value", ColumnType::Text).not_null())
        .timestamps()
}

fn people_table() -> Table {
    Table::new(PEOPLE_TABLE)
        .column(Column::new("first_name", ColumnType::Text))
        .column(Column::new("last_name", ColumnType::Text).not_null())
        .column(Column::new("year_of_birth", ColumnType::Integer))
        .column(
            Column::new("affiliated", ColumnType::Boolean)
                .not_null()
                .default_value("false"),
        )
        .timestamps()
}

fn departments_table() -> Table {
    Table::new(DEPARTMENTS_TABLE)
        .column(Column::new("name_sv", ColumnType::Text).not_null())
        .column(Column::new("name_en", ColumnType::Text).not_null())
        .column(Column::new("start_year", ColumnType::Integer))
        .column(Column::new("end_year", ColumnType::Integer))
        .timestamps()
}

fn people2publications_table() -> Table {
    Table::new(PEOPLE2PUBLICATIONS_TABLE)
        .reference(PERSON_ID_FIELD_NAME, PEOPLE_TABLE)
        .reference(PUBLICATION_VERSION_ID_FIELD_NAME, PUBLICATION_VERSIONS_TABLE)
        .column(Column::new("position", ColumnType::Integer).not_null())
        .column(Column::new("reviewed_at", ColumnType::TimestampTZ))
        .column(Column::new(
            "reviewed_publication_version_id",
            ColumnType::BigInt,
        ))
        .timestamps()
        .unique_index(vec![PERSON_ID_FIELD_NAME, PUBLICATION_VERSION_ID_FIELD_NAME])
}

fn departments2people2publications_table() -> Table {
    Table::new(DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE)
        .reference(PEOPLE2PUBLICATION_ID_FIELD_NAME, PEOPLE2PUBLICATIONS_TABLE)
        .reference(DEPARTMENT_ID_FIELD_NAME, DEPARTMENTS_TABLE)
        .column(Column::new("position", ColumnType::Integer).not_null())
        .timestamps()
}
