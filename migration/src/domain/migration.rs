use std::collections::HashSet;

use crate::domain::{
    persistence::Persistence,
    schema_tables,
    tables::{Column, ForeignKeyConstraint, Index, Table},
};

pub struct Migration<P: Persistence> {
    tables: Vec<Table>,
    persistence: P,
}

impl<P: Persistence> Migration<P> {
    pub fn new(persistence: P) -> Self {
        Self {
            tables: schema_tables(),
            persistence,
        }
    }

    /// Creates every table of the schema that does not exist yet
    pub async fn migrate(&self) -> Result<usize, anyhow::Error> {
        let actual_schema = self.persistence.load().await?;
        let steps = migration_steps(
            self.persistence.database_schema(),
            &self.tables,
            &actual_schema,
        );
        let count = steps.len();
        tracing::info!("{} tables to create", count);
        self.persistence.apply_migration_steps(steps).await?;
        Ok(count)
    }
}

/// A group of DDL statements executed in one transaction
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationStep {
    ctx: &'static str,
    ddls: Vec<String>,
}

impl MigrationStep {
    fn create_table(database_schema: &str, table: &Table) -> Self {
        Self {
            ctx: "CREATE TABLE",
            ddls: create_table_ddl(database_schema, table),
        }
    }

    pub fn ctx(&self) -> &'static str {
        self.ctx
    }

    pub fn ddls(self) -> Vec<String> {
        self.ddls
    }
}

pub fn migration_steps(
    database_schema: &str,
    needed_schema: &[Table],
    actual_schema: &HashSet<String>,
) -> Vec<MigrationStep> {
    needed_schema
        .iter()
        .filter(|table| !actual_schema.contains(&table.name))
        .map(|table| MigrationStep::create_table(database_schema, table))
        .collect()
}

fn create_table_ddl(schema: &str, table: &Table) -> Vec<String> {
    let mut columns = Vec::new();
    let mut pk_columns = Vec::new();

    for column in table.columns.iter() {
        columns.push(column_ddl(column));
        if column.primary_key {
            pk_columns.push(&column.name as &str);
        }
    }

    let columns_sql = columns.join(",\n    ");
    let pk_columns_sql = pk_columns.join(",");

    let table_ddl = format!(
        "CREATE TABLE \"{}\".\"{}\" (\n    {},\n    PRIMARY KEY({})\n)",
        schema, table.name, columns_sql, pk_columns_sql
    );

    let mut ddls = vec![table_ddl];

    for fk in table.foreign_keys.iter() {
        ddls.push(create_fk_ddl(schema, fk));
    }

    for index in table.indexes.iter() {
        ddls.push(create_index_ddl(schema, index));
    }

    ddls
}

fn column_ddl(column: &Column) -> String {
    let mut sql = format!("\"{}\" {}", column.name, column.column_type);
    if column.not_null {
        sql.push_str(" NOT NULL");
    }
    if let Some(default_value) = &column.default_value {
        sql.push_str(&format!(" DEFAULT {}", default_value));
    }
    if column.unique {
        sql.push_str(" UNIQUE");
    }
    sql
}

fn create_fk_ddl(schema: &str, fk: &ForeignKeyConstraint) -> String {
    format!(
        "ALTER TABLE \"{}\".\"{}\" ADD CONSTRAINT \"{}_{}_fkey\" FOREIGN KEY (\"{}\") REFERENCES \"{}\".\"{}\" (\"{}\") ON DELETE CASCADE",
        schema,
        fk.table_name,
        fk.table_name,
        fk.column_name,
        fk.column_name,
        schema,
        fk.referenced_table_name,
        fk.referenced_column_name
    )
}

fn create_index_ddl(schema: &str, index: &Index) -> String {
    let columns_sql = index
        .columns
        .iter()
        .map(|c| format!("\"{}\"", c))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "CREATE {}INDEX \"{}_{}_idx\" ON \"{}\".\"{}\" ({})",
        if index.unique { "UNIQUE " } else { "" },
        index.table_name,
        index.columns.join("_"),
        schema,
        index.table_name,
        columns_sql
    )
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::domain::tables::ColumnType;

    #[derive(Clone, Default)]
    struct RecordingPersistence {
        existing: HashSet<String>,
        applied: Arc<Mutex<Vec<String>>>,
    }

    impl Persistence for RecordingPersistence {
        async fn load(&self) -> Result<HashSet<String>, anyhow::Error> {
            Ok(self.existing.clone())
        }

        async fn apply_migration_steps(
            &self,
            steps: Vec<MigrationStep>,
        ) -> Result<(), anyhow::Error> {
            let mut applied = self.applied.lock().unwrap();
            for step in steps {
                applied.extend(step.ddls());
            }
            Ok(())
        }

        fn database_schema(&self) -> &str {
            "public"
        }
    }

    #[test]
    fn table_ddl_with_foreign_key_and_index() {
        let table = Table::new("people2publications")
            .reference("person_id", "people")
            .column(Column::new("position", ColumnType::Integer).not_null());

        let ddls = create_table_ddl("public", &table);

        assert_eq!(
            ddls[0],
            "CREATE TABLE \"public\".\"people2publications\" (\n    \"id\" BIGSERIAL,\n    \"person_id\" BIGINT NOT NULL,\n    \"position\" INTEGER NOT NULL,\n    PRIMARY KEY(id)\n)"
        );
        assert_eq!(
            ddls[1],
            "ALTER TABLE \"public\".\"people2publications\" ADD CONSTRAINT \"people2publications_person_id_fkey\" FOREIGN KEY (\"person_id\") REFERENCES \"public\".\"people\" (\"id\") ON DELETE CASCADE"
        );
        assert_eq!(
            ddls[2],
            "CREATE INDEX \"people2publications_person_id_idx\" ON \"public\".\"people2publications\" (\"person_id\")"
        );
    }

    #[test]
    fn unique_index_ddl() {
        let index = Index::new("people2publications", vec!["person_id", "publication_version_id"], true);
        assert_eq!(
            create_index_ddl("public", &index),
            "CREATE UNIQUE INDEX \"people2publications_person_id_publication_version_id_idx\" ON \"public\".\"people2publications\" (\"person_id\", \"publication_version_id\")"
        );
    }

    #[test]
    fn existing_tables_are_skipped() {
        let existing = HashSet::from(["publications".to_string(), "people".to_string()]);
        let steps = migration_steps("public", &schema_tables(), &existing);
        assert_eq!(steps.len(), schema_tables().len() - 2);
        assert!(steps.iter().all(|step| step.ctx() == "CREATE TABLE"));
    }

    #[tokio::test]
    async fn migrate_applies_missing_tables_only() {
        let persistence = RecordingPersistence {
            existing: HashSet::from(["departments".to_string()]),
            ..Default::default()
        };
        let migration = Migration::new(persistence.clone());

        let created = migration.migrate().await.unwrap();

        assert_eq!(created, 6);
        let applied = persistence.applied.lock().unwrap();
        assert!(applied.iter().any(|ddl| ddl.starts_with("CREATE TABLE \"public\".\"publications\"")));
        assert!(!applied.iter().any(|ddl| ddl.starts_with("CREATE TABLE \"public\".\"departments\"")));
    }
}
