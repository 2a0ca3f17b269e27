use bibrec_common::{
    AuthorshipId, CREATED_FIELD_NAME, DELETED_FIELD_NAME, DEPARTMENT_ID_FIELD_NAME,
    DEPARTMENTS_TABLE, DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE, DepartmentId, ID_FIELD_NAME,
    PEOPLE_TABLE, PEOPLE2PUBLICATION_ID_FIELD_NAME, PEOPLE2PUBLICATIONS_TABLE,
    PERSON_ID_FIELD_NAME, PUBLICATION_ID_FIELD_NAME, PUBLICATION_IDENTIFIERS_TABLE,
    PUBLICATION_VERSION_ID_FIELD_NAME, PUBLICATION_VERSIONS_TABLE, PUBLICATIONS_TABLE,
    PUBLISHED_FIELD_NAME, PersonId, PublicationId, UPDATED_FIELD_NAME, VersionId,
    authorship::{Authorship, DepartmentLink, NewAuthorship},
    database::Database,
    identifiers::{NewIdentifier, PublicationIdentifier},
    people::{Department, Person},
    publication::{NewPublication, NewVersion, Publication, PublicationVersion, VersionContent},
};
use chrono::{DateTime, Utc};
use itertools::Itertools;
use sqlx::PgConnection;

use crate::{
    domain::{
        publications::PublicationRecord,
        repository::{Repository, RepositoryError},
    },
    infrastructure::persistence::{
        query::{Condition, QueryBuilder, SortDirection},
        rows::FromPgRow,
        schema::Table,
    },
};

#[derive(Clone)]
pub struct PostgresRepository {
    database: &'static Database,
}

impl PostgresRepository {
    pub fn new(database: &'static Database) -> Self {
        Self { database }
    }

    fn table(&self, name: &'static str, alias: &'static str) -> Table<'static> {
        Table::new(self.database.database_schema(), name, alias)
    }

    /// Schema qualified name for INSERT and UPDATE statements
    fn table_name(&self, name: &'static str) -> String {
        self.table(name, "t").name()
    }

    /// Query selecting every column of `T`
    fn select<T: FromPgRow>(&self, table: Table<'static>) -> QueryBuilder<'static> {
        QueryBuilder::from(table).select(table.columns(T::COLUMNS))
    }

    async fn fetch_all<T: FromPgRow + Send>(
        &self,
        query_builder: QueryBuilder<'_>,
    ) -> Result<Vec<T>, RepositoryError> {
        let (sql, params) = query_builder.build();
        tracing::debug!("Generated SQL: {}", sql);

        let mut query_object = sqlx::query(&sql);
        for param in params {
            query_object = param.bind_to_query(query_object);
        }

        let rows = query_object
            .fetch_all(self.database.database_pool())
            .await?;

        rows.iter()
            .map(T::from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(RepositoryError::from)
    }

    async fn fetch_optional<T: FromPgRow + Send>(
        &self,
        query_builder: QueryBuilder<'_>,
    ) -> Result<Option<T>, RepositoryError> {
        Ok(self
            .fetch_all(query_builder.limit(1))
            .await?
            .into_iter()
            .next())
    }

    async fn load_identifiers(
        &self,
        mut version: PublicationVersion,
    ) -> Result<PublicationVersion, RepositoryError> {
        let table = self.table(PUBLICATION_IDENTIFIERS_TABLE, "i");
        let query_builder = self
            .select::<PublicationIdentifier>(table)
            .where_condition(Condition::equals(
                table.column(PUBLICATION_VERSION_ID_FIELD_NAME),
                version.id.0,
            ))
            .order_by(table.column(ID_FIELD_NAME), SortDirection::Ascending);

        version.identifiers = self.fetch_all(query_builder).await?;
        Ok(version)
    }

    /// Inserts a version with its identifiers and makes it the current version
    async fn insert_current_version(
        &self,
        connection: &mut PgConnection,
        publication_id: PublicationId,
        content: VersionContent,
        identifiers: Vec<NewIdentifier>,
        username: String,
    ) -> Result<(Publication, PublicationVersion), RepositoryError> {
        let now = Utc::now();

        // every version column except the id, in FromPgRow order
        let columns = &PublicationVersion::COLUMNS[1..];
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
            self.table_name(PUBLICATION_VERSIONS_TABLE),
            quoted(columns),
            (1..=columns.len()).map(|i| format!("${}", i)).join(", "),
            quoted(PublicationVersion::COLUMNS)
        );
        tracing::debug!("Generated SQL: {}", sql);

        let row = sqlx::query(&sql)
            .bind(publication_id.0)
            .bind(content.title)
            .bind(content.alt_title)
            .bind(content.abstract_text)
            .bind(content.pubyear)
            .bind(content.publication_type)
            .bind(content.publanguage)
            .bind(content.sourcetitle)
            .bind(content.sourcevolume)
            .bind(content.sourceissue)
            .bind(content.sourcepages)
            .bind(content.publisher)
            .bind(content.place)
            .bind(content.isbn)
            .bind(content.issn)
            .bind(content.keywords)
            .bind(content.url)
            .bind(content.xml)
            .bind(content.datasource)
            .bind(content.sourceid)
            .bind(now)
            .bind(username.clone())
            .bind(now)
            .bind(username)
            .fetch_one(&mut *connection)
            .await?;
        let mut version = PublicationVersion::from_row(&row)?;

        let sql = format!(
            "INSERT INTO {} (\"{}\", \"identifier_code\", \"identifier_value\", \"{}\", \"{}\") \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            self.table_name(PUBLICATION_IDENTIFIERS_TABLE),
            PUBLICATION_VERSION_ID_FIELD_NAME,
            CREATED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            quoted(PublicationIdentifier::COLUMNS)
        );
        for identifier in identifiers {
            let row = sqlx::query(&sql)
                .bind(version.id.0)
                .bind(identifier.identifier_code.trim().to_string())
                .bind(identifier.identifier_value.trim().to_string())
                .bind(now)
                .fetch_one(&mut *connection)
                .await?;
            version.identifiers.push(PublicationIdentifier::from_row(&row)?);
        }

        let sql = format!(
            "UPDATE {} SET \"current_version_id\" = $1, \"{}\" = $2 \
             WHERE \"{}\" = $3 AND \"{}\" IS NULL RETURNING {}",
            self.table_name(PUBLICATIONS_TABLE),
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME,
            DELETED_FIELD_NAME,
            quoted(Publication::COLUMNS)
        );
        let row = sqlx::query(&sql)
            .bind(version.id.0)
            .bind(now)
            .bind(publication_id.0)
            .fetch_optional(&mut *connection)
            .await?
            .ok_or(RepositoryError::NotFound)?;
        let publication = Publication::from_row(&row)?;

        Ok((publication, version))
    }

    /// Runs an UPDATE ... RETURNING and maps the single updated row
    async fn update_one<T: FromPgRow + Send>(
        &self,
        sql: &str,
        query_object: sqlx::query::Query<'_, sqlx::Postgres, sqlx::postgres::PgArguments>,
    ) -> Result<T, RepositoryError> {
        tracing::debug!("Generated SQL: {}", sql);
        let row = query_object
            .fetch_optional(self.database.database_pool())
            .await?
            .ok_or(RepositoryError::NotFound)?;
        Ok(T::from_row(&row)?)
    }
}

fn quoted(columns: &[&str]) -> String {
    columns.iter().map(|c| format!("\"{}\"", c)).join(", ")
}

impl Repository for PostgresRepository {
    async fn find_publication(
        &self,
        id: PublicationId,
    ) -> Result<Option<Publication>, RepositoryError> {
        let table = self.table(PUBLICATIONS_TABLE, "p");
        let query_builder = self
            .select::<Publication>(table)
            .where_condition(Condition::equals(table.column(ID_FIELD_NAME), id.0))
            .where_condition(Condition::IsNull {
                column: table.column(DELETED_FIELD_NAME),
            });
        self.fetch_optional(query_builder).await
    }

    async fn find_version(
        &self,
        publication_id: PublicationId,
        version_id: VersionId,
    ) -> Result<Option<PublicationVersion>, RepositoryError> {
        let table = self.table(PUBLICATION_VERSIONS_TABLE, "v");
        let query_builder = self
            .select::<PublicationVersion>(table)
            .where_condition(Condition::equals(table.column(ID_FIELD_NAME), version_id.0))
            .where_condition(Condition::equals(
                table.column(PUBLICATION_ID_FIELD_NAME),
                publication_id.0,
            ));

        match self.fetch_optional(query_builder).await? {
            Some(version) => Ok(Some(self.load_identifiers(version).await?)),
            None => Ok(None),
        }
    }

    async fn create_publications(
        &self,
        publications: Vec<NewPublication>,
    ) -> Result<Vec<PublicationRecord>, RepositoryError> {
        let mut transaction = self.database.database_pool().begin().await?;

        let sql = format!(
            "INSERT INTO {} (\"{}\", \"{}\", \"{}\") VALUES ($1, $2, $2) RETURNING \"{}\"",
            self.table_name(PUBLICATIONS_TABLE),
            PUBLISHED_FIELD_NAME,
            CREATED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME
        );

        let mut records = Vec::with_capacity(publications.len());
        for new_publication in publications {
            let id: i64 = sqlx::query_scalar(&sql)
                .bind(new_publication.published_at)
                .bind(Utc::now())
                .fetch_one(&mut *transaction)
                .await?;

            let (publication, version) = self
                .insert_current_version(
                    &mut transaction,
                    PublicationId(id),
                    new_publication.content,
                    new_publication.identifiers,
                    new_publication.created_by,
                )
                .await?;
            records.push(PublicationRecord {
                publication,
                version,
            });
        }

        transaction.commit().await?;
        tracing::debug!("{} publications created", records.len());

        Ok(records)
    }

    async fn create_version(
        &self,
        publication_id: PublicationId,
        version: NewVersion,
    ) -> Result<PublicationVersion, RepositoryError> {
        let mut transaction = self.database.database_pool().begin().await?;
        let (_, version) = self
            .insert_current_version(
                &mut transaction,
                publication_id,
                version.content,
                version.identifiers,
                version.updated_by,
            )
            .await?;
        transaction.commit().await?;

        Ok(version)
    }

    async fn set_published(
        &self,
        id: PublicationId,
        published_at: DateTime<Utc>,
    ) -> Result<Publication, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET \"{}\" = $1, \"{}\" = $1 WHERE \"{}\" = $2 AND \"{}\" IS NULL RETURNING {}",
            self.table_name(PUBLICATIONS_TABLE),
            PUBLISHED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME,
            DELETED_FIELD_NAME,
            quoted(Publication::COLUMNS)
        );
        let query_object = sqlx::query(&sql).bind(published_at).bind(id.0);
        self.update_one(&sql, query_object).await
    }

    async fn mark_deleted(
        &self,
        id: PublicationId,
        deleted_at: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET \"{}\" = $1, \"{}\" = $1 WHERE \"{}\" = $2 AND \"{}\" IS NULL",
            self.table_name(PUBLICATIONS_TABLE),
            DELETED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME,
            DELETED_FIELD_NAME
        );
        tracing::debug!("Generated SQL: {}", sql);

        let result = sqlx::query(&sql)
            .bind(deleted_at)
            .bind(id.0)
            .execute(self.database.database_pool())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_person(&self, id: PersonId) -> Result<Option<Person>, RepositoryError> {
        let table = self.table(PEOPLE_TABLE, "pe");
        let query_builder = self
            .select::<Person>(table)
            .where_condition(Condition::equals(table.column(ID_FIELD_NAME), id.0));
        self.fetch_optional(query_builder).await
    }

    async fn mark_affiliated(&self, id: PersonId) -> Result<(), RepositoryError> {
        let sql = format!(
            "UPDATE {} SET \"affiliated\" = TRUE, \"{}\" = $1 WHERE \"{}\" = $2",
            self.table_name(PEOPLE_TABLE),
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME
        );
        tracing::debug!("Generated SQL: {}", sql);

        sqlx::query(&sql)
            .bind(Utc::now())
            .bind(id.0)
            .execute(self.database.database_pool())
            .await?;
        Ok(())
    }

    async fn find_departments(
        &self,
        ids: &[DepartmentId],
    ) -> Result<Vec<Department>, RepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let table = self.table(DEPARTMENTS_TABLE, "d");
        let query_builder = self
            .select::<Department>(table)
            .where_condition(Condition::In {
                column: table.column(ID_FIELD_NAME),
                values: ids.iter().map(|id| id.0).collect(),
            })
            .order_by(table.column(ID_FIELD_NAME), SortDirection::Ascending);
        self.fetch_all(query_builder).await
    }

    async fn create_authorship(
        &self,
        authorship: NewAuthorship,
    ) -> Result<Authorship, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} ({}, \"{}\", \"{}\") VALUES ($1, $2, $3, $4, $5, $6, $6) RETURNING {}",
            self.table_name(PEOPLE2PUBLICATIONS_TABLE),
            quoted(&Authorship::COLUMNS[1..]),
            CREATED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            quoted(Authorship::COLUMNS)
        );
        tracing::debug!("Generated SQL: {}", sql);

        let row = sqlx::query(&sql)
            .bind(authorship.person_id.0)
            .bind(authorship.publication_version_id.0)
            .bind(authorship.position)
            .bind(authorship.reviewed_at)
            .bind(authorship.reviewed_publication_version_id.map(|id| id.0))
            .bind(Utc::now())
            .fetch_one(self.database.database_pool())
            .await?;
        Ok(Authorship::from_row(&row)?)
    }

    async fn create_department_link(
        &self,
        authorship_id: AuthorshipId,
        department_id: DepartmentId,
        position: i32,
    ) -> Result<DepartmentLink, RepositoryError> {
        let sql = format!(
            "INSERT INTO {} (\"{}\", \"{}\", \"position\", \"{}\", \"{}\") \
             VALUES ($1, $2, $3, $4, $4) RETURNING {}",
            self.table_name(DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE),
            PEOPLE2PUBLICATION_ID_FIELD_NAME,
            DEPARTMENT_ID_FIELD_NAME,
            CREATED_FIELD_NAME,
            UPDATED_FIELD_NAME,
            quoted(DepartmentLink::COLUMNS)
        );
        tracing::debug!("Generated SQL: {}", sql);

        let row = sqlx::query(&sql)
            .bind(authorship_id.0)
            .bind(department_id.0)
            .bind(position)
            .bind(Utc::now())
            .fetch_one(self.database.database_pool())
            .await?;
        Ok(DepartmentLink::from_row(&row)?)
    }

    async fn find_authorship(
        &self,
        person_id: PersonId,
        version_id: VersionId,
    ) -> Result<Option<Authorship>, RepositoryError> {
        let table = self.table(PEOPLE2PUBLICATIONS_TABLE, "pp");
        let query_builder = self
            .select::<Authorship>(table)
            .where_condition(Condition::equals(table.column(PERSON_ID_FIELD_NAME), person_id.0))
            .where_condition(Condition::equals(
                table.column(PUBLICATION_VERSION_ID_FIELD_NAME),
                version_id.0,
            ));
        self.fetch_optional(query_builder).await
    }

    async fn find_authorships(
        &self,
        version_id: VersionId,
    ) -> Result<Vec<Authorship>, RepositoryError> {
        let table = self.table(PEOPLE2PUBLICATIONS_TABLE, "pp");
        let query_builder = self
            .select::<Authorship>(table)
            .where_condition(Condition::equals(
                table.column(PUBLICATION_VERSION_ID_FIELD_NAME),
                version_id.0,
            ))
            .order_by(table.column("position"), SortDirection::Ascending);
        self.fetch_all(query_builder).await
    }

    async fn find_department_links(
        &self,
        authorship_id: AuthorshipId,
    ) -> Result<Vec<DepartmentLink>, RepositoryError> {
        let table = self.table(DEPARTMENTS2PEOPLE2PUBLICATIONS_TABLE, "dp");
        let query_builder = self
            .select::<DepartmentLink>(table)
            .where_condition(Condition::equals(
                table.column(PEOPLE2PUBLICATION_ID_FIELD_NAME),
                authorship_id.0,
            ))
            .order_by(table.column(UPDATED_FIELD_NAME), SortDirection::Descending)
            .order_by(table.column(ID_FIELD_NAME), SortDirection::Descending);
        self.fetch_all(query_builder).await
    }

    async fn mark_reviewed(
        &self,
        authorship_id: AuthorshipId,
        reviewed_at: DateTime<Utc>,
        reviewed_version_id: VersionId,
    ) -> Result<Authorship, RepositoryError> {
        let sql = format!(
            "UPDATE {} SET \"reviewed_at\" = $1, \"reviewed_publication_version_id\" = $2, \"{}\" = $1 \
             WHERE \"{}\" = $3 RETURNING {}",
            self.table_name(PEOPLE2PUBLICATIONS_TABLE),
            UPDATED_FIELD_NAME,
            ID_FIELD_NAME,
            quoted(Authorship::COLUMNS)
        );
        let query_object = sqlx::query(&sql)
            .bind(reviewed_at)
            .bind(reviewed_version_id.0)
            .bind(authorship_id.0);
        self.update_one(&sql, query_object).await
    }
}
