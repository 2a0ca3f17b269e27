use crate::domain::repository::RepositoryError;

#[cfg(test)]
pub mod memory;
mod query;
mod repository;
mod rows;
mod schema;

pub use repository::PostgresRepository;

impl From<sqlx::Error> for RepositoryError {
    fn from(value: sqlx::Error) -> Self {
        match &value {
            sqlx::Error::RowNotFound => RepositoryError::NotFound,
            sqlx::Error::Database(e) if e.is_unique_violation() => {
                RepositoryError::UniqueViolation(e.message().to_string())
            }
            sqlx::Error::Database(e) if e.is_foreign_key_violation() || e.is_check_violation() => {
                RepositoryError::ValidationFailed(e.message().to_string())
            }
            _ => RepositoryError::DatabaseError(value.to_string()),
        }
    }
}
