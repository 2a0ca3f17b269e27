use std::collections::HashSet;

use crate::domain::migration::MigrationStep;

pub trait Persistence: Send + Sync + Clone + 'static {
    /// load names of the existing tables from database
    fn load(&self) -> impl Future<Output = Result<HashSet<String>, anyhow::Error>> + Send;
    /// apply migration steps to database, one transaction per step
    fn apply_migration_steps(
        &self,
        steps: Vec<MigrationStep>,
    ) -> impl Future<Output = Result<(), anyhow::Error>> + Send;
    /// extract database schema
    fn database_schema(&self) -> &str;
}
