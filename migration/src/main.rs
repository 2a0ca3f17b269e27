use tracing_subscriber::EnvFilter;

use crate::{
    domain::migration::Migration,
    infrastructure::{persistence::PersistenceAdapter, settings::Settings},
};
use bibrec_common::database;

pub mod domain;
pub mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = Settings::from_env()?;
    tracing::info!("Configuration loaded");

    let database = database::connect(&settings.database).await?;
    let persistence = PersistenceAdapter::new(database);

    // create the tables of the bibliographic schema that are missing
    let migration = Migration::new(persistence);
    let created = migration.migrate().await?;
    tracing::info!("Schema migrated, {} tables created", created);

    Ok(())
}
