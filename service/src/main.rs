use bibrec_common::{database, load_catalog};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::domain::sources::SourceRegistry;
use crate::infrastructure::AppStateImpl;
use crate::infrastructure::http::{HttpServer, HttpServerConfig};
use crate::infrastructure::persistence::PostgresRepository;
use crate::infrastructure::settings::Settings;

mod domain;
mod infrastructure;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = load_catalog(&settings.catalog_config_path, &settings.identifier_codes)?;
    tracing::info!("Configuration loaded");

    let database = database::connect(&settings.database).await?;
    tracing::info!("Connected to DB");

    let sources: &'static SourceRegistry = Box::leak(Box::new(SourceRegistry::with_known_sources()));
    let repository = PostgresRepository::new(database);

    let state = AppStateImpl::new(repository, catalog, sources);

    let server_config = HttpServerConfig {
        port: &settings.server_port,
    };
    let http_server = HttpServer::new(state, server_config).await?;
    http_server.run().await
}
