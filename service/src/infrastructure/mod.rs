use bibrec_common::Catalog;

use crate::domain::{AppState, repository::Repository, sources::SourceRegistry};

pub mod http;
pub mod persistence;
pub mod settings;

#[derive(Clone)]
pub struct AppStateImpl<R: Repository> {
    repository: R,
    catalog: &'static dyn Catalog,
    sources: &'static SourceRegistry,
}

impl<R: Repository> AppStateImpl<R> {
    pub fn new(
        repository: R,
        catalog: &'static dyn Catalog,
        sources: &'static SourceRegistry,
    ) -> Self {
        Self {
            repository,
            catalog,
            sources,
        }
    }
}

impl<R: Repository> AppState for AppStateImpl<R> {
    type R = R;

    fn repository(&self) -> &Self::R {
        &self.repository
    }

    fn catalog(&self) -> &'static dyn Catalog {
        self.catalog
    }

    fn sources(&self) -> &'static SourceRegistry {
        self.sources
    }
}
