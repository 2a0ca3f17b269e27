use bibrec_common::Catalog;

use crate::domain::{repository::Repository, sources::SourceRegistry};

pub mod affiliation;
pub mod error;
pub mod import;
pub mod messages;
pub mod publications;
pub mod repository;
pub mod review;
pub mod sources;
pub mod user;
pub mod xml;

/// The global application state shared between all request handlers.
pub trait AppState: Clone + Send + Sync + 'static {
    type R: Repository;

    fn repository(&self) -> &Self::R;
    fn catalog(&self) -> &'static dyn Catalog;
    fn sources(&self) -> &'static SourceRegistry;
}
