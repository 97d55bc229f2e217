pub mod api;
pub mod backend;
pub mod cart;
pub mod config;
pub mod docs;
pub mod error;
pub mod models;
pub mod returns;
pub mod search;
pub mod ws;

use crate::backend::identity::IdentityClient;
use crate::backend::Backend;
use crate::config::Config;
use crate::error::Error;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Privileged table client (service key). None when not configured.
    pub backend: Option<Backend>,
    /// Customer-facing table client (anon key). None when not configured.
    pub catalog: Option<Backend>,
    pub identity: Option<IdentityClient>,
    pub hub: actix::Addr<ws::EventHub>,
}

impl AppState {
    pub fn from_config(config: Config, hub: actix::Addr<ws::EventHub>) -> Self {
        let backend = config
            .service_credentials()
            .map(|(url, key)| Backend::new(url, key));
        let catalog = config
            .anon_credentials()
            .map(|(url, key)| Backend::new(url, key));
        let identity = config
            .service_credentials()
            .map(|(url, key)| IdentityClient::new(url, key, config.anon_key.clone()));
        Self {
            config,
            backend,
            catalog,
            identity,
            hub,
        }
    }

    pub fn service(&self) -> Result<&Backend, Error> {
        self.backend.as_ref().ok_or(Error::NotConfigured)
    }

    pub fn catalog(&self) -> Result<&Backend, Error> {
        self.catalog.as_ref().ok_or(Error::NotConfigured)
    }

    pub fn identity(&self) -> Result<&IdentityClient, Error> {
        self.identity.as_ref().ok_or(Error::NotConfigured)
    }
}
