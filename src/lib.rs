//! Typed client for the immigration and tourism admin backend.
//!
//! [`AdminServices`] is built once from a [`Config`] and hands out one store
//! per backend resource. Stores keep the loaded page, filter state and the
//! record currently open, and route every call through a shared
//! [`ApiClient`].

pub mod api;
pub mod auth;
pub mod config;
pub mod errors;
pub mod http;
pub mod models;
pub mod notify;
pub mod store;

use std::sync::Arc;

use api::{
    Arrivals, Banners, CheckpointCategories, Checkpoints, Contacts, CounterStore, Countries,
    Departures, Feedbacks, Hotels, Laws, NewsCategories, NewsList, Permissions, Popups, Provinces,
    RegistrationStore, Roles, Scanner, Services, Users, VisaCategories,
};
use auth::TokenStore;
use config::Config;
use errors::Result;
use http::ApiClient;
use notify::Notifier;
use store::{CursorStore, ResourceStore};

/// Every store of the admin client, sharing one HTTP client, token store and
/// notifier. Cheap to clone.
#[derive(Clone)]
pub struct AdminServices {
    pub config: Arc<Config>,
    pub client: ApiClient,

    pub users: Arc<ResourceStore<Users>>,
    pub roles: Arc<ResourceStore<Roles>>,
    pub permissions: Arc<ResourceStore<Permissions>>,

    pub checkpoints: Arc<ResourceStore<Checkpoints>>,
    pub checkpoint_categories: Arc<ResourceStore<CheckpointCategories>>,
    pub provinces: Arc<ResourceStore<Provinces>>,
    pub countries: Arc<ResourceStore<Countries>>,
    pub hotels: Arc<ResourceStore<Hotels>>,

    pub news: Arc<ResourceStore<NewsList>>,
    pub news_categories: Arc<ResourceStore<NewsCategories>>,
    pub banners: Arc<ResourceStore<Banners>>,
    pub popups: Arc<ResourceStore<Popups>>,
    pub laws: Arc<ResourceStore<Laws>>,
    pub feedback: Arc<ResourceStore<Feedbacks>>,
    pub contacts: Arc<ResourceStore<Contacts>>,

    pub visa_categories: Arc<CursorStore<VisaCategories>>,
    pub services: Arc<CursorStore<Services>>,

    pub arrivals: Arc<RegistrationStore<Arrivals>>,
    pub departures: Arc<RegistrationStore<Departures>>,
    pub scanner: Arc<Scanner>,
    pub counters: Arc<CounterStore>,
}

impl AdminServices {
    /// Wire every store from `config`. The token is persisted when
    /// `config.token_path` is set.
    pub fn new(config: Config) -> Result<Self> {
        let tokens = match &config.token_path {
            Some(path) => TokenStore::persistent(path),
            None => TokenStore::in_memory(),
        };
        Self::with_tokens(config, tokens)
    }

    pub fn with_tokens(config: Config, tokens: TokenStore) -> Result<Self> {
        let client = ApiClient::new(&config, tokens, Notifier::new())?;

        let arrivals = Arc::new(RegistrationStore::new(client.clone()));
        let departures = Arc::new(RegistrationStore::new(client.clone()));
        let scanner = Arc::new(Scanner::new(arrivals.clone(), departures.clone()));

        tracing::debug!(base_url = %config.base_url, "Admin services ready");

        Ok(Self {
            users: Arc::new(ResourceStore::new(client.clone())),
            roles: Arc::new(ResourceStore::new(client.clone())),
            permissions: Arc::new(ResourceStore::new(client.clone())),
            checkpoints: Arc::new(ResourceStore::new(client.clone())),
            checkpoint_categories: Arc::new(ResourceStore::new(client.clone())),
            provinces: Arc::new(ResourceStore::new(client.clone())),
            countries: Arc::new(ResourceStore::new(client.clone())),
            hotels: Arc::new(ResourceStore::new(client.clone())),
            news: Arc::new(ResourceStore::new(client.clone())),
            news_categories: Arc::new(ResourceStore::new(client.clone())),
            banners: Arc::new(ResourceStore::new(client.clone())),
            popups: Arc::new(ResourceStore::new(client.clone())),
            laws: Arc::new(ResourceStore::new(client.clone())),
            feedback: Arc::new(ResourceStore::new(client.clone())),
            contacts: Arc::new(ResourceStore::new(client.clone())),
            visa_categories: Arc::new(CursorStore::new(client.clone())),
            services: Arc::new(CursorStore::new(client.clone())),
            counters: Arc::new(CounterStore::new(client.clone())),
            arrivals,
            departures,
            scanner,
            config: Arc::new(config),
            client,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        self.client.tokens()
    }

    pub fn notifier(&self) -> &Notifier {
        self.client.notifier()
    }

    /// Forget the session token.
    pub fn logout(&self) {
        self.tokens().clear();
        tracing::info!("Logged out");
    }
}

#[cfg(test)]
mod tests;
