//! HTTP client wrapper.
//!
//! Adds the auth and language headers to every request, picks JSON or
//! multipart encoding from the body, and maps error statuses to [`ApiError`]
//! plus a user-facing [`Notice`] in one place.

mod form;
mod query;

pub use form::*;
pub use query::*;

use reqwest::header::{ACCEPT_LANGUAGE, AUTHORIZATION};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use crate::auth::TokenStore;
use crate::config::Config;
use crate::errors::{ApiError, Result};
use crate::notify::{Notice, NoticeLevel, Notifier};

/// Header carrying the per-request correlation id.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Request body.
#[derive(Debug, Clone, Default)]
pub enum Body {
    #[default]
    Empty,
    Json(Value),
    Form(FormPayload),
}

impl Body {
    pub fn json<T: serde::Serialize>(payload: &T) -> Result<Self> {
        Ok(Body::Json(serde_json::to_value(payload)?))
    }
}

/// Client for the admin REST API. Cheap to clone; clones share the
/// connection pool, token store and notifier.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    accept_language: String,
    tokens: TokenStore,
    notifier: Notifier,
}

impl ApiClient {
    pub fn new(config: &Config, tokens: TokenStore, notifier: Notifier) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ApiError::Config(format!("cannot build HTTP client: {}", e)))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            accept_language: config.accept_language.clone(),
            tokens,
            notifier,
        })
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Absolute URL for an API path; a missing leading slash is added.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str, query: Option<&Query>) -> Result<T> {
        self.request(Method::GET, path, query, Body::Empty).await
    }

    pub async fn post<T: DeserializeOwned>(&self, path: &str, body: Body) -> Result<T> {
        self.request(Method::POST, path, None, body).await
    }

    pub async fn put<T: DeserializeOwned>(&self, path: &str, body: Body) -> Result<T> {
        self.request(Method::PUT, path, None, body).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value> {
        self.request(Method::DELETE, path, None, Body::Empty).await
    }

    /// Send a request and decode the response body. An empty body decodes
    /// as JSON `null`.
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Query>,
        body: Body,
    ) -> Result<T> {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();

        let mut builder = self
            .http
            .request(method.clone(), &url)
            .header(ACCEPT_LANGUAGE, &self.accept_language)
            .header(REQUEST_ID_HEADER, &request_id);

        if let Some(bearer) = self.tokens.bearer() {
            builder = builder.header(AUTHORIZATION, bearer);
        }
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            builder = builder.query(query.pairs());
        }
        builder = match body {
            Body::Empty => builder,
            Body::Json(value) => builder.json(&value),
            Body::Form(form) => builder.multipart(form.into_multipart()?),
        };

        tracing::debug!(%method, %url, %request_id, "Sending request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(%method, %url, %request_id, "Network error: {}", e);
                return Err(ApiError::Network(e.to_string()));
            }
        };

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            tracing::error!(%method, %url, %request_id, "Failed to read response body: {}", e);
            ApiError::Network(e.to_string())
        })?;

        if !status.is_success() {
            let err = ApiError::from_status(status.as_u16(), &text);
            self.report(&err, &method, &url, &request_id);
            return Err(err);
        }

        tracing::debug!(%method, %url, %request_id, status = status.as_u16(), "Request succeeded");

        let raw = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(raw).map_err(|e| {
            tracing::error!(%method, %url, %request_id, "Failed to decode response: {}", e);
            ApiError::Decode(format!("{} {}: {}", method, path, e))
        })
    }

    /// Central status handling: log, notify, and drop the session on 401.
    fn report(&self, err: &ApiError, method: &Method, url: &str, request_id: &str) {
        match err {
            ApiError::BadRequest(msg) => {
                tracing::warn!(%method, %url, %request_id, "Bad request: {}", msg);
                self.notifier.publish(Notice::message(
                    NoticeLevel::Warning,
                    "Something went wrong!",
                    msg.clone(),
                ));
            }
            ApiError::Unauthorized(_) => {
                tracing::warn!(%method, %url, %request_id, "Unauthorized! Logging out...");
                self.tokens.clear();
                self.notifier.publish(Notice::SessionExpired);
            }
            ApiError::Forbidden(_) => {
                tracing::warn!(%method, %url, %request_id, "Forbidden");
                self.notifier.publish(Notice::message(
                    NoticeLevel::Error,
                    "Access denied!",
                    "Please contact an administrator",
                ));
            }
            ApiError::NotFound(msg) => {
                tracing::error!(%method, %url, %request_id, "API not found: {}", msg);
            }
            ApiError::Conflict(msg) => {
                tracing::warn!(%method, %url, %request_id, "Conflict: {}", msg);
                self.notifier
                    .publish(Notice::message(NoticeLevel::Warning, "Conflict", msg.clone()));
            }
            ApiError::Server { status, message } => {
                tracing::error!(%method, %url, %request_id, status, "Server error: {}", message);
                self.notifier.publish(Notice::message(
                    NoticeLevel::Error,
                    "Server error!",
                    "Please try again",
                ));
            }
            other => tracing::error!(%method, %url, %request_id, "Unhandled error: {}", other),
        }
    }
}
