//! Visa categories and public services: cursor-paginated, one language per
//! listing, with rich-text content per language.

use serde::Serialize;
use serde_json::Value;

use crate::errors::{ApiError, Result};
use crate::http::Body;
use crate::models::{stringify_content, Lang, Service, ServiceRequest, Translated, VisaCategory, VisaCategoryRequest};
use crate::store::{CursorResource, CursorStore};

pub struct VisaCategories;

impl CursorResource for VisaCategories {
    const NAME: &'static str = "visa-categories";
    const PATH: &'static str = "/visa-category";

    type Item = VisaCategory;
}

pub struct Services;

impl CursorResource for Services {
    const NAME: &'static str = "services";
    const PATH: &'static str = "/services";

    type Item = Service;
}

/// JSON body with every language's `content` sent as a string.
fn localized_body<T: Serialize>(texts: &Translated<T>) -> Result<Body> {
    let mut value = serde_json::to_value(texts)?;
    for lang in Lang::ALL {
        match value.get_mut(lang.as_str()).and_then(|text| text.get_mut("content")) {
            Some(content) => stringify_content(content),
            None => {
                return Err(ApiError::Validation(format!("missing content for language {}", lang)));
            }
        }
    }
    Ok(Body::Json(value))
}

impl CursorStore<VisaCategories> {
    pub async fn create_visa(&self, request: &VisaCategoryRequest) -> Result<Value> {
        self.create(localized_body(request)?).await
    }

    pub async fn update_visa(&self, id: i64, request: &VisaCategoryRequest) -> Result<Value> {
        self.update(id, localized_body(request)?).await
    }
}

impl CursorStore<Services> {
    pub async fn create_service(&self, request: &ServiceRequest) -> Result<Value> {
        self.create(localized_body(request)?).await
    }

    pub async fn update_service(&self, id: i64, request: &ServiceRequest) -> Result<Value> {
        self.update(id, localized_body(request)?).await
    }
}
