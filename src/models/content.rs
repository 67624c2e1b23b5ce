//! Published content: news, banners, popups, laws, visa categories and
//! services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, Translated, Translation};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NewsStatus {
    Draft,
    Published,
    Private,
}

impl NewsStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NewsStatus::Draft => "draft",
            NewsStatus::Published => "published",
            NewsStatus::Private => "private",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct News {
    pub id: i64,
    pub category_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<NewsCategory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail: Option<String>,
    pub status: NewsStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_at: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsTranslationInput {
    pub lang: String,
    pub title: String,
    pub description: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewsRequest {
    pub category_id: String,
    pub status: NewsStatus,
    pub translates: Vec<NewsTranslationInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewsCategory {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Hero banner shown on the public site.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Banner {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Banner {
    /// A banner without an end time, or with one that does not parse, never
    /// expires.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_past(&self.end_time, now)
    }
}

/// Banner form. Language fields are flat (`lo_title`, `en_description`, ...);
/// the `*_id` fields are only sent on update.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BannerRequest {
    pub link: String,
    pub is_private: bool,
    pub start_time: String,
    pub end_time: String,
    pub lo_title: String,
    pub lo_description: String,
    pub en_title: String,
    pub en_description: String,
    pub zh_cn_title: String,
    pub zh_cn_description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lo_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub en_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zh_cn_id: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Popup {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_private: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_time: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

impl Popup {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        is_past(&self.end_time, now)
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct PopupRequest {
    pub link: String,
    pub is_private: bool,
    pub start_time: String,
    pub end_time: String,
}

fn is_past(end_time: &str, now: DateTime<Utc>) -> bool {
    if end_time.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(end_time)
        .map(|end| now > end.with_timezone(&Utc))
        .unwrap_or(false)
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Law {
    pub id: i64,
    pub name: String,
    /// URL of the uploaded document.
    #[serde(default, deserialize_with = "null_as_default")]
    pub file: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LawRequest {
    pub name: String,
}

/// Visa category as listed in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisaCategory {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lang_id: Option<i64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct VisaText {
    pub name: String,
    /// Editor document; the backend stores it as a JSON string.
    pub content: Value,
}

pub type VisaCategoryRequest = Translated<VisaText>;

/// Public service page as listed in one language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Service {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ServiceText {
    pub title: String,
    pub description: String,
    pub content: Value,
}

pub type ServiceRequest = Translated<ServiceText>;

/// Single-language detail of a visa category or service.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LocalizedDetail {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: Value,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Rich-text content must travel as a string; editor documents are
/// stringified in place.
pub fn stringify_content(content: &mut Value) {
    if !content.is_string() && !content.is_null() {
        *content = Value::String(content.to_string());
    }
}
