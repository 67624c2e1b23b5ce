//! Shapes shared by every resource: pagination envelopes, languages and
//! per-language translation rows.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::errors::ApiError;

/// Anything the backend addresses by numeric id.
pub trait Identified {
    fn id(&self) -> i64;
}

/// Content languages supported by the backend.
#[derive(
    Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord,
)]
pub enum Lang {
    #[default]
    #[serde(rename = "lo")]
    Lo,
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh_cn")]
    ZhCn,
}

impl Lang {
    pub const ALL: [Lang; 3] = [Lang::Lo, Lang::En, Lang::ZhCn];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Lo => "lo",
            Lang::En => "en",
            Lang::ZhCn => "zh_cn",
        }
    }
}

impl std::fmt::Display for Lang {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = ApiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "lo" => Ok(Lang::Lo),
            "en" => Ok(Lang::En),
            "zh_cn" | "zh" => Ok(Lang::ZhCn),
            other => Err(ApiError::Validation(format!("unsupported language {:?}", other))),
        }
    }
}

/// Reads an explicit `null` the same as a missing field. Pair with
/// `#[serde(default)]`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Offset-paginated list envelope: `{ data, total }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    /// Some endpoints omit the total; callers fall back to `data.len()`.
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T> Page<T> {
    pub fn total_or_len(&self) -> u64 {
        self.total.unwrap_or(self.data.len() as u64)
    }
}

/// Cursor-paginated list envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPage<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
    #[serde(default)]
    pub total: Option<u64>,
    /// Opaque cursor for the next page, absent on the last page.
    #[serde(default, alias = "cursor", skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

/// One language row of a translated entity. Which text fields are present
/// depends on the entity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Translation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub lang: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

/// Find the row for `lang` among an entity's translations.
pub fn translation_for(translates: &[Translation], lang: Lang) -> Option<&Translation> {
    translates.iter().find(|t| t.lang == lang.as_str())
}

/// One value per language, serialized as `{ "lo": .., "en": .., "zh_cn": .. }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Translated<T> {
    pub lo: T,
    pub en: T,
    pub zh_cn: T,
}

impl<T> Translated<T> {
    pub fn get(&self, lang: Lang) -> &T {
        match lang {
            Lang::Lo => &self.lo,
            Lang::En => &self.en,
            Lang::ZhCn => &self.zh_cn,
        }
    }
}

/// Name-only translation payload (categories, provinces).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NameText {
    pub name: String,
}
