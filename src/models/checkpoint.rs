//! Border checkpoints, their categories, and provinces.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{null_as_default, NameText, Translated, Translation};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Checkpoint {
    pub id: i64,
    pub category_id: i64,
    pub province_id: i64,
    /// Neighbouring country the checkpoint opens onto ("thailand", "china", ...).
    #[serde(default, deserialize_with = "null_as_default")]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link_map: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub visa: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub e_visa: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_open: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Per-language checkpoint text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CheckpointText {
    pub name: String,
    pub time_operation: String,
    pub address: String,
    /// Rich-text document from the editor.
    pub content: Value,
}

/// Create/update payload; sent as multipart with the image attached separately.
#[derive(Debug, Clone, Serialize)]
pub struct CheckpointRequest {
    pub category_id: i64,
    pub province_id: i64,
    pub country: String,
    pub link_map: String,
    pub phone_number: String,
    pub email: String,
    pub visa: bool,
    pub e_visa: bool,
    pub is_open: bool,
    pub translates: Translated<CheckpointText>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointCategory {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Province {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub countries: Vec<ProvinceCountry>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProvinceCountry {
    pub id: i64,
    pub country: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvinceRequest {
    pub country_ids: Vec<i64>,
    #[serde(flatten)]
    pub names: Translated<NameText>,
}
