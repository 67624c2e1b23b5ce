//! Countries and hotels.

use serde::{Deserialize, Serialize};

use super::{null_as_default, Translated, Translation};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Country {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Citizens of this country enter without a visa.
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_except_visa: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CountryText {
    pub name: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

/// Multipart payload; each language object is sent as a JSON string field.
#[derive(Debug, Clone, Serialize)]
pub struct CountryRequest {
    pub is_except_visa: bool,
    #[serde(flatten)]
    pub texts: Translated<CountryText>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hotel {
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub link_map: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone_number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_published: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub translates: Vec<Translation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<HotelUser>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Login account attached to a hotel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HotelUser {
    pub id: i64,
    pub email: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct HotelRequest {
    pub map_link: String,
    pub phone_number: String,
    pub link: String,
    pub is_published: bool,
    pub lo_name: String,
    pub lo_address: String,
    pub en_name: String,
    pub en_address: String,
    pub zh_name: String,
    pub zh_address: String,
}
