//! Arrival and departure registrations, QR scan results and the daily
//! registration counters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::null_as_default;

/// Records that move from unverified to verified exactly once.
pub trait Verification {
    fn verified_at(&self) -> Option<DateTime<Utc>>;
    fn set_verified_at(&mut self, at: DateTime<Utc>);

    fn is_verified(&self) -> bool {
        self.verified_at().is_some()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BlackList {
    Available,
    Unavailable,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Purpose {
    Business,
    Diplomatic,
    Official,
    Tourism,
    Transit,
    Visit,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TravelType {
    Flight,
    Car,
    Bus,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentRef {
    pub id: i64,
    pub number: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PassportInfo {
    pub id: i64,
    pub number: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub expiry_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_issue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub place_issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub people_image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VisaInfo {
    pub id: i64,
    pub number: String,
    #[serde(default, deserialize_with = "null_as_default", rename = "visaCategory")]
    pub visa_category: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_issue: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub place_issue: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PersonalInfo {
    pub name: String,
    pub family_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub date_of_birth: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub place_of_birth: String,
    pub gender: Gender,
    #[serde(default, deserialize_with = "null_as_default")]
    pub nationality: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub occupation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub race: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IntendedAddress {
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub village: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub district: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub province: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_in: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub check_out: String,
}

/// Officer who confirmed the record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VerifiedBy {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<super::UserProfile>,
}

/// Arrival row as returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrivalSummary {
    pub id: i64,
    pub entry_name: String,
    pub black_list: BlackList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_code: String,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    pub passport_information: DocumentRef,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_information: Option<DocumentRef>,
}

/// Full arrival record shown to the officer before verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ArrivalDetail {
    pub id: i64,
    pub entry_name: String,
    pub purpose: Purpose,
    pub traveling_by_type: TravelType,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traveling_by_no: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub traveling_from: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub is_traveling_in_tour: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_code: Option<String>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub black_list: BlackList,
    pub passport_information: PassportInfo,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visa_information: Option<VisaInfo>,
    pub personal_information: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub intended_address: Vec<IntendedAddress>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by_user: Option<VerifiedBy>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
}

/// Departure record; the list and detail endpoints share one shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Departure {
    pub id: i64,
    pub departure_name: String,
    pub black_list: BlackList,
    #[serde(default, deserialize_with = "null_as_default")]
    pub verification_code: String,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
    pub passport_information: PassportInfo,
    pub personal_information: PersonalInfo,
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_leaving: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_by_user: Option<VerifiedBy>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
}

macro_rules! impl_verification {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Verification for $ty {
                fn verified_at(&self) -> Option<DateTime<Utc>> {
                    self.verified_at
                }

                fn set_verified_at(&mut self, at: DateTime<Utc>) {
                    self.verified_at = Some(at);
                }
            }
        )*
    };
}

impl_verification!(ArrivalSummary, ArrivalDetail, Departure);

#[derive(Debug, Clone, Serialize)]
pub struct ScanRequest {
    pub verification_code: String,
}

/// Scan endpoint answer: the record id, plus the timestamp when the record
/// was verified earlier.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ScanResponse {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

/// Body of the departure verify call.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyRequest {
    pub verified_at: DateTime<Utc>,
}

/// Answer of a verify call. Arrivals return an empty body.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct VerifyResponse {
    #[serde(default)]
    pub verified_at: Option<DateTime<Utc>>,
}

/// Registrations counted per day, month and year.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegistrationCounter {
    #[serde(default, deserialize_with = "null_as_default")]
    pub per_day: u64,
    /// The backend spells this field `per_mouth`.
    #[serde(default, deserialize_with = "null_as_default", rename = "per_mouth")]
    pub per_month: u64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub per_year: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct CounterAdjustment {
    pub number: u64,
}
