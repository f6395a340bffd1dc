//! Response models returned by the service modules.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

use crate::enums::Compression;
use crate::serde_utils;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    #[serde(default)]
    pub name: String,
    /// Round trip to the service, in milliseconds.
    pub ping: u64,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthAntivirus {
    pub version: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthQueue {
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthTime {
    #[serde(
        deserialize_with = "serde_utils::deserialize_timestamp_millis",
        serialize_with = "serde_utils::serialize_timestamp_millis"
    )]
    pub remote_time: SystemTime,
    #[serde(
        deserialize_with = "serde_utils::deserialize_timestamp_millis",
        serialize_with = "serde_utils::serialize_timestamp_millis"
    )]
    pub local_time: SystemTime,
    /// Local minus remote, in milliseconds.
    pub diff: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bucket {
    #[serde(rename = "$id")]
    pub id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    pub file_security: bool,
    pub name: String,
    pub enabled: bool,
    pub maximum_file_size: u64,
    #[serde(default)]
    pub allowed_file_extensions: Vec<String>,
    pub compression: Compression,
    pub encryption: bool,
    pub antivirus: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketList {
    pub total: u64,
    pub buckets: Vec<Bucket>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct File {
    #[serde(rename = "$id")]
    pub id: String,
    pub bucket_id: String,
    #[serde(rename = "$createdAt")]
    pub created_at: String,
    #[serde(rename = "$updatedAt")]
    pub updated_at: String,
    #[serde(rename = "$permissions", default)]
    pub permissions: Vec<String>,
    pub name: String,
    #[serde(default)]
    pub signature: String,
    pub mime_type: String,
    pub size_original: u64,
    pub chunks_total: u64,
    pub chunks_uploaded: u64,
}

impl File {
    pub fn is_complete(&self) -> bool {
        self.chunks_uploaded >= self.chunks_total
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileList {
    pub total: u64,
    pub files: Vec<File>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub ip: String,
    pub country_code: String,
    pub country: String,
    pub continent_code: String,
    pub continent: String,
    pub eu: bool,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Country {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryList {
    pub total: u64,
    pub countries: Vec<Country>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Continent {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContinentList {
    pub total: u64,
    pub continents: Vec<Continent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub symbol: String,
    pub name: String,
    pub symbol_native: String,
    pub decimal_digits: u32,
    pub rounding: f64,
    pub code: String,
    pub name_plural: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyList {
    pub total: u64,
    pub currencies: Vec<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub name: String,
    pub code: String,
    pub native_name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageList {
    pub total: u64,
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocaleCode {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocaleCodeList {
    pub total: u64,
    pub locale_codes: Vec<LocaleCode>,
}
