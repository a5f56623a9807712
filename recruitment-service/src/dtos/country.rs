use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Country, StoredAsset};

#[derive(Debug, Deserialize)]
pub struct CountryFilter {
    #[serde(rename = "countryName")]
    pub country_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CountryResponse {
    pub id: String,
    pub name_id: String,
    pub name_en: String,
    pub desc_id: Vec<String>,
    pub desc_en: Vec<String>,
    pub img: StoredAsset,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Country> for CountryResponse {
    fn from(country: Country) -> Self {
        Self {
            id: country.id.to_hex(),
            name_id: country.name_id,
            name_en: country.name_en,
            desc_id: country.desc_id,
            desc_en: country.desc_en,
            img: country.img,
            created_at: country.created_at,
            updated_at: country.updated_at,
        }
    }
}
