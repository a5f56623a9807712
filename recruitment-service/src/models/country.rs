use super::StoredAsset;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Destination country with bilingual name and description blocks
/// (`_id` suffix = Indonesian, `_en` = English) and a hosted image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Country {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name_id: String,
    pub name_en: String,
    pub desc_id: Vec<String>,
    pub desc_en: Vec<String>,
    pub img: StoredAsset,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl Country {
    pub fn new(
        name_id: String,
        name_en: String,
        desc_id: Vec<String>,
        desc_en: Vec<String>,
        img: StoredAsset,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            name_id: name_id.to_lowercase(),
            name_en: name_en.to_lowercase(),
            desc_id,
            desc_en,
            img,
            created_at: now,
            updated_at: now,
        }
    }
}
