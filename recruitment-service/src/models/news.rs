use super::StoredAsset;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct News {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub title_id: String,
    pub title_en: String,
    pub desc_id: String,
    pub desc_en: String,
    pub img: StoredAsset,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl News {
    pub fn new(
        title_id: String,
        title_en: String,
        desc_id: String,
        desc_en: String,
        img: StoredAsset,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ObjectId::new(),
            title_id,
            title_en,
            desc_id,
            desc_en,
            img,
            created_at: now,
            updated_at: now,
        }
    }
}
