use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{News, StoredAsset};

#[derive(Debug, Deserialize)]
pub struct NewsFilter {
    pub title: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct NewsResponse {
    pub id: String,
    pub title_id: String,
    pub title_en: String,
    pub desc_id: String,
    pub desc_en: String,
    pub img: StoredAsset,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<News> for NewsResponse {
    fn from(news: News) -> Self {
        Self {
            id: news.id.to_hex(),
            title_id: news.title_id,
            title_en: news.title_en,
            desc_id: news.desc_id,
            desc_en: news.desc_en,
            img: news.img,
            created_at: news.created_at,
            updated_at: news.updated_at,
        }
    }
}
