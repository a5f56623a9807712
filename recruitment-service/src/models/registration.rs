use super::StoredAsset;
use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

/// Applicant registration with uploaded documents. CV, dossier and the two
/// photos are mandatory at intake; passport and police certificate may be
/// supplied later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    pub name: String,
    pub phone: String,
    pub email: String,
    pub destination: String,
    pub job_type: String,
    pub info_source: String,
    pub social_media: String,
    pub cv: StoredAsset,
    pub dossier: StoredAsset,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passport: Option<StoredAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub police_certificate: Option<StoredAsset>,
    pub id_photo: StoredAsset,
    pub full_photo: StoredAsset,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "mongodb::bson::serde_helpers::chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}
