use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Registration, StoredAsset};

#[derive(Debug, Deserialize)]
pub struct RegistrationFilter {
    pub name: Option<String>,
    pub month: Option<u32>,
    pub year: Option<i32>,
}

#[derive(Debug, Serialize)]
pub struct RegistrationResponse {
    pub id: String,
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
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Registration> for RegistrationResponse {
    fn from(reg: Registration) -> Self {
        Self {
            id: reg.id.to_hex(),
            name: reg.name,
            phone: reg.phone,
            email: reg.email,
            destination: reg.destination,
            job_type: reg.job_type,
            info_source: reg.info_source,
            social_media: reg.social_media,
            cv: reg.cv,
            dossier: reg.dossier,
            passport: reg.passport,
            police_certificate: reg.police_certificate,
            id_photo: reg.id_photo,
            full_photo: reg.full_photo,
            created_at: reg.created_at,
            updated_at: reg.updated_at,
        }
    }
}
