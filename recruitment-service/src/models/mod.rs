pub mod agent;
pub mod country;
pub mod job_vacancy;
pub mod news;
pub mod registration;
pub mod role;
pub mod user;

pub use agent::{Agent, AgentDetail};
pub use country::Country;
pub use job_vacancy::{JobDescription, JobStatus, JobVacancy};
pub use news::News;
pub use registration::Registration;
pub use role::Role;
pub use user::User;

use serde::{Deserialize, Serialize};

/// A file hosted by the object-storage collaborator. `public_id` is the
/// opaque handle needed to delete the asset later.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredAsset {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_id: Option<String>,
}
