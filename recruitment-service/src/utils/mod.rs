pub mod multipart;
pub mod password;
pub mod query;
pub mod validation;
