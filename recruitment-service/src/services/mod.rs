pub mod auth;
pub mod database;
pub mod email;
pub mod error;
pub mod provisioning;
pub mod session;
pub mod storage;
