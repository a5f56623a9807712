pub mod agent;
pub mod auth;
pub mod common;
pub mod contact;
pub mod country;
pub mod job;
pub mod news;
pub mod registration;
pub mod role;
pub mod user;

pub use common::{ErrorResponse, MessageResponse, PagedResponse};
