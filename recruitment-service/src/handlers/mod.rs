pub mod agents;
pub mod auth;
pub mod contact;
pub mod countries;
pub mod health;
pub mod jobs;
pub mod news;
pub mod registrations;
pub mod users;
pub mod roles;
