pub mod auth;
pub mod ideas;
