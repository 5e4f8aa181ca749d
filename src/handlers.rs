pub mod auth;
pub mod clients;
pub mod documents;
pub mod reports;
