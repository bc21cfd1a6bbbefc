pub mod auth;
pub mod clients;
pub mod dashboard;
pub mod health;
pub mod motorcycles;
pub mod resource;
