pub mod acquisition;
pub mod auth;
pub mod brand;
pub mod budget;
pub mod client;
pub mod dashboard;
pub mod motorcycle;
pub mod part;
pub mod resource;
pub mod service_order;
pub mod supplier;
pub mod user;
