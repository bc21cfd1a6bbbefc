pub mod auth;
pub use auth::AuthService;
pub mod crud_service;
pub use crud_service::CrudService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
