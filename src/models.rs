pub mod auth;
pub mod contract;
pub mod dashboard;
pub mod service_visit;
pub mod settings;
