pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod proposals;
pub mod settings;
