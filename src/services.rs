pub mod auth;
pub mod schedule;
pub mod customer_service;
pub use customer_service::CustomerService;
pub mod dashboard_service;
pub use dashboard_service::DashboardService;
pub mod proposal_service;
pub use proposal_service::ProposalService;
